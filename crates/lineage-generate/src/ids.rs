use lineage_core::PersonId;
use lineage_core::person::MAX_PERSON_ID;

use crate::errors::GenerationError;

/// Issues person identifiers for one generation run.
pub trait IdAllocator {
    fn next_id(&mut self) -> Result<PersonId, GenerationError>;
}

/// Monotonic allocator: `P000001`, `P000002`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    last: u32,
    limit: u32,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::with_limit(MAX_PERSON_ID)
    }

    pub fn with_limit(limit: u32) -> Self {
        Self { last: 0, limit }
    }

    pub fn issued(&self) -> u32 {
        self.last
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator for SequentialIds {
    fn next_id(&mut self) -> Result<PersonId, GenerationError> {
        if self.last >= self.limit {
            return Err(GenerationError::IdsExhausted(self.limit));
        }
        self.last += 1;
        Ok(PersonId::new(self.last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_padded() {
        let mut ids = SequentialIds::new();
        let first = ids.next_id().expect("first id");
        let second = ids.next_id().expect("second id");
        assert!(first < second);
        assert_eq!(first.to_string(), "P000001");
        assert_eq!(second.to_string(), "P000002");
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn exhaustion_is_an_error() {
        let mut ids = SequentialIds::with_limit(2);
        ids.next_id().expect("first");
        ids.next_id().expect("second");
        assert!(matches!(ids.next_id(), Err(GenerationError::IdsExhausted(2))));
    }
}
