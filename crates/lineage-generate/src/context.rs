use lineage_core::FamilyTree;

use crate::ids::IdAllocator;
use crate::model::{GenerationReport, TreeConfig};
use crate::names::NamePools;
use crate::random::RandomSource;
use crate::reference::ReferenceIndex;

/// Mutable state threaded through one generation run.
///
/// The tree owns every person and marriage; collaborators are borrowed so a
/// test can swap in its own allocator or random source.
pub struct GenerationContext<'a, R: RandomSource, I: IdAllocator> {
    pub tree: FamilyTree,
    pub rng: R,
    pub ids: I,
    pub reference: &'a ReferenceIndex,
    pub names: &'a NamePools,
    pub config: &'a TreeConfig,
    pub report: GenerationReport,
}

impl<'a, R: RandomSource, I: IdAllocator> GenerationContext<'a, R, I> {
    pub fn new(
        rng: R,
        ids: I,
        reference: &'a ReferenceIndex,
        names: &'a NamePools,
        config: &'a TreeConfig,
        report: GenerationReport,
    ) -> Self {
        Self {
            tree: FamilyTree::new(),
            rng,
            ids,
            reference,
            names,
            config,
            report,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::ids::SequentialIds;
    use crate::model::TreeConfig;
    use crate::names::NamePools;
    use crate::random::SeededSource;
    use crate::reference::{ReferenceIndex, StaticReferenceData};

    pub fn reference() -> ReferenceIndex {
        let provider = StaticReferenceData::new()
            .with_county("019", "Champaign", &["Champaign", "Urbana"])
            .with_county("031", "Cook", &["Chicago"]);
        ReferenceIndex::build(&provider).expect("fixture reference")
    }

    pub fn names() -> NamePools {
        NamePools::from_lists(
            vec!["Arthur".to_string(), "Walter".to_string()],
            vec!["Edith".to_string(), "Mabel".to_string()],
        )
        .expect("fixture names")
    }

    pub fn source(seed: u64) -> SeededSource {
        SeededSource::from_seed(seed)
    }

    pub fn ids() -> SequentialIds {
        SequentialIds::new()
    }

    pub fn config() -> TreeConfig {
        TreeConfig::default()
    }
}
