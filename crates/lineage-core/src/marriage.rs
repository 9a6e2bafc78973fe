use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::Schema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;
use crate::person::PersonId;

/// Order-independent key for a union of two people.
///
/// `MarriageKey::new(a, b)` and `MarriageKey::new(b, a)` are equal; the lower
/// identifier always comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarriageKey {
    first: PersonId,
    second: PersonId,
}

impl MarriageKey {
    pub fn new(a: PersonId, b: PersonId) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    pub fn spouses(&self) -> (PersonId, PersonId) {
        (self.first, self.second)
    }

    /// The other spouse, when `id` is part of this union.
    pub fn partner_of(&self, id: PersonId) -> Option<PersonId> {
        if self.first == id {
            Some(self.second)
        } else if self.second == id {
            Some(self.first)
        } else {
            None
        }
    }
}

impl fmt::Display for MarriageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.first, self.second)
    }
}

impl FromStr for MarriageKey {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (a, b) = value
            .split_once(',')
            .ok_or_else(|| Error::InvalidId(value.to_string()))?;
        let key = MarriageKey::new(a.trim().parse()?, b.trim().parse()?);
        if key.to_string() != value {
            return Err(Error::InvalidId(format!("non-canonical marriage key '{value}'")));
        }
        Ok(key)
    }
}

impl Serialize for MarriageKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MarriageKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for MarriageKey {
    fn schema_name() -> String {
        "MarriageKey".to_string()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        String::json_schema(generator)
    }
}

/// A recorded union; `spouse1` holds the lower identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Marriage {
    pub spouse1: PersonId,
    pub spouse2: PersonId,
    pub marriage_county_code: String,
    pub marriage_county: String,
    pub marriage_city: String,
    pub marriage_date: NaiveDate,
}

impl Marriage {
    pub fn key(&self) -> MarriageKey {
        MarriageKey::new(self.spouse1, self.spouse2)
    }
}
