use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::Schema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Number of digits in a rendered person identifier (`P000001`).
pub const PERSON_ID_WIDTH: usize = 6;

/// Largest identifier that still renders at [`PERSON_ID_WIDTH`].
pub const MAX_PERSON_ID: u32 = 999_999;

/// Stable identifier of a person within one generation run.
///
/// Rendered as `P` followed by a zero-padded number, so lexicographic and
/// numeric order agree for every id up to [`MAX_PERSON_ID`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonId(u32);

impl PersonId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{:0width$}", self.0, width = PERSON_ID_WIDTH)
    }
}

impl FromStr for PersonId {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .strip_prefix('P')
            .filter(|digits| !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit()))
            .and_then(|digits| digits.parse::<u32>().ok())
            .map(PersonId)
            .ok_or_else(|| Error::InvalidId(value.to_string()))
    }
}

impl Serialize for PersonId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PersonId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for PersonId {
    fn schema_name() -> String {
        "PersonId".to_string()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        String::json_schema(generator)
    }
}

/// Recorded sex of a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "U")]
    Unknown,
}

impl Sex {
    /// Opposite sex used when pairing partners; unknown has none.
    pub fn opposite(self) -> Option<Sex> {
        match self {
            Sex::Male => Some(Sex::Female),
            Sex::Female => Some(Sex::Male),
            Sex::Unknown => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Unknown => "U",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A county plus one of its cities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Place {
    pub county_code: String,
    pub county: String,
    pub city: String,
}

/// A generated person.
///
/// Parent links are lookup-only identifiers into the owning
/// [`FamilyTree`](crate::FamilyTree); they are written at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Person {
    pub id: PersonId,
    pub first: String,
    pub middle: String,
    /// Current surname, possibly adopted at marriage.
    pub last: String,
    /// Surname at birth; never changed by marriage.
    pub birth_last: String,
    pub sex: Sex,

    pub birth_county_code: String,
    pub birth_county: String,
    pub birth_city: String,

    pub death_county_code: String,
    pub death_county: String,
    pub death_city: String,

    pub birth_date: NaiveDate,
    pub death_date: NaiveDate,
    /// Age at death, in whole years.
    pub age: i32,
    /// Generation index relative to the root cluster (older is higher).
    pub generation: i32,

    pub is_married: bool,

    pub mother: Option<PersonId>,
    pub father: Option<PersonId>,
    pub children: Vec<PersonId>,
}

impl Person {
    pub fn has_parents(&self) -> bool {
        self.mother.is_some() || self.father.is_some()
    }
}
