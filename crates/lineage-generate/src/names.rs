use fake::Fake;
use fake::faker::name::en::LastName;
use lineage_core::Sex;

use crate::assets::{AssetsLoader, assets_loader};
use crate::errors::GenerationError;
use crate::random::RandomSource;

const MALE_ASSET: &str = "names/male.txt";
const FEMALE_ASSET: &str = "names/female.txt";

const DEFAULT_MALE: &[&str] = &[
    "James", "John", "Robert", "William", "Charles", "George", "Thomas", "Edward", "Henry",
    "Walter",
];
const DEFAULT_FEMALE: &[&str] = &[
    "Mary", "Helen", "Margaret", "Ruth", "Dorothy", "Anna", "Elizabeth", "Frances", "Alice",
    "Rose",
];

/// First-name pools by sex. Unknown sex draws from the union.
#[derive(Debug, Clone)]
pub struct NamePools {
    male: Vec<String>,
    female: Vec<String>,
    shared: Vec<String>,
}

impl NamePools {
    /// Bundled name lists, or built-in defaults where an asset is absent.
    pub fn load() -> Result<Self, GenerationError> {
        Self::load_from(assets_loader())
    }

    pub fn load_from(loader: &AssetsLoader) -> Result<Self, GenerationError> {
        let male = loader
            .load_lines(MALE_ASSET)?
            .unwrap_or_else(|| owned(DEFAULT_MALE));
        let female = loader
            .load_lines(FEMALE_ASSET)?
            .unwrap_or_else(|| owned(DEFAULT_FEMALE));
        Self::from_lists(male, female)
    }

    pub fn from_lists(male: Vec<String>, female: Vec<String>) -> Result<Self, GenerationError> {
        if male.is_empty() || female.is_empty() {
            return Err(GenerationError::Asset(
                "first-name pools must not be empty".to_string(),
            ));
        }
        let mut shared = male.clone();
        for name in &female {
            if !shared.contains(name) {
                shared.push(name.clone());
            }
        }
        Ok(Self {
            male,
            female,
            shared,
        })
    }

    pub fn pool(&self, sex: Sex) -> &[String] {
        match sex {
            Sex::Male => &self.male,
            Sex::Female => &self.female,
            Sex::Unknown => &self.shared,
        }
    }

    pub fn first_name<R: RandomSource>(&self, sex: Sex, rng: &mut R) -> String {
        rng.uniform_choice(self.pool(sex)).clone()
    }

    /// Fresh surname from the faker, driven by the run's random source.
    pub fn surname<R: RandomSource>(&self, rng: &mut R) -> String {
        LastName().fake_with_rng(rng.rng())
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
