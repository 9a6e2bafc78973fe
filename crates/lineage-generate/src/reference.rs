//! Geographic reference data: counties and the cities inside them.
//!
//! Providers only list raw rows. [`ReferenceIndex::build`] validates them
//! once, and the generator samples exclusively from the index.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use lineage_core::Place;
use serde::Deserialize;

use crate::assets::assets_loader;
use crate::errors::GenerationError;
use crate::random::RandomSource;

/// Source of county and city lists.
pub trait ReferenceDataProvider {
    /// Ordered `(code, name)` pairs.
    fn list_counties(&self) -> Result<Vec<(String, String)>, GenerationError>;

    /// County code to ordered city names.
    fn list_cities(&self) -> Result<BTreeMap<String, Vec<String>>, GenerationError>;
}

/// In-memory reference data.
#[derive(Debug, Clone, Default)]
pub struct StaticReferenceData {
    counties: Vec<(String, String)>,
    cities: BTreeMap<String, Vec<String>>,
}

impl StaticReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_county(mut self, code: &str, name: &str, cities: &[&str]) -> Self {
        self.counties.push((code.to_string(), name.to_string()));
        self.cities
            .entry(code.to_string())
            .or_default()
            .extend(cities.iter().map(|city| city.to_string()));
        self
    }
}

impl ReferenceDataProvider for StaticReferenceData {
    fn list_counties(&self) -> Result<Vec<(String, String)>, GenerationError> {
        Ok(self.counties.clone())
    }

    fn list_cities(&self) -> Result<BTreeMap<String, Vec<String>>, GenerationError> {
        Ok(self.cities.clone())
    }
}

#[derive(Debug, Deserialize)]
struct CountyRow {
    county_code: String,
    county: String,
}

#[derive(Debug, Deserialize)]
struct CityRow {
    county_code: String,
    cities: String,
}

/// Reference data read from two CSV tables.
///
/// `counties.csv` has columns `county_code,county`; `cities.csv` has
/// `county_code,cities` with the cities separated by `;`.
#[derive(Debug, Clone)]
pub struct CsvReferenceData {
    counties_path: PathBuf,
    cities_path: PathBuf,
}

impl CsvReferenceData {
    pub fn new(counties_path: impl Into<PathBuf>, cities_path: impl Into<PathBuf>) -> Self {
        Self {
            counties_path: counties_path.into(),
            cities_path: cities_path.into(),
        }
    }

    fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>, GenerationError> {
        csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|err| {
                GenerationError::Config(format!(
                    "failed to open reference table {}: {err}",
                    path.display()
                ))
            })
    }
}

impl ReferenceDataProvider for CsvReferenceData {
    fn list_counties(&self) -> Result<Vec<(String, String)>, GenerationError> {
        let mut reader = Self::reader(&self.counties_path)?;
        let mut counties = Vec::new();
        for row in reader.deserialize::<CountyRow>() {
            let row = row?;
            counties.push((row.county_code, row.county));
        }
        Ok(counties)
    }

    fn list_cities(&self) -> Result<BTreeMap<String, Vec<String>>, GenerationError> {
        let mut reader = Self::reader(&self.cities_path)?;
        let mut cities: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for row in reader.deserialize::<CityRow>() {
            let row = row?;
            cities.entry(row.county_code).or_default().extend(
                row.cities
                    .split(';')
                    .map(str::trim)
                    .filter(|city| !city.is_empty())
                    .map(str::to_string),
            );
        }
        Ok(cities)
    }
}

/// The Illinois county tables shipped with this crate.
#[derive(Debug, Clone)]
pub struct BundledReferenceData {
    inner: CsvReferenceData,
}

impl BundledReferenceData {
    pub fn new() -> Self {
        let loader = assets_loader();
        Self {
            inner: CsvReferenceData::new(
                loader.path("reference/counties.csv"),
                loader.path("reference/cities.csv"),
            ),
        }
    }
}

impl Default for BundledReferenceData {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceDataProvider for BundledReferenceData {
    fn list_counties(&self) -> Result<Vec<(String, String)>, GenerationError> {
        self.inner.list_counties()
    }

    fn list_cities(&self) -> Result<BTreeMap<String, Vec<String>>, GenerationError> {
        self.inner.list_cities()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct County {
    pub code: String,
    pub name: String,
    pub cities: Vec<String>,
}

/// Validated county/city lookup used during generation.
#[derive(Debug, Clone)]
pub struct ReferenceIndex {
    counties: Vec<County>,
}

impl ReferenceIndex {
    pub fn build(provider: &dyn ReferenceDataProvider) -> Result<Self, GenerationError> {
        let counties = provider.list_counties()?;
        let mut cities = provider.list_cities()?;

        if counties.is_empty() {
            return Err(GenerationError::Config(
                "reference data lists no counties".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        let mut index = Vec::with_capacity(counties.len());
        for (code, name) in counties {
            if code.is_empty() {
                return Err(GenerationError::Config(format!(
                    "county '{name}' has an empty code"
                )));
            }
            if !seen.insert(code.clone()) {
                return Err(GenerationError::Config(format!(
                    "duplicate county code {code}"
                )));
            }
            let county_cities = cities.remove(&code).unwrap_or_default();
            if county_cities.is_empty() {
                return Err(GenerationError::Config(format!(
                    "county {code} ({name}) has no cities"
                )));
            }
            index.push(County {
                code,
                name,
                cities: county_cities,
            });
        }

        if let Some(code) = cities.keys().next() {
            return Err(GenerationError::Config(format!(
                "cities listed for unknown county {code}"
            )));
        }

        Ok(Self { counties: index })
    }

    pub fn counties(&self) -> &[County] {
        &self.counties
    }

    pub fn county(&self, code: &str) -> Option<&County> {
        self.counties.iter().find(|county| county.code == code)
    }

    pub fn pick_county<R: RandomSource>(&self, rng: &mut R) -> &County {
        rng.uniform_choice(&self.counties)
    }

    pub fn pick_city<'a, R: RandomSource>(&self, rng: &mut R, county: &'a County) -> &'a str {
        rng.uniform_choice(&county.cities).as_str()
    }

    /// Uniform county, then a uniform city inside it.
    pub fn pick_place<R: RandomSource>(&self, rng: &mut R) -> Place {
        let county = self.pick_county(rng);
        let city = self.pick_city(rng, county);
        Place {
            county_code: county.code.clone(),
            county: county.name.clone(),
            city: city.to_string(),
        }
    }
}
