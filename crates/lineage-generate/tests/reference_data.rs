use std::fs;
use std::path::PathBuf;

use lineage_generate::{
    CsvReferenceData, GenerateOptions, GenerationEngine, GenerationError, ReferenceDataProvider,
    ReferenceIndex, StaticReferenceData, TreeConfig,
};

fn temp_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("lineage_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_tables(dir: &PathBuf, counties: &str, cities: &str) -> CsvReferenceData {
    let counties_path = dir.join("counties.csv");
    let cities_path = dir.join("cities.csv");
    fs::write(&counties_path, counties).expect("write counties");
    fs::write(&cities_path, cities).expect("write cities");
    CsvReferenceData::new(counties_path, cities_path)
}

#[test]
fn csv_tables_keep_codes_and_trim_cities() {
    let dir = temp_dir("csv_ok");
    let provider = write_tables(
        &dir,
        "county_code,county\n001,Adams\n005,Bond\n",
        "county_code,cities\n001, Quincy ;Camp Point;;\n005,Greenville\n",
    );

    let counties = provider.list_counties().expect("counties");
    assert_eq!(
        counties,
        vec![
            ("001".to_string(), "Adams".to_string()),
            ("005".to_string(), "Bond".to_string())
        ]
    );
    let cities = provider.list_cities().expect("cities");
    assert_eq!(cities["001"], vec!["Quincy", "Camp Point"]);

    let index = ReferenceIndex::build(&provider).expect("index");
    assert_eq!(index.counties().len(), 2);
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn county_without_cities_is_a_configuration_error() {
    let dir = temp_dir("csv_missing_city");
    let provider = write_tables(
        &dir,
        "county_code,county\n001,Adams\n005,Bond\n",
        "county_code,cities\n001,Quincy\n",
    );
    let err = ReferenceIndex::build(&provider).expect_err("Bond has no cities");
    assert!(matches!(err, GenerationError::Config(ref message) if message.contains("005")));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_table_is_a_configuration_error() {
    let provider = CsvReferenceData::new("/nonexistent/counties.csv", "/nonexistent/cities.csv");
    let err = ReferenceIndex::build(&provider).expect_err("missing files");
    assert!(matches!(err, GenerationError::Config(_)));
}

#[test]
fn malformed_row_surfaces_csv_error() {
    let dir = temp_dir("csv_malformed");
    let provider = write_tables(
        &dir,
        "county_code,county\n001,Adams,extra\n",
        "county_code,cities\n001,Quincy\n",
    );
    assert!(ReferenceIndex::build(&provider).is_err());
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn single_city_county_pins_birth_city() {
    let provider = StaticReferenceData::new()
        .with_county("005", "Bond", &["Greenville"])
        .with_county("019", "Champaign", &["Champaign", "Urbana", "Rantoul"]);
    let reference = ReferenceIndex::build(&provider).expect("index");

    let engine = GenerationEngine::new(GenerateOptions {
        out_dir: temp_dir("unused"),
        config: TreeConfig {
            tree_depth_limit: 3,
            ..TreeConfig::default()
        },
    });
    let generated = engine.generate(&reference).expect("generate");

    let mut bond_births = 0;
    for person in generated.document.tree.people.values() {
        if person.birth_county_code == "005" {
            bond_births += 1;
            assert_eq!(person.birth_county, "Bond");
            assert_eq!(person.birth_city, "Greenville");
        }
        if person.death_county_code == "005" {
            assert_eq!(person.death_city, "Greenville");
        }
    }
    assert!(bond_births > 0);
    fs::remove_dir_all(&engine.options().out_dir).ok();
}
