use std::env;
use std::path::PathBuf;

use lineage_generate::{
    BundledReferenceData, CsvReferenceData, GenerateOptions, GenerationEngine,
    ReferenceDataProvider, ReferenceIndex,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut seed: Option<u64> = None;
    let mut counties: Option<PathBuf> = None;
    let mut cities: Option<PathBuf> = None;
    let mut out_dir: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => seed = args.next().map(|value| value.parse()).transpose()?,
            "--counties" => counties = args.next().map(PathBuf::from),
            "--cities" => cities = args.next().map(PathBuf::from),
            "--out" => out_dir = args.next().map(PathBuf::from),
            _ => return Err(format!("unexpected argument '{arg}'").into()),
        }
    }

    let provider: Box<dyn ReferenceDataProvider> = match (counties, cities) {
        (Some(counties), Some(cities)) => Box::new(CsvReferenceData::new(counties, cities)),
        (None, None) => Box::new(BundledReferenceData::new()),
        _ => return Err("--counties and --cities must be given together".into()),
    };
    let reference = ReferenceIndex::build(provider.as_ref())?;

    let mut options = GenerateOptions::default();
    if let Some(seed) = seed {
        options.config.seed = seed;
    }
    if let Some(out_dir) = out_dir {
        options.out_dir = out_dir;
    }

    let engine = GenerationEngine::new(options);
    let result = engine.run(&reference)?;

    println!("run_dir={}", result.run_dir.display());
    println!("total_people={}", result.report.total_people);
    Ok(())
}
