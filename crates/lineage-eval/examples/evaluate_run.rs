use std::env;
use std::path::PathBuf;

use lineage_eval::{EvaluateOptions, EvaluationEngine, load_document};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let mut run_dir: Option<PathBuf> = None;
    let mut strict = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--run" => run_dir = args.next().map(PathBuf::from),
            "--strict" => strict = true,
            _ => {
                if run_dir.is_none() {
                    run_dir = Some(PathBuf::from(arg));
                } else {
                    return Err("unexpected argument".into());
                }
            }
        }
    }

    let run_dir = run_dir.ok_or("missing --run directory")?;
    let document = load_document(&run_dir.join("family_tree.json"))?;

    let options = EvaluateOptions {
        strict,
        ..EvaluateOptions::default()
    };
    let engine = EvaluationEngine::new(options);
    let result = engine.run(&document, &run_dir)?;

    println!("metrics_path={}", result.metrics_path.display());
    println!("report_path={}", result.report_path.display());
    println!("violations={}", result.violations.len());
    Ok(())
}
