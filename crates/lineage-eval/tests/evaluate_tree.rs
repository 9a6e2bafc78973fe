use std::fs;
use std::path::PathBuf;

use lineage_core::{PersonId, Sex};
use lineage_eval::{EvalError, EvaluateOptions, EvaluationEngine, load_document};
use lineage_generate::{
    BundledReferenceData, GenerateOptions, GenerationEngine, ReferenceIndex, TreeConfig,
};

fn temp_out_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("lineage_eval_{label}_{}", uuid::Uuid::new_v4()))
}

fn generated_run(label: &str, config: TreeConfig) -> (PathBuf, PathBuf) {
    let out_dir = temp_out_dir(label);
    let reference = ReferenceIndex::build(&BundledReferenceData::new()).expect("reference");
    let engine = GenerationEngine::new(GenerateOptions {
        out_dir: out_dir.clone(),
        config,
    });
    let result = engine.run(&reference).expect("generate");
    (out_dir, result.document_path)
}

#[test]
fn generated_tree_has_no_violations() {
    let (out_dir, document_path) = generated_run("clean", TreeConfig::default());
    let run_dir = document_path.parent().expect("run dir").to_path_buf();
    let document = load_document(&document_path).expect("load document");

    let engine = EvaluationEngine::new(EvaluateOptions {
        write_violations: true,
        ..EvaluateOptions::default()
    });
    let result = engine.run(&document, &run_dir).expect("strict evaluation");

    assert!(result.violations.is_empty());
    assert!(result.metrics_path.exists());
    assert!(result.report_path.exists());
    assert!(result.violations_path.as_ref().is_some_and(|path| path.exists()));

    let metrics = &result.metrics;
    assert_eq!(metrics.population.total_people, document.meta.total_people);
    assert_eq!(
        metrics.population.male + metrics.population.female + metrics.population.unknown,
        metrics.population.total_people
    );
    assert!(metrics.generations.keys().all(|generation| *generation <= 6));
    assert!(metrics.child_clusters.max_size <= 10);
    // Terminal clusters and unexpanded partners are parentless without
    // being violations; partnered couples beyond the seed pair may be childless.
    assert!(metrics.population.lineage_roots > 0);
    assert!(metrics.child_clusters.childless_couples > 1);
    assert!(metrics.ages.min >= 0 && metrics.ages.max <= 115);
    assert_ne!(metrics.run_id, "unknown");
    assert!(result.report.contains("# Lineage Evaluation Report"));

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn tampered_document_reports_violations() {
    let (out_dir, document_path) = generated_run("tampered", TreeConfig::default());
    let mut document = load_document(&document_path).expect("load document");

    let unknown = document
        .tree
        .people
        .values()
        .find(|person| !person.is_married && person.children.is_empty())
        .map(|person| person.id)
        .expect("an unmarried person");
    {
        let person = document.tree.people.get_mut(&unknown).expect("person");
        person.sex = Sex::Unknown;
        person.generation = 99;
        person.death_date = person.birth_date.pred_opt().expect("day before");
    }
    document.meta.total_people += 1;
    document.meta.seed_parent_ids.push(PersonId::new(999_999));

    let engine = EvaluationEngine::new(EvaluateOptions {
        strict: false,
        out_dir: Some(out_dir.join("eval")),
        ..EvaluateOptions::default()
    });
    let result = engine
        .run(&document, document_path.parent().expect("run dir"))
        .expect("lenient evaluation");

    let codes: Vec<&str> = result.violations.iter().map(|v| v.code.as_str()).collect();
    for expected in [
        "death_before_birth",
        "death_outside_age_year",
        "generation_above_depth_limit",
        "total_people_mismatch",
        "unknown_meta_person",
    ] {
        assert!(codes.contains(&expected), "missing {expected} in {codes:?}");
    }
    assert!(result.report.contains("## Top violations"));
    assert!(result.out_dir.ends_with("eval"));

    let strict = EvaluationEngine::new(EvaluateOptions {
        out_dir: Some(out_dir.join("eval_strict")),
        ..EvaluateOptions::default()
    });
    let err = strict
        .run(&document, &out_dir)
        .expect_err("strict evaluation fails");
    assert!(matches!(err, EvalError::Violations(n) if n == result.violations.len() as u64));

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn unknown_sex_parent_is_flagged() {
    let (out_dir, document_path) = generated_run("unknown_parent", TreeConfig::default());
    let mut document = load_document(&document_path).expect("load document");

    let parent = document
        .tree
        .people
        .values()
        .find(|person| !person.children.is_empty())
        .map(|person| person.id)
        .expect("a parent");
    document
        .tree
        .people
        .get_mut(&parent)
        .expect("parent")
        .sex = Sex::Unknown;

    let engine = EvaluationEngine::new(EvaluateOptions {
        strict: false,
        ..EvaluateOptions::default()
    });
    let (metrics, violations) = engine.evaluate(&document);
    assert!(
        violations
            .iter()
            .any(|v| v.code == "unknown_sex_partnered" && v.subject == parent.to_string())
    );
    assert_eq!(metrics.checks.partnering.violations, 1);

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn foreign_document_version_is_rejected() {
    let (out_dir, document_path) = generated_run("version", TreeConfig {
        tree_depth_limit: 2,
        ..TreeConfig::default()
    });
    let mut raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&document_path).expect("read")).expect("json");
    raw["meta"]["document_version"] = serde_json::Value::from("9.9");
    let edited = out_dir.join("edited.json");
    fs::write(&edited, serde_json::to_vec_pretty(&raw).expect("encode")).expect("write");

    let err = load_document(&edited).expect_err("unsupported version");
    assert!(matches!(err, EvalError::InvalidDocument(ref message) if message.contains("9.9")));

    fs::remove_dir_all(&out_dir).ok();
}
