use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Instant;

use lineage_core::{DOCUMENT_VERSION, FamilyTreeDocument, PersonId, Sex, tree_issues};
use lineage_generate::dates::{MARRIAGE_MAX_AGE, MARRIAGE_MIN_AGE, add_years, death_window};
use lineage_generate::model::GenerationReport;

use crate::errors::EvalError;
use crate::metrics::{
    AgeMetrics, CheckSummary, ChildClusterMetrics, DocumentRef, METRICS_VERSION,
    MetricsReport, PerformanceMetrics, PopulationMetrics,
};
use crate::model::{EvaluateOptions, EvaluationResult, Violation};
use crate::report::render_report;

/// Read a `family_tree.json` document written with the current contract.
pub fn load_document(path: &Path) -> Result<FamilyTreeDocument, EvalError> {
    let contents = std::fs::read_to_string(path)?;
    let document: FamilyTreeDocument = serde_json::from_str(&contents)?;
    if document.meta.document_version != DOCUMENT_VERSION {
        return Err(EvalError::InvalidDocument(format!(
            "{} has document_version {}, expected {DOCUMENT_VERSION}",
            path.display(),
            document.meta.document_version
        )));
    }
    Ok(document)
}

/// Evaluate generated trees against the generator's rules.
#[derive(Debug, Clone)]
pub struct EvaluationEngine {
    options: EvaluateOptions,
}

impl EvaluationEngine {
    pub fn new(options: EvaluateOptions) -> Self {
        Self { options }
    }

    /// Compute metrics and violations without touching the filesystem.
    pub fn evaluate(&self, document: &FamilyTreeDocument) -> (MetricsReport, Vec<Violation>) {
        let total_start = Instant::now();
        let mut violations = Vec::new();
        let mut checks = CheckSummary::default();

        check_structure(document, &mut checks, &mut violations);
        check_dates(document, &mut checks, &mut violations);
        check_limits(document, &mut checks, &mut violations);
        check_partnering(document, &mut checks, &mut violations);
        check_meta(document, &mut checks, &mut violations);
        sort_violations(&mut violations);

        let validate_ms = total_start.elapsed().as_millis();
        let meta = &document.meta;
        let metrics = MetricsReport {
            metrics_version: METRICS_VERSION.to_string(),
            run_id: "unknown".to_string(),
            document: DocumentRef {
                document_version: meta.document_version.clone(),
                seed: meta.seed,
                pcp: meta.pcp,
                ftdl: meta.ftdl,
                spdl: meta.spdl,
                max_children: meta.max_children,
            },
            population: population_metrics(document),
            generations: generation_histogram(document),
            child_clusters: child_cluster_metrics(document),
            ages: age_metrics(document),
            checks,
            performance: PerformanceMetrics {
                validate_ms,
                total_ms: total_start.elapsed().as_millis(),
            },
        };
        (metrics, violations)
    }

    /// Evaluate and write `metrics.json`, `report.md` and optionally
    /// `violations.json` into the output directory, which defaults to
    /// `dataset_dir`.
    pub fn run(
        &self,
        document: &FamilyTreeDocument,
        dataset_dir: &Path,
    ) -> Result<EvaluationResult, EvalError> {
        let total_start = Instant::now();
        let (mut metrics, violations) = self.evaluate(document);
        metrics.run_id = detect_run_id(dataset_dir).unwrap_or_else(|| "unknown".to_string());

        let report = render_report(&metrics, &violations, self.options.max_examples);
        let out_dir = self
            .options
            .out_dir
            .clone()
            .unwrap_or_else(|| dataset_dir.to_path_buf());
        std::fs::create_dir_all(&out_dir)?;

        metrics.performance.total_ms = total_start.elapsed().as_millis();
        let metrics_path = out_dir.join("metrics.json");
        std::fs::write(&metrics_path, serde_json::to_vec_pretty(&metrics)?)?;

        let report_path = out_dir.join("report.md");
        std::fs::write(&report_path, report.as_bytes())?;

        let violations_path = if self.options.write_violations {
            let path = out_dir.join("violations.json");
            std::fs::write(&path, serde_json::to_vec_pretty(&violations)?)?;
            Some(path)
        } else {
            None
        };

        if self.options.strict && !violations.is_empty() {
            return Err(EvalError::Violations(violations.len() as u64));
        }

        Ok(EvaluationResult {
            out_dir,
            metrics_path,
            report_path,
            violations_path,
            metrics,
            report,
            violations,
        })
    }
}

fn check_structure(
    document: &FamilyTreeDocument,
    checks: &mut CheckSummary,
    violations: &mut Vec<Violation>,
) {
    let tree = &document.tree;
    let issues = tree_issues(tree);
    checks.structure.checked += (tree.people.len() + tree.marriages.len()) as u64;
    checks.structure.violations += issues.len() as u64;
    violations.extend(
        issues
            .into_iter()
            .map(|issue| Violation::new(&issue.code, issue.subject, issue.message)),
    );
}

fn check_dates(
    document: &FamilyTreeDocument,
    checks: &mut CheckSummary,
    violations: &mut Vec<Violation>,
) {
    let tree = &document.tree;
    for person in tree.people.values() {
        let in_window = match death_window(person.birth_date, person.age) {
            Ok((start, end)) => person.death_date >= start && person.death_date <= end,
            Err(_) => false,
        };
        checks.dates.record(in_window);
        if !in_window {
            violations.push(Violation::new(
                "death_outside_age_year",
                person.id,
                format!(
                    "death {} is not in the age-{} year after birth {}",
                    person.death_date, person.age, person.birth_date
                ),
            ));
        }
    }

    for (key, marriage) in &tree.marriages {
        let (Some(first), Some(second)) = (
            tree.people.get(&marriage.spouse1),
            tree.people.get(&marriage.spouse2),
        ) else {
            // Dangling spouses are reported by the structural checks.
            continue;
        };
        let younger = first.birth_date.max(second.birth_date);
        let in_range = match (
            add_years(younger, MARRIAGE_MIN_AGE),
            add_years(younger, MARRIAGE_MAX_AGE),
        ) {
            (Ok(earliest), Ok(latest)) => {
                marriage.marriage_date >= earliest && marriage.marriage_date <= latest
            }
            _ => false,
        };
        checks.dates.record(in_range);
        if !in_range {
            violations.push(Violation::new(
                "marriage_date_out_of_range",
                key,
                format!(
                    "married {} outside ages {MARRIAGE_MIN_AGE}-{MARRIAGE_MAX_AGE} of the younger spouse born {younger}",
                    marriage.marriage_date
                ),
            ));
        }
    }
}

fn check_limits(
    document: &FamilyTreeDocument,
    checks: &mut CheckSummary,
    violations: &mut Vec<Violation>,
) {
    let meta = &document.meta;
    for person in document.tree.people.values() {
        let within_depth = person.generation <= meta.ftdl as i32;
        checks.limits.record(within_depth);
        if !within_depth {
            violations.push(Violation::new(
                "generation_above_depth_limit",
                person.id,
                format!("generation {} exceeds ftdl {}", person.generation, meta.ftdl),
            ));
        }

        let within_children = person.children.len() as u64 <= u64::from(meta.max_children);
        checks.limits.record(within_children);
        if !within_children {
            violations.push(Violation::new(
                "too_many_children",
                person.id,
                format!(
                    "{} children exceed max_children {}",
                    person.children.len(),
                    meta.max_children
                ),
            ));
        }
    }
}

fn check_partnering(
    document: &FamilyTreeDocument,
    checks: &mut CheckSummary,
    violations: &mut Vec<Violation>,
) {
    for person in document.tree.people.values() {
        if person.sex != Sex::Unknown {
            continue;
        }
        let unpartnered = !person.is_married && person.children.is_empty();
        checks.partnering.record(unpartnered);
        if !unpartnered {
            violations.push(Violation::new(
                "unknown_sex_partnered",
                person.id,
                "unknown-sex person is married or has children",
            ));
        }
    }
}

fn check_meta(
    document: &FamilyTreeDocument,
    checks: &mut CheckSummary,
    violations: &mut Vec<Violation>,
) {
    let meta = &document.meta;
    let tree = &document.tree;

    let people_match = meta.total_people == tree.people.len() as u64;
    checks.meta.record(people_match);
    if !people_match {
        violations.push(Violation::new(
            "total_people_mismatch",
            "meta",
            format!(
                "meta reports {} people, document holds {}",
                meta.total_people,
                tree.people.len()
            ),
        ));
    }

    let marriages_match = meta.total_marriages == tree.marriages.len() as u64;
    checks.meta.record(marriages_match);
    if !marriages_match {
        violations.push(Violation::new(
            "total_marriages_mismatch",
            "meta",
            format!(
                "meta reports {} marriages, document holds {}",
                meta.total_marriages,
                tree.marriages.len()
            ),
        ));
    }

    let root_present = !meta.root_cluster_child_ids.is_empty();
    checks.meta.record(root_present);
    if !root_present {
        violations.push(Violation::new(
            "empty_root_cluster",
            "meta",
            "root cluster lists no children",
        ));
    }

    for id in meta
        .seed_parent_ids
        .iter()
        .chain(meta.root_cluster_child_ids.iter())
    {
        let known = tree.people.contains_key(id);
        checks.meta.record(known);
        if !known {
            violations.push(Violation::new(
                "unknown_meta_person",
                id,
                "listed in meta but missing from people",
            ));
        }
    }
}

fn population_metrics(document: &FamilyTreeDocument) -> PopulationMetrics {
    let seed_parents: BTreeSet<PersonId> = document.meta.seed_parent_ids.iter().copied().collect();
    let mut metrics = PopulationMetrics {
        total_people: document.tree.people.len() as u64,
        couples: document.tree.marriages.len() as u64,
        root_cluster_size: document.meta.root_cluster_child_ids.len() as u64,
        ..PopulationMetrics::default()
    };
    for person in document.tree.people.values() {
        match person.sex {
            Sex::Male => metrics.male += 1,
            Sex::Female => metrics.female += 1,
            Sex::Unknown => metrics.unknown += 1,
        }
        if person.is_married {
            metrics.married += 1;
        }
        if !person.has_parents() && !seed_parents.contains(&person.id) {
            metrics.lineage_roots += 1;
        }
    }
    metrics
}

fn generation_histogram(document: &FamilyTreeDocument) -> BTreeMap<i32, u64> {
    let mut histogram = BTreeMap::new();
    for person in document.tree.people.values() {
        *histogram.entry(person.generation).or_insert(0) += 1;
    }
    histogram
}

fn child_cluster_metrics(document: &FamilyTreeDocument) -> ChildClusterMetrics {
    let tree = &document.tree;
    let mut clusters: BTreeMap<(PersonId, PersonId), u64> = BTreeMap::new();
    for person in tree.people.values() {
        if let (Some(mother), Some(father)) = (person.mother, person.father) {
            *clusters.entry((mother, father)).or_insert(0) += 1;
        }
    }

    let mut metrics = ChildClusterMetrics {
        clusters: clusters.len() as u64,
        ..ChildClusterMetrics::default()
    };
    for marriage in tree.marriages.values() {
        let (a, b) = (marriage.spouse1, marriage.spouse2);
        if !clusters.contains_key(&(a, b)) && !clusters.contains_key(&(b, a)) {
            metrics.childless_couples += 1;
        }
    }
    if clusters.is_empty() {
        return metrics;
    }

    let mut total = 0_u64;
    metrics.min_size = u64::MAX;
    for size in clusters.values().copied() {
        total += size;
        metrics.min_size = metrics.min_size.min(size);
        metrics.max_size = metrics.max_size.max(size);
        *metrics.histogram.entry(size).or_insert(0) += 1;
    }
    metrics.mean_size = total as f64 / clusters.len() as f64;
    metrics
}

fn age_metrics(document: &FamilyTreeDocument) -> AgeMetrics {
    let ages: Vec<i32> = document.tree.people.values().map(|p| p.age).collect();
    if ages.is_empty() {
        return AgeMetrics::default();
    }
    let sum: i64 = ages.iter().map(|age| i64::from(*age)).sum();
    AgeMetrics {
        min: ages.iter().copied().min().unwrap_or_default(),
        max: ages.iter().copied().max().unwrap_or_default(),
        mean: sum as f64 / ages.len() as f64,
    }
}

fn detect_run_id(dataset_dir: &Path) -> Option<String> {
    let report_path = dataset_dir.join("generation_report.json");
    if let Ok(contents) = std::fs::read_to_string(report_path)
        && let Ok(report) = serde_json::from_str::<GenerationReport>(&contents)
        && !report.run_id.is_empty()
    {
        return Some(report.run_id);
    }

    let name = dataset_dir.file_name()?.to_string_lossy();
    name.split_once("__run_")
        .map(|(_, run_part)| run_part.to_string())
}

fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| (&a.subject, &a.code).cmp(&(&b.subject, &b.code)));
}
