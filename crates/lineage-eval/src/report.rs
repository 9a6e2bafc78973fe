use crate::metrics::{CheckStats, CheckSummary, MetricsReport};
use crate::model::Violation;

/// Render a deterministic markdown report from metrics and violations.
pub fn render_report(
    metrics: &MetricsReport,
    violations: &[Violation],
    max_examples: usize,
) -> String {
    let mut lines = Vec::new();

    lines.push("# Lineage Evaluation Report".to_string());
    lines.push(String::new());
    lines.push("## Run summary".to_string());
    lines.push(format!("- run_id: {}", metrics.run_id));
    lines.push(format!(
        "- document_version: {}",
        metrics.document.document_version
    ));
    lines.push(format!("- seed: {}", metrics.document.seed));
    lines.push(format!(
        "- pcp: {} / ftdl: {} / spdl: {} / max_children: {}",
        metrics.document.pcp,
        metrics.document.ftdl,
        metrics.document.spdl,
        metrics.document.max_children
    ));
    lines.push(String::new());

    let population = &metrics.population;
    lines.push("## Population".to_string());
    lines.push("| metric | value |".to_string());
    lines.push("| --- | --- |".to_string());
    for (name, value) in [
        ("total_people", population.total_people),
        ("male", population.male),
        ("female", population.female),
        ("unknown", population.unknown),
        ("married", population.married),
        ("couples", population.couples),
        ("root_cluster_size", population.root_cluster_size),
        ("lineage_roots", population.lineage_roots),
    ] {
        lines.push(format!("| {name} | {value} |"));
    }
    lines.push(String::new());

    lines.push("## Generations".to_string());
    lines.push("| generation | people |".to_string());
    lines.push("| --- | --- |".to_string());
    for (generation, count) in metrics.generations.iter().rev() {
        lines.push(format!("| {generation} | {count} |"));
    }
    lines.push(String::new());

    let clusters = &metrics.child_clusters;
    lines.push("## Child clusters".to_string());
    lines.push(format!(
        "- clusters: {} (childless couples: {})",
        clusters.clusters, clusters.childless_couples
    ));
    lines.push(format!(
        "- size min/mean/max: {}/{:.2}/{}",
        clusters.min_size, clusters.mean_size, clusters.max_size
    ));
    for (size, count) in &clusters.histogram {
        lines.push(format!("  - {size} children: {count}"));
    }
    lines.push(format!(
        "- age at death min/mean/max: {}/{:.1}/{}",
        metrics.ages.min, metrics.ages.mean, metrics.ages.max
    ));
    lines.push(String::new());

    lines.push("## Check summary".to_string());
    lines.push("| family | checked | violations |".to_string());
    lines.push("| --- | --- | --- |".to_string());
    push_check_row(&mut lines, "structure", &metrics.checks.structure);
    push_check_row(&mut lines, "dates", &metrics.checks.dates);
    push_check_row(&mut lines, "limits", &metrics.checks.limits);
    push_check_row(&mut lines, "partnering", &metrics.checks.partnering);
    push_check_row(&mut lines, "meta", &metrics.checks.meta);
    lines.push(String::new());

    if !violations.is_empty() {
        lines.push("## Top violations".to_string());
        for violation in violations.iter().take(max_examples) {
            lines.push(format!(
                "- {} [{}]: {}",
                violation.subject, violation.code, violation.message
            ));
        }
        if violations.len() > max_examples {
            lines.push(format!("- ... {} more", violations.len() - max_examples));
        }
        lines.push(String::new());
    }

    lines.push("## Recommendations".to_string());
    lines.extend(recommendations(&metrics.checks, violations));
    lines.join("\n")
}

fn push_check_row(lines: &mut Vec<String>, name: &str, stats: &CheckStats) {
    lines.push(format!(
        "| {} | {} | {} |",
        name, stats.checked, stats.violations
    ));
}

fn recommendations(checks: &CheckSummary, violations: &[Violation]) -> Vec<String> {
    let mut lines = Vec::new();
    if checks.structure.violations > 0 {
        lines.push("- the document was edited or produced by another tool; regenerate it.".to_string());
    }
    if checks.dates.violations > 0 {
        lines.push("- enable age clamping so every death falls in its age-year.".to_string());
    }
    if checks.limits.violations > 0 {
        lines.push("- lower tree_depth_limit or child_count.max to match meta.".to_string());
    }
    if checks.partnering.violations > 0 {
        lines.push("- unknown-sex people must be skipped by the partnering pass.".to_string());
    }
    if checks.meta.violations > 0 {
        lines.push("- meta totals disagree with the document body.".to_string());
    }
    if CheckStats::total_violations(checks) == 0 && violations.is_empty() {
        lines.push("- no violations detected; compare metrics across seeds for drift.".to_string());
    }
    lines
}
