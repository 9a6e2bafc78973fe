use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metrics contract version for tree evaluation.
pub const METRICS_VERSION: &str = "0.1";

/// Machine-readable metrics for a tree evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    pub metrics_version: String,
    pub run_id: String,
    pub document: DocumentRef,
    pub population: PopulationMetrics,
    /// People per generation index (root cluster = 0).
    pub generations: BTreeMap<i32, u64>,
    pub child_clusters: ChildClusterMetrics,
    pub ages: AgeMetrics,
    pub checks: CheckSummary,
    pub performance: PerformanceMetrics,
}

/// Generation parameters copied from the document's `meta` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRef {
    pub document_version: String,
    pub seed: u64,
    pub pcp: f64,
    pub ftdl: u32,
    pub spdl: u32,
    pub max_children: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopulationMetrics {
    pub total_people: u64,
    pub male: u64,
    pub female: u64,
    pub unknown: u64,
    pub married: u64,
    pub couples: u64,
    pub root_cluster_size: u64,
    /// People without parents, other than the seed parents.
    pub lineage_roots: u64,
}

/// Sizes of sibling groups sharing a mother and a father.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChildClusterMetrics {
    pub clusters: u64,
    pub childless_couples: u64,
    pub min_size: u64,
    pub max_size: u64,
    pub mean_size: f64,
    pub histogram: BTreeMap<u64, u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgeMetrics {
    pub min: i32,
    pub max: i32,
    pub mean: f64,
}

/// Number of checks run and violations found, by rule family.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckSummary {
    pub structure: CheckStats,
    pub dates: CheckStats,
    pub limits: CheckStats,
    pub partnering: CheckStats,
    pub meta: CheckStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckStats {
    pub checked: u64,
    pub violations: u64,
}

impl CheckStats {
    pub fn record(&mut self, passed: bool) {
        self.checked += 1;
        if !passed {
            self.violations += 1;
        }
    }

    pub fn total_violations(summary: &CheckSummary) -> u64 {
        summary.structure.violations
            + summary.dates.violations
            + summary.limits.violations
            + summary.partnering.violations
            + summary.meta.violations
    }
}

/// Performance timings for the evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub validate_ms: u128,
    pub total_ms: u128,
}
