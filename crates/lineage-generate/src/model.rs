use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;

/// Hard ceiling on vertical recursion.
pub const MAX_TREE_DEPTH_LIMIT: u32 = 24;
/// Hard ceiling on sideways recursion into partners' siblings.
pub const MAX_SIBLING_PARTNER_DEPTH_LIMIT: u32 = 8;
/// Smallest gap that keeps every parent born before every child.
pub const MIN_GENERATION_GAP_YEARS: i32 = 7;

/// Child count distribution, clamped to `[0, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChildCountModel {
    pub mean: f64,
    pub std_dev: f64,
    pub max: u32,
}

impl Default for ChildCountModel {
    fn default() -> Self {
        Self {
            mean: 2.0,
            std_dev: 1.5,
            max: 10,
        }
    }
}

/// Age-at-death distribution.
///
/// With `clamp` disabled the sampled age is used as is, which can be
/// negative or implausibly large at the tails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgeModel {
    pub mean: f64,
    pub std_dev: f64,
    pub clamp: bool,
    pub min: i32,
    pub max: i32,
}

impl Default for AgeModel {
    fn default() -> Self {
        Self {
            mean: 68.0,
            std_dev: 15.0,
            clamp: true,
            min: 0,
            max: 115,
        }
    }
}

/// Probability of each sex when none is requested; unknown takes the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SexWeights {
    pub male: f64,
    pub female: f64,
}

impl Default for SexWeights {
    fn default() -> Self {
        Self {
            male: 0.49,
            female: 0.49,
        }
    }
}

/// Shape and statistics of a generated tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeConfig {
    pub seed: u64,
    /// Chance that an unmarried, known-sex sibling gets a partner and children.
    pub partner_probability: f64,
    pub child_count: ChildCountModel,
    pub age: AgeModel,
    pub sex: SexWeights,
    /// Maximum number of ancestor generations above the root cluster.
    pub tree_depth_limit: u32,
    /// Maximum nesting of partner-sibling expansions.
    pub sibling_partner_depth_limit: u32,
    /// Birth seed for the two seed parents.
    pub birth_seed_date: NaiveDate,
    /// Years between a parent's and a child's birth seeds.
    pub generation_gap_years: i32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            partner_probability: 0.69,
            child_count: ChildCountModel::default(),
            age: AgeModel::default(),
            sex: SexWeights::default(),
            tree_depth_limit: 6,
            sibling_partner_depth_limit: 3,
            birth_seed_date: NaiveDate::from_ymd_opt(1920, 6, 15).unwrap_or_default(),
            generation_gap_years: 18,
        }
    }
}

impl TreeConfig {
    /// Offset applied to a parent's birth seed to place a child.
    pub fn younger_offset(&self) -> i32 {
        self.generation_gap_years
    }

    /// Offset applied to a child's birth seed to place a parent.
    pub fn older_offset(&self) -> i32 {
        -self.generation_gap_years
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if !(0.0..=1.0).contains(&self.partner_probability) {
            return Err(GenerationError::Config(
                "partner_probability must be within [0, 1]".to_string(),
            ));
        }
        if !self.child_count.mean.is_finite()
            || !self.child_count.std_dev.is_finite()
            || self.child_count.std_dev < 0.0
        {
            return Err(GenerationError::Config(
                "child_count mean/std_dev must be finite with std_dev >= 0".to_string(),
            ));
        }
        if !self.age.mean.is_finite() || !self.age.std_dev.is_finite() || self.age.std_dev < 0.0 {
            return Err(GenerationError::Config(
                "age mean/std_dev must be finite with std_dev >= 0".to_string(),
            ));
        }
        if self.age.clamp && self.age.min > self.age.max {
            return Err(GenerationError::Config(
                "age min must be <= age max".to_string(),
            ));
        }
        if self.sex.male < 0.0 || self.sex.female < 0.0 || self.sex.male + self.sex.female > 1.0 {
            return Err(GenerationError::Config(
                "sex weights must be >= 0 and sum to at most 1".to_string(),
            ));
        }
        if self.tree_depth_limit > MAX_TREE_DEPTH_LIMIT {
            return Err(GenerationError::Config(format!(
                "tree_depth_limit exceeds ceiling of {MAX_TREE_DEPTH_LIMIT}"
            )));
        }
        if self.sibling_partner_depth_limit > MAX_SIBLING_PARTNER_DEPTH_LIMIT {
            return Err(GenerationError::Config(format!(
                "sibling_partner_depth_limit exceeds ceiling of {MAX_SIBLING_PARTNER_DEPTH_LIMIT}"
            )));
        }
        // A partner and a child may each land anywhere in their 4-year windows.
        if self.generation_gap_years < MIN_GENERATION_GAP_YEARS {
            return Err(GenerationError::Config(format!(
                "generation_gap_years must be at least {MIN_GENERATION_GAP_YEARS}"
            )));
        }
        Ok(())
    }
}

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Directory where run artifacts are written.
    pub out_dir: PathBuf,
    pub config: TreeConfig,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("out"),
            config: TreeConfig::default(),
        }
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub seed: u64,
    pub total_people: u64,
    pub total_marriages: u64,
    pub root_cluster_size: u64,
    pub clusters_expanded: u64,
    pub sibling_clusters: u64,
    pub partnerships: u64,
    pub child_clusters: u64,
    pub children_generated: u64,
    pub ages_clamped: u64,
    pub min_generation: i32,
    pub max_generation: i32,
    pub duration_ms: u64,
    pub bytes_written: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl GenerationReport {
    pub fn new(run_id: String, seed: u64) -> Self {
        Self {
            run_id,
            seed,
            ..Self::default()
        }
    }

    pub fn record_cluster_expanded(&mut self) {
        self.clusters_expanded += 1;
    }

    pub fn record_sibling_cluster(&mut self) {
        self.sibling_clusters += 1;
    }

    pub fn record_partnership(&mut self) {
        self.partnerships += 1;
    }

    pub fn record_child_cluster(&mut self, size: usize) {
        self.child_clusters += 1;
        self.children_generated += size as u64;
    }

    pub fn record_age_clamped(&mut self) {
        self.ages_clamped += 1;
    }

    pub fn record_generation(&mut self, generation: i32) {
        self.min_generation = self.min_generation.min(generation);
        self.max_generation = self.max_generation.max(generation);
    }
}
