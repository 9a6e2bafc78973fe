use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::person::PersonId;
use crate::tree::FamilyTree;

/// Generation parameters and summary counts recorded with a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TreeMeta {
    pub document_version: String,
    /// Partner-with-children probability.
    pub pcp: f64,
    /// Child count distribution mean.
    pub cd_mean: f64,
    /// Child count distribution standard deviation.
    pub cd_sd: f64,
    pub max_children: u32,
    /// Family tree depth limit.
    pub ftdl: u32,
    /// Sibling-partner depth limit.
    pub spdl: u32,
    pub seed: u64,
    pub seed_parent_ids: Vec<PersonId>,
    pub root_cluster_child_ids: Vec<PersonId>,
    pub total_people: u64,
    pub total_marriages: u64,
}

/// Serialized output of a generation run (`family_tree.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FamilyTreeDocument {
    pub meta: TreeMeta,
    #[serde(flatten)]
    pub tree: FamilyTree,
}

impl FamilyTreeDocument {
    pub fn new(meta: TreeMeta, tree: FamilyTree) -> Self {
        Self { meta, tree }
    }
}
