//! Core contracts for Lineage.
//!
//! This crate defines the person and marriage records, the family-tree store
//! shared by the generator and evaluator, the serialized output document, and
//! structural integrity validation.

pub mod document;
pub mod error;
pub mod marriage;
pub mod person;
pub mod tree;
pub mod validation;

pub use document::{FamilyTreeDocument, TreeMeta};
pub use error::{Error, Result};
pub use marriage::{Marriage, MarriageKey};
pub use person::{Person, PersonId, Place, Sex};
pub use tree::FamilyTree;
pub use validation::{TreeIssue, tree_issues, validate_tree};

/// Current contract version for `family_tree.json` artifacts.
pub const DOCUMENT_VERSION: &str = "0.1";
