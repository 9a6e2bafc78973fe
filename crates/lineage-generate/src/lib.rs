//! Synthetic family-tree generator for Lineage.
//!
//! Starting from two seed parents and a root sibling cluster, the expander
//! recursively adds parents, the parents' siblings, and partners with their
//! own children and siblings, bounded by a vertical depth limit and a
//! sideways (sibling-partner) depth limit. All randomness flows through one
//! seeded [`RandomSource`](random::RandomSource), so a fixed seed reproduces
//! the same tree byte for byte.

pub mod assets;
pub mod context;
pub mod dates;
pub mod engine;
pub mod errors;
pub mod expand;
pub mod family;
pub mod ids;
pub mod marriage;
pub mod model;
pub mod names;
pub mod output;
pub mod person;
pub mod random;
pub mod reference;

pub use engine::{GeneratedTree, GenerationEngine, GenerationResult};
pub use errors::GenerationError;
pub use model::{GenerateOptions, GenerationReport, TreeConfig};
pub use reference::{
    BundledReferenceData, CsvReferenceData, ReferenceDataProvider, ReferenceIndex,
    StaticReferenceData,
};
