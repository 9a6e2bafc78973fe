//! Evaluation of generated family trees: summary statistics plus a list of
//! rule violations, written as `metrics.json` and `report.md`.

pub mod engine;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod report;

pub use engine::{EvaluationEngine, load_document};
pub use errors::EvalError;
pub use metrics::MetricsReport;
pub use model::{EvaluateOptions, EvaluationResult, Violation};
