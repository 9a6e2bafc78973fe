use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::metrics::MetricsReport;

/// Options for tree evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateOptions {
    /// Fail when any violation is found.
    pub strict: bool,
    /// Limit the number of violations listed in the report.
    pub max_examples: usize,
    /// Emit violations.json with the full list of violations.
    pub write_violations: bool,
    /// Optional output directory override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self {
            strict: true,
            max_examples: 20,
            write_violations: false,
            out_dir: None,
        }
    }
}

/// Structured violation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub code: String,
    /// Person id or marriage key, or `meta` for document-level checks.
    pub subject: String,
    pub message: String,
}

impl Violation {
    pub fn new(code: &str, subject: impl ToString, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            subject: subject.to_string(),
            message: message.into(),
        }
    }
}

/// Result of a tree evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    pub out_dir: PathBuf,
    pub metrics_path: PathBuf,
    pub report_path: PathBuf,
    pub violations_path: Option<PathBuf>,
    pub metrics: MetricsReport,
    pub report: String,
    pub violations: Vec<Violation>,
}
