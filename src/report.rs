//! Aggregated findings of a run

use crate::rules::{Finding, Severity};
use serde::Serialize;

/// Findings of a run, sorted by path, line and rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Number of documents checked
    pub documents: usize,
    pub errors: usize,
    pub warnings: usize,
    pub findings: Vec<Finding>,
}

impl Report {
    pub fn new(documents: usize, mut findings: Vec<Finding>) -> Self {
        findings.sort_by(|a, b| {
            (&a.path, a.line, a.rule, &a.message).cmp(&(&b.path, b.line, b.rule, &b.message))
        });

        let errors = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count();

        Self {
            documents,
            errors,
            warnings: findings.len() - errors,
            findings,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// `1` when any error-severity finding exists, `0` otherwise
    pub fn exit_code(&self) -> u8 {
        if self.has_errors() {
            1
        } else {
            0
        }
    }

    /// One `<path>:<line>: <severity>: <message>` line per finding
    pub fn to_text(&self) -> String {
        self.findings
            .iter()
            .map(|finding| format!("{}\n", finding))
            .collect()
    }
}
