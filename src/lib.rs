//! tutorlint - Structural consistency checker for Markdown tutorials
//!
//! This library loads tutorial documents into a read-only block model and
//! reports findings about their structure: examples without output, repeated
//! titles, skipped heading levels and unclosed code fences.

pub mod checker;
pub mod cli;
pub mod corpus;
pub mod document;
pub mod error;
pub mod report;
pub mod rules;

/// Re-export commonly used types
pub use checker::{CheckCache, Checker};
pub use corpus::LintConfig;
pub use document::{load_document, Block, BlockKind, CodeBlock, Document, Heading, HeadingLevel};
pub use error::{Error, Result};
pub use report::Report;
pub use rules::{validate, Finding, RuleSet, Severity, Validation};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "tutorlint";
