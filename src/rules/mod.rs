//! Structural validation of tutorial documents
//!
//! Document rules look at one document at a time. Collection rules look
//! across every document discovered from one input path.

mod collection;
mod fence;
mod headings;
mod output;

pub use collection::DuplicateTitleRule;
pub use fence::UnclosedFenceRule;
pub use headings::{DuplicateHeadingRule, HeadingIncrementRule};
pub use output::MissingOutputRule;

use crate::corpus::LintConfig;
use crate::document::Document;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Severity level of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A structural observation about a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Name of the rule that produced it
    pub rule: &'static str,
    pub severity: Severity,
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    pub message: String,
}

impl Finding {
    pub fn new(
        rule: &'static str,
        severity: Severity,
        path: &Path,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule,
            severity,
            path: path.to_path_buf(),
            line,
            message: message.into(),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.path.display(),
            self.line,
            self.severity,
            self.message
        )
    }
}

/// Trait for per-document rules
pub trait Rule: Send + Sync {
    /// Rule name, used in configuration and reports
    fn name(&self) -> &'static str;

    /// Severity used unless configuration overrides it
    fn default_severity(&self) -> Severity;

    /// Check a single document
    fn check(&self, document: &Document) -> Vec<Finding>;
}

/// Trait for rules spanning a collection of documents
pub trait CollectionRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn default_severity(&self) -> Severity;

    fn check(&self, documents: &[&Document]) -> Vec<Finding>;
}

struct Configured<R: ?Sized> {
    severity: Severity,
    rule: Box<R>,
}

/// The enabled rules of a run, with their effective severities
pub struct RuleSet {
    document_rules: Vec<Configured<dyn Rule>>,
    collection_rules: Vec<Configured<dyn CollectionRule>>,
    strict: bool,
}

impl RuleSet {
    /// Build the rule set described by a configuration
    pub fn from_config(config: &LintConfig) -> Self {
        let document_rules: Vec<Box<dyn Rule>> = vec![
            Box::new(MissingOutputRule::from_config(config)),
            Box::new(DuplicateHeadingRule),
            Box::new(HeadingIncrementRule::new(config.max_heading_step)),
            Box::new(UnclosedFenceRule),
        ];
        let collection_rules: Vec<Box<dyn CollectionRule>> = vec![Box::new(DuplicateTitleRule)];

        let document_rules: Vec<Configured<dyn Rule>> = document_rules
            .into_iter()
            .filter_map(|rule| {
                let overrides = config.rule(rule.name());
                overrides.enabled.then(|| Configured {
                    severity: overrides.severity.unwrap_or_else(|| rule.default_severity()),
                    rule,
                })
            })
            .collect();

        let collection_rules: Vec<Configured<dyn CollectionRule>> = collection_rules
            .into_iter()
            .filter_map(|rule| {
                let overrides = config.rule(rule.name());
                overrides.enabled.then(|| Configured {
                    severity: overrides.severity.unwrap_or_else(|| rule.default_severity()),
                    rule,
                })
            })
            .collect();

        Self {
            document_rules,
            collection_rules,
            strict: config.strict,
        }
    }

    /// Escalate every warning to an error
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Names of the enabled rules, in evaluation order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.document_rules
            .iter()
            .map(|c| c.rule.name())
            .chain(self.collection_rules.iter().map(|c| c.rule.name()))
            .collect()
    }

    /// Validate one document
    pub fn validate<'a>(&'a self, document: &'a Document) -> Validation<'a> {
        Validation {
            rules: self,
            document,
        }
    }

    /// Run the collection rules over the documents of one input path
    pub fn validate_collection(&self, documents: &[&Document]) -> Vec<Finding> {
        self.collection_rules
            .iter()
            .flat_map(|configured| {
                let severity = self.effective(configured.severity);
                configured
                    .rule
                    .check(documents)
                    .into_iter()
                    .map(move |finding| finding.with_severity(severity))
            })
            .collect()
    }

    fn effective(&self, severity: Severity) -> Severity {
        if self.strict {
            Severity::Error
        } else {
            severity
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::from_config(&LintConfig::default())
    }
}

/// Validate one document against a rule set
pub fn validate<'a>(rules: &'a RuleSet, document: &'a Document) -> Validation<'a> {
    rules.validate(document)
}

/// Boxed iterator over the findings of one validation pass
pub type Findings<'a> = Box<dyn Iterator<Item = Finding> + 'a>;

/// Lazy validation of a single document
///
/// Rules run only as findings are pulled. The sequence is finite and can be
/// restarted by calling [`Validation::iter`] again; every pass yields the
/// same findings.
#[derive(Clone, Copy)]
pub struct Validation<'a> {
    rules: &'a RuleSet,
    document: &'a Document,
}

impl<'a> Validation<'a> {
    /// Start a fresh pass over the findings
    pub fn iter(&self) -> Findings<'a> {
        let rules = self.rules;
        let document = self.document;

        Box::new(rules.document_rules.iter().flat_map(move |configured| {
            let severity = rules.effective(configured.severity);
            tracing::trace!("Running rule {} on {:?}", configured.rule.name(), document.path());
            configured
                .rule
                .check(document)
                .into_iter()
                .map(move |finding| finding.with_severity(severity))
        }))
    }
}

impl<'a> IntoIterator for Validation<'a> {
    type Item = Finding;
    type IntoIter = Findings<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"# Signals

```cpp
emit valueChanged(42);
```

# Signals

## Output

Nothing.
"#;

    #[test]
    fn test_validation_is_restartable() {
        let rules = RuleSet::default();
        let doc = Document::parse("signals.md", EXAMPLE);
        let validation = rules.validate(&doc);

        let first: Vec<Finding> = validation.iter().collect();
        let second: Vec<Finding> = validation.into_iter().collect();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_strict_escalates_warnings() {
        let doc = Document::parse("a.md", "# A\n\n```cpp\nfoo();\n```\n");

        let lenient = RuleSet::default();
        let findings: Vec<Finding> = lenient.validate(&doc).iter().collect();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);

        let strict = RuleSet::default().strict(true);
        let findings: Vec<Finding> = strict.validate(&doc).iter().collect();
        assert_eq!(findings[0].severity, Severity::Error);
    }

    #[test]
    fn test_config_disables_and_overrides() {
        let mut config = LintConfig::default();
        config.rules.insert(
            "duplicate-heading".to_string(),
            crate::corpus::RuleConfig {
                enabled: false,
                severity: None,
            },
        );
        config.rules.insert(
            "missing-output".to_string(),
            crate::corpus::RuleConfig {
                enabled: true,
                severity: Some(Severity::Error),
            },
        );

        let rules = RuleSet::from_config(&config);
        assert!(!rules.rule_names().contains(&"duplicate-heading"));

        let doc = Document::parse("a.md", "# A\n\n# A\n\n```cpp\nfoo();\n```\n");
        let findings: Vec<Finding> = rules.validate(&doc).iter().collect();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, "missing-output");
        assert_eq!(findings[0].severity, Severity::Error);
    }

    #[test]
    fn test_finding_display() {
        let finding = Finding::new(
            "duplicate-heading",
            Severity::Error,
            Path::new("docs/signals.md"),
            7,
            "duplicate top-level heading \"Signals\"",
        );
        assert_eq!(
            finding.to_string(),
            "docs/signals.md:7: error: duplicate top-level heading \"Signals\""
        );
    }
}
