//! Heading hierarchy rules

use super::{Finding, Rule, Severity};
use crate::document::{normalize_title, Document, HeadingLevel};
use std::collections::HashMap;

/// Detects repeated top-level headings within one document
pub struct DuplicateHeadingRule;

impl Rule for DuplicateHeadingRule {
    fn name(&self) -> &'static str {
        "duplicate-heading"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, document: &Document) -> Vec<Finding> {
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        let mut findings = Vec::new();

        for (block, heading) in document.top_level_headings() {
            let key = normalize_title(&heading.text);
            match first_seen.get(&key) {
                Some(first_line) => findings.push(Finding::new(
                    self.name(),
                    self.default_severity(),
                    document.path(),
                    block.line,
                    format!(
                        "duplicate top-level heading \"{}\" (first defined on line {})",
                        heading.text, first_line
                    ),
                )),
                None => {
                    first_seen.insert(key, block.line);
                }
            }
        }

        findings
    }
}

/// Detects headings that descend more than the allowed number of levels
pub struct HeadingIncrementRule {
    max_step: u8,
}

impl HeadingIncrementRule {
    /// A step of 0 is treated as 1; configuration files reject it on load
    pub fn new(max_step: u8) -> Self {
        Self {
            max_step: max_step.max(1),
        }
    }
}

impl Rule for HeadingIncrementRule {
    fn name(&self) -> &'static str {
        "heading-increment"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, document: &Document) -> Vec<Finding> {
        let mut previous: Option<HeadingLevel> = None;
        let mut findings = Vec::new();

        for (_, block, heading) in document.headings() {
            if let Some(prev) = previous {
                if heading.level.depth() > prev.depth().saturating_add(self.max_step) {
                    findings.push(Finding::new(
                        self.name(),
                        self.default_severity(),
                        document.path(),
                        block.line,
                        format!(
                            "heading level jumps from {} to {} at \"{}\"",
                            prev, heading.level, heading.text
                        ),
                    ));
                }
            }
            previous = Some(heading.level);
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_signals_headings_report_once() {
        let doc = Document::parse(
            "signals.md",
            "# Signals\n\nFirst.\n\n## Details\n\n# Signals\n\nSecond.\n",
        );
        let findings = DuplicateHeadingRule.check(&doc);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 7);
        assert!(findings[0].message.contains("first defined on line 1"));
    }

    #[test]
    fn test_duplicates_compare_normalized_text() {
        let doc = Document::parse("a.md", "# Event Loop\n\n# event   loop\n\n# EVENT LOOP\n");
        assert_eq!(DuplicateHeadingRule.check(&doc).len(), 2);
    }

    #[test]
    fn test_only_top_level_headings_compared() {
        let doc = Document::parse(
            "a.md",
            "## Strings\n\n### Example\n\n## Byte arrays\n\n### Example\n",
        );
        assert!(DuplicateHeadingRule.check(&doc).is_empty());
    }

    #[test]
    fn test_heading_skip_when_descending() {
        let doc = Document::parse("a.md", "# Top\n\n### Too deep\n\n#### Fine\n\n# Back\n");
        let findings = HeadingIncrementRule::new(1).check(&doc);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 3);
        assert!(findings[0].message.contains("H1 to H3"));
    }

    #[test]
    fn test_heading_ascending_is_free() {
        let doc = Document::parse("a.md", "# A\n\n## B\n\n### C\n\n# D\n\n## E\n");
        assert!(HeadingIncrementRule::new(1).check(&doc).is_empty());
    }

    #[test]
    fn test_wider_step_allowed_by_config() {
        let doc = Document::parse("a.md", "# Top\n\n### Deeper\n");
        assert!(HeadingIncrementRule::new(2).check(&doc).is_empty());
    }
}
