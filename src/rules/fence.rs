//! Fenced code blocks must be closed before the document ends

use super::{Finding, Rule, Severity};
use crate::document::Document;

/// Detects fenced code blocks that run to the end of the document
pub struct UnclosedFenceRule;

impl Rule for UnclosedFenceRule {
    fn name(&self) -> &'static str {
        "unclosed-fence"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, document: &Document) -> Vec<Finding> {
        document
            .code_blocks()
            .filter(|(_, _, code)| code.fenced && !code.closed)
            .map(|(_, block, _)| {
                Finding::new(
                    self.name(),
                    self.default_severity(),
                    document.path(),
                    block.line,
                    "code fence is never closed; the rest of the document is treated as code",
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unclosed_fence_reported_at_opening_line() {
        let doc = Document::parse("a.md", "# Strings\n\n~~~cpp\nQString s;\n\n## Next\n");
        let findings = UnclosedFenceRule.check(&doc);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 3);
    }

    #[test]
    fn test_closed_fences_pass() {
        let doc = Document::parse("a.md", "````md\n```cpp\nnested\n```\n````\n");
        assert!(UnclosedFenceRule.check(&doc).is_empty());
    }
}
