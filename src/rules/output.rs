//! Examples must be followed by the output they produce

use super::{Finding, Rule, Severity};
use crate::corpus::LintConfig;
use crate::document::{contains_ignore_case, Block, CodeBlock, Document};

/// Detects runnable examples with no output block shortly after them
pub struct MissingOutputRule {
    languages: Vec<String>,
    marker: String,
    window: usize,
}

impl MissingOutputRule {
    pub fn new(languages: Vec<String>, marker: impl Into<String>, window: usize) -> Self {
        Self {
            languages,
            marker: marker.into(),
            window,
        }
    }

    pub fn from_config(config: &LintConfig) -> Self {
        Self::new(
            config.executable_languages.clone(),
            config.output_marker.clone(),
            config.output_window,
        )
    }

    fn is_executable(&self, code: &CodeBlock) -> bool {
        code.language
            .as_deref()
            .map(|lang| self.languages.iter().any(|l| l.eq_ignore_ascii_case(lang)))
            .unwrap_or(false)
    }

    /// Heading, caption paragraph or code block announcing output
    fn is_output_marker(&self, block: &Block) -> bool {
        if let Some(text) = block.text() {
            return contains_ignore_case(text, &self.marker);
        }
        block
            .as_code()
            .map(|code| code.info_mentions(&self.marker))
            .unwrap_or(false)
    }

    /// Scan the window after `index`, stopping at the next example
    fn has_output_after(&self, blocks: &[Block], index: usize) -> bool {
        for block in blocks.iter().skip(index + 1).take(self.window) {
            if self.is_output_marker(block) {
                return true;
            }
            if block.as_code().is_some_and(|code| self.is_executable(code)) {
                return false;
            }
        }
        false
    }
}

impl Rule for MissingOutputRule {
    fn name(&self) -> &'static str {
        "missing-output"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, document: &Document) -> Vec<Finding> {
        let blocks = document.blocks();

        document
            .code_blocks()
            .filter(|(_, _, code)| self.is_executable(code))
            .filter(|(index, _, _)| !self.has_output_after(blocks, *index))
            .map(|(_, block, code)| {
                Finding::new(
                    self.name(),
                    self.default_severity(),
                    document.path(),
                    block.line,
                    format!(
                        "`{}` example has no \"{}\" block within the next {} blocks",
                        code.language.as_deref().unwrap_or_default(),
                        self.marker,
                        self.window
                    ),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(content: &str) -> Vec<Finding> {
        let rule = MissingOutputRule::from_config(&LintConfig::default());
        rule.check(&Document::parse("tutorial.md", content))
    }

    #[test]
    fn test_lone_example_reports_once() {
        let findings = check("# Timers\n\n```cpp\nQTimer::singleShot(100, this, &Obj::tick);\n```\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 3);
        assert_eq!(findings[0].rule, "missing-output");
        assert!(findings[0].message.contains("`cpp`"));
    }

    #[test]
    fn test_output_heading_satisfies() {
        let findings = check(
            r#"# Example

```cpp
qDebug() << QDate(2024, 1, 1).toString();
```

### Output

```
"Mon Jan 1 2024"
```
"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_output_caption_and_info_string() {
        let caption = check("```python\nprint(1)\n```\n\n**Output:**\n\n```\n1\n```\n");
        assert!(caption.is_empty());

        let info = check("```rust\nprintln!(\"1\");\n```\n\n```text output\n1\n```\n");
        assert!(info.is_empty());
    }

    #[test]
    fn test_output_outside_window() {
        let findings = check(
            "```cpp\nfoo();\n```\n\nOne.\n\nTwo.\n\nThree.\n\nOutput:\n\n```\n42\n```\n",
        );
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_next_example_closes_window() {
        let findings = check(
            "```cpp\nfirst();\n```\n\n```cpp\nsecond();\n```\n\nOutput:\n\n```\n2\n```\n",
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 1);
    }

    #[test]
    fn test_output_caption_in_tight_list() {
        let findings = check("```cpp\nfoo();\n```\n\n- Output: `42`\n");
        assert!(findings.is_empty());
    }

    #[test]
    fn test_tight_list_items_count_toward_window() {
        let findings = check("```cpp\nfoo();\n```\n\n- one\n- two\n- three\n\nOutput:\n\n```\n42\n```\n");
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_executable_match_ignores_case() {
        let rule = MissingOutputRule::new(vec!["cpp".to_string()], "Output", 3);
        let doc = Document::parse("a.md", "```CPP\nfoo();\n```\n\n```text\nplain\n```\n");
        assert_eq!(rule.check(&doc).len(), 1);
    }

    #[test]
    fn test_non_executable_languages_ignored() {
        let findings = check("```cmake\nfind_package(Qt6)\n```\n\n```\nplain\n```\n");
        assert!(findings.is_empty());
    }
}
