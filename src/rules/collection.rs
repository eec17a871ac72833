//! Rules that span every document of one input path

use super::{CollectionRule, Finding, Severity};
use crate::document::{normalize_title, Document};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Detects top-level titles shared by several documents of a collection
///
/// Repeats inside a single document are left to `duplicate-heading`, so
/// each document contributes every title at most once.
pub struct DuplicateTitleRule;

impl CollectionRule for DuplicateTitleRule {
    fn name(&self) -> &'static str {
        "duplicate-title"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, documents: &[&Document]) -> Vec<Finding> {
        let mut owners: HashMap<String, (&Path, usize)> = HashMap::new();
        let mut findings = Vec::new();

        for &document in documents {
            let mut seen_here = HashSet::new();

            for (block, heading) in document.top_level_headings() {
                let key = normalize_title(&heading.text);
                if !seen_here.insert(key.clone()) {
                    continue;
                }

                match owners.get(&key) {
                    Some((owner, line)) => findings.push(Finding::new(
                        self.name(),
                        self.default_severity(),
                        document.path(),
                        block.line,
                        format!(
                            "top-level heading \"{}\" is also used by {}:{}",
                            heading.text,
                            owner.display(),
                            line
                        ),
                    )),
                    None => {
                        owners.insert(key, (document.path(), block.line));
                    }
                }
            }
        }

        findings
    }
}
