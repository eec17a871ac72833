//! Lint run coordination
//!
//! Loads every discovered document, validates it, then runs the collection
//! rules per input path. Documents are independent, so they can be validated
//! on a blocking pool; results are re-ordered before merging.

use crate::corpus::{self, Collection, LintConfig};
use crate::document::{load_document, Document};
use crate::error::{Error, Result};
use crate::report::Report;
use crate::rules::{Finding, RuleSet};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Findings remembered for a document version
#[derive(Debug, Clone)]
struct CacheEntry {
    hash: String,
    findings: Vec<Finding>,
}

/// Per-document findings from a previous run, keyed by path
///
/// Documents whose content hash is unchanged reuse their findings instead of
/// being validated again.
#[derive(Debug, Default)]
pub struct CheckCache {
    entries: HashMap<PathBuf, CacheEntry>,
}

impl CheckCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A loaded document with its own findings
struct Checked {
    document: Document,
    findings: Vec<Finding>,
    reused: bool,
}

/// Runs the configured rules over a set of input paths
pub struct Checker {
    config: LintConfig,
    rules: Arc<RuleSet>,
}

impl Checker {
    pub fn new(config: LintConfig) -> Self {
        let rules = Arc::new(RuleSet::from_config(&config));
        Self { config, rules }
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Check every document reachable from the inputs
    pub fn check(&self, inputs: &[PathBuf]) -> Result<Report> {
        self.run(inputs, None)
    }

    /// Like [`Checker::check`], reusing findings of unchanged documents
    pub fn check_cached(&self, inputs: &[PathBuf], cache: &mut CheckCache) -> Result<Report> {
        self.run(inputs, Some(cache))
    }

    fn run(&self, inputs: &[PathBuf], mut cache: Option<&mut CheckCache>) -> Result<Report> {
        let collections = corpus::discover(inputs, &self.config)?;

        let work: Vec<(PathBuf, Option<CacheEntry>)> = collections
            .iter()
            .flat_map(|collection| collection.files.iter())
            .map(|path| {
                let previous = cache
                    .as_deref()
                    .and_then(|c| c.entries.get(path))
                    .cloned();
                (path.clone(), previous)
            })
            .collect();

        let checked = if self.config.jobs > 1 && work.len() > 1 {
            self.check_parallel(work)?
        } else {
            work.into_iter()
                .map(|(path, previous)| check_file(&self.rules, &path, previous))
                .collect::<Result<Vec<_>>>()?
        };

        let reused = checked.iter().filter(|c| c.reused).count();
        let findings = self.merge(&collections, &checked);

        if let Some(cache) = cache.as_deref_mut() {
            cache.entries = checked
                .iter()
                .map(|c| {
                    (
                        c.document.path().to_path_buf(),
                        CacheEntry {
                            hash: c.document.hash().to_string(),
                            findings: c.findings.clone(),
                        },
                    )
                })
                .collect();
        }

        let report = Report::new(checked.len(), findings);
        tracing::info!(
            "Checked {} documents ({} unchanged): {} errors, {} warnings",
            report.documents,
            reused,
            report.errors,
            report.warnings
        );
        Ok(report)
    }

    /// Validate documents on a blocking pool of at most `jobs` threads
    fn check_parallel(&self, work: Vec<(PathBuf, Option<CacheEntry>)>) -> Result<Vec<Checked>> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(self.config.jobs)
            .thread_name("tutorlint-worker")
            .build()
            .map_err(Error::Runtime)?;

        tracing::debug!("Validating {} documents with {} jobs", work.len(), self.config.jobs);

        runtime.block_on(async {
            let mut tasks = JoinSet::new();
            for (index, (path, previous)) in work.into_iter().enumerate() {
                let rules = Arc::clone(&self.rules);
                tasks.spawn_blocking(move || {
                    check_file(&rules, &path, previous).map(|checked| (index, checked))
                });
            }

            let mut results = Vec::with_capacity(tasks.len());
            while let Some(joined) = tasks.join_next().await {
                results.push(joined??);
            }

            results.sort_by_key(|(index, _)| *index);
            Ok::<_, Error>(results.into_iter().map(|(_, checked)| checked).collect())
        })
    }

    /// Concatenate per-document findings with each collection's findings
    fn merge(&self, collections: &[Collection], checked: &[Checked]) -> Vec<Finding> {
        let mut findings: Vec<Finding> = checked
            .iter()
            .flat_map(|c| c.findings.iter().cloned())
            .collect();

        let mut offset = 0;
        for collection in collections {
            let end = offset + collection.files.len();
            let documents: Vec<&Document> =
                checked[offset..end].iter().map(|c| &c.document).collect();
            findings.extend(self.rules.validate_collection(&documents));
            offset = end;
        }

        findings
    }
}

fn check_file(rules: &RuleSet, path: &Path, previous: Option<CacheEntry>) -> Result<Checked> {
    let document = load_document(path)?;

    match previous {
        Some(entry) if entry.hash == document.hash() => {
            tracing::debug!("Unchanged since last run: {:?}", path);
            Ok(Checked {
                document,
                findings: entry.findings,
                reused: true,
            })
        }
        _ => {
            let findings = rules.validate(&document).iter().collect();
            Ok(Checked {
                document,
                findings,
                reused: false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Severity;
    use std::fs;

    fn corpus() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("objects.md"),
            "# Objects\n\n```cpp\nQObject *obj = new QObject(parent);\n```\n\nOutput:\n\n```\n(none)\n```\n",
        )
        .unwrap();
        fs::write(
            root.join("signals.md"),
            "# Signals\n\n```cpp\nemit clicked();\n```\n\n# Signals\n",
        )
        .unwrap();
        fs::write(root.join("timers.md"), "# Objects\n\n### Timers\n").unwrap();
        dir
    }

    #[test]
    fn test_check_directory() {
        let dir = corpus();
        let checker = Checker::new(LintConfig::default());
        let report = checker.check(&[dir.path().to_path_buf()]).unwrap();

        let rules: Vec<&str> = report.findings.iter().map(|f| f.rule).collect();
        assert_eq!(report.documents, 3);
        assert_eq!(
            rules,
            vec!["missing-output", "duplicate-heading", "duplicate-title", "heading-increment"]
        );
        assert_eq!(report.errors, 2);
        assert_eq!(report.warnings, 2);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dir = corpus();
        let inputs = [dir.path().to_path_buf()];

        let sequential = Checker::new(LintConfig::default()).check(&inputs).unwrap();

        let mut config = LintConfig::default();
        config.jobs = 4;
        let parallel = Checker::new(config).check(&inputs).unwrap();

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_separate_inputs_are_separate_collections() {
        let dir = corpus();
        let checker = Checker::new(LintConfig::default());
        let report = checker
            .check(&[dir.path().join("objects.md"), dir.path().join("timers.md")])
            .unwrap();

        assert!(report.findings.iter().all(|f| f.rule != "duplicate-title"));
    }

    #[test]
    fn test_strict_config() {
        let dir = corpus();
        let mut config = LintConfig::default();
        config.strict = true;
        let report = Checker::new(config).check(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(report.warnings, 0);
        assert!(report.findings.iter().all(|f| f.severity == Severity::Error));
    }

    #[test]
    fn test_cache_reuses_unchanged_documents() {
        let dir = corpus();
        let inputs = [dir.path().to_path_buf()];
        let checker = Checker::new(LintConfig::default());
        let mut cache = CheckCache::new();

        let first = checker.check_cached(&inputs, &mut cache).unwrap();
        assert_eq!(cache.len(), 3);

        let second = checker.check_cached(&inputs, &mut cache).unwrap();
        assert_eq!(first, second);

        fs::write(dir.path().join("signals.md"), "# Signals\n").unwrap();
        let third = checker.check_cached(&inputs, &mut cache).unwrap();
        assert!(third.findings.iter().all(|f| f.rule != "duplicate-heading"));
    }

    #[test]
    fn test_unreadable_document_aborts() {
        let dir = corpus();
        fs::write(dir.path().join("broken.md"), [0xffu8, 0xfe, 0x00]).unwrap();

        let err = Checker::new(LintConfig::default())
            .check(&[dir.path().to_path_buf()])
            .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }
}
