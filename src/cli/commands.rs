//! Command implementations

use super::{ConfigArgs, OutputFormat};
use crate::checker::Checker;
use crate::corpus::{LintConfig, CONFIG_FILE_NAME};
use crate::document::{load_document, BlockKind};
use crate::report::Report;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load the effective configuration for this invocation
pub fn load_config(explicit: Option<&Path>) -> Result<LintConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let (config, source) = LintConfig::discover(explicit, &cwd)?;

    match source {
        Some(path) => tracing::debug!("Loaded configuration from {:?}", path),
        None => tracing::debug!("Using default configuration"),
    }

    Ok(config)
}

/// Apply command-line overrides on top of the configuration
pub fn apply_overrides(mut config: LintConfig, strict: bool, jobs: Option<usize>) -> LintConfig {
    config.strict |= strict;
    if let Some(jobs) = jobs {
        config.jobs = jobs.max(1);
    }
    config
}

/// Check documents and return the report
pub fn check(config: LintConfig, paths: &[PathBuf]) -> Result<Report> {
    let checker = Checker::new(config);
    tracing::debug!("Enabled rules: {}", checker.rules().rule_names().join(", "));

    let report = checker.check(paths)?;
    Ok(report)
}

/// Print a report in the requested format
pub fn print_report(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_report_json(report)?,
        OutputFormat::Text => print_report_text(report),
    }
    Ok(())
}

/// Print a report in JSON format
pub fn print_report_json(report: &Report) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

/// Print a report in text format, one line per finding
pub fn print_report_text(report: &Report) {
    print!("{}", report.to_text());
}

/// Print the table of contents of a document
pub fn toc(path: &Path, format: OutputFormat) -> Result<()> {
    let document = load_document(path)?;
    let entries = document.table_of_contents();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => {
            for entry in &entries {
                println!("{}{}  (line {})", "  ".repeat(entry.depth), entry.text, entry.line);
            }
        }
    }

    Ok(())
}

/// List code blocks of a document, optionally filtered by language
pub fn blocks(path: &Path, language: Option<&str>, format: OutputFormat) -> Result<()> {
    let document = load_document(path)?;

    let selected: Vec<_> = document
        .blocks()
        .iter()
        .filter(|block| match (&block.kind, language) {
            (BlockKind::Code(code), Some(wanted)) => code
                .language
                .as_deref()
                .is_some_and(|l| l.eq_ignore_ascii_case(wanted)),
            (BlockKind::Code(_), None) => true,
            _ => false,
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&selected)?),
        OutputFormat::Text => {
            for block in &selected {
                let Some(code) = block.as_code() else {
                    continue;
                };
                let lines = code.content.lines().count();
                println!(
                    "{}:{}: {} ({} lines, bytes {}..{}){}",
                    path.display(),
                    block.line,
                    code.language.as_deref().unwrap_or("untagged"),
                    lines,
                    block.range.start,
                    block.range.end,
                    if code.closed { "" } else { " unclosed" }
                );
            }
        }
    }

    Ok(())
}

/// Decides which filesystem events trigger a new check in watch mode
///
/// Files named on the command line are checked whatever their extension,
/// so events on them count too.
pub struct WatchFilter {
    explicit: Vec<PathBuf>,
}

impl WatchFilter {
    pub fn new(paths: &[PathBuf]) -> Self {
        let explicit = paths
            .iter()
            .filter(|path| path.is_file())
            .map(|path| canonical(path))
            .collect();
        Self { explicit }
    }

    /// Whether a change to `path` can affect the report
    pub fn is_relevant(&self, config: &LintConfig, path: &Path) -> bool {
        config.is_document(path) || self.explicit.contains(&canonical(path))
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Show, query or initialize configuration
pub fn config(explicit: Option<&Path>, args: &ConfigArgs) -> Result<()> {
    if args.init {
        let target = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

        if target.exists() && !args.force {
            anyhow::bail!("{:?} already exists. Use --force to overwrite.", target);
        }

        LintConfig::default().save(&target)?;
        println!("✓ Wrote default configuration to {:?}", target);
        return Ok(());
    }

    let config = load_config(explicit)?;

    if let Some(ref key) = args.get {
        match config.get(key) {
            Some(value) => println!("{}", value),
            None => anyhow::bail!("Unknown config key: {}", key),
        }
        return Ok(());
    }

    let content = toml::to_string_pretty(&config).context("Failed to serialize configuration")?;
    print!("{}", content);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_filter_accepts_named_files() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        let other = dir.path().join("other.txt");
        std::fs::write(&notes, "# Notes\n").unwrap();
        std::fs::write(&other, "# Other\n").unwrap();

        let config = LintConfig::default();
        let filter = WatchFilter::new(&[notes.clone(), dir.path().to_path_buf()]);

        assert!(filter.is_relevant(&config, &notes));
        assert!(filter.is_relevant(&config, &dir.path().join(".").join("notes.txt")));
        assert!(!filter.is_relevant(&config, &other));
        assert!(filter.is_relevant(&config, &dir.path().join("intro.md")));
    }
}
