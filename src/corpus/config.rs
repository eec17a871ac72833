//! Lint configuration

use crate::error::{Error, Result};
use crate::rules::Severity;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = ".tutorlint.toml";

/// Configuration for a lint run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintConfig {
    /// File extensions picked up by directory scans
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Patterns to ignore during directory scans (glob patterns)
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Code block languages that are expected to show their output
    #[serde(default = "default_executable_languages")]
    pub executable_languages: Vec<String>,

    /// Word announcing an output block
    #[serde(default = "default_output_marker")]
    pub output_marker: String,

    /// Number of blocks after an example searched for its output
    #[serde(default = "default_output_window")]
    pub output_window: usize,

    /// Maximum number of levels a heading may descend at once, at least 1
    #[serde(
        default = "default_max_heading_step",
        deserialize_with = "deserialize_heading_step"
    )]
    pub max_heading_step: u8,

    /// Treat every warning as an error
    #[serde(default)]
    pub strict: bool,

    /// Number of documents validated in parallel
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Per-rule overrides, keyed by rule name
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,
}

/// Override for a single rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: None,
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string(), "markdown".to_string()]
}

fn default_ignore_patterns() -> Vec<String> {
    vec![
        "target/**".to_string(),
        "node_modules/**".to_string(),
        ".git/**".to_string(),
        "CHANGELOG*".to_string(),
    ]
}

fn default_executable_languages() -> Vec<String> {
    [
        "c", "cc", "cpp", "c++", "cxx", "rust", "rs", "python", "py", "java", "go",
        "javascript", "js", "typescript", "ts",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_output_marker() -> String {
    "Output".to_string()
}

fn default_output_window() -> usize {
    3
}

fn default_max_heading_step() -> u8 {
    1
}

fn deserialize_heading_step<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let step = u8::deserialize(deserializer)?;
    if step == 0 {
        return Err(serde::de::Error::custom("max_heading_step must be at least 1"));
    }
    Ok(step)
}

fn default_jobs() -> usize {
    1
}

fn default_enabled() -> bool {
    true
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            ignore_patterns: default_ignore_patterns(),
            executable_languages: default_executable_languages(),
            output_marker: default_output_marker(),
            output_window: default_output_window(),
            max_heading_step: default_max_heading_step(),
            strict: false,
            jobs: default_jobs(),
            rules: BTreeMap::new(),
        }
    }
}

impl LintConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the explicit file if given, else `.tutorlint.toml` in `dir`, else defaults
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!("Using configuration {:?}", candidate);
            Ok((Self::load(&candidate)?, Some(candidate)))
        } else {
            Ok((Self::default(), None))
        }
    }

    /// Save configuration as pretty TOML
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        use anyhow::Context;

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Override for a rule, or the default (enabled, rule severity)
    pub fn rule(&self, name: &str) -> RuleConfig {
        self.rules.get(name).cloned().unwrap_or_default()
    }

    /// Check if a path should be ignored
    pub fn should_ignore(&self, path: &str) -> bool {
        self.ignore_patterns
            .iter()
            .any(|pattern| glob_match_simple(pattern, path))
    }

    /// Check if a path has one of the configured document extensions
    pub fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    /// Look up a scalar setting by key, formatted for display
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "output_marker" => Some(self.output_marker.clone()),
            "output_window" => Some(self.output_window.to_string()),
            "max_heading_step" => Some(self.max_heading_step.to_string()),
            "strict" => Some(self.strict.to_string()),
            "jobs" => Some(self.jobs.to_string()),
            "extensions" => Some(self.extensions.join(",")),
            "executable_languages" => Some(self.executable_languages.join(",")),
            _ => None,
        }
    }
}

/// Simple glob matching helper (supports `*` and one `**`)
fn glob_match_simple(pattern: &str, path: &str) -> bool {
    if pattern.contains("**") {
        let parts: Vec<&str> = pattern.split("**").collect();
        if parts.len() == 2 {
            let prefix = parts[0].trim_end_matches('/');
            let suffix = parts[1].trim_start_matches('/');
            let suffix_ok = suffix.is_empty() || glob_match_simple(suffix, file_name(path));
            return (prefix.is_empty() || path.starts_with(prefix)) && suffix_ok;
        }
    }

    if pattern.contains('*') {
        let parts: Vec<&str> = pattern.split('*').collect();
        if parts.len() == 2 {
            let name = if pattern.contains('/') { path } else { file_name(path) };
            return name.starts_with(parts[0]) && name.ends_with(parts[1]);
        }
    }

    path == pattern || path.ends_with(&format!("/{}", pattern))
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
