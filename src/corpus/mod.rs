//! Input discovery
//!
//! Every command-line path forms one collection:
//! - A file path is a collection of exactly that document
//! - A directory is scanned recursively for documents

mod config;

pub use config::{LintConfig, RuleConfig, CONFIG_FILE_NAME};

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The documents discovered from one input path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// Document paths, sorted
    pub files: Vec<PathBuf>,
}

/// Resolve input paths into collections of documents
pub fn discover(inputs: &[PathBuf], config: &LintConfig) -> Result<Vec<Collection>> {
    inputs
        .iter()
        .map(|input| discover_one(input, config))
        .collect()
}

fn discover_one(input: &Path, config: &LintConfig) -> Result<Collection> {
    let metadata = std::fs::metadata(input).map_err(|e| Error::io(input, e))?;

    let files = if metadata.is_dir() {
        scan_directory(input, config)?
    } else {
        vec![input.to_path_buf()]
    };

    tracing::debug!("Discovered {} documents under {:?}", files.len(), input);
    Ok(Collection { files })
}

fn scan_directory(root: &Path, config: &LintConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).into_iter().filter_entry(|e| {
        let name = e.file_name().to_str().unwrap_or("");
        e.depth() == 0 || (!name.starts_with('.') && name != "target" && name != "node_modules")
    }) {
        let entry = entry?;
        if !entry.file_type().is_file() || !config.is_document(entry.path()) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if config.should_ignore(&relative) {
            tracing::debug!("Ignoring {:?}", entry.path());
            continue;
        }

        files.push(entry.into_path());
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_directory_scan() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("basics")).unwrap();
        fs::create_dir_all(root.join(".hidden")).unwrap();
        fs::create_dir_all(root.join("target")).unwrap();
        fs::write(root.join("intro.md"), "# Intro\n").unwrap();
        fs::write(root.join("basics/strings.markdown"), "# Strings\n").unwrap();
        fs::write(root.join("basics/notes.txt"), "notes").unwrap();
        fs::write(root.join(".hidden/secret.md"), "# Secret\n").unwrap();
        fs::write(root.join("target/build.md"), "# Build\n").unwrap();
        fs::write(root.join("CHANGELOG.md"), "# Changes\n").unwrap();

        let collections = discover(&[root.to_path_buf()], &LintConfig::default()).unwrap();
        assert_eq!(collections.len(), 1);
        assert_eq!(
            collections[0].files,
            vec![root.join("basics/strings.markdown"), root.join("intro.md")]
        );
    }

    #[test]
    fn test_explicit_file_is_its_own_collection() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, "# Notes\n").unwrap();

        let collections = discover(&[file.clone()], &LintConfig::default()).unwrap();
        assert_eq!(collections[0].files, vec![file]);
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover(&[dir.path().join("nope")], &LintConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
