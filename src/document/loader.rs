//! Loading documents from disk

use super::Document;
use crate::error::{Error, Result};
use std::path::Path;

const UTF8_BOM: &str = "\u{feff}";

/// Load and parse a tutorial document
///
/// Fails only when the file cannot be read or is not UTF-8 text. Any
/// structural problem in the Markdown is kept for validation.
pub fn load_document(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    let text = String::from_utf8(bytes).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let text = match text.strip_prefix(UTF8_BOM) {
        Some(stripped) => stripped.to_string(),
        None => text,
    };

    tracing::debug!("Loaded {:?} ({} bytes)", path, text.len());
    Ok(Document::parse(path, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_utf8_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "\u{feff}# Event loop\n\nText with ünïcödé.\n").unwrap();

        let doc = load_document(file.path()).unwrap();
        assert_eq!(doc.path(), file.path());
        assert!(doc.text().starts_with("# Event loop"));
        assert_eq!(doc.blocks().len(), 2);
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[b'#', b' ', 0xff, 0xfe, b'\n']).unwrap();

        let err = load_document(file.path()).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_document(dir.path().join("missing.md")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
