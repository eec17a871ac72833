//! Tutorial document model
//!
//! A document is an ordered sequence of leaf blocks:
//! - Headings, paragraphs, tables, HTML blocks and thematic breaks
//! - Fenced or indented code blocks with their declared language
//!
//! Lists and block quotes are transparent containers; their leaf blocks
//! appear in source order.

mod loader;
mod parse;

pub use loader::load_document;

use pulldown_cmark::HeadingLevel as CmarkHeadingLevel;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Compute a stable hash for content
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Heading level in documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1 = 1,
    H2 = 2,
    H3 = 3,
    H4 = 4,
    H5 = 5,
    H6 = 6,
}

impl HeadingLevel {
    /// Numeric depth, 1 through 6
    pub fn depth(self) -> u8 {
        self as u8
    }
}

impl From<CmarkHeadingLevel> for HeadingLevel {
    fn from(level: CmarkHeadingLevel) -> Self {
        match level {
            CmarkHeadingLevel::H1 => HeadingLevel::H1,
            CmarkHeadingLevel::H2 => HeadingLevel::H2,
            CmarkHeadingLevel::H3 => HeadingLevel::H3,
            CmarkHeadingLevel::H4 => HeadingLevel::H4,
            CmarkHeadingLevel::H5 => HeadingLevel::H5,
            CmarkHeadingLevel::H6 => HeadingLevel::H6,
        }
    }
}

impl std::fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "H{}", *self as u8)
    }
}

/// A section heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: HeadingLevel,
    /// Plain text of the heading, inline markup stripped
    pub text: String,
}

/// A code block found in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    /// Normalized language tag (first word of the info string, lowercase)
    pub language: Option<String>,
    /// Full info string as written after the opening fence
    pub info: String,
    /// Code content
    pub content: String,
    /// Whether the block was opened by a fence (as opposed to indentation)
    pub fenced: bool,
    /// Whether a fenced block has a closing fence before end of input
    pub closed: bool,
}

impl CodeBlock {
    /// Check whether the info string mentions `word`, ignoring case
    pub fn info_mentions(&self, word: &str) -> bool {
        contains_ignore_case(&self.info, word)
    }
}

/// Kind-specific payload of a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockKind {
    Heading(Heading),
    Paragraph { text: String },
    Code(CodeBlock),
    Table { rows: usize },
    Html,
    ThematicBreak,
}

/// A leaf block with its location in the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    #[serde(flatten)]
    pub kind: BlockKind,
    /// 1-based line where the block starts
    pub line: usize,
    /// Byte range of the block in the document text
    pub range: Range<usize>,
}

impl Block {
    pub fn as_heading(&self) -> Option<&Heading> {
        match &self.kind {
            BlockKind::Heading(heading) => Some(heading),
            _ => None,
        }
    }

    pub fn as_code(&self) -> Option<&CodeBlock> {
        match &self.kind {
            BlockKind::Code(code) => Some(code),
            _ => None,
        }
    }

    /// Heading or paragraph text, if the block carries prose
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::Heading(heading) => Some(&heading.text),
            BlockKind::Paragraph { text } => Some(text),
            _ => None,
        }
    }
}

/// One entry of a derived table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub level: HeadingLevel,
    /// Depth relative to the shallowest heading in the document, starting at 0
    pub depth: usize,
    pub text: String,
    pub line: usize,
}

/// A loaded tutorial document
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    text: String,
    hash: String,
    blocks: Vec<Block>,
}

impl Document {
    /// Build a document from in-memory text
    ///
    /// Never fails: malformed structure is kept in the block model and is
    /// left for the rules to report.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let text = text.into();
        let blocks = parse::parse_blocks(&text);
        let hash = content_hash(&text);

        Self {
            path,
            text,
            hash,
            blocks,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// SHA-256 of the document text, hex encoded
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Iterate over headings with their block index
    pub fn headings(&self) -> impl Iterator<Item = (usize, &Block, &Heading)> {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(i, block)| block.as_heading().map(|h| (i, block, h)))
    }

    /// Iterate over code blocks with their block index
    pub fn code_blocks(&self) -> impl Iterator<Item = (usize, &Block, &CodeBlock)> {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(i, block)| block.as_code().map(|c| (i, block, c)))
    }

    /// The shallowest heading level present, if any
    pub fn top_level(&self) -> Option<HeadingLevel> {
        self.headings().map(|(_, _, h)| h.level).min()
    }

    /// Headings at the shallowest level present
    pub fn top_level_headings(&self) -> impl Iterator<Item = (&Block, &Heading)> {
        let top = self.top_level();
        self.headings()
            .filter(move |(_, _, h)| Some(h.level) == top)
            .map(|(_, block, h)| (block, h))
    }

    /// Derive the table of contents from the heading sequence
    pub fn table_of_contents(&self) -> Vec<TocEntry> {
        let Some(top) = self.top_level() else {
            return Vec::new();
        };

        self.headings()
            .map(|(_, block, heading)| TocEntry {
                level: heading.level,
                depth: (heading.level.depth() - top.depth()) as usize,
                text: heading.text.clone(),
                line: block.line,
            })
            .collect()
    }
}

/// Normalize heading text for comparison: trim, collapse whitespace, lowercase
pub fn normalize_title(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_of_contents_depth_is_relative() {
        let doc = Document::parse(
            "guide.md",
            "## Objects\n\ntext\n\n### Ownership\n\n## Signals\n",
        );

        let toc = doc.table_of_contents();
        assert_eq!(toc.len(), 3);
        assert_eq!(toc[0].depth, 0);
        assert_eq!(toc[1].depth, 1);
        assert_eq!(toc[1].text, "Ownership");
        assert_eq!(toc[2].line, 7);
    }

    #[test]
    fn test_top_level_headings() {
        let doc = Document::parse("a.md", "# One\n\n## Sub\n\n# Two\n");
        let titles: Vec<&str> = doc
            .top_level_headings()
            .map(|(_, h)| h.text.as_str())
            .collect();
        assert_eq!(titles, vec!["One", "Two"]);
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Signals   and Slots "), "signals and slots");
    }

    #[test]
    fn test_hash_tracks_content() {
        let a = Document::parse("a.md", "# A\n");
        let b = Document::parse("b.md", "# A\n");
        let c = Document::parse("a.md", "# B\n");
        assert_eq!(a.hash(), b.hash());
        assert_ne!(a.hash(), c.hash());
    }
}
