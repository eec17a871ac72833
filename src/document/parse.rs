//! Markdown to block-sequence conversion using pulldown-cmark

use super::{Block, BlockKind, CodeBlock, Heading, HeadingLevel};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use std::ops::Range;

/// Leaf block under construction
enum Pending {
    Heading { level: HeadingLevel, text: String },
    Paragraph { text: String },
    Code { info: String, fenced: bool, content: String },
    Table { rows: usize },
    Html,
}

impl Pending {
    fn push_text(&mut self, fragment: &str) {
        match self {
            Pending::Heading { text, .. } | Pending::Paragraph { text } => text.push_str(fragment),
            Pending::Code { content, .. } => content.push_str(fragment),
            Pending::Table { .. } | Pending::Html => {}
        }
    }

    fn push_break(&mut self) {
        match self {
            Pending::Heading { text, .. } | Pending::Paragraph { text } => text.push(' '),
            _ => {}
        }
    }
}

/// Collects leaf blocks while walking the event stream
///
/// Items of a tight list carry their text without paragraph events; that
/// text is gathered into an implicit paragraph closed at the end of the item
/// or at the next block inside it.
struct BlockBuilder<'t> {
    source: &'t str,
    lines: LineIndex,
    blocks: Vec<Block>,
    current: Option<(Pending, Range<usize>)>,
    item_depth: usize,
}

impl<'t> BlockBuilder<'t> {
    fn new(source: &'t str) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
            blocks: Vec::new(),
            current: None,
            item_depth: 0,
        }
    }

    fn open(&mut self, pending: Pending, range: Range<usize>) {
        self.close();
        self.current = Some((pending, range));
    }

    fn close(&mut self) {
        if let Some((pending, range)) = self.current.take() {
            let block = finish(self.source, pending, range, &self.lines);
            self.blocks.push(block);
        }
    }

    /// Block receiving inline content at `range`, if any
    fn inline_target(&mut self, range: Range<usize>) -> Option<&mut Pending> {
        if self.current.is_none() && self.item_depth > 0 {
            self.current = Some((Pending::Paragraph { text: String::new() }, range.clone()));
        }

        let (pending, span) = self.current.as_mut()?;
        span.end = span.end.max(range.end);
        Some(pending)
    }

    fn push(&mut self, kind: BlockKind, range: Range<usize>) {
        self.close();
        self.blocks.push(Block {
            kind,
            line: self.lines.line_of(range.start),
            range,
        });
    }
}

/// Parse Markdown text into its ordered leaf blocks
pub(super) fn parse_blocks(text: &str) -> Vec<Block> {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;

    let mut builder = BlockBuilder::new(text);

    for (event, range) in Parser::new_ext(text, options).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                builder.open(
                    Pending::Heading {
                        level: level.into(),
                        text: String::new(),
                    },
                    range,
                );
            }
            Event::Start(Tag::Paragraph) => {
                builder.open(Pending::Paragraph { text: String::new() }, range);
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                let (info, fenced) = match kind {
                    CodeBlockKind::Fenced(info) => (info.trim().to_string(), true),
                    CodeBlockKind::Indented => (String::new(), false),
                };
                builder.open(
                    Pending::Code {
                        info,
                        fenced,
                        content: String::new(),
                    },
                    range,
                );
            }
            Event::Start(Tag::Table(_)) => {
                builder.open(Pending::Table { rows: 0 }, range);
            }
            Event::Start(Tag::TableHead) | Event::Start(Tag::TableRow) => {
                if let Some((Pending::Table { rows }, _)) = builder.current.as_mut() {
                    *rows += 1;
                }
            }
            Event::Start(Tag::HtmlBlock) => {
                builder.open(Pending::Html, range);
            }
            Event::Start(Tag::List(_)) => builder.close(),
            Event::Start(Tag::Item) => {
                builder.close();
                builder.item_depth += 1;
            }
            Event::End(TagEnd::Item) => {
                builder.close();
                builder.item_depth = builder.item_depth.saturating_sub(1);
            }
            Event::Text(fragment) | Event::Code(fragment) => {
                if let Some(pending) = builder.inline_target(range) {
                    pending.push_text(&fragment);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(pending) = builder.inline_target(range) {
                    pending.push_break();
                }
            }
            Event::Rule => builder.push(BlockKind::ThematicBreak, range),
            Event::End(
                TagEnd::Heading(_)
                | TagEnd::Paragraph
                | TagEnd::CodeBlock
                | TagEnd::Table
                | TagEnd::HtmlBlock,
            ) => builder.close(),
            _ => {}
        }
    }

    builder.close();
    builder.blocks
}

fn finish(source: &str, pending: Pending, range: Range<usize>, lines: &LineIndex) -> Block {
    let kind = match pending {
        Pending::Heading { level, text } => BlockKind::Heading(Heading {
            level,
            text: text.trim().to_string(),
        }),
        Pending::Paragraph { text } => BlockKind::Paragraph {
            text: text.trim().to_string(),
        },
        Pending::Code {
            info,
            fenced,
            content,
        } => {
            let closed = !fenced || fence_is_closed(source.get(range.clone()).unwrap_or(""));
            BlockKind::Code(CodeBlock {
                language: language_tag(&info),
                info,
                content,
                fenced,
                closed,
            })
        }
        Pending::Table { rows } => BlockKind::Table { rows },
        Pending::Html => BlockKind::Html,
    };

    Block {
        kind,
        line: lines.line_of(range.start),
        range,
    }
}

/// Extract the normalized language from a fence info string
///
/// Accepts `cpp`, `cpp title=main.cpp`, `rust,ignore` and `{.cpp}`.
pub(crate) fn language_tag(info: &str) -> Option<String> {
    let word = info.split_whitespace().next()?;
    let word = word.trim_start_matches('{').trim_start_matches('.');
    let word = word.split([',', '}']).next().unwrap_or("").trim();

    if word.is_empty() {
        None
    } else {
        Some(word.to_lowercase())
    }
}

/// Check whether the raw source of a fenced block ends with a closing fence
fn fence_is_closed(raw: &str) -> bool {
    let mut lines = raw.trim_end_matches(['\r', '\n']).lines();

    let Some(opening) = lines.next() else {
        return false;
    };
    let opening = strip_container_prefix(opening);
    let Some(fence_char) = opening.chars().next().filter(|c| *c == '`' || *c == '~') else {
        return false;
    };
    let fence_len = opening.chars().take_while(|c| *c == fence_char).count();

    let Some(closing) = lines.last() else {
        return false;
    };
    let closing = strip_container_prefix(closing).trim_end();

    closing.chars().count() >= fence_len && closing.chars().all(|c| c == fence_char)
}

/// Drop indentation and block quote markers from a source line
fn strip_container_prefix(line: &str) -> &str {
    line.trim_start_matches([' ', '\t', '>'])
}

/// Maps byte offsets to 1-based line numbers
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }
}
