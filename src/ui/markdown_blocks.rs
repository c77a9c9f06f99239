//! Markdown block parsing for the content pane
//!
//! Turns GitHub-flavoured Markdown into a tree of blocks and styled inline
//! spans that the block renderer can draw. Tables, strikethrough, task lists
//! and footnotes are enabled.

use pulldown_cmark::{Alignment, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// Inline styling flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanStyle {
    pub strong: bool,
    pub emphasis: bool,
    pub strikethrough: bool,
    pub code: bool,
}

/// An inline element inside a paragraph, heading or table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Span {
        text: String,
        style: SpanStyle,
        /// Link target when the span is part of a link
        link: Option<String>,
    },
    Image {
        url: String,
        alt: String,
    },
    LineBreak,
}

/// A list item; task list items carry their checkbox state
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// Some(true) = checked, Some(false) = unchecked, None = no checkbox
    pub checkbox: Option<bool>,
    pub blocks: Vec<Block>,
}

/// Table column alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableAlignment {
    #[default]
    Left,
    Center,
    Right,
}

impl From<Alignment> for TableAlignment {
    fn from(alignment: Alignment) -> Self {
        match alignment {
            Alignment::Center => TableAlignment::Center,
            Alignment::Right => TableAlignment::Right,
            Alignment::None | Alignment::Left => TableAlignment::Left,
        }
    }
}

/// A table cell's inline content
pub type TableCell = Vec<Inline>;

/// A parsed markdown block
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Heading with level (1-6)
    Heading { level: u8, content: Vec<Inline> },

    Paragraph(Vec<Inline>),

    /// Fenced or indented code block
    CodeBlock { lang: Option<String>, code: String },

    /// Unordered or ordered list
    List {
        ordered: bool,
        start: u64,
        items: Vec<ListItem>,
    },

    BlockQuote(Vec<Block>),

    Table {
        alignments: Vec<TableAlignment>,
        header: Vec<TableCell>,
        rows: Vec<Vec<TableCell>>,
    },

    /// Raw HTML, shown as source
    Html(String),

    FootnoteDefinition { label: String, blocks: Vec<Block> },

    Rule,
}

/// Concatenated text of inline content, ignoring styling
#[cfg(test)]
pub fn plain_text(content: &[Inline]) -> String {
    let mut text = String::new();
    for inline in content {
        match inline {
            Inline::Span { text: span, .. } => text.push_str(span),
            Inline::Image { alt, .. } => text.push_str(alt),
            Inline::LineBreak => text.push('\n'),
        }
    }
    text
}

/// Open container while walking the event stream
enum Container {
    Root(Vec<Block>),
    Quote(Vec<Block>),
    List {
        ordered: bool,
        start: u64,
        items: Vec<ListItem>,
    },
    Item(ListItem),
    Footnote {
        label: String,
        blocks: Vec<Block>,
    },
}

#[derive(Default)]
struct TableState {
    alignments: Vec<TableAlignment>,
    header: Vec<TableCell>,
    rows: Vec<Vec<TableCell>>,
    row: Vec<TableCell>,
}

struct BlockBuilder {
    containers: Vec<Container>,
    inlines: Vec<Inline>,
    strong: u32,
    emphasis: u32,
    strikethrough: u32,
    links: Vec<String>,
    image: Option<(String, String)>,
    code: Option<(Option<String>, String)>,
    html: Option<String>,
    table: Option<TableState>,
}

impl BlockBuilder {
    fn new() -> Self {
        Self {
            containers: vec![Container::Root(Vec::new())],
            inlines: Vec::new(),
            strong: 0,
            emphasis: 0,
            strikethrough: 0,
            links: Vec::new(),
            image: None,
            code: None,
            html: None,
            table: None,
        }
    }

    fn style(&self) -> SpanStyle {
        SpanStyle {
            strong: self.strong > 0,
            emphasis: self.emphasis > 0,
            strikethrough: self.strikethrough > 0,
            code: false,
        }
    }

    fn push_span(&mut self, text: &str, style: SpanStyle) {
        let link = self.links.last().cloned();

        if let Some(Inline::Span {
            text: last,
            style: last_style,
            link: last_link,
        }) = self.inlines.last_mut()
        {
            if *last_style == style && *last_link == link {
                last.push_str(text);
                return;
            }
        }

        self.inlines.push(Inline::Span {
            text: text.to_string(),
            style,
            link,
        });
    }

    fn push_block(&mut self, block: Block) {
        match self.containers.last_mut() {
            Some(Container::Root(blocks))
            | Some(Container::Quote(blocks))
            | Some(Container::Footnote { blocks, .. }) => blocks.push(block),
            Some(Container::Item(item)) => item.blocks.push(block),
            Some(Container::List { items, .. }) => {
                if let Some(item) = items.last_mut() {
                    item.blocks.push(block);
                }
            }
            None => {}
        }
    }

    /// Turn pending inline content into a paragraph
    fn flush_paragraph(&mut self) {
        if self.inlines.is_empty() {
            return;
        }
        let content = std::mem::take(&mut self.inlines);
        self.push_block(Block::Paragraph(content));
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph | Tag::Heading { .. } => self.flush_paragraph(),
            Tag::CodeBlock(kind) => {
                self.flush_paragraph();
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };
                self.code = Some((lang, String::new()));
            }
            Tag::HtmlBlock => {
                self.flush_paragraph();
                self.html = Some(String::new());
            }
            Tag::List(start) => {
                self.flush_paragraph();
                self.containers.push(Container::List {
                    ordered: start.is_some(),
                    start: start.unwrap_or(1),
                    items: Vec::new(),
                });
            }
            Tag::Item => {
                self.containers.push(Container::Item(ListItem {
                    checkbox: None,
                    blocks: Vec::new(),
                }));
            }
            Tag::BlockQuote(_) => {
                self.flush_paragraph();
                self.containers.push(Container::Quote(Vec::new()));
            }
            Tag::FootnoteDefinition(label) => {
                self.flush_paragraph();
                self.containers.push(Container::Footnote {
                    label: label.to_string(),
                    blocks: Vec::new(),
                });
            }
            Tag::Table(alignments) => {
                self.flush_paragraph();
                self.table = Some(TableState {
                    alignments: alignments.into_iter().map(TableAlignment::from).collect(),
                    ..Default::default()
                });
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.row.clear();
                }
            }
            Tag::TableCell => self.inlines.clear(),
            Tag::Emphasis => self.emphasis += 1,
            Tag::Strong => self.strong += 1,
            Tag::Strikethrough => self.strikethrough += 1,
            Tag::Link { dest_url, .. } => self.links.push(dest_url.to_string()),
            Tag::Image { dest_url, .. } => self.image = Some((dest_url.to_string(), String::new())),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.flush_paragraph(),
            TagEnd::Heading(level) => {
                let content = std::mem::take(&mut self.inlines);
                self.push_block(Block::Heading {
                    level: level as u8,
                    content,
                });
            }
            TagEnd::CodeBlock => {
                if let Some((lang, code)) = self.code.take() {
                    self.push_block(Block::CodeBlock { lang, code });
                }
            }
            TagEnd::HtmlBlock => {
                if let Some(html) = self.html.take() {
                    self.push_block(Block::Html(html.trim_end().to_string()));
                }
            }
            TagEnd::List(_) => {
                if let Some(Container::List {
                    ordered,
                    start,
                    items,
                }) = self.containers.pop()
                {
                    self.push_block(Block::List {
                        ordered,
                        start,
                        items,
                    });
                }
            }
            TagEnd::Item => {
                // Tight list items carry their text without a paragraph
                self.flush_paragraph();
                if let Some(Container::Item(item)) = self.containers.pop() {
                    if let Some(Container::List { items, .. }) = self.containers.last_mut() {
                        items.push(item);
                    }
                }
            }
            TagEnd::BlockQuote(_) => {
                self.flush_paragraph();
                if let Some(Container::Quote(blocks)) = self.containers.pop() {
                    self.push_block(Block::BlockQuote(blocks));
                }
            }
            TagEnd::FootnoteDefinition => {
                self.flush_paragraph();
                if let Some(Container::Footnote { label, blocks }) = self.containers.pop() {
                    self.push_block(Block::FootnoteDefinition { label, blocks });
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.push_block(Block::Table {
                        alignments: table.alignments,
                        header: table.header,
                        rows: table.rows,
                    });
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.header = std::mem::take(&mut table.row);
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            TagEnd::TableCell => {
                let cell = std::mem::take(&mut self.inlines);
                if let Some(table) = self.table.as_mut() {
                    table.row.push(cell);
                }
            }
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Strikethrough => self.strikethrough = self.strikethrough.saturating_sub(1),
            TagEnd::Link => {
                self.links.pop();
            }
            TagEnd::Image => {
                if let Some((url, alt)) = self.image.take() {
                    self.inlines.push(Inline::Image { url, alt });
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some((_, code)) = self.code.as_mut() {
            code.push_str(text);
        } else if let Some((_, alt)) = self.image.as_mut() {
            alt.push_str(text);
        } else {
            self.push_span(text, self.style());
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush_paragraph();
        // Unwind anything left open by malformed input
        while self.containers.len() > 1 {
            match self.containers.pop() {
                Some(Container::Quote(blocks)) => self.push_block(Block::BlockQuote(blocks)),
                Some(Container::Item(item)) => {
                    if let Some(Container::List { items, .. }) = self.containers.last_mut() {
                        items.push(item);
                    }
                }
                Some(Container::List {
                    ordered,
                    start,
                    items,
                }) => self.push_block(Block::List {
                    ordered,
                    start,
                    items,
                }),
                Some(Container::Footnote { label, blocks }) => {
                    self.push_block(Block::FootnoteDefinition { label, blocks })
                }
                Some(Container::Root(_)) | None => {}
            }
        }

        match self.containers.pop() {
            Some(Container::Root(blocks)) => blocks,
            _ => Vec::new(),
        }
    }
}

/// Parse markdown content into blocks
pub fn parse_blocks(content: &str) -> Vec<Block> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let mut builder = BlockBuilder::new();

    for event in Parser::new_ext(content, options) {
        match event {
            Event::Start(tag) => builder.start(tag),
            Event::End(tag) => builder.end(tag),
            Event::Text(text) => builder.text(&text),
            Event::Code(code) => {
                let style = SpanStyle {
                    code: true,
                    ..builder.style()
                };
                builder.push_span(&code, style);
            }
            Event::Html(html) => {
                if let Some(buffer) = builder.html.as_mut() {
                    buffer.push_str(&html);
                }
            }
            Event::SoftBreak => builder.text(" "),
            Event::HardBreak => builder.inlines.push(Inline::LineBreak),
            Event::Rule => {
                builder.flush_paragraph();
                builder.push_block(Block::Rule);
            }
            Event::TaskListMarker(checked) => {
                if let Some(Container::Item(item)) = builder.containers.last_mut() {
                    item.checkbox = Some(checked);
                }
            }
            Event::FootnoteReference(label) => {
                let style = builder.style();
                builder.push_span(&format!("[{}]", label), style);
            }
            _ => {}
        }
    }

    builder.finish()
}

/// Where a link or image inside a document points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Absolute URL (or in-page anchor) used as is
    External(String),
    /// Path inside the library
    Library(String),
}

/// Resolve a link or image target against the path of the document it
/// appears in.
pub fn resolve_target(document_path: &str, target: &str) -> LinkTarget {
    if target.contains("://")
        || target.starts_with('#')
        || target.starts_with("mailto:")
        || target.starts_with("data:")
    {
        return LinkTarget::External(target.to_string());
    }

    if target.starts_with('/') {
        return LinkTarget::Library(target.to_string());
    }

    let mut segments: Vec<&str> = document_path.split('/').collect();
    segments.pop(); // the document itself

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                // Never climb above the library root
                if segments.len() > 1 {
                    segments.pop();
                }
            }
            other => segments.push(other),
        }
    }

    LinkTarget::Library(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph_text(block: &Block) -> String {
        match block {
            Block::Paragraph(content) => plain_text(content),
            other => panic!("expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn test_headings_and_paragraphs() {
        let blocks = parse_blocks("# Title\n\nSome *soft*\nwrapped text.\n\n### Deep");
        assert_eq!(blocks.len(), 3);

        match &blocks[0] {
            Block::Heading { level, content } => {
                assert_eq!(*level, 1);
                assert_eq!(plain_text(content), "Title");
            }
            other => panic!("expected heading, got {:?}", other),
        }
        assert_eq!(paragraph_text(&blocks[1]), "Some soft wrapped text.");
        assert!(matches!(&blocks[2], Block::Heading { level: 3, .. }));
    }

    #[test]
    fn test_table_is_parsed() {
        let source = "| Term | Meaning |\n|:-----|------:|\n| ion | charged atom |\n| mol | amount |\n";
        let blocks = parse_blocks(source);

        match &blocks[..] {
            [Block::Table {
                alignments,
                header,
                rows,
            }] => {
                assert_eq!(alignments, &[TableAlignment::Left, TableAlignment::Right]);
                let header: Vec<String> = header.iter().map(|cell| plain_text(cell)).collect();
                assert_eq!(header, ["Term", "Meaning"]);
                assert_eq!(rows.len(), 2);
                assert_eq!(plain_text(&rows[1][1]), "amount");
            }
            other => panic!("expected a single table, got {:?}", other),
        }
    }

    #[test]
    fn test_task_list_items_are_checkable() {
        let blocks = parse_blocks("- [x] read chapter 1\n- [ ] solve exercises\n- plain item\n");

        match &blocks[..] {
            [Block::List { ordered, items, .. }] => {
                assert!(!ordered);
                let checkboxes: Vec<Option<bool>> = items.iter().map(|i| i.checkbox).collect();
                assert_eq!(checkboxes, [Some(true), Some(false), None]);
                assert_eq!(paragraph_text(&items[1].blocks[0]), "solve exercises");
            }
            other => panic!("expected a single list, got {:?}", other),
        }
    }

    #[test]
    fn test_strikethrough_and_inline_styles() {
        let blocks = parse_blocks("~~old~~ **bold** `code` [link](notes.md)");
        let Block::Paragraph(content) = &blocks[0] else {
            panic!("expected paragraph");
        };

        let styled: Vec<(&str, SpanStyle, Option<&str>)> = content
            .iter()
            .filter_map(|inline| match inline {
                Inline::Span { text, style, link } => {
                    Some((text.as_str(), *style, link.as_deref()))
                }
                _ => None,
            })
            .collect();

        assert!(styled.contains(&(
            "old",
            SpanStyle {
                strikethrough: true,
                ..Default::default()
            },
            None
        )));
        assert!(styled.contains(&(
            "bold",
            SpanStyle {
                strong: true,
                ..Default::default()
            },
            None
        )));
        assert!(styled.contains(&(
            "code",
            SpanStyle {
                code: true,
                ..Default::default()
            },
            None
        )));
        assert!(styled.contains(&("link", SpanStyle::default(), Some("notes.md"))));
    }

    #[test]
    fn test_nested_lists_and_quotes() {
        let source = "1. first\n   - inner\n2. second\n\n> quoted\n>\n> > deeper\n";
        let blocks = parse_blocks(source);
        assert_eq!(blocks.len(), 2);

        match &blocks[0] {
            Block::List {
                ordered,
                start,
                items,
            } => {
                assert!(ordered);
                assert_eq!(*start, 1);
                assert_eq!(items.len(), 2);
                assert_eq!(paragraph_text(&items[0].blocks[0]), "first");
                assert!(matches!(&items[0].blocks[1], Block::List { ordered: false, .. }));
            }
            other => panic!("expected list, got {:?}", other),
        }

        match &blocks[1] {
            Block::BlockQuote(inner) => {
                assert_eq!(paragraph_text(&inner[0]), "quoted");
                assert!(matches!(&inner[1], Block::BlockQuote(_)));
            }
            other => panic!("expected quote, got {:?}", other),
        }
    }

    #[test]
    fn test_code_block_and_image() {
        let source = "```rust\nfn main() {}\n```\n\n![diagram](img/cell.png)\n\n---\n";
        let blocks = parse_blocks(source);

        assert_eq!(
            blocks[0],
            Block::CodeBlock {
                lang: Some("rust".to_string()),
                code: "fn main() {}\n".to_string(),
            }
        );
        assert_eq!(
            blocks[1],
            Block::Paragraph(vec![Inline::Image {
                url: "img/cell.png".to_string(),
                alt: "diagram".to_string(),
            }])
        );
        assert_eq!(blocks[2], Block::Rule);
    }

    #[test]
    fn test_error_fallback_renders_as_markdown() {
        let fallback = crate::core::session::fallback_content("/materials/bio/cells.md");
        let blocks = parse_blocks(&fallback);

        assert!(matches!(&blocks[0], Block::Heading { level: 1, content } if plain_text(content) == "Error"));
        assert_eq!(
            paragraph_text(&blocks[1]),
            "Unable to load file: /materials/bio/cells.md"
        );
    }

    #[test]
    fn test_html_block_is_kept_as_source() {
        let blocks = parse_blocks("<div>\nraw\n</div>\n");
        assert_eq!(blocks, vec![Block::Html("<div>\nraw\n</div>".to_string())]);
    }

    #[test]
    fn test_resolve_target() {
        let doc = "/materials/bio/cells.md";
        assert_eq!(
            resolve_target(doc, "img/cell.png"),
            LinkTarget::Library("/materials/bio/img/cell.png".to_string())
        );
        assert_eq!(
            resolve_target(doc, "../chem/./atoms.md"),
            LinkTarget::Library("/materials/chem/atoms.md".to_string())
        );
        assert_eq!(
            resolve_target(doc, "/materials/x.png"),
            LinkTarget::Library("/materials/x.png".to_string())
        );
        assert_eq!(
            resolve_target(doc, "https://example.org/a.png"),
            LinkTarget::External("https://example.org/a.png".to_string())
        );
        assert_eq!(
            resolve_target(doc, "#summary"),
            LinkTarget::External("#summary".to_string())
        );
    }
}
