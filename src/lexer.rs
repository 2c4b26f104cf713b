use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use tracing::debug;

use crate::config::RenderOptions;
use crate::token::{Alignment, Inline, List, ListItem, Table, Token};

/// Lex markdown text into a list of block tokens
pub fn lex(markdown: &str, options: &RenderOptions) -> Vec<Token> {
    let mut cmark_options = Options::empty();
    if options.gfm {
        cmark_options.insert(Options::ENABLE_TABLES);
        cmark_options.insert(Options::ENABLE_TASKLISTS);
        cmark_options.insert(Options::ENABLE_STRIKETHROUGH);
        cmark_options.insert(Options::ENABLE_FOOTNOTES);
        cmark_options.insert(Options::ENABLE_MATH);
        cmark_options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
    }
    let parser = Parser::new_ext(markdown, cmark_options).into_offset_iter();
    let mut state = ParseState::new(options.breaks);

    for (event, range) in parser {
        state.track_spacing(&event, &range, markdown);
        process_event(event, &mut state);
    }

    let tokens = state.finish();
    debug!(tokens = tokens.len(), "lexed markdown");
    tokens
}

struct ParseState {
    breaks: bool,

    // Finished top-level blocks
    blocks: Vec<Token>,
    // Open container blocks, innermost last
    containers: Vec<Container>,

    // Current inline content being built
    spans: Vec<Inline>,
    // Open inline formatting and the parent buffers it interrupted
    inline_stack: Vec<InlineFrame>,
    span_stack: Vec<Vec<Inline>>,

    // Current heading level (if in a heading)
    heading_level: Option<u8>,

    // Code block state
    in_code_block: bool,
    code_language: Option<String>,
    code_content: String,

    // HTML block state
    in_html_block: bool,
    html_content: String,

    // Front matter is skipped
    in_metadata_block: bool,

    // Table state
    table_alignments: Vec<Alignment>,
    table_header: Vec<Vec<Inline>>,
    table_rows: Vec<Vec<Vec<Inline>>>,
    current_row: Vec<Vec<Inline>>,
    in_table_head: bool,

    // Top-level block spacing
    nesting: usize,
    last_block_end: Option<usize>,
}

enum Container {
    Blockquote(Vec<Token>),
    List {
        ordered: bool,
        start: Option<u64>,
        items: Vec<ListItem>,
    },
    Item(ListItem),
    Footnote {
        label: String,
        blocks: Vec<Token>,
    },
}

enum InlineFrame {
    Strong,
    Emphasis,
    Strikethrough,
    Link { href: String, title: Option<String> },
    Image { href: String, title: Option<String> },
}

impl ParseState {
    fn new(breaks: bool) -> Self {
        Self {
            breaks,
            blocks: Vec::new(),
            containers: Vec::new(),
            spans: Vec::new(),
            inline_stack: Vec::new(),
            span_stack: Vec::new(),
            heading_level: None,
            in_code_block: false,
            code_language: None,
            code_content: String::new(),
            in_html_block: false,
            html_content: String::new(),
            in_metadata_block: false,
            table_alignments: Vec::new(),
            table_header: Vec::new(),
            table_rows: Vec::new(),
            current_row: Vec::new(),
            in_table_head: false,
            nesting: 0,
            last_block_end: None,
        }
    }

    /// Emit a blank-space token when two top-level blocks are separated by
    /// two or more blank lines.
    fn track_spacing(&mut self, event: &Event, range: &Range<usize>, source: &str) {
        let starts_top_level = matches!(event, Event::Start(_) | Event::Rule) && self.nesting == 0;
        if starts_top_level {
            if let Some(prev_end) = self.last_block_end {
                if blank_lines_between(source, prev_end, range.start) >= 2 {
                    self.blocks.push(Token::BlankSpace);
                }
            }
        }

        match event {
            Event::Start(_) => self.nesting += 1,
            Event::End(_) => {
                self.nesting = self.nesting.saturating_sub(1);
                if self.nesting == 0 {
                    self.last_block_end = Some(range.end);
                }
            }
            Event::Rule if self.nesting == 0 => self.last_block_end = Some(range.end),
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(Inline::Text(last)) = self.spans.last_mut() {
            last.push_str(text);
        } else {
            self.spans.push(Inline::Text(text.to_string()));
        }
    }

    /// Move loose text of a tight list item into the item before a nested
    /// block starts.
    fn flush_item_text(&mut self) {
        if self.spans.is_empty() {
            return;
        }
        if let Some(Container::Item(item)) = self.containers.last_mut() {
            item.content.append(&mut self.spans);
        }
    }

    fn push_block(&mut self, token: Token) {
        match self.containers.last_mut() {
            Some(Container::Item(item)) => match token {
                Token::Paragraph(content) if item.children.is_empty() => {
                    // Paragraphs of a loose item share one line of content
                    if !item.content.is_empty() {
                        item.content.push(Inline::LineBreak);
                    }
                    item.content.extend(content);
                }
                other => item.children.push(other),
            },
            Some(Container::Blockquote(blocks)) | Some(Container::Footnote { blocks, .. }) => {
                blocks.push(token)
            }
            Some(Container::List { .. }) | None => self.blocks.push(token),
        }
    }

    fn open_inline(&mut self, frame: InlineFrame) {
        self.inline_stack.push(frame);
        self.span_stack.push(std::mem::take(&mut self.spans));
    }

    fn close_inline(&mut self) {
        let (Some(frame), Some(mut parent)) = (self.inline_stack.pop(), self.span_stack.pop())
        else {
            return;
        };
        let children = std::mem::take(&mut self.spans);
        let inline = match frame {
            InlineFrame::Strong => Inline::Strong(children),
            InlineFrame::Emphasis => Inline::Emphasis(children),
            InlineFrame::Strikethrough => Inline::Other {
                kind: "strikethrough",
                text: crate::token::plain_text(&children),
            },
            InlineFrame::Link { href, title } => Inline::Link {
                href,
                title,
                children,
            },
            InlineFrame::Image { href, title } => Inline::Image {
                href,
                title,
                alt: crate::token::plain_text(&children),
            },
        };
        parent.push(inline);
        self.spans = parent;
    }

    fn finish(mut self) -> Vec<Token> {
        // Unbalanced input cannot come out of pulldown-cmark, but close
        // anything left open rather than lose content.
        while let Some(container) = self.containers.pop() {
            let token = match container {
                Container::Blockquote(blocks) => Token::Blockquote(blocks),
                Container::List {
                    ordered,
                    start,
                    items,
                } => Token::List(List {
                    ordered,
                    start,
                    items,
                }),
                Container::Item(item) => Token::List(List {
                    ordered: false,
                    start: None,
                    items: vec![item],
                }),
                Container::Footnote { label, blocks } => footnote_token(&label, &blocks),
            };
            self.push_block(token);
        }
        self.blocks
    }
}

fn process_event(event: Event, state: &mut ParseState) {
    match event {
        // Headings
        Event::Start(Tag::Heading { level, .. }) => {
            state.flush_item_text();
            state.heading_level = Some(heading_level_to_u8(level));
        }
        Event::End(TagEnd::Heading(_)) => {
            if let Some(depth) = state.heading_level.take() {
                let children = std::mem::take(&mut state.spans);
                state.push_block(Token::Heading { depth, children });
            }
        }

        // Paragraphs
        Event::Start(Tag::Paragraph) => state.flush_item_text(),
        Event::End(TagEnd::Paragraph) => {
            let content = std::mem::take(&mut state.spans);
            // A paragraph holding only display math is a block of its own
            if let [Inline::Other {
                kind: DISPLAY_MATH,
                text,
            }] = content.as_slice()
            {
                let text = Some(text.clone());
                state.push_block(Token::Unknown {
                    kind: DISPLAY_MATH.to_string(),
                    text,
                });
            } else if !content.is_empty() {
                state.push_block(Token::Paragraph(content));
            }
        }

        // Text content
        Event::Text(text) => {
            if state.in_metadata_block {
                return;
            }
            if state.in_code_block {
                state.code_content.push_str(&text);
            } else {
                state.push_text(&text);
            }
        }

        // Inline code
        Event::Code(code) => state.spans.push(Inline::CodeSpan(code.into_string())),

        // Math keeps its delimiters
        Event::InlineMath(math) => state.spans.push(Inline::Other {
            kind: "math",
            text: format!("${}$", math),
        }),
        Event::DisplayMath(math) => state.spans.push(Inline::Other {
            kind: DISPLAY_MATH,
            text: format!("$${}$$", math),
        }),

        // Inline formatting
        Event::Start(Tag::Strong) => state.open_inline(InlineFrame::Strong),
        Event::Start(Tag::Emphasis) => state.open_inline(InlineFrame::Emphasis),
        Event::Start(Tag::Strikethrough) => state.open_inline(InlineFrame::Strikethrough),
        Event::Start(Tag::Link {
            dest_url, title, ..
        }) => state.open_inline(InlineFrame::Link {
            href: dest_url.into_string(),
            title: non_empty(title),
        }),
        Event::Start(Tag::Image {
            dest_url, title, ..
        }) => state.open_inline(InlineFrame::Image {
            href: dest_url.into_string(),
            title: non_empty(title),
        }),
        Event::End(TagEnd::Strong)
        | Event::End(TagEnd::Emphasis)
        | Event::End(TagEnd::Strikethrough)
        | Event::End(TagEnd::Link)
        | Event::End(TagEnd::Image) => state.close_inline(),

        // Code blocks
        Event::Start(Tag::CodeBlock(kind)) => {
            state.flush_item_text();
            state.in_code_block = true;
            state.code_language = match kind {
                CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_string),
                CodeBlockKind::Indented => None,
            };
            state.code_content.clear();
        }
        Event::End(TagEnd::CodeBlock) => {
            state.in_code_block = false;
            let mut text = std::mem::take(&mut state.code_content);
            if text.ends_with('\n') {
                text.pop();
            }
            let language = state.code_language.take();
            state.push_block(Token::Code { text, language });
        }

        // Raw HTML
        Event::Start(Tag::HtmlBlock) => {
            state.flush_item_text();
            state.in_html_block = true;
            state.html_content.clear();
        }
        Event::End(TagEnd::HtmlBlock) => {
            state.in_html_block = false;
            let html = std::mem::take(&mut state.html_content);
            state.push_block(Token::Html(html));
        }
        Event::Html(html) => {
            if state.in_html_block {
                state.html_content.push_str(&html);
            } else {
                state.spans.push(Inline::Html(html.into_string()));
            }
        }
        Event::InlineHtml(html) => state.spans.push(Inline::Html(html.into_string())),

        // Block quotes
        Event::Start(Tag::BlockQuote(_)) => {
            state.flush_item_text();
            state.containers.push(Container::Blockquote(Vec::new()));
        }
        Event::End(TagEnd::BlockQuote(_)) => {
            if let Some(Container::Blockquote(blocks)) = state.containers.pop() {
                state.push_block(Token::Blockquote(blocks));
            }
        }

        // Lists
        Event::Start(Tag::List(first_number)) => {
            state.flush_item_text();
            state.containers.push(Container::List {
                ordered: first_number.is_some(),
                start: first_number,
                items: Vec::new(),
            });
        }
        Event::End(TagEnd::List(_)) => {
            if let Some(Container::List {
                ordered,
                start,
                items,
            }) = state.containers.pop()
            {
                state.push_block(Token::List(List {
                    ordered,
                    start,
                    items,
                }));
            }
        }
        Event::Start(Tag::Item) => state.containers.push(Container::Item(ListItem::default())),
        Event::End(TagEnd::Item) => {
            state.flush_item_text();
            if let Some(Container::Item(item)) = state.containers.pop() {
                if let Some(Container::List { items, .. }) = state.containers.last_mut() {
                    items.push(item);
                }
            }
        }

        // Task list checkboxes
        Event::TaskListMarker(checked) => {
            if let Some(Container::Item(item)) = state.containers.last_mut() {
                item.checked = Some(checked);
            }
        }

        // Tables
        Event::Start(Tag::Table(alignments)) => {
            state.flush_item_text();
            state.table_alignments = alignments.into_iter().map(convert_alignment).collect();
            state.table_header.clear();
            state.table_rows.clear();
        }
        Event::End(TagEnd::Table) => {
            let table = Table {
                alignments: std::mem::take(&mut state.table_alignments),
                header: std::mem::take(&mut state.table_header),
                rows: std::mem::take(&mut state.table_rows),
            };
            state.push_block(Token::Table(table));
        }
        Event::Start(Tag::TableHead) => {
            state.in_table_head = true;
            state.current_row.clear();
        }
        Event::End(TagEnd::TableHead) => {
            state.in_table_head = false;
            state.table_header = std::mem::take(&mut state.current_row);
        }
        Event::Start(Tag::TableRow) => state.current_row.clear(),
        Event::End(TagEnd::TableRow) => {
            if !state.in_table_head {
                let row = std::mem::take(&mut state.current_row);
                state.table_rows.push(row);
            }
        }
        Event::Start(Tag::TableCell) => state.spans.clear(),
        Event::End(TagEnd::TableCell) => {
            let cell = std::mem::take(&mut state.spans);
            state.current_row.push(cell);
        }

        // Footnotes
        Event::Start(Tag::FootnoteDefinition(label)) => {
            state.flush_item_text();
            state.containers.push(Container::Footnote {
                label: label.into_string(),
                blocks: Vec::new(),
            });
        }
        Event::End(TagEnd::FootnoteDefinition) => {
            if let Some(Container::Footnote { label, blocks }) = state.containers.pop() {
                state.push_block(footnote_token(&label, &blocks));
            }
        }
        Event::FootnoteReference(label) => state.spans.push(Inline::Other {
            kind: "footnote-reference",
            text: format!("[^{}]", label),
        }),

        // Front matter
        Event::Start(Tag::MetadataBlock(_)) => state.in_metadata_block = true,
        Event::End(TagEnd::MetadataBlock(_)) => {
            state.in_metadata_block = false;
            state.push_block(Token::Unknown {
                kind: "metadata".to_string(),
                text: None,
            });
        }

        // Horizontal rule
        Event::Rule => {
            state.flush_item_text();
            state.push_block(Token::HorizontalRule);
        }

        // Soft/hard breaks
        Event::SoftBreak => {
            if state.breaks {
                state.spans.push(Inline::LineBreak);
            } else {
                state.push_text(" ");
            }
        }
        Event::HardBreak => state.spans.push(Inline::LineBreak),

        // Ignore other events
        _ => {}
    }
}

const DISPLAY_MATH: &str = "display-math";

fn footnote_token(label: &str, blocks: &[Token]) -> Token {
    let body: Vec<String> = blocks.iter().map(Token::plain_text).collect();
    Token::Unknown {
        kind: "footnote".to_string(),
        text: Some(format!("[^{}]: {}", label, body.join(" "))),
    }
}

fn blank_lines_between(source: &str, end: usize, start: usize) -> usize {
    let Some(gap) = source.get(end..start) else {
        return 0;
    };
    // Count the line ending of the previous block whether or not its range
    // included it.
    let mut newlines = gap.matches('\n').count();
    if source.get(..end).is_some_and(|before| before.ends_with('\n')) {
        newlines += 1;
    }
    newlines.saturating_sub(1)
}

fn non_empty(value: CowStr) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.into_string())
    }
}

fn convert_alignment(alignment: pulldown_cmark::Alignment) -> Alignment {
    match alignment {
        pulldown_cmark::Alignment::None => Alignment::None,
        pulldown_cmark::Alignment::Left => Alignment::Left,
        pulldown_cmark::Alignment::Center => Alignment::Center,
        pulldown_cmark::Alignment::Right => Alignment::Right,
    }
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
