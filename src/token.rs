/// Inline tokens inside a block
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    CodeSpan(String),
    Link {
        href: String,
        title: Option<String>,
        children: Vec<Inline>,
    },
    Image {
        href: String,
        title: Option<String>,
        alt: String,
    },
    LineBreak,
    /// Raw inline HTML, passed through by the HTML renderer
    Html(String),
    /// Any other inline kind (strikethrough, math, footnote references).
    /// Rendered as its raw text, unstyled.
    Other { kind: &'static str, text: String },
}

impl Inline {
    fn push_plain_text(&self, out: &mut String) {
        match self {
            Inline::Text(text) | Inline::CodeSpan(text) | Inline::Html(text) => out.push_str(text),
            Inline::Strong(children) | Inline::Emphasis(children) => {
                for child in children {
                    child.push_plain_text(out);
                }
            }
            Inline::Link { children, .. } => {
                for child in children {
                    child.push_plain_text(out);
                }
            }
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::LineBreak => out.push('\n'),
            Inline::Other { text, .. } => out.push_str(text),
        }
    }
}

/// Plain text of a run of inline tokens.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        inline.push_plain_text(&mut out);
    }
    out
}

/// A single list item: its inline content plus any nested blocks
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListItem {
    pub content: Vec<Inline>,
    /// Task list marker, if the item has one
    pub checked: Option<bool>,
    /// Nested blocks (sub-lists, code blocks, quotes)
    pub children: Vec<Token>,
}

/// A list (ordered or unordered)
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub ordered: bool,
    /// First number of an ordered list
    pub start: Option<u64>,
    pub items: Vec<ListItem>,
}

/// GFM column alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_css(self) -> Option<&'static str> {
        match self {
            Alignment::None => None,
            Alignment::Left => Some("left"),
            Alignment::Center => Some("center"),
            Alignment::Right => Some("right"),
        }
    }
}

pub type TableCell = Vec<Inline>;

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub alignments: Vec<Alignment>,
    pub header: Vec<TableCell>,
    pub rows: Vec<Vec<TableCell>>,
}

impl Table {
    pub fn alignment(&self, column: usize) -> Alignment {
        self.alignments.get(column).copied().unwrap_or_default()
    }
}

/// Block-level tokens produced from Markdown.
///
/// Tokens are immutable once produced and each one is consumed by exactly
/// one translator call per render pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Heading {
        depth: u8,
        children: Vec<Inline>,
    },
    Paragraph(Vec<Inline>),
    List(List),
    Table(Table),
    Blockquote(Vec<Token>),
    Code {
        text: String,
        language: Option<String>,
    },
    HorizontalRule,
    /// Extra vertical space between two top-level blocks
    BlankSpace,
    /// Raw HTML block
    Html(String),
    /// A block kind the translators have no rule for
    Unknown {
        kind: String,
        text: Option<String>,
    },
}

impl Token {
    /// Flattened text of the block. Nested blocks are joined with a space.
    pub fn plain_text(&self) -> String {
        match self {
            Token::Heading { children, .. } | Token::Paragraph(children) => plain_text(children),
            Token::List(list) => {
                let items: Vec<String> = list
                    .items
                    .iter()
                    .map(|item| {
                        let mut parts = vec![plain_text(&item.content)];
                        parts.extend(item.children.iter().map(Token::plain_text));
                        parts.join(" ")
                    })
                    .collect();
                items.join(" ")
            }
            Token::Table(table) => {
                let cells: Vec<String> = table
                    .header
                    .iter()
                    .chain(table.rows.iter().flatten())
                    .map(|cell| plain_text(cell))
                    .collect();
                cells.join(" ")
            }
            Token::Blockquote(blocks) => {
                let parts: Vec<String> = blocks.iter().map(Token::plain_text).collect();
                parts.join(" ")
            }
            Token::Code { text, .. } | Token::Html(text) => text.clone(),
            Token::HorizontalRule | Token::BlankSpace => String::new(),
            Token::Unknown { text, .. } => text.clone().unwrap_or_default(),
        }
    }
}
