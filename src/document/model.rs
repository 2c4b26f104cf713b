use crate::token::Alignment;

/// Styled text with its character formatting
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub monospace: bool,
    pub underline: bool,
    /// `#RRGGBB`, or the paragraph default when unset
    pub color: Option<String>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// The atomic unit of inline content. A run is plain text, a hard break, or
/// a hyperlink wrapping its own text runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Run {
    Text(TextRun),
    Break,
    Hyperlink {
        href: String,
        display_text: String,
        runs: Vec<TextRun>,
    },
}

impl Run {
    pub fn text(&self) -> &str {
        match self {
            Run::Text(run) => &run.text,
            Run::Break => "\n",
            Run::Hyperlink { display_text, .. } => display_text,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCellNode {
    pub runs: Vec<Run>,
    pub alignment: Alignment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableNode {
    pub header: Vec<TableCellNode>,
    pub rows: Vec<Vec<TableCellNode>>,
    /// Share of the available width, in percent
    pub width_pct: u8,
}

/// One node of the linear document content
#[derive(Debug, Clone, PartialEq)]
pub enum BlockNode {
    Heading {
        level: u8,
        runs: Vec<Run>,
    },
    Paragraph {
        runs: Vec<Run>,
    },
    CodeBlock {
        text: String,
        font: String,
        size_pt: f32,
    },
    Quote {
        text: String,
        italic: bool,
    },
    ListItem {
        runs: Vec<Run>,
        ordered: bool,
        level: u8,
        /// Number shown for an ordered item, counted from its list's start
        number: Option<u64>,
    },
    Table(TableNode),
    /// Packed as an empty paragraph
    BlankLine,
    /// Packed as a centered separator paragraph
    HorizontalRule,
}

impl BlockNode {
    pub fn kind(&self) -> &'static str {
        match self {
            BlockNode::Heading { .. } => "heading",
            BlockNode::Paragraph { .. } => "paragraph",
            BlockNode::CodeBlock { .. } => "code",
            BlockNode::Quote { .. } => "quote",
            BlockNode::ListItem { .. } => "list-item",
            BlockNode::Table(_) => "table",
            BlockNode::BlankLine => "blank",
            BlockNode::HorizontalRule => "hr",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Section {
    pub children: Vec<BlockNode>,
}

/// The structured document handed to a packer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub sections: Vec<Section>,
}

impl Document {
    pub fn single_section(children: Vec<BlockNode>) -> Self {
        Self {
            sections: vec![Section { children }],
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &BlockNode> {
        self.sections.iter().flat_map(|section| section.children.iter())
    }
}
