//! Word-processor style contract shared by the HTML and DOCX outputs.
//!
//! Every colour and size both renderers use comes from here. Sizes are in
//! points; [`half_points`] and [`twips`] convert for the DOCX packer.

/// Body text font
pub const BODY_FONT: &str = "Calibri";
pub const BODY_SIZE_PT: f32 = 11.0;
pub const TEXT_COLOR: &str = "#000000";

pub const HEADING_FONT: &str = "Calibri Light";

/// Paragraph spacing
pub const PARAGRAPH_SPACE_AFTER_PT: f32 = 10.0;

pub const LINK_COLOR: &str = "#0563C1";

/// Placeholder runs standing in for images in the structured document
pub const MUTED_COLOR: &str = "#7F7F7F";

pub const LIST_INDENT_PT: f32 = 24.0;
pub const LIST_SPACE_AFTER_PT: f32 = 10.0;
pub const LIST_ITEM_SPACE_AFTER_PT: f32 = 3.0;

pub const TABLE_BORDER_COLOR: &str = "#000000";
pub const TABLE_HEADER_FILL: &str = "#e7e6e6";
pub const TABLE_CELL_PADDING_PT: f32 = 6.0;
pub const TABLE_SPACE_AFTER_PT: f32 = 15.0;

pub const CODE_FONT: &str = "Consolas";
pub const CODE_SIZE_PT: f32 = 10.0;
pub const CODE_BACKGROUND: &str = "#f8f8f8";
pub const CODE_BORDER_COLOR: &str = "#a6a6a6";
pub const CODE_LABEL_BACKGROUND: &str = "#e0e0e0";
pub const CODE_LABEL_COLOR: &str = "#555555";
pub const CODE_LABEL_SIZE_PT: f32 = 8.0;

pub const QUOTE_BORDER_COLOR: &str = "#5b9bd5";
pub const QUOTE_BORDER_PX: u32 = 4;
pub const QUOTE_TEXT_COLOR: &str = "#404040";
pub const QUOTE_PADDING_PT: f32 = 10.0;

/// Literal stand-in for a horizontal rule
pub const RULE_SEPARATOR: &str = "* * *";

/// Typography of one heading level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingStyle {
    pub size_pt: f32,
    pub color: &'static str,
    pub space_before_pt: f32,
    pub space_after_pt: f32,
    pub bold: bool,
}

pub const HEADING_1: HeadingStyle = HeadingStyle {
    size_pt: 16.0,
    color: "#2F5496",
    space_before_pt: 24.0,
    space_after_pt: 6.0,
    bold: false,
};

pub const HEADING_2: HeadingStyle = HeadingStyle {
    size_pt: 13.0,
    color: "#2F5496",
    space_before_pt: 18.0,
    space_after_pt: 4.0,
    bold: false,
};

pub const HEADING_3: HeadingStyle = HeadingStyle {
    size_pt: 12.0,
    color: "#1F3763",
    space_before_pt: 14.0,
    space_after_pt: 4.0,
    bold: true,
};

/// Clamp a heading depth into 1..=6. Anything outside falls back to the top level.
pub fn clamp_heading_level(depth: u8) -> u8 {
    if (1..=6).contains(&depth) { depth } else { 1 }
}

/// Style for a heading depth. Depths 4-6 reuse the level 1 style.
pub fn heading_style(depth: u8) -> HeadingStyle {
    match clamp_heading_level(depth) {
        2 => HEADING_2,
        3 => HEADING_3,
        _ => HEADING_1,
    }
}

impl HeadingStyle {
    /// Inline CSS declarations for this heading
    pub fn css(&self) -> String {
        format!(
            "font-family: '{}', sans-serif; font-size: {}pt; color: {}; margin-top: {}pt; margin-bottom: {}pt; font-weight: {};",
            HEADING_FONT,
            self.size_pt,
            self.color,
            self.space_before_pt,
            self.space_after_pt,
            if self.bold { "bold" } else { "normal" },
        )
    }
}

pub fn paragraph_css() -> String {
    format!(
        "margin-top: 0; margin-bottom: {}pt; color: {};",
        PARAGRAPH_SPACE_AFTER_PT, TEXT_COLOR
    )
}

pub fn link_css() -> String {
    format!("color: {}; text-decoration: underline;", LINK_COLOR)
}

pub fn image_css() -> &'static str {
    "max-width: 100%; height: auto; vertical-align: middle; margin: 4pt;"
}

pub fn list_css(ordered: bool) -> String {
    format!(
        "margin-top: 0; margin-bottom: {}pt; padding-left: {}pt; list-style-type: {};",
        LIST_SPACE_AFTER_PT,
        LIST_INDENT_PT,
        if ordered { "decimal" } else { "disc" },
    )
}

pub fn list_item_css() -> String {
    format!(
        "margin-bottom: {}pt; color: {};",
        LIST_ITEM_SPACE_AFTER_PT, TEXT_COLOR
    )
}

pub fn table_css() -> String {
    format!(
        "border-collapse: collapse; width: 100%; margin-bottom: {}pt; border: 1px solid {};",
        TABLE_SPACE_AFTER_PT, TABLE_BORDER_COLOR
    )
}

pub fn table_header_cell_css() -> String {
    format!(
        "border: 1px solid {}; background-color: {}; padding: {}pt; text-align: left; font-weight: bold; color: {} !important;",
        TABLE_BORDER_COLOR, TABLE_HEADER_FILL, TABLE_CELL_PADDING_PT, TEXT_COLOR
    )
}

pub fn table_cell_css() -> String {
    format!(
        "border: 1px solid {}; padding: {}pt; vertical-align: top; color: {} !important;",
        TABLE_BORDER_COLOR, TABLE_CELL_PADDING_PT, TEXT_COLOR
    )
}

pub fn blockquote_css() -> String {
    format!(
        "margin-left: 0; padding-left: {}pt; border-left: {}px solid {}; color: {}; font-style: italic;",
        QUOTE_PADDING_PT, QUOTE_BORDER_PX, QUOTE_BORDER_COLOR, QUOTE_TEXT_COLOR
    )
}

pub fn code_wrapper_css() -> &'static str {
    "margin-bottom: 12pt; margin-top: 10pt; page-break-inside: avoid;"
}

pub fn code_label_css() -> String {
    format!(
        "font-family: '{}', sans-serif; font-size: {}pt; color: {}; font-weight: bold; text-transform: uppercase; background: {}; padding: 2pt 6pt; border: 1px solid {}; border-bottom: none; display: inline-block; border-radius: 4px 4px 0 0;",
        BODY_FONT, CODE_LABEL_SIZE_PT, CODE_LABEL_COLOR, CODE_LABEL_BACKGROUND, CODE_BORDER_COLOR
    )
}

/// The `pre` block joins the label chip when one sits on top of it.
pub fn code_block_css(labelled: bool) -> String {
    let (margin_top, radius) = if labelled {
        ("0", "0 4px 4px 4px")
    } else {
        ("10pt", "4px")
    };
    format!(
        "background-color: {}; border: 1px solid {}; padding: 8pt; margin-top: {}; border-radius: {}; font-family: '{}', 'Courier New', monospace; font-size: {}pt; color: {}; white-space: pre-wrap; word-wrap: break-word;",
        CODE_BACKGROUND, CODE_BORDER_COLOR, margin_top, radius, CODE_FONT, CODE_SIZE_PT, TEXT_COLOR
    )
}

pub fn rule_css() -> String {
    format!("text-align: center; {}", paragraph_css())
}

/// Points to DOCX half-points (run font sizes)
pub fn half_points(pt: f32) -> usize {
    (pt * 2.0).round() as usize
}

/// Points to DOCX twips (spacing and indents)
pub fn twips(pt: f32) -> u32 {
    (pt * 20.0).round() as u32
}

/// CSS pixels (3/4 pt) to DOCX border widths in eighths of a point
pub fn border_eighths(px: u32) -> usize {
    px as usize * 6
}

/// `#RRGGBB` to the bare hex DOCX expects, upper-cased
pub fn docx_color(css: &str) -> String {
    css.trim_start_matches('#').to_ascii_uppercase()
}
