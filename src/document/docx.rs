//! DOCX packing with `docx-rs`.

use std::io::Cursor;

use docx_rs::{
    AbstractNumbering, AlignmentType, BreakType, Docx, Hyperlink, HyperlinkData, HyperlinkType,
    IndentLevel, Level, LevelJc, LevelOverride, LevelText, LineSpacing, NumberFormat, Numbering,
    NumberingId, Paragraph, ParagraphBorder, ParagraphBorderPosition, ParagraphBorders, RunFonts,
    Shading, SpecialIndentType, Start, Style, StyleType, Table, TableCell, TableRow, WidthType,
};
use tracing::debug;

use crate::document::model::{BlockNode, Document, Run, TableCellNode, TableNode, TextRun};
use crate::error::{Error, Result};
use crate::style::{self, docx_color, half_points, twips};
use crate::token::Alignment;

/// Serializes a structured document into downloadable file bytes.
pub trait DocumentPacker {
    fn pack(&self, document: &Document) -> Result<Vec<u8>>;
}

/// Packs documents as Office Open XML (`.docx`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxPacker;

impl DocumentPacker for DocxPacker {
    fn pack(&self, document: &Document) -> Result<Vec<u8>> {
        let mut builder = DocxBuilder::new();
        for node in document.nodes() {
            builder.push(node);
        }
        let docx = builder.finish();

        let mut buffer = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut buffer)
            .map_err(|e| Error::Pack(e.to_string()))?;
        let bytes = buffer.into_inner();
        debug!(bytes = bytes.len(), "packed docx");
        Ok(bytes)
    }
}

const BULLET_ABSTRACT_ID: usize = 1;
const DECIMAL_ABSTRACT_ID: usize = 2;
const BULLET_NUMBERING_ID: usize = 1;

// Text width of a Letter page with default margins, in twips
const TEXT_WIDTH_TWIPS: usize = 9360;
// Table widths in fiftieths of a percent
const PCT_SCALE: usize = 50;

/// Character formatting a block applies under its runs
#[derive(Default)]
struct RunBase {
    size: Option<usize>,
    color: Option<String>,
    bold: bool,
    italic: bool,
    font: Option<&'static str>,
}

struct DocxBuilder {
    docx: Docx,
    next_numbering_id: usize,
    // Numbering instance of the ordered list being written, with the number
    // its next item shows
    ordered_numbering: Option<(usize, u64)>,
    // External hyperlinks written so far
    hyperlinks: usize,
    paragraphs: usize,
}

impl DocxBuilder {
    fn new() -> Self {
        let mut docx = Docx::new()
            .default_fonts(RunFonts::new().ascii(style::BODY_FONT).hi_ansi(style::BODY_FONT))
            .default_size(half_points(style::BODY_SIZE_PT));

        for level in 1..=6u8 {
            let heading = style::heading_style(level);
            let mut definition = Style::new(format!("Heading{}", level), StyleType::Paragraph)
                .name(format!("Heading {}", level))
                .size(half_points(heading.size_pt))
                .color(docx_color(heading.color));
            if heading.bold {
                definition = definition.bold();
            }
            docx = docx.add_style(definition);
        }

        let list_indent = twips(style::LIST_INDENT_PT) as i32;
        let hanging = list_indent / 2;
        docx = docx
            .add_abstract_numbering(
                AbstractNumbering::new(BULLET_ABSTRACT_ID).add_level(
                    Level::new(
                        0,
                        Start::new(1),
                        NumberFormat::new("bullet"),
                        LevelText::new("•"),
                        LevelJc::new("left"),
                    )
                    .indent(
                        Some(list_indent),
                        Some(SpecialIndentType::Hanging(hanging)),
                        None,
                        None,
                    ),
                ),
            )
            .add_abstract_numbering(
                AbstractNumbering::new(DECIMAL_ABSTRACT_ID).add_level(
                    Level::new(
                        0,
                        Start::new(1),
                        NumberFormat::new("decimal"),
                        LevelText::new("%1."),
                        LevelJc::new("left"),
                    )
                    .indent(
                        Some(list_indent),
                        Some(SpecialIndentType::Hanging(hanging)),
                        None,
                        None,
                    ),
                ),
            )
            .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_ABSTRACT_ID));

        Self {
            docx,
            next_numbering_id: BULLET_NUMBERING_ID + 1,
            ordered_numbering: None,
            hyperlinks: 0,
            paragraphs: 0,
        }
    }

    fn push(&mut self, node: &BlockNode) {
        match node {
            BlockNode::Heading { level, runs } => {
                let heading = style::heading_style(*level);
                let base = RunBase {
                    size: Some(half_points(heading.size_pt)),
                    color: Some(docx_color(heading.color)),
                    bold: heading.bold,
                    font: Some(style::HEADING_FONT),
                    ..RunBase::default()
                };
                let paragraph = Paragraph::new()
                    .style(&format!("Heading{}", level))
                    .line_spacing(
                        LineSpacing::new()
                            .before(twips(heading.space_before_pt))
                            .after(twips(heading.space_after_pt)),
                    );
                let paragraph = self.add_runs(paragraph, runs, &base);
                self.add_paragraph(paragraph);
            }
            BlockNode::Paragraph { runs } => {
                let paragraph = Paragraph::new().line_spacing(
                    LineSpacing::new().after(twips(style::PARAGRAPH_SPACE_AFTER_PT)),
                );
                let paragraph = self.add_runs(paragraph, runs, &RunBase::default());
                self.add_paragraph(paragraph);
            }
            BlockNode::CodeBlock {
                text,
                font,
                size_pt,
            } => {
                let mut run = docx_rs::Run::new()
                    .fonts(RunFonts::new().ascii(font).hi_ansi(font))
                    .size(half_points(*size_pt));
                for (i, line) in text.split('\n').enumerate() {
                    if i > 0 {
                        run = run.add_break(BreakType::TextWrapping);
                    }
                    run = run.add_text(line);
                }
                let paragraph = Paragraph::new()
                    .line_spacing(LineSpacing::new().after(twips(style::PARAGRAPH_SPACE_AFTER_PT)))
                    .add_run(run);
                self.add_paragraph(paragraph);
            }
            BlockNode::Quote { text, italic } => {
                let mut run = docx_rs::Run::new().color(docx_color(style::QUOTE_TEXT_COLOR));
                if *italic {
                    run = run.italic();
                }
                for (i, line) in text.split('\n').enumerate() {
                    if i > 0 {
                        run = run.add_break(BreakType::TextWrapping);
                    }
                    run = run.add_text(line);
                }
                let mut paragraph = Paragraph::new()
                    .indent(Some(twips(style::QUOTE_PADDING_PT) as i32), None, None, None)
                    .line_spacing(LineSpacing::new().after(twips(style::PARAGRAPH_SPACE_AFTER_PT)))
                    .add_run(run);
                paragraph.property = paragraph.property.set_borders(quote_border());
                self.add_paragraph(paragraph);
            }
            BlockNode::ListItem {
                runs,
                ordered,
                level,
                number,
            } => {
                let numbering = if *ordered {
                    self.ordered_numbering_id(*number)
                } else {
                    BULLET_NUMBERING_ID
                };
                let paragraph = Paragraph::new()
                    .numbering(NumberingId::new(numbering), IndentLevel::new(*level as usize))
                    .line_spacing(LineSpacing::new().after(twips(style::LIST_ITEM_SPACE_AFTER_PT)));
                let paragraph = self.add_runs(paragraph, runs, &RunBase::default());
                self.add_paragraph(paragraph);
            }
            BlockNode::Table(table) => self.add_table(table),
            BlockNode::BlankLine => self.add_paragraph(Paragraph::new()),
            BlockNode::HorizontalRule => {
                let paragraph = Paragraph::new()
                    .align(AlignmentType::Center)
                    .add_run(docx_rs::Run::new().add_text(style::RULE_SEPARATOR));
                self.add_paragraph(paragraph);
            }
        }
    }

    /// An ordered item stays on the open numbering instance while its number
    /// follows on from the previous item. Any other number opens a fresh
    /// instance that starts there; an item without a number continues.
    fn ordered_numbering_id(&mut self, number: Option<u64>) -> usize {
        if let Some((id, next)) = self.ordered_numbering {
            if number.is_none_or(|number| number == next) {
                self.ordered_numbering = Some((id, next + 1));
                return id;
            }
        }

        let start = number.unwrap_or(1);
        let id = self.next_numbering_id;
        self.next_numbering_id += 1;
        let docx = std::mem::take(&mut self.docx);
        self.docx = docx.add_numbering(
            Numbering::new(id, DECIMAL_ABSTRACT_ID)
                .add_override(LevelOverride::new(0).start(start as usize)),
        );
        self.ordered_numbering = Some((id, start + 1));
        id
    }

    fn add_paragraph(&mut self, paragraph: Paragraph) {
        let docx = std::mem::take(&mut self.docx);
        self.docx = docx.add_paragraph(paragraph);
        self.paragraphs += 1;
    }

    fn add_table(&mut self, node: &TableNode) {
        let columns = node
            .header
            .len()
            .max(node.rows.iter().map(Vec::len).max().unwrap_or(0));
        if columns == 0 {
            return;
        }

        let mut rows = Vec::with_capacity(node.rows.len() + 1);
        if !node.header.is_empty() {
            let base = RunBase {
                bold: true,
                ..RunBase::default()
            };
            let cells = node
                .header
                .iter()
                .map(|cell| {
                    self.table_cell(cell, &base)
                        .shading(Shading::new().fill(docx_color(style::TABLE_HEADER_FILL)))
                })
                .collect();
            rows.push(TableRow::new(cells));
        }
        for row in &node.rows {
            let cells = row
                .iter()
                .map(|cell| self.table_cell(cell, &RunBase::default()))
                .collect();
            rows.push(TableRow::new(cells));
        }

        let table = Table::new(rows)
            .set_grid(vec![TEXT_WIDTH_TWIPS / columns; columns])
            .width(node.width_pct as usize * PCT_SCALE, WidthType::Pct);
        let docx = std::mem::take(&mut self.docx);
        self.docx = docx.add_table(table);
    }

    fn finish(mut self) -> Docx {
        // Word refuses a body without a paragraph
        if self.paragraphs == 0 {
            self.add_paragraph(Paragraph::new());
        }
        self.docx
    }

    fn table_cell(&mut self, cell: &TableCellNode, base: &RunBase) -> TableCell {
        let mut paragraph = Paragraph::new();
        if let Some(alignment) = alignment_type(cell.alignment) {
            paragraph = paragraph.align(alignment);
        }
        TableCell::new().add_paragraph(self.add_runs(paragraph, &cell.runs, base))
    }

    fn add_runs(&mut self, mut paragraph: Paragraph, runs: &[Run], base: &RunBase) -> Paragraph {
        for run in runs {
            paragraph = match run {
                Run::Text(text) => paragraph.add_run(text_run(text, base)),
                Run::Break => {
                    paragraph.add_run(docx_rs::Run::new().add_break(BreakType::TextWrapping))
                }
                Run::Hyperlink { href, runs, .. } => {
                    let mut link = Hyperlink::new(href, HyperlinkType::External);
                    // docx-rs hands out relationship ids from a process-wide
                    // counter; renumber them per document
                    self.hyperlinks += 1;
                    if let HyperlinkData::External { rid, .. } = &mut link.link {
                        *rid = format!("rIdHyperlink{}", self.hyperlinks);
                    }
                    for text in runs {
                        link = link.add_run(text_run(text, base));
                    }
                    paragraph.add_hyperlink(link)
                }
            };
        }
        paragraph
    }
}

fn quote_border() -> ParagraphBorders {
    ParagraphBorders::with_empty().set(
        ParagraphBorder::new(ParagraphBorderPosition::Left)
            .size(style::border_eighths(style::QUOTE_BORDER_PX))
            .space(style::QUOTE_PADDING_PT as usize)
            .color(docx_color(style::QUOTE_BORDER_COLOR)),
    )
}

fn alignment_type(alignment: Alignment) -> Option<AlignmentType> {
    match alignment {
        Alignment::None => None,
        Alignment::Left => Some(AlignmentType::Left),
        Alignment::Center => Some(AlignmentType::Center),
        Alignment::Right => Some(AlignmentType::Right),
    }
}

fn text_run(text: &TextRun, base: &RunBase) -> docx_rs::Run {
    let mut run = docx_rs::Run::new().add_text(&text.text);

    if let Some(size) = base.size {
        run = run.size(size);
    }
    if text.bold || base.bold {
        run = run.bold();
    }
    if text.italic || base.italic {
        run = run.italic();
    }
    if text.underline {
        run = run.underline("single");
    }
    // The run's own colour (links, placeholders) wins over the block colour
    if let Some(color) = text.color.as_deref().map(docx_color).or_else(|| base.color.clone()) {
        run = run.color(color);
    }

    let font = if text.monospace {
        Some(style::CODE_FONT)
    } else {
        base.font
    };
    if let Some(font) = font {
        run = run.fonts(RunFonts::new().ascii(font).hi_ansi(font));
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::Section;

    fn pack(children: Vec<BlockNode>) -> Vec<u8> {
        DocxPacker
            .pack(&Document::single_section(children))
            .expect("pack")
    }

    #[test]
    fn packs_zip_container() {
        let bytes = pack(vec![BlockNode::Paragraph {
            runs: vec![Run::Text(TextRun::plain("Hello"))],
        }]);
        assert!(bytes.starts_with(b"PK\x03\x04"));
        assert!(docx_rs::read_docx(&bytes).is_ok());
    }

    #[test]
    fn empty_document_is_valid() {
        let bytes = DocxPacker.pack(&Document::default()).expect("pack");
        assert!(docx_rs::read_docx(&bytes).is_ok());

        let bytes = DocxPacker
            .pack(&Document {
                sections: vec![Section::default()],
            })
            .expect("pack");
        assert!(docx_rs::read_docx(&bytes).is_ok());
    }

    fn item(text: &str, number: Option<u64>) -> BlockNode {
        BlockNode::ListItem {
            runs: vec![Run::Text(TextRun::plain(text))],
            ordered: number.is_some(),
            level: 0,
            number,
        }
    }

    fn link(href: &str, text: &str) -> Run {
        Run::Hyperlink {
            href: href.to_string(),
            display_text: text.to_string(),
            runs: vec![TextRun {
                underline: true,
                color: Some(style::LINK_COLOR.to_string()),
                ..TextRun::plain(text)
            }],
        }
    }

    fn paragraphs(docx: &Docx) -> Vec<&Paragraph> {
        docx.document
            .children
            .iter()
            .filter_map(|child| match child {
                docx_rs::DocumentChild::Paragraph(paragraph) => Some(paragraph.as_ref()),
                _ => None,
            })
            .collect()
    }

    fn numbering_of(paragraph: &Paragraph) -> Option<usize> {
        paragraph
            .property
            .numbering_property
            .as_ref()
            .and_then(|numbering| numbering.id.as_ref())
            .map(|id| id.id)
    }

    fn start_of(docx: &Docx, id: usize) -> Option<usize> {
        docx.numberings
            .numberings
            .iter()
            .find(|numbering| numbering.id == id)
            .and_then(|numbering| numbering.level_overrides.first())
            .and_then(|level| level.override_start)
    }

    fn document_xml(children: &[BlockNode]) -> String {
        let mut builder = DocxBuilder::new();
        for node in children {
            builder.push(node);
        }
        String::from_utf8(builder.finish().build().document).expect("utf-8 xml")
    }

    #[test]
    fn packed_content_reads_back() {
        let bytes = pack(vec![
            BlockNode::Heading {
                level: 2,
                runs: vec![Run::Text(TextRun::plain("Title"))],
            },
            BlockNode::Paragraph {
                runs: vec![
                    Run::Text(TextRun::plain("see ")),
                    link("https://example.com", "Example"),
                    Run::Break,
                    Run::Text(TextRun {
                        monospace: true,
                        ..TextRun::plain("code")
                    }),
                ],
            },
            BlockNode::CodeBlock {
                text: "fn main() {\n    run();\n}".to_string(),
                font: "Consolas".to_string(),
                size_pt: 10.0,
            },
            BlockNode::Table(TableNode {
                header: vec![TableCellNode {
                    runs: vec![Run::Text(TextRun::plain("A"))],
                    alignment: Alignment::Center,
                }],
                rows: vec![vec![TableCellNode {
                    runs: vec![Run::Text(TextRun::plain("1"))],
                    alignment: Alignment::None,
                }]],
                width_pct: 100,
            }),
            BlockNode::BlankLine,
            BlockNode::HorizontalRule,
        ]);
        let docx = docx_rs::read_docx(&bytes).expect("readable docx");

        let paragraphs = paragraphs(&docx);
        let heading = paragraphs[0];
        assert_eq!(
            heading.property.style.as_ref().map(|style| style.val.as_str()),
            Some("Heading2")
        );
        assert_eq!(heading.raw_text(), "Title");
        assert_eq!(paragraphs[1].raw_text(), "see \ncode");
        assert!(paragraphs[2].raw_text().contains("run();"));
        assert_eq!(paragraphs.last().map(|p| p.raw_text()), Some("* * *".to_string()));

        assert!(
            docx.hyperlinks
                .iter()
                .any(|(_, target, _)| target == "https://example.com")
        );

        let tables: Vec<&Table> = docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                docx_rs::DocumentChild::Table(table) => Some(table.as_ref()),
                _ => None,
            })
            .collect();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 2);
    }

    #[test]
    fn document_xml_carries_styling() {
        let xml = document_xml(&[
            BlockNode::CodeBlock {
                text: "a\nb".to_string(),
                font: "Consolas".to_string(),
                size_pt: 10.0,
            },
            BlockNode::Quote {
                text: "quoted".to_string(),
                italic: true,
            },
            BlockNode::Table(TableNode {
                header: vec![TableCellNode {
                    runs: vec![Run::Text(TextRun::plain("A"))],
                    alignment: Alignment::None,
                }],
                rows: vec![],
                width_pct: 100,
            }),
        ]);
        assert!(xml.contains(r#"w:ascii="Consolas""#));
        assert!(xml.contains("<w:br w:type=\"textWrapping\" />"));
        assert!(xml.contains("<w:pBdr><w:left "));
        assert!(xml.contains(r#"w:sz="24""#));
        assert!(xml.contains(r#"w:color="5B9BD5""#));
        assert!(xml.contains(r#"w:fill="E7E6E6""#));
        assert!(xml.contains(r#"<w:tblW w:w="5000" w:type="pct" />"#));
    }

    #[test]
    fn links_are_numbered_per_document() {
        let children = vec![BlockNode::Paragraph {
            runs: vec![
                link("https://example.com/a", "a"),
                link("https://example.com/b", "b"),
            ],
        }];
        let first = pack(children.clone());
        let second = pack(children);
        assert_eq!(first, second);

        let docx = docx_rs::read_docx(&first).expect("readable docx");
        let mut ids: Vec<&str> = docx.hyperlinks.iter().map(|(id, _, _)| id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["rIdHyperlink1", "rIdHyperlink2"]);
    }

    #[test]
    fn ordered_lists_restart_where_numbers_break() {
        let bytes = pack(vec![
            item("a", Some(1)),
            item("b", Some(2)),
            item("x", None),
            item("c", Some(1)),
            item("d", Some(1)),
            item("three", Some(3)),
            item("four", Some(4)),
        ]);
        let docx = docx_rs::read_docx(&bytes).expect("readable docx");
        let ids: Vec<Option<usize>> = paragraphs(&docx).into_iter().map(numbering_of).collect();

        assert_eq!(ids[0], ids[1]);
        assert_eq!(ids[2], Some(BULLET_NUMBERING_ID));
        assert_ne!(ids[3], ids[1]);
        assert_ne!(ids[4], ids[3]);
        assert_ne!(ids[5], ids[4]);
        assert_eq!(ids[5], ids[6]);

        let starts: Vec<Option<usize>> = [ids[0], ids[3], ids[4], ids[5]]
            .into_iter()
            .map(|id| id.and_then(|id| start_of(&docx, id)))
            .collect();
        assert_eq!(starts, vec![Some(1), Some(1), Some(1), Some(3)]);
    }

    #[test]
    fn ordered_item_without_number_continues() {
        let mut builder = DocxBuilder::new();
        builder.push(&item("a", Some(1)));
        builder.push(&BlockNode::ListItem {
            runs: vec![],
            ordered: true,
            level: 0,
            number: None,
        });
        assert_eq!(builder.ordered_numbering, Some((2, 3)));
    }
}
