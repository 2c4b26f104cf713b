use tracing::debug;

use crate::document::model::{BlockNode, Run, TableCellNode, TableNode, TextRun};
use crate::style;
use crate::token::{Inline, List, Table, Token};
use crate::translate::{BlockTranslator, InlineTranslator};

/// Translates tokens into structured document nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentTranslator;

impl InlineTranslator for DocumentTranslator {
    type Output = Vec<Run>;

    fn translate_inlines(&self, inlines: &[Inline]) -> Vec<Run> {
        let mut runs = Vec::new();
        for inline in inlines {
            push_runs(inline, Marks::default(), &mut runs);
        }
        runs
    }
}

impl BlockTranslator for DocumentTranslator {
    type Output = Vec<BlockNode>;

    fn translate_block(&self, token: &Token) -> Vec<BlockNode> {
        let mut nodes = Vec::new();
        self.push_nodes(token, &mut nodes);
        nodes
    }
}

impl DocumentTranslator {
    fn push_nodes(&self, token: &Token, nodes: &mut Vec<BlockNode>) {
        match token {
            Token::Heading { depth, children } => nodes.push(BlockNode::Heading {
                level: style::clamp_heading_level(*depth),
                runs: self.translate_inlines(children),
            }),
            Token::Paragraph(children) => nodes.push(BlockNode::Paragraph {
                runs: self.translate_inlines(children),
            }),
            Token::Code { text, .. } => nodes.push(BlockNode::CodeBlock {
                text: text.clone(),
                font: style::CODE_FONT.to_string(),
                size_pt: style::CODE_SIZE_PT,
            }),
            Token::List(list) => self.push_list(list, nodes),
            Token::Table(table) => nodes.push(BlockNode::Table(self.table(table))),
            // Multi-paragraph quotes flatten into one paragraph
            Token::Blockquote(_) => nodes.push(BlockNode::Quote {
                text: token.plain_text(),
                italic: true,
            }),
            Token::HorizontalRule => nodes.push(BlockNode::HorizontalRule),
            Token::BlankSpace => nodes.push(BlockNode::BlankLine),
            Token::Html(_) => debug!("dropping raw html block"),
            Token::Unknown {
                text: Some(text), ..
            } => nodes.push(BlockNode::Paragraph {
                runs: vec![Run::Text(TextRun::plain(text.as_str()))],
            }),
            Token::Unknown { kind, text: None } => {
                debug!(kind = kind.as_str(), "skipping block without text");
            }
        }
    }

    /// One node per item. Nested lists are flattened to the same level.
    fn push_list(&self, list: &List, nodes: &mut Vec<BlockNode>) {
        let start = list.start.unwrap_or(1);
        for (index, item) in list.items.iter().enumerate() {
            let mut runs = Vec::new();
            match item.checked {
                Some(true) => runs.push(Run::Text(TextRun::plain("[x] "))),
                Some(false) => runs.push(Run::Text(TextRun::plain("[ ] "))),
                None => {}
            }
            runs.extend(self.translate_inlines(&item.content));
            nodes.push(BlockNode::ListItem {
                runs,
                ordered: list.ordered,
                level: 0,
                number: list.ordered.then(|| start + index as u64),
            });

            for child in &item.children {
                self.push_nodes(child, nodes);
            }
        }
    }

    fn table(&self, table: &Table) -> TableNode {
        let header = table
            .header
            .iter()
            .enumerate()
            .map(|(column, cell)| self.cell(cell, table, column))
            .collect();
        let rows = table
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(column, cell)| self.cell(cell, table, column))
                    .collect()
            })
            .collect();
        TableNode {
            header,
            rows,
            width_pct: 100,
        }
    }

    fn cell(&self, cell: &[Inline], table: &Table, column: usize) -> TableCellNode {
        TableCellNode {
            runs: self.translate_inlines(cell),
            alignment: table.alignment(column),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Marks {
    bold: bool,
    italic: bool,
}

impl Marks {
    fn run(self, text: &str) -> TextRun {
        TextRun {
            text: text.to_string(),
            bold: self.bold,
            italic: self.italic,
            ..TextRun::default()
        }
    }
}

fn push_runs(inline: &Inline, marks: Marks, runs: &mut Vec<Run>) {
    match inline {
        Inline::Text(text) => {
            if !text.is_empty() {
                runs.push(Run::Text(marks.run(text)));
            }
        }
        Inline::Strong(children) => {
            let marks = Marks { bold: true, ..marks };
            for child in children {
                push_runs(child, marks, runs);
            }
        }
        Inline::Emphasis(children) => {
            let marks = Marks {
                italic: true,
                ..marks
            };
            for child in children {
                push_runs(child, marks, runs);
            }
        }
        Inline::CodeSpan(code) => runs.push(Run::Text(TextRun {
            monospace: true,
            ..marks.run(code)
        })),
        Inline::Link { href, children, .. } => {
            let mut inner = Vec::new();
            for child in children {
                push_runs(child, marks, &mut inner);
            }
            let link_runs: Vec<TextRun> = inner
                .into_iter()
                .filter_map(|run| match run {
                    // Image placeholders keep their muted colour
                    Run::Text(run) => Some(TextRun {
                        underline: true,
                        color: run
                            .color
                            .clone()
                            .or_else(|| Some(style::LINK_COLOR.to_string())),
                        ..run
                    }),
                    // Links cannot nest, and a break has no text to link
                    Run::Break | Run::Hyperlink { .. } => None,
                })
                .collect();
            let display_text = link_runs.iter().map(|run| run.text.as_str()).collect();
            runs.push(Run::Hyperlink {
                href: href.clone(),
                display_text,
                runs: link_runs,
            });
        }
        Inline::Image { href, alt, .. } => {
            let label = if alt.is_empty() { href } else { alt };
            runs.push(Run::Text(TextRun {
                text: format!("[Image: {}]", label),
                italic: true,
                color: Some(style::MUTED_COLOR.to_string()),
                ..TextRun::default()
            }));
        }
        Inline::LineBreak => runs.push(Run::Break),
        Inline::Html(_) => {}
        Inline::Other { text, .. } => {
            if !text.is_empty() {
                runs.push(Run::Text(TextRun::plain(text.as_str())));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Alignment, ListItem};

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    fn translate(token: Token) -> Vec<BlockNode> {
        DocumentTranslator.translate_block(&token)
    }

    #[test]
    fn inline_order_and_marks() {
        let runs = DocumentTranslator.translate_inlines(&[
            text("a "),
            Inline::Strong(vec![text("b "), Inline::Emphasis(vec![text("c")])]),
            Inline::CodeSpan("d".to_string()),
            Inline::LineBreak,
        ]);
        assert_eq!(
            runs,
            vec![
                Run::Text(TextRun::plain("a ")),
                Run::Text(TextRun {
                    bold: true,
                    ..TextRun::plain("b ")
                }),
                Run::Text(TextRun {
                    bold: true,
                    italic: true,
                    ..TextRun::plain("c")
                }),
                Run::Text(TextRun {
                    monospace: true,
                    ..TextRun::plain("d")
                }),
                Run::Break,
            ]
        );
    }

    #[test]
    fn link_becomes_hyperlink_run() {
        let runs = DocumentTranslator.translate_inlines(&[Inline::Link {
            href: "https://example.com".to_string(),
            title: None,
            children: vec![text("Example")],
        }]);
        assert_eq!(
            runs,
            vec![Run::Hyperlink {
                href: "https://example.com".to_string(),
                display_text: "Example".to_string(),
                runs: vec![TextRun {
                    underline: true,
                    color: Some("#0563C1".to_string()),
                    ..TextRun::plain("Example")
                }],
            }]
        );
    }

    #[test]
    fn image_is_placeholder() {
        let runs = DocumentTranslator.translate_inlines(&[
            Inline::Image {
                href: "https://x.y/logo.png".to_string(),
                title: None,
                alt: "Logo".to_string(),
            },
            Inline::Image {
                href: "https://x.y/badge.svg".to_string(),
                title: None,
                alt: String::new(),
            },
        ]);
        assert_eq!(runs[0].text(), "[Image: Logo]");
        assert_eq!(runs[1].text(), "[Image: https://x.y/badge.svg]");
        let Run::Text(placeholder) = &runs[0] else {
            panic!("expected text run");
        };
        assert!(placeholder.italic);
        assert_eq!(placeholder.color.as_deref(), Some(style::MUTED_COLOR));
    }

    #[test]
    fn heading_level_is_clamped() {
        let nodes = translate(Token::Heading {
            depth: 0,
            children: vec![text("Top")],
        });
        assert_eq!(
            nodes,
            vec![BlockNode::Heading {
                level: 1,
                runs: vec![Run::Text(TextRun::plain("Top"))],
            }]
        );
    }

    #[test]
    fn code_block_drops_language() {
        let nodes = translate(Token::Code {
            text: "x=1".to_string(),
            language: Some("javascript".to_string()),
        });
        assert_eq!(
            nodes,
            vec![BlockNode::CodeBlock {
                text: "x=1".to_string(),
                font: "Consolas".to_string(),
                size_pt: 10.0,
            }]
        );
    }

    #[test]
    fn nested_list_is_flattened() {
        let inner = Token::List(List {
            ordered: false,
            start: None,
            items: vec![ListItem {
                content: vec![text("inner")],
                ..ListItem::default()
            }],
        });
        let nodes = translate(Token::List(List {
            ordered: true,
            start: Some(1),
            items: vec![
                ListItem {
                    content: vec![text("one")],
                    checked: None,
                    children: vec![inner],
                },
                ListItem {
                    content: vec![text("two")],
                    checked: Some(false),
                    children: vec![],
                },
            ],
        }));
        let summary: Vec<(String, bool, u8, Option<u64>)> = nodes
            .iter()
            .map(|node| match node {
                BlockNode::ListItem {
                    runs,
                    ordered,
                    level,
                    number,
                } => (
                    runs.iter().map(Run::text).collect(),
                    *ordered,
                    *level,
                    *number,
                ),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("one".to_string(), true, 0, Some(1)),
                ("inner".to_string(), false, 0, None),
                ("[ ] two".to_string(), true, 0, Some(2)),
            ]
        );
    }

    #[test]
    fn ordered_items_count_from_list_start() {
        let nodes = translate(Token::List(List {
            ordered: true,
            start: Some(3),
            items: vec![
                ListItem {
                    content: vec![text("three")],
                    ..ListItem::default()
                },
                ListItem {
                    content: vec![text("four")],
                    ..ListItem::default()
                },
            ],
        }));
        let numbers: Vec<Option<u64>> = nodes
            .iter()
            .map(|node| match node {
                BlockNode::ListItem { number, .. } => *number,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(numbers, vec![Some(3), Some(4)]);
    }

    #[test]
    fn linked_image_keeps_placeholder_colour() {
        let runs = DocumentTranslator.translate_inlines(&[Inline::Link {
            href: "https://ci.example.com".to_string(),
            title: None,
            children: vec![
                Inline::Image {
                    href: "https://ci.example.com/badge.svg".to_string(),
                    title: None,
                    alt: "build".to_string(),
                },
                text(" status"),
            ],
        }]);
        let [Run::Hyperlink { runs, .. }] = runs.as_slice() else {
            panic!("expected one hyperlink, got {:?}", runs);
        };
        assert_eq!(runs[0].text, "[Image: build]");
        assert_eq!(runs[0].color.as_deref(), Some(style::MUTED_COLOR));
        assert!(runs[0].italic);
        assert_eq!(runs[1].color.as_deref(), Some(style::LINK_COLOR));
        assert!(runs.iter().all(|run| run.underline));
    }

    #[test]
    fn table_is_one_node() {
        let nodes = translate(Token::Table(Table {
            alignments: vec![Alignment::Right],
            header: vec![vec![text("A")], vec![text("B")]],
            rows: vec![vec![vec![text("1")], vec![text("2")]]],
        }));
        assert_eq!(nodes.len(), 1);
        let BlockNode::Table(table) = &nodes[0] else {
            panic!("expected table");
        };
        assert_eq!(table.width_pct, 100);
        assert_eq!(table.header.len(), 2);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.header[0].alignment, Alignment::Right);
        assert_eq!(table.header[1].alignment, Alignment::None);
        assert_eq!(table.rows[0][1].runs[0].text(), "2");
    }

    #[test]
    fn blockquote_flattens_to_one_italic_node() {
        let nodes = translate(Token::Blockquote(vec![
            Token::Paragraph(vec![text("first")]),
            Token::Paragraph(vec![text("second")]),
        ]));
        assert_eq!(
            nodes,
            vec![BlockNode::Quote {
                text: "first second".to_string(),
                italic: true,
            }]
        );
    }

    #[test]
    fn single_node_kinds() {
        assert_eq!(translate(Token::BlankSpace), vec![BlockNode::BlankLine]);
        assert_eq!(
            translate(Token::HorizontalRule),
            vec![BlockNode::HorizontalRule]
        );
        assert!(translate(Token::Html("<div></div>".to_string())).is_empty());
    }

    #[test]
    fn unknown_block_falls_back() {
        let nodes = translate(Token::Unknown {
            kind: "mystery".to_string(),
            text: Some("fallback".to_string()),
        });
        assert_eq!(
            nodes,
            vec![BlockNode::Paragraph {
                runs: vec![Run::Text(TextRun::plain("fallback"))],
            }]
        );
        assert!(
            translate(Token::Unknown {
                kind: "mystery".to_string(),
                text: None,
            })
            .is_empty()
        );
    }
}
