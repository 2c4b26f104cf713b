//! Structured document path: tokens to block nodes to a packed file.

mod docx;
mod model;
mod translate;

pub use docx::{DocumentPacker, DocxPacker};
pub use model::{BlockNode, Document, Run, Section, TableCellNode, TableNode, TextRun};
pub use translate::DocumentTranslator;

use tracing::debug;

use crate::config::RenderOptions;
use crate::lexer;
use crate::token::Token;
use crate::translate::BlockTranslator;

/// Lex markdown once and assemble every top-level token, in order, into a
/// single-section document.
pub fn assemble(markdown: &str, options: &RenderOptions) -> Document {
    let tokens = lexer::lex(markdown, options);
    assemble_tokens(&tokens)
}

pub fn assemble_tokens(tokens: &[Token]) -> Document {
    let translator = DocumentTranslator;
    let children: Vec<BlockNode> = tokens
        .iter()
        .flat_map(|token| translator.translate_block(token))
        .collect();
    debug!(
        tokens = tokens.len(),
        nodes = children.len(),
        "assembled document"
    );
    Document::single_section(children)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_follow_document_order() {
        let doc = assemble(
            "# Title\n\nText\n\n- a\n- b\n\n---\n\n```\ncode\n```",
            &RenderOptions::default(),
        );
        let kinds: Vec<&str> = doc.nodes().map(BlockNode::kind).collect();
        assert_eq!(
            kinds,
            vec!["heading", "paragraph", "list-item", "list-item", "hr", "code"]
        );
        assert_eq!(doc.sections.len(), 1);
    }

    #[test]
    fn empty_markdown_is_one_empty_section() {
        let doc = assemble("", &RenderOptions::default());
        assert_eq!(doc, Document::single_section(Vec::new()));
    }

    #[test]
    fn assembles_same_document_twice() {
        let md = "## A\n\n> quote\n\n| x |\n|---|\n| y |";
        let options = RenderOptions::default();
        assert_eq!(assemble(md, &options), assemble(md, &options));
    }
}
