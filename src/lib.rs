mod config;
mod error;
mod export;
mod lexer;
mod token;
mod translate;

pub mod document;
pub mod html;
pub mod style;

pub use config::{Config, ExportConfig, PreviewConfig, RenderOptions};
pub use document::{BlockNode, Document, DocumentPacker, DocxPacker};
pub use error::{Error, ExportError, Result};
pub use export::{ExportFormat, ExportedFile, export, export_with};
pub use token::{Alignment, Inline, List, ListItem, Table, TableCell, Token};
pub use translate::{BlockTranslator, InlineTranslator};

/// Lex markdown into block tokens.
pub fn lex(markdown: &str, options: &RenderOptions) -> Vec<Token> {
    lexer::lex(markdown, options)
}

/// Convert markdown to a styled HTML fragment (the live preview content).
pub fn render_html(markdown: &str, options: &RenderOptions) -> String {
    html::render_fragment(markdown, options)
}

/// Convert markdown to a standalone page: scoped stylesheet, container and fragment.
pub fn render_preview_page(markdown: &str, config: &Config) -> String {
    let fragment = html::render_fragment(markdown, &config.render);
    html::preview_page(&fragment, &config.preview.container_class)
}

/// Convert markdown to the full office-flavoured HTML document of a legacy export.
pub fn render_legacy_document(markdown: &str, title: &str, options: &RenderOptions) -> String {
    html::render_document(markdown, title, options)
}

/// Convert markdown to a structured document ready for packing.
pub fn assemble(markdown: &str, options: &RenderOptions) -> Document {
    document::assemble(markdown, options)
}
