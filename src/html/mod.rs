//! HTML rendering pipeline: live preview fragment and legacy `.doc` shell.

mod escape;
mod render;
mod shell;

pub use render::{HtmlTranslator, tokens_to_html};
pub use shell::{legacy_document, preview_page, stylesheet};

use tracing::debug;

use crate::config::RenderOptions;
use crate::lexer;

/// Render markdown into a styled HTML fragment for the preview surface.
///
/// Each call lexes afresh; nothing is cached between calls.
pub fn render_fragment(markdown: &str, options: &RenderOptions) -> String {
    let tokens = lexer::lex(markdown, options);
    let html = tokens_to_html(&tokens);
    debug!(bytes = html.len(), "rendered html fragment");
    html
}

/// Render markdown into a complete office-flavoured HTML document.
pub fn render_document(markdown: &str, title: &str, options: &RenderOptions) -> String {
    legacy_document(&render_fragment(markdown, options), title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_same_output_twice() {
        let md = "# Title\n\nSome **bold** text.\n\n| A | B |\n|---|---|\n| 1 | 2 |";
        let options = RenderOptions::default();
        assert_eq!(render_fragment(md, &options), render_fragment(md, &options));
    }

    #[test]
    fn empty_markdown() {
        let options = RenderOptions::default();
        assert_eq!(render_fragment("", &options), "");
        let doc = render_document("", "Document", &options);
        assert!(doc.contains("<body>\n</body>"));
    }

    #[test]
    fn soft_breaks_render_as_br() {
        let html = render_fragment("one\ntwo", &RenderOptions::default());
        assert!(html.contains(">one<br>two</p>"));
    }

    #[test]
    fn raw_html_passes_through() {
        let html = render_fragment("<div class=\"note\">hi</div>\n", &RenderOptions::default());
        assert!(html.contains("<div class=\"note\">hi</div>"));
    }
}
