//! Document shells around a rendered fragment.
//!
//! The legacy export wraps the fragment in an office-flavoured HTML document
//! that word processors open as a `.doc`. The preview instead scopes the same
//! stylesheet to a container class.

use crate::html::escape::escape_html;
use crate::style;

/// Stylesheet rules as (selector, declarations). `body` is the document root.
fn rules() -> Vec<(&'static str, String)> {
    vec![
        (
            "body",
            format!(
                "font-family: '{}', sans-serif; font-size: {}pt; line-height: 1.15; color: {}; mso-line-height-rule: exactly;",
                style::BODY_FONT,
                style::BODY_SIZE_PT,
                style::TEXT_COLOR
            ),
        ),
        ("h1", style::HEADING_1.css()),
        ("h2", style::HEADING_2.css()),
        ("h3", style::HEADING_3.css()),
        ("h4, h5, h6", style::heading_style(4).css()),
        ("p", style::paragraph_css()),
        ("ul", style::list_css(false)),
        ("ol", style::list_css(true)),
        ("li", style::list_item_css()),
        ("a", style::link_css()),
        ("blockquote", style::blockquote_css()),
        ("table", style::table_css()),
        ("th", style::table_header_cell_css()),
        ("td", style::table_cell_css()),
        ("pre", style::code_block_css(false)),
        (
            "code",
            format!(
                "font-family: '{}', monospace; color: {}; background: transparent;",
                style::CODE_FONT,
                style::TEXT_COLOR
            ),
        ),
    ]
}

/// Render the stylesheet, optionally scoped under a container class.
///
/// When scoped, the `body` rule applies to the container itself.
pub fn stylesheet(scope: Option<&str>) -> String {
    let mut css = String::new();
    for (selector, declarations) in rules() {
        let selector = match scope {
            Some(class) => scoped_selector(selector, class),
            None => selector.to_string(),
        };
        css.push_str(&format!("{} {{ {} }}\n", selector, declarations));
    }
    css
}

fn scoped_selector(selector: &str, class: &str) -> String {
    if selector == "body" {
        return format!(".{}", class);
    }
    selector
        .split(',')
        .map(|part| format!(".{} {}", class, part.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Wrap a fragment in a full HTML document a word processor opens in print
/// view at 100% zoom.
pub fn legacy_document(fragment: &str, title: &str) -> String {
    let mut out = String::new();
    out.push_str("<html xmlns:o='urn:schemas-microsoft-com:office:office' xmlns:w='urn:schemas-microsoft-com:office:word' xmlns='http://www.w3.org/TR/REC-html40'>\n");
    out.push_str("<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    out.push_str("<!--[if gte mso 9]>\n<xml>\n<w:WordDocument>\n<w:View>Print</w:View>\n<w:Zoom>100</w:Zoom>\n<w:DoNotOptimizeForBrowser/>\n</w:WordDocument>\n</xml>\n<![endif]-->\n");
    out.push_str("<style>\n");
    out.push_str(&stylesheet(None));
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(fragment);
    out.push_str("</body>\n</html>\n");
    out
}

/// A standalone page showing the preview inside its scoped container.
pub fn preview_page(fragment: &str, container_class: &str) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n");
    out.push_str(&stylesheet(Some(container_class)));
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(&format!("<div class=\"{}\">\n", escape_html(container_class)));
    out.push_str(fragment);
    out.push_str("</div>\n</body>\n</html>\n");
    out
}
