use tracing::debug;

use crate::html::escape::{escape_html, escape_html_into};
use crate::style;
use crate::token::{Alignment, Inline, List, Table, Token};
use crate::translate::{BlockTranslator, InlineTranslator};

/// Renders tokens as an HTML fragment with word-processor typography
/// carried in inline `style` attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTranslator;

impl InlineTranslator for HtmlTranslator {
    type Output = String;

    fn translate_inlines(&self, inlines: &[Inline]) -> String {
        let mut out = String::new();
        inlines_to_html(inlines, &mut out);
        out
    }
}

impl BlockTranslator for HtmlTranslator {
    type Output = String;

    fn translate_block(&self, token: &Token) -> String {
        let mut out = String::new();
        block_to_html(token, &mut out);
        out
    }
}

/// Render a token sequence into one fragment
pub fn tokens_to_html(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        block_to_html(token, &mut out);
    }
    out
}

fn block_to_html(token: &Token, out: &mut String) {
    match token {
        Token::Heading { depth, children } => {
            let level = style::clamp_heading_level(*depth);
            let css = style::heading_style(level).css();
            out.push_str(&format!("<h{} style=\"{}\">", level, css));
            inlines_to_html(children, out);
            out.push_str(&format!("</h{}>\n", level));
        }
        Token::Paragraph(children) => {
            out.push_str(&format!("<p style=\"{}\">", style::paragraph_css()));
            inlines_to_html(children, out);
            out.push_str("</p>\n");
        }
        Token::List(list) => list_to_html(list, out),
        Token::Table(table) => table_to_html(table, out),
        Token::Blockquote(children) => {
            out.push_str(&format!(
                "<blockquote style=\"{}\">\n",
                style::blockquote_css()
            ));
            for child in children {
                block_to_html(child, out);
            }
            out.push_str("</blockquote>\n");
        }
        Token::Code { text, language } => code_to_html(text, language.as_deref(), out),
        Token::HorizontalRule => {
            out.push_str(&format!(
                "<p style=\"{}\">{}</p>\n",
                style::rule_css(),
                style::RULE_SEPARATOR
            ));
        }
        Token::BlankSpace => {}
        Token::Html(html) => out.push_str(html),
        Token::Unknown {
            text: Some(text), ..
        } => {
            out.push_str(&format!("<p style=\"{}\">", style::paragraph_css()));
            escape_html_into(out, text);
            out.push_str("</p>\n");
        }
        Token::Unknown { kind, text: None } => {
            debug!(kind = kind.as_str(), "skipping block without text");
        }
    }
}

fn list_to_html(list: &List, out: &mut String) {
    let tag = if list.ordered { "ol" } else { "ul" };
    out.push('<');
    out.push_str(tag);
    if let Some(start) = list.start.filter(|start| list.ordered && *start != 1) {
        out.push_str(&format!(" start=\"{}\"", start));
    }
    out.push_str(&format!(" style=\"{}\">\n", style::list_css(list.ordered)));

    for item in &list.items {
        out.push_str(&format!("<li style=\"{}\">", style::list_item_css()));
        match item.checked {
            Some(true) => out.push_str("<input type=\"checkbox\" disabled checked> "),
            Some(false) => out.push_str("<input type=\"checkbox\" disabled> "),
            None => {}
        }
        inlines_to_html(&item.content, out);
        if !item.children.is_empty() {
            out.push('\n');
            for child in &item.children {
                block_to_html(child, out);
            }
        }
        out.push_str("</li>\n");
    }

    out.push_str(&format!("</{}>\n", tag));
}

fn table_to_html(table: &Table, out: &mut String) {
    out.push_str(&format!("<table style=\"{}\">\n", style::table_css()));

    out.push_str("<thead>\n<tr>\n");
    let header_css = style::table_header_cell_css();
    for (column, cell) in table.header.iter().enumerate() {
        let css = aligned(&header_css, table.alignment(column));
        out.push_str(&format!("<th style=\"{}\">", css));
        inlines_to_html(cell, out);
        out.push_str("</th>\n");
    }
    out.push_str("</tr>\n</thead>\n");

    if !table.rows.is_empty() {
        out.push_str("<tbody>\n");
        let cell_css = style::table_cell_css();
        for row in &table.rows {
            out.push_str("<tr>\n");
            for (column, cell) in row.iter().enumerate() {
                let css = aligned(&cell_css, table.alignment(column));
                out.push_str(&format!("<td style=\"{}\">", css));
                inlines_to_html(cell, out);
                out.push_str("</td>\n");
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody>\n");
    }

    out.push_str("</table>\n");
}

// A later declaration wins, so the column alignment overrides the default.
fn aligned(css: &str, alignment: Alignment) -> String {
    match alignment.as_css() {
        Some(value) => format!("{} text-align: {};", css, value),
        None => css.to_string(),
    }
}

fn code_to_html(text: &str, language: Option<&str>, out: &mut String) {
    let label = language
        .filter(|language| !language.is_empty())
        .map(str::to_uppercase);

    out.push_str(&format!("<div style=\"{}\">", style::code_wrapper_css()));
    if let Some(label) = &label {
        out.push_str(&format!("<div style=\"{}\">", style::code_label_css()));
        escape_html_into(out, label);
        out.push_str("</div>");
    }
    out.push_str(&format!(
        "<pre style=\"{}\"><code>",
        style::code_block_css(label.is_some())
    ));
    escape_html_into(out, text);
    out.push_str("</code></pre></div>\n");
}

fn inlines_to_html(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        inline_to_html(inline, out);
    }
}

fn inline_to_html(inline: &Inline, out: &mut String) {
    match inline {
        Inline::Text(text) => escape_html_into(out, text),
        Inline::Strong(children) => {
            out.push_str("<strong>");
            inlines_to_html(children, out);
            out.push_str("</strong>");
        }
        Inline::Emphasis(children) => {
            out.push_str("<em>");
            inlines_to_html(children, out);
            out.push_str("</em>");
        }
        Inline::CodeSpan(code) => {
            out.push_str("<code>");
            escape_html_into(out, code);
            out.push_str("</code>");
        }
        Inline::Link {
            href,
            title,
            children,
        } => {
            out.push_str(&format!("<a href=\"{}\"", escape_html(href)));
            push_title(title.as_deref(), out);
            out.push_str(&format!(
                " target=\"_blank\" rel=\"noopener noreferrer\" style=\"{}\">",
                style::link_css()
            ));
            inlines_to_html(children, out);
            out.push_str("</a>");
        }
        Inline::Image { href, title, alt } => {
            out.push_str(&format!("<img src=\"{}\"", escape_html(href)));
            if !alt.is_empty() {
                out.push_str(&format!(" alt=\"{}\"", escape_html(alt)));
            }
            push_title(title.as_deref(), out);
            out.push_str(&format!(" style=\"{}\" />", style::image_css()));
        }
        Inline::LineBreak => out.push_str("<br>"),
        Inline::Html(html) => out.push_str(html),
        Inline::Other { text, .. } => escape_html_into(out, text),
    }
}

fn push_title(title: Option<&str>, out: &mut String) {
    if let Some(title) = title {
        out.push_str(&format!(" title=\"{}\"", escape_html(title)));
    }
}
