//! Markdown-to-markup conversion for comment bodies.

use ::markdown::{Options, to_html_with_options};

/// Converts a comment's markdown source into sanitized markup.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// GitHub-flavoured markdown via the `markdown` crate.
///
/// Raw HTML in the source is escaped, never passed through.
#[derive(Debug, Default, Clone, Copy)]
pub struct GfmRenderer;

impl MarkdownRenderer for GfmRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut options = Options::gfm();
        options.compile.allow_dangerous_html = false;
        options.compile.allow_dangerous_protocol = false;

        match to_html_with_options(markdown, &options) {
            Ok(html) => html,
            Err(err) => {
                tracing::debug!("markdown conversion failed, falling back to text: {err}");
                format!("<p>{}</p>", escape_html(markdown))
            }
        }
    }
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
