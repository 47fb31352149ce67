//! Terminal renderer: colored patch lines with threads printed inline.

use colored::Colorize;

use crate::models::comment::CommentGroup;
use crate::models::patch::PatchLineKind;
use crate::render::{DiffRenderModel, SurfaceRenderer};

/// Terminal output renderer with colored, flowing text.
pub struct TerminalRenderer;

impl TerminalRenderer {
    fn render_thread(output: &mut String, group: &CommentGroup) {
        for comment in &group.comments {
            output.push_str(&format!(
                "      {} {} {} {}\n",
                "│".cyan(),
                comment.author_name.bold(),
                "·".dimmed(),
                comment.created_at.dimmed(),
            ));
            for text_line in strip_markup(&comment.body_rendered).lines() {
                output.push_str(&format!("      {} {text_line}\n", "│".cyan()));
            }
        }
        if let Some(root) = group.root_id() {
            output.push_str(&format!(
                "      {} {}\n",
                "└".cyan(),
                format!("reply with --to {root}").dimmed()
            ));
        }
    }
}

impl SurfaceRenderer for TerminalRenderer {
    fn render(&self, model: &DiffRenderModel) -> String {
        if model.lines.is_empty() {
            return format!("{}", "  (empty patch)\n".dimmed());
        }

        let mut output = String::new();
        for line in &model.lines {
            let gutter = format!("{:>4}", line.position).dimmed();
            let text = match line.kind {
                PatchLineKind::Addition => line.raw_text.green().to_string(),
                PatchLineKind::Deletion => line.raw_text.red().to_string(),
                PatchLineKind::HunkHeader => line.raw_text.cyan().to_string(),
                PatchLineKind::Context => line.raw_text.clone(),
            };
            output.push_str(&format!("{gutter} {text}\n"));

            if let Some(group) = model.group_at(line.position) {
                Self::render_thread(&mut output, group);
            }
        }

        let mut orphans = model.orphaned_groups().peekable();
        if orphans.peek().is_some() {
            output.push_str(&format!("{}\n", "── outdated ──".dimmed()));
            for group in orphans {
                Self::render_thread(&mut output, group);
            }
        }

        let count = model.comment_count();
        output.push_str(&format!(
            "{}\n {} {}\n",
            "───────────────────────────────────".dimmed(),
            count.to_string().bold(),
            if count == 1 { "comment" } else { "comments" },
        ));
        output
    }
}

/// Reduce rendered markup to plain text for terminal display.
fn strip_markup(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixtures::*;

    #[test]
    fn render_empty_patch() {
        let model = DiffRenderModel::compute(&[], &empty_groups(), 14);
        assert!(TerminalRenderer.render(&model).contains("empty patch"));
    }

    #[test]
    fn render_lines_and_threads() {
        let output = TerminalRenderer.render(&model(&[
            comment(1, "a.py", 1, "hi"),
            comment(2, "a.py", 1, "there"),
        ]));
        assert!(output.contains("+line2"));
        assert!(output.contains("user1"));
        assert!(output.contains("there"));
        assert!(output.contains("--to 1"));
        assert!(output.contains("comments"));
        // thread is printed after its anchor line and before the next one
        assert!(output.find("user1").unwrap() < output.find("+line2").unwrap());
    }

    #[test]
    fn strip_markup_keeps_text() {
        assert_eq!(strip_markup("<p>a &lt;b&gt; <em>c</em></p>\n"), "a <b> c");
    }
}
