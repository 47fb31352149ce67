//! HTML document renderer for web-view surfaces.
//!
//! Produces a self-contained page: a table of patch lines with each
//! commentable line linking to a `comment` bridge URI, inline comment
//! threads under their anchor line with a `reply-to` link, and a trailing
//! "outdated" section for threads whose anchor lies past the patch.

use crate::bridge::{Bridge, Intent};
use crate::markup::escape_html;
use crate::models::comment::CommentGroup;
use crate::models::patch::{PatchLine, PatchLineKind};
use crate::render::{DiffRenderModel, SurfaceRenderer};

const STYLE: &str = "\
body{margin:0;font-family:-apple-system,'Segoe UI',Helvetica,Arial,sans-serif;color:#1f2328;}
table.diff{border-collapse:collapse;width:100%;font-family:ui-monospace,Menlo,Consolas,monospace;}
td.num{width:1%;min-width:3em;padding:0 .5em;text-align:right;color:#6e7781;user-select:none;}
td.code{white-space:pre-wrap;word-break:break-all;padding:0 .5em;}
td.code a{color:inherit;text-decoration:none;display:block;}
tr.addition{background:#e6ffec;}
tr.deletion{background:#ffebe9;}
tr.hunk_header{background:#ddf4ff;color:#57606a;}
tr.thread td{padding:.5em 1em;background:#f6f8fa;border-top:1px solid #d0d7de;border-bottom:1px solid #d0d7de;}
div.comment{margin-bottom:.75em;}
div.comment img{width:20px;height:20px;border-radius:50%;vertical-align:middle;margin-right:.4em;}
span.author{font-weight:600;}
span.date{color:#6e7781;margin-left:.4em;}
a.reply{font-size:.9em;}
section.outdated{padding:1em;}
";

/// Page title for `path`: its file name, or `Diff` when there is none.
pub fn document_title(path: &str) -> String {
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "Diff".to_string(),
    }
}

/// Renders a full HTML page for a web view.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    bridge: Bridge,
    title: String,
}

impl HtmlRenderer {
    pub fn new(bridge: Bridge, title: impl Into<String>) -> Self {
        Self {
            bridge,
            title: title.into(),
        }
    }

    fn render_line(&self, out: &mut String, line: &PatchLine) {
        let num = |n: Option<u32>| n.map(|n| n.to_string()).unwrap_or_default();
        let code = escape_html(&line.raw_text);

        out.push_str(&format!(
            "<tr class=\"line {kind}\" id=\"line-{pos}\" data-position=\"{pos}\">\
             <td class=\"num\">{old}</td><td class=\"num\">{new}</td><td class=\"code\">",
            kind = line.kind,
            pos = line.position,
            old = num(line.old_line_number),
            new = num(line.new_line_number),
        ));

        if line.kind == PatchLineKind::HunkHeader {
            out.push_str(&code);
        } else {
            let href = self.bridge.encode(&Intent::RequestNewComment {
                display_label: line.display_number(),
                anchor_position: line.position,
            });
            out.push_str(&format!("<a href=\"{}\">{code}</a>", escape_html(&href)));
        }
        out.push_str("</td></tr>\n");
    }

    fn render_thread(&self, out: &mut String, group: &CommentGroup) {
        for comment in &group.comments {
            out.push_str(&format!(
                "<div class=\"comment\" id=\"comment-{id}\">\
                 <img src=\"{avatar}\" alt=\"\"><span class=\"author\">{author}</span>\
                 <span class=\"date\">{date}</span>\
                 <div class=\"body\">{body}</div></div>\n",
                id = comment.id,
                avatar = escape_html(&comment.author_avatar_url),
                author = escape_html(&comment.author_name),
                date = escape_html(&comment.created_at),
                // Already sanitized by the markdown collaborator.
                body = comment.body_rendered,
            ));
        }
        if let Some(root) = group.root_id() {
            let href = self.bridge.encode(&Intent::RequestReply { parent_id: root });
            out.push_str(&format!(
                "<a class=\"reply\" href=\"{}\">Reply</a>\n",
                escape_html(&href)
            ));
        }
    }
}

impl SurfaceRenderer for HtmlRenderer {
    fn render(&self, model: &DiffRenderModel) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">");
        out.push_str(
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
        );
        out.push_str(&format!("<title>{}</title>", escape_html(&self.title)));
        out.push_str(&format!(
            "<style>{STYLE}body{{font-size:{}px;}}</style></head><body>\n",
            model.font_size_px
        ));

        out.push_str("<table class=\"diff\">\n");
        for line in &model.lines {
            self.render_line(&mut out, line);
            if let Some(group) = model.group_at(line.position) {
                out.push_str("<tr class=\"thread\"><td colspan=\"3\">\n");
                self.render_thread(&mut out, group);
                out.push_str("</td></tr>\n");
            }
        }
        out.push_str("</table>\n");

        let mut orphans = model.orphaned_groups().peekable();
        if orphans.peek().is_some() {
            out.push_str("<section class=\"outdated\"><h4>Outdated</h4>\n");
            for group in orphans {
                self.render_thread(&mut out, group);
            }
            out.push_str("</section>\n");
        }

        out.push_str("</body></html>\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixtures::*;

    fn renderer() -> HtmlRenderer {
        HtmlRenderer::new(Bridge::default(), "a.py")
    }

    #[test]
    fn title_is_file_name() {
        assert_eq!(document_title("src/app/main.py"), "main.py");
        assert_eq!(document_title("README"), "README");
        assert_eq!(document_title(""), "Diff");
        assert_eq!(document_title("dir/"), "Diff");
    }

    #[test]
    fn renders_document_shell() {
        let html = renderer().render(&model(&[]));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>a.py</title>"));
        assert!(html.contains("font-size:14px"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn lines_link_to_comment_command() {
        let html = renderer().render(&model(&[]));
        // "+line2" at position 2 is new line 2
        let href = Bridge::default().encode(&Intent::RequestNewComment {
            display_label: 2,
            anchor_position: 2,
        });
        assert!(html.contains(&format!("href=\"{href}\"")));
        assert!(html.contains("class=\"line addition\""));
        // hunk headers are not commentable
        assert!(html.contains("<td class=\"code\">@@ -1,2 +1,3 @@</td>"));
    }

    #[test]
    fn threads_render_under_anchor_with_reply_link() {
        let html = renderer().render(&model(&[
            comment(1, "a.py", 1, "hi"),
            comment(5, "a.py", 1, "reply"),
        ]));
        let line_idx = html.find("id=\"line-1\"").unwrap();
        let thread_idx = html.find("id=\"comment-1\"").unwrap();
        let next_line_idx = html.find("id=\"line-2\"").unwrap();
        assert!(line_idx < thread_idx && thread_idx < next_line_idx);
        assert!(html.find("id=\"comment-1\"").unwrap() < html.find("id=\"comment-5\"").unwrap());

        let reply = Bridge::default().encode(&Intent::RequestReply { parent_id: 1 });
        assert!(html.contains(&format!("class=\"reply\" href=\"{reply}\"")));
        assert!(html.contains("<p>hi</p>"));
    }

    #[test]
    fn escapes_code_and_author() {
        let mut c = comment(1, "a.py", 1, "ok");
        c.author_name = "<b>mallory</b>".into();
        let lines = crate::patch::parse("@@ -1 +1 @@\n+<script>x</script>");
        let groups = crate::comments::build(&[c], "a.py");
        let html = renderer().render(&DiffRenderModel::compute(&lines, &groups, 12));
        assert!(!html.contains("<script>x"));
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(html.contains("&lt;b&gt;mallory&lt;/b&gt;"));
    }

    #[test]
    fn orphaned_threads_go_to_outdated_section() {
        let html = renderer().render(&model(&[comment(3, "a.py", 40, "old")]));
        let section = html.find("<section class=\"outdated\">").unwrap();
        assert!(html.find("id=\"comment-3\"").unwrap() > section);
    }

    #[test]
    fn no_outdated_section_without_orphans() {
        let html = renderer().render(&model(&[comment(3, "a.py", 0, "ok")]));
        assert!(!html.contains("outdated\">"));
    }
}
