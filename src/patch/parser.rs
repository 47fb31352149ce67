//! Single-file patch parser.
//!
//! Turns the `patch` text of one changed file (hunks only, as served by the
//! pull request files API) into addressable [`PatchLine`]s. Never fails:
//! lines it cannot classify become context lines.

use crate::models::patch::{PatchLine, PatchLineKind};

/// Parse patch text into lines with contiguous 0-based positions.
///
/// The text is split on `\n`; a trailing `\r` is dropped from each segment.
/// Empty input yields no lines.
pub fn parse(patch_text: &str) -> Vec<PatchLine> {
    if patch_text.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    // (old, new) counters; None until the first hunk header.
    let mut cursor: Option<(u32, u32)> = None;

    for (position, segment) in patch_text.split('\n').enumerate() {
        let raw = segment.strip_suffix('\r').unwrap_or(segment);
        let (kind, old_line_number, new_line_number) = classify(raw, &mut cursor);
        lines.push(PatchLine {
            old_line_number,
            new_line_number,
            kind,
            raw_text: raw.to_string(),
            position,
        });
    }

    lines
}

/// Classify one line and advance the hunk counters.
fn classify(
    line: &str,
    cursor: &mut Option<(u32, u32)>,
) -> (PatchLineKind, Option<u32>, Option<u32>) {
    if line.starts_with("@@") {
        if let Some((old_start, new_start)) = parse_hunk_header(line) {
            *cursor = Some((old_start, new_start));
            return (PatchLineKind::HunkHeader, None, None);
        }
        return (PatchLineKind::Context, None, None);
    }

    // File headers and other preamble before the first hunk.
    let Some((old, new)) = cursor.as_mut() else {
        return (PatchLineKind::Context, None, None);
    };

    if line.starts_with('+') {
        let n = *new;
        *new = new.saturating_add(1);
        (PatchLineKind::Addition, None, Some(n))
    } else if line.starts_with('-') {
        let o = *old;
        *old = old.saturating_add(1);
        (PatchLineKind::Deletion, Some(o), None)
    } else if line.starts_with(' ') || line.is_empty() {
        let (o, n) = (*old, *new);
        *old = old.saturating_add(1);
        *new = new.saturating_add(1);
        (PatchLineKind::Context, Some(o), Some(n))
    } else {
        // "\ No newline at end of file" and anything unrecognised
        (PatchLineKind::Context, None, None)
    }
}

/// Parse a `@@ -old_start,old_count +new_start,new_count @@ header` line,
/// returning the two start lines.
fn parse_hunk_header(line: &str) -> Option<(u32, u32)> {
    let line = line.strip_prefix("@@ ")?;
    let end = line.find(" @@")?;
    let range_part = &line[..end];

    let parts: Vec<&str> = range_part.split(' ').collect();
    if parts.len() != 2 {
        return None;
    }

    let (old_start, _) = parse_range(parts[0].strip_prefix('-')?)?;
    let (new_start, _) = parse_range(parts[1].strip_prefix('+')?)?;

    Some((old_start, new_start))
}

/// Parse "start,count" or "start" (count defaults to 1).
fn parse_range(s: &str) -> Option<(u32, u32)> {
    if let Some((start, count)) = s.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        Some((s.parse().ok()?, 1))
    }
}
