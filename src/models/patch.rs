//! Patch line types.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Classification of a single patch line.
///
/// Informative only: positions are assigned independently of the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PatchLineKind {
    /// Unchanged line, or anything the parser did not recognise.
    Context,
    /// Line exists only in the new version.
    Addition,
    /// Line exists only in the old version.
    Deletion,
    /// `@@ -a,b +c,d @@` hunk header.
    HunkHeader,
}

/// One addressable line of a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchLine {
    /// Line number in the old file (None for additions and headers).
    pub old_line_number: Option<u32>,
    /// Line number in the new file (None for deletions and headers).
    pub new_line_number: Option<u32>,
    pub kind: PatchLineKind,
    /// The line verbatim, diff marker included.
    pub raw_text: String,
    /// 0-based index of this line within the patch. Comment anchor key.
    pub position: usize,
}

impl PatchLine {
    /// The line without its leading diff marker.
    pub fn content(&self) -> &str {
        match self.kind {
            PatchLineKind::Addition | PatchLineKind::Deletion => &self.raw_text[1..],
            PatchLineKind::Context if self.raw_text.starts_with(' ') => &self.raw_text[1..],
            _ => &self.raw_text,
        }
    }

    /// Human-facing line label: the new line number, else the old one,
    /// else the 1-based position.
    pub fn display_number(&self) -> u32 {
        self.new_line_number
            .or(self.old_line_number)
            .unwrap_or_else(|| {
                u32::try_from(self.position.saturating_add(1)).unwrap_or(u32::MAX)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(kind: PatchLineKind, raw: &str) -> PatchLine {
        PatchLine {
            old_line_number: None,
            new_line_number: None,
            kind,
            raw_text: raw.to_string(),
            position: 4,
        }
    }

    #[test]
    fn content_strips_markers() {
        assert_eq!(line(PatchLineKind::Addition, "+let x = 1;").content(), "let x = 1;");
        assert_eq!(line(PatchLineKind::Deletion, "-gone").content(), "gone");
        assert_eq!(line(PatchLineKind::Context, " same").content(), "same");
        assert_eq!(line(PatchLineKind::Context, "garbage").content(), "garbage");
        assert_eq!(line(PatchLineKind::HunkHeader, "@@ -1 +1 @@").content(), "@@ -1 +1 @@");
    }

    #[test]
    fn display_number_falls_back_to_position() {
        let mut l = line(PatchLineKind::Context, " x");
        assert_eq!(l.display_number(), 5);
        l.old_line_number = Some(9);
        assert_eq!(l.display_number(), 9);
        l.new_line_number = Some(12);
        assert_eq!(l.display_number(), 12);
    }

    #[test]
    fn display_number_fallback_saturates() {
        let mut l = line(PatchLineKind::Context, "x");
        l.position = u32::MAX as usize;
        assert_eq!(l.display_number(), u32::MAX);
        l.position = usize::MAX;
        assert_eq!(l.display_number(), u32::MAX);
    }

    #[test]
    fn kind_display_is_snake_case() {
        assert_eq!(PatchLineKind::HunkHeader.to_string(), "hunk_header");
        assert_eq!("addition".parse::<PatchLineKind>().unwrap(), PatchLineKind::Addition);
    }
}
