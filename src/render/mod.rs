//! Render model and surface renderers: HTML, JSON, terminal.

pub mod html;
pub mod json;
pub mod terminal;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::comment::CommentGroup;
use crate::models::patch::PatchLine;

/// Everything a rendering surface needs to paint code lines and their
/// inline comment threads.
///
/// Derived and immutable: recomputed from scratch whenever the comment
/// collection changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRenderModel {
    pub lines: Vec<PatchLine>,
    pub groups_by_anchor: BTreeMap<usize, CommentGroup>,
    pub font_size_px: u32,
}

impl DiffRenderModel {
    /// Combine parsed lines and comment groups. Pure: equal inputs always
    /// produce equal models.
    pub fn compute(
        lines: &[PatchLine],
        groups_by_anchor: &BTreeMap<usize, CommentGroup>,
        font_size_px: u32,
    ) -> Self {
        Self {
            lines: lines.to_vec(),
            groups_by_anchor: groups_by_anchor.clone(),
            font_size_px,
        }
    }

    /// The thread anchored at `position`, if any.
    pub fn group_at(&self, position: usize) -> Option<&CommentGroup> {
        self.groups_by_anchor.get(&position)
    }

    /// Threads whose anchor is past the end of the patch.
    pub fn orphaned_groups(&self) -> impl Iterator<Item = &CommentGroup> {
        self.groups_by_anchor.range(self.lines.len()..).map(|(_, g)| g)
    }

    /// Total number of comments across all threads.
    pub fn comment_count(&self) -> usize {
        self.groups_by_anchor.values().map(CommentGroup::len).sum()
    }
}

/// Serializes a render model into a document for a rendering surface.
pub trait SurfaceRenderer: Send + Sync {
    fn render(&self, model: &DiffRenderModel) -> String;
}
