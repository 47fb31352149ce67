//! Groups the comments of one file by anchor position.
//!
//! Rebuilt from scratch on every change; per-diff comment volumes are small.

use std::collections::BTreeMap;

use crate::models::comment::{Comment, CommentGroup};

/// Filter `comments` to `path` (exact, case-sensitive match) and group the
/// rest by anchor position.
///
/// Within each group comments are sorted ascending by id; a repeated id keeps
/// its first occurrence so ids are strictly ascending.
pub fn build(comments: &[Comment], path: &str) -> BTreeMap<usize, CommentGroup> {
    let mut groups: BTreeMap<usize, CommentGroup> = BTreeMap::new();

    for comment in comments.iter().filter(|c| c.path == path) {
        groups
            .entry(comment.anchor_position)
            .or_insert_with(|| CommentGroup {
                anchor_position: comment.anchor_position,
                comments: Vec::new(),
            })
            .comments
            .push(comment.clone());
    }

    for group in groups.values_mut() {
        // Stable sort keeps the first occurrence of a duplicated id in front.
        group.comments.sort_by_key(|c| c.id);
        group.comments.dedup_by_key(|c| c.id);
    }

    groups
}
