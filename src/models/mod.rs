//! Shared types used across all modules.
//!
//! Patch lines, review comments, and pull request references live here so
//! that the parser, index, renderers, and controller import from one place
//! rather than reaching into each other's internals.

pub mod comment;
pub mod patch;

pub use comment::{
    Comment, CommentAuthor, CommentGroup, NewReviewComment, PullRequestRef, ReplyComment,
    ReviewComment,
};
pub use patch::{PatchLine, PatchLineKind};
