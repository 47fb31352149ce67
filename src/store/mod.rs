//! Remote comment store: trait seam and the GitHub implementation.
//!
//! The sync controller only sees [`CommentStore`]; tests substitute an
//! in-memory store.

pub mod github;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::comment::{NewReviewComment, PullRequestRef, ReplyComment, ReviewComment};

/// Errors from the remote comment store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("no GitHub token configured (set DIFFTHREAD_TOKEN or GITHUB_TOKEN)")]
    MissingToken,
}

/// Fetches and creates pull request review comments.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Every review comment on the pull request, across all files.
    async fn fetch_all(&self, pr: &PullRequestRef) -> Result<Vec<ReviewComment>, StoreError>;

    /// Create a top-level comment anchored at a patch position.
    async fn create(
        &self,
        pr: &PullRequestRef,
        comment: &NewReviewComment,
    ) -> Result<ReviewComment, StoreError>;

    /// Reply to an existing comment.
    async fn create_reply(
        &self,
        pr: &PullRequestRef,
        reply: &ReplyComment,
    ) -> Result<ReviewComment, StoreError>;
}
