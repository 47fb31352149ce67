//! Review comment types: the stored record, its render-ready view, and
//! anchor groups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::markup::MarkdownRenderer;

/// Identifies the pull request a diff view belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl std::fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

impl std::str::FromStr for PullRequestRef {
    type Err = String;

    /// Parses `owner/repo#number`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid pull request `{s}`: expected owner/repo#number");
        let (slug, number) = s.trim().split_once('#').ok_or_else(invalid)?;
        let (owner, repo) = slug.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(invalid());
        }
        let number = number.parse().map_err(|_| invalid())?;
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        })
    }
}

/// Author of a review comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub login: String,
    pub avatar_url: String,
}

/// A review comment as held by the remote store.
///
/// This is the authoritative record owned by the sync controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewComment {
    pub id: u64,
    pub path: String,
    /// Anchor within the patch. `None` for outdated comments.
    pub position: Option<usize>,
    /// Markdown source.
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub user: CommentAuthor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to_id: Option<u64>,
}

/// Payload for a new top-level comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReviewComment {
    pub body: String,
    pub commit_sha: String,
    pub path: String,
    pub position: usize,
}

/// Payload for a reply to an existing comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyComment {
    pub body: String,
    pub parent_id: u64,
}

/// Render-ready view of a [`ReviewComment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    /// Equals `id`: threads are grouped by anchor, not by nesting.
    pub group_id: u64,
    pub author_name: String,
    pub author_avatar_url: String,
    pub anchor_position: usize,
    pub path: String,
    /// Sanitized markup produced by the markdown collaborator.
    pub body_rendered: String,
    /// Humanized creation time ("3 hours ago").
    pub created_at: String,
}

impl Comment {
    /// Build the render view of a stored comment.
    ///
    /// Returns `None` for outdated comments that no longer have a position.
    pub fn from_review(
        review: &ReviewComment,
        markdown: &dyn MarkdownRenderer,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let anchor_position = review.position?;
        Some(Self {
            id: review.id,
            group_id: review.id,
            author_name: review.user.login.clone(),
            author_avatar_url: review.user.avatar_url.clone(),
            anchor_position,
            path: review.path.clone(),
            body_rendered: markdown.render(&review.body),
            created_at: humanize_since(review.created_at, now),
        })
    }
}

/// Comments sharing one anchor position, strictly ascending by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentGroup {
    pub anchor_position: usize,
    pub comments: Vec<Comment>,
}

impl CommentGroup {
    /// Id of the thread root (lowest id), used as the reply target.
    pub fn root_id(&self) -> Option<u64> {
        self.comments.first().map(|c| c.id)
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

/// Describe how long ago `then` was, relative to `now`.
pub fn humanize_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    if secs < 60 {
        return "just now".to_string();
    }

    let mins = secs / 60;
    let hours = mins / 60;
    let days = hours / 24;

    fn unit(n: i64, singular: &str, article: &str) -> String {
        if n == 1 {
            format!("{article} {singular} ago")
        } else {
            format!("{n} {singular}s ago")
        }
    }

    if mins < 60 {
        unit(mins, "minute", "a")
    } else if hours < 24 {
        unit(hours, "hour", "an")
    } else if days == 1 {
        "yesterday".to_string()
    } else if days < 30 {
        format!("{days} days ago")
    } else if days < 365 {
        unit(days / 30, "month", "one")
    } else {
        unit(days / 365, "year", "one")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    struct Verbatim;

    impl MarkdownRenderer for Verbatim {
        fn render(&self, markdown: &str) -> String {
            format!("<p>{markdown}</p>")
        }
    }

    fn review(position: Option<usize>) -> ReviewComment {
        ReviewComment {
            id: 7,
            path: "src/lib.rs".to_string(),
            position,
            body: "looks good".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            user: CommentAuthor {
                login: "octocat".to_string(),
                avatar_url: "https://avatars.example/octocat".to_string(),
            },
            in_reply_to_id: None,
        }
    }

    #[test]
    fn parse_pull_request_ref() {
        let pr: PullRequestRef = "octo/widgets#12".parse().unwrap();
        assert_eq!(pr.to_string(), "octo/widgets#12");
        for bad in ["octo/widgets", "octo#12", "/widgets#1", "a/b/c#1", "octo/widgets#x"] {
            assert!(bad.parse::<PullRequestRef>().is_err(), "{bad}");
        }
    }

    #[test]
    fn from_review_maps_fields() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 15, 0, 0).unwrap();
        let comment = Comment::from_review(&review(Some(3)), &Verbatim, now).unwrap();
        assert_eq!(comment.id, 7);
        assert_eq!(comment.group_id, 7);
        assert_eq!(comment.anchor_position, 3);
        assert_eq!(comment.author_name, "octocat");
        assert_eq!(comment.body_rendered, "<p>looks good</p>");
        assert_eq!(comment.created_at, "3 hours ago");
    }

    #[test]
    fn from_review_skips_outdated() {
        let now = Utc::now();
        assert!(Comment::from_review(&review(None), &Verbatim, now).is_none());
    }

    #[test]
    fn humanize_ranges() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let ago = |d: Duration| humanize_since(now - d, now);
        assert_eq!(ago(Duration::seconds(5)), "just now");
        assert_eq!(ago(Duration::seconds(-30)), "just now");
        assert_eq!(ago(Duration::minutes(1)), "a minute ago");
        assert_eq!(ago(Duration::minutes(42)), "42 minutes ago");
        assert_eq!(ago(Duration::hours(1)), "an hour ago");
        assert_eq!(ago(Duration::hours(5)), "5 hours ago");
        assert_eq!(ago(Duration::hours(30)), "yesterday");
        assert_eq!(ago(Duration::days(9)), "9 days ago");
        assert_eq!(ago(Duration::days(65)), "2 months ago");
        assert_eq!(ago(Duration::days(400)), "one year ago");
    }

    #[test]
    fn review_comment_json_round_trips_reply_id() {
        let mut c = review(Some(1));
        c.in_reply_to_id = Some(3);
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("in_reply_to_id"));
        let back: ReviewComment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
