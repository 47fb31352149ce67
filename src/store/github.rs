//! GitHub Pull Request Review Comments API client.
//!
//! | Operation      | Endpoint |
//! |---|---|
//! | `fetch_all`    | `GET /repos/{owner}/{repo}/pulls/{n}/comments` (paginated) |
//! | `create`       | `POST /repos/{owner}/{repo}/pulls/{n}/comments` |
//! | `create_reply` | `POST /repos/{owner}/{repo}/pulls/{n}/comments/{id}/replies` |
//!
//! Works against GitHub Enterprise by pointing `api_url` at `/api/v3`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::GithubConfig;
use crate::constants::{APP_NAME, COMMENTS_PER_PAGE, VERSION};
use crate::models::comment::{
    CommentAuthor, NewReviewComment, PullRequestRef, ReplyComment, ReviewComment,
};
use crate::store::{CommentStore, StoreError};

/// Review comment as returned by the REST API.
#[derive(Debug, Deserialize)]
struct ApiComment {
    id: u64,
    path: String,
    position: Option<usize>,
    body: String,
    created_at: DateTime<Utc>,
    /// `null` for deleted accounts.
    user: Option<ApiUser>,
    #[serde(default)]
    in_reply_to_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    login: String,
    avatar_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl From<ApiComment> for ReviewComment {
    fn from(c: ApiComment) -> Self {
        let user = c.user.map_or_else(
            || CommentAuthor {
                login: "ghost".to_string(),
                avatar_url: String::new(),
            },
            |u| CommentAuthor {
                login: u.login,
                avatar_url: u.avatar_url,
            },
        );
        ReviewComment {
            id: c.id,
            path: c.path,
            position: c.position,
            body: c.body,
            created_at: c.created_at,
            user,
            in_reply_to_id: c.in_reply_to_id,
        }
    }
}

/// [`CommentStore`] backed by the GitHub REST API.
pub struct GithubStore {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl GithubStore {
    /// Build a client. `timeout` bounds every request.
    pub fn new(config: &GithubConfig, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("{APP_NAME}/{VERSION}"))
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn comments_url(&self, pr: &PullRequestRef) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}/comments",
            self.api_url, pr.owner, pr.repo, pr.number
        )
    }

    fn replies_url(&self, pr: &PullRequestRef, parent_id: u64) -> String {
        format!("{}/{parent_id}/replies", self.comments_url(pr))
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Token for write requests. Reads work anonymously on public repos.
    fn require_token(&self) -> Result<(), StoreError> {
        match self.token {
            Some(_) => Ok(()),
            None => Err(StoreError::MissingToken),
        }
    }

    /// Send a request and decode a successful JSON response.
    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, StoreError> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

/// Build an [`StoreError::Api`] from a failed response, preferring GitHub's
/// `message` field over the raw body.
fn api_error(status: u16, body: &str) -> StoreError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                "<no body>".to_string()
            } else {
                body.trim().to_string()
            }
        });
    StoreError::Api { status, message }
}

#[async_trait]
impl CommentStore for GithubStore {
    async fn fetch_all(&self, pr: &PullRequestRef) -> Result<Vec<ReviewComment>, StoreError> {
        let url = self.comments_url(pr);
        let mut all = Vec::new();

        for page in 1.. {
            tracing::debug!(%pr, page, "fetching review comments");
            let batch: Vec<ApiComment> = self
                .send(self.request(reqwest::Method::GET, &url).query(&[
                    ("per_page", COMMENTS_PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ]))
                .await?;
            let short_page = batch.len() < COMMENTS_PER_PAGE;
            all.extend(batch.into_iter().map(ReviewComment::from));
            if short_page {
                break;
            }
        }

        Ok(all)
    }

    async fn create(
        &self,
        pr: &PullRequestRef,
        comment: &NewReviewComment,
    ) -> Result<ReviewComment, StoreError> {
        self.require_token()?;
        let payload = serde_json::json!({
            "body": comment.body,
            "commit_id": comment.commit_sha,
            "path": comment.path,
            "position": comment.position,
        });
        tracing::debug!(%pr, path = %comment.path, position = comment.position, "creating review comment");
        let created: ApiComment = self
            .send(self.request(reqwest::Method::POST, &self.comments_url(pr)).json(&payload))
            .await?;
        Ok(created.into())
    }

    async fn create_reply(
        &self,
        pr: &PullRequestRef,
        reply: &ReplyComment,
    ) -> Result<ReviewComment, StoreError> {
        self.require_token()?;
        let payload = serde_json::json!({ "body": reply.body });
        tracing::debug!(%pr, parent_id = reply.parent_id, "creating review comment reply");
        let created: ApiComment = self
            .send(
                self.request(reqwest::Method::POST, &self.replies_url(pr, reply.parent_id))
                    .json(&payload),
            )
            .await?;
        Ok(created.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pr() -> PullRequestRef {
        PullRequestRef {
            owner: "octo".to_string(),
            repo: "widgets".to_string(),
            number: 42,
        }
    }

    fn store(api_url: &str) -> GithubStore {
        let config = GithubConfig {
            api_url: api_url.to_string(),
            token: Some("ghp_test".to_string()),
        };
        GithubStore::new(&config, Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn builds_endpoint_urls() {
        let store = store("https://ghe.example.com/api/v3/");
        assert_eq!(
            store.comments_url(&pr()),
            "https://ghe.example.com/api/v3/repos/octo/widgets/pulls/42/comments"
        );
        assert_eq!(
            store.replies_url(&pr(), 7),
            "https://ghe.example.com/api/v3/repos/octo/widgets/pulls/42/comments/7/replies"
        );
    }

    #[test]
    fn decodes_api_comment() {
        let json = r#"{
            "id": 10,
            "path": "src/lib.rs",
            "position": 4,
            "original_position": 4,
            "body": "Nit: **rename**",
            "created_at": "2026-02-03T10:00:00Z",
            "user": {"login": "octocat", "avatar_url": "https://avatars.example/1", "id": 1},
            "in_reply_to_id": 3
        }"#;
        let comment: ReviewComment = serde_json::from_str::<ApiComment>(json).unwrap().into();
        assert_eq!(comment.id, 10);
        assert_eq!(comment.position, Some(4));
        assert_eq!(comment.user.login, "octocat");
        assert_eq!(comment.in_reply_to_id, Some(3));
        assert_eq!(comment.created_at.to_rfc3339(), "2026-02-03T10:00:00+00:00");
    }

    #[test]
    fn decodes_outdated_comment_and_ghost_user() {
        let json = r#"{
            "id": 11,
            "path": "src/lib.rs",
            "position": null,
            "body": "stale",
            "created_at": "2026-02-03T10:00:00Z",
            "user": null
        }"#;
        let comment: ReviewComment = serde_json::from_str::<ApiComment>(json).unwrap().into();
        assert_eq!(comment.position, None);
        assert_eq!(comment.user.login, "ghost");
        assert_eq!(comment.in_reply_to_id, None);
    }

    #[test]
    fn api_error_prefers_message_field() {
        let err = api_error(422, r#"{"message":"Validation Failed","errors":[]}"#);
        assert_eq!(err.to_string(), "GitHub API returned HTTP 422: Validation Failed");

        let err = api_error(502, "Bad Gateway");
        assert_eq!(err.to_string(), "GitHub API returned HTTP 502: Bad Gateway");

        let err = api_error(500, "  ");
        assert!(err.to_string().contains("<no body>"));
    }

    #[tokio::test]
    async fn writes_require_token() {
        let config = GithubConfig {
            api_url: "http://127.0.0.1:1".to_string(),
            token: None,
        };
        let store = GithubStore::new(&config, Duration::from_secs(2)).unwrap();
        let reply = ReplyComment {
            body: "ok".to_string(),
            parent_id: 1,
        };
        let result = store.create_reply(&pr(), &reply).await;
        assert!(matches!(result, Err(StoreError::MissingToken)));
    }

    #[tokio::test]
    async fn unreachable_host_is_http_error() {
        // Port 1 on localhost refuses connections.
        let result = store("http://127.0.0.1:1").fetch_all(&pr()).await;
        assert!(matches!(result, Err(StoreError::Http(_))));
    }
}
