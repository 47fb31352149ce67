//! Comment synchronization for one diff view.
//!
//! [`CommentSyncController`] owns the authoritative comment collection and
//! the composer session. It is driven from a single owning context: user
//! actions arrive as method calls, store calls run on spawned tasks, and
//! their results come back as [`Completion`] messages that only the owner
//! applies (`next_completion` / `drain_completions`).
//!
//! | From         | Event            | To           |
//! |--------------|------------------|--------------|
//! | `Idle`       | `activate`       | `Loading`    |
//! | `Loading`    | fetch completed  | `Ready`      |
//! | `Ready`      | `open_composer`  | `Composing`  |
//! | `Composing`  | `cancel`         | `Ready`      |
//! | `Composing`  | `submit`         | `Submitting` |
//! | `Submitting` | created          | `Ready`      |
//! | `Submitting` | failed           | `Composing`  |
//! | any          | `teardown`       | `Closed`     |

mod session;

pub use session::{ComposeSession, ComposeTarget};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use strum::Display;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::activity::{ActivityGuard, ActivityIndicator};
use crate::bridge::{Bridge, Intent, Interception};
use crate::comments;
use crate::constants::{LOAD_FAILED_MESSAGE, SUBMIT_FAILED_TITLE};
use crate::host::HostView;
use crate::markup::MarkdownRenderer;
use crate::models::comment::{
    Comment, NewReviewComment, PullRequestRef, ReplyComment, ReviewComment,
};
use crate::models::patch::PatchLine;
use crate::patch;
use crate::render::{DiffRenderModel, SurfaceRenderer};
use crate::store::{CommentStore, StoreError};

/// Failures surfaced to the host.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("{}", LOAD_FAILED_MESSAGE)]
    LoadCommentsFailed(#[source] StoreError),

    #[error("{0}")]
    SubmitCommentFailed(#[source] StoreError),
}

/// Controller lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SyncState {
    Idle,
    Loading,
    Ready,
    Composing,
    Submitting,
    /// Torn down; every further call is a no-op.
    Closed,
}

/// Result of a store call, tagged with the generation that started it.
#[derive(Debug)]
pub enum Completion {
    Fetched {
        generation: u64,
        result: Result<Vec<ReviewComment>, StoreError>,
    },
    Submitted {
        generation: u64,
        result: Result<ReviewComment, StoreError>,
    },
}

impl Completion {
    fn generation(&self) -> u64 {
        match self {
            Completion::Fetched { generation, .. } | Completion::Submitted { generation, .. } => {
                *generation
            }
        }
    }
}

/// The file being viewed.
#[derive(Debug, Clone)]
pub struct DiffTarget {
    pub pull_request: PullRequestRef,
    pub path: String,
    /// Head commit the patch belongs to; new comments are made against it.
    pub commit_sha: String,
    pub patch: String,
}

/// Collaborators injected at construction.
pub struct SyncDeps {
    pub store: Arc<dyn CommentStore>,
    pub markdown: Arc<dyn MarkdownRenderer>,
    pub network_activity: Arc<dyn ActivityIndicator>,
    pub interaction_lock: Arc<dyn ActivityIndicator>,
    pub host: Box<dyn HostView>,
    pub renderer: Box<dyn SurfaceRenderer>,
    pub bridge: Bridge,
    pub font_size_px: u32,
    pub request_timeout: Duration,
}

pub struct CommentSyncController {
    target: DiffTarget,
    lines: Vec<PatchLine>,
    comments: Vec<ReviewComment>,
    state: SyncState,
    session: Option<ComposeSession>,
    generation: u64,

    store: Arc<dyn CommentStore>,
    markdown: Arc<dyn MarkdownRenderer>,
    network_activity: Arc<dyn ActivityIndicator>,
    interaction_lock: Arc<dyn ActivityIndicator>,
    host: Box<dyn HostView>,
    renderer: Box<dyn SurfaceRenderer>,
    bridge: Bridge,
    font_size_px: u32,
    request_timeout: Duration,

    network_guard: Option<ActivityGuard>,
    interaction_guard: Option<ActivityGuard>,

    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl CommentSyncController {
    pub fn new(target: DiffTarget, deps: SyncDeps) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let lines = patch::parse(&target.patch);
        Self {
            target,
            lines,
            comments: Vec::new(),
            state: SyncState::Idle,
            session: None,
            generation: 0,
            store: deps.store,
            markdown: deps.markdown,
            network_activity: deps.network_activity,
            interaction_lock: deps.interaction_lock,
            host: deps.host,
            renderer: deps.renderer,
            bridge: deps.bridge,
            font_size_px: deps.font_size_px,
            request_timeout: deps.request_timeout,
            network_guard: None,
            interaction_guard: None,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn session(&self) -> Option<&ComposeSession> {
        self.session.as_ref()
    }

    /// The authoritative collection, in arrival order.
    pub fn comments(&self) -> &[ReviewComment] {
        &self.comments
    }

    pub fn target(&self) -> &DiffTarget {
        &self.target
    }

    /// Whether a store call is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self.state, SyncState::Loading | SyncState::Submitting)
    }

    /// Render the file and start the one comment fetch. Later calls do nothing.
    pub fn activate(&mut self) {
        if self.state != SyncState::Idle {
            tracing::debug!(state = %self.state, "activate ignored");
            return;
        }
        self.transition(SyncState::Loading);
        self.render();

        self.network_guard = Some(ActivityGuard::acquire(&self.network_activity));
        let store = Arc::clone(&self.store);
        let pr = self.target.pull_request.clone();
        let limit = self.request_timeout;
        let generation = self.generation;
        self.spawn(async move {
            let result = with_timeout(limit, store.fetch_all(&pr)).await;
            Completion::Fetched { generation, result }
        });
    }

    /// Navigation hook for the rendering surface. Returns `true` when the
    /// navigation should be performed.
    pub fn handle_navigation(&mut self, uri: &str) -> bool {
        match self.bridge.intercept(uri) {
            Interception::Perform => true,
            Interception::Suppress(Ok(intent)) => {
                self.open_composer(intent);
                false
            }
            Interception::Suppress(Err(err)) => {
                tracing::debug!(%uri, error = %err, "dropping malformed bridge command");
                false
            }
        }
    }

    /// Open the composer. Only honored while `Ready`.
    pub fn open_composer(&mut self, intent: Intent) {
        if self.state != SyncState::Ready {
            tracing::debug!(state = %self.state, ?intent, "composer request ignored");
            return;
        }
        let session = ComposeSession::new(intent.into());
        self.host.show_composer(&session);
        self.session = Some(session);
        self.transition(SyncState::Composing);
    }

    pub fn set_pending_text(&mut self, text: impl Into<String>) {
        if self.state != SyncState::Composing {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.pending_text = text.into();
        }
    }

    /// Discard the open composer.
    pub fn cancel(&mut self) {
        if self.state != SyncState::Composing {
            return;
        }
        self.session = None;
        self.host.dismiss_composer();
        self.transition(SyncState::Ready);
    }

    /// Send the composer's comment to the store.
    pub fn submit(&mut self, text: impl Into<String>) {
        if self.state != SyncState::Composing {
            tracing::debug!(state = %self.state, "submit ignored");
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.pending_text = text.into();
        let body = session.pending_text.clone();
        let target = session.target;

        self.transition(SyncState::Submitting);
        self.interaction_guard = Some(ActivityGuard::acquire(&self.interaction_lock));
        self.network_guard = Some(ActivityGuard::acquire(&self.network_activity));

        let store = Arc::clone(&self.store);
        let pr = self.target.pull_request.clone();
        let limit = self.request_timeout;
        let generation = self.generation;
        match target {
            ComposeTarget::NewComment {
                anchor_position, ..
            } => {
                let comment = NewReviewComment {
                    body,
                    commit_sha: self.target.commit_sha.clone(),
                    path: self.target.path.clone(),
                    position: anchor_position,
                };
                self.spawn(async move {
                    let result = with_timeout(limit, store.create(&pr, &comment)).await;
                    Completion::Submitted { generation, result }
                });
            }
            ComposeTarget::Reply { parent_id } => {
                let reply = ReplyComment { body, parent_id };
                self.spawn(async move {
                    let result = with_timeout(limit, store.create_reply(&pr, &reply)).await;
                    Completion::Submitted { generation, result }
                });
            }
        }
    }

    /// Detach from the host. In-flight results are discarded when they arrive.
    pub fn teardown(&mut self) {
        if self.state == SyncState::Closed {
            return;
        }
        self.generation += 1;
        self.interaction_guard = None;
        self.network_guard = None;
        self.session = None;
        self.transition(SyncState::Closed);
    }

    /// Wait for the in-flight store call and apply its result. Returns
    /// `false` immediately when nothing is in flight.
    pub async fn next_completion(&mut self) -> bool {
        if !self.is_busy() {
            return false;
        }
        match self.rx.recv().await {
            Some(completion) => {
                self.apply(completion);
                true
            }
            None => false,
        }
    }

    /// Apply every completion already received, without waiting.
    pub fn drain_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.rx.try_recv() {
            self.apply(completion);
            applied += 1;
        }
        applied
    }

    /// The render model for the current collection.
    pub fn render_model(&self) -> DiffRenderModel {
        let now = Utc::now();
        let views: Vec<Comment> = self
            .comments
            .iter()
            .filter_map(|c| Comment::from_review(c, self.markdown.as_ref(), now))
            .collect();
        let groups = comments::build(&views, &self.target.path);
        DiffRenderModel::compute(&self.lines, &groups, self.font_size_px)
    }

    fn apply(&mut self, completion: Completion) {
        if completion.generation() != self.generation {
            tracing::debug!(
                stale = completion.generation(),
                current = self.generation,
                "discarding stale completion"
            );
            return;
        }

        match completion {
            Completion::Fetched { result, .. } => {
                if self.state != SyncState::Loading {
                    return;
                }
                self.network_guard = None;
                self.transition(SyncState::Ready);
                match result {
                    Ok(comments) => {
                        tracing::info!(count = comments.len(), "comments loaded");
                        self.comments = comments;
                        self.render();
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to load comments");
                        self.comments.clear();
                        self.host.report_error(&SyncError::LoadCommentsFailed(err));
                        self.render();
                    }
                }
            }
            Completion::Submitted { result, .. } => {
                if self.state != SyncState::Submitting {
                    return;
                }
                self.network_guard = None;
                self.interaction_guard = None;
                match result {
                    Ok(comment) => {
                        tracing::info!(id = comment.id, "comment created");
                        self.comments.push(comment);
                        self.session = None;
                        self.transition(SyncState::Ready);
                        self.host.dismiss_composer();
                        self.render();
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to submit comment");
                        self.transition(SyncState::Composing);
                        let err = SyncError::SubmitCommentFailed(err);
                        self.host.show_alert(SUBMIT_FAILED_TITLE, &err.to_string());
                    }
                }
            }
        }
    }

    fn render(&mut self) {
        let document = self.renderer.render(&self.render_model());
        self.host.load_document(&document);
    }

    fn transition(&mut self, next: SyncState) {
        tracing::debug!(from = %self.state, to = %next, "sync state");
        self.state = next;
    }

    fn spawn(&self, task: impl Future<Output = Completion> + Send + 'static) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            // The receiver is gone once the controller is dropped.
            let _ = tx.send(task.await);
        });
    }
}

async fn with_timeout<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(StoreError::Timeout(limit)))
}
