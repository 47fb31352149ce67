//! Composer session state owned by the sync controller.

use serde::Serialize;

use crate::bridge::Intent;

/// What a composer session will create on submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComposeTarget {
    NewComment {
        anchor_position: usize,
        display_label: u32,
    },
    Reply {
        parent_id: u64,
    },
}

impl From<Intent> for ComposeTarget {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::RequestNewComment {
                display_label,
                anchor_position,
            } => ComposeTarget::NewComment {
                anchor_position,
                display_label,
            },
            Intent::RequestReply { parent_id } => ComposeTarget::Reply { parent_id },
        }
    }
}

/// An open comment composer. Owned by the sync controller; hosts only
/// ever see it by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposeSession {
    pub target: ComposeTarget,
    pub pending_text: String,
}

impl ComposeSession {
    pub fn new(target: ComposeTarget) -> Self {
        Self {
            target,
            pending_text: String::new(),
        }
    }

    /// Composer title: `Line N` for new comments, `Reply` for replies.
    pub fn title(&self) -> String {
        match self.target {
            ComposeTarget::NewComment { display_label, .. } => format!("Line {display_label}"),
            ComposeTarget::Reply { .. } => "Reply".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles() {
        let line = ComposeSession::new(
            Intent::RequestNewComment {
                display_label: 42,
                anchor_position: 5,
            }
            .into(),
        );
        assert_eq!(line.title(), "Line 42");
        assert!(line.pending_text.is_empty());

        let reply = ComposeSession::new(Intent::RequestReply { parent_id: 9 }.into());
        assert_eq!(reply.title(), "Reply");
        assert_eq!(reply.target, ComposeTarget::Reply { parent_id: 9 });
    }
}
