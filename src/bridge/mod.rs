//! Command channel from rendered content back to the host.
//!
//! Rendered content signals user actions by navigating to
//! `scheme://<command>#<url-encoded JSON>`. The host intercepts every
//! navigation, consumes the ones using the bridge scheme, and decodes them
//! into typed [`Intent`]s. Everything else is left to the default
//! navigation policy.
//!
//! | Command    | Payload                                | Intent                |
//! |------------|----------------------------------------|-----------------------|
//! | `comment`  | `{"patchLine": int, "fileLine": int}`  | [`Intent::RequestNewComment`] |
//! | `reply-to` | `{"id": int}`                          | [`Intent::RequestReply`] |

use percent_encoding::{NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::constants::DEFAULT_BRIDGE_SCHEME;

/// A user action decoded from the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Start a new comment. `display_label` only labels the prompt;
    /// `anchor_position` is the comment anchor.
    RequestNewComment {
        display_label: u32,
        anchor_position: usize,
    },
    /// Reply to the thread rooted at `parent_id`.
    RequestReply { parent_id: u64 },
}

/// Malformed bridge payloads. Internal protocol errors, never shown to users.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("not a bridge URI: {0}")]
    NotBridgeUri(String),

    #[error("unknown bridge command: {0}")]
    UnknownCommand(String),

    #[error("bridge command `{0}` has no payload")]
    MissingPayload(BridgeCommand),

    #[error("bridge payload is not valid percent-encoded UTF-8")]
    BadEncoding,

    #[error("malformed `{command}` payload: {source}")]
    BadPayload {
        command: BridgeCommand,
        source: serde_json::Error,
    },
}

/// Commands understood by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum BridgeCommand {
    #[strum(serialize = "comment")]
    Comment,
    #[strum(serialize = "reply-to")]
    ReplyTo,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentPayload {
    patch_line: u32,
    file_line: usize,
}

#[derive(Serialize, Deserialize)]
struct ReplyPayload {
    id: u64,
}

/// Outcome of intercepting one attempted navigation.
#[derive(Debug)]
pub enum Interception {
    /// Not a bridge URI; let the navigation proceed normally.
    Perform,
    /// Bridge URI consumed; the navigation must not happen.
    Suppress(Result<Intent, BridgeError>),
}

impl Interception {
    /// Whether the surface should perform the navigation.
    pub fn should_navigate(&self) -> bool {
        matches!(self, Interception::Perform)
    }
}

/// Encoder/decoder for one bridge scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bridge {
    scheme: String,
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new(DEFAULT_BRIDGE_SCHEME)
    }
}

impl Bridge {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into().to_ascii_lowercase(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Decide what to do with an attempted navigation to `uri`.
    pub fn intercept(&self, uri: &str) -> Interception {
        if self.split_scheme(uri).is_none() {
            return Interception::Perform;
        }
        Interception::Suppress(self.decode(uri))
    }

    /// Decode a bridge URI into an intent.
    pub fn decode(&self, uri: &str) -> Result<Intent, BridgeError> {
        let rest = self
            .split_scheme(uri)
            .ok_or_else(|| BridgeError::NotBridgeUri(uri.to_string()))?;

        let (command, fragment) = match rest.split_once('#') {
            Some((command, fragment)) => (command, Some(fragment)),
            None => (rest, None),
        };
        // Some surfaces normalise `app://comment` to `app://comment/`.
        let command = command.trim_end_matches('/');
        let command: BridgeCommand = command
            .parse()
            .map_err(|_| BridgeError::UnknownCommand(command.to_string()))?;

        let fragment = fragment
            .filter(|f| !f.is_empty())
            .ok_or(BridgeError::MissingPayload(command))?;
        let json = percent_decode_str(fragment)
            .decode_utf8()
            .map_err(|_| BridgeError::BadEncoding)?;

        let bad_payload = |source| BridgeError::BadPayload { command, source };
        match command {
            BridgeCommand::Comment => {
                let payload: CommentPayload = serde_json::from_str(&json).map_err(bad_payload)?;
                Ok(Intent::RequestNewComment {
                    display_label: payload.patch_line,
                    anchor_position: payload.file_line,
                })
            }
            BridgeCommand::ReplyTo => {
                let payload: ReplyPayload = serde_json::from_str(&json).map_err(bad_payload)?;
                Ok(Intent::RequestReply {
                    parent_id: payload.id,
                })
            }
        }
    }

    /// Build the bridge URI that decodes back to `intent`.
    pub fn encode(&self, intent: &Intent) -> String {
        // Serialized from the structs directly so field order is kept.
        let (command, json) = match *intent {
            Intent::RequestNewComment {
                display_label,
                anchor_position,
            } => (
                BridgeCommand::Comment,
                serde_json::to_string(&CommentPayload {
                    patch_line: display_label,
                    file_line: anchor_position,
                }),
            ),
            Intent::RequestReply { parent_id } => (
                BridgeCommand::ReplyTo,
                serde_json::to_string(&ReplyPayload { id: parent_id }),
            ),
        };
        let json = json.unwrap_or_else(|_| "{}".to_string());
        let encoded = utf8_percent_encode(&json, NON_ALPHANUMERIC).to_string();
        format!("{}://{command}#{encoded}", self.scheme)
    }

    /// Return the part after `scheme://` if `uri` uses the bridge scheme.
    fn split_scheme<'a>(&self, uri: &'a str) -> Option<&'a str> {
        let (scheme, rest) = uri.split_once("://")?;
        scheme.eq_ignore_ascii_case(&self.scheme).then_some(rest)
    }
}
