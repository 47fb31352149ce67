//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and protocol defaults so a rename only requires changing this file.

use std::time::Duration;

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "diffthread";

/// Crate version as reported by `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Local config filename (e.g. `.diffthread.toml` in repo root).
pub const CONFIG_FILENAME: &str = ".diffthread.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "diffthread";

/// Default GitHub REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// URI scheme used by rendered content to talk back to the host.
pub const DEFAULT_BRIDGE_SCHEME: &str = "app";

/// Body font size used when nothing else is configured.
pub const DEFAULT_FONT_SIZE_PX: u32 = 15;

/// Upper bound for a single remote store call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size for paginated comment listings (GitHub maximum).
pub const COMMENTS_PER_PAGE: usize = 100;

/// Alert title shown when a create or reply call fails.
pub const SUBMIT_FAILED_TITLE: &str = "Unable to Comment";

/// Message reported when the initial comment fetch fails.
pub const LOAD_FAILED_MESSAGE: &str = "Unable to load comments.";

/// Status text shown while a submission is in flight.
pub const SUBMITTING_STATUS: &str = "Commenting...";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_TOKEN: &str = "DIFFTHREAD_TOKEN";
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_API_URL: &str = "DIFFTHREAD_API_URL";
pub const ENV_FONT_SIZE: &str = "DIFFTHREAD_FONT_SIZE";
pub const ENV_TIMEOUT_SECS: &str = "DIFFTHREAD_TIMEOUT_SECS";
