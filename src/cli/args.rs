//! Clap argument types and validation.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use diffthread::models::PullRequestRef;

/// Pull request diffs with inline review comments.
#[derive(Parser, Debug)]
#[command(name = "diffthread", version = diffthread::constants::VERSION)]
pub struct Cli {
    /// Directory holding a `.diffthread.toml` (default: current directory).
    #[arg(long, global = true, default_value = ".")]
    pub config_dir: PathBuf,

    /// Suppress the activity indicator.
    #[arg(long, short, global = true, default_value_t = false)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Render a file's diff with its review comments.
    View(ViewArgs),

    /// Comment on a line of a file's diff.
    Comment(CommentArgs),

    /// Reply to a review comment thread.
    Reply(ReplyArgs),

    /// Decode a bridge URI; with --body, act on it.
    Bridge(BridgeArgs),

    /// Print version information.
    Version,
}

/// Document format for `view`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    Html,
    Json,
    Terminal,
}

/// Identifies the pull request file a command works on.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Pull request, as `owner/repo#number`.
    #[arg(long)]
    pub pr: Option<PullRequestRef>,

    /// File path within the repository, as listed by the pull request.
    #[arg(long, default_value = "")]
    pub path: String,

    /// File holding the file's unified diff hunks.
    #[arg(long)]
    pub patch_file: Option<PathBuf>,

    /// Read the unified diff hunks from stdin.
    #[arg(long, default_value_t = false)]
    pub patch_stdin: bool,

    /// Head commit SHA that new comments attach to.
    #[arg(long, default_value = "")]
    pub commit: String,
}

/// Where patch text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchSource {
    File(PathBuf),
    Stdin,
    /// No patch given; the view shows only outdated threads.
    Empty,
}

impl TargetArgs {
    pub fn pull_request(&self) -> Result<PullRequestRef, String> {
        self.pr
            .clone()
            .ok_or_else(|| "--pr is required (owner/repo#number)".to_string())
    }

    pub fn patch_source(&self) -> Result<PatchSource, String> {
        match (&self.patch_file, self.patch_stdin) {
            (Some(_), true) => Err("use either --patch-file or --patch-stdin, not both".to_string()),
            (Some(path), false) => Ok(PatchSource::File(path.clone())),
            (None, true) => Ok(PatchSource::Stdin),
            (None, false) => Ok(PatchSource::Empty),
        }
    }

    /// Checks for commands that create top-level comments.
    pub fn validate_for_comment(&self) -> Result<(), String> {
        self.pull_request()?;
        if self.path.is_empty() {
            return Err("--path is required to comment on a file".to_string());
        }
        if self.commit.is_empty() {
            return Err("--commit is required to comment on a file".to_string());
        }
        if self.patch_source()? == PatchSource::Empty {
            return Err("a patch is required: pass --patch-file or --patch-stdin".to_string());
        }
        Ok(())
    }
}

/// Arguments for the `view` subcommand.
#[derive(Parser, Debug)]
pub struct ViewArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = RenderFormat::Terminal)]
    pub format: RenderFormat,

    /// Write the document to a file instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Font size for HTML output, in pixels.
    #[arg(long)]
    pub font_size: Option<u32>,
}

/// Arguments for the `comment` subcommand.
#[derive(Parser, Debug)]
pub struct CommentArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// 0-based position of the line within the patch.
    #[arg(long)]
    pub position: usize,

    /// Comment body (Markdown).
    #[arg(long)]
    pub body: String,
}

/// Arguments for the `reply` subcommand.
#[derive(Parser, Debug)]
pub struct ReplyArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Id of the comment to reply to.
    #[arg(long)]
    pub to: u64,

    /// Reply body (Markdown).
    #[arg(long)]
    pub body: String,
}

/// Arguments for the `bridge` subcommand.
#[derive(Parser, Debug)]
pub struct BridgeArgs {
    /// Bridge URI, e.g. `app://reply-to#%7B%22id%22%3A1%7D`.
    pub uri: String,

    /// Bridge scheme (default: from config).
    #[arg(long)]
    pub scheme: Option<String>,

    /// Submit this body for the decoded command.
    #[arg(long)]
    pub body: Option<String>,

    #[command(flatten)]
    pub target: TargetArgs,
}
