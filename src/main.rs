//! diffthread — pull request diffs with inline review comments.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use std::io::IsTerminal;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use diffthread::activity::{ActivityIndicator, NoopActivity, TerminalActivity};
use diffthread::bridge::{Bridge, Intent, Interception};
use diffthread::config::Config;
use diffthread::constants::{self, SUBMITTING_STATUS};
use diffthread::env::Env;
use diffthread::markup::GfmRenderer;
use diffthread::models::PatchLineKind;
use diffthread::patch;
use diffthread::render::SurfaceRenderer;
use diffthread::render::html::{HtmlRenderer, document_title};
use diffthread::render::json::JsonRenderer;
use diffthread::render::terminal::TerminalRenderer;
use diffthread::store::github::GithubStore;
use diffthread::sync::{CommentSyncController, DiffTarget, SyncDeps, SyncState};

use cli::CliHost;
use cli::args::{
    BridgeArgs, Cli, Command, CommentArgs, PatchSource, RenderFormat, ReplyArgs, TargetArgs,
    ViewArgs,
};

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default: warnings only).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Command::Version = cli.command {
        return run_version();
    }

    let config = Config::load(Some(&cli.config_dir), &Env::real())
        .context("failed to load configuration")?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Command::View(args) => run_view(config, cli.quiet, args).await,
        Command::Comment(args) => run_comment(config, cli.quiet, args).await,
        Command::Reply(args) => run_reply(config, cli.quiet, args).await,
        Command::Bridge(args) => run_bridge(config, cli.quiet, args).await,
        Command::Version => run_version(),
    }
}

fn run_version() -> Result<()> {
    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    Ok(())
}

/// Fetch the file's comments and write the rendered document.
async fn run_view(mut config: Config, quiet: bool, args: ViewArgs) -> Result<()> {
    if let Some(size) = args.font_size {
        config.render.font_size_px = size;
    }
    let patch_text = load_patch(&args.target).await?;

    let renderer: Box<dyn SurfaceRenderer> = match args.format {
        RenderFormat::Html => Box::new(HtmlRenderer::new(
            Bridge::new(config.render.bridge_scheme.clone()),
            document_title(&args.target.path),
        )),
        RenderFormat::Json => Box::new(JsonRenderer),
        RenderFormat::Terminal => Box::new(TerminalRenderer),
    };
    let host = CliHost::default();
    let mut controller = build_controller(&config, quiet, &args.target, patch_text, renderer, &host)?;

    controller.activate();
    settle(&mut controller).await;

    let document = host.record().document.take().unwrap_or_default();
    match &args.output {
        Some(path) => {
            tokio::fs::write(path, document)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("  {} Wrote {}", "✔".green().bold(), path.display());
        }
        None => print!("{document}"),
    }
    Ok(())
}

/// Post a new comment on a patch position.
async fn run_comment(config: Config, quiet: bool, args: CommentArgs) -> Result<()> {
    args.target.validate_for_comment().map_err(|e| anyhow!(e))?;
    let patch_text = load_patch(&args.target).await?;

    let lines = patch::parse(&patch_text);
    let line = lines.get(args.position).ok_or_else(|| {
        anyhow!(
            "position {} is outside the patch ({} lines)",
            args.position,
            lines.len()
        )
    })?;
    if line.kind == PatchLineKind::HunkHeader {
        bail!("position {} is a hunk header and cannot be commented on", args.position);
    }
    let intent = Intent::RequestNewComment {
        display_label: line.display_number(),
        anchor_position: args.position,
    };

    let host = CliHost::default();
    let mut controller = build_controller(
        &config,
        quiet,
        &args.target,
        patch_text,
        Box::new(TerminalRenderer),
        &host,
    )?;
    controller.activate();
    settle(&mut controller).await;

    controller.open_composer(intent);
    submit(&mut controller, &host, args.body).await
}

/// Reply to an existing comment thread.
async fn run_reply(config: Config, quiet: bool, args: ReplyArgs) -> Result<()> {
    let patch_text = load_patch(&args.target).await?;
    let host = CliHost::default();
    let mut controller = build_controller(
        &config,
        quiet,
        &args.target,
        patch_text,
        Box::new(TerminalRenderer),
        &host,
    )?;
    controller.activate();
    settle(&mut controller).await;

    controller.open_composer(Intent::RequestReply { parent_id: args.to });
    submit(&mut controller, &host, args.body).await
}

/// Decode a bridge URI. With `--body`, drive it through the controller the
/// way a web view host would.
async fn run_bridge(mut config: Config, quiet: bool, args: BridgeArgs) -> Result<()> {
    if let Some(scheme) = &args.scheme {
        config.render.bridge_scheme = scheme.clone();
    }

    let Some(body) = args.body else {
        let bridge = Bridge::new(config.render.bridge_scheme.clone());
        return match bridge.intercept(&args.uri) {
            Interception::Perform => {
                println!(
                    "not a {}:// URI; navigation proceeds",
                    bridge.scheme()
                );
                Ok(())
            }
            Interception::Suppress(Ok(intent)) => {
                print_intent(&intent);
                Ok(())
            }
            Interception::Suppress(Err(err)) => Err(err).context("malformed bridge command"),
        };
    };

    let patch_text = load_patch(&args.target).await?;
    let host = CliHost::default();
    let mut controller = build_controller(
        &config,
        quiet,
        &args.target,
        patch_text,
        Box::new(TerminalRenderer),
        &host,
    )?;
    controller.activate();
    settle(&mut controller).await;

    if controller.handle_navigation(&args.uri) {
        bail!("not a {}:// URI", config.render.bridge_scheme);
    }
    if controller.session().is_none() {
        bail!("malformed bridge command: {}", args.uri);
    }
    submit(&mut controller, &host, body).await
}

fn print_intent(intent: &Intent) {
    match intent {
        Intent::RequestNewComment {
            display_label,
            anchor_position,
        } => println!(
            "{} line {display_label} (position {anchor_position})",
            "comment".bold()
        ),
        Intent::RequestReply { parent_id } => {
            println!("{} comment {parent_id}", "reply-to".bold())
        }
    }
}

fn build_controller(
    config: &Config,
    quiet: bool,
    target: &TargetArgs,
    patch: String,
    renderer: Box<dyn SurfaceRenderer>,
    host: &CliHost,
) -> Result<CommentSyncController> {
    let pull_request = target.pull_request().map_err(|e| anyhow!(e))?;
    let store = GithubStore::new(&config.github, config.network.timeout())
        .context("failed to build GitHub client")?;

    let show_status = !quiet && std::io::stderr().is_terminal();
    let interaction_lock: Arc<dyn ActivityIndicator> =
        Arc::new(TerminalActivity::new(SUBMITTING_STATUS, show_status));

    Ok(CommentSyncController::new(
        DiffTarget {
            pull_request,
            path: target.path.clone(),
            commit_sha: target.commit.clone(),
            patch,
        },
        SyncDeps {
            store: Arc::new(store),
            markdown: Arc::new(GfmRenderer),
            network_activity: Arc::new(NoopActivity),
            interaction_lock,
            host: Box::new(host.clone()),
            renderer,
            bridge: Bridge::new(config.render.bridge_scheme.clone()),
            font_size_px: config.render.font_size_px,
            request_timeout: config.network.timeout(),
        },
    ))
}

async fn load_patch(target: &TargetArgs) -> Result<String> {
    match target.patch_source().map_err(|e| anyhow!(e))? {
        PatchSource::File(path) => patch::read_patch_file(&path)
            .await
            .context("failed to load patch"),
        PatchSource::Stdin => patch::read_patch_stdin()
            .await
            .context("failed to read patch from stdin"),
        PatchSource::Empty => Ok(String::new()),
    }
}

/// Apply completions until nothing is in flight.
async fn settle(controller: &mut CommentSyncController) {
    while controller.next_completion().await {}
}

/// Submit the open composer and print the updated file.
async fn submit(controller: &mut CommentSyncController, host: &CliHost, body: String) -> Result<()> {
    if controller.state() != SyncState::Composing {
        bail!("cannot comment right now (state: {})", controller.state());
    }
    controller.submit(body);
    settle(controller).await;

    if let Some((title, message)) = host.record().alert.take() {
        bail!("{title}: {message}");
    }

    if let Some(created) = controller.comments().last() {
        eprintln!(
            "  {} Comment {} posted on {}",
            "✔".green().bold(),
            created.id.to_string().bold(),
            controller.target().pull_request
        );
    }
    if let Some(document) = host.record().document.take() {
        print!("{document}");
    }
    controller.teardown();
    Ok(())
}
