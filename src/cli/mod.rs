//! CLI command definitions and the terminal host view.

pub mod args;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use colored::Colorize;

use diffthread::host::HostView;
use diffthread::sync::{ComposeSession, SyncError};

/// What the terminal host observed, read back once the controller settles.
#[derive(Debug, Default)]
pub struct HostRecord {
    pub document: Option<String>,
    pub load_error: Option<String>,
    pub alert: Option<(String, String)>,
}

/// [`HostView`] for one-shot CLI commands: keeps the latest document and
/// prints composer and error events to stderr.
#[derive(Clone, Default)]
pub struct CliHost {
    record: Arc<Mutex<HostRecord>>,
}

impl CliHost {
    pub fn record(&self) -> MutexGuard<'_, HostRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HostView for CliHost {
    fn load_document(&mut self, document: &str) {
        self.record().document = Some(document.to_string());
    }

    fn show_composer(&mut self, session: &ComposeSession) {
        tracing::debug!(title = %session.title(), "composer opened");
        eprintln!("  {} {}", "✎".cyan().bold(), session.title().dimmed());
    }

    fn dismiss_composer(&mut self) {}

    fn report_error(&mut self, error: &SyncError) {
        let detail = match error {
            SyncError::LoadCommentsFailed(source) | SyncError::SubmitCommentFailed(source) => {
                source.to_string()
            }
        };
        eprintln!(
            "  {} {} {}",
            "⚠".yellow().bold(),
            error.to_string().yellow(),
            detail.dimmed()
        );
        self.record().load_error = Some(detail);
    }

    fn show_alert(&mut self, title: &str, message: &str) {
        eprintln!("  {} {}: {}", "✖".red().bold(), title.red().bold(), message);
        self.record().alert = Some((title.to_string(), message.to_string()));
    }
}
