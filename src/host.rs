//! The view that hosts a diff: a web view, a terminal, a test double.

use crate::sync::{ComposeSession, SyncError};

/// Presentation callbacks driven by the sync controller.
///
/// All calls come from the controller's owning context.
pub trait HostView: Send {
    /// Replace the displayed document.
    fn load_document(&mut self, document: &str);

    /// Present the comment composer for `session`.
    fn show_composer(&mut self, session: &ComposeSession);

    /// Close the composer if it is shown.
    fn dismiss_composer(&mut self);

    /// Report a non-modal error, such as a failed comment load.
    fn report_error(&mut self, error: &SyncError);

    /// Modal alert. The composer stays open underneath.
    fn show_alert(&mut self, title: &str, message: &str);
}
