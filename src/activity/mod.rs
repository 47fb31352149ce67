//! Activity indicators and the scoped guards that drive them.
//!
//! The sync controller holds two indicators: one for network activity
//! (a spinner, a status line) and one for the interaction lock (the host
//! ignoring input while a comment is submitted). Both are driven through
//! [`ActivityGuard`], so `end` runs on every exit path when the guard drops.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use colored::Colorize;

/// Something that can be switched on and off around an operation.
///
/// Calls nest: an implementation must stay active until every `begin` has
/// been matched by an `end`.
pub trait ActivityIndicator: Send + Sync {
    fn begin(&self);
    fn end(&self);
}

/// Holds an indicator active for as long as the guard lives.
#[must_use = "the indicator is released as soon as the guard is dropped"]
pub struct ActivityGuard {
    indicator: Arc<dyn ActivityIndicator>,
}

impl ActivityGuard {
    pub fn acquire(indicator: &Arc<dyn ActivityIndicator>) -> Self {
        indicator.begin();
        Self {
            indicator: Arc::clone(indicator),
        }
    }
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.indicator.end();
    }
}

impl std::fmt::Debug for ActivityGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ActivityGuard")
    }
}

/// Indicator that does nothing.
pub struct NoopActivity;

impl ActivityIndicator for NoopActivity {
    fn begin(&self) {}
    fn end(&self) {}
}

/// Indicator that only counts, for hosts without a visual indicator and
/// for asserting balanced guards.
#[derive(Default)]
pub struct CountingActivity {
    active: AtomicUsize,
    started: AtomicUsize,
}

impl CountingActivity {
    /// Number of currently held guards.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Number of guards ever acquired.
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

impl ActivityIndicator for CountingActivity {
    fn begin(&self) {
        self.active.fetch_add(1, Ordering::SeqCst);
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn end(&self) {
        // Saturating: an unmatched end must not wrap the counter.
        let _ = self
            .active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }
}

/// Status line on stderr, shown while at least one guard is held.
pub struct TerminalActivity {
    label: String,
    depth: AtomicUsize,
    enabled: bool,
}

impl TerminalActivity {
    /// `enabled` is false for non-interactive output, which silences it.
    pub fn new(label: impl Into<String>, enabled: bool) -> Self {
        Self {
            label: label.into(),
            depth: AtomicUsize::new(0),
            enabled,
        }
    }
}

impl ActivityIndicator for TerminalActivity {
    fn begin(&self) {
        if self.depth.fetch_add(1, Ordering::SeqCst) == 0 && self.enabled {
            let mut handle = io::stderr().lock();
            let _ = write!(handle, "  {} {}", "⠿".cyan().bold(), self.label.dimmed());
            let _ = handle.flush();
        }
    }

    fn end(&self) {
        let previous = self
            .depth
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if previous == Ok(1) && self.enabled {
            let mut handle = io::stderr().lock();
            // Carriage return, then clear the line.
            let _ = write!(handle, "\r\x1b[2K");
            let _ = handle.flush();
        }
    }
}
