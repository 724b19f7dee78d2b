//! Capture state machine and the scoped guards that unwind it.
//!
//! `Idle -> Capturing -> Idle`. Entering `Capturing` hands out a
//! [`CaptureGuard`]; hiding chrome hands out a [`ChromeGuard`]. Dropping a
//! guard undoes its effect, so every exit path (success, error, panic)
//! returns the UI and the state machine to where they started.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::capture::ui::CaptureUi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    Idle,
    Capturing,
}

/// Single-writer holder of the pipeline's [`CaptureState`].
pub struct CaptureStateCell {
    capturing: AtomicBool,
}

impl CaptureStateCell {
    pub fn new() -> Self {
        Self {
            capturing: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> CaptureState {
        if self.capturing.load(Ordering::Acquire) {
            CaptureState::Capturing
        } else {
            CaptureState::Idle
        }
    }

    /// Move to `Capturing` unless a capture is already running.
    ///
    /// Busy rather than blocking: a second caller gets `None` immediately.
    pub fn try_begin<'a>(&'a self, ui: &'a dyn CaptureUi) -> Option<CaptureGuard<'a>> {
        if self
            .capturing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        ui.set_trigger_busy(true);
        Some(CaptureGuard { cell: self, ui })
    }
}

impl Default for CaptureStateCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Held for the lifetime of one capture. Dropping it re-enables the trigger
/// and returns the state machine to `Idle`.
pub struct CaptureGuard<'a> {
    cell: &'a CaptureStateCell,
    ui: &'a dyn CaptureUi,
}

impl Drop for CaptureGuard<'_> {
    fn drop(&mut self) {
        self.ui.set_trigger_busy(false);
        self.cell.capturing.store(false, Ordering::Release);
    }
}

/// Keeps UI chrome hidden until restored or dropped.
pub struct ChromeGuard<'a> {
    ui: &'a dyn CaptureUi,
    hidden: bool,
}

impl<'a> ChromeGuard<'a> {
    pub fn hide(ui: &'a dyn CaptureUi) -> Self {
        ui.set_chrome_hidden(true);
        Self { ui, hidden: true }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Show chrome again. Idempotent.
    pub fn restore(&mut self) {
        if self.hidden {
            self.ui.set_chrome_hidden(false);
            self.hidden = false;
        }
    }
}

impl Drop for ChromeGuard<'_> {
    fn drop(&mut self) {
        self.restore();
    }
}
