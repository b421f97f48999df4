//! Tauri IPC Commands
//!
//! These commands bridge the tab strip UI to the lifecycle manager.
//! The manager owns all tab state; the UI re-reads it on `tabs-updated`.

pub mod menu;
pub mod tabs;

use tauri::{AppHandle, Emitter};

pub const TABS_UPDATED: &str = "tabs-updated";

pub fn ui_webview_label(window_label: &str) -> String {
    format!("ui-{window_label}")
}

/// Tell the tab strip to re-read the registry
pub fn notify_tabs_updated(app: &AppHandle, ui_label: &str) {
    if let Err(e) = app.emit_to(ui_label, TABS_UPDATED, ()) {
        tracing::warn!(ui_label = %ui_label, error = %e, "Failed to emit tabs-updated");
    }
}
