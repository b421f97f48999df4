//! Webview-backed surface host
//!
//! Each URL-backed tab is a child webview of the main window, labelled with
//! the tab label. Webviews are created hidden and only shown on request.

use async_trait::async_trait;
use tauri::webview::{PageLoadEvent, WebviewBuilder};
use tauri::{AppHandle, LogicalPosition, LogicalSize, Manager, Webview, WebviewUrl};

use sideview_core::{LogicalRect, SurfaceError, SurfaceHost, SurfaceOp, TabLabel};

use crate::commands;
use crate::state::AppState;

pub struct TauriSurfaceHost {
    app: AppHandle,
    window_label: String,
}

impl TauriSurfaceHost {
    pub fn new(app: AppHandle, window_label: impl Into<String>) -> Self {
        Self {
            app,
            window_label: window_label.into(),
        }
    }

    fn webview(&self, label: &TabLabel) -> Option<Webview> {
        self.app.get_webview(label.as_str())
    }

    /// Run `f` on the label's webview; absent webviews are a no-op
    fn with_webview<F>(&self, op: SurfaceOp, label: &TabLabel, f: F) -> Result<(), SurfaceError>
    where
        F: FnOnce(&Webview) -> tauri::Result<()>,
    {
        let Some(webview) = self.webview(label) else {
            tracing::debug!(label = %label, op = %op, "No webview for surface");
            return Ok(());
        };

        f(&webview).map_err(|e| SurfaceError::host(op, label, e.to_string()))
    }
}

#[async_trait]
impl SurfaceHost for TauriSurfaceHost {
    async fn create_surface(
        &self,
        label: &TabLabel,
        url: &str,
        rect: LogicalRect,
    ) -> Result<(), SurfaceError> {
        if self.webview(label).is_some() {
            return Err(SurfaceError::AlreadyExists(label.to_string()));
        }
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return Err(SurfaceError::InvalidGeometry(format!(
                "{}x{}",
                rect.width, rect.height
            )));
        }

        let parsed: url::Url = url
            .parse()
            .map_err(|_| SurfaceError::InvalidUrl(url.to_string()))?;

        let window = self.app.get_window(&self.window_label).ok_or_else(|| {
            SurfaceError::host(
                SurfaceOp::Create,
                label,
                format!("window not found: {}", self.window_label),
            )
        })?;

        let ui_label = commands::ui_webview_label(&self.window_label);
        let app_for_load = self.app.clone();
        let ui_label_for_load = ui_label.clone();
        let app_for_title = self.app.clone();
        let label_for_title = label.clone();

        let builder = WebviewBuilder::new(label.as_str(), WebviewUrl::External(parsed))
            .transparent(false)
            .enable_clipboard_access()
            .on_page_load(move |_webview, payload| {
                if matches!(payload.event(), PageLoadEvent::Finished) {
                    commands::notify_tabs_updated(&app_for_load, &ui_label_for_load);
                }
            })
            .on_document_title_changed(move |_webview, title| {
                if let Some(state) = app_for_title.try_state::<AppState>() {
                    state.manager().set_tab_title(&label_for_title, title);
                }
                commands::notify_tabs_updated(&app_for_title, &ui_label);
            });

        let webview = window
            .add_child(
                builder,
                LogicalPosition::new(rect.x, rect.y),
                LogicalSize::new(rect.width, rect.height),
            )
            .map_err(|e| SurfaceError::host(SurfaceOp::Create, label, e.to_string()))?;

        // Start hidden
        if let Err(e) = webview.hide() {
            tracing::warn!(label = %label, error = %e, "Failed to hide new webview");
        }

        tracing::info!(label = %label, url = %url, "Created child webview");
        Ok(())
    }

    async fn show_surface(&self, label: &TabLabel) -> Result<(), SurfaceError> {
        self.with_webview(SurfaceOp::Show, label, |webview| webview.show())
    }

    async fn hide_surface(&self, label: &TabLabel) -> Result<(), SurfaceError> {
        self.with_webview(SurfaceOp::Hide, label, |webview| webview.hide())
    }

    async fn resize_surface(
        &self,
        label: &TabLabel,
        rect: LogicalRect,
    ) -> Result<(), SurfaceError> {
        // Position is relative to the parent window
        self.with_webview(SurfaceOp::Resize, label, |webview| {
            webview.set_position(LogicalPosition::new(rect.x, rect.y))?;
            webview.set_size(LogicalSize::new(rect.width, rect.height))
        })
    }

    async fn destroy_surface(&self, label: &TabLabel) -> Result<(), SurfaceError> {
        self.with_webview(SurfaceOp::Destroy, label, |webview| webview.close())?;
        tracing::info!(label = %label, "Closed child webview");
        Ok(())
    }

    async fn reload_surface(&self, label: &TabLabel) -> Result<(), SurfaceError> {
        self.with_webview(SurfaceOp::Reload, label, |webview| webview.reload())
    }
}
