//! Application state management
use sideview_core::{Config, LifecycleManager, ReportedGeometry};
use std::sync::Arc;
use tauri::AppHandle;

use crate::host::TauriSurfaceHost;

/// Thread-safe application state wrapper
pub struct AppState {
    manager: LifecycleManager,
    geometry: Arc<ReportedGeometry>,
}

impl AppState {
    pub fn new(app: AppHandle, config: Config) -> Self {
        let host = Arc::new(TauriSurfaceHost::new(app, config.window_label.clone()));
        // Unmounted until the UI reports the container
        let geometry = Arc::new(ReportedGeometry::new());
        let manager = LifecycleManager::new(config, host, geometry.clone());

        Self { manager, geometry }
    }

    pub fn manager(&self) -> &LifecycleManager {
        &self.manager
    }

    pub fn geometry(&self) -> &ReportedGeometry {
        &self.geometry
    }

    pub fn window_label(&self) -> &str {
        &self.manager.config().window_label
    }
}
