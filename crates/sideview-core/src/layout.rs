//! Layout engine
//!
//! Turns the container's current geometry into the logical rectangle a
//! surface should occupy and pushes it to the host. Triggered on window
//! resize, container resize, and right after a tab is activated.

use std::sync::Arc;

use sideview_tabs::TabLabel;

use crate::geometry::{GeometryProvider, LogicalRect};
use crate::surface::{SurfaceError, SurfaceHost};

#[derive(Clone)]
pub struct LayoutEngine {
    geometry: Arc<dyn GeometryProvider>,
    host: Arc<dyn SurfaceHost>,
}

impl LayoutEngine {
    pub fn new(geometry: Arc<dyn GeometryProvider>, host: Arc<dyn SurfaceHost>) -> Self {
        Self { geometry, host }
    }

    /// Logical rect for the container right now, `None` if it is not mounted
    pub async fn current_rect(&self) -> Option<LogicalRect> {
        self.geometry
            .current_geometry()
            .await
            .map(|geometry| geometry.logical_rect())
    }

    /// Resize `label`'s surface to the container.
    ///
    /// Returns `Ok(false)` without touching the host when the container is
    /// not mounted. Repeating the call with unchanged geometry repeats the
    /// same resize.
    pub async fn layout(&self, label: &TabLabel) -> Result<bool, SurfaceError> {
        let Some(rect) = self.current_rect().await else {
            tracing::debug!(label = %label, "Container not mounted, skipping layout");
            return Ok(false);
        };

        self.host.resize_surface(label, rect).await?;
        tracing::trace!(
            label = %label,
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            "Laid out surface"
        );
        Ok(true)
    }
}
