//! Container geometry
//!
//! The content container's bounds are reported in device-independent pixels
//! together with the device pixel ratio. Hosts position surfaces in logical
//! coordinates, so bounds are snapped to whole physical pixels and scaled back.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Snapshot of the container at the moment it was read
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerGeometry {
    pub bounds: ContainerBounds,
    pub scale_factor: f64,
}

/// Rectangle in device pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Rectangle in logical (unscaled) coordinates, as the host expects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogicalRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ContainerGeometry {
    pub fn new(bounds: ContainerBounds, scale_factor: f64) -> Self {
        Self {
            bounds,
            scale_factor,
        }
    }

    /// Scale factor with a fallback of 1 for missing or nonsensical ratios
    pub fn effective_scale(&self) -> f64 {
        if self.scale_factor.is_finite() && self.scale_factor > 0.0 {
            self.scale_factor
        } else {
            1.0
        }
    }

    pub fn physical_rect(&self) -> PhysicalRect {
        let scale = self.effective_scale();
        PhysicalRect {
            x: (self.bounds.left * scale).round(),
            y: (self.bounds.top * scale).round(),
            width: (self.bounds.width * scale).round(),
            height: (self.bounds.height * scale).round(),
        }
    }

    pub fn logical_rect(&self) -> LogicalRect {
        let scale = self.effective_scale();
        let physical = self.physical_rect();
        LogicalRect {
            x: physical.x / scale,
            y: physical.y / scale,
            width: physical.width / scale,
            height: physical.height / scale,
        }
    }
}

/// Source of the container's current geometry.
///
/// Read on demand and never cached by callers: the container can move
/// between two suspension points of the same operation.
#[async_trait]
pub trait GeometryProvider: Send + Sync {
    /// `None` while the container is not mounted
    async fn current_geometry(&self) -> Option<ContainerGeometry>;
}

/// Geometry pushed by whoever observes the container (window resize
/// events, resize observers) and read back by the layout engine.
#[derive(Debug, Default)]
pub struct ReportedGeometry {
    latest: RwLock<Option<ContainerGeometry>>,
}

impl ReportedGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mounted(geometry: ContainerGeometry) -> Self {
        Self {
            latest: RwLock::new(Some(geometry)),
        }
    }

    pub fn report(&self, geometry: ContainerGeometry) {
        *self.latest.write() = Some(geometry);
    }

    /// Container went away (unmounted)
    pub fn clear(&self) {
        *self.latest.write() = None;
    }

    pub fn latest(&self) -> Option<ContainerGeometry> {
        *self.latest.read()
    }
}

#[async_trait]
impl GeometryProvider for ReportedGeometry {
    async fn current_geometry(&self) -> Option<ContainerGeometry> {
        self.latest()
    }
}
