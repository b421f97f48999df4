//! Surface boundary
//!
//! The host-side operations on embedded content surfaces. Every call is keyed
//! by the owning tab's label and may fail; show, hide, resize and destroy must
//! tolerate repeats and absent surfaces.

use async_trait::async_trait;
use thiserror::Error;

use sideview_tabs::TabLabel;

use crate::geometry::LogicalRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceOp {
    Create,
    Show,
    Hide,
    Resize,
    Destroy,
    Reload,
}

impl SurfaceOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceOp::Create => "create",
            SurfaceOp::Show => "show",
            SurfaceOp::Hide => "hide",
            SurfaceOp::Resize => "resize",
            SurfaceOp::Destroy => "destroy",
            SurfaceOp::Reload => "reload",
        }
    }
}

impl std::fmt::Display for SurfaceOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("Surface already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid surface geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Host failed to {op} surface {label}: {message}")]
    Host {
        op: SurfaceOp,
        label: String,
        message: String,
    },
}

impl SurfaceError {
    pub fn host(op: SurfaceOp, label: &TabLabel, message: impl Into<String>) -> Self {
        SurfaceError::Host {
            op,
            label: label.to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait SurfaceHost: Send + Sync {
    /// Create a surface at `rect`. Fails if `label` already has one.
    async fn create_surface(
        &self,
        label: &TabLabel,
        url: &str,
        rect: LogicalRect,
    ) -> Result<(), SurfaceError>;

    async fn show_surface(&self, label: &TabLabel) -> Result<(), SurfaceError>;

    async fn hide_surface(&self, label: &TabLabel) -> Result<(), SurfaceError>;

    async fn resize_surface(&self, label: &TabLabel, rect: LogicalRect)
        -> Result<(), SurfaceError>;

    /// Tear a surface down permanently. No-op if absent.
    async fn destroy_surface(&self, label: &TabLabel) -> Result<(), SurfaceError>;

    async fn reload_surface(&self, label: &TabLabel) -> Result<(), SurfaceError>;
}
