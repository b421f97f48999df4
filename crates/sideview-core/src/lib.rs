//! SideView Core
//!
//! Tab and surface lifecycle for the SideView browser window.
//! The registry owns tab state; surfaces are views the host creates on request.

mod config;
mod error;
mod events;
mod geometry;
mod layout;
mod lifecycle;
mod sequencer;
mod surface;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::Config;
pub use error::CoreError;
pub use events::{TabAction, TabEvent};
pub use geometry::{
    ContainerBounds, ContainerGeometry, GeometryProvider, LogicalRect, PhysicalRect,
    ReportedGeometry,
};
pub use layout::LayoutEngine;
pub use lifecycle::LifecycleManager;
pub use sequencer::{OpTicket, SurfaceSequencer};
pub use surface::{SurfaceError, SurfaceHost, SurfaceOp};

// Re-export tab model
pub use sideview_tabs::{
    ClosedTabHistory, ClosedTabRecord, LabelAllocator, Tab, TabError, TabLabel, TabPatch,
    TabRegistry, TabState,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A second call (tests, re-entry) keeps the first subscriber
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
