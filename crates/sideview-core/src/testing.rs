//! Test doubles for the host seams.
//!
//! `RecordingHost` keeps an in-memory model of which surfaces exist and which
//! are visible, logs every call in issue order, and can be told to fail or to
//! suspend a specific call until the test releases it.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::oneshot;

use sideview_tabs::TabLabel;

use crate::config::Config;
use crate::geometry::{ContainerBounds, ContainerGeometry, LogicalRect, ReportedGeometry};
use crate::lifecycle::LifecycleManager;
use crate::surface::{SurfaceError, SurfaceHost, SurfaceOp};

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Create {
        label: TabLabel,
        url: String,
        rect: LogicalRect,
    },
    Show(TabLabel),
    Hide(TabLabel),
    Resize {
        label: TabLabel,
        rect: LogicalRect,
    },
    Destroy(TabLabel),
    Reload(TabLabel),
}

impl SurfaceCall {
    pub fn label(&self) -> &TabLabel {
        match self {
            SurfaceCall::Create { label, .. }
            | SurfaceCall::Resize { label, .. }
            | SurfaceCall::Show(label)
            | SurfaceCall::Hide(label)
            | SurfaceCall::Destroy(label)
            | SurfaceCall::Reload(label) => label,
        }
    }

    pub fn op(&self) -> SurfaceOp {
        match self {
            SurfaceCall::Create { .. } => SurfaceOp::Create,
            SurfaceCall::Show(_) => SurfaceOp::Show,
            SurfaceCall::Hide(_) => SurfaceOp::Hide,
            SurfaceCall::Resize { .. } => SurfaceOp::Resize,
            SurfaceCall::Destroy(_) => SurfaceOp::Destroy,
            SurfaceCall::Reload(_) => SurfaceOp::Reload,
        }
    }
}

/// Test side of a suspended host call
pub struct GateHandle {
    /// Resolves once the host call has been entered
    pub reached: oneshot::Receiver<()>,
    /// Send (or drop) to let the host call complete
    pub release: oneshot::Sender<()>,
}

struct Gate {
    reached: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

#[derive(Default)]
struct HostState {
    calls: Vec<SurfaceCall>,
    /// label -> visible
    surfaces: HashMap<TabLabel, bool>,
    failures: HashSet<(SurfaceOp, TabLabel)>,
    fail_all: HashSet<SurfaceOp>,
    gates: HashMap<(SurfaceOp, TabLabel), Gate>,
}

#[derive(Default)]
pub struct RecordingHost {
    state: Mutex<HostState>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `op` on `label` fail
    pub fn fail(&self, op: SurfaceOp, label: &TabLabel) {
        self.state.lock().failures.insert((op, label.clone()));
    }

    /// Make `op` fail for every label
    pub fn fail_every(&self, op: SurfaceOp) {
        self.state.lock().fail_all.insert(op);
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock();
        state.failures.clear();
        state.fail_all.clear();
    }

    /// Suspend the next `op` on `label` until the returned handle releases it
    pub fn gate(&self, op: SurfaceOp, label: &TabLabel) -> GateHandle {
        let (reached_tx, reached_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.state.lock().gates.insert(
            (op, label.clone()),
            Gate {
                reached: reached_tx,
                release: release_rx,
            },
        );
        GateHandle {
            reached: reached_rx,
            release: release_tx,
        }
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.state.lock().calls.clone()
    }

    pub fn calls_for(&self, label: &TabLabel) -> Vec<SurfaceCall> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.label() == label)
            .cloned()
            .collect()
    }

    pub fn count(&self, op: SurfaceOp, label: &TabLabel) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.op() == op && call.label() == label)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn has_surface(&self, label: &TabLabel) -> bool {
        self.state.lock().surfaces.contains_key(label)
    }

    /// Labels whose surface is currently visible, sorted
    pub fn shown(&self) -> Vec<TabLabel> {
        let mut shown: Vec<TabLabel> = self
            .state
            .lock()
            .surfaces
            .iter()
            .filter(|(_, visible)| **visible)
            .map(|(label, _)| label.clone())
            .collect();
        shown.sort();
        shown
    }

    pub fn surface_count(&self) -> usize {
        self.state.lock().surfaces.len()
    }

    /// Record the call, then wait on a gate if one is armed for it
    async fn enter(&self, call: SurfaceCall) -> Result<(), SurfaceError> {
        let op = call.op();
        let label = call.label().clone();

        let (gate, failing) = {
            let mut state = self.state.lock();
            state.calls.push(call);
            let gate = state.gates.remove(&(op, label.clone()));
            let failing =
                state.fail_all.contains(&op) || state.failures.contains(&(op, label.clone()));
            (gate, failing)
        };

        if let Some(gate) = gate {
            let _ = gate.reached.send(());
            let _ = gate.release.await;
        }

        if failing {
            return Err(SurfaceError::host(op, &label, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl SurfaceHost for RecordingHost {
    async fn create_surface(
        &self,
        label: &TabLabel,
        url: &str,
        rect: LogicalRect,
    ) -> Result<(), SurfaceError> {
        self.enter(SurfaceCall::Create {
            label: label.clone(),
            url: url.to_string(),
            rect,
        })
        .await?;

        if rect.width <= 0.0 || rect.height <= 0.0 {
            return Err(SurfaceError::InvalidGeometry(format!(
                "{}x{}",
                rect.width, rect.height
            )));
        }

        let mut state = self.state.lock();
        if state.surfaces.contains_key(label) {
            return Err(SurfaceError::AlreadyExists(label.to_string()));
        }
        state.surfaces.insert(label.clone(), false);
        Ok(())
    }

    async fn show_surface(&self, label: &TabLabel) -> Result<(), SurfaceError> {
        self.enter(SurfaceCall::Show(label.clone())).await?;
        if let Some(visible) = self.state.lock().surfaces.get_mut(label) {
            *visible = true;
        }
        Ok(())
    }

    async fn hide_surface(&self, label: &TabLabel) -> Result<(), SurfaceError> {
        self.enter(SurfaceCall::Hide(label.clone())).await?;
        if let Some(visible) = self.state.lock().surfaces.get_mut(label) {
            *visible = false;
        }
        Ok(())
    }

    async fn resize_surface(
        &self,
        label: &TabLabel,
        rect: LogicalRect,
    ) -> Result<(), SurfaceError> {
        self.enter(SurfaceCall::Resize {
            label: label.clone(),
            rect,
        })
        .await
    }

    async fn destroy_surface(&self, label: &TabLabel) -> Result<(), SurfaceError> {
        self.enter(SurfaceCall::Destroy(label.clone())).await?;
        self.state.lock().surfaces.remove(label);
        Ok(())
    }

    async fn reload_surface(&self, label: &TabLabel) -> Result<(), SurfaceError> {
        self.enter(SurfaceCall::Reload(label.clone())).await
    }
}

/// 800x600 container at (10, 20) on a 2x display
pub fn sample_geometry() -> ContainerGeometry {
    ContainerGeometry::new(
        ContainerBounds {
            left: 10.0,
            top: 20.0,
            width: 800.0,
            height: 600.0,
        },
        2.0,
    )
}

/// A manager wired to a fresh recording host and a mounted container
pub fn harness() -> (LifecycleManager, Arc<RecordingHost>, Arc<ReportedGeometry>) {
    harness_with(Config::default())
}

pub fn harness_with(
    config: Config,
) -> (LifecycleManager, Arc<RecordingHost>, Arc<ReportedGeometry>) {
    let host = Arc::new(RecordingHost::new());
    let geometry = Arc::new(ReportedGeometry::mounted(sample_geometry()));
    let manager = LifecycleManager::new(config, host.clone(), geometry.clone());
    (manager, host, geometry)
}
