//! Per-label operation sequencing
//!
//! Each visibility side effect takes a ticket at the instant the registry is
//! mutated. After a suspension point the continuation checks its ticket is
//! still the newest for that label; if a later operation has claimed the
//! label in the meantime the stale show/hide is dropped.

use parking_lot::Mutex;
use std::collections::HashMap;

use sideview_tabs::TabLabel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpTicket {
    label: TabLabel,
    seq: u64,
}

impl OpTicket {
    pub fn label(&self) -> &TabLabel {
        &self.label
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Default)]
pub struct SurfaceSequencer {
    inner: Mutex<SequencerState>,
}

#[derive(Debug, Default)]
struct SequencerState {
    // Shared across labels so a ticket can never collide with a later one
    next: u64,
    latest: HashMap<TabLabel, u64>,
}

impl SurfaceSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `label`, superseding every ticket issued for it before
    pub fn issue(&self, label: &TabLabel) -> OpTicket {
        let mut state = self.inner.lock();
        state.next += 1;
        let seq = state.next;
        state.latest.insert(label.clone(), seq);
        OpTicket {
            label: label.clone(),
            seq,
        }
    }

    pub fn is_current(&self, ticket: &OpTicket) -> bool {
        self.inner.lock().latest.get(&ticket.label) == Some(&ticket.seq)
    }

    /// Drop a label whose surface is going away; its outstanding tickets go stale
    pub fn forget(&self, label: &TabLabel) {
        self.inner.lock().latest.remove(label);
    }
}
