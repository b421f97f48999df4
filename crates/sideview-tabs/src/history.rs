//! Closed-tab history
//!
//! Bounded undo stack for "reopen last closed tab". Most recently closed
//! first; the oldest record falls off once capacity is reached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::tab::Tab;

pub const DEFAULT_CLOSED_TAB_CAPACITY: usize = 10;

/// Snapshot of a tab taken at the moment it was closed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTabRecord {
    #[serde(flatten)]
    pub tab: Tab,
    /// Position in the strip when it was closed
    pub original_index: usize,
    pub closed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ClosedTabHistory {
    records: VecDeque<ClosedTabRecord>,
    capacity: usize,
}

impl ClosedTabHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CLOSED_TAB_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a closed tab to the front, evicting the oldest beyond capacity
    pub fn record(&mut self, tab: Tab, original_index: usize) {
        self.push_front(ClosedTabRecord {
            tab,
            original_index,
            closed_at: Utc::now(),
        });
    }

    /// Put a previously popped record back on top
    pub fn restore(&mut self, record: ClosedTabRecord) {
        self.push_front(record);
    }

    fn push_front(&mut self, record: ClosedTabRecord) {
        self.records.push_front(record);
        self.records.truncate(self.capacity);
    }

    pub fn pop_most_recent(&mut self) -> Option<ClosedTabRecord> {
        self.records.pop_front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClosedTabRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for ClosedTabHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tab::TabLabel;

    fn tab(n: usize) -> Tab {
        Tab::backed(
            TabLabel::new(format!("tab-{n}")),
            format!("https://site-{n}.test"),
            format!("Site {n}"),
        )
        .unwrap()
    }

    #[test]
    fn test_lifo_order() {
        let mut history = ClosedTabHistory::new();
        history.record(tab(1), 0);
        history.record(tab(2), 3);

        let top = history.pop_most_recent().unwrap();
        assert_eq!(top.tab.label.as_str(), "tab-2");
        assert_eq!(top.original_index, 3);
        assert_eq!(history.pop_most_recent().unwrap().tab.label.as_str(), "tab-1");
        assert!(history.pop_most_recent().is_none());
    }

    #[test]
    fn test_bounded_to_capacity() {
        let mut history = ClosedTabHistory::new();
        for n in 0..15 {
            history.record(tab(n), n);
        }

        assert_eq!(history.len(), DEFAULT_CLOSED_TAB_CAPACITY);
        let labels: Vec<String> = history.iter().map(|r| r.tab.label.to_string()).collect();
        let expected: Vec<String> = (5..15).rev().map(|n| format!("tab-{n}")).collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn test_restore_goes_back_on_top() {
        let mut history = ClosedTabHistory::with_capacity(2);
        history.record(tab(1), 0);
        history.record(tab(2), 1);

        let popped = history.pop_most_recent().unwrap();
        history.record(tab(3), 2);
        history.restore(popped);

        assert_eq!(history.iter().next().unwrap().tab.label.as_str(), "tab-2");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_record_serializes_flat() {
        let mut history = ClosedTabHistory::new();
        history.record(tab(7), 4);
        let json = serde_json::to_value(history.iter().next().unwrap()).unwrap();
        assert_eq!(json["label"], "tab-7");
        assert_eq!(json["original_index"], 4);
        assert_eq!(json["is_new_tab"], false);
    }
}
