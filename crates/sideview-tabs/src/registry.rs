//! Tab Registry
//!
//! Ordered tab strip plus the single active pointer. Every primitive here is
//! total: it never fails part-way, and surface bookkeeping lives one layer up.

use crate::state::TabState;
use crate::tab::{Tab, TabLabel};

/// Partial update applied by [`TabRegistry::update_tab`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabPatch {
    pub title: Option<String>,
    pub url: Option<String>,
    pub is_new_tab: Option<bool>,
}

impl TabPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TabRegistry {
    tabs: Vec<Tab>,
    active: Option<TabLabel>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn find(&self, label: &TabLabel) -> Option<&Tab> {
        self.tabs.iter().find(|tab| &tab.label == label)
    }

    pub fn index_of(&self, label: &TabLabel) -> Option<usize> {
        self.tabs.iter().position(|tab| &tab.label == label)
    }

    pub fn contains(&self, label: &TabLabel) -> bool {
        self.index_of(label).is_some()
    }

    pub fn get(&self, index: usize) -> Option<&Tab> {
        self.tabs.get(index)
    }

    pub fn last(&self) -> Option<&Tab> {
        self.tabs.last()
    }

    pub fn active(&self) -> Option<&TabLabel> {
        self.active.as_ref()
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active.as_ref().and_then(|label| self.find(label))
    }

    pub fn is_active(&self, label: &TabLabel) -> bool {
        self.active.as_ref() == Some(label)
    }

    /// Lifecycle state of a tab; labels not in the registry count as closed
    pub fn state_of(&self, label: &TabLabel) -> TabState {
        match self.find(label) {
            Some(tab) => TabState::of(tab.is_new_tab, self.is_active(label)),
            None => TabState::Closed,
        }
    }

    /// Insert a tab at `at`, or at the end when `at` is absent or past the end.
    /// A tab whose label is already present replaces nothing and is dropped.
    /// Returns the index the tab occupies.
    pub fn insert(&mut self, tab: Tab, at: Option<usize>) -> usize {
        if let Some(existing) = self.index_of(&tab.label) {
            tracing::warn!(label = %tab.label, "Ignoring insert of duplicate tab label");
            return existing;
        }

        let index = match at {
            Some(index) if index <= self.tabs.len() => index,
            _ => self.tabs.len(),
        };
        self.tabs.insert(index, tab);
        index
    }

    /// Remove a tab, returning its former index and record.
    /// Clears the active pointer if it named the removed tab.
    pub fn remove(&mut self, label: &TabLabel) -> Option<(usize, Tab)> {
        let index = self.index_of(label)?;
        let tab = self.tabs.remove(index);
        if self.is_active(label) {
            self.active = None;
        }
        Some((index, tab))
    }

    /// Point the active selection at `label` (ignored if the label is unknown)
    pub fn set_active(&mut self, label: Option<TabLabel>) {
        match label {
            Some(label) if !self.contains(&label) => {
                tracing::debug!(label = %label, "Refusing to activate unknown tab");
            }
            label => self.active = label,
        }
    }

    /// Apply a patch in place. Returns false for an unknown label.
    pub fn update_tab(&mut self, label: &TabLabel, patch: TabPatch) -> bool {
        let Some(tab) = self.tabs.iter_mut().find(|tab| &tab.label == label) else {
            return false;
        };

        if let Some(title) = patch.title {
            tab.title = title;
        }
        if let Some(url) = patch.url {
            tab.url = url;
        }
        if let Some(is_new_tab) = patch.is_new_tab {
            tab.is_new_tab = is_new_tab;
        }
        true
    }

    /// Mutable access for in-place transitions such as [`Tab::navigate`]
    pub fn tab_mut(&mut self, label: &TabLabel) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|tab| &tab.label == label)
    }

    /// Collapse the strip to the single tab `keep`, returning the removed tabs
    /// with their indices at the time of removal. The active pointer moves to
    /// `keep`. Unknown `keep` leaves the registry untouched.
    pub fn retain_only(&mut self, keep: &TabLabel) -> Vec<(usize, Tab)> {
        if !self.contains(keep) {
            return Vec::new();
        }

        let removed: Vec<(usize, Tab)> = std::mem::take(&mut self.tabs)
            .into_iter()
            .enumerate()
            .filter_map(|(index, tab)| {
                if &tab.label == keep {
                    self.tabs.push(tab);
                    None
                } else {
                    Some((index, tab))
                }
            })
            .collect();

        self.active = Some(keep.clone());
        removed
    }
}
