//! Tab State Machine
//!
//! ```text
//! NewPlaceholder ──navigate──▶ BackedActive ◀──activate── BackedHidden
//!        │                         │  ▲                       ▲
//!        │                         │  └───────activate────────┤
//!        │                         └──────deactivate──────────┘
//!        └──────────────── close (from any state) ──▶ Closed
//! ```
//!
//! A placeholder never owns a surface. Backed tabs own exactly one surface,
//! shown only while the tab is active.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabState {
    /// No destination yet, shows the landing page, no surface
    NewPlaceholder,
    /// Has a surface that is currently hidden
    BackedHidden,
    /// Has a surface that is shown and focused
    BackedActive,
    /// Removed from the registry, surface destroyed
    Closed,
}

impl TabState {
    /// Derive the state of a live tab
    pub fn of(is_new_tab: bool, is_active: bool) -> Self {
        match (is_new_tab, is_active) {
            (true, _) => TabState::NewPlaceholder,
            (false, true) => TabState::BackedActive,
            (false, false) => TabState::BackedHidden,
        }
    }

    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: TabState) -> bool {
        match (self, target) {
            // Placeholder gains a destination while it is the active tab
            (TabState::NewPlaceholder, TabState::BackedActive) => true,
            // A placeholder may be navigated after losing focus mid-creation
            (TabState::NewPlaceholder, TabState::BackedHidden) => true,
            (TabState::BackedHidden, TabState::BackedActive) => true,
            (TabState::BackedActive, TabState::BackedHidden) => true,
            // Every live state can be closed
            (TabState::NewPlaceholder, TabState::Closed) => true,
            (TabState::BackedHidden, TabState::Closed) => true,
            (TabState::BackedActive, TabState::Closed) => true,
            (a, b) if *a == b => true,
            _ => false,
        }
    }

    /// Returns true if the tab owns a host surface
    pub fn has_surface(&self) -> bool {
        matches!(self, TabState::BackedHidden | TabState::BackedActive)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TabState::NewPlaceholder => "new_placeholder",
            TabState::BackedHidden => "backed_hidden",
            TabState::BackedActive => "backed_active",
            TabState::Closed => "closed",
        }
    }
}

impl std::fmt::Display for TabState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TabState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new_placeholder" => Ok(TabState::NewPlaceholder),
            "backed_hidden" => Ok(TabState::BackedHidden),
            "backed_active" => Ok(TabState::BackedActive),
            "closed" => Ok(TabState::Closed),
            _ => Err(format!("Unknown tab state: {}", s)),
        }
    }
}
