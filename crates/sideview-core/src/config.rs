//! Lifecycle configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use sideview_tabs::DEFAULT_CLOSED_TAB_CAPACITY;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Label of the window hosting the surfaces
    pub window_label: String,
    /// Prefix for generated tab labels
    pub label_prefix: String,
    /// Title given to new-tab placeholders
    pub new_tab_title: String,
    /// How many closed tabs can be reopened, between 1 and 10
    pub closed_tab_capacity: usize,
    /// Open a placeholder when the window starts with no tabs
    pub start_with_new_tab: bool,
}

impl Config {
    /// Parse a (possibly partial) JSON document over the defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config");
                Self::default()
            }
        }
    }

    /// Closed-tab history bound, clamped to `1..=DEFAULT_CLOSED_TAB_CAPACITY`
    pub fn history_capacity(&self) -> usize {
        let capacity = self
            .closed_tab_capacity
            .clamp(1, DEFAULT_CLOSED_TAB_CAPACITY);
        if capacity != self.closed_tab_capacity {
            tracing::warn!(
                configured = self.closed_tab_capacity,
                capacity,
                "Closed tab capacity out of range"
            );
        }
        capacity
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("SideView"))
            .unwrap_or_else(|| PathBuf::from(".sideview"))
            .join("config.json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_label: "main".to_string(),
            label_prefix: "tab".to_string(),
            new_tab_title: "New Tab".to_string(),
            closed_tab_capacity: DEFAULT_CLOSED_TAB_CAPACITY,
            start_with_new_tab: true,
        }
    }
}
