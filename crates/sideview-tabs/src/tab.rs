//! Tab data structure

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::TabError;
use crate::state::TabState;
use crate::Result;

/// Opaque identifier shared by a tab and its surface
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabLabel(String);

impl TabLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TabLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TabLabel {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl From<String> for TabLabel {
    fn from(label: String) -> Self {
        Self(label)
    }
}

/// Hands out `<prefix>-<n>` labels; a label is never handed out twice
#[derive(Debug)]
pub struct LabelAllocator {
    prefix: String,
    next: AtomicU64,
}

impl LabelAllocator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(0),
        }
    }

    pub fn allocate(&self) -> TabLabel {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        TabLabel(format!("{}-{}", self.prefix, n))
    }
}

impl Default for LabelAllocator {
    fn default() -> Self {
        Self::new("tab")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    /// Unique identifier, also names the surface
    pub label: TabLabel,
    /// Display title
    pub title: String,
    /// Destination URL, empty for a placeholder
    pub url: String,
    /// True until the tab is given a destination
    pub is_new_tab: bool,
}

impl Tab {
    /// A landing-page tab with no surface
    pub fn placeholder(label: TabLabel, title: impl Into<String>) -> Self {
        Self {
            label,
            title: title.into(),
            url: String::new(),
            is_new_tab: true,
        }
    }

    /// A tab backed by a surface showing `url`
    pub fn backed(label: TabLabel, url: impl Into<String>, title: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(TabError::InvalidUrl("URL cannot be empty".to_string()));
        }

        let mut tab = Self {
            label,
            title: title.into(),
            url,
            is_new_tab: false,
        };
        if tab.title.is_empty() {
            tab.title = tab.url.clone();
        }
        Ok(tab)
    }

    /// Give a placeholder its destination. Label and position are unchanged.
    pub fn navigate(&mut self, url: impl Into<String>, title: impl Into<String>) -> Result<()> {
        if !self.is_new_tab {
            return Err(TabError::InvalidTransition {
                from: TabState::BackedHidden.to_string(),
                to: TabState::BackedActive.to_string(),
            });
        }

        let url = url.into();
        if url.is_empty() {
            return Err(TabError::InvalidUrl("URL cannot be empty".to_string()));
        }

        let title = title.into();
        self.title = if title.is_empty() { url.clone() } else { title };
        self.url = url;
        self.is_new_tab = false;

        tracing::debug!(
            label = %self.label,
            from = %TabState::NewPlaceholder,
            url = %self.url,
            "Placeholder gained a destination"
        );

        Ok(())
    }

    /// Returns true if the tab owns a surface
    pub fn is_backed(&self) -> bool {
        !self.is_new_tab
    }

    /// Get display title (with fallback to URL)
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_monotonic() {
        let labels = LabelAllocator::default();
        assert_eq!(labels.allocate().as_str(), "tab-0");
        assert_eq!(labels.allocate().as_str(), "tab-1");
        assert_eq!(labels.allocate().as_str(), "tab-2");
    }

    #[test]
    fn test_placeholder() {
        let tab = Tab::placeholder(TabLabel::from("tab-0"), "New Tab");
        assert!(tab.is_new_tab);
        assert!(tab.url.is_empty());
        assert!(!tab.is_backed());
    }

    #[test]
    fn test_backed_title_falls_back_to_url() {
        let tab = Tab::backed(TabLabel::from("tab-1"), "https://example.com", "").unwrap();
        assert_eq!(tab.title, "https://example.com");
        assert!(tab.is_backed());
    }

    #[test]
    fn test_empty_url_rejected() {
        assert!(Tab::backed(TabLabel::from("tab-1"), "", "Empty").is_err());

        let mut tab = Tab::placeholder(TabLabel::from("tab-2"), "New Tab");
        assert!(matches!(tab.navigate("", "x"), Err(TabError::InvalidUrl(_))));
        assert!(tab.is_new_tab);
    }

    #[test]
    fn test_navigate_placeholder() {
        let mut tab = Tab::placeholder(TabLabel::from("tab-3"), "New Tab");
        tab.navigate("https://rust-lang.org", "Rust").unwrap();
        assert!(!tab.is_new_tab);
        assert_eq!(tab.url, "https://rust-lang.org");
        assert_eq!(tab.title, "Rust");
        assert_eq!(tab.label.as_str(), "tab-3");

        // Only placeholders can be navigated
        assert!(matches!(
            tab.navigate("https://example.com", ""),
            Err(TabError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_display_title() {
        let mut tab = Tab::backed(TabLabel::from("tab-4"), "https://example.com", "Example").unwrap();
        assert_eq!(tab.display_title(), "Example");
        tab.title.clear();
        assert_eq!(tab.display_title(), "https://example.com");
    }
}
