//! Inbound requests from the host and from shortcuts

use serde::{Deserialize, Serialize};

use sideview_tabs::TabLabel;

const REFRESH_PREFIX: &str = "refresh_";
const CLOSE_PREFIX: &str = "close_";
const CLOSE_OTHERS_PREFIX: &str = "close_others_";

/// A request aimed at one tab, delivered from the tab context menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "label", rename_all = "snake_case")]
pub enum TabEvent {
    Refresh(TabLabel),
    Close(TabLabel),
    /// Close every tab except this one
    CloseOthers(TabLabel),
}

impl TabEvent {
    /// Parse a context-menu item id such as `close_others_tab-3`
    pub fn from_menu_id(id: &str) -> Option<Self> {
        // `close_others_` must be tried before its prefix `close_`
        if let Some(label) = id.strip_prefix(CLOSE_OTHERS_PREFIX) {
            return non_empty(label).map(TabEvent::CloseOthers);
        }
        if let Some(label) = id.strip_prefix(REFRESH_PREFIX) {
            return non_empty(label).map(TabEvent::Refresh);
        }
        if let Some(label) = id.strip_prefix(CLOSE_PREFIX) {
            return non_empty(label).map(TabEvent::Close);
        }
        None
    }

    pub fn menu_id(&self) -> String {
        match self {
            TabEvent::Refresh(label) => format!("{REFRESH_PREFIX}{label}"),
            TabEvent::Close(label) => format!("{CLOSE_PREFIX}{label}"),
            TabEvent::CloseOthers(label) => format!("{CLOSE_OTHERS_PREFIX}{label}"),
        }
    }

    pub fn label(&self) -> &TabLabel {
        match self {
            TabEvent::Refresh(label) | TabEvent::Close(label) | TabEvent::CloseOthers(label) => {
                label
            }
        }
    }
}

fn non_empty(label: &str) -> Option<TabLabel> {
    (!label.is_empty()).then(|| TabLabel::from(label))
}

/// Tab-strip actions bound to shortcuts; they act on the active tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabAction {
    NewTab,
    CloseTab,
    ReopenTab,
    RefreshTab,
    NextTab,
    PrevTab,
    /// Zero-based position in the strip
    SwitchTab(usize),
}

impl TabAction {
    /// Parse an action id (`new_tab`, `switch_tab_3`, ...)
    pub fn from_id(id: &str) -> Option<Self> {
        let action = match id {
            "new_tab" | "global_new_tab" => TabAction::NewTab,
            "close_tab" => TabAction::CloseTab,
            "reopen_tab" => TabAction::ReopenTab,
            "refresh_tab" => TabAction::RefreshTab,
            "next_tab" => TabAction::NextTab,
            "prev_tab" => TabAction::PrevTab,
            other => {
                let n: usize = other.strip_prefix("switch_tab_")?.parse().ok()?;
                if !(1..=9).contains(&n) {
                    return None;
                }
                TabAction::SwitchTab(n - 1)
            }
        };
        Some(action)
    }
}

impl std::str::FromStr for TabAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TabAction::from_id(s).ok_or_else(|| format!("Unknown tab action: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_ids() {
        assert_eq!(
            TabEvent::from_menu_id("refresh_tab-1"),
            Some(TabEvent::Refresh(TabLabel::from("tab-1")))
        );
        assert_eq!(
            TabEvent::from_menu_id("close_tab-2"),
            Some(TabEvent::Close(TabLabel::from("tab-2")))
        );
        assert_eq!(
            TabEvent::from_menu_id("close_others_tab-3"),
            Some(TabEvent::CloseOthers(TabLabel::from("tab-3")))
        );
        assert_eq!(TabEvent::from_menu_id("close_"), None);
        assert_eq!(TabEvent::from_menu_id("settings"), None);
    }

    #[test]
    fn test_menu_id_matches_parser() {
        let event = TabEvent::CloseOthers(TabLabel::from("tab-12"));
        assert_eq!(event.menu_id(), "close_others_tab-12");
        assert_eq!(TabEvent::from_menu_id(&event.menu_id()), Some(event));
    }

    #[test]
    fn test_action_ids() {
        assert_eq!(TabAction::from_id("new_tab"), Some(TabAction::NewTab));
        assert_eq!(TabAction::from_id("prev_tab"), Some(TabAction::PrevTab));
        assert_eq!(TabAction::from_id("switch_tab_1"), Some(TabAction::SwitchTab(0)));
        assert_eq!(TabAction::from_id("switch_tab_9"), Some(TabAction::SwitchTab(8)));
        assert_eq!(TabAction::from_id("switch_tab_0"), None);
        assert_eq!(TabAction::from_id("switch_tab_10"), None);
        assert!("minimize_window".parse::<TabAction>().is_err());
    }
}
