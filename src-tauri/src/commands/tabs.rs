//! Tab management commands
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Manager, State};

use sideview_core::{
    ClosedTabRecord, ContainerBounds, ContainerGeometry, LifecycleManager, Tab, TabAction,
    TabLabel,
};

use super::{notify_tabs_updated, ui_webview_label};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct TabInfo {
    pub label: String,
    pub url: String,
    pub title: String,
    pub is_new_tab: bool,
    pub is_active: bool,
    pub state: String,
}

impl TabInfo {
    fn new(tab: &Tab, manager: &LifecycleManager) -> Self {
        let state = manager.state_of(&tab.label);
        Self {
            label: tab.label.to_string(),
            url: tab.url.clone(),
            title: tab.display_title().to_string(),
            is_new_tab: tab.is_new_tab,
            is_active: manager.active_label().as_ref() == Some(&tab.label),
            state: state.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClosedTabInfo {
    pub label: String,
    pub url: String,
    pub title: String,
    pub original_index: usize,
    pub closed_at: DateTime<Utc>,
}

impl From<ClosedTabRecord> for ClosedTabInfo {
    fn from(record: ClosedTabRecord) -> Self {
        Self {
            title: record.tab.display_title().to_string(),
            label: record.tab.label.to_string(),
            url: record.tab.url,
            original_index: record.original_index,
            closed_at: record.closed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommandResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Manager handle plus the UI webview to notify, detached from `State`
/// so it can be held across awaits
fn lifecycle(app: &AppHandle) -> Option<(LifecycleManager, String)> {
    let state = app.try_state::<AppState>()?;
    Some((
        state.manager().clone(),
        ui_webview_label(state.window_label()),
    ))
}

fn not_ready<T>() -> CommandResult<T> {
    CommandResult::err("AppState not found".to_string())
}

#[tauri::command]
pub async fn open_tab(
    app: AppHandle,
    url: Option<String>,
    title: Option<String>,
    index: Option<usize>,
) -> CommandResult<String> {
    let Some((manager, ui_label)) = lifecycle(&app) else {
        return not_ready();
    };

    let opened = manager
        .open_tab(url.as_deref(), title.as_deref(), index)
        .await;
    notify_tabs_updated(&app, &ui_label);

    match opened {
        Some(label) => CommandResult::ok(label.to_string()),
        None => CommandResult::err(format!(
            "Failed to open tab: {}",
            url.unwrap_or_default()
        )),
    }
}

#[tauri::command]
pub async fn close_tab(app: AppHandle, label: String) -> CommandResult<bool> {
    let Some((manager, ui_label)) = lifecycle(&app) else {
        return not_ready();
    };

    let closed = manager.close_tab(&TabLabel::from(label)).await;
    notify_tabs_updated(&app, &ui_label);
    CommandResult::ok(closed)
}

#[tauri::command]
pub async fn activate_tab(app: AppHandle, label: String) -> CommandResult<()> {
    let Some((manager, ui_label)) = lifecycle(&app) else {
        return not_ready();
    };

    manager.activate_tab(&TabLabel::from(label)).await;
    notify_tabs_updated(&app, &ui_label);
    CommandResult::ok(())
}

#[tauri::command]
pub async fn reopen_last_closed_tab(app: AppHandle) -> CommandResult<Option<String>> {
    let Some((manager, ui_label)) = lifecycle(&app) else {
        return not_ready();
    };

    let reopened = manager.reopen_last_closed_tab().await;
    notify_tabs_updated(&app, &ui_label);
    CommandResult::ok(reopened.map(|label| label.to_string()))
}

#[tauri::command]
pub async fn close_other_tabs(app: AppHandle, label: String) -> CommandResult<()> {
    let Some((manager, ui_label)) = lifecycle(&app) else {
        return not_ready();
    };

    manager.close_other_tabs(&TabLabel::from(label)).await;
    notify_tabs_updated(&app, &ui_label);
    CommandResult::ok(())
}

#[tauri::command]
pub async fn refresh_tab(app: AppHandle, label: String) -> CommandResult<()> {
    let Some((manager, _)) = lifecycle(&app) else {
        return not_ready();
    };

    manager.refresh_tab(&TabLabel::from(label)).await;
    CommandResult::ok(())
}

#[tauri::command]
pub async fn navigate_new_tab(
    app: AppHandle,
    url: String,
    title: Option<String>,
) -> CommandResult<bool> {
    let Some((manager, ui_label)) = lifecycle(&app) else {
        return not_ready();
    };

    let navigated = manager.navigate_new_tab(&url, title.as_deref()).await;
    notify_tabs_updated(&app, &ui_label);
    CommandResult::ok(navigated)
}

#[tauri::command]
pub fn get_tabs(state: State<AppState>) -> CommandResult<Vec<TabInfo>> {
    let manager = state.manager();
    let tabs = manager
        .tabs()
        .iter()
        .map(|tab| TabInfo::new(tab, manager))
        .collect();
    CommandResult::ok(tabs)
}

#[tauri::command]
pub fn get_closed_tabs(state: State<AppState>) -> CommandResult<Vec<ClosedTabInfo>> {
    let closed = state
        .manager()
        .closed_tabs()
        .into_iter()
        .map(ClosedTabInfo::from)
        .collect();
    CommandResult::ok(closed)
}

/// Shortcut actions by id (`new_tab`, `next_tab`, `switch_tab_3`, ...)
#[tauri::command]
pub async fn perform_tab_action(app: AppHandle, action: String) -> CommandResult<()> {
    let action: TabAction = match action.parse() {
        Ok(action) => action,
        Err(e) => return CommandResult::err(e),
    };
    let Some((manager, ui_label)) = lifecycle(&app) else {
        return not_ready();
    };

    manager.perform(action).await;
    notify_tabs_updated(&app, &ui_label);
    CommandResult::ok(())
}

/// Content container bounds in CSS pixels plus the device pixel ratio
#[tauri::command]
pub async fn report_container_geometry(
    app: AppHandle,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    scale_factor: f64,
) -> CommandResult<()> {
    let Some(state) = app.try_state::<AppState>() else {
        return not_ready();
    };

    let geometry = ContainerGeometry::new(
        ContainerBounds {
            left,
            top,
            width,
            height,
        },
        scale_factor,
    );
    state.geometry().report(geometry);
    let manager = state.manager().clone();
    drop(state);

    manager.layout_active().await;
    CommandResult::ok(())
}
