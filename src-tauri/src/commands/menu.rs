//! Tab context menu
use tauri::menu::{MenuBuilder, MenuEvent, MenuItemBuilder};
use tauri::{AppHandle, Manager, Window};

use sideview_core::{TabEvent, TabLabel};

use super::notify_tabs_updated;
use super::tabs::CommandResult;
use super::ui_webview_label;
use crate::state::AppState;

#[tauri::command]
pub async fn show_tab_context_menu(
    app: AppHandle,
    window: Window,
    label: String,
    total_tabs: usize,
) -> CommandResult<()> {
    let label = TabLabel::from(label);
    let refresh = TabEvent::Refresh(label.clone());
    let close = TabEvent::Close(label.clone());
    let close_others = TabEvent::CloseOthers(label);

    let menu = MenuItemBuilder::new("Refresh")
        .id(refresh.menu_id())
        .build(&app)
        .and_then(|refresh_item| {
            let close_item = MenuItemBuilder::new("Close")
                .id(close.menu_id())
                .build(&app)?;
            let close_others_item = MenuItemBuilder::new("Close Others")
                .id(close_others.menu_id())
                .enabled(total_tabs > 1)
                .build(&app)?;

            MenuBuilder::new(&app)
                .item(&refresh_item)
                .separator()
                .item(&close_item)
                .item(&close_others_item)
                .build()
        });

    let menu = match menu {
        Ok(menu) => menu,
        Err(e) => return CommandResult::err(format!("Failed to create menu: {}", e)),
    };

    match window.popup_menu(&menu) {
        Ok(()) => CommandResult::ok(()),
        Err(e) => CommandResult::err(format!("Failed to show context menu: {}", e)),
    }
}

/// Route context-menu clicks to the lifecycle manager
pub fn handle_menu_event(app: &AppHandle, event: MenuEvent) {
    let id = event.id().as_ref();
    let Some(tab_event) = TabEvent::from_menu_id(id) else {
        tracing::debug!(menu_id = %id, "Ignoring menu event");
        return;
    };
    let Some(state) = app.try_state::<AppState>() else {
        return;
    };

    let manager = state.manager().clone();
    let ui_label = ui_webview_label(state.window_label());
    let app = app.clone();

    tauri::async_runtime::spawn(async move {
        manager.dispatch(tab_event).await;
        notify_tabs_updated(&app, &ui_label);
    });
}
