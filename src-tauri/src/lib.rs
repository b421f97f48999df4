//! SideView Browser - Tauri Application
//!
//! The tab strip UI lives in one webview; every URL-backed tab is a child
//! webview of the same window, driven by the lifecycle manager.

mod commands;
mod host;
mod state;

use sideview_core::Config;
use state::AppState;
use tauri::webview::WebviewBuilder;
use tauri::window::WindowBuilder;
use tauri::{LogicalPosition, LogicalSize, Manager, WebviewUrl};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging
    sideview_core::init_logging();

    let config = Config::load_or_default(&Config::config_path());

    tauri::Builder::default()
        .setup(move |app| {
            let window_label = config.window_label.clone();

            let window = WindowBuilder::new(app, &window_label)
                .title("SideView")
                .inner_size(1280.0, 800.0)
                .min_inner_size(800.0, 600.0)
                .center()
                .build()?;

            let ui_label = commands::ui_webview_label(&window_label);
            let ui_webview = WebviewBuilder::new(&ui_label, WebviewUrl::App("index.html".into()))
                .auto_resize()
                .enable_clipboard_access();

            let ui_webview = window.add_child(
                ui_webview,
                LogicalPosition::new(0.0, 0.0),
                LogicalSize::new(1280.0, 800.0),
            )?;
            let _ = ui_webview.show();

            // Store state in Tauri
            let state = AppState::new(app.handle().clone(), config.clone());
            let manager = state.manager().clone();
            app.manage(state);

            let handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                if manager.ensure_initial_tab().await.is_some() {
                    commands::notify_tabs_updated(&handle, &ui_label);
                }
            });

            tracing::info!(window_label = %window_label, "SideView started");

            Ok(())
        })
        .on_menu_event(commands::menu::handle_menu_event)
        .invoke_handler(tauri::generate_handler![
            // Tab commands
            commands::tabs::open_tab,
            commands::tabs::close_tab,
            commands::tabs::activate_tab,
            commands::tabs::reopen_last_closed_tab,
            commands::tabs::close_other_tabs,
            commands::tabs::refresh_tab,
            commands::tabs::navigate_new_tab,
            commands::tabs::get_tabs,
            commands::tabs::get_closed_tabs,
            commands::tabs::perform_tab_action,
            // Layout
            commands::tabs::report_container_geometry,
            // Context menu
            commands::menu::show_tab_context_menu,
        ])
        .run(tauri::generate_context!())
        .expect("error while running SideView browser");
}
