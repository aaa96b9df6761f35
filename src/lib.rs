//! Page Snap — Tauri application entry point.
//!
//! This is the app shell that wires together:
//! - Region selection overlay (overlay.rs, capture/)
//! - The background capture loop (session/)
//! - Tauri command handlers for frontend communication (commands.rs)

pub mod capture;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod input;
pub mod overlay;
pub mod session;

use capture::CaptureState;
use commands::SessionSlot;
use config::Settings;
use tauri::Manager;

/// Entry point — called by `main`.
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let dotenv = dotenvy::dotenv();
    env_logger::init();
    if let Ok(path) = dotenv {
        log::info!("[CONFIG] Loaded {}", path.display());
    }

    let settings = Settings::from_env();
    log::info!(
        "[CONFIG] Output: {}, page-advance key: {:?}",
        settings.output_path().display(),
        settings.advance_key
    );

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(CaptureState::new())
        .manage(SessionSlot::default())
        .manage(settings)
        .invoke_handler(tauri::generate_handler![
            commands::begin_region_selection,
            commands::overlay_backdrop,
            commands::select_region,
            commands::cancel_region_selection,
            commands::start_capture,
            commands::cancel_capture,
            commands::app_defaults,
        ])
        .on_window_event(|window, event| {
            match (overlay::WindowRole::of(window.label()), event) {
                (overlay::WindowRole::Main, tauri::WindowEvent::CloseRequested { .. }) => {
                    commands::shutdown_session(window.app_handle());
                }
                (overlay::WindowRole::Overlay, tauri::WindowEvent::Destroyed) => {
                    log::debug!("[OVERLAY] Overlay window destroyed");
                    overlay::dismissed(window.app_handle());
                }
                _ => {}
            }
        })
        .setup(|_app| {
            log::info!("Page Snap starting up");
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("Error running Page Snap");
}
