//! Tauri command handlers for the main window and the overlay.
//!
//! Commands convert domain errors to `String` at the boundary; the web UI
//! shows them in the status line.

use crate::capture::{CaptureState, Region};
use crate::config::{Settings, UiDefaults};
use crate::overlay;
use crate::session::{self, CancelToken, CaptureEvent, CaptureRequest};
use serde::Serialize;
use std::sync::Mutex;
use std::thread::JoinHandle;
use tauri::{AppHandle, Emitter, Manager};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

/// The running (or last finished) capture worker.
#[derive(Default)]
pub struct SessionSlot {
    active: Mutex<Option<ActiveSession>>,
}

struct ActiveSession {
    cancel: CancelToken,
    worker: JoinHandle<()>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegionSelected {
    region: Region,
    label: String,
}

/// Tauri command: hide the main window and open the selection overlay.
#[tauri::command]
pub async fn begin_region_selection(app: AppHandle) -> Result<(), String> {
    if let Err(e) = overlay::open(&app).await {
        log::error!("[OVERLAY] Failed to open overlay: {}", e);
        overlay::close(&app)?;
        return Err(format!("Could not start region selection: {}", e));
    }
    Ok(())
}

/// Tauri command: the overlay's frozen screenshot as base64 PNG.
#[tauri::command]
pub fn overlay_backdrop(state: tauri::State<'_, CaptureState>) -> Result<String, String> {
    let guard = state.backdrop.lock().map_err(|e| e.to_string())?;
    guard
        .clone()
        .ok_or_else(|| "No screenshot available — start a selection first".to_string())
}

/// Tauri command: normalize the drag gesture and store it as the capture
/// region.
///
/// Called by the overlay when the user releases the mouse. Coordinates are
/// physical screen pixels.
#[tauri::command]
pub fn select_region(
    app: AppHandle,
    state: tauri::State<'_, CaptureState>,
    start_x: i32,
    start_y: i32,
    end_x: i32,
    end_y: i32,
) -> Result<Region, String> {
    let region = Region::from_drag((start_x, start_y), (end_x, end_y));
    *state.region.lock().map_err(|e| e.to_string())? = Some(region);

    log::info!("[OVERLAY] Region selected: {}", region.describe());

    overlay::close(&app)?;
    app.emit_to(
        overlay::MAIN_WINDOW,
        "region-selected",
        RegionSelected {
            region,
            label: region.describe(),
        },
    )
    .map_err(|e| e.to_string())?;

    Ok(region)
}

/// Tauri command: abandon the selection and return to the main window.
#[tauri::command]
pub fn cancel_region_selection(app: AppHandle) -> Result<(), String> {
    log::info!("[OVERLAY] Selection cancelled");
    overlay::close(&app)
}

/// Tauri command: start capturing `pages` pages of the selected region.
#[tauri::command]
pub fn start_capture(
    app: AppHandle,
    capture: tauri::State<'_, CaptureState>,
    sessions: tauri::State<'_, SessionSlot>,
    settings: tauri::State<'_, Settings>,
    pages: u32,
    slow_loading: bool,
) -> Result<(), String> {
    let selected = *capture.region.lock().map_err(|e| e.to_string())?;
    let region = selected.ok_or("No capture region selected — select one first")?;

    let request = CaptureRequest {
        region,
        pages,
        slow_loading,
    };
    request.validate().map_err(|e| e.to_string())?;

    let mut slot = sessions.active.lock().map_err(|e| e.to_string())?;
    if slot.as_ref().is_some_and(|s| !s.worker.is_finished()) {
        return Err("A capture is already running".to_string());
    }

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let cancel = CancelToken::new();
    let worker = session::spawn_worker(request, settings.inner().clone(), cancel.clone(), tx)
        .map_err(|e| format!("Failed to start capture worker: {}", e))?;
    *slot = Some(ActiveSession { cancel, worker });

    let relay = app.clone();
    tauri::async_runtime::spawn(session::forward_events(rx, move |event| {
        deliver_event(&relay, event)
    }));

    Ok(())
}

/// Tauri command: ask the running capture to stop after the current page.
///
/// Returns whether a running capture was signalled.
#[tauri::command]
pub fn cancel_capture(sessions: tauri::State<'_, SessionSlot>) -> Result<bool, String> {
    let slot = sessions.active.lock().map_err(|e| e.to_string())?;
    match slot.as_ref() {
        Some(active) if !active.worker.is_finished() => {
            log::info!("[SESSION] Cancel requested");
            active.cancel.cancel();
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Tauri command: limits and defaults for the main window's controls.
#[tauri::command]
pub fn app_defaults(settings: tauri::State<'_, Settings>) -> UiDefaults {
    settings.ui_defaults()
}

/// Cancels a running capture and waits for the worker to wind down.
///
/// Used when the main window closes.
pub fn shutdown_session(app: &AppHandle) {
    let sessions = app.state::<SessionSlot>();
    let active = match sessions.active.lock() {
        Ok(mut slot) => slot.take(),
        Err(_) => None,
    };

    if let Some(active) = active {
        if !active.worker.is_finished() {
            log::info!("[SESSION] Window closing — stopping capture");
        }
        active.cancel.cancel();
        if active.worker.join().is_err() {
            log::error!("[SESSION] Capture worker panicked");
        }
    }
}

fn deliver_event(app: &AppHandle, event: &CaptureEvent) {
    if let Err(e) = app.emit_to(overlay::MAIN_WINDOW, "capture-event", event) {
        log::warn!("[SESSION] Failed to forward event: {}", e);
    }

    if let CaptureEvent::Failed { message } = event {
        app.dialog()
            .message(message.clone())
            .kind(MessageDialogKind::Error)
            .title("Capture failed")
            .show(|_| {});
    }
}
