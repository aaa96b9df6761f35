//! Region selection overlay (window management only).
//!
//! The overlay is a full-screen, always-on-top webview that shows a frozen
//! screenshot of the primary monitor. The page draws the drag rectangle and
//! reports the endpoints back through `select_region`.

use crate::capture::{self, CaptureState};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::time::{Duration, Instant};
use tauri::{AppHandle, Manager};

pub const MAIN_WINDOW: &str = "main";
pub const OVERLAY_WINDOW: &str = "overlay";

/// Time for the main window to disappear before the screen is grabbed.
const HIDE_SETTLE: Duration = Duration::from_millis(250);

/// Hides the main window, screenshots the primary monitor and opens the
/// overlay on top of everything.
pub async fn open(app: &AppHandle) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(main) = app.get_webview_window(MAIN_WINDOW) {
        main.hide()?;
    }
    tokio::time::sleep(HIDE_SETTLE).await;

    let start = Instant::now();

    // Step 1: Capture the full screen
    let screenshot = capture::capture_primary_monitor()?;

    let capture_ms = start.elapsed().as_millis();
    log::info!("[OVERLAY] Screen captured in {}ms", capture_ms);

    // Step 2: Encode as base64 PNG for the overlay page
    let mut png_bytes: Vec<u8> = Vec::new();
    screenshot.write_to(
        &mut std::io::Cursor::new(&mut png_bytes),
        image::ImageFormat::Png,
    )?;
    let base64_png = STANDARD.encode(&png_bytes);

    let encode_ms = start.elapsed().as_millis() - capture_ms;
    log::info!(
        "[OVERLAY] PNG encoded in {}ms ({} bytes)",
        encode_ms,
        png_bytes.len()
    );

    // Step 3: Store it until the overlay page asks for it
    let state = app.state::<CaptureState>();
    *state.backdrop.lock().map_err(|e| e.to_string())? = Some(base64_png);

    // Step 4: Create the overlay window
    tauri::WebviewWindowBuilder::new(
        app,
        OVERLAY_WINDOW,
        tauri::WebviewUrl::App("overlay.html".into()),
    )
    .fullscreen(true)
    .decorations(false)
    .always_on_top(true)
    .skip_taskbar(true)
    .focused(true)
    .title("Page Snap: Select Region")
    .build()?;

    log::info!(
        "[OVERLAY] Opened in {}ms total",
        start.elapsed().as_millis()
    );
    Ok(())
}

/// Closes the overlay (if open), drops the backdrop and brings the main
/// window back.
pub fn close(app: &AppHandle) -> Result<(), String> {
    app.state::<CaptureState>().clear_backdrop();

    if let Some(window) = app.get_webview_window(OVERLAY_WINDOW) {
        window.close().map_err(|e| e.to_string())?;
    }
    show_main(app)
}

/// Cleans up after the overlay window is gone, however it was closed.
///
/// An overlay closed by the window manager never reaches `select_region`,
/// and the main window would otherwise stay hidden.
pub fn dismissed(app: &AppHandle) {
    app.state::<CaptureState>().clear_backdrop();
    if let Err(e) = show_main(app) {
        log::warn!("[OVERLAY] Could not restore main window: {}", e);
    }
}

/// Window roles the app reacts to when they close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRole {
    Main,
    Overlay,
    Other,
}

impl WindowRole {
    pub fn of(label: &str) -> Self {
        match label {
            MAIN_WINDOW => WindowRole::Main,
            OVERLAY_WINDOW => WindowRole::Overlay,
            _ => WindowRole::Other,
        }
    }
}

pub fn show_main(app: &AppHandle) -> Result<(), String> {
    if let Some(main) = app.get_webview_window(MAIN_WINDOW) {
        main.show().map_err(|e| e.to_string())?;
        main.set_focus().map_err(|e| e.to_string())?;
    }
    Ok(())
}
