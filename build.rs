//! Build script for Page Snap.
//!
//! Only the Tauri build step is needed: it generates the app context from
//! `tauri.conf.json` and validates the capability files.

fn main() {
    tauri_build::build();
}
