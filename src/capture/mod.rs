//! Screen capture domain — public API.
//!
//! This module owns region selection and screen grabbing.
//! External code should only use the items exported here.

mod region;
mod screenshot;

pub use region::{crop_to_region, CropError, Region};
pub use screenshot::{capture_primary_monitor, CaptureError, MonitorGrabber, ScreenGrabber};

use std::sync::Mutex;

/// Thread-safe storage for an in-progress region selection.
///
/// Holds the overlay backdrop between opening the overlay and the overlay
/// page asking for it, and the last region the user confirmed.
pub struct CaptureState {
    pub backdrop: Mutex<Option<String>>,
    pub region: Mutex<Option<Region>>,
}

impl CaptureState {
    pub fn new() -> Self {
        Self {
            backdrop: Mutex::new(None),
            region: Mutex::new(None),
        }
    }

    /// Drops the overlay backdrop. The selected region is kept.
    pub fn clear_backdrop(&self) {
        if let Ok(mut backdrop) = self.backdrop.lock() {
            *backdrop = None;
        }
    }
}

impl Default for CaptureState {
    fn default() -> Self {
        Self::new()
    }
}
