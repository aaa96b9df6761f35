//! Screen capture using the `xcap` crate.
//!
//! Infrastructure layer: it talks to the display server.
//! Everything that needs pixels from the screen goes through here.

use super::region::{crop_to_region, CropError, Region};
use image::{DynamicImage, RgbaImage};
use std::time::Instant;
use xcap::Monitor;

/// Captures the primary monitor's screen as a `DynamicImage`.
///
/// Returns the full-screen screenshot including all pixels.
/// The caller is responsible for cropping to the user's selection.
pub fn capture_primary_monitor() -> Result<DynamicImage, CaptureError> {
    let monitors = Monitor::all().map_err(|e| CaptureError::MonitorEnumeration(e.to_string()))?;

    // If no monitor reports as primary, use the first one
    let primary = pick_primary(monitors, |m| m.is_primary().unwrap_or(false))
        .ok_or(CaptureError::NoPrimaryMonitor)?;

    let image = primary
        .capture_image()
        .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;

    Ok(DynamicImage::ImageRgba8(image))
}

fn pick_primary<M>(monitors: Vec<M>, is_primary: impl Fn(&M) -> bool) -> Option<M> {
    let index = monitors.iter().position(|m| is_primary(m)).unwrap_or(0);
    monitors.into_iter().nth(index)
}

/// Source of region screenshots for the capture loop.
pub trait ScreenGrabber {
    fn grab(&mut self, region: &Region) -> Result<RgbaImage, CaptureError>;
}

/// Grabs regions of the primary monitor.
///
/// Captures the whole monitor and crops, so the region uses the same
/// coordinate space as the selection overlay backdrop.
#[derive(Debug, Default)]
pub struct MonitorGrabber;

impl ScreenGrabber for MonitorGrabber {
    fn grab(&mut self, region: &Region) -> Result<RgbaImage, CaptureError> {
        let start = Instant::now();
        let screen = capture_primary_monitor()?;
        let cropped = crop_to_region(&screen, region)?;
        log::debug!(
            "[CAPTURE] Grabbed {}x{} region in {}ms",
            cropped.width(),
            cropped.height(),
            start.elapsed().as_millis()
        );
        Ok(cropped)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Failed to enumerate monitors: {0}")]
    MonitorEnumeration(String),

    #[error("No primary monitor found")]
    NoPrimaryMonitor,

    #[error("Screen capture failed: {0}")]
    CaptureFailed(String),

    #[error(transparent)]
    Crop(#[from] CropError),
}
