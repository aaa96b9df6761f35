//! Runtime settings, read once at startup from the environment (and `.env`).
//!
//! Recognized variables:
//!   PAGESNAP_OUTPUT_DIR     where output.pdf and temporary page images go
//!   PAGESNAP_OUTPUT_NAME    output file name (default: output.pdf)
//!   PAGESNAP_SLOW_DELAY_MS  extra wait after each page turn when enabled
//!   PAGESNAP_COUNTDOWN_MS   wait before the first capture
//!   PAGESNAP_JPEG_QUALITY   1..=100
//!   PAGESNAP_ADVANCE_KEY    right | down | page-down | space

use crate::input::AdvanceKey;
use serde::Serialize;
use std::ops::Range;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const MIN_PAGES: u32 = 1;
pub const MAX_PAGES: u32 = 1000;

const DEFAULT_OUTPUT_NAME: &str = "output.pdf";
const DEFAULT_SLOW_DELAY_MS: u64 = 3000;
const DEFAULT_COUNTDOWN_MS: u64 = 3000;
const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Waits used by the capture loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    /// Wait before the first capture so the user can focus the viewer.
    pub countdown: Duration,
    /// Random settle time before capturing page 1.
    pub first_page_settle: Range<Duration>,
    /// Random time the page-advance key is held down.
    pub key_hold: Range<Duration>,
    /// Fixed extra wait after a page turn when slow loading is enabled.
    pub slow_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            countdown: Duration::from_millis(DEFAULT_COUNTDOWN_MS),
            first_page_settle: Duration::from_millis(200)..Duration::from_millis(2000),
            key_hold: Duration::from_millis(100)..Duration::from_millis(500),
            slow_delay: Duration::from_millis(DEFAULT_SLOW_DELAY_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub output_name: String,
    pub jpeg_quality: u8,
    pub advance_key: AdvanceKey,
    pub timing: Timing,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            advance_key: AdvanceKey::default(),
            timing: Timing::default(),
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// Call after `dotenvy::dotenv()` so `.env` values are visible.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    ///
    /// Unparseable values are logged and replaced by defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(dir) = lookup("PAGESNAP_OUTPUT_DIR").filter(|v| !v.trim().is_empty()) {
            settings.output_dir = PathBuf::from(dir);
        }
        if let Some(name) = lookup("PAGESNAP_OUTPUT_NAME").filter(|v| !v.trim().is_empty()) {
            settings.output_name = name;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "PAGESNAP_SLOW_DELAY_MS") {
            settings.timing.slow_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "PAGESNAP_COUNTDOWN_MS") {
            settings.timing.countdown = Duration::from_millis(ms);
        }
        if let Some(q) = parse_var::<u8>(&lookup, "PAGESNAP_JPEG_QUALITY") {
            if (1..=100).contains(&q) {
                settings.jpeg_quality = q;
            } else {
                log::warn!("[CONFIG] PAGESNAP_JPEG_QUALITY={} out of range, using default", q);
            }
        }
        if let Some(key) = parse_var::<AdvanceKey>(&lookup, "PAGESNAP_ADVANCE_KEY") {
            settings.advance_key = key;
        }

        settings
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_name)
    }

    /// Values the main window needs to configure its controls.
    pub fn ui_defaults(&self) -> UiDefaults {
        UiDefaults {
            min_pages: MIN_PAGES,
            max_pages: MAX_PAGES,
            slow_delay_secs: self.timing.slow_delay.as_secs_f64(),
            countdown_secs: self.timing.countdown.as_secs_f64(),
            output_path: self.output_path().display().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiDefaults {
    pub min_pages: u32,
    pub max_pages: u32,
    pub slow_delay_secs: f64,
    pub countdown_secs: f64,
    pub output_path: String,
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("[CONFIG] Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}

fn default_output_dir() -> PathBuf {
    std::env::current_dir()
        .ok()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}
