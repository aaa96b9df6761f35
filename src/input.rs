//! Simulated keyboard input for turning pages in the viewer being captured.
//!
//! Key events go to whichever window currently has OS focus. The capture
//! loop only sees the `PageAdvancer` trait, so tests can count presses
//! without touching the real keyboard.

use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Key that tells the on-screen viewer to show the next page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdvanceKey {
    #[default]
    Right,
    Down,
    PageDown,
    Space,
}

impl AdvanceKey {
    fn to_enigo(self) -> Key {
        match self {
            AdvanceKey::Right => Key::RightArrow,
            AdvanceKey::Down => Key::DownArrow,
            AdvanceKey::PageDown => Key::PageDown,
            AdvanceKey::Space => Key::Space,
        }
    }
}

impl FromStr for AdvanceKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "right" | "arrow-right" => Ok(AdvanceKey::Right),
            "down" | "arrow-down" => Ok(AdvanceKey::Down),
            "page-down" | "pagedown" | "pgdn" => Ok(AdvanceKey::PageDown),
            "space" => Ok(AdvanceKey::Space),
            other => Err(format!("Unknown page-advance key: {}", other)),
        }
    }
}

/// Presses and releases the page-advance key.
///
/// Split into two calls so the capture loop controls how long the key is
/// held.
pub trait PageAdvancer {
    fn press(&mut self) -> Result<(), InputError>;
    fn release(&mut self) -> Result<(), InputError>;
}

/// Sends real key events through `enigo`.
///
/// `Enigo` is not `Send` on every platform, so build this inside the thread
/// that uses it.
pub struct KeyboardAdvancer {
    enigo: Enigo,
    key: AdvanceKey,
}

impl KeyboardAdvancer {
    pub fn new(key: AdvanceKey) -> Result<Self, InputError> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| InputError::Connection(e.to_string()))?;
        Ok(Self { enigo, key })
    }

    fn send(&mut self, direction: Direction) -> Result<(), InputError> {
        self.enigo
            .key(self.key.to_enigo(), direction)
            .map_err(|e| InputError::KeyEvent {
                key: self.key,
                reason: e.to_string(),
            })
    }
}

impl PageAdvancer for KeyboardAdvancer {
    fn press(&mut self) -> Result<(), InputError> {
        self.send(Direction::Press)
    }

    fn release(&mut self) -> Result<(), InputError> {
        self.send(Direction::Release)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Failed to connect to the input system: {0}")]
    Connection(String),

    #[error("Failed to send {key:?} key event: {reason}")]
    KeyEvent { key: AdvanceKey, reason: String },
}
