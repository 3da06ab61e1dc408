//! Event definitions for the routing core

use serde::{Deserialize, Serialize};

/// Key transition direction reported by the input pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAction {
    /// Key pressed
    Down,
    /// Key released
    Up,
}

/// A raw hardware key event, one per physical key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Hardware scancode
    pub scancode: u16,
    /// Transition direction
    pub action: KeyAction,
}

impl KeyEvent {
    pub fn down(scancode: u16) -> Self {
        Self {
            scancode,
            action: KeyAction::Down,
        }
    }

    pub fn up(scancode: u16) -> Self {
        Self {
            scancode,
            action: KeyAction::Up,
        }
    }
}

/// Inbound events for the daemon loop
///
/// Serialized form is line-delimited JSON on the daemon's stdin, e.g.
/// `{"type":"key","scancode":249,"action":"down"}` or
/// `{"type":"slider_settings_update","usage":3,"actions":[0,1,3]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// Raw key event from the input pipeline
    Key(KeyEvent),

    /// Slider configuration update from the external settings system,
    /// carrying the mode identity and one action per switch position
    SliderSettingsUpdate { usage: i32, actions: Vec<i32> },
}
