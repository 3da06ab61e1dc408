//! Top-level key-event routing
//!
//! Every raw key event enters here and leaves as exactly one of two
//! dispositions: passed through to default handling, or consumed by this
//! subsystem (slider behavior or gesture confirmation).

use crate::core::events::{KeyAction, KeyEvent};
use crate::gesture::GestureConfirmer;
use crate::platform::{bool_setting, SettingsStore, SETTING_SETUP_COMPLETE};
use crate::slider::{ActionMapping, SliderModeRegistry};
use std::sync::Arc;
use tracing::{debug, warn};

/// Scancode of the camera-launch flip gesture
pub const FLIP_CAMERA_SCANCODE: u16 = 249;

/// What the input pipeline should do with the event after routing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Hand the event back for default handling
    Passthrough,
    /// The event was handled (or deliberately swallowed) here
    Consumed,
}

/// Routes raw key events to the slider registry or the gesture confirmer
pub struct KeyEventRouter {
    registry: SliderModeRegistry,
    confirmer: GestureConfirmer,
    settings: Arc<dyn SettingsStore>,
}

impl KeyEventRouter {
    pub fn new(
        registry: SliderModeRegistry,
        confirmer: GestureConfirmer,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            registry,
            confirmer,
            settings,
        }
    }

    /// Route one raw key event
    pub fn handle_key_event(&mut self, event: KeyEvent) -> Disposition {
        let is_gesture = event.scancode == FLIP_CAMERA_SCANCODE;
        let is_slider = self.registry.is_supported(event.scancode);
        if !is_gesture && !is_slider {
            return Disposition::Passthrough;
        }

        if !bool_setting(&*self.settings, SETTING_SETUP_COMPLETE, false) {
            debug!(scancode = event.scancode, "setup not completed, passing through");
            return Disposition::Passthrough;
        }

        // Slider positions act on release; the gesture acts on press and its
        // release is swallowed so nothing else reacts to it
        if is_gesture {
            if event.action != KeyAction::Down {
                return Disposition::Consumed;
            }
        } else if event.action != KeyAction::Up {
            return Disposition::Passthrough;
        }

        if is_slider {
            self.registry.process_event(event.scancode);
        } else if self.confirmer.is_pending() {
            debug!(scancode = event.scancode, "gesture already pending, dropping");
        } else {
            self.confirmer.schedule(event.scancode);
        }
        Disposition::Consumed
    }

    /// Apply a slider-settings update from the external settings system
    pub fn handle_settings_update(&mut self, usage: i32, actions: &[i32]) {
        let Ok(actions) = ActionMapping::try_from(actions) else {
            warn!(
                usage,
                count = actions.len(),
                "slider update must carry one action per switch position"
            );
            return;
        };
        self.registry.on_mode_update(usage, actions);
    }

    pub fn registry(&self) -> &SliderModeRegistry {
        &self.registry
    }
}
