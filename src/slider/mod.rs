//! Tri-state slider modes
//!
//! The physical three-position switch is bound to exactly one behavior at a
//! time. The registry owns the behavior table and the active-mode slot and
//! implements the mode-switch protocol: reset the outgoing behavior, then
//! update and restore the incoming one before it sees any events.

mod behaviors;

pub use behaviors::behavior_table;

use crate::platform::{SettingsStore, SystemEffects};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Switch position scancodes reported by the tri-state key
pub const SCANCODE_SLIDER_TOP: u16 = 601;
pub const SCANCODE_SLIDER_MIDDLE: u16 = 602;
pub const SCANCODE_SLIDER_BOTTOM: u16 = 603;

/// One effect selector per physical switch position (top, middle, bottom)
pub type ActionMapping = [i32; 3];

/// The six mutually-exclusive slider modes, identified by the integer the
/// settings system sends in updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SliderMode {
    Notification = 1,
    Flashlight = 2,
    Brightness = 3,
    Rotation = 4,
    Ringer = 5,
    NotificationRinger = 6,
}

impl SliderMode {
    /// The only place mode identities are interpreted
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(SliderMode::Notification),
            2 => Some(SliderMode::Flashlight),
            3 => Some(SliderMode::Brightness),
            4 => Some(SliderMode::Rotation),
            5 => Some(SliderMode::Ringer),
            6 => Some(SliderMode::NotificationRinger),
            _ => None,
        }
    }

    pub fn id(&self) -> i32 {
        *self as i32
    }
}

/// A physical switch position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderPosition {
    Top,
    Middle,
    Bottom,
}

impl SliderPosition {
    pub fn from_scancode(scancode: u16) -> Option<Self> {
        match scancode {
            SCANCODE_SLIDER_TOP => Some(SliderPosition::Top),
            SCANCODE_SLIDER_MIDDLE => Some(SliderPosition::Middle),
            SCANCODE_SLIDER_BOTTOM => Some(SliderPosition::Bottom),
            _ => None,
        }
    }

    /// Index into an [`ActionMapping`]
    pub fn index(&self) -> usize {
        match self {
            SliderPosition::Top => 0,
            SliderPosition::Middle => 1,
            SliderPosition::Bottom => 2,
        }
    }
}

/// Capability set every slider behavior provides
pub trait SliderBehavior: Send {
    /// Tear down this mode's side effects when it stops being active
    fn reset(&mut self);

    /// Install a new position-to-action mapping
    fn update(&mut self, actions: ActionMapping);

    /// Re-apply the effect for the last known switch position
    fn restore_state(&mut self);

    /// Apply the effect bound to the position this scancode reports
    fn process_event(&mut self, scancode: u16);

    fn is_supported(&self, scancode: u16) -> bool;
}

/// Owns the behavior table and the single active-behavior slot
pub struct SliderModeRegistry {
    behaviors: HashMap<SliderMode, Box<dyn SliderBehavior>>,
    active: Option<SliderMode>,
}

impl SliderModeRegistry {
    pub fn new(effects: Arc<dyn SystemEffects>, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            behaviors: behavior_table(effects, settings),
            active: None,
        }
    }

    /// Apply a slider-settings update from the external settings system
    ///
    /// The mode identity is validated before any teardown: an unrecognized
    /// identity rejects the whole update and leaves the prior behavior
    /// active and untouched. For a recognized mode the outgoing behavior is
    /// always reset first (same-mode updates included), then the incoming
    /// one gets the new mapping and restores its state before it becomes
    /// eligible for events.
    pub fn on_mode_update(&mut self, usage: i32, actions: ActionMapping) {
        let Some(mode) = SliderMode::from_id(usage) else {
            warn!(usage, "unrecognized slider mode in update, keeping current mode");
            return;
        };
        debug!(?mode, ?actions, "slider mode update");

        if let Some(outgoing) = self.active {
            if let Some(behavior) = self.behaviors.get_mut(&outgoing) {
                behavior.reset();
            }
        }

        if let Some(behavior) = self.behaviors.get_mut(&mode) {
            behavior.update(actions);
            behavior.restore_state();
            self.active = Some(mode);
        }
    }

    /// Pure delegation to the active behavior
    pub fn process_event(&mut self, scancode: u16) {
        if let Some(mode) = self.active {
            if let Some(behavior) = self.behaviors.get_mut(&mode) {
                behavior.process_event(scancode);
            }
        }
    }

    /// False until the first successful mode update
    pub fn is_supported(&self, scancode: u16) -> bool {
        self.active
            .and_then(|mode| self.behaviors.get(&mode))
            .is_some_and(|behavior| behavior.is_supported(scancode))
    }

    pub fn active_mode(&self) -> Option<SliderMode> {
        self.active
    }
}
