//! The six slider behaviors
//!
//! Each mode is a thin catalog mapping the three switch positions to system
//! effects; the shared [`PositionedBehavior`] wrapper handles the mapping
//! storage, position bookkeeping and state restore that every mode needs.
//! The switch sits in one physical position at all times; the last observed
//! position is persisted under a single shared key so `restore_state` can
//! re-assert the switch's effect after a mode change.

use super::{ActionMapping, SliderBehavior, SliderMode, SliderPosition};
use crate::platform::{
    RingerMode, SettingsStore, SystemEffects, ZenMode, SETTING_SLIDER_POSITION,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Per-mode effect logic behind the shared behavior plumbing
trait EffectCatalog: Send {
    /// Apply the effect selected by `action`
    fn apply(&self, effects: &dyn SystemEffects, action: i32);

    /// Neutral effect applied when the mode stops being active
    fn neutralize(&self, effects: &dyn SystemEffects);
}

/// Common behavior plumbing over a mode catalog
struct PositionedBehavior<C: EffectCatalog> {
    catalog: C,
    effects: Arc<dyn SystemEffects>,
    settings: Arc<dyn SettingsStore>,
    actions: ActionMapping,
}

impl<C: EffectCatalog> PositionedBehavior<C> {
    fn new(catalog: C, effects: Arc<dyn SystemEffects>, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            catalog,
            effects,
            settings,
            actions: [0; 3],
        }
    }

    fn apply_position(&self, position: SliderPosition) {
        self.catalog
            .apply(&*self.effects, self.actions[position.index()]);
    }

    fn remember(&self, position: SliderPosition) {
        if let Err(err) = self
            .settings
            .put_int(SETTING_SLIDER_POSITION, position.index() as i32)
        {
            warn!(%err, "failed to persist slider position");
        }
    }

    fn recall(&self) -> Option<SliderPosition> {
        match self.settings.get_int(SETTING_SLIDER_POSITION) {
            Ok(index) => index.and_then(position_from_index),
            Err(err) => {
                warn!(%err, "failed to read persisted slider position");
                None
            }
        }
    }
}

fn position_from_index(index: i32) -> Option<SliderPosition> {
    match index {
        0 => Some(SliderPosition::Top),
        1 => Some(SliderPosition::Middle),
        2 => Some(SliderPosition::Bottom),
        _ => None,
    }
}

impl<C: EffectCatalog> SliderBehavior for PositionedBehavior<C> {
    fn reset(&mut self) {
        self.catalog.neutralize(&*self.effects);
    }

    fn update(&mut self, actions: ActionMapping) {
        self.actions = actions;
    }

    fn restore_state(&mut self) {
        if let Some(position) = self.recall() {
            self.apply_position(position);
        }
    }

    fn process_event(&mut self, scancode: u16) {
        let Some(position) = SliderPosition::from_scancode(scancode) else {
            return;
        };
        self.remember(position);
        self.apply_position(position);
    }

    fn is_supported(&self, scancode: u16) -> bool {
        SliderPosition::from_scancode(scancode).is_some()
    }
}

/// Interruption filter control
struct NotificationCatalog;

impl EffectCatalog for NotificationCatalog {
    fn apply(&self, effects: &dyn SystemEffects, action: i32) {
        let mode = match action {
            0 => ZenMode::Off,
            1 => ZenMode::PriorityOnly,
            2 => ZenMode::AlarmsOnly,
            3 => ZenMode::TotalSilence,
            other => {
                warn!(action = other, "unknown notification action");
                return;
            }
        };
        effects.set_zen_mode(mode);
    }

    fn neutralize(&self, effects: &dyn SystemEffects) {
        effects.set_zen_mode(ZenMode::Off);
    }
}

/// Torch toggle
struct FlashlightCatalog;

impl EffectCatalog for FlashlightCatalog {
    fn apply(&self, effects: &dyn SystemEffects, action: i32) {
        match action {
            0 => effects.set_flashlight(false),
            1 => effects.set_flashlight(true),
            other => warn!(action = other, "unknown flashlight action"),
        }
    }

    fn neutralize(&self, effects: &dyn SystemEffects) {
        effects.set_flashlight(false);
    }
}

/// Auto brightness or a fixed level
struct BrightnessCatalog;

impl EffectCatalog for BrightnessCatalog {
    fn apply(&self, effects: &dyn SystemEffects, action: i32) {
        let level = match action {
            0 => {
                effects.set_auto_brightness(true);
                return;
            }
            1 => 10,
            2 => 50,
            3 => 100,
            other => {
                warn!(action = other, "unknown brightness action");
                return;
            }
        };
        effects.set_auto_brightness(false);
        effects.set_brightness_level(level);
    }

    fn neutralize(&self, effects: &dyn SystemEffects) {
        effects.set_auto_brightness(true);
    }
}

/// Rotation lock toggle
struct RotationCatalog;

impl EffectCatalog for RotationCatalog {
    fn apply(&self, effects: &dyn SystemEffects, action: i32) {
        match action {
            0 => effects.set_rotation_lock(false),
            1 => effects.set_rotation_lock(true),
            other => warn!(action = other, "unknown rotation action"),
        }
    }

    fn neutralize(&self, effects: &dyn SystemEffects) {
        effects.set_rotation_lock(false);
    }
}

/// Ringer mode control
struct RingerCatalog;

impl EffectCatalog for RingerCatalog {
    fn apply(&self, effects: &dyn SystemEffects, action: i32) {
        let mode = match action {
            0 => RingerMode::Normal,
            1 => RingerMode::Vibrate,
            2 => RingerMode::Silent,
            other => {
                warn!(action = other, "unknown ringer action");
                return;
            }
        };
        effects.set_ringer_mode(mode);
    }

    fn neutralize(&self, effects: &dyn SystemEffects) {
        effects.set_ringer_mode(RingerMode::Normal);
    }
}

/// Combined ringer and interruption filter, alert-slider style
struct NotificationRingerCatalog;

impl EffectCatalog for NotificationRingerCatalog {
    fn apply(&self, effects: &dyn SystemEffects, action: i32) {
        let (ringer, zen) = match action {
            0 => (RingerMode::Normal, ZenMode::Off),
            1 => (RingerMode::Vibrate, ZenMode::Off),
            2 => (RingerMode::Silent, ZenMode::AlarmsOnly),
            other => {
                warn!(action = other, "unknown notification-ringer action");
                return;
            }
        };
        effects.set_ringer_mode(ringer);
        effects.set_zen_mode(zen);
    }

    fn neutralize(&self, effects: &dyn SystemEffects) {
        effects.set_ringer_mode(RingerMode::Normal);
        effects.set_zen_mode(ZenMode::Off);
    }
}

/// Build the mode-to-behavior table the registry dispatches through
pub fn behavior_table(
    effects: Arc<dyn SystemEffects>,
    settings: Arc<dyn SettingsStore>,
) -> HashMap<SliderMode, Box<dyn SliderBehavior>> {
    let mut table: HashMap<SliderMode, Box<dyn SliderBehavior>> = HashMap::new();
    table.insert(
        SliderMode::Notification,
        Box::new(PositionedBehavior::new(
            NotificationCatalog,
            effects.clone(),
            settings.clone(),
        )),
    );
    table.insert(
        SliderMode::Flashlight,
        Box::new(PositionedBehavior::new(
            FlashlightCatalog,
            effects.clone(),
            settings.clone(),
        )),
    );
    table.insert(
        SliderMode::Brightness,
        Box::new(PositionedBehavior::new(
            BrightnessCatalog,
            effects.clone(),
            settings.clone(),
        )),
    );
    table.insert(
        SliderMode::Rotation,
        Box::new(PositionedBehavior::new(
            RotationCatalog,
            effects.clone(),
            settings.clone(),
        )),
    );
    table.insert(
        SliderMode::Ringer,
        Box::new(PositionedBehavior::new(
            RingerCatalog,
            effects.clone(),
            settings.clone(),
        )),
    );
    table.insert(
        SliderMode::NotificationRinger,
        Box::new(PositionedBehavior::new(
            NotificationRingerCatalog,
            effects,
            settings,
        )),
    );
    table
}
