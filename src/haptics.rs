//! Haptic feedback on gesture confirmation

use crate::platform::{bool_setting, SettingsStore, Vibrator, SETTING_HAPTIC_FEEDBACK};
use std::sync::Arc;
use std::time::Duration;

/// Pulse length for a confirmed gesture
const GESTURE_PULSE: Duration = Duration::from_millis(50);

/// Fires a short vibration pulse when a gesture is confirmed, gated by the
/// persisted haptic-feedback preference (enabled by default)
pub struct HapticNotifier {
    vibrator: Option<Arc<dyn Vibrator>>,
    settings: Arc<dyn SettingsStore>,
}

impl HapticNotifier {
    /// `vibrator` is `None` on devices without a vibration motor
    pub fn new(vibrator: Option<Arc<dyn Vibrator>>, settings: Arc<dyn SettingsStore>) -> Self {
        Self { vibrator, settings }
    }

    pub fn notify(&self) {
        let Some(vibrator) = &self.vibrator else {
            return;
        };
        if bool_setting(&*self.settings, SETTING_HAPTIC_FEEDBACK, true) {
            vibrator.vibrate(GESTURE_PULSE);
        }
    }
}
