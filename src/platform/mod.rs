//! Platform boundary - traits for the system services this subsystem
//! collaborates with but does not implement
//!
//! Sensor access, wake-lock sources, the vibrator, persisted preferences,
//! broadcast delivery and the per-mode system effects all live behind these
//! traits. The daemon binary and the test suite wire in the simulated
//! implementations from [`sim`]; a device build supplies real ones.

pub mod sim;

use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::warn;

// Persisted preference keys
pub const SETTING_SETUP_COMPLETE: &str = "setup_complete";
pub const SETTING_PROXIMITY_ON_WAKE: &str = "proximity_on_wake";
pub const SETTING_HAPTIC_FEEDBACK: &str = "haptic_feedback";
/// Last observed position of the physical switch, shared by all modes
pub const SETTING_SLIDER_POSITION: &str = "slider_position";

/// A single proximity sensor reading, consumed once and never persisted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityReading {
    /// Reported range in the sensor's native unit
    pub range: f32,
}

/// Proximity sensor boundary
///
/// Presence is optional and probed at initialization; consumers hold an
/// `Option<Arc<dyn ProximitySensor>>`.
pub trait ProximitySensor: Send + Sync {
    /// The sensor's maximum reportable range. This sensor family reports
    /// "nothing nearby" as exactly the maximum range.
    fn maximum_range(&self) -> f32;

    /// Subscribe for a single reading. Dropping the receiver unsubscribes;
    /// the channel closes without a value if the sensor goes away.
    fn subscribe_once(&self) -> oneshot::Receiver<ProximityReading>;
}

/// A wake-hold source preventing device sleep while held
pub trait WakeLock: Send + Sync {
    /// Hold until explicitly released
    fn acquire(&self);

    /// Hold for at most `timeout`, auto-releasing after
    fn acquire_for(&self, timeout: Duration);

    /// Release a hold taken with [`WakeLock::acquire`]
    fn release(&self);
}

/// Vibration device boundary; absence is modeled as `None` at the call site
pub trait Vibrator: Send + Sync {
    fn vibrate(&self, duration: Duration);
}

/// Outbound gesture signal
pub trait GestureBroadcaster: Send + Sync {
    /// Emit the camera-gesture broadcast. Delivery is restricted to
    /// privileged system listeners by the implementation.
    fn send_camera_gesture(&self);
}

/// Ringer mode applied by slider behaviors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingerMode {
    Normal,
    Vibrate,
    Silent,
}

/// Interruption-filter mode applied by slider behaviors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZenMode {
    Off,
    PriorityOnly,
    AlarmsOnly,
    TotalSilence,
}

/// System side effects the slider behaviors drive
///
/// The concrete plumbing (audio service, camera flash, display settings)
/// is outside this subsystem.
pub trait SystemEffects: Send + Sync {
    fn set_ringer_mode(&self, mode: RingerMode);
    fn set_zen_mode(&self, mode: ZenMode);
    fn set_flashlight(&self, on: bool);
    fn set_auto_brightness(&self, on: bool);
    /// Brightness as a 0-100 percentage; only meaningful with auto off
    fn set_brightness_level(&self, percent: u8);
    fn set_rotation_lock(&self, locked: bool);
}

/// Typed error at the persisted-settings boundary
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings backend unavailable")]
    Unavailable,
    #[error("malformed value for key {key}")]
    Malformed { key: String },
}

/// Persisted user preferences boundary
///
/// `Ok(None)` means the key has never been written; callers supply the
/// default. Write failures are reported but callers treat them as
/// best-effort.
pub trait SettingsStore: Send + Sync {
    fn get_bool(&self, key: &str) -> Result<Option<bool>, SettingsError>;
    fn get_int(&self, key: &str) -> Result<Option<i32>, SettingsError>;
    fn put_int(&self, key: &str, value: i32) -> Result<(), SettingsError>;
}

/// Read a boolean preference, degrading to `default` on error
pub fn bool_setting(store: &dyn SettingsStore, key: &str, default: bool) -> bool {
    match store.get_bool(key) {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(err) => {
            warn!(key, %err, "settings read failed, using default");
            default
        }
    }
}
