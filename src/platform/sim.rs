//! Simulated platform implementations
//!
//! In-memory stand-ins for every boundary trait, used by the daemon's
//! simulation mode and the test suite. Effects are logged rather than
//! applied, and holds/pulses/broadcasts are counted so tests can assert on
//! resource discipline.

use super::{
    GestureBroadcaster, ProximityReading, ProximitySensor, RingerMode, SettingsError,
    SettingsStore, SystemEffects, Vibrator, WakeLock, ZenMode,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info};

/// In-memory settings store
#[derive(Default)]
pub struct SimSettings {
    bools: Mutex<HashMap<String, bool>>,
    ints: Mutex<HashMap<String, i32>>,
}

impl SimSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bool(&self, key: &str, value: bool) {
        self.bools.lock().insert(key.to_string(), value);
    }

    pub fn set_int(&self, key: &str, value: i32) {
        self.ints.lock().insert(key.to_string(), value);
    }
}

impl SettingsStore for SimSettings {
    fn get_bool(&self, key: &str) -> Result<Option<bool>, SettingsError> {
        if let Some(value) = self.bools.lock().get(key) {
            return Ok(Some(*value));
        }
        // A key written as an int is malformed when read as a bool
        if self.ints.lock().contains_key(key) {
            return Err(SettingsError::Malformed {
                key: key.to_string(),
            });
        }
        Ok(None)
    }

    fn get_int(&self, key: &str) -> Result<Option<i32>, SettingsError> {
        Ok(self.ints.lock().get(key).copied())
    }

    fn put_int(&self, key: &str, value: i32) -> Result<(), SettingsError> {
        self.ints.lock().insert(key.to_string(), value);
        Ok(())
    }
}

/// Counting wake lock
pub struct SimWakeLock {
    name: &'static str,
    acquired: AtomicUsize,
    released: AtomicUsize,
    timed: Mutex<Vec<Duration>>,
}

impl SimWakeLock {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            timed: Mutex::new(Vec::new()),
        }
    }

    /// Untimed acquisitions so far
    pub fn acquire_count(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn release_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Durations passed to `acquire_for`
    pub fn timed_acquisitions(&self) -> Vec<Duration> {
        self.timed.lock().clone()
    }

    pub fn held(&self) -> bool {
        self.acquire_count() > self.release_count()
    }
}

impl WakeLock for SimWakeLock {
    fn acquire(&self) {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        debug!(lock = self.name, "wake lock acquired");
    }

    fn acquire_for(&self, timeout: Duration) {
        self.timed.lock().push(timeout);
        debug!(lock = self.name, ?timeout, "wake lock acquired with timeout");
    }

    fn release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
        debug!(lock = self.name, "wake lock released");
    }
}

/// Pulse-recording vibrator
#[derive(Default)]
pub struct SimVibrator {
    pulses: Mutex<Vec<Duration>>,
}

impl SimVibrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulses(&self) -> Vec<Duration> {
        self.pulses.lock().clone()
    }
}

impl Vibrator for SimVibrator {
    fn vibrate(&self, duration: Duration) {
        info!(?duration, "vibrating");
        self.pulses.lock().push(duration);
    }
}

/// Simulated proximity sensor with an externally driven reading
pub struct SimProximitySensor {
    max_range: f32,
    subscriber: Mutex<Option<oneshot::Sender<ProximityReading>>>,
}

impl SimProximitySensor {
    pub fn new(max_range: f32) -> Self {
        Self {
            max_range,
            subscriber: Mutex::new(None),
        }
    }

    /// Deliver a reading to the current subscriber, if any.
    /// Returns whether a subscriber consumed it.
    pub fn deliver(&self, range: f32) -> bool {
        match self.subscriber.lock().take() {
            Some(tx) => tx.send(ProximityReading { range }).is_ok(),
            None => false,
        }
    }

    pub fn has_subscriber(&self) -> bool {
        self.subscriber.lock().is_some()
    }
}

impl ProximitySensor for SimProximitySensor {
    fn maximum_range(&self) -> f32 {
        self.max_range
    }

    fn subscribe_once(&self) -> oneshot::Receiver<ProximityReading> {
        let (tx, rx) = oneshot::channel();
        // Replacing a previous subscriber closes its channel
        *self.subscriber.lock() = Some(tx);
        rx
    }
}

/// Broadcast counter
#[derive(Default)]
pub struct SimBroadcaster {
    sent: AtomicUsize,
}

impl SimBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

impl GestureBroadcaster for SimBroadcaster {
    fn send_camera_gesture(&self) {
        self.sent.fetch_add(1, Ordering::SeqCst);
        info!("camera gesture broadcast sent");
    }
}

/// A single recorded system effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectCall {
    Ringer(RingerMode),
    Zen(ZenMode),
    Flashlight(bool),
    AutoBrightness(bool),
    BrightnessLevel(u8),
    RotationLock(bool),
}

/// Effect recorder
#[derive(Default)]
pub struct SimEffects {
    calls: Mutex<Vec<EffectCall>>,
}

impl SimEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<EffectCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: EffectCall) {
        info!(?call, "system effect");
        self.calls.lock().push(call);
    }
}

impl SystemEffects for SimEffects {
    fn set_ringer_mode(&self, mode: RingerMode) {
        self.record(EffectCall::Ringer(mode));
    }

    fn set_zen_mode(&self, mode: ZenMode) {
        self.record(EffectCall::Zen(mode));
    }

    fn set_flashlight(&self, on: bool) {
        self.record(EffectCall::Flashlight(on));
    }

    fn set_auto_brightness(&self, on: bool) {
        self.record(EffectCall::AutoBrightness(on));
    }

    fn set_brightness_level(&self, percent: u8) {
        self.record(EffectCall::BrightnessLevel(percent));
    }

    fn set_rotation_lock(&self, locked: bool) {
        self.record(EffectCall::RotationLock(locked));
    }
}
