//! Flip-gesture confirmation
//!
//! Decides whether the camera flip gesture fires immediately or must be
//! confirmed by a proximity reading, and resolves the race between the
//! reading and a bounded deadline. The pending gesture is a single-owner
//! token: whichever resolver takes it out of the slot wins, so at most one
//! dispatch happens per scheduled gesture.

use crate::core::config::GestureConfig;
use crate::haptics::HapticNotifier;
use crate::platform::{
    bool_setting, GestureBroadcaster, ProximitySensor, SettingsStore, WakeLock,
    SETTING_PROXIMITY_ON_WAKE,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// The one outstanding gesture awaiting confirmation
#[derive(Debug, Clone, Copy)]
pub struct PendingGesture {
    pub scancode: u16,
    pub enqueued_at: Instant,
}

/// Single-slot delayed action, decoupled from any platform message queue
///
/// Re-scheduling replaces a previous pending action.
#[derive(Default)]
pub struct DeadlineTimer {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DeadlineTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` after `delay` unless cancelled first
    pub fn schedule<F>(&self, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut task = self.task.lock();
        if let Some(previous) = task.take() {
            previous.abort();
        }
        *task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        }));
    }

    pub fn cancel(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.task.lock().as_ref().is_some_and(|task| !task.is_finished())
    }
}

/// Terminal step for a confirmed gesture: bounded wake-hold, privileged
/// broadcast, haptic pulse
struct Dispatcher {
    gesture_hold: Arc<dyn WakeLock>,
    broadcaster: Arc<dyn GestureBroadcaster>,
    haptics: HapticNotifier,
    hold_duration: Duration,
}

impl Dispatcher {
    fn dispatch(&self, scancode: u16) {
        self.gesture_hold.acquire_for(self.hold_duration);
        self.broadcaster.send_camera_gesture();
        self.haptics.notify();
        info!(scancode, "camera gesture confirmed");
    }
}

/// Schedules and resolves flip-gesture confirmations
pub struct GestureConfirmer {
    config: GestureConfig,
    pending: Arc<Mutex<Option<PendingGesture>>>,
    timer: Arc<DeadlineTimer>,
    sensor: Option<Arc<dyn ProximitySensor>>,
    proximity_hold: Arc<dyn WakeLock>,
    settings: Arc<dyn SettingsStore>,
    dispatcher: Arc<Dispatcher>,
}

impl GestureConfirmer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: GestureConfig,
        sensor: Option<Arc<dyn ProximitySensor>>,
        proximity_hold: Arc<dyn WakeLock>,
        gesture_hold: Arc<dyn WakeLock>,
        broadcaster: Arc<dyn GestureBroadcaster>,
        haptics: HapticNotifier,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        let hold_duration = Duration::from_millis(config.gesture_wakelock_ms);
        Self {
            config,
            pending: Arc::new(Mutex::new(None)),
            timer: Arc::new(DeadlineTimer::new()),
            sensor,
            proximity_hold,
            settings,
            dispatcher: Arc::new(Dispatcher {
                gesture_hold,
                broadcaster,
                haptics,
                hold_duration,
            }),
        }
    }

    /// Whether a gesture is outstanding; new requests are dropped while true
    pub fn is_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    /// Schedule confirmation for a gesture scancode
    ///
    /// Without proximity gating (unsupported, disabled, or no sensor) the
    /// gesture confirms immediately and no hold is acquired. With gating, a
    /// pending token is installed and two resolvers race for it: the
    /// deadline (permissive default, fires the gesture) and the first
    /// sensor reading (fires only on an uncovered sensor).
    pub fn schedule(&self, scancode: u16) {
        let gated = self.config.proximity_check_supported
            && bool_setting(
                &*self.settings,
                SETTING_PROXIMITY_ON_WAKE,
                self.config.proximity_on_wake_default,
            );
        let Some(sensor) = self.sensor.as_ref().filter(|_| gated).map(Arc::clone) else {
            debug!(scancode, "confirming gesture without proximity check");
            self.dispatcher.dispatch(scancode);
            return;
        };

        {
            let mut slot = self.pending.lock();
            if slot.is_some() {
                debug!(scancode, "gesture already pending, dropping request");
                return;
            }
            *slot = Some(PendingGesture {
                scancode,
                enqueued_at: Instant::now(),
            });
        }

        self.schedule_deadline();
        self.watch_sensor(sensor);
    }

    /// Deadline resolver: if the token is still present when the timeout
    /// elapses, the gesture is confirmed without a reading
    fn schedule_deadline(&self) {
        let pending = Arc::clone(&self.pending);
        let dispatcher = Arc::clone(&self.dispatcher);
        let timeout = Duration::from_millis(self.config.proximity_timeout_ms);
        self.timer.schedule(timeout, move || {
            if let Some(gesture) = pending.lock().take() {
                debug!(
                    scancode = gesture.scancode,
                    waited_ms = gesture.enqueued_at.elapsed().as_millis() as u64,
                    "no proximity reading before deadline, confirming gesture"
                );
                dispatcher.dispatch(gesture.scancode);
            }
        });
    }

    /// Sensor resolver: the proximity hold spans subscribe to first reading
    /// and is released exactly once on this path, whatever the outcome
    fn watch_sensor(&self, sensor: Arc<dyn ProximitySensor>) {
        self.proximity_hold.acquire();
        let receiver = sensor.subscribe_once();
        let maximum_range = sensor.maximum_range();
        let pending = Arc::clone(&self.pending);
        let timer = Arc::clone(&self.timer);
        let hold = Arc::clone(&self.proximity_hold);
        let dispatcher = Arc::clone(&self.dispatcher);

        tokio::spawn(async move {
            let reading = receiver.await;
            hold.release();

            let Ok(reading) = reading else {
                // Sensor went away without reporting; the deadline still
                // owns the token
                debug!("proximity subscription closed without a reading");
                return;
            };
            let Some(gesture) = pending.lock().take() else {
                debug!("stale proximity reading, gesture already resolved");
                return;
            };
            timer.cancel();

            // This sensor family reports an uncovered state as exactly its
            // maximum range; anything else means covered
            if reading.range == maximum_range {
                dispatcher.dispatch(gesture.scancode);
            } else {
                debug!(
                    scancode = gesture.scancode,
                    range = reading.range,
                    "proximity sensor covered, cancelling gesture"
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GestureConfig;
    use crate::platform::sim::{
        SimBroadcaster, SimProximitySensor, SimSettings, SimVibrator, SimWakeLock,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Rig {
        confirmer: GestureConfirmer,
        sensor: Arc<SimProximitySensor>,
        proximity_hold: Arc<SimWakeLock>,
        gesture_hold: Arc<SimWakeLock>,
        broadcaster: Arc<SimBroadcaster>,
        vibrator: Arc<SimVibrator>,
    }

    fn rig(config: GestureConfig, proximity_on_wake: bool, with_sensor: bool) -> Rig {
        let settings = Arc::new(SimSettings::new());
        settings.set_bool(SETTING_PROXIMITY_ON_WAKE, proximity_on_wake);
        let sensor = Arc::new(SimProximitySensor::new(5.0));
        let proximity_hold = Arc::new(SimWakeLock::new("proximity"));
        let gesture_hold = Arc::new(SimWakeLock::new("gesture"));
        let broadcaster = Arc::new(SimBroadcaster::new());
        let vibrator = Arc::new(SimVibrator::new());
        let haptics = HapticNotifier::new(Some(vibrator.clone()), settings.clone());
        let confirmer = GestureConfirmer::new(
            config,
            with_sensor.then(|| sensor.clone() as Arc<dyn ProximitySensor>),
            proximity_hold.clone(),
            gesture_hold.clone(),
            broadcaster.clone(),
            haptics,
            settings,
        );
        Rig {
            confirmer,
            sensor,
            proximity_hold,
            gesture_hold,
            broadcaster,
            vibrator,
        }
    }

    fn gated_config() -> GestureConfig {
        GestureConfig {
            proximity_check_supported: true,
            proximity_on_wake_default: false,
            proximity_timeout_ms: 250,
            gesture_wakelock_ms: 3000,
        }
    }

    /// Let spawned resolver tasks run on the paused clock
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_ungated_dispatches_immediately() {
        let rig = rig(gated_config(), false, true);
        rig.confirmer.schedule(249);

        assert_eq!(rig.broadcaster.sent_count(), 1);
        assert_eq!(rig.vibrator.pulses().len(), 1);
        // No proximity hold when gating is skipped
        assert_eq!(rig.proximity_hold.acquire_count(), 0);
        assert_eq!(
            rig.gesture_hold.timed_acquisitions(),
            vec![Duration::from_millis(3000)]
        );
        assert!(!rig.confirmer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_sensor_dispatches_immediately() {
        let rig = rig(gated_config(), true, false);
        rig.confirmer.schedule(249);

        assert_eq!(rig.broadcaster.sent_count(), 1);
        assert_eq!(rig.proximity_hold.acquire_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_path_dispatches_once() {
        let rig = rig(gated_config(), true, true);
        rig.confirmer.schedule(249);

        assert!(rig.confirmer.is_pending());
        assert_eq!(rig.broadcaster.sent_count(), 0);
        assert!(rig.proximity_hold.held());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(rig.broadcaster.sent_count(), 1);
        assert!(!rig.confirmer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_uncovered_reading_dispatches_and_releases_hold() {
        let rig = rig(gated_config(), true, true);
        rig.confirmer.schedule(249);
        settle().await;

        assert!(rig.sensor.deliver(5.0));
        settle().await;

        assert_eq!(rig.broadcaster.sent_count(), 1);
        assert_eq!(rig.proximity_hold.acquire_count(), 1);
        assert_eq!(rig.proximity_hold.release_count(), 1);
        assert!(!rig.confirmer.is_pending());

        // Deadline passing afterwards must not double-dispatch
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(rig.broadcaster.sent_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_covered_reading_cancels_silently() {
        let rig = rig(gated_config(), true, true);
        rig.confirmer.schedule(249);
        settle().await;

        assert!(rig.sensor.deliver(1.0));
        settle().await;

        assert_eq!(rig.broadcaster.sent_count(), 0);
        assert_eq!(rig.proximity_hold.release_count(), 1);
        assert!(!rig.confirmer.is_pending());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(rig.broadcaster.sent_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_reading_after_timeout_is_stale() {
        let rig = rig(gated_config(), true, true);
        rig.confirmer.schedule(249);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(rig.broadcaster.sent_count(), 1);

        // The subscriber is still registered; a late reading must be
        // discarded, with the hold still released exactly once
        assert!(rig.sensor.deliver(5.0));
        settle().await;
        assert_eq!(rig.broadcaster.sent_count(), 1);
        assert_eq!(rig.proximity_hold.release_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_schedule_is_dropped() {
        let rig = rig(gated_config(), true, true);
        rig.confirmer.schedule(249);
        rig.confirmer.schedule(249);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(rig.broadcaster.sent_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_subscription_leaves_deadline_in_charge() {
        let rig = rig(gated_config(), true, true);
        rig.confirmer.schedule(249);
        settle().await;

        // A second subscriber steals the slot, closing the first channel
        let _stray = rig.sensor.subscribe_once();
        settle().await;
        assert_eq!(rig.proximity_hold.release_count(), 1);
        assert_eq!(rig.broadcaster.sent_count(), 0);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(rig.broadcaster.sent_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_timer_cancel_and_query() {
        let fired = Arc::new(AtomicUsize::new(0));
        let timer = DeadlineTimer::new();

        let counter = Arc::clone(&fired);
        timer.schedule(Duration::from_millis(50), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(timer.is_pending());

        timer.cancel();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!timer.is_pending());
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        let counter = Arc::clone(&fired);
        timer.schedule(Duration::from_millis(50), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!timer.is_pending());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
