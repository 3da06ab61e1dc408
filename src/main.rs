//! TriSlider daemon - entry point
//!
//! Runs the key-event routing core over the simulated platform and feeds it
//! line-delimited JSON events from stdin. The real inbound feed on a device
//! build is the kernel input pipeline; this harness lets the routing logic
//! be driven end to end without hardware.

use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use trislider::core::config::Config;
use trislider::core::events::AppEvent;
use trislider::gesture::GestureConfirmer;
use trislider::haptics::HapticNotifier;
use trislider::platform::sim::{
    SimBroadcaster, SimEffects, SimProximitySensor, SimSettings, SimVibrator, SimWakeLock,
};
use trislider::platform::{ProximitySensor, Vibrator, SETTING_SETUP_COMPLETE};
use trislider::router::KeyEventRouter;
use trislider::slider::SliderModeRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    info!("starting trisliderd on the simulated platform");

    let settings = Arc::new(SimSettings::new());
    // The simulated device is already provisioned
    settings.set_bool(SETTING_SETUP_COMPLETE, true);

    let effects = Arc::new(SimEffects::new());
    let broadcaster = Arc::new(SimBroadcaster::new());
    let sensor = config
        .sim
        .sensor_present
        .then(|| Arc::new(SimProximitySensor::new(config.sim.proximity_max_range)));
    let vibrator = config
        .sim
        .vibrator_present
        .then(|| Arc::new(SimVibrator::new()) as Arc<dyn Vibrator>);

    let haptics = HapticNotifier::new(vibrator, settings.clone());
    let confirmer = GestureConfirmer::new(
        config.gesture.clone(),
        sensor
            .clone()
            .map(|sensor| sensor as Arc<dyn ProximitySensor>),
        Arc::new(SimWakeLock::new("proximity")),
        Arc::new(SimWakeLock::new("gesture")),
        broadcaster,
        haptics,
        settings.clone(),
    );
    let registry = SliderModeRegistry::new(effects, settings.clone());
    let mut router = KeyEventRouter::new(registry, confirmer, settings);

    info!("reading events from stdin, one JSON object per line");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Harness-only escape hatch: drive the simulated proximity sensor
        // with "proximity <range>"
        if let Some(range) = line.strip_prefix("proximity ") {
            match (range.trim().parse::<f32>(), &sensor) {
                (Ok(range), Some(sensor)) => {
                    if !sensor.deliver(range) {
                        warn!(range, "no proximity subscriber, reading dropped");
                    }
                }
                (Ok(_), None) => warn!("simulated device has no proximity sensor"),
                (Err(err), _) => warn!(%err, "bad proximity range"),
            }
            continue;
        }

        match serde_json::from_str::<AppEvent>(line) {
            Ok(AppEvent::Key(event)) => {
                let disposition = router.handle_key_event(event);
                info!(?event, ?disposition, "routed key event");
            }
            Ok(AppEvent::SliderSettingsUpdate { usage, actions }) => {
                router.handle_settings_update(usage, &actions);
            }
            Err(err) => warn!(%err, line, "ignoring malformed event"),
        }
    }

    info!("stdin closed, shutting down");
    Ok(())
}
