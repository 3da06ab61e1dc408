//! TriSlider
//!
//! Key-event routing for devices that pair a physical tri-state slider with
//! a flip-camera gesture key.
//!
//! # Features
//! - Routes raw key events: pass through, consume, or delegate to the
//!   active slider behavior
//! - Proximity-gated flip-gesture confirmation racing a bounded deadline
//!   against the first sensor reading, with scoped wake-holds
//! - Atomic slider mode switching driven by external settings updates
//! - Preference-gated haptic feedback on gesture confirmation
//! - Simulated platform backends for hardware-free development and testing

pub mod core;
pub mod gesture;
pub mod haptics;
pub mod platform;
pub mod router;
pub mod slider;

pub use crate::core::config::Config;
pub use crate::core::events::{AppEvent, KeyAction, KeyEvent};
pub use crate::gesture::GestureConfirmer;
pub use crate::haptics::HapticNotifier;
pub use crate::router::{Disposition, KeyEventRouter, FLIP_CAMERA_SCANCODE};
pub use crate::slider::{ActionMapping, SliderBehavior, SliderMode, SliderModeRegistry};
