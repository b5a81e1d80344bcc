//! Multi-touch gesture recognition and thumb detection for touchpads.
//!
//! `tpad` is the semantic core of a touchpad input processor: it consumes
//! per-slot contact samples (position, pressure, contact size, per-touch
//! begin/end transitions) at the device's sample cadence and turns them into
//! pointer motion, two-finger scrolling, n-finger swipes and n-finger
//! pinches, while labelling resting thumbs so they don't hijack any of the
//! above.
//!
//! It deliberately does *not* read evdev, run timers, or accelerate motion.
//! Those live in the surrounding device layer; the seams are:
//!
//! * you feed samples in via [`Touchpad::touch_down`], [`Touchpad::touch_motion`],
//!   [`Touchpad::touch_up`] and friends,
//! * you call [`Touchpad::handle_state`] and [`Touchpad::post_events`] once per
//!   sample, and [`Touchpad::end_frame`] when the sample is fully processed,
//! * you run motion through your acceleration profile by implementing
//!   [`MotionFilter`] (or use [`NoAcceleration`]),
//! * you drain the resulting [`GestureEvent`]s with [`Touchpad::take_events`],
//! * you watch [`Touchpad::switch_timer_deadline`] and call
//!   [`Touchpad::finger_count_switch_timeout`] from your event loop when it
//!   expires.
//!
//! All times are monotonic microseconds, supplied by the caller; the core
//! never looks at a clock.
//!
//! ```
//! use tpad::{DeviceConfig, NoAcceleration, ScrollMethod, Touchpad};
//! use tpmath::{device_pos, PhysVec, Resolution};
//!
//! let config = DeviceConfig {
//!     size_mm: PhysVec::new(100.0, 70.0),
//!     resolution: Resolution::new(10.0, 10.0),
//!     num_slots: 5,
//!     semi_mt: false,
//!     is_clickpad: true,
//!     scroll_method: ScrollMethod::TwoFinger,
//!     pressure_threshold: None,
//!     size_threshold: None,
//! };
//! let mut tp = Touchpad::new(config, Box::new(NoAcceleration::new(config.resolution)));
//!
//! tp.touch_down(0, device_pos(100, 100));
//! tp.touch_down(1, device_pos(300, 100));
//! tp.handle_state(0);
//! tp.post_events(0);
//! tp.end_frame();
//! assert!(tp.take_events().is_empty()); // two still fingers: nothing to say yet
//! ```
//!
//! ## Feature flags
#![cfg_attr(feature = "document-features", doc = document_features::document_features!())]
//!

mod device;
mod events;
mod gesture;
mod scroll;
mod thumb;
mod touch;
mod touchpad;

pub use {
    device::{Buttons, DeviceConfig, ScrollMethod},
    events::{GestureEvent, MotionFilter, NoAcceleration},
    thumb::ThumbState,
    touch::{Touch, TouchState},
    touchpad::Touchpad,
};
