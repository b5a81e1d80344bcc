use tpmath::{DeviceVec, NormVec, Resolution};

/// A semantic event produced by the core, queued on the [`Touchpad`] and
/// drained by the caller after each sample.
///
/// `delta` values are accelerated and in normalized space; `unaccel` values
/// carry the same motion without acceleration for consumers that want the
/// raw trajectory. All times are the caller's monotonic microseconds.
///
/// [`Touchpad`]: crate::Touchpad
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum GestureEvent {
    PointerMotion {
        time: u64,
        delta: NormVec,
        /// Raw delta scaled to the x-axis resolution, so both axes are in
        /// comparable units.
        unaccel: DeviceVec,
    },

    /// Two-finger scroll motion. Scrolling has no begin event; the first
    /// motion is the beginning.
    ScrollMotion { time: u64, delta: NormVec },

    /// The two-finger scroll ended; consumers stop any kinetic scrolling.
    ScrollStop { time: u64 },

    SwipeBegin {
        time: u64,
        fingers: u32,
    },
    SwipeUpdate {
        time: u64,
        fingers: u32,
        delta: NormVec,
        unaccel: NormVec,
    },
    SwipeEnd {
        time: u64,
        fingers: u32,
        cancelled: bool,
    },

    PinchBegin {
        time: u64,
        fingers: u32,
    },
    PinchUpdate {
        time: u64,
        fingers: u32,
        delta: NormVec,
        unaccel: NormVec,
        /// Contact separation relative to where the pinch started.
        scale: f64,
        /// Rotation since the previous update, in degrees.
        angle_delta: f64,
    },
    PinchEnd {
        time: u64,
        fingers: u32,
        /// The last scale that was reported.
        scale: f64,
        cancelled: bool,
    },
}

/// The acceleration seam.
///
/// The device layer owns the pointer-acceleration profile; the core hands
/// it raw device-unit deltas and gets normalized deltas back. Implementors
/// typically keep velocity state, hence `&mut self` and the timestamp.
pub trait MotionFilter {
    /// Accelerated delta for pointer motion, swipes and pinches.
    fn filter(&mut self, raw: DeviceVec, time: u64) -> NormVec;

    /// Unaccelerated delta. Scrolling uses this so content tracks the
    /// fingers 1:1.
    fn filter_unaccelerated(&mut self, raw: DeviceVec, time: u64) -> NormVec;
}

/// A [`MotionFilter`] that only normalizes by resolution.
///
/// Useful in tests and for integrations that apply their own acceleration
/// downstream.
#[derive(Clone, Copy, Debug)]
pub struct NoAcceleration {
    resolution: Resolution,
}

impl NoAcceleration {
    pub fn new(resolution: Resolution) -> Self {
        Self { resolution }
    }
}

impl MotionFilter for NoAcceleration {
    fn filter(&mut self, raw: DeviceVec, _time: u64) -> NormVec {
        NormVec::from_mm(self.resolution.delta_to_mm(raw))
    }

    fn filter_unaccelerated(&mut self, raw: DeviceVec, _time: u64) -> NormVec {
        NormVec::from_mm(self.resolution.delta_to_mm(raw))
    }
}
