use tpmath::{PhysVec, Resolution};

/// Which scroll mechanism the user has configured for this device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ScrollMethod {
    NoScroll,
    Edge,
    #[default]
    TwoFinger,
    OnButtonDown,
}

/// Static description of the touchpad, resolved by the device layer before
/// the core is constructed.
///
/// The pressure and size thresholds come from per-device quirks; `None`
/// means the hardware doesn't report the axis (or no quirk is known) and
/// the corresponding thumb heuristic stays off.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DeviceConfig {
    /// Width and height of the pad surface.
    pub size_mm: PhysVec,

    /// Hardware units per millimetre, per axis.
    pub resolution: Resolution,

    /// How many independent contacts the hardware can track. Finger counts
    /// above this arrive as "fake" touches that shadow a real slot's
    /// position.
    pub num_slots: usize,

    /// Semi-mt devices report aggregate positions for all contacts. Too
    /// noisy for anything but two-finger scrolling.
    pub semi_mt: bool,

    /// The whole pad surface is the physical button.
    pub is_clickpad: bool,

    pub scroll_method: ScrollMethod,

    /// Pressure above this reading means thumb.
    pub pressure_threshold: Option<i32>,

    /// Contact-ellipse major axis above this (with a narrow minor axis)
    /// means thumb.
    pub size_threshold: Option<i32>,
}

/// Physical button state, updated by the device layer. The core only reads
/// it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Buttons {
    pub is_clickpad: bool,

    /// True while the physical button is held.
    pub state: bool,
}
