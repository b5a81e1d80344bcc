//! Typed 2D math for touchpad input processing.
//!
//! A touchpad sample passes through three coordinate spaces on its way to an
//! emitted event, and mixing them up is the classic way to get a subtly wrong
//! scroll speed. This crate gives each space its own type:
//!
//! * [`DevicePos`] / [`DeviceVec`] — raw hardware units, what the device reports.
//! * [`PhysVec`] — millimetres, used for every human-scale threshold.
//! * [`NormVec`] — resolution-independent units, what motion filters consume.
//!
//! Conversions go through [`Resolution`] (hardware units per millimetre,
//! per axis — touchpads are rarely square).
//!
//! Conventions (unless otherwise specified):
//!
//! * X+ is right and Y+ is down.
//! * (0,0) is the top-left corner of the pad.
//! * Angles are in degrees where they face an API, radians internally.
//!
//! ## Feature flags
#![cfg_attr(feature = "document-features", doc = document_features::document_features!())]
//!

#![allow(clippy::float_cmp)]

mod device;
mod direction;
mod normalized;
mod phys;

pub use {
    device::{device_pos, device_vec, DevicePos, DeviceVec},
    direction::Direction,
    normalized::{NormVec, NORMALIZED_UNITS_PER_MM},
    phys::{PhysVec, Resolution},
};
