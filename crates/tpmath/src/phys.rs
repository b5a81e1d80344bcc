use std::ops::{Add, AddAssign, Mul, Sub};

use crate::device::{DevicePos, DeviceVec};

/// A displacement in millimetres.
///
/// Every threshold a human can feel (how far a finger moved, how far apart
/// two contacts are) is expressed in this space.
#[derive(Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PhysVec {
    pub x: f64,
    pub y: f64,
}

impl PhysVec {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline(always)]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline(always)]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl Add for PhysVec {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl AddAssign for PhysVec {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for PhysVec {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f64> for PhysVec {
    type Output = Self;

    #[inline(always)]
    fn mul(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

impl std::fmt::Debug for PhysVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.2}mm {:.2}mm]", self.x, self.y)
    }
}

// ----------------------------------------------------------------------------

/// Hardware units per millimetre, per axis.
///
/// Touchpads are rarely square: the two axes usually have different
/// resolutions, so a conversion must scale them independently.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Resolution {
    pub x: f64,
    pub y: f64,
}

impl Resolution {
    #[inline(always)]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// A float displacement in device units, converted to millimetres.
    #[inline]
    pub fn delta_to_mm(self, d: DeviceVec) -> PhysVec {
        PhysVec {
            x: d.x / self.x,
            y: d.y / self.y,
        }
    }

    /// An absolute position in device units, converted to millimetres from
    /// the top-left corner.
    #[inline]
    pub fn units_to_mm(self, p: DevicePos) -> PhysVec {
        PhysVec {
            x: p.x as f64 / self.x,
            y: p.y as f64 / self.y,
        }
    }

    /// Millimetres from the top-left corner, converted to device units.
    #[inline]
    pub fn mm_to_units(self, mm: PhysVec) -> DevicePos {
        DevicePos {
            x: (mm.x * self.x).round() as i32,
            y: (mm.y * self.y).round() as i32,
        }
    }
}

// ----------------------------------------------------------------------------

#[test]
fn test_resolution_round_trips() {
    // 20 units/mm horizontally, 15 vertically: a common anisotropic pad.
    let res = Resolution::new(20.0, 15.0);

    let mm = res.delta_to_mm(DeviceVec::new(40.0, 45.0));
    assert_eq!(mm, PhysVec::new(2.0, 3.0));
    assert_eq!(mm.length(), (4.0f64 + 9.0).sqrt());

    assert_eq!(
        res.mm_to_units(PhysVec::new(2.0, 3.0)),
        DevicePos::new(40, 45)
    );
    assert_eq!(
        res.units_to_mm(DevicePos::new(40, 45)),
        PhysVec::new(2.0, 3.0)
    );
}
