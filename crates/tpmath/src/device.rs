use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// The position of one contact, in integer hardware units.
///
/// This is what the device reports for a slot. Subtracting two positions
/// yields a [`DeviceVec`].
#[derive(Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DevicePos {
    pub x: i32,
    pub y: i32,
}

/// `device_pos(x, y) == DevicePos::new(x, y)`
#[inline(always)]
pub const fn device_pos(x: i32, y: i32) -> DevicePos {
    DevicePos { x, y }
}

impl DevicePos {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    #[inline(always)]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Midpoint between two positions, as a float vector.
    ///
    /// Used for e.g. the center of a pinch, which lands between hardware
    /// units for contacts an odd number of units apart.
    #[inline]
    pub fn midpoint(self, other: Self) -> DeviceVec {
        DeviceVec {
            x: (self.x as f64 + other.x as f64) / 2.0,
            y: (self.y as f64 + other.y as f64) / 2.0,
        }
    }
}

impl Sub for DevicePos {
    type Output = DeviceVec;

    #[inline(always)]
    fn sub(self, rhs: Self) -> DeviceVec {
        DeviceVec {
            x: (self.x - rhs.x) as f64,
            y: (self.y - rhs.y) as f64,
        }
    }
}

impl std::fmt::Debug for DevicePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} {}]", self.x, self.y)
    }
}

// ----------------------------------------------------------------------------

/// A displacement (or interpolated point) in device units, as floats.
///
/// Sums and averages of integer deltas do not stay integral, so everything
/// derived from [`DevicePos`] arithmetic lives here.
#[derive(Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DeviceVec {
    pub x: f64,
    pub y: f64,
}

/// `device_vec(x, y) == DeviceVec::new(x, y)`
#[inline(always)]
pub const fn device_vec(x: f64, y: f64) -> DeviceVec {
    DeviceVec { x, y }
}

impl DeviceVec {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline(always)]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Exactly zero on both axes. Deliberately not an epsilon test: a delta
    /// that survived filtering is worth emitting however small it is.
    #[inline(always)]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    #[inline(always)]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl Add for DeviceVec {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl AddAssign for DeviceVec {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for DeviceVec {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Neg for DeviceVec {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl Mul<f64> for DeviceVec {
    type Output = Self;

    #[inline(always)]
    fn mul(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

impl Div<f64> for DeviceVec {
    type Output = Self;

    #[inline(always)]
    fn div(self, factor: f64) -> Self {
        Self {
            x: self.x / factor,
            y: self.y / factor,
        }
    }
}

impl std::fmt::Debug for DeviceVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.1} {:.1}]", self.x, self.y)
    }
}

// ----------------------------------------------------------------------------

#[test]
fn test_device_arithmetic() {
    let a = device_pos(100, 200);
    let b = device_pos(40, 260);

    assert_eq!(a - b, device_vec(60.0, -60.0));
    assert_eq!(a.midpoint(b), device_vec(70.0, 230.0));
    assert_eq!(a.midpoint(device_pos(101, 200)), device_vec(100.5, 200.0));

    let d = device_vec(3.0, 4.0);
    assert_eq!(d.length(), 5.0);
    assert!(!d.is_zero());
    assert!((d - d).is_zero());
    assert_eq!(d * 2.0, device_vec(6.0, 8.0));
    assert_eq!(d / 2.0, device_vec(1.5, 2.0));
}
