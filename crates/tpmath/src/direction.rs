use crate::phys::PhysVec;

/// One of eight 45° compass octants, with Y+ pointing down the pad:
/// [`Direction::N`] is a finger moving away from the user.
///
/// Used to compare the coarse headings of two contacts when deciding
/// whether they move together (scroll/swipe) or apart (pinch).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Direction {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl Direction {
    pub const ALL: [Self; 8] = [
        Self::N,
        Self::Ne,
        Self::E,
        Self::Se,
        Self::S,
        Self::Sw,
        Self::W,
        Self::Nw,
    ];

    #[inline]
    fn octant(self) -> u8 {
        match self {
            Self::N => 0,
            Self::Ne => 1,
            Self::E => 2,
            Self::Se => 3,
            Self::S => 4,
            Self::Sw => 5,
            Self::W => 6,
            Self::Nw => 7,
        }
    }

    /// Whether two directions are equal or one octant apart, including the
    /// wrap between the last and first octant.
    ///
    /// Semi-mt devices report aggregate positions noisy enough that two
    /// fingers moving N can come out as N and NE, so exact equality is too
    /// strict a test for "moving the same way".
    #[inline]
    pub fn same_or_neighbor(self, other: Self) -> bool {
        let d = (8 + self.octant() - other.octant()) % 8;
        d <= 1 || d == 7
    }
}

impl PhysVec {
    /// Quantize this displacement to the nearest compass octant.
    ///
    /// The caller is responsible for only asking once the displacement is
    /// long enough to carry a meaningful heading.
    pub fn direction(self) -> Direction {
        use std::f64::consts::FRAC_PI_4;

        // atan2 is 0 along +x and grows towards +y (down), so walk the
        // compass E → SE → S … for increasing angle.
        const COMPASS: [Direction; 8] = [
            Direction::E,
            Direction::Se,
            Direction::S,
            Direction::Sw,
            Direction::W,
            Direction::Nw,
            Direction::N,
            Direction::Ne,
        ];

        let angle = self.y.atan2(self.x);
        let octant = (angle / FRAC_PI_4).round() as i32;
        COMPASS[octant.rem_euclid(8) as usize]
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantization() {
        assert_eq!(PhysVec::new(1.0, 0.0).direction(), Direction::E);
        assert_eq!(PhysVec::new(1.0, 1.0).direction(), Direction::Se);
        assert_eq!(PhysVec::new(0.0, 1.0).direction(), Direction::S);
        assert_eq!(PhysVec::new(-1.0, 1.0).direction(), Direction::Sw);
        assert_eq!(PhysVec::new(-1.0, 0.0).direction(), Direction::W);
        assert_eq!(PhysVec::new(-1.0, -1.0).direction(), Direction::Nw);
        assert_eq!(PhysVec::new(0.0, -1.0).direction(), Direction::N);
        assert_eq!(PhysVec::new(1.0, -1.0).direction(), Direction::Ne);

        // Just off-axis rounds to the nearest octant.
        assert_eq!(PhysVec::new(10.0, 1.0).direction(), Direction::E);
        assert_eq!(PhysVec::new(10.0, -1.0).direction(), Direction::E);
    }

    #[test]
    fn neighbor_tolerance_is_reflexive_and_symmetric() {
        for a in Direction::ALL {
            assert!(a.same_or_neighbor(a));
            for b in Direction::ALL {
                assert_eq!(a.same_or_neighbor(b), b.same_or_neighbor(a));
            }
        }
    }

    #[test]
    fn neighbor_tolerance_wraps() {
        assert!(Direction::N.same_or_neighbor(Direction::Nw));
        assert!(Direction::Nw.same_or_neighbor(Direction::N));
        assert!(Direction::N.same_or_neighbor(Direction::Ne));
        assert!(!Direction::N.same_or_neighbor(Direction::E));
        assert!(!Direction::N.same_or_neighbor(Direction::S));
        assert!(!Direction::Se.same_or_neighbor(Direction::Sw));
    }
}
