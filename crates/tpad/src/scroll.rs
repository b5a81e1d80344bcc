use tpmath::{DeviceVec, PhysVec, Resolution};

const ACTIVE_THRESHOLD: u64 = 100_000; // µs
const INACTIVE_THRESHOLD: u64 = 50_000;
const EVENT_TIMEOUT: u64 = 100_000;

const INITIAL_HORIZ_THRESHOLD: f64 = 0.15; // mm
const INITIAL_VERT_THRESHOLD: f64 = 0.10;

/// Axis lock for two-finger scrolling.
///
/// Fingers dragging down a pad drift sideways, so an unconstrained scroll
/// wanders. This filter keeps a decaying mm-space window of recent motion
/// and only unlocks an axis once the gesture has spent enough time moving
/// along it; the locked axis is zeroed out of every outgoing delta. A
/// sufficiently long, clearly diagonal stroke unlocks both axes for the
/// rest of the gesture.
///
/// One instance lives inside the recognizer's scroll state, created fresh
/// every time a scroll starts.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ScrollAxisFilter {
    active_horiz: bool,
    active_vert: bool,

    /// Decayed displacement window, in mm.
    vector: PhysVec,

    /// Timestamp of the previous sample, 0 before the first.
    time_prev: u64,

    /// Time the gesture has spent moving primarily along each axis,
    /// clamped to `ACTIVE_THRESHOLD`.
    duration_horiz: u64,
    duration_vert: u64,
}

impl ScrollAxisFilter {
    pub(crate) fn new() -> Self {
        Self {
            active_horiz: false,
            active_vert: false,
            vector: PhysVec::ZERO,
            time_prev: 0,
            duration_horiz: 0,
            duration_vert: 0,
        }
    }

    /// Feed one raw delta through the lock; returns the delta with the
    /// suppressed axis (if any) zeroed.
    pub(crate) fn constrain(
        &mut self,
        mut rdelta: DeviceVec,
        resolution: Resolution,
        time: u64,
    ) -> DeviceVec {
        debug_assert!(
            self.time_prev == 0 || time >= self.time_prev,
            "time shouldn't move backwards"
        );

        // Both axes active means free scrolling for the rest of the gesture.
        if self.active_horiz && self.active_vert {
            return rdelta;
        }

        let mut elapsed = 0;
        if self.time_prev != 0 {
            elapsed = time.saturating_sub(self.time_prev);
        }
        if elapsed > EVENT_TIMEOUT {
            elapsed = 0;
        }
        self.time_prev = time;

        let delta_mm = resolution.delta_to_mm(rdelta);

        // Old vector data fades over time. Two-part linear approximation of
        // an exponential: for EVENT_TIMEOUT of 100ms this tracks
        // 0.97^elapsed_ms closely enough, and keeps the timeout tweakable.
        let vector_decay = if elapsed > 0 {
            let recent =
                ((EVENT_TIMEOUT as f64 / 2.0) - elapsed as f64) / (EVENT_TIMEOUT as f64 / 2.0);
            let later = (EVENT_TIMEOUT as f64 - elapsed as f64) / EVENT_TIMEOUT as f64;
            if elapsed as f64 <= 0.33 * EVENT_TIMEOUT as f64 {
                recent
            } else {
                later
            }
        } else {
            0.0
        };

        let vector = self.vector * vector_decay + delta_mm;
        let vector_length = vector.length();
        self.vector = vector;

        // If we haven't already, determine active axes
        if !self.active_horiz && !self.active_vert {
            self.active_horiz = vector.x > INITIAL_HORIZ_THRESHOLD;
            self.active_vert = vector.y > INITIAL_VERT_THRESHOLD;
        }

        // We care somewhat about distance and speed, but more about
        // consistency of direction over time. Track the time spent primarily
        // along each axis; time spent barely moving in the other axis is
        // subtracted, allowing an axis switch within a single scroll.
        //
        // Slope 3.73 - inf.: 75°+, nearly vertical
        // Slope 1.73 - 3.73: 60°+, generally vertical
        // Slope 0.57 - 1.73: 30°+, generally diagonal
        // Slope 0.27 - 0.57: 15°+, generally horizontal
        // Slope 0.00 - 0.27:  0°+, nearly horizontal
        let slope = if vector.x != 0.0 {
            (vector.y / vector.x).abs()
        } else {
            f64::INFINITY
        };

        // Only once the vector is large enough to be confident of direction
        if vector_length > 0.15 {
            if slope >= 0.57 {
                self.duration_vert = (self.duration_vert + elapsed).min(ACTIVE_THRESHOLD);
                if slope >= 3.73 {
                    self.duration_horiz = self.duration_horiz.saturating_sub(elapsed);
                }
            }
            if slope < 1.73 {
                self.duration_horiz = (self.duration_horiz + elapsed).min(ACTIVE_THRESHOLD);
                if slope < 0.27 {
                    self.duration_vert = self.duration_vert.saturating_sub(elapsed);
                }
            }
        }

        if self.duration_horiz == ACTIVE_THRESHOLD {
            self.active_horiz = true;
            if self.duration_vert < INACTIVE_THRESHOLD {
                self.active_vert = false;
            }
        }
        if self.duration_vert == ACTIVE_THRESHOLD {
            self.active_vert = true;
            if self.duration_horiz < INACTIVE_THRESHOLD {
                self.active_horiz = false;
            }
        }

        // A large vector in a diagonal direction unlocks both axes
        // regardless of the duration thresholds.
        if vector_length > 5.0 && slope < 1.73 && slope >= 0.57 {
            self.active_vert = true;
            self.active_horiz = true;
        }

        if !self.active_horiz && self.active_vert {
            rdelta.x = 0.0;
        }
        if self.active_horiz && !self.active_vert {
            rdelta.y = 0.0;
        }

        rdelta
    }

    #[cfg(test)]
    fn active_axes(&self) -> (bool, bool) {
        (self.active_horiz, self.active_vert)
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tpmath::device_vec;

    const RES: Resolution = Resolution::new(10.0, 10.0);

    #[test]
    fn vertical_scroll_locks_horizontal() {
        let mut f = ScrollAxisFilter::new();

        // 2mm straight down: vertical unlocks immediately, horizontal stays
        // locked, and sideways drift is zeroed.
        let out = f.constrain(device_vec(0.0, 20.0), RES, 0);
        assert_eq!(out, device_vec(0.0, 20.0));
        assert_eq!(f.active_axes(), (false, true));

        let out = f.constrain(device_vec(3.0, 20.0), RES, 7_000);
        assert_eq!(out.x, 0.0);
        assert_eq!(out.y, 20.0);
    }

    #[test]
    fn sustained_horizontal_switches_axes() {
        let mut f = ScrollAxisFilter::new();

        // Start vertical.
        f.constrain(device_vec(0.0, 20.0), RES, 0);
        assert_eq!(f.active_axes(), (false, true));

        // Move horizontally long enough to accumulate the active threshold;
        // the vertical axis has no accumulated time and gets kicked out.
        let out = f.constrain(device_vec(20.0, 0.0), RES, 50_000);
        assert_eq!(out, device_vec(0.0, 0.0)); // still locked out
        let out = f.constrain(device_vec(20.0, 0.0), RES, 100_000);
        assert_eq!(out, device_vec(20.0, 0.0));
        assert_eq!(f.active_axes(), (true, false));
    }

    #[test]
    fn long_diagonal_unlocks_both_axes() {
        let mut f = ScrollAxisFilter::new();

        f.constrain(device_vec(0.0, 20.0), RES, 0);
        assert_eq!(f.active_axes(), (false, true));

        // A >5mm stroke at ~35° breaks out into free scrolling.
        let out = f.constrain(device_vec(55.0, 35.0), RES, 33_000);
        assert_eq!(out, device_vec(55.0, 35.0));
        assert_eq!(f.active_axes(), (true, true));

        // From here on input passes through untouched.
        let out = f.constrain(device_vec(-3.0, 8.0), RES, 40_000);
        assert_eq!(out, device_vec(-3.0, 8.0));
    }

    #[test]
    fn tiny_motion_unlocks_nothing() {
        let mut f = ScrollAxisFilter::new();

        // 0.05mm: below both initial thresholds, everything suppressed.
        let out = f.constrain(device_vec(0.5, 0.5), RES, 0);
        assert_eq!(f.active_axes(), (false, false));
        assert_eq!(out, device_vec(0.5, 0.5)); // neither axis active: passthrough
    }

    #[test]
    fn stale_history_decays_away() {
        let mut f = ScrollAxisFilter::new();
        f.constrain(device_vec(0.0, 20.0), RES, 0);
        assert_eq!(f.vector, PhysVec::new(0.0, 2.0));

        // More than EVENT_TIMEOUT later the old vector is treated as gone:
        // the decayed window restarts from this sample alone, and no
        // duration is accumulated for the gap.
        f.constrain(device_vec(4.0, 0.0), RES, 500_000);
        assert_eq!(f.vector, PhysVec::new(0.4, 0.0));
        assert_eq!(f.duration_horiz, 0);
        assert_eq!(f.active_axes(), (false, true)); // vert still active from start
    }
}
