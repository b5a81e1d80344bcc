use tpmath::{device_vec, DeviceVec, Direction, NormVec};

use crate::device::ScrollMethod;
use crate::events::GestureEvent;
use crate::scroll::ScrollAxisFilter;
use crate::touchpad::{Timer, Touchpad};

/// Debounce window for finger-count changes while a gesture is running.
pub(crate) const SWITCH_TIMEOUT: u64 = 100_000; // µs

/// How long two or more still fingers may sit before we commit to an
/// interpretation anyway.
const DECISION_TIMEOUT: u64 = 150_000; // µs

/// The recognizer's phase, with the scratch state that only exists in that
/// phase carried as payload: a scroll owns its axis lock, a pinch its
/// reference frame.
#[derive(Clone, Copy, Debug)]
pub(crate) enum GesturePhase {
    None,
    Unknown { initial_time: u64 },
    Scroll { filter: ScrollAxisFilter },
    Swipe,
    Pinch { geom: PinchGeometry },
}

impl GesturePhase {
    fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Unknown { .. } => "unknown",
            Self::Scroll { .. } => "scroll",
            Self::Swipe => "swipe",
            Self::Pinch { .. } => "pinch",
        }
    }
}

/// The reference frame a pinch is measured against.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PinchGeometry {
    /// Normalized distance between the representatives when the pinch
    /// started; scale is relative to this.
    pub(crate) initial_distance: f64,

    /// Orientation of the representative pair at the previous update,
    /// in degrees.
    pub(crate) angle: f64,

    /// Midpoint of the representative pair at the previous update.
    pub(crate) center: DeviceVec,

    pub(crate) prev_scale: f64,
}

pub(crate) struct GestureState {
    /// Whether gesture detection (swipe/pinch) runs at all. Two-finger
    /// scrolling works regardless; semi-mt devices are too unreliable for
    /// anything more.
    pub(crate) enabled: bool,

    pub(crate) phase: GesturePhase,

    /// Whether the begin event for the current gesture went out.
    pub(crate) started: bool,

    pub(crate) finger_count: usize,
    pub(crate) finger_count_pending: usize,

    /// The two contacts carrying the gesture's geometry: both contacts for
    /// two fingers, the left- and right-most for more.
    pub(crate) pair: Option<[usize; 2]>,

    pub(crate) switch_timer: Timer,
}

impl GestureState {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            phase: GesturePhase::None,
            started: false,
            finger_count: 0,
            finger_count_pending: 0,
            pair: None,
            switch_timer: Timer::default(),
        }
    }
}

impl Touchpad {
    /// Emit the begin event for the current gesture, exactly once per
    /// gesture. Scrolls have no begin event.
    fn gesture_start(&mut self, time: u64) {
        if self.gesture.started {
            return;
        }

        let fingers = self.gesture.finger_count as u32;
        match self.gesture.phase {
            GesturePhase::None | GesturePhase::Unknown { .. } => {
                log::error!("gesture start in unknown gesture mode");
                self.gesture.phase = GesturePhase::None;
                self.gesture.pair = None;
                return;
            }
            GesturePhase::Scroll { .. } => {}
            GesturePhase::Swipe => {
                self.push_event(GestureEvent::SwipeBegin { time, fingers });
            }
            GesturePhase::Pinch { .. } => {
                self.push_event(GestureEvent::PinchBegin { time, fingers });
            }
        }

        self.gesture.started = true;
    }

    fn gesture_end(&mut self, time: u64, cancelled: bool) {
        let phase = std::mem::replace(&mut self.gesture.phase, GesturePhase::None);
        self.gesture.pair = None;

        if !self.gesture.started {
            return;
        }

        let fingers = self.gesture.finger_count as u32;
        match phase {
            GesturePhase::None | GesturePhase::Unknown { .. } => {
                log::error!("gesture end in unknown gesture mode");
            }
            GesturePhase::Scroll { .. } => self.stop_twofinger_scroll(time),
            GesturePhase::Swipe => {
                self.push_event(GestureEvent::SwipeEnd {
                    time,
                    fingers,
                    cancelled,
                });
            }
            GesturePhase::Pinch { geom } => {
                self.push_event(GestureEvent::PinchEnd {
                    time,
                    fingers,
                    scale: geom.prev_scale,
                    cancelled,
                });
            }
        }

        self.gesture.started = false;
    }

    /// End the current gesture, marking it as cancelled.
    pub fn cancel(&mut self, time: u64) {
        self.gesture_end(time, true);
    }

    /// End the current gesture normally.
    pub fn stop(&mut self, time: u64) {
        self.gesture_end(time, false);
    }

    fn stop_twofinger_scroll(&mut self, time: u64) {
        if self.config.scroll_method != ScrollMethod::TwoFinger {
            return;
        }
        self.push_event(GestureEvent::ScrollStop { time });
    }

    /// Heading of a touch's displacement since it entered the gesture, or
    /// `None` if it hasn't moved far enough to have one. The required
    /// distance grows with the finger count: more fingers drag each other
    /// around.
    fn gesture_direction(&self, slot: usize, nfingers: usize) -> Option<Direction> {
        let move_threshold = 1.0 * (nfingers - 1) as f64; // mm

        let t = &self.touches[slot];
        let mm = self
            .config
            .resolution
            .delta_to_mm(t.point - t.gesture_initial);

        if mm.length() < move_threshold {
            None
        } else {
            Some(mm.direction())
        }
    }

    fn pinch_info(&self, first: usize, second: usize) -> (f64, f64, DeviceVec) {
        let fp = self.touches[first].point;
        let sp = self.touches[second].point;

        let normalized = self.normalize_delta(fp - sp);
        let distance = normalized.length();
        let angle = normalized.y.atan2(normalized.x).to_degrees();
        let center = fp.midpoint(sp);

        (distance, angle, center)
    }

    fn init_pinch(&self, first: usize, second: usize) -> PinchGeometry {
        let (initial_distance, angle, center) = self.pinch_info(first, second);
        PinchGeometry {
            initial_distance,
            angle,
            center,
            prev_scale: 1.0,
        }
    }

    /// Scrolling that happened before the decision point shouldn't be lost:
    /// hand the accumulated displacement to the scroll consumer as buildup.
    fn set_scroll_buildup(&mut self, first: usize, second: usize) {
        let d0 = self.touches[first].point - self.touches[first].gesture_initial;
        let d1 = self.touches[second].point - self.touches[second].gesture_initial;

        self.scroll_buildup = self.normalize_delta((d0 + d1) / 2.0);
    }

    fn handle_none(&mut self, time: u64) -> GesturePhase {
        self.gesture.pair = None;

        let mut slots = [0usize; 4];
        let mut ntouches = 0;
        for (i, t) in self.touches.iter().enumerate() {
            if self.is_touch_active_for_gesture(t) {
                slots[ntouches] = i;
                ntouches += 1;
                if ntouches == slots.len() {
                    break;
                }
            }
        }
        if ntouches < 2 {
            return GesturePhase::None;
        }

        if !self.gesture.enabled {
            // Gesture detection off (semi-mt): two fingers can still
            // scroll, anything else stays unclassified.
            return if ntouches == 2 {
                GesturePhase::Scroll {
                    filter: ScrollAxisFilter::new(),
                }
            } else {
                GesturePhase::None
            };
        }

        let mut first = slots[0];
        let mut second = slots[1];

        // For 3+ fingers we cheat. A hand's fingers sit roughly in a
        // horizontal row and move together, so the left- and right-most
        // contacts carry all the geometry we need; for a pinch the thumb
        // sits below that row and again one of the extremes is the thumb.
        // Fake touches shadow a real touch's position, so only real slots
        // are considered.
        if ntouches > 2 {
            second = slots[0];
            for i in 1..ntouches.min(self.config.num_slots) {
                let slot = slots[i];
                if self.touches[slot].point.x < self.touches[first].point.x {
                    first = slot;
                } else if self.touches[slot].point.x > self.touches[second].point.x {
                    second = slot;
                }
            }

            if first == second {
                return GesturePhase::None;
            }
        }

        let p = self.touches[first].point;
        self.touches[first].gesture_initial = p;
        let p = self.touches[second].point;
        self.touches[second].gesture_initial = p;
        self.gesture.pair = Some([first, second]);

        GesturePhase::Unknown { initial_time: time }
    }

    fn handle_unknown(&mut self, time: u64) -> GesturePhase {
        let GesturePhase::Unknown { initial_time } = self.gesture.phase else {
            return self.gesture.phase;
        };
        let Some([first, second]) = self.gesture.pair else {
            // Degenerate geometry; start over.
            return GesturePhase::None;
        };

        let fingers = self.gesture.finger_count;
        let fp = self.touches[first].point;
        let sp = self.touches[second].point;
        let separation_mm = self.config.resolution.delta_to_mm(device_vec(
            (fp.x - sp.x).abs() as f64,
            (fp.y - sp.y).abs() as f64,
        ));

        if time > initial_time + DECISION_TIMEOUT {
            // Fingers held still long enough imply intent: two fingers are
            // a (slow) scroll.
            if fingers == 2 {
                self.set_scroll_buildup(first, second);
                return GesturePhase::Scroll {
                    filter: ScrollAxisFilter::new(),
                };
            }
            // More fingers than slots: position data is partly fake, never
            // try to pinch on it.
            if fingers > self.config.num_slots {
                return GesturePhase::Swipe;
            }

            // One finger well below the others is a thumb+fingers pinch
            // posture.
            if separation_mm.y > 20.0 && self.gesture.enabled && self.thumb.pinch_eligible {
                let geom = self.init_pinch(first, second);
                return GesturePhase::Pinch { geom };
            }
            return GesturePhase::Swipe;
        }

        // Otherwise wait for both representatives to have moved.
        let dir1 = self.gesture_direction(first, fingers);
        let dir2 = self.gesture_direction(second, fingers);
        let (Some(dir1), Some(dir2)) = (dir1, dir2) else {
            return GesturePhase::Unknown { initial_time };
        };

        if fingers > self.config.num_slots || dir1.same_or_neighbor(dir2) {
            // Moving the same way: scroll or swipe.
            if fingers == 2 {
                self.set_scroll_buildup(first, second);
                GesturePhase::Scroll {
                    filter: ScrollAxisFilter::new(),
                }
            } else {
                GesturePhase::Swipe
            }
        } else if self.gesture.enabled && self.thumb.pinch_eligible {
            let geom = self.init_pinch(first, second);
            GesturePhase::Pinch { geom }
        } else if fingers == 2 {
            // Diverging directions but pinch is off the table; treat it as
            // a sloppy scroll rather than staying undecided forever.
            self.set_scroll_buildup(first, second);
            GesturePhase::Scroll {
                filter: ScrollAxisFilter::new(),
            }
        } else {
            GesturePhase::Swipe
        }
    }

    fn handle_scroll(&mut self, time: u64) {
        // Other scroll methods still consume the touches, they just don't
        // emit from here.
        if self.config.scroll_method != ScrollMethod::TwoFinger {
            return;
        }

        let raw = self.average_gesture_delta();

        let GesturePhase::Scroll { mut filter } = self.gesture.phase else {
            return;
        };
        let constrained = filter.constrain(raw, self.config.resolution, time);
        self.gesture.phase = GesturePhase::Scroll { filter };

        // Scrolling is not accelerated.
        let delta = self.filter.filter_unaccelerated(constrained, time);
        if delta.is_zero() {
            return;
        }

        self.gesture_start(time);
        self.push_event(GestureEvent::ScrollMotion { time, delta });
    }

    fn handle_swipe(&mut self, time: u64) {
        let raw = self.average_gesture_delta();
        let delta = self.filter.filter(raw, time);

        if !delta.is_zero() || !raw.is_zero() {
            let unaccel = self.normalize_delta(raw);
            self.gesture_start(time);
            self.push_event(GestureEvent::SwipeUpdate {
                time,
                fingers: self.gesture.finger_count as u32,
                delta,
                unaccel,
            });
        }
    }

    fn handle_pinch(&mut self, time: u64) {
        let GesturePhase::Pinch { mut geom } = self.gesture.phase else {
            return;
        };
        let Some([first, second]) = self.gesture.pair else {
            log::error!("pinch without representative touches");
            self.gesture.phase = GesturePhase::None;
            self.gesture.started = false;
            return;
        };

        let (distance, angle, center) = self.pinch_info(first, second);

        let scale = distance / geom.initial_distance;

        let mut angle_delta = angle - geom.angle;
        geom.angle = angle;
        if angle_delta > 180.0 {
            angle_delta -= 360.0;
        } else if angle_delta < -180.0 {
            angle_delta += 360.0;
        }

        let fdelta = center - geom.center;
        geom.center = center;

        let delta = self.filter.filter(fdelta, time);

        if delta.is_zero() && fdelta.is_zero() && scale == geom.prev_scale && angle_delta == 0.0 {
            self.gesture.phase = GesturePhase::Pinch { geom };
            return;
        }

        let unaccel = self.normalize_delta(fdelta);
        self.gesture_start(time);
        self.push_event(GestureEvent::PinchUpdate {
            time,
            fingers: self.gesture.finger_count as u32,
            delta,
            unaccel,
            scale,
            angle_delta,
        });

        geom.prev_scale = scale;
        self.gesture.phase = GesturePhase::Pinch { geom };
    }

    pub(crate) fn post_gesture(&mut self, time: u64) {
        let oldstate = self.gesture.phase.label();

        // A thumb can hijack a gesture in flight; if one of the
        // representatives turns out to be one, throw the gesture away and
        // re-decide with what's left.
        if !matches!(self.gesture.phase, GesturePhase::None)
            && self.thumb_update_during_gesture()
        {
            self.cancel(time);
        }

        if matches!(self.gesture.phase, GesturePhase::None) {
            self.gesture.phase = self.handle_none(time);
        }
        if matches!(self.gesture.phase, GesturePhase::Unknown { .. }) {
            self.gesture.phase = self.handle_unknown(time);
        }
        if matches!(self.gesture.phase, GesturePhase::Scroll { .. }) {
            self.handle_scroll(time);
        }
        if matches!(self.gesture.phase, GesturePhase::Swipe) {
            self.handle_swipe(time);
        }
        if matches!(self.gesture.phase, GesturePhase::Pinch { .. }) {
            self.handle_pinch(time);
        }

        let newstate = self.gesture.phase.label();
        if oldstate != newstate {
            log::trace!("gesture state: {oldstate} -> {newstate}");
        }
    }

    pub(crate) fn post_pointer_motion(&mut self, time: u64) {
        // When a clickpad is clicked, combine the motion of all active
        // touches: users shift their grip while holding the pad down.
        let raw = if self.buttons.is_clickpad && self.buttons.state {
            self.combined_delta()
        } else {
            self.average_delta()
        };

        let delta = self.filter.filter(raw, time);

        if !delta.is_zero() || !raw.is_zero() {
            let unaccel = self.scale_to_xaxis(raw);
            self.push_event(GestureEvent::PointerMotion {
                time,
                delta,
                unaccel,
            });
        }
    }

    /// The finger-count switch timer fired. Safe to call with a stale
    /// deadline: if nothing is pending anymore this is a no-op.
    pub fn finger_count_switch_timeout(&mut self, now: u64) {
        self.gesture.switch_timer.cancel();

        if self.gesture.finger_count_pending == 0 {
            return;
        }

        self.cancel(now);
        self.gesture.finger_count = self.gesture.finger_count_pending;
        self.gesture.finger_count_pending = 0;
    }

    pub(crate) fn normalize_delta(&self, delta: DeviceVec) -> NormVec {
        NormVec::from_mm(self.config.resolution.delta_to_mm(delta))
    }

    /// Scale the y axis to the x axis resolution so both components of an
    /// unaccelerated delta are in comparable units.
    pub(crate) fn scale_to_xaxis(&self, delta: DeviceVec) -> DeviceVec {
        device_vec(
            delta.x,
            delta.y * self.config.resolution.x / self.config.resolution.y,
        )
    }
}
