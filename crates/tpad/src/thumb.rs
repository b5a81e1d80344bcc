use tpmath::{device_vec, DevicePos, PhysVec};

use crate::device::{DeviceConfig, ScrollMethod};
use crate::touch::{Touch, TouchState};
use crate::touchpad::Touchpad;

/// Per-touch thumb classification.
///
/// Every contact starts [`Live`](Self::Live) and moves through these states
/// as evidence accumulates. The predicates on [`Touchpad`] translate a
/// state into whether the touch may drive the pointer, participate in a
/// gesture, count for tapping, and so on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ThumbState {
    /// A proven finger.
    Live,

    /// In the thumb region and unproven: pointer motion is withheld until
    /// the touch behaves like a finger.
    Jailed,

    /// Was resting near its landing spot when another touch arrived; most
    /// likely the lower half of a pinch, and still allowed to drive one.
    Pinch,

    /// Judged to be a thumb by speed or context. Out of pointer motion and
    /// tapping, but a gesture may still carry it.
    Suppressed,

    /// A formerly suppressed touch, left as the only contact and given a
    /// second chance.
    Revived,

    /// Revived, but still inside the thumb region.
    RevJailed,

    /// Hard-suppressed in every role.
    Dead,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ThumbMeta {
    pub(crate) state: ThumbState,

    /// Position captured when the touch entered its current resting state;
    /// re-captured on revival. Movement is measured against this.
    pub(crate) initial: DevicePos,
}

/// Device-wide thumb-detection state and thresholds.
pub(crate) struct ThumbDetect {
    pub(crate) detect_thumbs: bool,

    /// Cleared as soon as any contact breaks the speed threshold; pinches
    /// are off the table until every finger lifts.
    pub(crate) pinch_eligible: bool,

    /// Y coordinate (device units) at 85% of the pad height. Pressure-based
    /// thumb detection applies below this line.
    pub(crate) upper_thumb_line: i32,

    /// Y coordinate at 92% of the pad height. Lingering below this line is
    /// thumb-like on its own.
    pub(crate) lower_thumb_line: i32,

    pub(crate) pressure_threshold: Option<i32>,
    pub(crate) size_threshold: Option<i32>,
}

impl ThumbDetect {
    pub(crate) fn new(config: &DeviceConfig, gestures_enabled: bool) -> Self {
        let mut thumb = Self {
            detect_thumbs: false,
            pinch_eligible: gestures_enabled,
            upper_thumb_line: 0,
            lower_thumb_line: 0,
            pressure_threshold: None,
            size_threshold: None,
        };

        if !config.is_clickpad {
            return thumb;
        }

        // A pad under 50mm tall is too small to meaningfully hold a thumb
        // while the fingers work above it.
        if config.size_mm.y < 50.0 {
            return thumb;
        }

        thumb.detect_thumbs = true;
        thumb.upper_thumb_line = config
            .resolution
            .mm_to_units(PhysVec::new(0.0, config.size_mm.y * 0.85))
            .y;
        thumb.lower_thumb_line = config
            .resolution
            .mm_to_units(PhysVec::new(0.0, config.size_mm.y * 0.92))
            .y;
        thumb.pressure_threshold = config.pressure_threshold;
        thumb.size_threshold = config.size_threshold;

        log::debug!(
            "thumb: enabled thumb detection{}{}",
            if thumb.pressure_threshold.is_some() {
                " (+pressure)"
            } else {
                ""
            },
            if thumb.size_threshold.is_some() {
                " (+size)"
            } else {
                ""
            },
        );

        thumb
    }
}

impl Touchpad {
    /// Whether this touch may not drive pointer motion.
    pub fn thumb_ignored_for_pointer(&self, t: &Touch) -> bool {
        self.thumb.detect_thumbs
            && matches!(
                t.thumb.state,
                ThumbState::Jailed
                    | ThumbState::Pinch
                    | ThumbState::Suppressed
                    | ThumbState::RevJailed
                    | ThumbState::Dead
            )
    }

    /// Whether this touch may not participate in a gesture.
    pub fn thumb_ignored_for_gesture(&self, t: &Touch) -> bool {
        matches!(t.thumb.state, ThumbState::Suppressed | ThumbState::Dead)
    }

    /// Whether this touch may not count towards a tap.
    pub fn thumb_ignored_for_tap(&self, t: &Touch) -> bool {
        matches!(
            t.thumb.state,
            ThumbState::Pinch | ThumbState::Suppressed | ThumbState::Dead
        )
    }

    /// Whether this touch may not count towards clickfinger button
    /// emulation.
    pub fn thumb_ignored_for_clickfinger(&self, t: &Touch) -> bool {
        matches!(t.thumb.state, ThumbState::Suppressed | ThumbState::Dead)
    }

    /// Whether this touch may not start edge scrolling.
    pub fn thumb_ignored_for_edge_scroll(&self, t: &Touch) -> bool {
        self.thumb_ignored_for_tap(t)
    }

    fn thumb_hw_says_finger(&self, t: &Touch) -> bool {
        // Size detection is reliable even at the edge of the touchpad: if
        // the contact isn't a long narrow ellipse, it's a finger.
        if let Some(threshold) = self.thumb.size_threshold {
            if !(t.major > threshold && (t.minor as f64) < threshold as f64 * 0.6) {
                return true;
            }
        }

        // Pressure is not reliable at the edges; only trust it above the
        // lower thumb line.
        if let Some(threshold) = self.thumb.pressure_threshold {
            if t.pressure <= threshold && t.point.y < self.thumb.lower_thumb_line {
                return true;
            }
        }

        // Either there is no hardware to confirm this is a finger, or the
        // hardware says thumb.
        false
    }

    fn thumb_needs_jail(&self, t: &Touch) -> bool {
        if t.point.y < self.thumb.upper_thumb_line {
            return false;
        }
        if t.point.y < self.thumb.lower_thumb_line && self.thumb_hw_says_finger(t) {
            return false;
        }
        if t.speed_exceeded >= 10 {
            return false;
        }

        true
    }

    pub(crate) fn thumb_set_state(&mut self, slot: usize, state: ThumbState) {
        let old = self.touches[slot].thumb.state;
        if old != state {
            log::debug!("thumb state: touch {slot}, {old:?} -> {state:?}");
        }
        self.touches[slot].thumb.state = state;
    }

    /// Mark a touch as a thumb. A touch that was already suppressed once
    /// (or revived) goes to [`ThumbState::Dead`] instead.
    pub(crate) fn thumb_suppress(&mut self, slot: usize) {
        let state = match self.touches[slot].thumb.state {
            ThumbState::Live | ThumbState::Jailed | ThumbState::Pinch => ThumbState::Suppressed,
            ThumbState::Suppressed
            | ThumbState::Revived
            | ThumbState::RevJailed
            | ThumbState::Dead => ThumbState::Dead,
        };
        self.thumb_set_state(slot, state);
    }

    pub(crate) fn thumb_reset(&mut self) {
        self.thumb.pinch_eligible = self.gesture.enabled;
    }

    /// Per-touch update, run for every down touch on every sample. With
    /// more than one finger down the context update owns the transitions.
    pub(crate) fn thumb_update_touch(&mut self, slot: usize) {
        if !self.thumb.detect_thumbs {
            return;
        }

        // Once any touch exceeds the speed threshold, stop offering pinch
        // until all touches lift. An already-running pinch is unaffected.
        if self.touches[slot].speed_exceeded >= 10 && self.thumb.pinch_eligible {
            log::debug!("thumb: touch {slot} broke the speed threshold, pinch disabled");
            self.thumb.pinch_eligible = false;
        }

        if self.num_fingers_down() > 1 {
            return;
        }

        let needs_jail = self.thumb_needs_jail(&self.touches[slot]);
        let state = self.touches[slot].thumb.state;

        // A new touch lingering below the lower thumb line, or below the
        // upper line without hardware vouching for it, starts jailed.
        if self.touches[slot].state == TouchState::Begin && needs_jail {
            self.thumb_set_state(slot, ThumbState::Jailed);
            return;
        }

        // Breaking the speed threshold or leaving the thumb area escapes
        // jail.
        if state == ThumbState::Jailed && !needs_jail {
            self.thumb_set_state(slot, ThumbState::Live);
        }
        if state == ThumbState::RevJailed && !needs_jail {
            self.thumb_set_state(slot, ThumbState::Revived);
        }
    }

    /// Context update: with several fingers down, the relative geometry of
    /// the contacts decides who is a thumb.
    pub(crate) fn thumb_update_by_context(&mut self) {
        let nfingers = self.num_fingers_down();

        if nfingers == 1 {
            // A suppressed touch left as the only contact gets re-evaluated.
            if let Some(slot) = self.touches.iter().position(|t| t.state.is_down()) {
                if self.touches[slot].thumb.state == ThumbState::Suppressed {
                    let needs_jail = self.thumb_needs_jail(&self.touches[slot]);
                    self.touches[slot].thumb.initial = self.touches[slot].point;
                    self.thumb_set_state(
                        slot,
                        if needs_jail {
                            ThumbState::RevJailed
                        } else {
                            ThumbState::Revived
                        },
                    );
                }
            }
            return;
        }
        if nfingers < 2 {
            return;
        }

        // Bottom-most and second-bottom-most touches, the newest touch (if
        // one began this sample), and the fastest speed seen.
        let mut first: Option<usize> = None;
        let mut second: Option<usize> = None;
        let mut newest: Option<usize> = None;
        let mut max_speed = 0;
        for (i, t) in self.touches.iter().enumerate() {
            if !t.state.is_down() {
                continue;
            }
            if t.state == TouchState::Begin {
                newest = Some(i);
            }
            max_speed = max_speed.max(t.speed_exceeded);
            match first {
                None => first = Some(i),
                Some(f) if t.point.y > self.touches[f].point.y => {
                    second = first;
                    first = Some(i);
                }
                Some(_) => match second {
                    None => second = Some(i),
                    Some(s) if t.point.y > self.touches[s].point.y => second = Some(i),
                    Some(_) => {}
                },
            }
        }
        let (Some(first), Some(second)) = (first, second) else {
            return;
        };

        let distance_mm = {
            let fp = self.touches[first].point;
            let sp = self.touches[second].point;
            let d = device_vec(
                (fp.x - sp.x).abs() as f64,
                (fp.y - sp.y).abs() as f64,
            );
            self.config.resolution.delta_to_mm(d)
        };
        let close = distance_mm.x <= 35.0 && distance_mm.y <= 25.0;

        // A touch landing next to one that is already moving fast is a
        // thumb planted for a click, unless the pair is close enough
        // together to be a two-finger scroll.
        if let Some(newest) = newest {
            if nfingers == 2
                && max_speed > 5
                && (self.config.scroll_method != ScrollMethod::TwoFinger
                    || (distance_mm.x >= 35.0 && distance_mm.y >= 25.0))
            {
                log::debug!("thumb: touch {newest} is a speed-based thumb");
                if self.thumb.detect_thumbs {
                    self.thumb_suppress(newest);
                } else {
                    self.thumb_set_state(newest, ThumbState::Dead);
                }
                return;
            }
        }

        if !self.thumb.detect_thumbs {
            return;
        }

        // Two touches together at the bottom edge are a two-finger gesture,
        // not a thumb: let them all go live so the gesture starts without
        // jail latency.
        if newest.is_some()
            && self.touches[first].point.y > self.thumb.upper_thumb_line
            && self.touches[second].point.y > self.thumb.upper_thumb_line
            && close
        {
            if let Some(newest) = newest {
                self.thumb_set_state(newest, ThumbState::Live);
            }
            self.thumb_set_state(first, ThumbState::Live);
            self.thumb_set_state(second, ThumbState::Live);
            return;
        }

        // Otherwise the bottom-most touch is the suspect.
        match self.touches[first].thumb.state {
            ThumbState::Live | ThumbState::Jailed => {
                if !close {
                    let moved = {
                        let t = &self.touches[first];
                        self.config
                            .resolution
                            .delta_to_mm(t.point - t.thumb.initial)
                            .length()
                    };
                    if moved < 2.0 {
                        // Resting where it landed while another finger
                        // works: the lower half of a pinch.
                        self.thumb_set_state(first, ThumbState::Pinch);
                    } else {
                        self.thumb_suppress(first);
                    }
                }
            }
            ThumbState::Revived | ThumbState::RevJailed => {
                if !close {
                    self.thumb_set_state(first, ThumbState::Dead);
                }
            }
            ThumbState::Pinch | ThumbState::Suppressed | ThumbState::Dead => {}
        }
    }

    /// Called by the recognizer once per tick while a gesture is in flight.
    ///
    /// If one representative sits still while the other moves fast, the
    /// physically lower one is a thumb that hijacked the gesture. Returns
    /// true when a representative was suppressed; the recognizer cancels
    /// the gesture in response.
    pub(crate) fn thumb_update_during_gesture(&mut self) -> bool {
        if !self.thumb.detect_thumbs {
            return false;
        }
        let Some([left, right]) = self.gesture.pair else {
            return false;
        };

        let moved = |t: &Touch| {
            self.config
                .resolution
                .delta_to_mm(t.point - t.gesture_initial)
                .length()
        };
        let moved_left = moved(&self.touches[left]);
        let moved_right = moved(&self.touches[right]);

        let moving = if moved_left <= 2.0 && moved_right > 2.0 {
            right
        } else if moved_right <= 2.0 && moved_left > 2.0 {
            left
        } else {
            return false;
        };
        if self.touches[moving].speed_exceeded <= 5 {
            return false;
        }

        // The lower of the two starting points is the thumb.
        let lower =
            if self.touches[left].gesture_initial.y >= self.touches[right].gesture_initial.y {
                left
            } else {
                right
            };
        self.thumb_suppress(lower);
        true
    }
}

// ----------------------------------------------------------------------------
