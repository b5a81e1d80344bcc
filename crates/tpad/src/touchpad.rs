use tpmath::{DevicePos, DeviceVec, NormVec};

use crate::device::{Buttons, DeviceConfig};
use crate::events::{GestureEvent, MotionFilter};
use crate::gesture::{GestureState, SWITCH_TIMEOUT};
use crate::thumb::{ThumbDetect, ThumbState};
use crate::touch::{Touch, TouchState};

/// The largest finger count hardware reports via fake touches
/// (BTN_TOOL_QUINTTAP), whatever the real slot count is.
const MAX_FAKE_FINGERS: usize = 5;

/// A one-shot deadline. The core never looks at a clock: it arms the
/// deadline, the surrounding event loop watches it and calls the matching
/// timeout entry point when it expires.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Timer {
    deadline: Option<u64>,
}

impl Timer {
    pub(crate) fn set(&mut self, deadline: u64) {
        self.deadline = Some(deadline);
    }

    pub(crate) fn cancel(&mut self) {
        self.deadline = None;
    }

    pub(crate) fn deadline(&self) -> Option<u64> {
        self.deadline
    }
}

/// The touchpad input-processing core.
///
/// Owns the per-slot touches, the gesture recognizer and the thumb
/// classifier. See the [crate docs](crate) for the per-sample calling
/// protocol.
pub struct Touchpad {
    pub(crate) config: DeviceConfig,

    /// Physical button state; written by the device layer, read here.
    pub buttons: Buttons,

    /// True while the tap state machine is in a tap-and-drag; written by
    /// the external tap module. Forces single-finger interpretation.
    pub tap_dragging: bool,

    pub(crate) touches: Vec<Touch>,
    pub(crate) gesture: GestureState,
    pub(crate) thumb: ThumbDetect,
    pub(crate) filter: Box<dyn MotionFilter>,

    /// Scroll motion accumulated before the scroll was recognized, handed
    /// to the scroll consumer so slow scroll starts aren't swallowed.
    pub(crate) scroll_buildup: NormVec,

    events: Vec<GestureEvent>,
    queued_motion: bool,
}

impl Touchpad {
    pub fn new(config: DeviceConfig, filter: Box<dyn MotionFilter>) -> Self {
        let ntouches = config.num_slots.max(MAX_FAKE_FINGERS);
        let touches = (0..ntouches).map(Touch::new).collect();

        // Two-finger scrolling is always available; this flag decides
        // whether we detect swipes and pinches. Semi-mt devices are too
        // unreliable for those.
        let enabled = !config.semi_mt && config.num_slots > 1;

        let thumb = ThumbDetect::new(&config, enabled);

        Self {
            config,
            buttons: Buttons {
                is_clickpad: config.is_clickpad,
                state: false,
            },
            tap_dragging: false,
            touches,
            gesture: GestureState::new(enabled),
            thumb,
            filter,
            scroll_buildup: NormVec::ZERO,
            events: Vec::new(),
            queued_motion: false,
        }
    }

    // ------------------------------------------------------------------------
    // Sample input, fed by the device layer.

    /// A new contact in `slot`. Resets the touch's per-contact state.
    pub fn touch_down(&mut self, slot: usize, point: DevicePos) {
        let t = &mut self.touches[slot];
        t.state = TouchState::Begin;
        t.point = point;
        t.prev_point = point;
        t.dirty = true;
        t.major = 0;
        t.minor = 0;
        t.pressure = 0;
        t.speed_exceeded = 0;
        t.palm = false;
        t.thumb.state = ThumbState::Live;
        t.thumb.initial = point;
        t.gesture_initial = point;
    }

    /// The contact in `slot` moved this sample.
    pub fn touch_motion(&mut self, slot: usize, point: DevicePos) {
        let t = &mut self.touches[slot];
        t.prev_point = t.point;
        t.point = point;
        t.dirty = true;
        self.queued_motion = true;
    }

    /// The contact in `slot` lifted. Its position stays valid for this
    /// sample.
    pub fn touch_up(&mut self, slot: usize) {
        let t = &mut self.touches[slot];
        t.state = TouchState::End;
        t.dirty = true;
    }

    /// The device senses a finger hovering over `slot` without contact.
    pub fn touch_hover(&mut self, slot: usize, point: DevicePos) {
        let t = &mut self.touches[slot];
        t.state = TouchState::Hovering;
        t.point = point;
        t.prev_point = point;
    }

    pub fn touch(&self, slot: usize) -> &Touch {
        &self.touches[slot]
    }

    /// Mutable access for the device layer to keep pressure, contact size,
    /// the speed-exceeded counter and the palm flag up to date.
    pub fn touch_mut(&mut self, slot: usize) -> &mut Touch {
        &mut self.touches[slot]
    }

    pub fn touches(&self) -> &[Touch] {
        &self.touches
    }

    /// Number of touches currently on the pad (including those ending this
    /// sample).
    pub fn num_fingers_down(&self) -> usize {
        self.touches.iter().filter(|t| t.state.is_down()).count()
    }

    /// Advance touch lifecycles after a fully processed sample:
    /// begins become updates, ended touches free their slot.
    pub fn end_frame(&mut self) {
        for t in &mut self.touches {
            match t.state {
                TouchState::Begin => t.state = TouchState::Update,
                TouchState::End => t.state = TouchState::None,
                TouchState::None | TouchState::Hovering | TouchState::Update => {}
            }
            t.prev_point = t.point;
            t.dirty = false;
        }
        self.queued_motion = false;
    }

    // ------------------------------------------------------------------------
    // Touch view.

    /// Down, not a palm, and not a pointer-suppressed thumb.
    pub(crate) fn is_touch_active(&self, t: &Touch) -> bool {
        t.state().is_down() && !t.palm && !self.thumb_ignored_for_pointer(t)
    }

    /// Down, not a palm, and not a gesture-suppressed thumb. Jailed
    /// touches stay in: a jailed thumb may not move the pointer but can
    /// still be half of a scroll.
    pub(crate) fn is_touch_active_for_gesture(&self, t: &Touch) -> bool {
        t.state().is_down() && !t.palm && !self.thumb_ignored_for_gesture(t)
    }

    fn touches_delta(&self, average: bool, for_gesture: bool) -> DeviceVec {
        let mut delta = DeviceVec::ZERO;
        let mut nactive = 0;

        for t in &self.touches {
            let active = if for_gesture {
                self.is_touch_active_for_gesture(t)
            } else {
                self.is_touch_active(t)
            };
            if !active {
                continue;
            }

            nactive += 1;
            delta += t.delta();
        }

        if !average || nactive == 0 {
            delta
        } else {
            delta / nactive as f64
        }
    }

    /// Sum of all active touches' motion this sample.
    pub(crate) fn combined_delta(&self) -> DeviceVec {
        self.touches_delta(false, false)
    }

    /// Average motion of the active touches this sample.
    pub(crate) fn average_delta(&self) -> DeviceVec {
        self.touches_delta(true, false)
    }

    /// Average motion of the touches participating in the gesture.
    pub(crate) fn average_gesture_delta(&self) -> DeviceVec {
        self.touches_delta(true, true)
    }

    // ------------------------------------------------------------------------
    // Per-sample entry points.

    /// Run the thumb classifier and the finger-count debounce for this
    /// sample. Call after the touch state has been fed in, before
    /// [`Self::post_events`].
    pub fn handle_state(&mut self, time: u64) {
        for slot in 0..self.touches.len() {
            if self.touches[slot].state.is_down() {
                self.thumb_update_touch(slot);
            }
        }
        if self.num_fingers_down() == 0 {
            self.thumb_reset();
        } else {
            self.thumb_update_by_context();
        }

        let active_touches = self
            .touches
            .iter()
            .filter(|t| self.is_touch_active_for_gesture(t))
            .count();

        if active_touches != self.gesture.finger_count {
            // All fingers lifted: end the gesture right away.
            if active_touches == 0 {
                self.stop(time);
                self.gesture.finger_count = 0;
                self.gesture.finger_count_pending = 0;
            // Nothing started yet: switch immediately, no initial latency.
            } else if !self.gesture.started {
                self.gesture.finger_count = active_touches;
                self.gesture.finger_count_pending = 0;
            // A gesture is running: debounce the change.
            } else if active_touches != self.gesture.finger_count_pending {
                self.gesture.finger_count_pending = active_touches;
                self.gesture.switch_timer.set(time + SWITCH_TIMEOUT);
            }
        } else {
            self.gesture.finger_count_pending = 0;
        }
    }

    /// Run the recognizer and queue the events for this sample. Call after
    /// [`Self::handle_state`].
    pub fn post_events(&mut self, time: u64) {
        if self.gesture.finger_count == 0 {
            return;
        }

        // Tap-and-drag and a clicked clickpad both force single-finger
        // interpretation, whatever the contact count says.
        if self.tap_dragging || (self.buttons.is_clickpad && self.buttons.state) {
            self.cancel(time);
            self.gesture.finger_count = 1;
            self.gesture.finger_count_pending = 0;
        }

        // Don't send events while we're unsure which mode we're in.
        if self.gesture.finger_count_pending != 0 {
            return;
        }

        match self.gesture.finger_count {
            1 => {
                if self.queued_motion {
                    self.post_pointer_motion(time);
                }
            }
            2..=4 => self.post_gesture(time),
            _ => {}
        }
    }

    // ------------------------------------------------------------------------
    // Output.

    pub(crate) fn push_event(&mut self, event: GestureEvent) {
        self.events.push(event);
    }

    /// Drain the events queued since the last call.
    pub fn take_events(&mut self) -> Vec<GestureEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[GestureEvent] {
        &self.events
    }

    /// Scroll displacement that accumulated before the scroll was
    /// recognized; the scroll consumer folds this into its first motion.
    pub fn scroll_buildup(&self) -> NormVec {
        self.scroll_buildup
    }

    /// When armed, the event loop must call
    /// [`Self::finger_count_switch_timeout`] once this (µs) timestamp
    /// passes.
    pub fn switch_timer_deadline(&self) -> Option<u64> {
        self.gesture.switch_timer.deadline()
    }
}

// ----------------------------------------------------------------------------
