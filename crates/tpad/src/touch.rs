use tpmath::{DevicePos, DeviceVec};

use crate::thumb::{ThumbMeta, ThumbState};

/// Where one contact slot is in its lifecycle.
///
/// Only [`Begin`](Self::Begin), [`Update`](Self::Update) and
/// [`End`](Self::End) count as "down"; a touch's position is meaningless in
/// the other two states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TouchState {
    /// Slot is empty.
    #[default]
    None,

    /// The device senses a finger near the surface but not on it.
    Hovering,

    /// First sample of a new contact.
    Begin,

    /// Any sample after the first.
    Update,

    /// Last sample of a contact; the position is still valid.
    End,
}

impl TouchState {
    #[inline]
    pub fn is_down(self) -> bool {
        matches!(self, Self::Begin | Self::Update | Self::End)
    }
}

/// One contact slot.
///
/// The device layer owns `major`/`minor`/`pressure`/`speed_exceeded`/`palm`
/// and writes them freely (see [`Touchpad::touch_mut`]); everything else is
/// maintained by the [`Touchpad`] lifecycle methods.
///
/// [`Touchpad`]: crate::Touchpad
/// [`Touchpad::touch_mut`]: crate::Touchpad::touch_mut
#[derive(Clone, Debug)]
pub struct Touch {
    index: usize,
    pub(crate) state: TouchState,
    pub(crate) point: DevicePos,
    pub(crate) prev_point: DevicePos,
    pub(crate) dirty: bool,

    /// Major axis of the contact ellipse, in device units. 0 if the device
    /// doesn't report it.
    pub major: i32,

    /// Minor axis of the contact ellipse, in device units.
    pub minor: i32,

    /// Hardware pressure value. 0 if the device doesn't report it.
    pub pressure: i32,

    /// How many consecutive samples this contact has exceeded the speed
    /// threshold for. Maintained by the device layer's motion bookkeeping;
    /// reset when the contact begins, never decremented while it is down.
    pub speed_exceeded: u32,

    /// Set by external palm/button-area logic to take this touch out of
    /// consideration entirely.
    pub palm: bool,

    pub(crate) thumb: ThumbMeta,
    pub(crate) gesture_initial: DevicePos,
}

impl Touch {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            state: TouchState::None,
            point: DevicePos::ZERO,
            prev_point: DevicePos::ZERO,
            dirty: false,
            major: 0,
            minor: 0,
            pressure: 0,
            speed_exceeded: 0,
            palm: false,
            thumb: ThumbMeta {
                state: ThumbState::Live,
                initial: DevicePos::ZERO,
            },
            gesture_initial: DevicePos::ZERO,
        }
    }

    /// The slot id. Stable for the contact's lifetime.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn state(&self) -> TouchState {
        self.state
    }

    /// Current position. Only meaningful while [`TouchState::is_down`].
    #[inline]
    pub fn point(&self) -> DevicePos {
        self.point
    }

    #[inline]
    pub fn thumb_state(&self) -> ThumbState {
        self.thumb.state
    }

    /// Movement since the previous sample, zero if this touch didn't move
    /// this frame.
    #[inline]
    pub(crate) fn delta(&self) -> DeviceVec {
        if self.dirty {
            self.point - self.prev_point
        } else {
            DeviceVec::ZERO
        }
    }
}
