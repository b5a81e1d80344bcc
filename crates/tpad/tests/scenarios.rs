//! End-to-end scenarios driving the public API the way a device dispatcher
//! would: feed touches, tick `handle_state`/`post_events`, advance the
//! frame, drain events.

use tpad::{
    DeviceConfig, GestureEvent, NoAcceleration, ScrollMethod, ThumbState, Touchpad,
};
use tpmath::{device_pos, PhysVec, Resolution};

/// A 100x100mm clickpad at 10 units/mm with 5 slots. Big enough for thumb
/// detection (thumb lines at y=850 and y=920).
fn pad_with(scroll_method: ScrollMethod, is_clickpad: bool) -> Touchpad {
    let config = DeviceConfig {
        size_mm: PhysVec::new(100.0, 100.0),
        resolution: Resolution::new(10.0, 10.0),
        num_slots: 5,
        semi_mt: false,
        is_clickpad,
        scroll_method,
        pressure_threshold: None,
        size_threshold: None,
    };
    Touchpad::new(config, Box::new(NoAcceleration::new(config.resolution)))
}

fn pad() -> Touchpad {
    pad_with(ScrollMethod::TwoFinger, true)
}

/// One sample tick.
fn frame(tp: &mut Touchpad, time: u64) -> Vec<GestureEvent> {
    tp.handle_state(time);
    tp.post_events(time);
    tp.end_frame();
    tp.take_events()
}

/// Every begin must be matched by exactly one end, with updates only in
/// between.
fn assert_balanced(events: &[GestureEvent]) {
    let mut swipe_open = 0i32;
    let mut pinch_open = 0i32;
    for ev in events {
        match *ev {
            GestureEvent::SwipeBegin { .. } => {
                assert_eq!(swipe_open, 0, "nested swipe begin");
                swipe_open += 1;
            }
            GestureEvent::SwipeUpdate { .. } => assert_eq!(swipe_open, 1, "update without begin"),
            GestureEvent::SwipeEnd { .. } => {
                assert_eq!(swipe_open, 1, "end without begin");
                swipe_open -= 1;
            }
            GestureEvent::PinchBegin { .. } => {
                assert_eq!(pinch_open, 0, "nested pinch begin");
                pinch_open += 1;
            }
            GestureEvent::PinchUpdate { .. } => assert_eq!(pinch_open, 1, "update without begin"),
            GestureEvent::PinchEnd { .. } => {
                assert_eq!(pinch_open, 1, "end without begin");
                pinch_open -= 1;
            }
            _ => {}
        }
    }
    assert_eq!(swipe_open, 0, "unterminated swipe");
    assert_eq!(pinch_open, 0, "unterminated pinch");
}

// ----------------------------------------------------------------------------

#[test]
fn two_finger_vertical_scroll() {
    let mut tp = pad();

    tp.touch_down(0, device_pos(100, 100));
    tp.touch_down(1, device_pos(300, 100));
    assert!(frame(&mut tp, 0).is_empty());

    // Still fingers decide for scroll after the decision timeout; the
    // sideways-drift lock pins x to zero.
    tp.touch_motion(0, device_pos(100, 120));
    tp.touch_motion(1, device_pos(300, 120));
    let events = frame(&mut tp, 160_000);
    assert_eq!(events.len(), 1);
    match events[0] {
        GestureEvent::ScrollMotion { delta, .. } => {
            assert!(delta.y > 0.0);
            assert_eq!(delta.x, 0.0);
        }
        ref other => panic!("expected scroll motion, got {other:?}"),
    }

    // The motion before the decision is not lost.
    assert!(tp.scroll_buildup().y > 0.0);

    // Lifting both fingers stops the scroll.
    tp.touch_up(0);
    tp.touch_up(1);
    frame(&mut tp, 170_000);
    let events = frame(&mut tp, 177_000);
    assert_eq!(events, vec![GestureEvent::ScrollStop { time: 177_000 }]);
}

#[test]
fn two_finger_pinch() {
    let mut tp = pad();
    let mut all = Vec::new();

    tp.touch_down(0, device_pos(100, 200));
    tp.touch_down(1, device_pos(300, 200));
    all.extend(frame(&mut tp, 0));

    // Fingers moving apart: diverging directions decide for pinch before
    // the timeout.
    tp.touch_motion(0, device_pos(90, 200));
    tp.touch_motion(1, device_pos(310, 200));
    all.extend(frame(&mut tp, 50_000));

    tp.touch_motion(0, device_pos(80, 200));
    tp.touch_motion(1, device_pos(320, 200));
    let events = frame(&mut tp, 160_000);
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        GestureEvent::PinchBegin {
            time: 160_000,
            fingers: 2
        }
    );
    match events[1] {
        GestureEvent::PinchUpdate {
            scale, angle_delta, ..
        } => {
            assert!(scale > 1.0);
            assert!(angle_delta.abs() < 1e-9);
        }
        ref other => panic!("expected pinch update, got {other:?}"),
    }
    all.extend(events);

    tp.touch_up(0);
    tp.touch_up(1);
    all.extend(frame(&mut tp, 170_000));
    let events = frame(&mut tp, 177_000);
    match events[..] {
        [GestureEvent::PinchEnd {
            cancelled, scale, ..
        }] => {
            assert!(!cancelled);
            assert!(scale > 1.0);
        }
        _ => panic!("expected pinch end, got {events:?}"),
    }
    all.extend(events);

    assert_balanced(&all);
}

#[test]
fn three_finger_swipe() {
    let mut tp = pad();
    let mut all = Vec::new();

    tp.touch_down(0, device_pos(100, 200));
    tp.touch_down(1, device_pos(300, 200));
    tp.touch_down(2, device_pos(500, 200));
    all.extend(frame(&mut tp, 0));

    tp.touch_motion(0, device_pos(150, 200));
    tp.touch_motion(1, device_pos(350, 200));
    tp.touch_motion(2, device_pos(550, 200));
    let events = frame(&mut tp, 50_000);
    assert_eq!(
        events[0],
        GestureEvent::SwipeBegin {
            time: 50_000,
            fingers: 3
        }
    );
    match events[1] {
        GestureEvent::SwipeUpdate { fingers, delta, .. } => {
            assert_eq!(fingers, 3);
            assert!(delta.x > 0.0);
            assert_eq!(delta.y, 0.0);
        }
        ref other => panic!("expected swipe update, got {other:?}"),
    }
    all.extend(events);

    tp.touch_up(0);
    tp.touch_up(1);
    tp.touch_up(2);
    all.extend(frame(&mut tp, 60_000));
    all.extend(frame(&mut tp, 67_000));
    assert!(all
        .iter()
        .any(|ev| matches!(ev, GestureEvent::SwipeEnd { cancelled: false, .. })));
    assert_balanced(&all);
}

/// A pad that only tracks two contacts. A third finger arrives as a fake
/// touch shadowing a real slot's position, so the finger count exceeds the
/// slot count.
fn two_slot_pad() -> Touchpad {
    let config = DeviceConfig {
        size_mm: PhysVec::new(100.0, 100.0),
        resolution: Resolution::new(10.0, 10.0),
        num_slots: 2,
        semi_mt: false,
        is_clickpad: true,
        scroll_method: ScrollMethod::TwoFinger,
        pressure_threshold: None,
        size_threshold: None,
    };
    Touchpad::new(config, Box::new(NoAcceleration::new(config.resolution)))
}

#[test]
fn fake_touches_swipe_instead_of_pinching_on_timeout() {
    let mut tp = two_slot_pad();
    tp.touch_down(0, device_pos(100, 200));
    tp.touch_down(1, device_pos(300, 500));
    tp.touch_down(2, device_pos(300, 500)); // fake, shadows slot 1
    assert!(frame(&mut tp, 0).is_empty());

    // One representative sits 30mm below the other, which on a full-mt pad
    // would read as a pinch posture at the decision timeout; with more
    // fingers than slots the position data is partly fake, so swipe.
    assert!(frame(&mut tp, 160_000).is_empty());

    tp.touch_motion(0, device_pos(140, 200));
    tp.touch_motion(1, device_pos(340, 500));
    tp.touch_motion(2, device_pos(340, 500));
    let events = frame(&mut tp, 167_000);
    assert_eq!(
        events[0],
        GestureEvent::SwipeBegin {
            time: 167_000,
            fingers: 3
        }
    );
    assert!(matches!(
        events[1],
        GestureEvent::SwipeUpdate { fingers: 3, .. }
    ));
}

#[test]
fn fake_touches_swipe_even_when_directions_diverge() {
    let mut tp = two_slot_pad();
    tp.touch_down(0, device_pos(100, 200));
    tp.touch_down(1, device_pos(300, 200));
    tp.touch_down(2, device_pos(300, 200)); // fake, shadows slot 1
    assert!(frame(&mut tp, 0).is_empty());

    // The representatives move apart, which on a full-mt pad diverges into
    // a pinch; with more fingers than slots that apparent divergence is
    // noise, so swipe.
    tp.touch_motion(0, device_pos(70, 200));
    tp.touch_motion(1, device_pos(330, 200));
    tp.touch_motion(2, device_pos(330, 200));
    let events = frame(&mut tp, 30_000);
    assert_eq!(
        events[0],
        GestureEvent::SwipeBegin {
            time: 30_000,
            fingers: 3
        }
    );
    match events[1] {
        GestureEvent::SwipeUpdate { fingers, delta, .. } => {
            assert_eq!(fingers, 3);
            assert!(delta.x > 0.0);
        }
        ref other => panic!("expected swipe update, got {other:?}"),
    }
}

/// Start a two-finger scroll and leave it running, fingers at y=120.
fn scrolling_pad() -> Touchpad {
    let mut tp = pad();
    tp.touch_down(0, device_pos(100, 100));
    tp.touch_down(1, device_pos(300, 100));
    frame(&mut tp, 0);
    tp.touch_motion(0, device_pos(100, 120));
    tp.touch_motion(1, device_pos(300, 120));
    let events = frame(&mut tp, 160_000);
    assert!(matches!(events[0], GestureEvent::ScrollMotion { .. }));
    tp
}

#[test]
fn finger_count_change_is_debounced() {
    // A transient third touch must not kill the scroll.
    let mut tp = scrolling_pad();

    tp.touch_down(2, device_pos(500, 300));
    assert!(frame(&mut tp, 200_000).is_empty());
    assert_eq!(tp.switch_timer_deadline(), Some(300_000));

    tp.touch_up(2);
    frame(&mut tp, 250_000);
    assert!(frame(&mut tp, 257_000).is_empty());

    // The stale timer fire is a no-op and the scroll keeps going.
    tp.finger_count_switch_timeout(300_000);
    assert!(tp.take_events().is_empty());

    tp.touch_motion(0, device_pos(100, 140));
    tp.touch_motion(1, device_pos(300, 140));
    let events = frame(&mut tp, 310_000);
    assert!(matches!(events[0], GestureEvent::ScrollMotion { .. }));
}

#[test]
fn persistent_third_finger_cancels_the_scroll() {
    let mut tp = scrolling_pad();

    tp.touch_down(2, device_pos(500, 300));
    assert!(frame(&mut tp, 200_000).is_empty());
    assert_eq!(tp.switch_timer_deadline(), Some(300_000));

    frame(&mut tp, 250_000);

    // Still three fingers when the timer fires: the scroll is cancelled
    // and the pending count takes over.
    tp.finger_count_switch_timeout(300_000);
    assert_eq!(
        tp.take_events(),
        vec![GestureEvent::ScrollStop { time: 300_000 }]
    );
    assert_eq!(tp.switch_timer_deadline(), None);

    // Three fingers moving together now swipe.
    let mut all = Vec::new();
    for (i, time) in [(1u64, 310_000u64), (2, 317_000), (3, 324_000)] {
        let i = i as i32;
        tp.touch_motion(0, device_pos(100 + 30 * i, 120));
        tp.touch_motion(1, device_pos(300 + 30 * i, 120));
        tp.touch_motion(2, device_pos(500 + 30 * i, 300));
        all.extend(frame(&mut tp, time));
    }
    assert!(all
        .iter()
        .any(|ev| matches!(ev, GestureEvent::SwipeBegin { fingers: 3, .. })));
}

#[test]
fn clickpad_button_forces_single_finger() {
    let mut tp = scrolling_pad();

    // The pad is physically clicked: the scroll dies instantly and the
    // touches steer the pointer with their combined motion.
    tp.buttons.state = true;
    tp.touch_motion(0, device_pos(110, 120));
    let events = frame(&mut tp, 200_000);
    assert_eq!(events[0], GestureEvent::ScrollStop { time: 200_000 });
    match events[1] {
        GestureEvent::PointerMotion { delta, .. } => assert!(delta.x > 0.0),
        ref other => panic!("expected pointer motion, got {other:?}"),
    }

    // Subsequent ticks emit pointer motion only.
    tp.touch_motion(0, device_pos(120, 120));
    tp.touch_motion(1, device_pos(310, 120));
    let events = frame(&mut tp, 207_000);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], GestureEvent::PointerMotion { .. }));
}

/// One finger mid-pad that has been moving fast, then a thumb plants
/// itself at the bottom edge right below it.
fn moving_finger_then_thumb(tp: &mut Touchpad) -> u64 {
    tp.touch_down(0, device_pos(200, 500));
    frame(tp, 0);
    let mut time = 0;
    for i in 1..=10 {
        time = i * 7_000;
        tp.touch_mut(0).speed_exceeded = 6;
        tp.touch_motion(0, device_pos(200 + 10 * i as i32, 500));
        frame(tp, time);
    }

    tp.touch_down(1, device_pos(200, 950));
    time += 7_000;
    frame(tp, time);
    time
}

#[test]
fn thumb_next_to_scroll_capable_finger_survives() {
    let mut tp = pad();
    let time = moving_finger_then_thumb(&mut tp);
    tp.take_events();

    // Close enough horizontally for a two-finger scroll: the new touch is
    // not suppressed and both fingers can scroll.
    assert!(!tp.thumb_ignored_for_gesture(tp.touch(1)));

    let mut scrolled = false;
    for i in 1..=30u64 {
        tp.touch_motion(0, device_pos(300, 500 - 15 * i as i32));
        tp.touch_motion(1, device_pos(200, 950 - 15 * i as i32));
        let events = frame(&mut tp, time + i * 7_000);
        scrolled |= events
            .iter()
            .any(|ev| matches!(ev, GestureEvent::ScrollMotion { .. }));
    }
    assert!(scrolled);
}

#[test]
fn thumb_next_to_fast_finger_is_suppressed_without_two_finger_scroll() {
    let mut tp = pad_with(ScrollMethod::Edge, true);
    let time = moving_finger_then_thumb(&mut tp);

    assert_eq!(tp.touch(1).thumb_state(), ThumbState::Suppressed);
    assert!(tp.thumb_ignored_for_gesture(tp.touch(1)));

    // No gesture forms around a suppressed thumb; the first finger keeps
    // driving the pointer.
    tp.touch_motion(0, device_pos(320, 500));
    let events = frame(&mut tp, time + 7_000);
    assert!(events
        .iter()
        .all(|ev| matches!(ev, GestureEvent::PointerMotion { .. })));
    assert!(!events.is_empty());
}

#[test]
fn speed_thumb_is_dead_when_detection_is_off() {
    // Not a clickpad: thumb detection never initializes, and the
    // speed-based verdict escalates straight to dead.
    let mut tp = pad_with(ScrollMethod::Edge, false);
    moving_finger_then_thumb(&mut tp);

    assert_eq!(tp.touch(1).thumb_state(), ThumbState::Dead);
}

#[test]
fn cancelled_and_completed_gestures_stay_balanced() {
    // Pinch cancelled by a clickpad click, then a clean swipe: every begin
    // pairs with exactly one end across the run.
    let mut tp = pad();
    let mut all = Vec::new();

    tp.touch_down(0, device_pos(100, 200));
    tp.touch_down(1, device_pos(300, 200));
    all.extend(frame(&mut tp, 0));
    tp.touch_motion(0, device_pos(80, 200));
    tp.touch_motion(1, device_pos(320, 200));
    all.extend(frame(&mut tp, 30_000));
    tp.touch_motion(0, device_pos(70, 200));
    tp.touch_motion(1, device_pos(330, 200));
    all.extend(frame(&mut tp, 37_000));
    assert!(all
        .iter()
        .any(|ev| matches!(ev, GestureEvent::PinchBegin { .. })));

    tp.buttons.state = true;
    all.extend(frame(&mut tp, 40_000));
    assert!(all
        .iter()
        .any(|ev| matches!(ev, GestureEvent::PinchEnd { cancelled: true, .. })));

    tp.buttons.state = false;
    tp.touch_up(0);
    tp.touch_up(1);
    all.extend(frame(&mut tp, 50_000));
    all.extend(frame(&mut tp, 57_000));

    tp.touch_down(0, device_pos(100, 200));
    tp.touch_down(1, device_pos(300, 200));
    tp.touch_down(2, device_pos(500, 200));
    all.extend(frame(&mut tp, 100_000));
    tp.touch_motion(0, device_pos(150, 200));
    tp.touch_motion(1, device_pos(350, 200));
    tp.touch_motion(2, device_pos(550, 200));
    all.extend(frame(&mut tp, 130_000));
    tp.touch_up(0);
    tp.touch_up(1);
    tp.touch_up(2);
    all.extend(frame(&mut tp, 140_000));
    all.extend(frame(&mut tp, 147_000));

    assert_balanced(&all);
}
