//! End-to-end controller scenarios on a virtual clock.
//!
//! These walk whole command sequences and assert the exact presses and
//! sleeps that reach the (mocked) remote, which is the only observable
//! surface the real hardware has.

use std::sync::Arc;
use std::time::Duration;

use shutterlink::shutter::{Controller, ControllerProfile, ShutterProfile};

use crate::mock_hw::{presses, recording_pins, PressLog, RecordingPin, VirtualClock};

fn timer_controller() -> (Controller<RecordingPin, Arc<VirtualClock>>, PressLog, Arc<VirtualClock>) {
    let (pins, log) = recording_pins();
    let clock = Arc::new(VirtualClock::default());
    let controller = Controller::new(ControllerProfile::timer_8k(), Arc::clone(&clock), pins);
    (controller, log, clock)
}

#[test]
fn command_walks_selection_then_repeats_send() {
    let (controller, log, clock) = timer_controller();

    controller.roll_down(3).unwrap();

    // Three forward steps from the boot assumption (channel 0), then the
    // doubled command press. Fresh boot counts as display-awake, so no
    // wake press appears.
    assert_eq!(presses(&log), vec!["next", "next", "next", "down", "down"]);
    assert_eq!(controller.selected_channel(), 3);
    // Each step is recovery + hold (30ms each); the send presses hold
    // 2500ms with a 750ms pause between the repeats.
    assert_eq!(
        clock.sleeps(),
        vec![30, 30, 30, 30, 30, 30, 2_500, 750, 2_500]
    );
}

#[test]
fn selection_takes_the_shorter_backward_path() {
    let (controller, log, _clock) = timer_controller();

    controller.roll_stop(5).unwrap();

    // 5 of 8 forward is 3 backward.
    assert_eq!(presses(&log), vec!["prev", "prev", "prev", "stop", "stop"]);
    assert_eq!(controller.selected_channel(), 5);
}

#[test]
fn exactly_half_distance_steps_forward() {
    let (controller, log, _clock) = timer_controller();

    controller.roll_up(4).unwrap();

    assert_eq!(presses(&log), vec!["next", "next", "next", "next", "up", "up"]);
    assert_eq!(controller.selected_channel(), 4);
}

#[test]
fn ambiguous_display_window_waits_until_certainly_asleep() {
    let (controller, log, clock) = timer_controller();

    // 3000ms since the last press: inside [2000, 4500), ambiguous.
    clock.advance(3_000);
    controller.roll_down(1).unwrap();

    // First the 1500ms wait out to selection_active_max, then the wake
    // press (30ms hold), then the stepping press.
    assert_eq!(clock.sleeps()[0], 1_500);
    assert_eq!(presses(&log), vec!["next", "next", "down", "down"]);
    assert_eq!(controller.selected_channel(), 1);
}

#[test]
fn asleep_display_wakes_without_waiting() {
    let (controller, log, clock) = timer_controller();

    clock.advance(10_000);
    controller.roll_down(1).unwrap();

    // Straight into the wake press: the first sleep is its 30ms hold.
    assert_eq!(clock.sleeps()[0], 30);
    assert_eq!(presses(&log), vec!["next", "next", "down", "down"]);
}

#[test]
fn timed_hold_counts_press_overhead_against_the_deadline() {
    let (controller, log, clock) = timer_controller();

    controller.roll_down_for(1, Duration::from_millis(10_000)).unwrap();

    // Selection (30 + 30) and the send sequence (2500 + 750 + 2500)
    // consume 5810ms of the hold, leaving a 4190ms wait to the deadline.
    assert!(clock.sleeps().contains(&4_190));
    assert_eq!(
        presses(&log),
        vec!["next", "down", "down", "stop", "stop"]
    );
    // Stop presses start exactly at the 10s mark.
    assert_eq!(clock.now_ms(), 10_000 + 2_500 + 750 + 2_500);
}

#[test]
fn fully_open_references_the_top() {
    let (controller, log, clock) = timer_controller();
    let shutter = ShutterProfile {
        index: 0,
        total_travel_time: Duration::from_secs(20),
    };

    controller.roll_to(shutter, 0.0).unwrap();

    // Up to the reference point, one full traversal wait, then a
    // zero-length down hold that stops immediately.
    assert_eq!(
        presses(&log),
        vec!["up", "up", "down", "down", "stop", "stop"]
    );
    assert!(clock.sleeps().contains(&20_000));
}

#[test]
fn below_half_travels_from_the_top() {
    let (controller, log, _clock) = timer_controller();
    let shutter = ShutterProfile {
        index: 0,
        total_travel_time: Duration::from_secs(20),
    };

    controller.roll_to(shutter, 0.25).unwrap();

    let log = presses(&log);
    assert_eq!(&log[..2], &["up", "up"]);
    assert_eq!(&log[2..4], &["down", "down"]);
    assert_eq!(&log[4..], &["stop", "stop"]);
}

#[test]
fn above_half_travels_from_the_bottom() {
    let (controller, log, clock) = timer_controller();
    let shutter = ShutterProfile {
        index: 2,
        total_travel_time: Duration::from_secs(20),
    };

    controller.roll_to(shutter, 0.75).unwrap();

    let log = presses(&log);
    // Selection steps first, then the bottom reference.
    assert_eq!(&log[..2], &["next", "next"]);
    assert_eq!(&log[2..4], &["down", "down"]);
    assert_eq!(&log[4..6], &["up", "up"]);
    assert_eq!(&log[6..], &["stop", "stop"]);
    assert!(clock.sleeps().contains(&20_000));
}

#[test]
fn restored_selection_shortens_the_walk() {
    let (controller, log, _clock) = timer_controller();

    controller.restore_selection(3).unwrap();
    controller.roll_up(4).unwrap();

    assert_eq!(presses(&log), vec!["next", "up", "up"]);
}
