//! Command routing across a multi-controller bank.

use std::sync::Arc;
use std::time::Duration;

use shutterlink::dispatch::{decode_command, Action, AssumedState, Command, ControllerBank};
use shutterlink::error::CommandError;
use shutterlink::shutter::{Controller, ControllerProfile};

use crate::mock_hw::{presses, recording_pins, PressLog, RecordingPin, VirtualClock};

/// An 8-channel and a 4-channel controller sharing one flat index space:
/// shutters 0-7 live on the first, 8-11 on the second.
fn test_bank() -> (ControllerBank<RecordingPin, Arc<VirtualClock>>, PressLog, PressLog) {
    let clock = Arc::new(VirtualClock::default());

    let (pins_a, log_a) = recording_pins();
    let first = Controller::new(ControllerProfile::timer_8k(), Arc::clone(&clock), pins_a);

    let (pins_b, log_b) = recording_pins();
    let small_profile = ControllerProfile::new(
        4,
        Duration::from_millis(30),
        Duration::from_millis(2_000),
        Duration::from_millis(4_500),
    );
    let second = Controller::new(small_profile, Arc::clone(&clock), pins_b);

    let bank = ControllerBank::new(vec![first, second], Duration::from_secs(20));
    (bank, log_a, log_b)
}

#[test]
fn counts_shutters_across_controllers() {
    let (bank, _, _) = test_bank();
    assert_eq!(bank.total_shutters(), 12);
}

#[test]
fn global_index_lands_on_the_right_controller() {
    let (bank, log_a, log_b) = test_bank();

    let state = bank
        .execute(Command {
            shutter: 9,
            action: Action::Up,
        })
        .unwrap();

    assert_eq!(state, AssumedState::Up);
    // Local channel 1 of the second controller; the first never moves.
    assert_eq!(bank.controllers()[1].selected_channel(), 1);
    assert_eq!(bank.controllers()[0].selected_channel(), 0);
    assert!(presses(&log_a).is_empty());
    assert_eq!(presses(&log_b), vec!["next", "up", "up"]);
}

#[test]
fn out_of_range_index_is_rejected_before_any_press() {
    let (bank, log_a, log_b) = test_bank();

    for shutter in [12, 13, u8::MAX] {
        assert_eq!(
            bank.execute(Command {
                shutter,
                action: Action::Down,
            }),
            Err(CommandError::UnknownShutter)
        );
    }
    assert!(presses(&log_a).is_empty());
    assert!(presses(&log_b).is_empty());
}

#[test]
fn decoded_payload_executes_end_to_end() {
    let (bank, log_a, _) = test_bank();

    let command = decode_command(br#"{"op":"shutter_down","shutter":2}"#).unwrap();
    let state = bank.execute(command).unwrap();

    assert_eq!(state, AssumedState::Down);
    assert_eq!(state.to_payload(), r#"{"assumed_state":"down"}"#);
    assert_eq!(presses(&log_a), vec!["next", "next", "down", "down"]);
}

#[test]
fn timed_hold_reports_stopped() {
    let (bank, log_a, _) = test_bank();

    let command =
        decode_command(br#"{"op":"shutter_up_for","shutter":0,"time_ms":8000}"#).unwrap();
    let state = bank.execute(command).unwrap();

    assert_eq!(state, AssumedState::Stopped);
    let log = presses(&log_a);
    assert_eq!(&log[log.len() - 2..], &["stop", "stop"]);
}

#[test]
fn proportional_command_uses_travel_override() {
    let (bank, log_a, _) = test_bank();

    let command = decode_command(
        br#"{"op":"shutter_to","shutter":0,"position":1.0,"travel_ms":5000}"#,
    )
    .unwrap();
    let state = bank.execute(command).unwrap();

    assert_eq!(state, AssumedState::At(1.0));
    // Fully closed: bottom reference, then a zero-length up hold.
    assert_eq!(
        presses(&log_a),
        vec!["down", "down", "up", "up", "stop", "stop"]
    );
}

#[test]
fn bad_fraction_surfaces_the_core_error() {
    let (bank, log_a, _) = test_bank();

    let command =
        decode_command(br#"{"op":"shutter_to","shutter":0,"position":1.5}"#).unwrap();
    assert_eq!(
        bank.execute(command),
        Err(CommandError::FractionOutOfRange)
    );
    assert!(presses(&log_a).is_empty());
}
