//! Concurrency behaviour of timed holds, on the real clock.
//!
//! Press timings are scaled down to single-digit milliseconds so each
//! test finishes in well under a second; the assertions leave generous
//! slack because host schedulers jitter.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use shutterlink::shutter::{Controller, ControllerProfile, MonotonicClock};

use crate::mock_hw::{recording_pins, RecordingPin};

fn fast_profile() -> ControllerProfile {
    let mut profile = ControllerProfile::new(
        8,
        Duration::from_millis(1),
        Duration::from_millis(2_000),
        Duration::from_millis(4_500),
    );
    profile.send_duration = Duration::from_millis(5);
    profile.send_recovery_duration = Duration::from_millis(1);
    profile.send_count = 1;
    profile
}

fn realtime_controller(profile: ControllerProfile) -> Arc<Controller<RecordingPin, MonotonicClock>> {
    let (pins, _log) = recording_pins();
    Arc::new(Controller::new(profile, MonotonicClock::new(), pins))
}

#[test]
fn short_hold_keeps_the_guard_for_its_whole_duration() {
    // unlock_threshold stays at the 15s default, far above the hold.
    let controller = realtime_controller(fast_profile());
    let hold = Duration::from_millis(300);

    let worker = {
        let controller = Arc::clone(&controller);
        thread::spawn(move || controller.roll_down_for(0, hold).unwrap())
    };

    // Let the worker take the guard first.
    thread::sleep(Duration::from_millis(50));

    let started = Instant::now();
    controller.roll_stop(0).unwrap();
    let waited = started.elapsed();

    worker.join().unwrap();
    // The probe had to queue behind the entire hold.
    assert!(
        waited >= Duration::from_millis(200),
        "probe finished after {waited:?}, expected to block for the hold"
    );
}

#[test]
fn long_hold_releases_the_guard_mid_sleep() {
    let mut profile = fast_profile();
    profile.unlock_threshold = Duration::from_millis(100);
    profile.early_wakeup_margin = Duration::from_millis(50);
    let controller = realtime_controller(profile);
    let hold = Duration::from_millis(500);

    let hold_started = Instant::now();
    let worker = {
        let controller = Arc::clone(&controller);
        thread::spawn(move || controller.roll_down_for(0, hold).unwrap())
    };

    thread::sleep(Duration::from_millis(100));

    let started = Instant::now();
    controller.roll_stop(0).unwrap();
    let waited = started.elapsed();

    // The probe slipped in while the guard was released, well before the
    // hold's deadline.
    assert!(
        waited < Duration::from_millis(250),
        "probe blocked for {waited:?} despite released guard"
    );

    worker.join().unwrap();
    // The worker still honoured its full hold, and the early wakeup put
    // the stop press close to the requested instant, not the margin late.
    let total = hold_started.elapsed();
    assert!(
        total >= hold,
        "hold finished after {total:?}, before its {hold:?} deadline"
    );
    assert!(
        total < hold + Duration::from_millis(150),
        "stop press landed {total:?} after the hold started"
    );
}

#[test]
fn concurrent_commands_on_one_controller_serialise() {
    let controller = realtime_controller(fast_profile());

    let threads: Vec<_> = (0..4)
        .map(|channel| {
            let controller = Arc::clone(&controller);
            thread::spawn(move || controller.roll_stop(channel).unwrap())
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }

    // Whatever the arrival order, the tracked selection is one of the
    // requested channels, never a torn in-between value.
    assert!(controller.selected_channel() < 4);
}
