//! Mock hardware for integration tests.
//!
//! [`RecordingPin`] captures every press into a shared log;
//! [`VirtualClock`] makes time a pure value so tests can assert exact
//! sleep sequences. Both are thread-safe so the same mocks also serve
//! the multi-threaded hold tests (which pair the pins with the real
//! clock instead).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use shutterlink::shutter::{ButtonPins, Clock, PressPin};

pub type PressLog = Arc<Mutex<Vec<&'static str>>>;

/// Press pin that records its label on every rising edge.
#[derive(Clone)]
pub struct RecordingPin {
    label: &'static str,
    log: PressLog,
}

impl PressPin for RecordingPin {
    fn set_high(&mut self) {
        self.log.lock().unwrap().push(self.label);
    }

    fn set_low(&mut self) {}
}

/// A full five-button pin set sharing one press log.
pub fn recording_pins() -> (ButtonPins<RecordingPin>, PressLog) {
    let log: PressLog = Arc::new(Mutex::new(Vec::new()));
    let pin = |label| RecordingPin {
        label,
        log: Arc::clone(&log),
    };
    let pins = ButtonPins {
        up: pin("up"),
        stop: pin("stop"),
        down: pin("down"),
        previous: pin("prev"),
        next: pin("next"),
    };
    (pins, log)
}

pub fn presses(log: &PressLog) -> Vec<&'static str> {
    log.lock().unwrap().clone()
}

#[derive(Default)]
struct VirtualState {
    now_ms: u64,
    sleeps_ms: Vec<u64>,
}

/// Deterministic clock: `sleep` advances virtual time instantly and logs
/// the requested amount.
#[derive(Default)]
pub struct VirtualClock {
    state: Mutex<VirtualState>,
}

impl VirtualClock {
    pub fn advance(&self, ms: u64) {
        self.state.lock().unwrap().now_ms += ms;
    }

    pub fn sleeps(&self) -> Vec<u64> {
        self.state.lock().unwrap().sleeps_ms.clone()
    }

    pub fn now_ms(&self) -> u64 {
        self.state.lock().unwrap().now_ms
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.state.lock().unwrap().now_ms)
    }

    fn sleep(&self, duration: Duration) {
        let ms = duration.as_millis() as u64;
        let mut state = self.state.lock().unwrap();
        state.sleeps_ms.push(ms);
        state.now_ms += ms;
    }
}
