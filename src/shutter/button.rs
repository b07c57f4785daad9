//! Stateless button emulation over a single digital output pin.
//!
//! A "press" is the only primitive the remote understands: drive the pin
//! high, hold it for a model-specific duration, drive it low again. The
//! pin itself sits behind [`PressPin`] so the real GPIO driver and the
//! recording pins used in tests share one code path.

use std::time::Duration;

use super::clock::Clock;

/// Output pin that a [`Button`] can drive. GPIO writes on an
/// already-configured output cannot fail, so the trait is infallible.
pub trait PressPin {
    fn set_high(&mut self);
    fn set_low(&mut self);
}

/// One physical button on a remote controller.
pub struct Button<P> {
    pin: P,
}

impl<P: PressPin> Button<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Press and hold for `duration`, then release.
    pub fn press(&mut self, clock: &impl Clock, duration: Duration) {
        self.pin.set_high();
        clock.sleep(duration);
        self.pin.set_low();
    }

    /// Press `count` times, waiting `pause` between consecutive presses.
    /// `count == 0` is a no-op.
    pub fn press_repeat(&mut self, clock: &impl Clock, duration: Duration, count: u32, pause: Duration) {
        if count == 0 {
            return;
        }
        self.press(clock, duration);
        for _ in 1..count {
            clock.sleep(pause);
            self.press(clock, duration);
        }
    }
}
