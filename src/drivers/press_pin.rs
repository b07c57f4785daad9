//! GPIO-backed implementation of the core's [`PressPin`] trait.
//!
//! On ESP-IDF this writes through [`hw_init::gpio_write`]; on host
//! targets the writes are no-ops, which lets the whole stack run in
//! simulation.

use crate::drivers::hw_init;
use crate::shutter::PressPin;

/// One output pin soldered across a remote-controller button contact.
pub struct GpioPressPin {
    gpio: i32,
}

impl GpioPressPin {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }
}

impl PressPin for GpioPressPin {
    fn set_high(&mut self) {
        hw_init::gpio_write(self.gpio, true);
    }

    fn set_low(&mut self) {
        hw_init::gpio_write(self.gpio, false);
    }
}
