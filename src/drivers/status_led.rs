//! Status LED driver.
//!
//! A single on-board LED signals command outcomes: a short-on/long-off
//! flash for success, long-on/short-off for failure. Flashes are
//! blocking, driven through the same [`Clock`] the core uses so tests
//! can observe them.

use std::time::Duration;

use crate::drivers::hw_init;
use crate::shutter::Clock;

pub struct StatusLed {
    gpio: i32,
    on: bool,
}

impl StatusLed {
    pub fn new(gpio: i32) -> Self {
        Self { gpio, on: false }
    }

    pub fn set_state(&mut self, on: bool) {
        hw_init::gpio_write(self.gpio, on);
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    fn flash(&mut self, clock: &impl Clock, on_time: Duration, off_time: Duration) {
        self.set_state(true);
        clock.sleep(on_time);
        self.set_state(false);
        clock.sleep(off_time);
    }

    /// Command completed.
    pub fn flash_ok(&mut self, clock: &impl Clock) {
        self.flash(clock, Duration::from_millis(500), Duration::from_millis(1500));
    }

    /// Command rejected or failed.
    pub fn flash_err(&mut self, clock: &impl Clock) {
        self.flash(clock, Duration::from_millis(1500), Duration::from_millis(500));
    }
}
