//! Monotonic time source for press timing.
//!
//! The controller core only needs two primitives: a monotonic "time since
//! boot" reading and a blocking sleep. Both go through the [`Clock`] trait
//! so host-side tests can substitute a virtual clock and assert on exact
//! sleep amounts.
//!
//! - **`target_os = "espidf"`** — [`MonotonicClock`] wraps
//!   `esp_timer_get_time()` (microsecond precision, monotonic).
//! - **all other targets** — `std::time::Instant`, for host-side testing
//!   and simulation.

use std::time::Duration;

/// Monotonic clock + blocking sleep, as seen by the controller core.
pub trait Clock {
    /// Monotonic time elapsed since boot (or clock construction).
    fn now(&self) -> Duration;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Real-time clock for the ESP32 target and host simulation.
pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

// Controllers take their clock by value; a shared handle lets several
// controllers (and tests) observe one time source.
impl<C: Clock> Clock for std::sync::Arc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}

impl Clock for MonotonicClock {
    #[cfg(target_os = "espidf")]
    fn now(&self) -> Duration {
        Duration::from_micros((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64)
    }

    #[cfg(not(target_os = "espidf"))]
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_monotonic() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        clock.sleep(Duration::from_millis(2));
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn shared_handle_satisfies_the_trait() {
        fn uptime(clock: &impl Clock) -> Duration {
            clock.now()
        }

        let clock = std::sync::Arc::new(MonotonicClock::new());
        let a = uptime(&clock);
        let b = uptime(&std::sync::Arc::clone(&clock));
        assert!(b >= a);
    }
}
