//! GPIO drivers, hardware initialisation, and thread helpers.

pub mod hw_init;
pub mod press_pin;
pub mod status_led;
pub mod worker;
