//! Remote-controller core: channel selection and shutter commands.
//!
//! A wired remote controller is driven purely through its five buttons
//! (up / stop / down / previous / next). The [`Controller`] emulates a
//! human operator: it steps the channel selection over the controller's
//! modular channel ring, keeps track of whether the channel display is
//! still awake, and sends the actual up/down/stop commands as timed
//! button-press sequences.
//!
//! Per controller the command flow is
//!
//! ```text
//!   Idle ──▶ Selecting ──▶ Commanding ──▶ (Holding) ──▶ Idle
//! ```
//!
//! where `Selecting` is skipped when the target channel is already
//! selected and `Holding` only exists for the timed command variants.
//! `Holding` is the sole phase in which the controller's exclusive guard
//! may be released (see [`Controller`] for the smart-sleep protocol).

pub mod arith;
pub mod button;
pub mod clock;
pub mod controller;
pub mod profile;

pub use button::{Button, PressPin};
pub use clock::{Clock, MonotonicClock};
pub use controller::{ButtonPins, Controller};
pub use profile::{ChannelIndex, ControllerProfile, ShutterProfile};
