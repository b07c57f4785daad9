//! Per-controller-model timing configuration.
//!
//! Profiles matter because controller models differ in channel count and
//! in how long each button press must be held to register. The predefined
//! profiles below were measured against real hardware.
//!
//! Field-tuning notes:
//!
//! - If the selected channel never changes, `select_duration` is too small
//!   for the model — increase it until the selection steps.
//! - If the wrong channel ends up selected, the display-active window
//!   bounds need adjustment. Measure how long the channel display stays
//!   lit after a press: `selection_active_min` must sit below the lowest
//!   value observed (too low merely slows selection down) and
//!   `selection_active_max` above the highest.

use std::time::Duration;

/// Index of a channel *within one controller*, `0..profile.channels`.
/// Global-shutter-to-local mapping is the dispatcher's job, not the core's.
pub type ChannelIndex = u8;

/// Immutable timing configuration for one remote-controller model.
#[derive(Debug, Clone)]
pub struct ControllerProfile {
    /// Number of channels the controller can select.
    pub channels: ChannelIndex,

    /// Hold time for a previous/next selection press.
    pub select_duration: Duration,
    /// Settle time before each selection press.
    pub select_recovery_duration: Duration,

    /// Hold time for an up/stop/down command press.
    pub send_duration: Duration,
    /// Pause between repeated command presses.
    pub send_recovery_duration: Duration,
    /// How often each command press is repeated (no feedback path, so
    /// repeats paper over missed presses).
    pub send_count: u32,

    /// Below this much elapsed time the channel display is certainly
    /// still awake.
    pub selection_active_min: Duration,
    /// Past this much elapsed time the channel display is certainly
    /// asleep; in between is ambiguous.
    pub selection_active_max: Duration,

    /// Timed holds at least this long release the controller guard while
    /// sleeping so queued commands are not starved.
    pub unlock_threshold: Duration,
    /// How early a released hold wakes up to reacquire the guard before
    /// its stop deadline.
    pub early_wakeup_margin: Duration,
}

impl ControllerProfile {
    /// Build a profile from the four model-specific measurements; command
    /// press timing and the smart-sleep tunables use defaults shared by
    /// every supported model.
    pub fn new(
        channels: ChannelIndex,
        select_duration: Duration,
        selection_active_min: Duration,
        selection_active_max: Duration,
    ) -> Self {
        Self {
            channels,
            select_duration,
            select_recovery_duration: select_duration,
            send_duration: Duration::from_millis(2500),
            send_recovery_duration: Duration::from_millis(750),
            send_count: 2,
            selection_active_min,
            selection_active_max,
            unlock_threshold: Duration::from_secs(15),
            early_wakeup_margin: Duration::from_secs(4),
        }
    }

    /// 8-channel wall-mounted timer unit.
    pub fn timer_8k() -> Self {
        Self::new(
            8,
            Duration::from_millis(30),
            Duration::from_millis(2000),
            Duration::from_millis(4500),
        )
    }

    /// 8-channel handheld transmitter (stiffer buttons, longer press).
    pub fn handheld_transmitter() -> Self {
        Self::new(
            8,
            Duration::from_millis(100),
            Duration::from_millis(2000),
            Duration::from_millis(4500),
        )
    }
}

/// Caller-supplied description of one physical shutter, used only by the
/// proportional-time operations. `total_travel_time` is an estimate of a
/// full top-to-bottom traversal; nothing verifies it.
#[derive(Debug, Clone, Copy)]
pub struct ShutterProfile {
    pub index: ChannelIndex,
    pub total_travel_time: Duration,
}
