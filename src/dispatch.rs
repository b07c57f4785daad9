//! Command decoding and routing.
//!
//! Inbound MQTT payloads are small JSON documents:
//!
//! ```json
//! { "op": "shutter_down", "shutter": 3 }
//! { "op": "shutter_down_for", "shutter": 3, "time_ms": 8000 }
//! { "op": "shutter_to", "shutter": 3, "position": 0.25, "travel_ms": 22000 }
//! ```
//!
//! `shutter` is a *global* index spanning every wired controller; the
//! [`ControllerBank`] maps it onto a (controller, local channel) pair and
//! validates it before anything reaches the controller core. `travel_ms`
//! overrides the configured default traversal estimate for the
//! proportional operations.

use std::time::Duration;

use log::warn;
use serde::Deserialize;

use crate::error::CommandError;
use crate::shutter::{ChannelIndex, Clock, Controller, PressPin, ShutterProfile};

// ───────────────────────────────────────────────────────────────
// Wire format
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CommandDoc {
    op: heapless::String<24>,
    shutter: u8,
    #[serde(default)]
    time_ms: Option<u64>,
    #[serde(default)]
    position: Option<f64>,
    #[serde(default)]
    travel_ms: Option<u64>,
}

/// One decoded, not-yet-routed shutter command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    /// Global shutter index across all wired controllers.
    pub shutter: u8,
    pub action: Action,
}

/// What to do with the addressed shutter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Up,
    Down,
    Stop,
    /// Run upward for the duration, then stop.
    UpFor(Duration),
    /// Run downward for the duration, then stop.
    DownFor(Duration),
    /// Move to a travel fraction, optionally with a per-shutter
    /// traversal estimate overriding the configured default.
    To { fraction: f64, travel: Option<Duration> },
}

/// Decode a raw MQTT payload into a [`Command`].
pub fn decode_command(payload: &[u8]) -> Result<Command, CommandError> {
    let doc: CommandDoc = serde_json::from_slice(payload).map_err(|e| {
        warn!("failed to deserialize command: {e}");
        CommandError::BadPayload
    })?;

    let hold = || {
        doc.time_ms
            .map(Duration::from_millis)
            .ok_or(CommandError::BadPayload)
    };

    let action = match doc.op.as_str() {
        "shutter_up" => Action::Up,
        "shutter_down" => Action::Down,
        "shutter_stop" => Action::Stop,
        "shutter_up_for" => Action::UpFor(hold()?),
        "shutter_down_for" => Action::DownFor(hold()?),
        "shutter_to" => Action::To {
            fraction: doc.position.ok_or(CommandError::BadPayload)?,
            travel: doc.travel_ms.map(Duration::from_millis),
        },
        other => {
            warn!("received unknown operation: {other}");
            return Err(CommandError::UnknownOperation);
        }
    };

    Ok(Command {
        shutter: doc.shutter,
        action,
    })
}

// ───────────────────────────────────────────────────────────────
// Assumed state
// ───────────────────────────────────────────────────────────────

/// The state a shutter is assumed to be in after a command completed.
/// Nothing verifies it — there is no feedback path from the shutters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssumedState {
    Up,
    Down,
    Stopped,
    /// Stopped at (approximately) this travel fraction.
    At(f64),
}

impl AssumedState {
    /// JSON document published to the per-shutter state topic.
    pub fn to_payload(self) -> String {
        match self {
            Self::Up => r#"{"assumed_state":"up"}"#.to_string(),
            Self::Down => r#"{"assumed_state":"down"}"#.to_string(),
            Self::Stopped => r#"{"assumed_state":"stop"}"#.to_string(),
            Self::At(fraction) => {
                format!(r#"{{"assumed_state":"position","position":{fraction}}}"#)
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Controller bank
// ───────────────────────────────────────────────────────────────

/// Every wired controller, addressable through one flat shutter-index
/// space: controller 0 owns indices `0..channels0`, controller 1 owns
/// `channels0..channels0+channels1`, and so on.
pub struct ControllerBank<P, C> {
    controllers: Vec<Controller<P, C>>,
    default_travel_time: Duration,
}

impl<P: PressPin, C: Clock> ControllerBank<P, C> {
    pub fn new(controllers: Vec<Controller<P, C>>, default_travel_time: Duration) -> Self {
        Self {
            controllers,
            default_travel_time,
        }
    }

    /// Total shutter count across all controllers.
    pub fn total_shutters(&self) -> u16 {
        self.controllers
            .iter()
            .map(|c| u16::from(c.channels()))
            .sum()
    }

    pub fn controllers(&self) -> &[Controller<P, C>] {
        &self.controllers
    }

    /// Map a global shutter index onto its controller and local channel.
    pub fn resolve(&self, shutter: u8) -> Result<(&Controller<P, C>, ChannelIndex), CommandError> {
        let mut base = 0u16;
        for controller in &self.controllers {
            let next = base + u16::from(controller.channels());
            if u16::from(shutter) < next {
                return Ok((controller, (u16::from(shutter) - base) as u8));
            }
            base = next;
        }
        Err(CommandError::UnknownShutter)
    }

    /// Execute a command, blocking until it completes (including holds).
    /// Returns the state the shutter is assumed to be in afterwards.
    pub fn execute(&self, command: Command) -> Result<AssumedState, CommandError> {
        let (controller, channel) = self.resolve(command.shutter)?;
        match command.action {
            Action::Up => {
                controller.roll_up(channel)?;
                Ok(AssumedState::Up)
            }
            Action::Down => {
                controller.roll_down(channel)?;
                Ok(AssumedState::Down)
            }
            Action::Stop => {
                controller.roll_stop(channel)?;
                Ok(AssumedState::Stopped)
            }
            Action::UpFor(hold) => {
                controller.roll_up_for(channel, hold)?;
                Ok(AssumedState::Stopped)
            }
            Action::DownFor(hold) => {
                controller.roll_down_for(channel, hold)?;
                Ok(AssumedState::Stopped)
            }
            Action::To { fraction, travel } => {
                let shutter = ShutterProfile {
                    index: channel,
                    total_travel_time: travel.unwrap_or(self.default_travel_time),
                };
                controller.roll_to(shutter, fraction)?;
                Ok(AssumedState::At(fraction))
            }
        }
    }
}
