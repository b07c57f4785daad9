//! Unified error types for the ShutterLink firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! the top-level loop's error handling uniform. All variants are `Copy`
//! so they can be passed around and logged without allocation.

use core::fmt;

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A shutter command was rejected before touching the hardware.
    Command(CommandError),
    /// A communication subsystem failed.
    Comms(CommsError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

/// Rejections from the controller core and the command dispatcher. The
/// only externally visible failure mode is "operation did not happen" —
/// no press reaches the hardware once a command is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Channel index is outside the controller's channel range. The core
    /// never wraps an out-of-range index around silently.
    ChannelOutOfRange,
    /// `roll_to` fraction outside `[0.0, 1.0]` (NaN included).
    FractionOutOfRange,
    /// Global shutter index does not map onto any wired controller.
    UnknownShutter,
    /// Inbound payload was not a valid command document.
    BadPayload,
    /// Payload parsed but named an operation this firmware does not know.
    UnknownOperation,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelOutOfRange => write!(f, "channel index out of range"),
            Self::FractionOutOfRange => write!(f, "position fraction outside [0, 1]"),
            Self::UnknownShutter => write!(f, "no controller owns this shutter index"),
            Self::BadPayload => write!(f, "malformed command payload"),
            Self::UnknownOperation => write!(f, "unknown operation"),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    WifiConnectFailed,
    WifiDisconnected,
    MqttConnectFailed,
    MqttSubscribeFailed,
    MqttPublishFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
            Self::WifiDisconnected => write!(f, "WiFi disconnected"),
            Self::MqttConnectFailed => write!(f, "MQTT connect failed"),
            Self::MqttSubscribeFailed => write!(f, "MQTT subscribe failed"),
            Self::MqttPublishFailed => write!(f, "MQTT publish failed"),
        }
    }
}

impl std::error::Error for CommsError {}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    // The main() boundary wraps these with anyhow, which needs the full
    // std::error::Error contract, not just Display.
    #[test]
    fn errors_satisfy_the_std_error_contract() {
        fn dyn_message(e: &(dyn std::error::Error + Send + Sync + 'static)) -> String {
            e.to_string()
        }

        assert_eq!(
            dyn_message(&CommsError::MqttConnectFailed),
            "MQTT connect failed"
        );
        assert_eq!(
            dyn_message(&Error::Command(CommandError::UnknownShutter)),
            "command: no controller owns this shutter index"
        );
    }

    #[test]
    fn sub_errors_convert_into_the_unified_type() {
        let e: Error = CommandError::BadPayload.into();
        assert_eq!(e, Error::Command(CommandError::BadPayload));
        let e: Error = CommsError::MqttPublishFailed.into();
        assert_eq!(e, Error::Comms(CommsError::MqttPublishFailed));
    }
}
