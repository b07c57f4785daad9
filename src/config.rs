//! Bridge configuration parameters.
//!
//! Connectivity settings and the default travel-time estimate used when a
//! command does not carry its own. Values can be overridden via NVS; the
//! controller timing profiles themselves live in
//! [`shutter::profile`](crate::shutter::profile), keyed by hardware model.

use serde::{Deserialize, Serialize};

/// Connectivity and dispatch configuration, persisted in NVS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    // --- WiFi ---
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,

    // --- MQTT ---
    /// Broker URL, e.g. `mqtt://192.168.1.10:1883`.
    pub mqtt_broker_url: heapless::String<64>,
    /// Client id used when connecting to the broker.
    pub mqtt_client_id: heapless::String<32>,
    /// Topic the bridge subscribes to for inbound commands.
    pub command_topic: heapless::String<64>,
    /// Per-shutter assumed state is published to `<prefix>/<index>`.
    pub state_topic_prefix: heapless::String<64>,

    // --- Dispatch ---
    /// Fallback full-traversal estimate (milliseconds) for proportional
    /// commands that do not carry their own `travel_ms`.
    pub default_travel_time_ms: u32,
}

fn literal<const N: usize>(s: &str) -> heapless::String<N> {
    // Only called with literals that fit; an oversized literal yields the
    // empty string, which validation then rejects.
    heapless::String::try_from(s).unwrap_or_default()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: heapless::String::new(),
            wifi_password: heapless::String::new(),
            mqtt_broker_url: literal("mqtt://localhost:1883"),
            mqtt_client_id: literal("shutter-control"),
            command_topic: literal("ewfs/command"),
            state_topic_prefix: literal("ewfs/shutters"),
            default_travel_time_ms: 30_000,
        }
    }
}

/// Range-check a configuration before it is persisted or applied.
pub fn validate_config(cfg: &BridgeConfig) -> Result<(), &'static str> {
    if cfg.mqtt_broker_url.is_empty() {
        return Err("mqtt_broker_url must not be empty");
    }
    if cfg.mqtt_client_id.is_empty() {
        return Err("mqtt_client_id must not be empty");
    }
    if cfg.command_topic.is_empty() || cfg.command_topic.contains('#') {
        return Err("command_topic must be a non-empty literal topic");
    }
    if cfg.state_topic_prefix.is_empty() || cfg.state_topic_prefix.ends_with('/') {
        return Err("state_topic_prefix must be non-empty without trailing slash");
    }
    if !(1_000..=600_000).contains(&cfg.default_travel_time_ms) {
        return Err("default_travel_time_ms must be 1000-600000");
    }
    Ok(())
}
