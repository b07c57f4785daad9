//! MQTT bridge adapter.
//!
//! Subscribes to the command topic and feeds raw payloads into an
//! in-process channel that the dispatch loop drains; publishes per-shutter
//! assumed state to `<state_topic_prefix>/<index>`.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::mqtt::client::EspMqttClient`
//!   with a background thread pumping the event connection.
//! - **all other targets**: simulation backend with an injectable inbox
//!   and a recorded publish log for tests.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use log::{info, warn};

use crate::config::BridgeConfig;
use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};

pub struct MqttAdapter {
    command_topic: heapless::String<64>,
    state_topic_prefix: heapless::String<64>,
    inbox: Receiver<Vec<u8>>,
    #[cfg(target_os = "espidf")]
    client: EspMqttClient<'static>,
    #[cfg(not(target_os = "espidf"))]
    sim_inject: mpsc::Sender<Vec<u8>>,
    #[cfg(not(target_os = "espidf"))]
    sim_published: Vec<(String, String)>,
}

impl MqttAdapter {
    /// Connect to the broker and subscribe to the command topic.
    #[cfg(target_os = "espidf")]
    pub fn connect(config: &BridgeConfig) -> Result<Self, CommsError> {
        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        let command_topic = config.command_topic.clone();

        let mqtt_config = MqttClientConfiguration {
            client_id: Some(config.mqtt_client_id.as_str()),
            ..Default::default()
        };

        let (client, mut connection) =
            EspMqttClient::new(config.mqtt_broker_url.as_str(), &mqtt_config)
                .map_err(|_| CommsError::MqttConnectFailed)?;

        // The connection must be pumped continuously or the client stalls.
        let topic_filter = command_topic.clone();
        let _ = std::thread::Builder::new()
            .name("mqtt-conn".into())
            .stack_size(6 * 1024)
            .spawn(move || {
                while let Ok(event) = connection.next() {
                    match event.payload() {
                        EventPayload::Received { topic, data, .. } => {
                            if topic == Some(topic_filter.as_str()) {
                                if tx.send(data.to_vec()).is_err() {
                                    break;
                                }
                            }
                        }
                        EventPayload::Connected(_) => info!("MQTT: broker connected"),
                        EventPayload::Disconnected => warn!("MQTT: broker disconnected"),
                        _ => {}
                    }
                }
                info!("MQTT: connection pump exited");
            })
            .map_err(|_| CommsError::MqttConnectFailed)?;

        let mut adapter = Self {
            command_topic,
            state_topic_prefix: config.state_topic_prefix.clone(),
            inbox: rx,
            client,
        };

        // Subscription races broker connect; retry until the session is up.
        let mut attempts = 0u32;
        loop {
            match adapter
                .client
                .subscribe(adapter.command_topic.as_str(), QoS::AtLeastOnce)
            {
                Ok(_) => break,
                Err(_) if attempts < 20 => {
                    attempts += 1;
                    std::thread::sleep(Duration::from_millis(500));
                }
                Err(_) => return Err(CommsError::MqttSubscribeFailed),
            }
        }
        info!("MQTT: subscribed to '{}'", adapter.command_topic);

        Ok(adapter)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn connect(config: &BridgeConfig) -> Result<Self, CommsError> {
        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        info!(
            "MQTT(sim): connected to '{}', subscribed to '{}'",
            config.mqtt_broker_url, config.command_topic
        );
        Ok(Self {
            command_topic: config.command_topic.clone(),
            state_topic_prefix: config.state_topic_prefix.clone(),
            inbox: rx,
            sim_inject: tx,
            sim_published: Vec::new(),
        })
    }

    pub fn command_topic(&self) -> &str {
        &self.command_topic
    }

    /// Next inbound command payload, waiting at most `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Vec<u8>> {
        match self.inbox.recv_timeout(timeout) {
            Ok(payload) => Some(payload),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                warn!("MQTT: inbound channel closed");
                None
            }
        }
    }

    /// Publish the assumed state of one shutter.
    pub fn publish_state(&mut self, shutter: u8, payload: &str) -> Result<(), CommsError> {
        let mut topic = heapless::String::<72>::new();
        core::fmt::write(
            &mut topic,
            format_args!("{}/{}", self.state_topic_prefix, shutter),
        )
        .map_err(|_| CommsError::MqttPublishFailed)?;

        self.platform_publish(&topic, payload)
    }

    #[cfg(target_os = "espidf")]
    fn platform_publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError> {
        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload.as_bytes())
            .map_err(|_| CommsError::MqttPublishFailed)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError> {
        info!("MQTT(sim): publish {} <- {}", topic, payload);
        self.sim_published
            .push((topic.to_string(), payload.to_string()));
        Ok(())
    }

    // ── Simulation hooks ──────────────────────────────────────

    /// Inject an inbound payload as if the broker delivered it.
    #[cfg(not(target_os = "espidf"))]
    pub fn inject(&self, payload: &[u8]) {
        let _ = self.sim_inject.send(payload.to_vec());
    }

    /// Everything published so far, as `(topic, payload)` pairs.
    #[cfg(not(target_os = "espidf"))]
    pub fn published(&self) -> &[(String, String)] {
        &self.sim_published
    }
}
