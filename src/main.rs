//! ShutterLink firmware entry point.
//!
//! Bootstrap order matters: GPIO first (idle-low button outputs before
//! anything else can glitch a remote), then NVS, then WiFi, then MQTT.
//! After that the main thread becomes the dispatch loop: drain inbound
//! command payloads, hand each decoded command to a worker thread, and
//! publish the resulting assumed state when the worker reports back.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};

use shutterlink::adapters::mqtt::MqttAdapter;
use shutterlink::adapters::nvs::NvsAdapter;
use shutterlink::adapters::wifi::WifiAdapter;
use shutterlink::dispatch::{decode_command, AssumedState, ControllerBank};
use shutterlink::drivers::press_pin::GpioPressPin;
use shutterlink::drivers::status_led::StatusLed;
use shutterlink::drivers::worker::spawn_command_worker;
use shutterlink::error::CommandError;
use shutterlink::pins;
use shutterlink::shutter::{ButtonPins, Controller, ControllerProfile, MonotonicClock};

/// Outcome of one command, reported from a worker back to the loop.
struct CommandOutcome {
    shutter: u8,
    result: Result<AssumedState, CommandError>,
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init().map_err(|e| anyhow!("logger init: {e:?}"))?;

    info!("ShutterLink v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. GPIO ───────────────────────────────────────────────
    shutterlink::drivers::hw_init::init_peripherals()
        .map_err(|e| anyhow!("peripheral init: {e}"))?;
    let mut led = StatusLed::new(pins::STATUS_LED_GPIO);

    // ── 3. Config from NVS ────────────────────────────────────
    let mut nvs = NvsAdapter::new().map_err(|e| anyhow!("NVS init: {e}"))?;
    let config = nvs.load_config();

    // ── 4. Controllers ────────────────────────────────────────
    let buttons = ButtonPins {
        up: GpioPressPin::new(pins::CTRL0_UP_GPIO),
        stop: GpioPressPin::new(pins::CTRL0_STOP_GPIO),
        down: GpioPressPin::new(pins::CTRL0_DOWN_GPIO),
        previous: GpioPressPin::new(pins::CTRL0_PREVIOUS_GPIO),
        next: GpioPressPin::new(pins::CTRL0_NEXT_GPIO),
    };
    let controller = Controller::new(
        ControllerProfile::handheld_transmitter(),
        MonotonicClock::new(),
        buttons,
    );

    let bank = Arc::new(ControllerBank::new(
        vec![controller],
        Duration::from_millis(u64::from(config.default_travel_time_ms)),
    ));
    info!("dispatch: {} shutters addressable", bank.total_shutters());

    // Selections persisted before the last reboot are trusted over the
    // channel-0 boot assumption.
    for (index, controller) in bank.controllers().iter().enumerate() {
        if let Some(channel) = nvs.load_selection(index) {
            match controller.restore_selection(channel) {
                Ok(()) => info!("controller {}: restored selection {}", index, channel),
                Err(e) => warn!("controller {}: stale selection {} ({})", index, channel, e),
            }
        }
    }

    // ── 5. WiFi ───────────────────────────────────────────────
    let clock = MonotonicClock::new();
    let mut wifi = WifiAdapter::new().map_err(|e| anyhow!("WiFi init: {e}"))?;
    wifi.set_credentials(&config.wifi_ssid, &config.wifi_password)
        .map_err(|e| anyhow!("WiFi credentials: {e}"))?;
    if wifi.connect().is_err() {
        // poll() drives the exponential backoff until the AP comes up.
        while !wifi.is_connected() {
            led.flash_err(&clock);
            wifi.poll();
        }
    }

    // ── 6. MQTT ───────────────────────────────────────────────
    let mut mqtt = MqttAdapter::connect(&config).context("MQTT connect")?;
    info!("listening on '{}'", mqtt.command_topic());

    // ── 7. Dispatch loop ──────────────────────────────────────
    let (outcome_tx, outcome_rx) = mpsc::channel::<CommandOutcome>();

    loop {
        if let Some(payload) = mqtt.recv_timeout(Duration::from_millis(500)) {
            match decode_command(&payload) {
                Ok(command) => {
                    let bank = Arc::clone(&bank);
                    let tx = outcome_tx.clone();
                    // Detached; completion comes back over the channel.
                    let _ = spawn_command_worker(move || {
                        let result = bank.execute(command);
                        let _ = tx.send(CommandOutcome {
                            shutter: command.shutter,
                            result,
                        });
                    });
                }
                Err(e) => {
                    warn!("rejected command payload: {}", e);
                    led.flash_err(&clock);
                }
            }
        }

        // Completed commands: publish state, snapshot selections.
        while let Ok(outcome) = outcome_rx.try_recv() {
            match outcome.result {
                Ok(state) => {
                    if let Err(e) = mqtt.publish_state(outcome.shutter, &state.to_payload()) {
                        error!("state publish failed for {}: {}", outcome.shutter, e);
                    }
                    for (index, controller) in bank.controllers().iter().enumerate() {
                        if let Err(e) = nvs.save_selection(index, controller.selected_channel()) {
                            warn!("selection snapshot failed for {}: {}", index, e);
                        }
                    }
                    led.flash_ok(&clock);
                }
                Err(e) => {
                    warn!("command for shutter {} failed: {}", outcome.shutter, e);
                    led.flash_err(&clock);
                }
            }
        }

        wifi.poll();
    }
}
