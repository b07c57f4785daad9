//! WiFi station-mode adapter.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via
//!   `esp_idf_svc::wifi::BlockingWifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Reconnection policy
//!
//! On disconnect the adapter waits an exponential backoff (2 s → 4 s →
//! 8 s … capped at 60 s) before retrying. `poll()` drives the retry loop
//! from the main dispatch thread; command workers never touch WiFi.

use core::fmt;
use log::{error, info, warn};

use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::peripherals::Peripherals,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
    AlreadyConnected,
    DriverInit,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
            Self::AlreadyConnected => write!(f, "already connected to AP"),
            Self::DriverInit => write!(f, "WiFi driver initialisation failed"),
        }
    }
}

impl From<ConnectivityError> for CommsError {
    fn from(_: ConnectivityError) -> Self {
        CommsError::WifiConnectFailed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
}

const MAX_BACKOFF_SECS: u32 = 60;

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        // Open network.
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    backoff_secs: u32,
    #[cfg(target_os = "espidf")]
    driver: BlockingWifi<EspWifi<'static>>,
    /// Simulation: counts platform_connect() calls for deterministic failures.
    #[cfg(not(target_os = "espidf"))]
    sim_connect_counter: u32,
}

impl WifiAdapter {
    /// Bring up the WiFi driver. On ESP-IDF this takes the modem
    /// peripheral, so at most one adapter can exist per boot.
    #[cfg(target_os = "espidf")]
    pub fn new() -> Result<Self, ConnectivityError> {
        let peripherals = Peripherals::take().map_err(|_| ConnectivityError::DriverInit)?;
        let sysloop = EspSystemEventLoop::take().map_err(|_| ConnectivityError::DriverInit)?;
        let nvs = EspDefaultNvsPartition::take().map_err(|_| ConnectivityError::DriverInit)?;

        let wifi = EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))
            .map_err(|_| ConnectivityError::DriverInit)?;
        let driver =
            BlockingWifi::wrap(wifi, sysloop).map_err(|_| ConnectivityError::DriverInit)?;

        Ok(Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            backoff_secs: 2,
            driver,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Result<Self, ConnectivityError> {
        Ok(Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            backoff_secs: 2,
            sim_connect_counter: 0,
        })
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn backoff_secs(&self) -> u32 {
        self.backoff_secs
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid
            .push_str(ssid)
            .map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password
            .push_str(password)
            .map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials updated (SSID='{}')", self.ssid);
        Ok(())
    }

    pub fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        if self.state == WifiState::Connected {
            return Err(ConnectivityError::AlreadyConnected);
        }

        info!("WiFi: connecting to '{}'", self.ssid);
        self.state = WifiState::Connecting;

        match self.platform_connect() {
            Ok(()) => {
                self.state = WifiState::Connected;
                self.backoff_secs = 2;
                info!("WiFi: connected");
                Ok(())
            }
            Err(e) => {
                error!("WiFi: connection failed: {}", e);
                self.state = WifiState::Reconnecting { attempt: 0 };
                Err(e)
            }
        }
    }

    pub fn disconnect(&mut self) {
        self.platform_disconnect();
        self.state = WifiState::Disconnected;
        info!("WiFi: disconnected");
    }

    pub fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }

    /// Drive reconnection. Called periodically from the dispatch loop;
    /// blocks for the backoff interval while reconnecting.
    pub fn poll(&mut self) {
        match self.state {
            WifiState::Reconnecting { attempt } => {
                info!(
                    "WiFi: reconnect attempt {} (backoff {}s)",
                    attempt, self.backoff_secs
                );
                // Simulation polls immediately so host tests stay fast.
                #[cfg(target_os = "espidf")]
                std::thread::sleep(std::time::Duration::from_secs(self.backoff_secs as u64));
                match self.platform_connect() {
                    Ok(()) => {
                        self.state = WifiState::Connected;
                        self.backoff_secs = 2;
                        info!("WiFi: reconnected");
                    }
                    Err(_) => {
                        self.backoff_secs = (self.backoff_secs * 2).min(MAX_BACKOFF_SECS);
                        self.state = WifiState::Reconnecting { attempt: attempt + 1 };
                    }
                }
            }
            WifiState::Connected => {
                if !self.platform_is_connected() {
                    warn!("WiFi: connection lost, entering reconnect");
                    self.state = WifiState::Reconnecting { attempt: 0 };
                }
            }
            _ => {}
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        let client_config = ClientConfiguration {
            ssid: self.ssid.clone(),
            password: self.password.clone(),
            auth_method,
            ..Default::default()
        };
        self.driver
            .set_configuration(&Configuration::Client(client_config))
            .map_err(|_| ConnectivityError::ConnectionFailed)?;

        self.driver
            .start()
            .map_err(|_| ConnectivityError::ConnectionFailed)?;
        self.driver
            .connect()
            .map_err(|_| ConnectivityError::ConnectionFailed)?;
        self.driver
            .wait_netif_up()
            .map_err(|_| ConnectivityError::ConnectionFailed)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        self.sim_connect_counter = self.sim_connect_counter.wrapping_add(1);
        // Every 10th attempt fails, exercising the backoff path.
        if self.sim_connect_counter % 10 == 3 {
            warn!(
                "WiFi(sim): simulated failure (attempt {})",
                self.sim_connect_counter
            );
            return Err(ConnectivityError::ConnectionFailed);
        }
        info!(
            "WiFi(sim): connected to '{}' (attempt {})",
            self.ssid, self.sim_connect_counter
        );
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        if let Err(e) = self.driver.disconnect() {
            warn!("WiFi: disconnect error: {}", e);
        }
        if let Err(e) = self.driver.stop() {
            warn!("WiFi: stop error: {}", e);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        info!("WiFi(sim): disconnected");
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.driver.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }
}
