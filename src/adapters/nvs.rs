//! NVS (Non-Volatile Storage) adapter.
//!
//! Persists two things: the [`BridgeConfig`] blob and the last-known
//! channel selection of each controller, so a reboot does not start the
//! selection walk from an assumed channel 0 when the remote is actually
//! parked elsewhere. The core never initiates persistence itself —
//! `main` snapshots `selected_channel` after each completed command.
//!
//! On ESP32 the backing store is the ESP-IDF NVS partition (atomic
//! commits per `nvs_commit()`); on host targets an in-memory map backs
//! the same API for tests and simulation.

use log::{info, warn};

use crate::config::{validate_config, BridgeConfig};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
const NAMESPACE: &str = "shutterlink";
const CONFIG_KEY: &str = "cfg";
#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 1024;

/// Errors from persistence operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Stored blob failed deserialization.
    Corrupted,
    /// Value failed range validation before persisting.
    Invalid(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "stored value corrupted"),
            Self::Invalid(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create the adapter and initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(StorageError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    /// Open the ShutterLink namespace, run a closure, close the handle.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = NAMESPACE.as_bytes();
        let len = ns_bytes.len().min(15);
        ns_buf[..len].copy_from_slice(&ns_bytes[..len]);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    fn selection_key(controller: usize) -> heapless::String<15> {
        let mut key = heapless::String::new();
        // Key length is bounded: controller counts are single digits.
        let _ = core::fmt::write(&mut key, format_args!("sel{}", controller));
        key
    }

    // ── Bridge configuration ──────────────────────────────────

    /// Load the bridge configuration, falling back to defaults when no
    /// stored config exists or the stored blob cannot be decoded.
    pub fn load_config(&self) -> BridgeConfig {
        match self.read_blob(CONFIG_KEY) {
            Some(bytes) => match postcard::from_bytes(&bytes) {
                Ok(cfg) => {
                    info!("NvsAdapter: loaded config ({} bytes)", bytes.len());
                    cfg
                }
                Err(_) => {
                    warn!("NvsAdapter: stored config corrupted, using defaults");
                    BridgeConfig::default()
                }
            },
            None => {
                info!("NvsAdapter: no stored config, using defaults");
                BridgeConfig::default()
            }
        }
    }

    /// Validate and persist the bridge configuration.
    pub fn save_config(&mut self, config: &BridgeConfig) -> Result<(), StorageError> {
        validate_config(config).map_err(StorageError::Invalid)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| StorageError::IoError)?;
        self.write_blob(CONFIG_KEY, &bytes)?;
        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }

    // ── Channel-selection snapshots ───────────────────────────

    /// Last persisted channel selection for `controller`, if any.
    pub fn load_selection(&self, controller: usize) -> Option<u8> {
        let key = Self::selection_key(controller);
        let bytes = self.read_blob(&key)?;
        match bytes.as_slice() {
            [channel] => Some(*channel),
            _ => {
                warn!("NvsAdapter: selection snapshot for {} corrupted", controller);
                None
            }
        }
    }

    /// Persist the channel selection for `controller`.
    pub fn save_selection(&mut self, controller: usize, channel: u8) -> Result<(), StorageError> {
        let key = Self::selection_key(controller);
        self.write_blob(&key, &[channel])
    }

    // ── Raw blob access ───────────────────────────────────────

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self, key: &str) -> Option<Vec<u8>> {
        self.store.borrow().get(key).cloned()
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_blob(&mut self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.store.borrow_mut().insert(key.to_string(), data.to_vec());
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn read_blob(&self, key: &str) -> Option<Vec<u8>> {
        let mut key_buf = [0u8; 16];
        let kb = key.as_bytes();
        let kl = kb.len().min(15);
        key_buf[..kl].copy_from_slice(&kb[..kl]);

        let result = Self::with_nvs_handle(false, |handle| {
            let mut size: usize = 0;
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    key_buf.as_ptr() as *const _,
                    core::ptr::null_mut(),
                    &mut size,
                )
            };
            if ret != ESP_OK || size == 0 || size > MAX_BLOB_SIZE {
                return Err(ret);
            }

            let mut buf = vec![0u8; size];
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    key_buf.as_ptr() as *const _,
                    buf.as_mut_ptr() as *mut _,
                    &mut size,
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(buf)
        });

        result.ok()
    }

    #[cfg(target_os = "espidf")]
    fn write_blob(&mut self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let mut key_buf = [0u8; 16];
        let kb = key.as_bytes();
        let kl = kb.len().min(15);
        key_buf[..kl].copy_from_slice(&kb[..kl]);

        let result = Self::with_nvs_handle(true, |handle| {
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    key_buf.as_ptr() as *const _,
                    data.as_ptr() as *const _,
                    data.len(),
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(())
        });
        result.map_err(|e| {
            warn!("NvsAdapter: NVS write error {}", e);
            StorageError::IoError
        })
    }
}
