//! Adapters — the outward-facing I/O wrappers around the controller core.
//!
//! | Adapter | Connects to                        |
//! |---------|------------------------------------|
//! | `nvs`   | NVS flash / in-memory store        |
//! | `wifi`  | ESP-IDF WiFi STA                   |
//! | `mqtt`  | ESP-IDF MQTT client / sim queue    |

pub mod mqtt;
pub mod nvs;
pub mod wifi;
