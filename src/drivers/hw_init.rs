//! One-shot hardware peripheral initialization.
//!
//! Configures the button-output and status-LED GPIOs using raw ESP-IDF
//! sys calls. Called once from `main()` before any command is accepted.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

// ── GPIO outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    let mut output_pins = pins::BUTTON_OUTPUT_GPIOS.to_vec();
    output_pins.push(pins::STATUS_LED_GPIO);

    for &pin in &output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: called once from main() before the dispatch loop starts;
        // single-threaded at this point.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        // Buttons are active-high: idle low.
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: {} output pins configured", output_pins.len());
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was validated during init_peripherals().
    unsafe {
        gpio_set_level(pin, if high { 1 } else { 0 });
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}
