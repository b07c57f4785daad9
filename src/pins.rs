//! GPIO pin assignments for the ShutterLink board.
//!
//! Single source of truth — every driver references this module rather
//! than hard-coding pin numbers. Each wired remote controller consumes
//! five outputs soldered across its button contacts.

// ---------------------------------------------------------------------------
// Controller 0 — handheld transmitter (8 channels)
// ---------------------------------------------------------------------------

pub const CTRL0_UP_GPIO: i32 = 13;
pub const CTRL0_STOP_GPIO: i32 = 12;
pub const CTRL0_DOWN_GPIO: i32 = 14;
pub const CTRL0_PREVIOUS_GPIO: i32 = 0;
pub const CTRL0_NEXT_GPIO: i32 = 15;

/// All button outputs, for one-shot GPIO configuration.
pub const BUTTON_OUTPUT_GPIOS: [i32; 5] = [
    CTRL0_UP_GPIO,
    CTRL0_STOP_GPIO,
    CTRL0_DOWN_GPIO,
    CTRL0_PREVIOUS_GPIO,
    CTRL0_NEXT_GPIO,
];

// ---------------------------------------------------------------------------
// Status LED
// ---------------------------------------------------------------------------

/// On-board status LED, flashed after each command completes.
pub const STATUS_LED_GPIO: i32 = 2;
