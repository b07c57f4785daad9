//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file exercising one subsystem against mock
//! hardware. All tests run on the host (x86_64); the press pins record
//! into memory instead of toggling GPIOs.

#![cfg(not(target_os = "espidf"))]

mod controller_tests;
mod dispatch_tests;
mod mock_hw;
mod smart_sleep_tests;
