//! Command worker threads.
//!
//! Each dispatched command runs on its own thread so that a long hold on
//! one controller never blocks command intake or state publication for
//! the others; commands for the *same* controller still serialise on
//! that controller's guard.
//!
//! On ESP-IDF, `std::thread` is a thin pthread wrapper around FreeRTOS
//! tasks; `esp_pthread_set_cfg()` pins the next spawned thread to the
//! application core with an explicit stack size, keeping command work
//! off the protocol core (WiFi/lwIP run on core 0).

/// Stack size for command workers. Holds only press loops and sleeps.
const WORKER_STACK_KB: usize = 8;

#[cfg(target_os = "espidf")]
pub fn spawn_command_worker(f: impl FnOnce() + Send + 'static) -> std::thread::JoinHandle<()> {
    // SAFETY: esp_pthread_set_cfg applies thread-local config to the next
    // pthread_create from this thread; no other spawn interleaves because
    // only the dispatch loop spawns workers.
    unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = 1; // APP_CPU
        cfg.stack_size = (WORKER_STACK_KB * 1024) as i32;
        cfg.thread_name = c"cmd-worker".as_ptr();
        let ret = esp_idf_sys::esp_pthread_set_cfg(&cfg);
        assert!(
            ret == esp_idf_sys::ESP_OK as i32,
            "esp_pthread_set_cfg failed: {ret}"
        );
    }

    std::thread::Builder::new()
        .name("cmd-worker".into())
        .spawn(f)
        .expect("command worker: thread creation failed")
}

/// Simulation fallback — plain thread spawn, no core pinning.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_command_worker(f: impl FnOnce() + Send + 'static) -> std::thread::JoinHandle<()> {
    std::thread::Builder::new()
        .name("cmd-worker".into())
        .stack_size(WORKER_STACK_KB * 1024)
        .spawn(f)
        .expect("command worker: thread creation failed")
}
