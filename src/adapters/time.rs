//! ESP32 wall-clock adapter.
//!
//! Implements [`ClockPort`].
//!
//! - **`target_os = "espidf"`**: reads the system time (`gettimeofday`
//!   behind `std::time::SystemTime`) and synchronises it with SNTP via
//!   `esp_idf_svc::sntp`, using the ESP-IDF default server pool. The SNTP
//!   client is created on the first sync request and kept alive.
//! - **`not(target_os = "espidf")`**: uses the host clock, which is
//!   already synchronised.

use std::time::{SystemTime, UNIX_EPOCH};

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::ClockPort;

/// Wall-clock adapter for the ESP32-S3 platform.
pub struct Esp32TimeAdapter {
    #[cfg(target_os = "espidf")]
    sntp: Option<esp_idf_svc::sntp::EspSntp<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sync_requests: u32,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "espidf")]
            sntp: None,
            #[cfg(not(target_os = "espidf"))]
            sync_requests: 0,
        }
    }

    /// Number of sync requests seen (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn sync_requests(&self) -> u32 {
        self.sync_requests
    }
}

impl ClockPort for Esp32TimeAdapter {
    fn now_unix(&self) -> u64 {
        // Before sync the RTC may sit at 1970; that reads as 0 here and
        // is rejected by the plausibility check upstream.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    #[cfg(target_os = "espidf")]
    fn request_sync(&mut self) {
        if self.sntp.is_some() {
            return;
        }
        match esp_idf_svc::sntp::EspSntp::new_default() {
            Ok(sntp) => {
                info!("Time: SNTP started");
                self.sntp = Some(sntp);
            }
            Err(e) => warn!("Time: SNTP start failed: {}", e),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn request_sync(&mut self) {
        self.sync_requests += 1;
        info!("Time(sim): sync requested");
    }
}
