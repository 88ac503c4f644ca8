//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements   | Connects to                  |
//! |----------------|--------------|------------------------------|
//! | `wifi`         | LinkPort     | ESP-IDF WiFi STA             |
//! | `time`         | ClockPort    | System time + SNTP           |
//! | `nvs`          | StoragePort  | NVS / in-memory store        |
//! | `https`        | HttpPort     | ESP-IDF HTTP client + mbedTLS|
//! | `cert_store`   | (none)       | Trust anchor preparation     |
//! | `serial`       | Transport    | UART to the host calculator  |
//! | `log_sink`     | EventSink    | Serial log output            |
//! | `device_id`    | (none)       | eFuse factory MAC            |

pub mod cert_store;
pub mod device_id;
pub mod https;
pub mod log_sink;
pub mod nvs;
pub mod serial;
pub mod time;
pub mod wifi;
