//! Port traits: the hexagonal boundary between the gateway core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ CommandDispatcher (domain)
//! ```
//!
//! Driven adapters (WiFi, clock, NVS, HTTPS, serial, event sinks)
//! implement these traits. The [`Platform`] trait bundles one adapter per
//! port so the dispatcher and its components are generic over a single
//! parameter, and integration tests swap the whole set for mocks.
//!
//! ## Security notes
//!
//! - **StoragePort** holds the issued credential; nothing else is stored.
//! - **HttpPort** implementations MUST verify the server certificate
//!   chain against the configured trust anchor.
//! - All port errors are typed; callers must handle every variant.

use core::fmt;
use core::time::Duration;

use embedded_hal::delay::DelayNs;

use super::events::GatewayEvent;

// ───────────────────────────────────────────────────────────────
// Link port (driven adapter: domain → WiFi station)
// ───────────────────────────────────────────────────────────────

/// Errors from [`LinkPort::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    InvalidSsid,
    InvalidPassword,
    /// The driver refused to start or initiate an association.
    StartFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::StartFailed => write!(f, "WiFi driver failed to start"),
        }
    }
}

impl std::error::Error for ConnectivityError {}

/// Station-mode network link.
///
/// `begin` only initiates association; completion is observed through
/// `is_connected`, which the connectivity manager polls.
pub trait LinkPort {
    fn begin(&mut self) -> Result<(), ConnectivityError>;
    fn is_connected(&self) -> bool;
    /// Drop the association and stop the radio. Idempotent.
    fn shutdown(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: domain → RTC / SNTP)
// ───────────────────────────────────────────────────────────────

/// Wall-clock source with network time synchronisation.
pub trait ClockPort {
    /// Current wall-clock time in Unix seconds. May be garbage before sync.
    fn now_unix(&self) -> u64;

    /// Start (or restart) network time synchronisation. Non-blocking.
    fn request_sync(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent string storage, namespaced like ESP-IDF NVS.
///
/// Writes MUST be atomic: no partial values on power loss. The ESP-IDF
/// NVS API guarantees this natively.
pub trait StoragePort {
    /// Read a string value into `buf`. Returns the number of bytes written.
    fn read_str(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a string value and commit it.
    fn write_str(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Stored value does not fit the caller's buffer.
    TooLarge,
    /// Generic I/O error from the flash backend.
    IoError,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::TooLarge => write!(f, "value too large"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for StorageError {}

// ───────────────────────────────────────────────────────────────
// HTTP port (driven adapter: domain → HTTPS client)
// ───────────────────────────────────────────────────────────────

/// One outbound POST.
#[derive(Debug, Clone, Copy)]
pub struct HttpRequest<'a> {
    pub url: &'a str,
    pub headers: &'a [(&'a str, &'a str)],
    pub body: &'a [u8],
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpError {
    /// The request could not be prepared (bad URL, trust anchor). Retrying
    /// cannot help.
    Setup,
    /// Connection, TLS, or timeout failure. No status was received.
    NoResponse,
    /// The response body exceeded the configured cap and was discarded.
    BodyTooLarge,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "request setup failed"),
            Self::NoResponse => write!(f, "no response"),
            Self::BodyTooLarge => write!(f, "response body too large"),
        }
    }
}

/// HTTPS POST client. Every status code, including non-200, is returned
/// as `Ok`; only transport-level failures are errors.
pub trait HttpPort {
    fn post(&mut self, request: &HttpRequest<'_>) -> Result<HttpResponse, HttpError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`GatewayEvent`]s through this port.
/// Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &GatewayEvent);
}

// ───────────────────────────────────────────────────────────────
// Transport (byte channel to the host calculator)
// ───────────────────────────────────────────────────────────────

/// Byte-oriented transport channel.
pub trait Transport {
    type Error: fmt::Debug;

    /// Read up to `buf.len()` bytes. Returns 0 if nothing is available
    /// (non-blocking).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write all of `data`.
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    fn flush(&mut self) -> Result<(), Self::Error>;
}

// ───────────────────────────────────────────────────────────────
// Platform bundle
// ───────────────────────────────────────────────────────────────

/// One concrete adapter per port.
///
/// On target this is the ESP-IDF adapter set with `FreeRtos` as the
/// delay provider; in tests it is a set of recording mocks.
pub trait Platform {
    type Link: LinkPort;
    type Clock: ClockPort;
    type Storage: StoragePort;
    type Http: HttpPort;
    type Delay: DelayNs;
    type Sink: EventSink;
}
