//! Error types for the gateway's two network flows.
//!
//! Provisioning and relay failures are separate enums because each maps
//! to its own set of wire responses. All variants are `Copy` so they can
//! be carried through events and responses without allocation.

use core::fmt;

/// Status reported when an attempt produced no HTTP response at all
/// (connection refused, TLS failure, timeout).
pub const NO_RESPONSE_STATUS: i32 = -1;

// ---------------------------------------------------------------------------
// Provisioning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionError {
    /// The WiFi link could not be established.
    WifiUnavailable,
    /// The wall clock never became plausible after a sync request.
    ClockUntrusted,
    /// The HTTPS request could not be set up (bad URL, trust anchor).
    TransportSetupFailed,
    /// Every attempt failed. Carries the status of the last one.
    RemoteRejected(i32),
    /// The service answered 200 with a body that is not a usable credential.
    InvalidCredential,
    /// The credential was issued but could not be written to flash.
    PersistFailed,
}

impl fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WifiUnavailable => write!(f, "WiFi unavailable"),
            Self::ClockUntrusted => write!(f, "clock not trusted"),
            Self::TransportSetupFailed => write!(f, "transport setup failed"),
            Self::RemoteRejected(status) => write!(f, "remote rejected (status {status})"),
            Self::InvalidCredential => write!(f, "invalid credential in response"),
            Self::PersistFailed => write!(f, "credential persist failed"),
        }
    }
}

impl std::error::Error for ProvisionError {}

// ---------------------------------------------------------------------------
// Relay
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayError {
    /// No credential in the session; INIT has not succeeded yet.
    NoCredential,
    WifiUnavailable,
    TransportSetupFailed,
    /// Every attempt failed. Carries the status of the last one.
    RemoteRejected(i32),
    /// The answer exceeded the response cap and was not forwarded.
    AnswerTooLarge,
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredential => write!(f, "no credential"),
            Self::WifiUnavailable => write!(f, "WiFi unavailable"),
            Self::TransportSetupFailed => write!(f, "transport setup failed"),
            Self::RemoteRejected(status) => write!(f, "remote rejected (status {status})"),
            Self::AnswerTooLarge => write!(f, "answer too large"),
        }
    }
}

impl std::error::Error for RelayError {}
