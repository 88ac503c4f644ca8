//! Device identity, credential and provisioning signature types.
//!
//! Each wire-level string gets its own type so a device id can never be
//! handed to something expecting a credential or a signature.
//!
//! The provisioning proof is
//!
//! ```text
//! sig = hex(HMAC-SHA256(key = factory_secret, msg = "<device_id>:<ts>"))
//! ```
//!
//! computed with the `hmac-sha256` crate, which behaves identically on
//! ESP-IDF and host targets.

use core::fmt;
use core::fmt::Write;

use serde::Serialize;

use crate::utils::hex_lower;

/// Length of a [`DeviceId`] in characters.
pub const DEVICE_ID_LEN: usize = 12;

/// Length of a hex-encoded HMAC-SHA256 tag.
pub const SIGNATURE_HEX_LEN: usize = 64;

/// Longest credential that fits an NVS string entry (4000 bytes
/// including the NUL terminator).
pub const MAX_CREDENTIAL_LEN: usize = 3999;

/// Full 6-byte factory MAC address.
pub type MacAddress = [u8; 6];

// ───────────────────────────────────────────────────────────────
// DeviceId
// ───────────────────────────────────────────────────────────────

/// 12 uppercase hex characters derived from the factory MAC.
///
/// The MAC is read as a little-endian 48-bit integer (byte 0 least
/// significant) and printed as 16 high bits followed by 32 low bits,
/// so `DE:AD:BE:EF:CA:FE` becomes `FECAEFBEADDE`. Re-derived on every
/// boot, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DeviceId(heapless::String<DEVICE_ID_LEN>);

impl DeviceId {
    pub fn from_mac(mac: &MacAddress) -> Self {
        let mut raw = [0u8; 8];
        raw[..6].copy_from_slice(mac);
        let v = u64::from_le_bytes(raw);

        let mut id = heapless::String::new();
        // 4 + 8 hex digits always fit in DEVICE_ID_LEN.
        let _ = write!(id, "{:04X}{:08X}", (v >> 32) as u16, v as u32);
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ───────────────────────────────────────────────────────────────
// FactorySecret
// ───────────────────────────────────────────────────────────────

/// Shared secret burned in at the factory. Never logged.
#[derive(Clone)]
pub struct FactorySecret(Vec<u8>);

impl FactorySecret {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self(secret.as_ref().to_vec())
    }
}

impl fmt::Debug for FactorySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FactorySecret(<{} bytes>)", self.0.len())
    }
}

// ───────────────────────────────────────────────────────────────
// Signature
// ───────────────────────────────────────────────────────────────

/// 64 lowercase hex characters of an HMAC-SHA256 tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Signature(heapless::String<SIGNATURE_HEX_LEN>);

impl Signature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sign `"<device_id>:<timestamp>"` with the factory secret.
pub fn sign(secret: &FactorySecret, device_id: &DeviceId, timestamp: u32) -> Signature {
    // 12 id chars + ':' + at most 10 decimal digits.
    let mut msg = heapless::String::<24>::new();
    let _ = write!(msg, "{}:{}", device_id, timestamp);

    let tag = hmac_sha256::HMAC::mac(msg.as_bytes(), &secret.0);
    // 32 bytes always encode to exactly SIGNATURE_HEX_LEN characters.
    Signature(hex_lower(&tag).unwrap_or_default())
}

// ───────────────────────────────────────────────────────────────
// SignedProvisioningRequest
// ───────────────────────────────────────────────────────────────

/// JSON body of the provisioning POST: `{"device_id","ts","sig"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedProvisioningRequest {
    pub device_id: DeviceId,
    #[serde(rename = "ts")]
    pub timestamp: u32,
    #[serde(rename = "sig")]
    pub signature: Signature,
}

impl SignedProvisioningRequest {
    /// Build and sign a request. `timestamp` must come from a trusted clock.
    pub fn new(secret: &FactorySecret, device_id: DeviceId, timestamp: u32) -> Self {
        let signature = sign(secret, &device_id, timestamp);
        Self {
            device_id,
            timestamp,
            signature,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

// ───────────────────────────────────────────────────────────────
// Credential
// ───────────────────────────────────────────────────────────────

/// Why a byte string was refused as a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    Empty,
    TooLong(usize),
    /// Not UTF-8, or contains CR, LF or NUL, none of which can travel
    /// in an HTTP header value or an NVS string.
    Unsendable,
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "credential is empty"),
            Self::TooLong(n) => write!(f, "credential too long ({} > {} bytes)", n, MAX_CREDENTIAL_LEN),
            Self::Unsendable => write!(f, "credential is not a valid header value"),
        }
    }
}

/// Opaque access credential issued by the remote service.
///
/// Stored verbatim, never trimmed; `Debug` only shows the length.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn parse(raw: &[u8]) -> Result<Self, CredentialError> {
        if raw.is_empty() {
            return Err(CredentialError::Empty);
        }
        if raw.len() > MAX_CREDENTIAL_LEN {
            return Err(CredentialError::TooLong(raw.len()));
        }
        if raw.iter().any(|b| matches!(b, b'\r' | b'\n' | 0)) {
            return Err(CredentialError::Unsendable);
        }
        let text = core::str::from_utf8(raw).map_err(|_| CredentialError::Unsendable)?;
        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<{} bytes>)", self.0.len())
    }
}
