//! Certificate store. Turns the configured [`TrustAnchor`] into the form
//! the ESP-IDF TLS stack consumes.
//!
//! mbedTLS wants a PEM blob that is NUL-terminated and outlives every
//! connection, so a pinned root is validated, terminated, and leaked
//! once at boot. The certificate bundle needs no material of its own.

use log::info;

use crate::config::TrustAnchor;

/// Maximum certificate size (PEM format, includes headers).
const MAX_CERT_SIZE: usize = 4096;

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

/// Trust material ready to hand to the HTTPS client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustMaterial {
    /// NUL-terminated PEM root certificate.
    PinnedRoot(&'static [u8]),
    /// ESP-IDF built-in CA bundle.
    Bundle,
}

/// Validate and prepare a trust anchor. Call once; pinned roots are
/// leaked to obtain the `'static` lifetime TLS requires.
pub fn load(anchor: &TrustAnchor) -> Result<TrustMaterial, CertStoreError> {
    match anchor {
        TrustAnchor::Bundle => {
            info!("CertStore: using built-in CA bundle");
            Ok(TrustMaterial::Bundle)
        }
        TrustAnchor::PinnedRoot(pem) => {
            let pem = pem.trim();
            if !pem.starts_with(PEM_BEGIN) || !pem.ends_with(PEM_END) {
                return Err(CertStoreError::NotPem);
            }
            if pem.as_bytes().contains(&0) {
                return Err(CertStoreError::EmbeddedNul);
            }
            // Room for the NUL terminator.
            if pem.len() + 1 > MAX_CERT_SIZE {
                return Err(CertStoreError::TooLarge(pem.len()));
            }

            let mut blob = Vec::with_capacity(pem.len() + 1);
            blob.extend_from_slice(pem.as_bytes());
            blob.push(0);
            info!("CertStore: pinned root loaded ({}B)", pem.len());
            Ok(TrustMaterial::PinnedRoot(Box::leak(blob.into_boxed_slice())))
        }
    }
}

/// Errors from the certificate store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertStoreError {
    NotPem,
    EmbeddedNul,
    TooLarge(usize),
}

impl core::fmt::Display for CertStoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotPem => write!(f, "pinned root is not a PEM certificate"),
            Self::EmbeddedNul => write!(f, "pinned root contains a NUL byte"),
            Self::TooLarge(n) => write!(f, "pinned root too large ({}B > {}B)", n, MAX_CERT_SIZE - 1),
        }
    }
}

impl std::error::Error for CertStoreError {}

// ── Tests ────────────────────────────────────────────────────
