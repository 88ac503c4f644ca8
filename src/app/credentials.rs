//! Persistent credential store.

use log::{info, warn};

use crate::identity::{Credential, MAX_CREDENTIAL_LEN};

use super::ports::{StorageError, StoragePort};

/// NVS namespace holding the credential.
pub const NAMESPACE: &str = "tillm";
/// NVS key of the credential.
pub const KEY: &str = "api_key";

pub struct CredentialStore<S: StoragePort> {
    storage: S,
}

impl<S: StoragePort> CredentialStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The persisted credential, if any.
    ///
    /// A missing namespace or key, a read error, and a stored value that
    /// is not a valid credential all mean "no credential".
    pub fn load(&self) -> Option<Credential> {
        // One spare byte so an oversized value is detected, not truncated.
        let mut buf = vec![0u8; MAX_CREDENTIAL_LEN + 1];
        let len = match self.storage.read_str(NAMESPACE, KEY, &mut buf) {
            Ok(len) => len,
            Err(StorageError::NotFound) => return None,
            Err(e) => {
                warn!("Credentials: read failed: {}", e);
                return None;
            }
        };

        match Credential::parse(&buf[..len]) {
            Ok(credential) => {
                info!("Credentials: loaded ({} bytes)", len);
                Some(credential)
            }
            Err(e) => {
                warn!("Credentials: ignoring stored value: {}", e);
                None
            }
        }
    }

    /// Write and commit, replacing any previous value.
    pub fn save(&mut self, credential: &Credential) -> Result<(), StorageError> {
        self.storage.write_str(NAMESPACE, KEY, credential.as_str())?;
        info!("Credentials: saved ({} bytes)", credential.as_str().len());
        Ok(())
    }
}
