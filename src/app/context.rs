//! Explicit gateway context.
//!
//! Everything the command handlers touch lives here and is passed by
//! `&mut` reference: the connectivity manager, the trusted clock, the
//! credential store, the HTTP client, the delay provider, the event sink,
//! the device id, and the session credential.

use crate::config::GatewayConfig;
use crate::identity::{Credential, DeviceId};

use super::clock::TrustedClock;
use super::connectivity::{ConnectivityManager, ConnectivityState};
use super::credentials::CredentialStore;
use super::ports::Platform;

/// One adapter per port, handed over at construction.
pub struct PlatformParts<P: Platform> {
    pub link: P::Link,
    pub clock: P::Clock,
    pub storage: P::Storage,
    pub http: P::Http,
    pub delay: P::Delay,
    pub sink: P::Sink,
}

pub struct GatewayContext<P: Platform> {
    pub(crate) connectivity: ConnectivityManager<P::Link>,
    pub(crate) clock: TrustedClock<P::Clock>,
    pub(crate) credentials: CredentialStore<P::Storage>,
    pub(crate) http: P::Http,
    pub(crate) delay: P::Delay,
    pub(crate) sink: P::Sink,
    pub(crate) device_id: DeviceId,
    /// Session credential. Set only by a successful INIT.
    pub(crate) credential: Option<Credential>,
}

impl<P: Platform> GatewayContext<P> {
    pub fn new(config: &GatewayConfig, device_id: DeviceId, parts: PlatformParts<P>) -> Self {
        Self {
            connectivity: ConnectivityManager::new(parts.link, config.wifi_rounds(), config.wifi_poll()),
            clock: TrustedClock::new(parts.clock, config.plausible_after_unix, config.time_sync_poll()),
            credentials: CredentialStore::new(parts.storage),
            http: parts.http,
            delay: parts.delay,
            sink: parts.sink,
            device_id,
            credential: None,
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn connectivity_state(&self) -> ConnectivityState {
        self.connectivity.state()
    }

    // ── Adapter access ────────────────────────────────────────

    pub fn link(&self) -> &P::Link {
        self.connectivity.link()
    }

    pub fn link_mut(&mut self) -> &mut P::Link {
        self.connectivity.link_mut()
    }

    pub fn clock(&self) -> &P::Clock {
        self.clock.clock()
    }

    pub fn storage(&self) -> &P::Storage {
        self.credentials.storage()
    }

    pub fn http(&self) -> &P::Http {
        &self.http
    }

    pub fn http_mut(&mut self) -> &mut P::Http {
        &mut self.http
    }

    pub fn delay(&self) -> &P::Delay {
        &self.delay
    }

    pub fn sink(&self) -> &P::Sink {
        &self.sink
    }
}
