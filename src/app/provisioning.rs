//! Provisioning handshake: trade a signed device proof for a credential.
//!
//! ```text
//!   connect ─▶ trusted clock ─▶ sign(device_id:ts) ─▶ POST JSON ─▶ persist
//!   ERR WIFI    ERR TIME                               ERR URL/<status>  ERR KEY/NVS
//! ```

use log::{info, warn};

use crate::config::GatewayConfig;
use crate::error::ProvisionError;
use crate::identity::{Credential, FactorySecret, SignedProvisioningRequest};
use crate::retry::RetryPolicy;

use super::context::GatewayContext;
use super::http::{post_with_retry, PostFailure};
use super::ports::{HttpRequest, Platform};

pub const CONTENT_TYPE_JSON: &str = "application/json";

pub struct ProvisioningHandshake {
    url: String,
    secret: FactorySecret,
    policy: RetryPolicy,
}

impl ProvisioningHandshake {
    pub fn new(url: impl Into<String>, secret: FactorySecret, policy: RetryPolicy) -> Self {
        Self {
            url: url.into(),
            secret,
            policy,
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(
            config.provision_url.clone(),
            FactorySecret::new(&config.factory_secret),
            config.http_policy(),
        )
    }

    /// Run the full handshake. On success the credential is already
    /// persisted; the caller owns caching it in the session.
    pub fn provision<P: Platform>(&self, ctx: &mut GatewayContext<P>) -> Result<Credential, ProvisionError> {
        if !ctx.connectivity.connect(&mut ctx.delay) {
            return Err(ProvisionError::WifiUnavailable);
        }
        if !ctx.clock.ensure_trusted(&mut ctx.delay) {
            return Err(ProvisionError::ClockUntrusted);
        }
        let timestamp = ctx.clock.trusted_now().ok_or(ProvisionError::ClockUntrusted)?;

        let request = SignedProvisioningRequest::new(&self.secret, ctx.device_id.clone(), timestamp);
        let body = request.to_json().map_err(|e| {
            warn!("Provision: could not encode request: {}", e);
            ProvisionError::TransportSetupFailed
        })?;
        info!("Provision: device={} ts={}", request.device_id, timestamp);

        let headers = [("Content-Type", CONTENT_TYPE_JSON)];
        let http_request = HttpRequest {
            url: &self.url,
            headers: &headers,
            body: &body,
            timeout: self.policy.attempt_timeout,
        };
        let response = post_with_retry(&mut ctx.http, &mut ctx.delay, &self.policy, &http_request)
            .map_err(|failure| match failure {
                PostFailure::Setup => ProvisionError::TransportSetupFailed,
                PostFailure::Rejected(status) => ProvisionError::RemoteRejected(status),
                // Anything over the cap cannot be a storable credential.
                PostFailure::TooLarge => ProvisionError::InvalidCredential,
            })?;

        let credential = Credential::parse(&response.body).map_err(|e| {
            warn!("Provision: refusing issued credential: {}", e);
            ProvisionError::InvalidCredential
        })?;
        ctx.credentials.save(&credential).map_err(|e| {
            warn!("Provision: could not persist credential: {}", e);
            ProvisionError::PersistFailed
        })?;

        Ok(credential)
    }
}
