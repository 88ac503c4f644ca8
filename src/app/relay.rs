//! Prompt relay: forward one prompt as raw bytes, return the answer.

use log::info;

use crate::config::GatewayConfig;
use crate::error::RelayError;
use crate::retry::RetryPolicy;

use super::context::GatewayContext;
use super::http::{post_with_retry, PostFailure};
use super::ports::{HttpRequest, Platform};

/// Header carrying the session credential.
pub const KEY_HEADER: &str = "X-ESP-KEY";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

pub struct RelayClient {
    url: String,
    policy: RetryPolicy,
}

impl RelayClient {
    pub fn new(url: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            url: url.into(),
            policy,
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(config.ask_url.clone(), config.http_policy())
    }

    /// Relay `prompt` using the session credential.
    ///
    /// Fails with [`RelayError::NoCredential`] before any network activity
    /// when INIT has not succeeded in this session.
    pub fn ask<P: Platform>(&self, ctx: &mut GatewayContext<P>, prompt: &[u8]) -> Result<String, RelayError> {
        let Some(credential) = ctx.credential.as_ref() else {
            return Err(RelayError::NoCredential);
        };
        if !ctx.connectivity.connect(&mut ctx.delay) {
            return Err(RelayError::WifiUnavailable);
        }

        let headers = [("Content-Type", CONTENT_TYPE_TEXT), (KEY_HEADER, credential.as_str())];
        let request = HttpRequest {
            url: &self.url,
            headers: &headers,
            body: prompt,
            timeout: self.policy.attempt_timeout,
        };
        let response = post_with_retry(&mut ctx.http, &mut ctx.delay, &self.policy, &request)
            .map_err(|failure| match failure {
                PostFailure::Setup => RelayError::TransportSetupFailed,
                PostFailure::Rejected(status) => RelayError::RemoteRejected(status),
                PostFailure::TooLarge => RelayError::AnswerTooLarge,
            })?;

        let answer = String::from_utf8_lossy(&response.body).into_owned();
        info!("Relay: {} bytes in, {} bytes out", prompt.len(), answer.len());
        Ok(answer)
    }
}
