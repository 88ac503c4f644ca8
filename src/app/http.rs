//! POST with the shared attempt policy.

use embedded_hal::delay::DelayNs;
use log::warn;

use crate::error::NO_RESPONSE_STATUS;
use crate::retry::{attempt_with_retry, Attempt, RetryPolicy};

use super::ports::{HttpError, HttpPort, HttpRequest, HttpResponse};

/// Why [`post_with_retry`] gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFailure {
    /// The request could not be prepared; no attempt reached the network.
    Setup,
    /// Every attempt failed. Status of the last one, or
    /// [`NO_RESPONSE_STATUS`].
    Rejected(i32),
    /// The body did not fit the response cap; the same request would
    /// overflow again.
    TooLarge,
}

/// POST until the first 200, up to `policy.max_attempts` times with a
/// fixed pause in between. Setup failures stop immediately.
pub fn post_with_retry<H, D>(
    http: &mut H,
    delay: &mut D,
    policy: &RetryPolicy,
    request: &HttpRequest<'_>,
) -> Result<HttpResponse, PostFailure>
where
    H: HttpPort,
    D: DelayNs,
{
    attempt_with_retry(policy, delay, |attempt, _| match http.post(request) {
        Ok(response) if response.status == 200 => Attempt::Done(response),
        Ok(response) => {
            warn!("HTTP: attempt {} got status {}", attempt, response.status);
            Attempt::Retry(PostFailure::Rejected(i32::from(response.status)))
        }
        Err(HttpError::NoResponse) => {
            warn!("HTTP: attempt {} got no response", attempt);
            Attempt::Retry(PostFailure::Rejected(NO_RESPONSE_STATUS))
        }
        Err(HttpError::Setup) => Attempt::Abort(PostFailure::Setup),
        Err(HttpError::BodyTooLarge) => {
            warn!("HTTP: attempt {} answer exceeds the response cap", attempt);
            Attempt::Abort(PostFailure::TooLarge)
        }
    })
}
