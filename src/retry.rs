//! Retry and polling policies.
//!
//! Every blocking loop in the gateway (WiFi rounds, link polling, time
//! sync, HTTP attempts) is described by one of these values and driven
//! by the helpers below. Delays go through [`DelayNs`] so that on target
//! they are FreeRTOS blocking waits and in tests they are recorded
//! instead of slept.

use core::time::Duration;

use embedded_hal::delay::DelayNs;

/// Bounded attempts with a fixed pause between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Zero is treated as one.
    pub max_attempts: u8,
    /// Upper bound handed to each attempt (e.g. the HTTP timeout).
    pub attempt_timeout: Duration,
    /// Fixed pause between consecutive attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u8, attempt_timeout: Duration, backoff: Duration) -> Self {
        Self {
            max_attempts,
            attempt_timeout,
            backoff,
        }
    }

    fn attempts(&self) -> u8 {
        self.max_attempts.max(1)
    }
}

/// Outcome of one attempt inside [`attempt_with_retry`].
#[derive(Debug)]
pub enum Attempt<T, E> {
    /// Success, stop immediately.
    Done(T),
    /// Failed; try again if the policy allows.
    Retry(E),
    /// Failed in a way that another attempt cannot fix.
    Abort(E),
}

/// Run `op` until it succeeds, aborts, or the policy is exhausted.
///
/// `op` receives the 1-based attempt number and the delay provider (so
/// it can poll internally). The pause is applied only *between*
/// attempts. On exhaustion the error of the last attempt is returned.
pub fn attempt_with_retry<T, E, D, F>(policy: &RetryPolicy, delay: &mut D, mut op: F) -> Result<T, E>
where
    D: DelayNs,
    F: FnMut(u8, &mut D) -> Attempt<T, E>,
{
    let attempts = policy.attempts();
    let mut attempt = 1;
    loop {
        match op(attempt, delay) {
            Attempt::Done(value) => return Ok(value),
            Attempt::Abort(err) => return Err(err),
            Attempt::Retry(err) => {
                if attempt >= attempts {
                    return Err(err);
                }
                delay.delay_ms(millis(policy.backoff));
                attempt += 1;
            }
        }
    }
}

/// Fixed-interval polling with a hard cap on the number of checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_polls: u32,
}

impl PollPolicy {
    pub const fn new(interval: Duration, max_polls: u32) -> Self {
        Self { interval, max_polls }
    }

    /// Poll every `interval` until `budget` has elapsed (at least once).
    pub fn within(budget: Duration, interval: Duration) -> Self {
        let interval_ms = interval.as_millis().max(1);
        let polls = budget.as_millis().div_ceil(interval_ms).max(1);
        Self {
            interval,
            max_polls: u32::try_from(polls).unwrap_or(u32::MAX),
        }
    }
}

/// Wait `interval`, then check `ready`; repeat up to `max_polls` times.
///
/// Returns `true` as soon as `ready` does, `false` when the bound is hit.
pub fn poll_until<D, F>(policy: &PollPolicy, delay: &mut D, mut ready: F) -> bool
where
    D: DelayNs,
    F: FnMut() -> bool,
{
    for _ in 0..policy.max_polls {
        delay.delay_ms(millis(policy.interval));
        if ready() {
            return true;
        }
    }
    false
}

fn millis(d: Duration) -> u32 {
    u32::try_from(d.as_millis()).unwrap_or(u32::MAX)
}
