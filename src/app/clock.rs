//! Trusted wall clock.
//!
//! A reading is plausible only when it is strictly after a fixed epoch;
//! before network sync the RTC starts near 1970. [`TrustedClock::trusted_now`]
//! is the only way to obtain a timestamp for signing.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::retry::{poll_until, PollPolicy};

use super::ports::ClockPort;

pub struct TrustedClock<K: ClockPort> {
    clock: K,
    plausible_after: u64,
    sync_poll: PollPolicy,
}

impl<K: ClockPort> TrustedClock<K> {
    pub fn new(clock: K, plausible_after: u64, sync_poll: PollPolicy) -> Self {
        Self {
            clock,
            plausible_after,
            sync_poll,
        }
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    pub fn is_plausible(&self) -> bool {
        self.clock.now_unix() > self.plausible_after
    }

    /// Make sure the clock is plausible, requesting network time if it
    /// is not. Bounded by the sync poll policy.
    pub fn ensure_trusted<D: DelayNs>(&mut self, delay: &mut D) -> bool {
        if self.is_plausible() {
            return true;
        }

        info!("Clock: not plausible, requesting network time");
        self.clock.request_sync();

        let clock = &self.clock;
        let threshold = self.plausible_after;
        if poll_until(&self.sync_poll, delay, || clock.now_unix() > threshold) {
            info!("Clock: synchronised ({})", clock.now_unix());
            true
        } else {
            warn!("Clock: still untrusted after {} polls", self.sync_poll.max_polls);
            false
        }
    }

    /// Current Unix time truncated to `u32`, or `None` if not plausible.
    pub fn trusted_now(&self) -> Option<u32> {
        let now = self.clock.now_unix();
        (now > self.plausible_after).then_some(now as u32)
    }
}
