//! WiFi connection manager.
//!
//! Owns the [`LinkPort`] and the only copy of [`ConnectivityState`].
//! A connection attempt is a bounded number of rounds; each round
//! initiates association and then polls the link at a fixed interval.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::retry::{attempt_with_retry, poll_until, Attempt, PollPolicy, RetryPolicy};

use super::ports::LinkPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Disconnected,
    Connecting,
    Connected,
}

pub struct ConnectivityManager<L: LinkPort> {
    link: L,
    state: ConnectivityState,
    rounds: RetryPolicy,
    poll: PollPolicy,
}

impl<L: LinkPort> ConnectivityManager<L> {
    pub fn new(link: L, rounds: RetryPolicy, poll: PollPolicy) -> Self {
        Self {
            link,
            state: ConnectivityState::Disconnected,
            rounds,
            poll,
        }
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Bring the link up. Returns immediately if it already is.
    ///
    /// Returns `false` only after every round has timed out or failed to
    /// start; the state is then `Disconnected`.
    pub fn connect<D: DelayNs>(&mut self, delay: &mut D) -> bool {
        if self.link.is_connected() {
            self.state = ConnectivityState::Connected;
            return true;
        }

        self.state = ConnectivityState::Connecting;
        let rounds = self.rounds;
        let poll = self.poll;
        let link = &mut self.link;

        let outcome: Result<u8, ()> = attempt_with_retry(&rounds, delay, |round, delay| {
            if let Err(e) = link.begin() {
                warn!("WiFi: round {} could not start: {}", round, e);
                return Attempt::Retry(());
            }
            if poll_until(&poll, delay, || link.is_connected()) {
                Attempt::Done(round)
            } else {
                warn!("WiFi: round {} timed out", round);
                Attempt::Retry(())
            }
        });

        match outcome {
            Ok(round) => {
                info!("WiFi: connected (round {})", round);
                self.state = ConnectivityState::Connected;
                true
            }
            Err(()) => {
                warn!("WiFi: giving up after {} rounds", rounds.max_attempts);
                self.state = ConnectivityState::Disconnected;
                false
            }
        }
    }

    /// Disconnect and power down the radio.
    pub fn disconnect(&mut self) {
        self.link.shutdown();
        self.state = ConnectivityState::Disconnected;
        info!("WiFi: released");
    }
}
