//! Outbound gateway events.
//!
//! The [`CommandDispatcher`](super::dispatcher::CommandDispatcher) and its
//! components emit these through the [`EventSink`](super::ports::EventSink)
//! port. Events never carry secrets or credentials; prompts and answers
//! are reported by length only.

use crate::error::{ProvisionError, RelayError};

use super::commands::CommandKind;

/// Structured events emitted by the gateway core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    /// A complete line was decoded and classified.
    CommandReceived(CommandKind),

    /// An input line exceeded the buffer and was discarded.
    LineOverflow,

    /// INIT found a persisted credential and skipped provisioning.
    CredentialLoaded,

    /// A credential was issued and persisted.
    Provisioned,

    ProvisionFailed(ProvisionError),

    RelayAnswered { prompt_len: usize, answer_len: usize },

    RelayFailed(RelayError),

    /// EXIT released the link.
    LinkReleased,
}
