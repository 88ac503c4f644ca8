//! Inbound commands and outbound responses of the line protocol.
//!
//! Every line received from the host calculator classifies as exactly one
//! [`Command`]; every command produces exactly one [`Response`] line.
//!
//! ```text
//!   PING     → PONG
//!   INIT     → OK | ERR WIFI | ERR TIME | ERR URL | ERR <status> | ERR KEY | ERR NVS
//!   EXIT     → BYE
//!   <other>  → <answer> | NO KEY | ERR WIFI | ERR URL | ERR <status> | ERR SIZE
//!   overflow → ERR LONG
//! ```

use core::fmt;

use crate::error::{ProvisionError, RelayError};

// ───────────────────────────────────────────────────────────────
// Commands
// ───────────────────────────────────────────────────────────────

/// A classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Init,
    Exit,
    /// Anything else, relayed as the raw line bytes. May be empty.
    Prompt(Vec<u8>),
}

/// Payload-free discriminant of [`Command`], safe to log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Ping,
    Init,
    Exit,
    Prompt,
}

impl Command {
    /// Classify one line (without its terminator). Matching is exact and
    /// case-sensitive. Prompt bytes are kept as received, whatever the
    /// host's character set.
    pub fn parse(line: &[u8]) -> Self {
        match line {
            b"PING" => Self::Ping,
            b"INIT" => Self::Init,
            b"EXIT" => Self::Exit,
            other => Self::Prompt(other.to_vec()),
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Ping => CommandKind::Ping,
            Self::Init => CommandKind::Init,
            Self::Exit => CommandKind::Exit,
            Self::Prompt(_) => CommandKind::Prompt,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Responses
// ───────────────────────────────────────────────────────────────

/// The token after `ERR ` in an error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorToken {
    Wifi,
    Time,
    Url,
    /// Last HTTP status, or -1 when no response was received.
    Status(i32),
    Long,
    Key,
    Nvs,
    /// Relay answer over the response cap.
    Size,
}

impl fmt::Display for ErrorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wifi => f.write_str("WIFI"),
            Self::Time => f.write_str("TIME"),
            Self::Url => f.write_str("URL"),
            Self::Status(code) => write!(f, "{code}"),
            Self::Long => f.write_str("LONG"),
            Self::Key => f.write_str("KEY"),
            Self::Nvs => f.write_str("NVS"),
            Self::Size => f.write_str("SIZE"),
        }
    }
}

/// One response line, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Pong,
    Ok,
    Bye,
    NoKey,
    /// Relay answer, forwarded verbatim.
    Answer(String),
    Error(ErrorToken),
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pong => f.write_str("PONG"),
            Self::Ok => f.write_str("OK"),
            Self::Bye => f.write_str("BYE"),
            Self::NoKey => f.write_str("NO KEY"),
            Self::Answer(text) => f.write_str(text),
            Self::Error(token) => write!(f, "ERR {token}"),
        }
    }
}

impl From<ProvisionError> for Response {
    fn from(e: ProvisionError) -> Self {
        let token = match e {
            ProvisionError::WifiUnavailable => ErrorToken::Wifi,
            ProvisionError::ClockUntrusted => ErrorToken::Time,
            ProvisionError::TransportSetupFailed => ErrorToken::Url,
            ProvisionError::RemoteRejected(status) => ErrorToken::Status(status),
            ProvisionError::InvalidCredential => ErrorToken::Key,
            ProvisionError::PersistFailed => ErrorToken::Nvs,
        };
        Self::Error(token)
    }
}

impl From<RelayError> for Response {
    fn from(e: RelayError) -> Self {
        match e {
            RelayError::NoCredential => Self::NoKey,
            RelayError::WifiUnavailable => Self::Error(ErrorToken::Wifi),
            RelayError::TransportSetupFailed => Self::Error(ErrorToken::Url),
            RelayError::RemoteRejected(status) => Self::Error(ErrorToken::Status(status)),
            RelayError::AnswerTooLarge => Self::Error(ErrorToken::Size),
        }
    }
}
