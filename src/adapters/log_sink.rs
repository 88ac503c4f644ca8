//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured gateway events to the
//! ESP-IDF logger (console UART in production). Prompts, answers and
//! credentials are reported by length only.

use log::{info, warn};

use crate::app::events::GatewayEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`GatewayEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &GatewayEvent) {
        match event {
            GatewayEvent::CommandReceived(kind) => {
                info!("CMD | kind={:?}", kind);
            }
            GatewayEvent::LineOverflow => {
                warn!("CMD | line overflow, discarded");
            }
            GatewayEvent::CredentialLoaded => {
                info!("KEY | source=nvs");
            }
            GatewayEvent::Provisioned => {
                info!("KEY | source=provisioning");
            }
            GatewayEvent::ProvisionFailed(e) => {
                warn!("PROV | failed reason={}", e);
            }
            GatewayEvent::RelayAnswered { prompt_len, answer_len } => {
                info!("RELAY | prompt={}B answer={}B", prompt_len, answer_len);
            }
            GatewayEvent::RelayFailed(e) => {
                warn!("RELAY | failed reason={}", e);
            }
            GatewayEvent::LinkReleased => {
                info!("LINK | released");
            }
        }
    }
}
