//! Line decoder and command dispatcher.
//!
//! The decoder turns the serial byte stream into lines:
//!
//! ```text
//!   '\r'            → ignored
//!   '\n' (Idle)     → ignored
//!   '\n' (Accum.)   → Line, back to Idle
//!   other           → appended; 1025th byte → Overflow, back to Idle
//! ```
//!
//! The dispatcher classifies each line and produces exactly one response.
//! Handlers block until they finish; a command received while another is
//! running waits in the transport's receive buffer.

use log::{info, warn};

use crate::config::GatewayConfig;

use super::commands::{Command, ErrorToken, Response};
use super::context::GatewayContext;
use super::events::GatewayEvent;
use super::ports::{EventSink, Platform, Transport};
use super::provisioning::ProvisioningHandshake;
use super::relay::RelayClient;

/// Longest accepted line, excluding its terminator.
pub const MAX_LINE_LEN: usize = 1024;

/// Written once when the firmware is ready for commands.
pub const BANNER: &str = "ESP gateway ready";

const LINE_END: &[u8] = b"\r\n";

// ───────────────────────────────────────────────────────────────
// Line decoder
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// No line in progress. The buffer content is stale.
    Idle,
    /// At least one byte of the current line is buffered.
    Accumulating,
}

#[derive(Debug, PartialEq, Eq)]
pub enum LineEvent<'a> {
    /// A complete, non-empty line without terminator.
    Line(&'a [u8]),
    /// The line outgrew [`MAX_LINE_LEN`] and was discarded.
    Overflow,
}

/// Streaming line decoder with a fixed buffer.
pub struct LineDecoder {
    state: DecoderState,
    buf: heapless::Vec<u8, MAX_LINE_LEN>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::Idle,
            buf: heapless::Vec::new(),
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Feed one byte. A returned line is valid until the next call.
    pub fn feed(&mut self, byte: u8) -> Option<LineEvent<'_>> {
        match byte {
            b'\r' => None,
            b'\n' => match self.state {
                DecoderState::Idle => None,
                DecoderState::Accumulating => {
                    self.state = DecoderState::Idle;
                    Some(LineEvent::Line(&self.buf))
                }
            },
            _ => {
                if self.state == DecoderState::Idle {
                    self.buf.clear();
                    self.state = DecoderState::Accumulating;
                }
                if self.buf.push(byte).is_err() {
                    // Overflowing byte is dropped along with the line.
                    self.buf.clear();
                    self.state = DecoderState::Idle;
                    return Some(LineEvent::Overflow);
                }
                None
            }
        }
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// Dispatcher
// ───────────────────────────────────────────────────────────────

pub struct CommandDispatcher<P: Platform> {
    ctx: GatewayContext<P>,
    decoder: LineDecoder,
    handshake: ProvisioningHandshake,
    relay: RelayClient,
}

impl<P: Platform> CommandDispatcher<P> {
    pub fn new(config: &GatewayConfig, ctx: GatewayContext<P>) -> Self {
        Self {
            ctx,
            decoder: LineDecoder::new(),
            handshake: ProvisioningHandshake::from_config(config),
            relay: RelayClient::from_config(config),
        }
    }

    pub fn context(&self) -> &GatewayContext<P> {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut GatewayContext<P> {
        &mut self.ctx
    }

    pub fn decoder_state(&self) -> DecoderState {
        self.decoder.state()
    }

    /// Feed one byte; returns a response when it completes a command
    /// or overflows the line buffer.
    pub fn feed(&mut self, byte: u8) -> Option<Response> {
        let command = match self.decoder.feed(byte)? {
            LineEvent::Line(line) => Command::parse(line),
            LineEvent::Overflow => {
                warn!("Serial: line longer than {} bytes discarded", MAX_LINE_LEN);
                self.ctx.sink.emit(&GatewayEvent::LineOverflow);
                return Some(Response::Error(ErrorToken::Long));
            }
        };
        Some(self.dispatch(command))
    }

    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Vec<Response> {
        bytes.iter().filter_map(|&b| self.feed(b)).collect()
    }

    /// Run one command to completion.
    pub fn dispatch(&mut self, command: Command) -> Response {
        self.ctx.sink.emit(&GatewayEvent::CommandReceived(command.kind()));
        match command {
            Command::Ping => Response::Pong,
            Command::Init => self.init(),
            Command::Exit => {
                self.ctx.connectivity.disconnect();
                self.ctx.sink.emit(&GatewayEvent::LinkReleased);
                Response::Bye
            }
            Command::Prompt(prompt) => self.prompt(&prompt),
        }
    }

    fn init(&mut self) -> Response {
        if let Some(credential) = self.ctx.credentials.load() {
            self.ctx.credential = Some(credential);
            self.ctx.sink.emit(&GatewayEvent::CredentialLoaded);
            return Response::Ok;
        }

        match self.handshake.provision(&mut self.ctx) {
            Ok(credential) => {
                info!("INIT: provisioned");
                self.ctx.credential = Some(credential);
                self.ctx.sink.emit(&GatewayEvent::Provisioned);
                Response::Ok
            }
            Err(e) => {
                warn!("INIT: {}", e);
                self.ctx.sink.emit(&GatewayEvent::ProvisionFailed(e));
                e.into()
            }
        }
    }

    fn prompt(&mut self, prompt: &[u8]) -> Response {
        match self.relay.ask(&mut self.ctx, prompt) {
            Ok(answer) => {
                self.ctx.sink.emit(&GatewayEvent::RelayAnswered {
                    prompt_len: prompt.len(),
                    answer_len: answer.len(),
                });
                Response::Answer(answer)
            }
            Err(e) => {
                self.ctx.sink.emit(&GatewayEvent::RelayFailed(e));
                e.into()
            }
        }
    }

    /// Write the ready banner.
    pub fn announce<T: Transport>(&mut self, transport: &mut T) -> Result<(), T::Error> {
        transport.write(BANNER.as_bytes())?;
        transport.write(LINE_END)?;
        transport.flush()
    }

    /// Drain every byte currently readable from `transport`, answering
    /// each completed command. Returns the number of responses written.
    ///
    /// A write error does not abandon the chunk already read: its
    /// remaining commands still run (their responses are dropped), then
    /// the first write error is returned and nothing more is read.
    pub fn pump<T: Transport>(&mut self, transport: &mut T) -> Result<usize, T::Error> {
        let mut buf = [0u8; 64];
        let mut written = 0;
        let mut failed = None;
        while failed.is_none() {
            let n = transport.read(&mut buf)?;
            if n == 0 {
                break;
            }
            for &byte in &buf[..n] {
                let Some(response) = self.feed(byte) else {
                    continue;
                };
                if failed.is_some() {
                    warn!("Serial: response dropped after write failure");
                    continue;
                }
                match write_line(transport, &response) {
                    Ok(()) => written += 1,
                    Err(e) => failed = Some(e),
                }
            }
        }
        if let Some(e) = failed {
            return Err(e);
        }
        if written > 0 {
            transport.flush()?;
        }
        Ok(written)
    }
}

fn write_line<T: Transport>(transport: &mut T, response: &Response) -> Result<(), T::Error> {
    transport.write(response.to_string().as_bytes())?;
    transport.write(LINE_END)
}
