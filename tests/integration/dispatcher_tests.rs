//! Line protocol behaviour end to end through the dispatcher.

use tillm_gateway::adapters::serial::MemorySerial;
use tillm_gateway::app::commands::CommandKind;
use tillm_gateway::app::connectivity::ConnectivityState;
use tillm_gateway::app::dispatcher::{DecoderState, MAX_LINE_LEN};
use tillm_gateway::app::events::GatewayEvent;
use tillm_gateway::app::ports::Transport;

use crate::mock_platform::*;

#[test]
fn ping_performs_no_io() {
    let mut gw = gateway(parts());
    assert_eq!(send(&mut gw, b"PING\r\n"), vec!["PONG"]);

    let ctx = gw.context();
    assert_eq!(ctx.link().begins, 0);
    assert_eq!(ctx.storage().reads.get(), 0);
    assert!(ctx.http().requests.is_empty());
    assert!(ctx.delay().waits_ms.is_empty());
    assert_eq!(ctx.sink().events, vec![GatewayEvent::CommandReceived(CommandKind::Ping)]);
}

#[test]
fn bare_lf_and_crlf_both_terminate() {
    let mut gw = gateway(parts());
    assert_eq!(send(&mut gw, b"PING\nPING\r\n"), vec!["PONG", "PONG"]);
}

#[test]
fn blank_lines_produce_nothing() {
    let mut gw = gateway(parts());
    assert!(send(&mut gw, b"\r\n\n\r\n").is_empty());
    assert!(gw.context().sink().events.is_empty());
}

#[test]
fn keywords_are_case_sensitive() {
    // Lowercase "ping" is a prompt; without INIT that is NO KEY.
    let mut gw = gateway(parts());
    assert_eq!(send(&mut gw, b"ping\n"), vec!["NO KEY"]);
}

#[test]
fn overlong_line_reports_once_and_recovers() {
    let mut gw = gateway(parts());
    let mut input = vec![b'x'; MAX_LINE_LEN + 1];
    input.extend_from_slice(b"\r\nPING\r\n");

    assert_eq!(send(&mut gw, &input), vec!["ERR LONG", "PONG"]);
    assert_eq!(gw.decoder_state(), DecoderState::Idle);
    assert!(gw.context().http().requests.is_empty());
    assert!(gw.context().sink().events.contains(&GatewayEvent::LineOverflow));
}

#[test]
fn exactly_max_length_line_is_relayed() {
    let mut gw = gateway(parts());
    assert_eq!(send(&mut gw, b"INIT\n"), vec!["OK"]);

    let mut input = vec![b'q'; MAX_LINE_LEN];
    input.push(b'\n');
    assert_eq!(send(&mut gw, &input), vec!["42"]);
    let last = gw.context().http().requests.last().unwrap();
    assert_eq!(last.body.len(), MAX_LINE_LEN);
}

#[test]
fn exit_releases_the_link() {
    let mut gw = gateway(parts());
    assert_eq!(send(&mut gw, b"INIT\n"), vec!["OK"]);
    assert_eq!(gw.context().connectivity_state(), ConnectivityState::Connected);

    assert_eq!(send(&mut gw, b"EXIT\n"), vec!["BYE"]);
    assert_eq!(gw.context().connectivity_state(), ConnectivityState::Disconnected);
    assert_eq!(gw.context().link().shutdowns, 1);
    assert!(!gw.context().link().connected);
    assert!(gw.context().sink().events.contains(&GatewayEvent::LinkReleased));
}

#[test]
fn exit_keeps_the_session_credential() {
    let mut gw = gateway(parts());
    send(&mut gw, b"INIT\nEXIT\n");
    // The next prompt reconnects on demand with the cached credential.
    assert_eq!(send(&mut gw, b"hello\n"), vec!["42"]);
    assert_eq!(gw.context().link().begins, 2);
}

#[test]
fn pump_writes_crlf_terminated_responses() {
    let mut gw = gateway(parts());
    let mut serial = MemorySerial::new();

    gw.announce(&mut serial).unwrap();
    assert_eq!(serial.take_output(), b"ESP gateway ready\r\n");

    serial.inject(b"PING\r\nINIT\r\n2+2\r\n");
    assert_eq!(gw.pump(&mut serial), Ok(3));
    assert_eq!(serial.take_output(), b"PONG\r\nOK\r\n42\r\n");
    assert!(serial.flushes() >= 2);
}

#[test]
fn pump_handles_split_lines() {
    let mut gw = gateway(parts());
    let mut serial = MemorySerial::new();

    serial.inject(b"PI");
    assert_eq!(gw.pump(&mut serial), Ok(0));
    assert_eq!(gw.decoder_state(), DecoderState::Accumulating);

    serial.inject(b"NG\r\n");
    assert_eq!(gw.pump(&mut serial), Ok(1));
    assert_eq!(serial.take_lines(), vec!["PONG"]);
}

/// Serial line whose write side is broken; reads still work.
#[derive(Default)]
struct BrokenTx {
    input: Vec<u8>,
    write_attempts: u32,
    flushes: u32,
}

impl Transport for BrokenTx {
    type Error = &'static str;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.input.len());
        buf[..n].copy_from_slice(&self.input[..n]);
        self.input.drain(..n);
        Ok(n)
    }

    fn write(&mut self, _data: &[u8]) -> Result<(), Self::Error> {
        self.write_attempts += 1;
        Err("tx broken")
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }
}

#[test]
fn write_failure_still_runs_the_rest_of_the_chunk() {
    let mut gw = gateway(parts());
    let mut tx = BrokenTx { input: b"PING\nINIT\nEXIT\n".to_vec(), ..BrokenTx::default() };

    assert_eq!(gw.pump(&mut tx), Err("tx broken"));
    assert_eq!(tx.write_attempts, 1);
    assert_eq!(tx.flushes, 0);

    // INIT and EXIT after the failed PONG were still acted on.
    let ctx = gw.context();
    assert!(ctx.credential().is_some());
    assert_eq!(ctx.connectivity_state(), ConnectivityState::Disconnected);
    assert!(ctx.sink().events.contains(&GatewayEvent::CommandReceived(CommandKind::Exit)));
    assert_eq!(gw.decoder_state(), DecoderState::Idle);
}
