//! Prompt relay through the dispatcher.

use tillm_gateway::app::context::PlatformParts;
use tillm_gateway::app::dispatcher::CommandDispatcher;
use tillm_gateway::app::events::GatewayEvent;
use tillm_gateway::app::ports::{HttpError, HttpResponse};
use tillm_gateway::error::RelayError;

use crate::mock_platform::*;

fn initialised(mut p: PlatformParts<MockPlatform>) -> CommandDispatcher<MockPlatform> {
    p.storage = MockStorage::with_credential("session-key");
    let mut gw = gateway(p);
    assert_eq!(send(&mut gw, b"INIT\n"), vec!["OK"]);
    gw
}

#[test]
fn prompt_before_init_is_no_key_without_network() {
    let mut gw = gateway(parts());
    assert_eq!(send(&mut gw, b"what is 6*7\n"), vec!["NO KEY"]);
    assert_eq!(gw.context().link().begins, 0);
    assert!(gw.context().http().requests.is_empty());
    assert!(gw
        .context()
        .sink()
        .events
        .contains(&GatewayEvent::RelayFailed(RelayError::NoCredential)));
}

#[test]
fn stored_credential_is_not_used_until_init() {
    let mut p = parts();
    p.storage = MockStorage::with_credential("session-key");
    let mut gw = gateway(p);
    assert_eq!(send(&mut gw, b"hi\n"), vec!["NO KEY"]);
}

#[test]
fn relays_prompt_with_credential_header() {
    let mut gw = initialised(parts());
    assert_eq!(send(&mut gw, b"what is 6*7\n"), vec!["42"]);

    let req = gw.context().http().requests.last().unwrap();
    assert_eq!(req.url, ASK_URL);
    assert_eq!(req.body, b"what is 6*7");
    assert_eq!(req.header("X-ESP-KEY"), Some("session-key"));
    assert_eq!(req.header("Content-Type"), Some("text/plain"));
    assert!(gw.context().sink().events.contains(&GatewayEvent::RelayAnswered {
        prompt_len: 11,
        answer_len: 2,
    }));
}

#[test]
fn empty_prompt_is_still_relayed() {
    // A line of only spaces is a prompt; the remote decides what to do.
    let mut gw = initialised(parts());
    gw.context_mut().http_mut().fallback = reply(400, "EMPTY");
    assert_eq!(send(&mut gw, b" \n"), vec!["ERR 400"]);
}

#[test]
fn answer_is_forwarded_verbatim() {
    let mut gw = initialised(parts());
    gw.context_mut().http_mut().fallback = reply(200, "x = 3.5, y = -2");
    assert_eq!(send(&mut gw, b"solve\n"), vec!["x = 3.5, y = -2"]);
}

#[test]
fn non_utf8_answer_is_replaced_not_dropped() {
    let mut gw = initialised(parts());
    gw.context_mut().http_mut().fallback =
        Ok(HttpResponse { status: 200, body: vec![b'o', 0xFF, b'k'] });
    assert_eq!(send(&mut gw, b"q\n"), vec!["o\u{FFFD}k"]);
}

#[test]
fn non_utf8_prompt_bytes_are_sent_unchanged() {
    let mut gw = initialised(parts());
    assert_eq!(send(&mut gw, b"a\xFFb\n"), vec!["42"]);
    assert_eq!(gw.context().http().requests.last().unwrap().body, b"a\xFFb");
}

#[test]
fn wifi_down_is_err_wifi() {
    let mut gw = initialised(parts());
    gw.context_mut().link_mut().reachable = false;
    assert_eq!(send(&mut gw, b"q\n"), vec!["ERR WIFI"]);
    assert!(gw.context().http().requests.is_empty());
}

#[test]
fn always_failing_relay_gets_exactly_three_attempts() {
    let mut gw = initialised(parts());
    gw.context_mut().http_mut().fallback = reply(500, "INTERNAL ERROR");
    assert_eq!(send(&mut gw, b"q\n"), vec!["ERR 500"]);
    assert_eq!(gw.context().http().requests.len(), 3);
}

#[test]
fn relay_setup_failure_is_err_url() {
    let mut gw = initialised(parts());
    gw.context_mut().http_mut().fallback = Err(HttpError::Setup);
    assert_eq!(send(&mut gw, b"q\n"), vec!["ERR URL"]);
}

#[test]
fn forbidden_credential_reports_status() {
    let mut gw = initialised(parts());
    gw.context_mut().http_mut().fallback = reply(403, "FORBIDDEN");
    assert_eq!(send(&mut gw, b"q\n"), vec!["ERR 403"]);
}

#[test]
fn oversized_answer_is_err_size_without_retry() {
    let mut gw = initialised(parts());
    gw.context_mut().http_mut().fallback = Err(HttpError::BodyTooLarge);
    let before = gw.context().http().requests.len();
    assert_eq!(send(&mut gw, b"summarise this\n"), vec!["ERR SIZE"]);
    assert_eq!(gw.context().http().requests.len(), before + 1);
}
