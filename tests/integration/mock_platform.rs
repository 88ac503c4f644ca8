//! Mock platform for integration tests.
//!
//! Every port call is recorded so tests can assert on the exact I/O a
//! command performed (or that it performed none).

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use tillm_gateway::app::context::{GatewayContext, PlatformParts};
use tillm_gateway::app::dispatcher::CommandDispatcher;
use tillm_gateway::app::events::GatewayEvent;
use tillm_gateway::app::ports::{
    ClockPort, ConnectivityError, EventSink, HttpError, HttpPort, HttpRequest, HttpResponse, LinkPort,
    Platform, StorageError, StoragePort,
};
use tillm_gateway::config::{GatewayConfig, TrustAnchor};
use tillm_gateway::identity::DeviceId;

pub const FACTORY_SECRET: &str = "test-factory-secret";
pub const PROVISION_URL: &str = "https://api.example.com/prod/provision";
pub const ASK_URL: &str = "https://api.example.com/prod/ask";
/// Plausible wall-clock time used by default.
pub const NOW: u64 = 1_712_345_678;
pub const SIM_MAC: [u8; 6] = [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE];

// ── Link ──────────────────────────────────────────────────────

pub struct MockLink {
    pub reachable: bool,
    pub connected: bool,
    pub begins: u32,
    pub shutdowns: u32,
}

impl MockLink {
    pub fn new(reachable: bool) -> Self {
        Self { reachable, connected: false, begins: 0, shutdowns: 0 }
    }
}

impl LinkPort for MockLink {
    fn begin(&mut self) -> Result<(), ConnectivityError> {
        self.begins += 1;
        self.connected = self.reachable;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn shutdown(&mut self) {
        self.shutdowns += 1;
        self.connected = false;
    }
}

// ── Clock ─────────────────────────────────────────────────────

pub struct MockClock {
    pub now: u64,
    /// Time the clock jumps to when a sync is requested (None = sync never lands).
    pub synced: Option<u64>,
    pub syncs: u32,
}

impl MockClock {
    pub fn at(now: u64) -> Self {
        Self { now, synced: None, syncs: 0 }
    }
}

impl ClockPort for MockClock {
    fn now_unix(&self) -> u64 {
        self.now
    }

    fn request_sync(&mut self) {
        self.syncs += 1;
        if let Some(t) = self.synced {
            self.now = t;
        }
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockStorage {
    pub values: HashMap<(String, String), String>,
    pub reads: Cell<u32>,
    pub writes: u32,
    pub fail_writes: bool,
}

impl MockStorage {
    pub fn with_credential(value: &str) -> Self {
        let mut s = Self::default();
        s.values.insert(("tillm".into(), "api_key".into()), value.into());
        s
    }

    pub fn credential(&self) -> Option<&str> {
        self.values
            .get(&("tillm".to_string(), "api_key".to_string()))
            .map(String::as_str)
    }
}

impl StoragePort for MockStorage {
    fn read_str(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        self.reads.set(self.reads.get() + 1);
        let value = self
            .values
            .get(&(namespace.to_string(), key.to_string()))
            .ok_or(StorageError::NotFound)?;
        if value.len() > buf.len() {
            return Err(StorageError::TooLarge);
        }
        buf[..value.len()].copy_from_slice(value.as_bytes());
        Ok(value.len())
    }

    fn write_str(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError> {
        self.writes += 1;
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        self.values.insert((namespace.into(), key.into()), value.into());
        Ok(())
    }
}

// ── HTTP ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub timeout: Duration,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Replies from `script` in order, then `fallback` forever.
pub struct MockHttp {
    pub script: VecDeque<Result<HttpResponse, HttpError>>,
    pub fallback: Result<HttpResponse, HttpError>,
    pub requests: Vec<RecordedRequest>,
}

impl MockHttp {
    pub fn always(reply: Result<HttpResponse, HttpError>) -> Self {
        Self { script: VecDeque::new(), fallback: reply, requests: Vec::new() }
    }

    pub fn scripted(replies: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self { script: replies.into(), fallback: Err(HttpError::NoResponse), requests: Vec::new() }
    }
}

pub fn reply(status: u16, body: &str) -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse { status, body: body.as_bytes().to_vec() })
}

impl HttpPort for MockHttp {
    fn post(&mut self, request: &HttpRequest<'_>) -> Result<HttpResponse, HttpError> {
        self.requests.push(RecordedRequest {
            url: request.url.to_string(),
            headers: request
                .headers
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            body: request.body.to_vec(),
            timeout: request.timeout,
        });
        self.script.pop_front().unwrap_or_else(|| self.fallback.clone())
    }
}

// ── Delay / sink ──────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingDelay {
    pub waits_ms: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<GatewayEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &GatewayEvent) {
        self.events.push(event.clone());
    }
}

// ── Platform ──────────────────────────────────────────────────

pub struct MockPlatform;

impl Platform for MockPlatform {
    type Link = MockLink;
    type Clock = MockClock;
    type Storage = MockStorage;
    type Http = MockHttp;
    type Delay = RecordingDelay;
    type Sink = RecordingSink;
}

pub fn config() -> GatewayConfig {
    GatewayConfig {
        wifi_ssid: "HomeWiFi".into(),
        wifi_password: "mysecret8".into(),
        provision_url: PROVISION_URL.into(),
        ask_url: ASK_URL.into(),
        trust_anchor: TrustAnchor::Bundle,
        factory_secret: FACTORY_SECRET.into(),
        ..GatewayConfig::default()
    }
}

/// Reachable WiFi, plausible clock, empty storage, and a remote that
/// answers `200 42` to everything.
pub fn parts() -> PlatformParts<MockPlatform> {
    PlatformParts {
        link: MockLink::new(true),
        clock: MockClock::at(NOW),
        storage: MockStorage::default(),
        http: MockHttp::always(reply(200, "42")),
        delay: RecordingDelay::default(),
        sink: RecordingSink::default(),
    }
}

pub fn parts_with_storage(storage: MockStorage) -> PlatformParts<MockPlatform> {
    PlatformParts { storage, ..parts() }
}

pub fn gateway(parts: PlatformParts<MockPlatform>) -> CommandDispatcher<MockPlatform> {
    let config = config();
    let ctx = GatewayContext::new(&config, DeviceId::from_mac(&SIM_MAC), parts);
    CommandDispatcher::new(&config, ctx)
}

/// Feed `input` and render every response as its wire text.
pub fn send(gw: &mut CommandDispatcher<MockPlatform>, input: &[u8]) -> Vec<String> {
    gw.feed_bytes(input).iter().map(ToString::to_string).collect()
}
