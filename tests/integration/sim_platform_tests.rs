//! The host simulation adapters wired together the way `main` wires the
//! real ones, driven over an in-memory serial line.

use tillm_gateway::adapters::cert_store::{self, TrustMaterial};
use tillm_gateway::adapters::device_id::device_identity;
use tillm_gateway::adapters::https::HttpsAdapter;
use tillm_gateway::adapters::log_sink::LogEventSink;
use tillm_gateway::adapters::nvs::NvsAdapter;
use tillm_gateway::adapters::serial::MemorySerial;
use tillm_gateway::adapters::time::Esp32TimeAdapter;
use tillm_gateway::adapters::wifi::WifiAdapter;
use tillm_gateway::app::context::{GatewayContext, PlatformParts};
use tillm_gateway::app::dispatcher::CommandDispatcher;
use tillm_gateway::app::ports::{Platform, StoragePort};

use crate::mock_platform::{RecordingDelay, config};

struct SimPlatform;

impl Platform for SimPlatform {
    type Link = WifiAdapter;
    type Clock = Esp32TimeAdapter;
    type Storage = NvsAdapter;
    type Http = HttpsAdapter;
    type Delay = RecordingDelay;
    type Sink = LogEventSink;
}

fn sim_gateway() -> CommandDispatcher<SimPlatform> {
    let config = config();
    let trust = cert_store::load(&config.trust_anchor).unwrap();
    assert!(matches!(trust, TrustMaterial::Bundle));

    let parts = PlatformParts {
        link: WifiAdapter::new(&config.wifi_ssid, &config.wifi_password).unwrap(),
        clock: Esp32TimeAdapter::new(),
        storage: NvsAdapter::new().unwrap(),
        http: HttpsAdapter::new(trust, config.http_max_response_bytes),
        delay: RecordingDelay::default(),
        sink: LogEventSink::new(),
    };
    let ctx = GatewayContext::new(&config, device_identity(), parts);
    CommandDispatcher::new(&config, ctx)
}

#[test]
fn full_session_over_the_simulated_stack() {
    let mut gw = sim_gateway();
    let mut serial = MemorySerial::new();

    gw.announce(&mut serial).unwrap();
    assert_eq!(serial.take_lines(), vec!["ESP gateway ready"]);

    serial.inject(b"PING\r\nINIT\r\nhello there\r\nEXIT\r\n");
    assert_eq!(gw.pump(&mut serial), Ok(4));
    assert_eq!(serial.take_lines(), vec!["PONG", "OK", "hello there", "BYE"]);

    let mut buf = [0u8; 64];
    let n = gw.context().storage().read_str("tillm", "api_key", &mut buf).unwrap();
    assert_eq!(&buf[..n], b"sim-FECAEFBEADDE");
    assert_eq!(gw.context().credential().map(|c| c.as_str()), Some("sim-FECAEFBEADDE"));
}

#[test]
fn unreachable_access_point_reports_err_wifi() {
    let mut gw = sim_gateway();
    gw.context_mut().link_mut().set_sim_reachable(false);

    let mut serial = MemorySerial::new();
    serial.inject(b"INIT\n");
    gw.pump(&mut serial).unwrap();
    assert_eq!(serial.take_lines(), vec!["ERR WIFI"]);
    assert!(gw.context().credential().is_none());
}
