//! TI-LLM gateway firmware entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  WifiAdapter   Esp32TimeAdapter   NvsAdapter   HttpsAdapter    │
//! │  (LinkPort)    (ClockPort)        (Storage)    (HttpPort)      │
//! │  UartSerial    LogEventSink       FreeRtos                     │
//! │  (Transport)   (EventSink)        (DelayNs)                    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │           CommandDispatcher (pure logic)               │    │
//! │  │  LineDecoder · Provisioning · Relay                    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::{error, info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{config::Config as UartConfig, UartDriver};
use esp_idf_hal::units::Hertz;

use tillm_gateway::adapters::cert_store;
use tillm_gateway::adapters::device_id::device_identity;
use tillm_gateway::adapters::https::HttpsAdapter;
use tillm_gateway::adapters::log_sink::LogEventSink;
use tillm_gateway::adapters::nvs::NvsAdapter;
use tillm_gateway::adapters::serial::{UartSerial, BAUD_RATE};
use tillm_gateway::adapters::time::Esp32TimeAdapter;
use tillm_gateway::adapters::wifi::WifiAdapter;
use tillm_gateway::app::context::{GatewayContext, PlatformParts};
use tillm_gateway::app::dispatcher::CommandDispatcher;
use tillm_gateway::app::ports::Platform;
use tillm_gateway::config::GatewayConfig;
use tillm_gateway::pins;

/// Idle pause between serial polls.
const PUMP_INTERVAL_MS: u32 = 10;

struct EspPlatform;

impl Platform for EspPlatform {
    type Link = WifiAdapter;
    type Clock = Esp32TimeAdapter;
    type Storage = NvsAdapter;
    type Http = HttpsAdapter;
    type Delay = FreeRtos;
    type Sink = LogEventSink;
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  TI-LLM gateway v{}                 ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = GatewayConfig::default();
    if let Err(e) = config.validate() {
        error!("Config rejected: {}; refusing to start", e);
        return Err(e.into());
    }

    let device_id = device_identity();
    info!("Device: {}", device_id);

    // ── 3. Peripherals and adapters ───────────────────────────
    let peripherals = Peripherals::take().context("peripherals already taken")?;
    let sysloop = EspSystemEventLoop::take().context("system event loop")?;

    let storage = NvsAdapter::new().context("NVS init")?;
    let link = WifiAdapter::new(peripherals.modem, sysloop, &config.wifi_ssid, &config.wifi_password)
        .context("WiFi init")?;
    let trust = cert_store::load(&config.trust_anchor).context("trust anchor")?;

    // SAFETY: the link pins are used by nothing else on this board.
    let (tx, rx) = unsafe {
        (
            AnyIOPin::new(pins::LINK_UART_TX_GPIO),
            AnyIOPin::new(pins::LINK_UART_RX_GPIO),
        )
    };
    let uart = UartDriver::new(
        peripherals.uart1,
        tx,
        rx,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(BAUD_RATE)),
    )
    .context("UART init")?;
    let mut serial = UartSerial::new(uart);
    info!(
        "Link UART: tx=GPIO{} rx=GPIO{} @ {} baud",
        pins::LINK_UART_TX_GPIO,
        pins::LINK_UART_RX_GPIO,
        BAUD_RATE
    );

    // ── 4. Gateway core ───────────────────────────────────────
    let ctx = GatewayContext::<EspPlatform>::new(
        &config,
        device_id,
        PlatformParts {
            link,
            clock: Esp32TimeAdapter::new(),
            storage,
            http: HttpsAdapter::new(trust, config.http_max_response_bytes),
            delay: FreeRtos,
            sink: LogEventSink::new(),
        },
    );
    let mut dispatcher = CommandDispatcher::new(&config, ctx);

    dispatcher.announce(&mut serial).context("banner")?;
    info!("Ready");

    // ── 5. Command loop ───────────────────────────────────────
    loop {
        if let Err(e) = dispatcher.pump(&mut serial) {
            warn!("Serial: {}", e);
        }
        FreeRtos::delay_ms(PUMP_INTERVAL_MS);
    }
}
