//! WiFi station-mode adapter.
//!
//! Implements [`LinkPort`], the hexagonal boundary for network
//! connectivity. Round and poll timing live in the connectivity manager;
//! this adapter only starts association, reports link status, and powers
//! the radio down.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::{ConnectivityError, LinkPort};
use crate::utils::is_printable_ascii;

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::{modem::Modem, peripheral::Peripheral},
    wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi},
};

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    #[cfg(target_os = "espidf")]
    started: bool,
    /// Simulation: whether the access point answers.
    #[cfg(not(target_os = "espidf"))]
    sim_reachable: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_associated: bool,
}

impl WifiAdapter {
    fn credentials(
        ssid: &str,
        password: &str,
    ) -> Result<(heapless::String<32>, heapless::String<64>), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let mut s = heapless::String::new();
        s.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        let mut p = heapless::String::new();
        p.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        Ok((s, p))
    }

    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: impl Peripheral<P = Modem> + 'static,
        sysloop: EspSystemEventLoop,
        ssid: &str,
        password: &str,
    ) -> Result<Self, ConnectivityError> {
        let (ssid, password) = Self::credentials(ssid, password)?;
        let wifi = EspWifi::new(modem, sysloop, None).map_err(|e| {
            warn!("WiFi: driver init failed: {}", e);
            ConnectivityError::StartFailed
        })?;
        info!("WiFi: station configured for '{}'", ssid);
        Ok(Self {
            ssid,
            password,
            wifi,
            started: false,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConnectivityError> {
        let (ssid, password) = Self::credentials(ssid, password)?;
        info!("WiFi(sim): station configured for '{}'", ssid);
        Ok(Self {
            ssid,
            password,
            sim_reachable: true,
            sim_associated: false,
        })
    }

    /// Simulation: make the access point (un)reachable.
    #[cfg(not(target_os = "espidf"))]
    pub fn set_sim_reachable(&mut self, reachable: bool) {
        self.sim_reachable = reachable;
    }

    #[cfg(target_os = "espidf")]
    fn auth_method(&self) -> AuthMethod {
        if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        }
    }
}

// ───────────────────────────────────────────────────────────────
// LinkPort
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl LinkPort for WifiAdapter {
    fn begin(&mut self) -> Result<(), ConnectivityError> {
        if !self.started {
            let config = Configuration::Client(ClientConfiguration {
                ssid: self.ssid.clone(),
                password: self.password.clone(),
                auth_method: self.auth_method(),
                ..Default::default()
            });
            self.wifi.set_configuration(&config).map_err(|e| {
                warn!("WiFi: set_configuration failed: {}", e);
                ConnectivityError::StartFailed
            })?;
            self.wifi.start().map_err(|e| {
                warn!("WiFi: start failed: {}", e);
                ConnectivityError::StartFailed
            })?;
            self.started = true;
        }
        info!("WiFi: connecting to '{}'", self.ssid);
        self.wifi.connect().map_err(|e| {
            warn!("WiFi: connect failed: {}", e);
            ConnectivityError::StartFailed
        })
    }

    fn is_connected(&self) -> bool {
        // Associated and the netif has an address.
        self.started && self.wifi.is_up().unwrap_or(false)
    }

    fn shutdown(&mut self) {
        if !self.started {
            return;
        }
        if let Err(e) = self.wifi.disconnect() {
            warn!("WiFi: disconnect failed: {}", e);
        }
        if let Err(e) = self.wifi.stop() {
            warn!("WiFi: stop failed: {}", e);
        }
        self.started = false;
        info!("WiFi: radio off");
    }
}

#[cfg(not(target_os = "espidf"))]
impl LinkPort for WifiAdapter {
    fn begin(&mut self) -> Result<(), ConnectivityError> {
        info!("WiFi(sim): connecting to '{}' ({} byte password)", self.ssid, self.password.len());
        self.sim_associated = self.sim_reachable;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.sim_associated
    }

    fn shutdown(&mut self) {
        self.sim_associated = false;
        info!("WiFi(sim): radio off");
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
