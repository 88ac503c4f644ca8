//! Device identity from the ESP32 factory MAC address.
//!
//! The eFuse MAC is burned at the factory, so the derived
//! [`DeviceId`] is identical across reboots and reflashes.

use crate::identity::{DeviceId, MacAddress};

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// This device's id.
pub fn device_identity() -> DeviceId {
    DeviceId::from_mac(&read_mac())
}
