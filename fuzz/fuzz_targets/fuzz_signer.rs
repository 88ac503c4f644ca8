//! Fuzz target: provisioning request signing
//!
//! Any secret, MAC and timestamp must produce a 64-character lowercase
//! hex signature and a JSON body that parses back to the same fields.
//!
//! cargo fuzz run fuzz_signer

#![no_main]

use libfuzzer_sys::fuzz_target;
use tillm_gateway::identity::{DeviceId, FactorySecret, SIGNATURE_HEX_LEN, SignedProvisioningRequest};

fuzz_target!(|data: &[u8]| {
    if data.len() < 10 {
        return;
    }
    let mut mac = [0u8; 6];
    mac.copy_from_slice(&data[..6]);
    let ts = u32::from_le_bytes([data[6], data[7], data[8], data[9]]);
    let secret = FactorySecret::new(&data[10..]);

    let id = DeviceId::from_mac(&mac);
    let request = SignedProvisioningRequest::new(&secret, id.clone(), ts);
    let body = request.to_json().expect("request always serialises");

    let json: serde_json::Value = serde_json::from_slice(&body).expect("valid JSON");
    assert_eq!(json["device_id"], id.as_str());
    assert_eq!(json["ts"], ts);
    let sig = json["sig"].as_str().expect("sig is a string");
    assert_eq!(sig.len(), SIGNATURE_HEX_LEN);
    assert!(sig.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
});
