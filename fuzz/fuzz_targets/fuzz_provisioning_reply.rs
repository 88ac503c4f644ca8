//! Fuzz target: `Credential::parse`
//!
//! Whatever the provisioning endpoint returns, an accepted credential
//! must fit an NVS string and be free of CR, LF and NUL, since it is
//! later sent as an HTTP header value.
//!
//! cargo fuzz run fuzz_provisioning_reply

#![no_main]

use libfuzzer_sys::fuzz_target;
use tillm_gateway::identity::{Credential, MAX_CREDENTIAL_LEN};

fuzz_target!(|data: &[u8]| {
    if let Ok(credential) = Credential::parse(data) {
        let s = credential.as_str();
        assert!(!s.is_empty());
        assert!(s.len() <= MAX_CREDENTIAL_LEN);
        assert!(!s.bytes().any(|b| matches!(b, b'\r' | b'\n' | 0)));
        assert_eq!(s.as_bytes(), data, "credential must be stored verbatim");
    }
});
