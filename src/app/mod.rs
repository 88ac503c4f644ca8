//! Application core: protocol and orchestration logic, no direct I/O.
//!
//! This module contains the gateway's business rules: line decoding,
//! command dispatch, the provisioning handshake, and the prompt relay.
//! All interaction with the radio, clock, flash, and network happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable on the host.

pub mod clock;
pub mod commands;
pub mod connectivity;
pub mod context;
pub mod credentials;
pub mod dispatcher;
pub mod events;
pub mod http;
pub mod ports;
pub mod provisioning;
pub mod relay;
