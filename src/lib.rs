//! TI-LLM gateway firmware library.
//!
//! Exposes the protocol engine (command dispatcher, provisioning
//! handshake, relay client) and the platform adapters for integration
//! testing. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod identity;
pub mod pins;
pub mod retry;

mod utils;
