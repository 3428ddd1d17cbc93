//! Paddy-field telemetry node firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod calibrate;
pub mod config;
pub mod cycle;
pub mod diagnostics;
pub mod power;
pub mod reading;
pub mod schedule;
pub mod timefmt;

pub mod error;
pub mod pins;

// Hardware-facing modules; the device implementations are guarded by
// cfg attributes inside, with simulation fallbacks for the host.
pub mod adapters;
pub mod drivers;
pub mod sensors;
pub mod storage;
