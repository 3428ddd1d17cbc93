//! Sensor adapters — one module per physical sensor.
//!
//! Each adapter implements its port trait from [`crate::cycle::ports`] and
//! follows the dual-target pattern: real peripherals under ESP-IDF, static
//! atomics for injection on the host.  The cycle service receives each
//! adapter separately so sensors degrade independently.

pub mod atmosphere;
pub mod water_level;
pub mod water_temp;
