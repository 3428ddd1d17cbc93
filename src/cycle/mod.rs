//! Measurement-cycle core — pure domain logic, zero I/O.
//!
//! One wake of the node runs exactly one cycle: resolve the clock, read
//! the sensors, append a record, pick a sleep interval, power down.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
