//! Port traits — the hexagonal boundary between the cycle core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ CycleService (domain)
//! ```
//!
//! Driven adapters (sensors, clock, record store, power controller, event
//! sinks) implement these traits.  The
//! [`CycleService`](super::service::CycleService) consumes them via
//! generics, so the domain core never touches hardware directly.
//!
//! Failure policy is baked into the signatures: ports whose real-world
//! counterpart can die in the field return typed errors the service maps
//! to sentinel values, while ports that are total by construction (the
//! level transform, the clock) simply cannot fail.

pub use crate::error::{SensorError, StorageError};

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapters: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One combined read of the atmospheric sensor.
#[derive(Debug, Clone, Copy)]
pub struct AtmosphereSample {
    pub air_temp_c: f32,
    pub humidity_pct: f32,
    pub pressure_hpa: f32,
}

/// Combined temperature / humidity / pressure sensor on the I2C bus.
///
/// A detached or unresponsive device surfaces as `Err` on every call;
/// the service substitutes NaN sentinels and the cycle continues.
pub trait AtmosphereSensor {
    fn sample(&mut self) -> Result<AtmosphereSample, SensorError>;
}

/// Submerged water-temperature probe (thermistor on an ADC channel).
///
/// A disconnected probe pins the ADC at a rail and surfaces as
/// [`SensorError::Saturated`]; the service substitutes the fixed
/// out-of-range sentinel so "missing" never looks like a real extreme.
pub trait WaterTempProbe {
    fn read_c(&mut self) -> Result<f32, SensorError>;
}

/// Water-level pressure sensor.
///
/// Total by construction: the calibration transform clamps every raw ADC
/// count into the physical range, so there is no error to report.  An ADC
/// fault reads as zero counts and therefore as an empty paddy.
pub trait LevelSensor {
    fn read_cm(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Time source (driven adapter: RTC / network sync → domain)
// ───────────────────────────────────────────────────────────────

/// A resolved wall-clock instant, possibly a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    /// Seconds since the Unix epoch, UTC.
    pub epoch: i64,
    /// Local hour of day, 0–23, already offset-adjusted.
    pub hour: u8,
    /// False when the RTC was never seeded and this is the fallback.
    pub trusted: bool,
}

impl WallClock {
    /// Fixed fallback when no plausible time is available.
    ///
    /// Noon can never fall inside a night window, so an unseeded clock
    /// biases toward over-sampling rather than sleeping through a risk
    /// window.
    pub fn fallback() -> Self {
        Self {
            epoch: 0,
            hour: 12,
            trusted: false,
        }
    }
}

/// Never blocks beyond a bounded readout and never fails: an unusable
/// clock yields [`WallClock::fallback`].
pub trait TimeSource {
    fn now(&self) -> WallClock;
}

// ───────────────────────────────────────────────────────────────
// Record store (driven adapter: domain → durable CSV log)
// ───────────────────────────────────────────────────────────────

/// Append-only durable record log.
///
/// Implementations must not hold a file handle across calls: every append
/// opens, writes, flushes, and closes, because a power-down may follow at
/// any moment.
pub trait RecordStore {
    /// Write the fixed column header if and only if the log is missing or
    /// empty.  Idempotent across any number of boots.
    fn ensure_header(&mut self) -> Result<(), StorageError>;

    /// Append one record line (no trailing newline in `line`; the store
    /// adds it) and flush it to the medium before returning.
    fn append_line(&mut self, line: &str) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Power controller (driven adapter: domain → wake timer + sleep)
// ───────────────────────────────────────────────────────────────

/// Arms the wake timer and powers the node down.
///
/// On hardware this call does not return — the next cycle begins as a
/// cold boot.  Host implementations return so tests can assert the
/// requested interval.  Implementations must treat an interval of zero
/// as one second; a node that never wakes again is bricked.
pub trait PowerPort {
    fn deep_sleep(&mut self, interval_secs: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The cycle emits structured [`CycleEvent`](super::events::CycleEvent)s
/// through this port.  Adapters decide where they go (serial log today;
/// a radio uplink would slot in here).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::CycleEvent);
}
