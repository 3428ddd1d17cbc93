//! Outbound cycle events.
//!
//! The [`CycleService`](super::service::CycleService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — today that means the serial log.

use crate::error::StorageError;
use crate::reading::SensorReading;
use crate::schedule::{ScheduleDecision, Tier};

use super::ports::WallClock;

/// Structured events emitted over the course of one measurement cycle,
/// in the order the cycle produces them.
#[derive(Debug, Clone)]
pub enum CycleEvent {
    /// The time source resolved (or fell back) at the top of the cycle.
    ClockResolved(WallClock),

    /// All sensors have been read and the record assembled.
    ReadingTaken(SensorReading),

    /// The record reached the durable store.
    RecordStored,

    /// The store refused the record; the cycle continues without it.
    StorageUnavailable(StorageError),

    /// The scheduler picked the next wake interval.
    Scheduled(ScheduleDecision),

    /// Final accounting, emitted immediately before power-down.
    Summary(CycleSummary),
}

/// One-line health roll-up of the cycle that just ran.
#[derive(Debug, Clone, Copy)]
pub struct CycleSummary {
    pub epoch: i64,
    pub clock_trusted: bool,
    pub atmosphere_ok: bool,
    pub water_temp_ok: bool,
    pub stored: bool,
    pub tier: Tier,
    /// The interval actually armed, which differs from the scheduled one
    /// when storage failure forced the safe default.
    pub sleep_secs: u32,
}
