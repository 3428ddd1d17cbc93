//! Cycle service — the hexagonal core.
//!
//! [`CycleService`] owns the schedule policy and drives one wake-to-sleep
//! measurement cycle.  All I/O flows through port traits injected at the
//! call site, making the entire service testable with mock adapters.
//!
//! ```text
//!  TimeSource ───▶ ┌────────────────────────┐ ───▶ RecordStore
//!  Atmosphere ───▶ │      CycleService       │ ───▶ EventSink
//!  WaterTemp  ───▶ │  acquire · log · sched  │
//!  WaterLevel ───▶ └────────────────────────┘ ───▶ PowerPort
//! ```
//!
//! The one hard invariant: every path through [`CycleService::run`],
//! including every failure branch, ends in exactly one
//! [`PowerPort::deep_sleep`] call with a positive interval.  A node that
//! skips that call never wakes again.

use log::warn;

use crate::config::NodeConfig;
use crate::error::StorageError;
use crate::reading::{SensorReading, WATER_TEMP_SENTINEL_C};
use crate::schedule::{ScheduleDecision, SchedulePolicy, schedule};

use super::events::{CycleEvent, CycleSummary};
use super::ports::{
    AtmosphereSensor, EventSink, LevelSensor, PowerPort, RecordStore, TimeSource, WaterTempProbe,
};

// ───────────────────────────────────────────────────────────────
// CycleService
// ───────────────────────────────────────────────────────────────

/// What one cycle did, for callers that outlive it (host tests and the
/// host simulator; on hardware `deep_sleep` never returns and this value
/// is never observed).
#[derive(Debug, Clone, Copy)]
pub struct CycleOutcome {
    pub reading: SensorReading,
    pub decision: ScheduleDecision,
    pub stored: bool,
    /// The interval actually armed (safe default when `stored` is false).
    pub sleep_secs: u32,
}

/// Orchestrates one measurement cycle.
pub struct CycleService {
    cfg: NodeConfig,
    policy: SchedulePolicy,
}

impl CycleService {
    pub fn new(cfg: NodeConfig) -> Self {
        let policy = SchedulePolicy::from_config(&cfg);
        Self { cfg, policy }
    }

    /// Run the full cycle: clock → sensors → record → schedule → sleep.
    ///
    /// No branch returns early; sensor and storage failures degrade the
    /// record or skip the write but always fall through to scheduling and
    /// the final `deep_sleep`.
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &mut self,
        clock: &impl TimeSource,
        atmosphere: &mut impl AtmosphereSensor,
        water_temp: &mut impl WaterTempProbe,
        water_level: &mut impl LevelSensor,
        store: &mut impl RecordStore,
        power: &mut impl PowerPort,
        sink: &mut impl EventSink,
    ) -> CycleOutcome {
        // 1. Resolve the clock.  Never fails; an unseeded RTC yields the
        //    noon fallback so the night tier cannot trigger spuriously.
        let now = clock.now();
        if !now.trusted {
            warn!("CLOCK | untrusted, fallback hour={} epoch={}", now.hour, now.epoch);
        }
        sink.emit(&CycleEvent::ClockResolved(now));

        // 2. Acquire sensors.  Each failure degrades its own fields to a
        //    sentinel; the cycle never aborts here.
        let (air_temp_c, humidity_pct, pressure_hpa, atmosphere_ok) = match atmosphere.sample() {
            Ok(s) => (s.air_temp_c, s.humidity_pct, s.pressure_hpa, true),
            Err(e) => {
                warn!("SENSOR | atmosphere unavailable: {e}");
                (f32::NAN, f32::NAN, f32::NAN, false)
            }
        };
        let (water_temp_c, water_temp_ok) = match water_temp.read_c() {
            Ok(t) => (t, true),
            Err(e) => {
                warn!("SENSOR | water temp probe: {e}");
                (WATER_TEMP_SENTINEL_C, false)
            }
        };
        // Total transform; an ADC fault reads as an empty paddy.
        let water_level_cm = water_level.read_cm();

        let reading = SensorReading {
            timestamp_epoch: now.epoch,
            air_temp_c,
            humidity_pct,
            pressure_hpa,
            water_temp_c,
            water_level_cm,
        };
        sink.emit(&CycleEvent::ReadingTaken(reading));

        // 3. Persist one line.  Unavailable storage skips the record but
        //    must not keep the node awake.
        let stored = match self.append_record(&reading, store) {
            Ok(()) => {
                sink.emit(&CycleEvent::RecordStored);
                true
            }
            Err(e) => {
                warn!("STORE | record skipped: {e}");
                sink.emit(&CycleEvent::StorageUnavailable(e));
                false
            }
        };

        // 4. Schedule the next wake.  Pure; sentinels fall through to the
        //    normal tier inside `schedule`.
        let decision = schedule(now.hour, &reading, &self.policy);
        sink.emit(&CycleEvent::Scheduled(decision));

        // A cycle that could not persist sleeps the safe default instead
        // of the scheduled interval.  Clamp to ≥ 1 s: a zero interval
        // would never re-arm the wake timer.
        let sleep_secs = if stored {
            decision.interval_secs
        } else {
            self.cfg.safe_default_interval_secs
        }
        .max(1);

        // 5. Summary, then power down.  `deep_sleep` is the final port
        //    call on every path; on hardware it does not return.
        sink.emit(&CycleEvent::Summary(CycleSummary {
            epoch: now.epoch,
            clock_trusted: now.trusted,
            atmosphere_ok,
            water_temp_ok,
            stored,
            tier: decision.tier,
            sleep_secs,
        }));
        power.deep_sleep(sleep_secs);

        CycleOutcome {
            reading,
            decision,
            stored,
            sleep_secs,
        }
    }

    /// Header (idempotent) then one line, flushed before return.
    fn append_record(
        &self,
        reading: &SensorReading,
        store: &mut impl RecordStore,
    ) -> Result<(), StorageError> {
        store.ensure_header()?;
        let line = reading.to_csv_line(self.cfg.utc_offset_minutes);
        store.append_line(&line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::ports::{AtmosphereSample, WallClock};
    use crate::error::SensorError;
    use crate::schedule::Tier;

    struct FixedClock(WallClock);
    impl TimeSource for FixedClock {
        fn now(&self) -> WallClock {
            self.0
        }
    }

    struct GoodAtmosphere;
    impl AtmosphereSensor for GoodAtmosphere {
        fn sample(&mut self) -> Result<AtmosphereSample, SensorError> {
            Ok(AtmosphereSample {
                air_temp_c: 24.0,
                humidity_pct: 95.0,
                pressure_hpa: 1008.2,
            })
        }
    }

    struct DeadAtmosphere;
    impl AtmosphereSensor for DeadAtmosphere {
        fn sample(&mut self) -> Result<AtmosphereSample, SensorError> {
            Err(SensorError::BusNotDetected)
        }
    }

    struct GoodProbe;
    impl WaterTempProbe for GoodProbe {
        fn read_c(&mut self) -> Result<f32, SensorError> {
            Ok(21.5)
        }
    }

    struct FixedLevel(f32);
    impl LevelSensor for FixedLevel {
        fn read_cm(&mut self) -> f32 {
            self.0
        }
    }

    #[derive(Default)]
    struct MemStore {
        lines: Vec<String>,
        header_calls: usize,
        fail: bool,
    }
    impl RecordStore for MemStore {
        fn ensure_header(&mut self) -> Result<(), StorageError> {
            self.header_calls += 1;
            if self.fail {
                return Err(StorageError::MountFailed);
            }
            Ok(())
        }
        fn append_line(&mut self, line: &str) -> Result<(), StorageError> {
            if self.fail {
                return Err(StorageError::WriteFailed);
            }
            self.lines.push(line.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingPower {
        calls: Vec<u32>,
    }
    impl PowerPort for RecordingPower {
        fn deep_sleep(&mut self, interval_secs: u32) {
            self.calls.push(interval_secs);
        }
    }

    #[derive(Default)]
    struct NullSink;
    impl EventSink for NullSink {
        fn emit(&mut self, _event: &CycleEvent) {}
    }

    fn daytime() -> FixedClock {
        FixedClock(WallClock {
            epoch: 1_717_218_000, // 2024-06-01 14:00 local at +09:00
            hour: 14,
            trusted: true,
        })
    }

    #[test]
    fn happy_path_stores_and_sleeps_high_risk() {
        let mut svc = CycleService::new(NodeConfig::default());
        let mut store = MemStore::default();
        let mut power = RecordingPower::default();

        let out = svc.run(
            &daytime(),
            &mut GoodAtmosphere,
            &mut GoodProbe,
            &mut FixedLevel(8.3),
            &mut store,
            &mut power,
            &mut NullSink,
        );

        // 24 °C at 95 %RH in the afternoon is the high-risk tier.
        assert_eq!(out.decision.tier, Tier::HighRisk);
        assert!(out.stored);
        assert_eq!(out.sleep_secs, 600);
        assert_eq!(store.lines.len(), 1);
        assert_eq!(power.calls, vec![600]);
    }

    #[test]
    fn storage_failure_still_sleeps_safe_default() {
        let mut svc = CycleService::new(NodeConfig::default());
        let mut store = MemStore {
            fail: true,
            ..Default::default()
        };
        let mut power = RecordingPower::default();

        let out = svc.run(
            &daytime(),
            &mut GoodAtmosphere,
            &mut GoodProbe,
            &mut FixedLevel(8.3),
            &mut store,
            &mut power,
            &mut NullSink,
        );

        assert!(!out.stored);
        assert_eq!(out.sleep_secs, NodeConfig::default().safe_default_interval_secs);
        assert!(out.sleep_secs > 0);
        // Exactly one power-down, even on the failure path.
        assert_eq!(power.calls.len(), 1);
    }

    #[test]
    fn dead_atmosphere_degrades_to_nan_and_normal_tier() {
        let mut svc = CycleService::new(NodeConfig::default());
        let mut store = MemStore::default();
        let mut power = RecordingPower::default();

        let out = svc.run(
            &daytime(),
            &mut DeadAtmosphere,
            &mut GoodProbe,
            &mut FixedLevel(8.3),
            &mut store,
            &mut power,
            &mut NullSink,
        );

        assert!(out.reading.air_temp_c.is_nan());
        assert!(out.reading.humidity_pct.is_nan());
        assert!(out.reading.pressure_hpa.is_nan());
        // NaN must not register as risk.
        assert_eq!(out.decision.tier, Tier::Normal);
        // The degraded record is still written.
        assert!(out.stored);
        assert_eq!(store.lines.len(), 1);
    }

    #[test]
    fn probe_failure_writes_sentinel() {
        struct DeadProbe;
        impl WaterTempProbe for DeadProbe {
            fn read_c(&mut self) -> Result<f32, SensorError> {
                Err(SensorError::Saturated)
            }
        }

        let mut svc = CycleService::new(NodeConfig::default());
        let mut store = MemStore::default();
        let mut power = RecordingPower::default();

        let out = svc.run(
            &daytime(),
            &mut GoodAtmosphere,
            &mut DeadProbe,
            &mut FixedLevel(0.0),
            &mut store,
            &mut power,
            &mut NullSink,
        );

        assert_eq!(out.reading.water_temp_c, WATER_TEMP_SENTINEL_C);
        assert!(store.lines[0].contains("-999.0"));
    }

    #[test]
    fn night_hour_overrides_risk() {
        let night = FixedClock(WallClock {
            epoch: 1_717_250_400, // 2024-06-01 23:00 local at +09:00
            hour: 23,
            trusted: true,
        });
        let mut svc = CycleService::new(NodeConfig::default());
        let mut store = MemStore::default();
        let mut power = RecordingPower::default();

        let out = svc.run(
            &night,
            &mut GoodAtmosphere, // risk-band values
            &mut GoodProbe,
            &mut FixedLevel(8.3),
            &mut store,
            &mut power,
            &mut NullSink,
        );

        assert_eq!(out.decision.tier, Tier::Night);
        assert_eq!(out.sleep_secs, 3600);
    }
}
