//! Sleep-interval scheduling policy.
//!
//! Pure decision logic: `(hour, latest reading) → ScheduleDecision`, no I/O.
//! Three tiers with strict precedence:
//!
//! 1. **Night** — the local hour falls inside the configured night window;
//!    nothing actionable changes in the paddy overnight, so sample sparsely.
//! 2. **HighRisk** — air temperature sits in the blast-disease band and
//!    humidity is at or above the wetness threshold; a blast-favourable
//!    microclimate is forming, so trade battery for temporal resolution.
//! 3. **Normal** — the baseline daytime cadence.
//!
//! Night always wins over risk: a humid 23:00 still sleeps the night
//! interval. Sentinel values (NaN atmosphere, −999 probe) can never satisfy
//! the risk predicate — "no data" schedules as Normal, not as risk.

use crate::config::NodeConfig;
use crate::reading::SensorReading;

/// Scheduling tier, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Night,
    HighRisk,
    Normal,
}

impl core::fmt::Display for Tier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Night => write!(f, "night"),
            Self::HighRisk => write!(f, "high-risk"),
            Self::Normal => write!(f, "normal"),
        }
    }
}

/// The outcome of one scheduling evaluation. Lives for one cycle only;
/// nothing here is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleDecision {
    pub interval_secs: u32,
    pub tier: Tier,
}

/// Local-hour window with midnight wrap-around, `[start, end)`.
///
/// `start = 22, end = 5` covers 22:00–23:59 and 00:00–04:59.
#[derive(Debug, Clone, Copy)]
pub struct NightWindow {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl NightWindow {
    pub fn contains(&self, hour: u8) -> bool {
        if self.start_hour <= self.end_hour {
            // e.g. 1..5 — a window that does not cross midnight
            hour >= self.start_hour && hour < self.end_hour
        } else {
            // e.g. 22..5 — wraps around midnight
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

/// All tunables the schedule depends on, extracted from [`NodeConfig`] so
/// the decision function stays a pure value-in/value-out computation.
#[derive(Debug, Clone, Copy)]
pub struct SchedulePolicy {
    pub night: NightWindow,
    /// Blast-favourable air-temperature band (°C, inclusive both ends).
    pub risk_temp_min_c: f32,
    pub risk_temp_max_c: f32,
    /// Relative-humidity wetness threshold (%RH, inclusive).
    pub risk_humidity_pct: f32,
    pub normal_interval_secs: u32,
    pub night_interval_secs: u32,
    pub high_risk_interval_secs: u32,
}

impl SchedulePolicy {
    pub fn from_config(cfg: &NodeConfig) -> Self {
        Self {
            night: NightWindow {
                start_hour: cfg.night_start_hour,
                end_hour: cfg.night_end_hour,
            },
            risk_temp_min_c: cfg.risk_temp_min_c,
            risk_temp_max_c: cfg.risk_temp_max_c,
            risk_humidity_pct: cfg.risk_humidity_pct,
            normal_interval_secs: cfg.normal_interval_secs,
            night_interval_secs: cfg.night_interval_secs,
            high_risk_interval_secs: cfg.high_risk_interval_secs,
        }
    }

    /// Blast-risk predicate over one reading.
    ///
    /// NaN fails both range checks and −999 falls outside the band, so a
    /// degraded sensor can never look like a forming risk window.
    fn blast_risk(&self, reading: &SensorReading) -> bool {
        (self.risk_temp_min_c..=self.risk_temp_max_c).contains(&reading.air_temp_c)
            && reading.humidity_pct >= self.risk_humidity_pct
    }
}

/// Decide how long to sleep after this cycle. First match wins.
pub fn schedule(hour: u8, reading: &SensorReading, policy: &SchedulePolicy) -> ScheduleDecision {
    if policy.night.contains(hour) {
        return ScheduleDecision {
            interval_secs: policy.night_interval_secs,
            tier: Tier::Night,
        };
    }
    if policy.blast_risk(reading) {
        return ScheduleDecision {
            interval_secs: policy.high_risk_interval_secs,
            tier: Tier::HighRisk,
        };
    }
    ScheduleDecision {
        interval_secs: policy.normal_interval_secs,
        tier: Tier::Normal,
    }
}
