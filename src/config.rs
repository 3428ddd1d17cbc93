//! Node configuration parameters
//!
//! All tunable parameters for the telemetry node.
//! Values can be overridden via NVS so a deployed node is retunable
//! without reflashing; anything wiring-related lives in [`crate::pins`].

use serde::{Deserialize, Serialize};

/// Core node configuration.
///
/// Defaults are the production values for a Koshihikari paddy in the Hokuriku
/// region; the risk band comes from the blast-disease advisory tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- Sampling intervals (seconds) ---
    /// Daytime interval when no risk condition holds.
    pub normal_interval_secs: u32,
    /// Interval during the night window (battery conservation).
    pub night_interval_secs: u32,
    /// Interval while blast-risk conditions hold (dense sampling).
    pub high_risk_interval_secs: u32,
    /// Interval used when a cycle cannot complete normally
    /// (storage down, panic). Must always be safe to sleep on.
    pub safe_default_interval_secs: u32,

    // --- Night window (local hours, wrap-around) ---
    /// First hour of the night window (inclusive).
    pub night_start_hour: u8,
    /// End hour of the night window (exclusive).
    pub night_end_hour: u8,

    // --- Blast-risk predicate ---
    /// Lower bound of the risk temperature band (°C, inclusive).
    pub risk_temp_min_c: f32,
    /// Upper bound of the risk temperature band (°C, inclusive).
    pub risk_temp_max_c: f32,
    /// Relative-humidity threshold (%RH, inclusive).
    pub risk_humidity_pct: f32,

    // --- Water-level calibration ---
    /// ADC reference voltage (volts).
    pub level_vref: f32,
    /// Sensor output voltage at zero depth (volts). Batch-specific.
    pub level_v0: f32,
    /// Depth at full-scale output (cm).
    pub level_max_cm: f32,

    // --- Storage ---
    /// Record file path on the mounted FAT volume.
    pub log_path: heapless::String<64>,

    // --- Time ---
    /// Local-time offset from UTC in minutes (+540 = JST).
    pub utc_offset_minutes: i16,

    // --- Network time sync (optional) ---
    /// WiFi SSID. Empty string disables the sync attempt entirely.
    pub wifi_ssid: heapless::String<32>,
    /// WiFi password. Empty with a non-empty SSID means an open AP.
    pub wifi_password: heapless::String<64>,
    /// Upper bound on the whole sync attempt (connect + SNTP), seconds.
    pub sntp_timeout_secs: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            // Intervals
            normal_interval_secs: 1800,    // 30 min
            night_interval_secs: 3600,     // 60 min
            high_risk_interval_secs: 600,  // 10 min
            safe_default_interval_secs: 1800,

            // Night window: 22:00–05:00
            night_start_hour: 22,
            night_end_hour: 5,

            // Blast risk: 20–28 °C and ≥ 90 %RH
            risk_temp_min_c: 20.0,
            risk_temp_max_c: 28.0,
            risk_humidity_pct: 90.0,

            // Level sensor: 0.5 V at dry pad, 20 cm full scale
            level_vref: 3.3,
            level_v0: 0.5,
            level_max_cm: 20.0,

            // Storage
            log_path: heapless::String::try_from("/flash/paddy.csv")
                .unwrap_or_default(),

            // JST
            utc_offset_minutes: 540,

            // Sync disabled until provisioned
            wifi_ssid: heapless::String::new(),
            wifi_password: heapless::String::new(),
            sntp_timeout_secs: 30,
        }
    }
}
