//! Water-level calibration transform.
//!
//! Maps a raw ADC count from the submerged pressure probe to a depth in
//! centimetres via a two-point linear calibration: `v0` (output voltage at
//! zero depth) and `vref` (rail, taken as full-scale output).
//!
//! The transform is total: every raw count in `[0, 4095]` maps to a depth in
//! `[0, l_max_cm]`, even under a degenerate calibration. There is no failure
//! mode to propagate, which is what lets an ADC read error upstream degrade
//! to raw count 0 instead of aborting the cycle.

use crate::config::NodeConfig;

/// Full-scale count of the 12-bit oneshot ADC.
pub const ADC_FULL_SCALE: f32 = 4095.0;

#[derive(Debug, Clone, Copy)]
pub struct LevelCalibration {
    /// ADC reference voltage (volts).
    pub vref: f32,
    /// ADC count at `vref`.
    pub full_scale: f32,
    /// Probe output at zero depth (volts).
    pub v0: f32,
    /// Depth at full-scale output (cm).
    pub l_max_cm: f32,
}

impl LevelCalibration {
    pub fn from_config(cfg: &NodeConfig) -> Self {
        Self {
            vref: cfg.level_vref,
            full_scale: ADC_FULL_SCALE,
            v0: cfg.level_v0,
            l_max_cm: cfg.level_max_cm,
        }
    }

    /// Convert a raw ADC count to water depth in centimetres.
    ///
    /// Clamped to `[0, l_max_cm]`. A calibration with no usable span
    /// (`v0 >= vref`, zero or non-finite parameters) yields 0.0 rather
    /// than NaN or an infinity.
    pub fn level_cm(&self, raw: u16) -> f32 {
        let span = self.vref - self.v0;
        let usable = span.is_finite()
            && span > 0.0
            && self.l_max_cm.is_finite()
            && self.l_max_cm > 0.0
            && self.full_scale.is_finite()
            && self.full_scale > 0.0;
        if !usable {
            return 0.0;
        }

        let voltage = raw as f32 * self.vref / self.full_scale;
        let level = (voltage - self.v0) * self.l_max_cm / span;
        level.clamp(0.0, self.l_max_cm)
    }
}
