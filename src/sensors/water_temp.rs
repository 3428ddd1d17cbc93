//! Submerged NTC thermistor water-temperature probe (10 kOhm @ 25 C,
//! B = 3950).
//!
//! Wired on the low side of a voltage-divider with a fixed 10 kOhm
//! resistor, read via ADC1. The simplified Beta (Steinhart-Hart) equation
//! converts resistance to temperature.
//!
//! A reading pinned at either supply rail means the probe is unplugged or
//! shorted; that surfaces as [`SensorError::Saturated`] and the cycle
//! substitutes the fixed out-of-range sentinel instead of logging a
//! physical-looking value.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the probe channel via the oneshot API (initialised
//! by hw_init). On host/test: reads from a static AtomicU16 for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use crate::cycle::ports::WaterTempProbe;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::SensorError;
#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(not(target_os = "espidf"))]
static SIM_WATER_TEMP_ADC: AtomicU16 = AtomicU16::new(2048);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_water_temp_adc(raw: u16) {
    SIM_WATER_TEMP_ADC.store(raw, Ordering::Relaxed);
}

const R25: f32 = 10_000.0;
const BETA: f32 = 3950.0;
const T25_K: f32 = 298.15;
const R_DIVIDER: f32 = 10_000.0;
const ADC_MAX: f32 = 4095.0;
const V_REF: f32 = 3.3;

pub struct NtcWaterTempProbe {
    _adc_gpio: i32,
}

impl NtcWaterTempProbe {
    #[cfg(target_os = "espidf")]
    pub fn new() -> Self {
        Self {
            _adc_gpio: pins::WATER_TEMP_ADC_GPIO,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self { _adc_gpio: -1 }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(pins::WATER_TEMP_ADC_CHANNEL)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_WATER_TEMP_ADC.load(Ordering::Relaxed)
    }

    fn adc_to_celsius(raw: u16) -> Result<f32, SensorError> {
        let voltage = (raw as f32 / ADC_MAX) * V_REF;
        // Within ~10 mV of a rail the divider is open or shorted.
        if voltage <= 0.01 || voltage >= (V_REF - 0.01) {
            return Err(SensorError::Saturated);
        }
        let r_ntc = R_DIVIDER * voltage / (V_REF - voltage);
        let inv_t = (1.0 / T25_K) + (1.0 / BETA) * (r_ntc / R25).ln();
        if inv_t <= 0.0 {
            return Err(SensorError::Saturated);
        }
        Ok((1.0 / inv_t) - 273.15)
    }
}

impl Default for NtcWaterTempProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl WaterTempProbe for NtcWaterTempProbe {
    fn read_c(&mut self) -> Result<f32, SensorError> {
        Self::adc_to_celsius(self.read_adc())
    }
}
