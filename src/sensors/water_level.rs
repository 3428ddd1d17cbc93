//! Submerged pressure-type water level sensor (0.5 – 3.0 V analog out).
//!
//! Hydrostatic pressure at the probe tip is linear in water depth, so the
//! calibration transform in [`crate::calibrate`] maps raw ADC counts
//! straight to centimetres, clamped to the physical range of the paddy.
//! The transform is total: there is no failure mode, and an ADC fault
//! reads as zero counts, i.e. an empty field.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the level channel via the oneshot API (initialised
//! by hw_init). On host/test: reads from a static AtomicU16 for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use crate::calibrate::LevelCalibration;
use crate::cycle::ports::LevelSensor;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(not(target_os = "espidf"))]
static SIM_WATER_LEVEL_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_water_level_adc(raw: u16) {
    SIM_WATER_LEVEL_ADC.store(raw, Ordering::Relaxed);
}

pub struct PressureLevelSensor {
    cal: LevelCalibration,
}

impl PressureLevelSensor {
    pub fn new(cal: LevelCalibration) -> Self {
        Self { cal }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(pins::WATER_LEVEL_ADC_CHANNEL)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_WATER_LEVEL_ADC.load(Ordering::Relaxed)
    }
}

impl LevelSensor for PressureLevelSensor {
    fn read_cm(&mut self) -> f32 {
        self.cal.level_cm(self.read_adc())
    }
}
