//! BME280 combined temperature / humidity / pressure sensor.
//!
//! Sits in a vented pod above the waterline, on the I2C bus at the
//! primary address (0x76).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the real device through `bme280` over an
//! [`I2cDriver`].  Probe-at-boot: if `init` fails the adapter stays
//! permanently degraded and every sample reports
//! [`SensorError::BusNotDetected`] — the cycle then records NaN sentinels.
//! On host/test: serves values from static atomics for injection.

#[cfg(target_os = "espidf")]
use bme280::i2c::BME280;
#[cfg(target_os = "espidf")]
use esp_idf_hal::{delay::Ets, i2c::I2cDriver};
#[cfg(target_os = "espidf")]
use log::warn;

use crate::cycle::ports::{AtmosphereSample, AtmosphereSensor};
use crate::error::SensorError;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

#[cfg(not(target_os = "espidf"))]
static SIM_PRESENT: AtomicBool = AtomicBool::new(true);
#[cfg(not(target_os = "espidf"))]
static SIM_AIR_TEMP: AtomicU32 = AtomicU32::new(f32::to_bits(24.0));
#[cfg(not(target_os = "espidf"))]
static SIM_HUMIDITY: AtomicU32 = AtomicU32::new(f32::to_bits(70.0));
#[cfg(not(target_os = "espidf"))]
static SIM_PRESSURE_HPA: AtomicU32 = AtomicU32::new(f32::to_bits(1013.2));

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_present(present: bool) {
    SIM_PRESENT.store(present, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_sample(air_temp_c: f32, humidity_pct: f32, pressure_hpa: f32) {
    SIM_AIR_TEMP.store(air_temp_c.to_bits(), Ordering::Relaxed);
    SIM_HUMIDITY.store(humidity_pct.to_bits(), Ordering::Relaxed);
    SIM_PRESSURE_HPA.store(pressure_hpa.to_bits(), Ordering::Relaxed);
}

pub struct Bme280Atmosphere {
    #[cfg(target_os = "espidf")]
    dev: Option<BME280<I2cDriver<'static>>>,
}

#[cfg(target_os = "espidf")]
impl Bme280Atmosphere {
    /// Take ownership of the bus and probe the device once.
    ///
    /// A failed probe is not an error at this level; the adapter is
    /// constructed degraded and the cycle carries on with sentinels.
    pub fn new(i2c: I2cDriver<'static>) -> Self {
        let mut dev = BME280::new_primary(i2c);
        match dev.init(&mut Ets) {
            Ok(()) => Self { dev: Some(dev) },
            Err(e) => {
                warn!("bme280: init failed ({:?}), atmosphere degraded", e);
                Self { dev: None }
            }
        }
    }

    /// Permanently degraded adapter for when the bus itself never came up.
    pub fn absent() -> Self {
        Self { dev: None }
    }
}

#[cfg(not(target_os = "espidf"))]
impl Bme280Atmosphere {
    pub fn new() -> Self {
        Self {}
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for Bme280Atmosphere {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "espidf")]
impl AtmosphereSensor for Bme280Atmosphere {
    fn sample(&mut self) -> Result<AtmosphereSample, SensorError> {
        let dev = self.dev.as_mut().ok_or(SensorError::BusNotDetected)?;
        let m = dev.measure(&mut Ets).map_err(|_| SensorError::ReadFailed)?;
        Ok(AtmosphereSample {
            air_temp_c: m.temperature,
            humidity_pct: m.humidity,
            // The device reports pascals; records carry hPa.
            pressure_hpa: m.pressure / 100.0,
        })
    }
}

#[cfg(not(target_os = "espidf"))]
impl AtmosphereSensor for Bme280Atmosphere {
    fn sample(&mut self) -> Result<AtmosphereSample, SensorError> {
        if !SIM_PRESENT.load(Ordering::Relaxed) {
            return Err(SensorError::BusNotDetected);
        }
        Ok(AtmosphereSample {
            air_temp_c: f32::from_bits(SIM_AIR_TEMP.load(Ordering::Relaxed)),
            humidity_pct: f32::from_bits(SIM_HUMIDITY.load(Ordering::Relaxed)),
            pressure_hpa: f32::from_bits(SIM_PRESSURE_HPA.load(Ordering::Relaxed)),
        })
    }
}
