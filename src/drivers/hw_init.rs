//! One-shot hardware peripheral initialization.
//!
//! Configures the ADC1 oneshot unit and the two analog sensor channels
//! using raw ESP-IDF sys calls. Called once from `main()` right after
//! boot; the node is single-threaded and never re-initializes.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before any sensor read; single-threaded.
    unsafe {
        init_adc()?;
    }
    info!("hw_init: peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded boot path.  No
/// concurrent access is possible because `init_adc()` completes before
/// any sensor read and the cycle never spawns tasks.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    // 12 dB attenuation covers the full 0.5–3.0 V span of both sensors.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: pins::SENSOR_ADC_ATTEN,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    let ret = unsafe {
        adc_oneshot_config_channel(adc1_handle(), pins::WATER_TEMP_ADC_CHANNEL, &chan_cfg)
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let ret = unsafe {
        adc_oneshot_config_channel(adc1_handle(), pins::WATER_LEVEL_ADC_CHANNEL, &chan_cfg)
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!(
        "hw_init: ADC1 configured (CH{}=water temp, CH{}=water level)",
        pins::WATER_TEMP_ADC_CHANNEL,
        pins::WATER_LEVEL_ADC_CHANNEL
    );
    Ok(())
}

/// Read one raw sample, 0–4095.  Returns 0 on an ADC error so a broken
/// converter reads as an empty paddy rather than crashing the cycle.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: ADC1_HANDLE is written once during init_adc() before this
    // function is called; single-threaded access guaranteed.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    0
}
