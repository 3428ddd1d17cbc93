//! GPIO / peripheral pin assignments for the field-node board (ESP32).
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// I²C bus — BME280 atmospheric sensor (0x76)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;

/// I²C bus clock.  The BME280 tolerates 400 kHz but the cable run to the
/// sensor pod is long, so stay at 100 kHz.
pub const I2C_FREQ_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Sensors — Analog (ADC1)
// ---------------------------------------------------------------------------

/// Waterproof NTC thermistor — 10 kΩ @ 25 °C, voltage-divider to ADC.
/// ADC1 channel 6 (GPIO 34, input-only).
pub const WATER_TEMP_ADC_GPIO: i32 = 34;
pub const WATER_TEMP_ADC_CHANNEL: u32 = 6;

/// Submerged pressure-type level sensor — 0.5 – 3.0 V analog output.
/// ADC1 channel 7 (GPIO 35, input-only).
pub const WATER_LEVEL_ADC_GPIO: i32 = 35;
pub const WATER_LEVEL_ADC_CHANNEL: u32 = 7;

/// ADC attenuation for both analog sensors (12 dB → 0 – 3.1 V range).
pub const SENSOR_ADC_ATTEN: u32 = 3; // esp_idf_sys::adc_atten_t_ADC_ATTEN_DB_12

// ---------------------------------------------------------------------------
// UART debug (console on the programming header)
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 1;
pub const UART_RX_GPIO: i32 = 3;
