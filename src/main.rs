//! Tanbo Node Firmware — Main Entry Point
//!
//! Hexagonal architecture around a single-shot measurement cycle.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                    │
//! │                                                             │
//! │  Bme280Atmosphere  NtcWaterTempProbe  PressureLevelSensor   │
//! │  RtcTimeSource     CsvStore           EspPower              │
//! │  LogEventSink      NvsConfigStore                           │
//! │                                                             │
//! │  ──────────────── Port Trait Boundary ────────────────      │
//! │                                                             │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │             CycleService (pure logic)               │    │
//! │  │  clock → measure → append record → schedule         │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! │                                                             │
//! │  One cycle per boot; ends in deep sleep, never returns.     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod calibrate;
pub mod config;
pub mod cycle;
pub mod diagnostics;
pub mod error;
pub mod pins;
pub mod power;
pub mod reading;
pub mod schedule;
pub mod timefmt;

pub mod adapters;
pub mod drivers;
pub mod sensors;
pub mod storage;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use adapters::clock::RtcTimeSource;
use adapters::log_sink::LogEventSink;
use adapters::nvs::NvsConfigStore;
use calibrate::LevelCalibration;
use config::NodeConfig;
use cycle::service::CycleService;
use error::Error;
use power::EspPower;
use sensors::atmosphere::Bme280Atmosphere;
use sensors::water_level::PressureLevelSensor;
use sensors::water_temp::NtcWaterTempProbe;
use storage::csv_store::CsvStore;

// ── Main ──────────────────────────────────────────────────────
//
// One wake, one cycle. Everything fallible either degrades (sensors,
// storage, time sync) or propagates into the panic guard, which also ends
// in deep sleep. There is no path that leaves the node awake.

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    info!("╔══════════════════════════════════════╗");
    info!("║  Tanbo Node v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // Panic guard before anything that can fail: a panicking boot must
    // reschedule itself, not strand the node awake.
    diagnostics::install_panic_guard(NodeConfig::default().safe_default_interval_secs);

    info!("BOOT  | wake={}", power::wake_reason());

    // ── 2. Config from NVS (or defaults) ──────────────────────
    let mut nvs = NvsConfigStore::new().map_err(Error::from)?;
    let cfg = nvs.load().unwrap_or_else(|e| {
        warn!("BOOT  | config load failed ({}), using defaults", e);
        NodeConfig::default()
    });
    // Re-arm the guard with the operator-configured interval.
    diagnostics::install_panic_guard(cfg.safe_default_interval_secs);

    if let Some(note) = diagnostics::take_crash_note(&mut nvs) {
        warn!(
            "BOOT  | previous run panicked after {}s: {}",
            note.uptime_secs, note.reason
        );
    }

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;

    // ── 4. Clock seeding (runtime decision, empty SSID skips) ─
    if cfg.wifi_ssid.is_empty() {
        info!("CLOCK | no credentials configured, skipping SNTP");
    } else {
        let sysloop = EspSystemEventLoop::take()?;
        let nvs_partition = EspDefaultNvsPartition::take()?;
        if let Err(e) =
            adapters::clock::seed_clock_from_network(&cfg, peripherals.modem, sysloop, nvs_partition)
        {
            warn!("CLOCK | seeding failed ({}), continuing on RTC", e);
        }
    }

    // ── 5. Record store ───────────────────────────────────────
    // A failed mount is non-fatal; the append will report unavailability
    // and the cycle falls back to the safe default interval.
    if let Err(e) = storage::flash_fs::mount() {
        warn!("STORE | mount failed ({}), records skipped this cycle", e);
    }

    // ── 6. Sensors ────────────────────────────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        warn!("hw_init: {}, ADC sensors degraded", e);
    }

    // SDA/SCL per the board definition (pins::I2C_SDA_GPIO / I2C_SCL_GPIO).
    let i2c_cfg = I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ));
    let mut atmosphere = match I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &i2c_cfg,
    ) {
        Ok(i2c) => Bme280Atmosphere::new(i2c),
        Err(e) => {
            warn!("bme280: I2C bus init failed ({}), atmosphere degraded", e);
            Bme280Atmosphere::absent()
        }
    };

    let mut water_temp = NtcWaterTempProbe::new();
    let mut water_level = PressureLevelSensor::new(LevelCalibration::from_config(&cfg));

    // ── 7. Remaining ports ────────────────────────────────────
    let clock = RtcTimeSource::new(cfg.utc_offset_minutes);
    let mut store = CsvStore::new(cfg.log_path.as_str());
    let mut sink = LogEventSink::new(cfg.utc_offset_minutes);
    let mut power_port = EspPower::new();

    // ── 8. Run the cycle ──────────────────────────────────────
    let mut service = CycleService::new(cfg);
    service.run(
        &clock,
        &mut atmosphere,
        &mut water_temp,
        &mut water_level,
        &mut store,
        &mut power_port,
        &mut sink,
    );

    // Deep sleep does not return on hardware; reaching this point means a
    // host-style simulation run.
    Ok(())
}
