//! Property tests for the pure decision and encoding layers.
//!
//! Runs on host (x86_64) only — proptest is not available for ESP32 targets.
//! On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use proptest::prelude::*;
use tanbo_node::calibrate::{ADC_FULL_SCALE, LevelCalibration};
use tanbo_node::config::NodeConfig;
use tanbo_node::reading::{SensorReading, WATER_TEMP_SENTINEL_C};
use tanbo_node::schedule::{NightWindow, SchedulePolicy, Tier, schedule};
use tanbo_node::timefmt;

fn reading_at(air: f32, humidity: f32) -> SensorReading {
    SensorReading {
        timestamp_epoch: 1_717_200_000,
        air_temp_c: air,
        humidity_pct: humidity,
        pressure_hpa: 1013.0,
        water_temp_c: 21.0,
        water_level_cm: 8.0,
    }
}

// ── Water-level calibration ───────────────────────────────────

fn arb_rough_volts() -> impl Strategy<Value = f32> {
    prop_oneof![
        0.0f32..=5.0,
        Just(f32::NAN),
        Just(f32::INFINITY),
        Just(f32::NEG_INFINITY),
    ]
}

proptest! {
    /// Every 16-bit count maps into `[0, l_max_cm]` under the default
    /// calibration, including counts past the 12-bit full scale.
    #[test]
    fn level_stays_in_range(raw in 0u16..=u16::MAX) {
        let cal = LevelCalibration::from_config(&NodeConfig::default());
        let cm = cal.level_cm(raw);
        prop_assert!(
            cm >= 0.0 && cm <= cal.l_max_cm,
            "count {} mapped outside the depth range: {}",
            raw, cm
        );
    }

    /// A larger count never reads as shallower water.
    #[test]
    fn level_is_monotone(a in 0u16..=4095u16, b in 0u16..=4095u16) {
        let cal = LevelCalibration::from_config(&NodeConfig::default());
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            cal.level_cm(lo) <= cal.level_cm(hi),
            "depth decreased from count {} to {}",
            lo, hi
        );
    }

    /// Degenerate calibrations (collapsed span, NaN, infinities) degrade to
    /// a dry reading, never to NaN in the record.
    #[test]
    fn bogus_calibration_never_yields_nan(
        vref in arb_rough_volts(),
        v0 in arb_rough_volts(),
        l_max in prop_oneof![
            1.0f32..=100.0,
            Just(0.0f32),
            Just(-5.0f32),
            Just(f32::NAN),
            Just(f32::INFINITY),
        ],
        raw in 0u16..=4095u16,
    ) {
        let cal = LevelCalibration {
            vref,
            full_scale: ADC_FULL_SCALE,
            v0,
            l_max_cm: l_max,
        };
        let cm = cal.level_cm(raw);
        prop_assert!(cm.is_finite(), "{:?} produced {}", cal, cm);
        prop_assert!(cm >= 0.0, "{:?} produced negative depth {}", cal, cm);
    }
}

// ── Sleep scheduling ──────────────────────────────────────────

/// Any value a sensor field can carry: plausible physics, NaN from a dead
/// BME280, or the disconnected-probe sentinel.
fn arb_field_value() -> impl Strategy<Value = f32> {
    prop_oneof![
        -50.0f32..60.0,
        Just(f32::NAN),
        Just(WATER_TEMP_SENTINEL_C),
    ]
}

fn arb_missing_value() -> impl Strategy<Value = f32> {
    prop_oneof![Just(f32::NAN), Just(WATER_TEMP_SENTINEL_C)]
}

proptest! {
    /// Every hour inside the default night window sleeps the night
    /// interval, whatever the sensors report.
    #[test]
    fn night_always_wins(
        hour in prop_oneof![22u8..24u8, 0u8..5u8],
        air in arb_field_value(),
        humidity in arb_field_value(),
    ) {
        let policy = SchedulePolicy::from_config(&NodeConfig::default());
        let d = schedule(hour, &reading_at(air, humidity), &policy);
        prop_assert_eq!(d.tier, Tier::Night, "hour {} was not night", hour);
        prop_assert_eq!(d.interval_secs, policy.night_interval_secs);
    }

    /// A degraded sensor must never look like a forming risk window, even
    /// when the other field reads textbook blast conditions.
    #[test]
    fn degraded_sensors_never_escalate(
        hour in 5u8..22u8,
        missing in arb_missing_value(),
        good_air in 20.0f32..=28.0,
        good_humidity in 90.0f32..=100.0,
        air_is_missing in any::<bool>(),
    ) {
        let (air, humidity) = if air_is_missing {
            (missing, good_humidity)
        } else {
            (good_air, missing)
        };
        let policy = SchedulePolicy::from_config(&NodeConfig::default());
        let d = schedule(hour, &reading_at(air, humidity), &policy);
        prop_assert_ne!(
            d.tier, Tier::HighRisk,
            "missing data escalated: air={} humidity={}",
            air, humidity
        );
    }

    /// Warm-wet air inside the blast band always escalates at a day hour.
    #[test]
    fn risk_band_always_escalates_by_day(
        hour in 5u8..22u8,
        air in 20.0f32..=28.0,
        humidity in 90.0f32..=100.0,
    ) {
        let policy = SchedulePolicy::from_config(&NodeConfig::default());
        let d = schedule(hour, &reading_at(air, humidity), &policy);
        prop_assert_eq!(
            d.tier, Tier::HighRisk,
            "air={} humidity={} at {} did not escalate",
            air, humidity, hour
        );
        prop_assert_eq!(d.interval_secs, policy.high_risk_interval_secs);
    }

    /// The decision's interval always equals the interval configured for
    /// the tier it names, for any combination of tunables.
    #[test]
    fn interval_always_matches_tier(
        start in 0u8..24u8,
        end in 0u8..24u8,
        normal in 60u32..=86_400u32,
        night in 60u32..=86_400u32,
        high in 30u32..=86_400u32,
        hour in 0u8..24u8,
        air in arb_field_value(),
        humidity in arb_field_value(),
    ) {
        let mut cfg = NodeConfig::default();
        cfg.night_start_hour = start;
        cfg.night_end_hour = end;
        cfg.normal_interval_secs = normal;
        cfg.night_interval_secs = night;
        cfg.high_risk_interval_secs = high;

        let policy = SchedulePolicy::from_config(&cfg);
        let d = schedule(hour, &reading_at(air, humidity), &policy);
        let expected = match d.tier {
            Tier::Night => night,
            Tier::HighRisk => high,
            Tier::Normal => normal,
        };
        prop_assert_eq!(
            d.interval_secs, expected,
            "tier {:?} carried the wrong interval", d.tier
        );
    }
}

// ── Timestamps and CSV records ────────────────────────────────

fn arb_parser_input() -> impl Strategy<Value = String> {
    prop_oneof![
        ".{0,100}",           // arbitrary unicode
        "[0-9T:+,.n-]{0,80}", // record-shaped alphabet
    ]
}

proptest! {
    /// Rendering then parsing a timestamp recovers the exact UTC epoch for
    /// any deployable offset, and the rendered hour agrees with
    /// `hour_of_day` (the value the scheduler sees).
    #[test]
    fn timestamp_round_trips_any_offset(
        epoch in 0i64..=4_102_444_800i64,
        off in -720i16..=840i16,
    ) {
        let ts = timefmt::format_iso8601(epoch, off);
        prop_assert_eq!(
            timefmt::parse_iso8601(ts.as_str()),
            Some(epoch),
            "rendered {}", ts
        );

        let rendered_hour = ts.as_str().get(11..13).and_then(|h| h.parse::<u8>().ok());
        prop_assert_eq!(rendered_hour, Some(timefmt::hour_of_day(epoch, off)));
    }

    /// Any in-range reading survives a render → parse round trip to within
    /// the 1-decimal precision of the line format.
    #[test]
    fn record_line_round_trips(
        epoch in 0i64..=4_102_444_800i64,
        air in -50.0f32..60.0,
        humidity in 0.0f32..100.0,
        pressure in 870.0f32..1085.0,
        water_temp in -20.0f32..60.0,
        water_level in 0.0f32..20.0,
    ) {
        let r = SensorReading {
            timestamp_epoch: epoch,
            air_temp_c: air,
            humidity_pct: humidity,
            pressure_hpa: pressure,
            water_temp_c: water_temp,
            water_level_cm: water_level,
        };
        let line = r.to_csv_line(540);
        let back = SensorReading::parse_csv_line(line.as_str());
        prop_assert!(back.is_some(), "line {:?} did not parse", line.as_str());

        let back = back.unwrap();
        prop_assert_eq!(back.timestamp_epoch, epoch);
        for (name, orig, parsed) in [
            ("air_temp", air, back.air_temp_c),
            ("humidity", humidity, back.humidity_pct),
            ("pressure", pressure, back.pressure_hpa),
            ("water_temp", water_temp, back.water_temp_c),
            ("water_level", water_level, back.water_level_cm),
        ] {
            prop_assert!(
                (orig - parsed).abs() <= 0.051,
                "{} drifted past 1-decimal precision: {} -> {}",
                name, orig, parsed
            );
        }
    }

    /// Both parsers are total: arbitrary input yields Some or None, never
    /// a panic.
    #[test]
    fn parsers_never_panic(line in arb_parser_input()) {
        let _ = SensorReading::parse_csv_line(&line);
        let _ = timefmt::parse_iso8601(&line);
    }
}

// Exhaustive cross-check of the wrap-around window against a modular
// reference: hour is in [start, end) iff its clockwise distance from
// `start` is less than the window length. All 24³ combinations.
#[test]
fn night_window_matches_modular_reference() {
    for start in 0u8..24 {
        for end in 0u8..24 {
            let w = NightWindow {
                start_hour: start,
                end_hour: end,
            };
            let len = (i32::from(end) - i32::from(start)).rem_euclid(24);
            for hour in 0u8..24 {
                let expect = (i32::from(hour) - i32::from(start)).rem_euclid(24) < len;
                assert_eq!(
                    w.contains(hour),
                    expect,
                    "start={start} end={end} hour={hour}"
                );
            }
        }
    }
}
