//! Per-cycle sensor reading and its CSV record form.
//!
//! One `SensorReading` is produced per wake cycle and never outlives it —
//! the durable CSV store is the only cross-cycle memory the node has.
//! Sentinels mark fields with no valid measurement: NaN for the three
//! atmospheric values (serialized as `nan`), −999.0 for the water probe.
//! Downstream consumers treat both as "missing", never as physical readings.

use core::fmt::Write;

use crate::timefmt;

/// Column header, written exactly once per store file.
pub const CSV_HEADER: &str = "timestamp,air_temp,humidity,pressure,water_temp,water_level";

/// Water-temperature value recorded when the probe is disconnected.
/// Deliberately unphysical so it can never be mistaken for a reading.
pub const WATER_TEMP_SENTINEL_C: f32 = -999.0;

/// Measurements from one wake cycle.
#[derive(Debug, Clone, Copy)]
pub struct SensorReading {
    /// UTC epoch seconds; 0 when the clock was never synced.
    pub timestamp_epoch: i64,
    pub air_temp_c: f32,
    pub humidity_pct: f32,
    pub pressure_hpa: f32,
    pub water_temp_c: f32,
    pub water_level_cm: f32,
}

impl SensorReading {
    /// Serialize to one CSV data line (no trailing newline).
    ///
    /// Numeric fields render with 1 decimal; NaN renders as `nan`.
    pub fn to_csv_line(&self, utc_offset_minutes: i16) -> heapless::String<128> {
        let ts = timefmt::format_iso8601(self.timestamp_epoch, utc_offset_minutes);

        let mut line = heapless::String::new();
        // Worst-case line is well under the 128-byte capacity.
        let _ = line.push_str(ts.as_str());
        for value in [
            self.air_temp_c,
            self.humidity_pct,
            self.pressure_hpa,
            self.water_temp_c,
            self.water_level_cm,
        ] {
            let _ = line.push(',');
            if value.is_nan() {
                let _ = line.push_str("nan");
            } else {
                let _ = write!(line, "{value:.1}");
            }
        }
        line
    }

    /// Parse one CSV data line produced by [`to_csv_line`](Self::to_csv_line).
    ///
    /// Returns `None` on anything malformed: wrong field count, bad
    /// timestamp, unparseable numbers. `nan` parses back to NaN. Never
    /// panics, whatever the input.
    pub fn parse_csv_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut fields = line.split(',');

        let timestamp_epoch = timefmt::parse_iso8601(fields.next()?)?;
        let air_temp_c: f32 = fields.next()?.parse().ok()?;
        let humidity_pct: f32 = fields.next()?.parse().ok()?;
        let pressure_hpa: f32 = fields.next()?.parse().ok()?;
        let water_temp_c: f32 = fields.next()?.parse().ok()?;
        let water_level_cm: f32 = fields.next()?.parse().ok()?;
        if fields.next().is_some() {
            return None;
        }

        Some(Self {
            timestamp_epoch,
            air_temp_c,
            humidity_pct,
            pressure_hpa,
            water_temp_c,
            water_level_cm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading() -> SensorReading {
        SensorReading {
            timestamp_epoch: 1_717_200_000, // 2024-06-01 09:00 JST
            air_temp_c: 24.34,
            humidity_pct: 91.2,
            pressure_hpa: 1013.2,
            water_temp_c: 19.8,
            water_level_cm: 12.0,
        }
    }

    #[test]
    fn formats_one_decimal_jst() {
        let line = reading().to_csv_line(540);
        assert_eq!(
            line.as_str(),
            "2024-06-01T09:00:00+09:00,24.3,91.2,1013.2,19.8,12.0"
        );
    }

    #[test]
    fn header_matches_field_order() {
        assert_eq!(CSV_HEADER.split(',').count(), 6);
        assert!(CSV_HEADER.starts_with("timestamp,air_temp"));
    }

    #[test]
    fn nan_serializes_lowercase() {
        let r = SensorReading {
            air_temp_c: f32::NAN,
            humidity_pct: f32::NAN,
            pressure_hpa: f32::NAN,
            ..reading()
        };
        let line = r.to_csv_line(540);
        assert_eq!(
            line.as_str(),
            "2024-06-01T09:00:00+09:00,nan,nan,nan,19.8,12.0"
        );
    }

    #[test]
    fn probe_sentinel_stays_numeric() {
        let r = SensorReading {
            water_temp_c: WATER_TEMP_SENTINEL_C,
            ..reading()
        };
        let line = r.to_csv_line(540);
        assert!(line.as_str().contains(",-999.0,"));
    }

    #[test]
    fn parse_round_trips_values() {
        let r = reading();
        let line = r.to_csv_line(540);
        let back = SensorReading::parse_csv_line(line.as_str()).unwrap();
        assert_eq!(back.timestamp_epoch, r.timestamp_epoch);
        assert!((back.air_temp_c - 24.3).abs() < 0.01);
        assert!((back.humidity_pct - 91.2).abs() < 0.01);
        assert!((back.pressure_hpa - 1013.2).abs() < 0.01);
        assert!((back.water_level_cm - 12.0).abs() < 0.01);
    }

    #[test]
    fn parse_round_trips_nan() {
        let r = SensorReading {
            air_temp_c: f32::NAN,
            ..reading()
        };
        let line = r.to_csv_line(540);
        let back = SensorReading::parse_csv_line(line.as_str()).unwrap();
        assert!(back.air_temp_c.is_nan());
        assert!(!back.humidity_pct.is_nan());
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(SensorReading::parse_csv_line("").is_none());
        assert!(SensorReading::parse_csv_line(CSV_HEADER).is_none());
        assert!(
            SensorReading::parse_csv_line("2024-06-01T09:00:00+09:00,1.0,2.0,3.0,4.0").is_none(),
            "five fields is one short"
        );
        assert!(
            SensorReading::parse_csv_line("2024-06-01T09:00:00+09:00,1.0,2.0,3.0,4.0,5.0,6.0")
                .is_none(),
            "seven fields is one long"
        );
        assert!(
            SensorReading::parse_csv_line("2024-06-01T09:00:00+09:00,x,2.0,3.0,4.0,5.0").is_none()
        );
    }

    #[test]
    fn parse_accepts_trailing_newline() {
        let mut line = reading().to_csv_line(540).to_string();
        line.push('\n');
        assert!(SensorReading::parse_csv_line(&line).is_some());
    }
}
