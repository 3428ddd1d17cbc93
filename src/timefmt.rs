//! Civil-time conversion and ISO-8601 record timestamps.
//!
//! Epoch ↔ calendar conversion uses Howard Hinnant's proleptic-Gregorian
//! algorithms (`days_from_civil` / `civil_from_days`), exact over the whole
//! `i64` day range — no table lookups, no leap-second handling (UTC epoch
//! seconds in, UTC epoch seconds out).
//!
//! Record timestamps render as `YYYY-MM-DDTHH:MM:SS±hh:mm` in the node's
//! configured local offset. The offset is applied arithmetically; there is
//! no timezone database on the device and none is needed for a fixed-offset
//! deployment.

use core::fmt::Write;

/// Rendered timestamp, e.g. `2024-06-01T05:30:00+09:00`.
pub type Timestamp = heapless::String<32>;

const SECS_PER_DAY: i64 = 86_400;

/// Days since 1970-01-01 for a civil date (proleptic Gregorian).
pub fn days_from_civil(year: i32, month: u32, day: u32) -> i64 {
    let y = i64::from(if month <= 2 { year - 1 } else { year });
    let m = i64::from(month);
    let d = i64::from(day);

    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = if m > 2 { m - 3 } else { m + 9 };
    let doy = (153 * mp + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Civil date for a count of days since 1970-01-01.
pub fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = (if m <= 2 { y + 1 } else { y }) as i32;
    (year, m, d)
}

/// Local hour of day (0–23) for a UTC epoch and fixed offset.
pub fn hour_of_day(epoch: i64, utc_offset_minutes: i16) -> u8 {
    let local = epoch + i64::from(utc_offset_minutes) * 60;
    (local.rem_euclid(SECS_PER_DAY) / 3600) as u8
}

/// Render a UTC epoch as a local ISO-8601 timestamp with explicit offset.
pub fn format_iso8601(epoch: i64, utc_offset_minutes: i16) -> Timestamp {
    let local = epoch + i64::from(utc_offset_minutes) * 60;
    let days = local.div_euclid(SECS_PER_DAY);
    let tod = local.rem_euclid(SECS_PER_DAY);

    let (year, month, day) = civil_from_days(days);
    let hour = tod / 3600;
    let minute = (tod % 3600) / 60;
    let second = tod % 60;

    let sign = if utc_offset_minutes < 0 { '-' } else { '+' };
    let off = i32::from(utc_offset_minutes).abs();

    let mut out = Timestamp::new();
    // 25 bytes for any 4-digit year; capacity absorbs wider years.
    let _ = write!(
        out,
        "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}{sign}{oh:02}:{om:02}",
        oh = off / 60,
        om = off % 60,
    );
    out
}

/// Parse a strict `YYYY-MM-DDTHH:MM:SS±hh:mm` timestamp back to a UTC epoch.
///
/// Rejects malformed layout, out-of-range time fields, and calendar dates
/// that do not exist (a round-trip through `days_from_civil` /
/// `civil_from_days` catches Feb 31 and friends).
pub fn parse_iso8601(s: &str) -> Option<i64> {
    let b = s.as_bytes();
    if b.len() != 25 {
        return None;
    }
    if b[4] != b'-' || b[7] != b'-' || b[10] != b'T' || b[13] != b':' || b[16] != b':' {
        return None;
    }
    let sign: i64 = match b[19] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    if b[22] != b':' {
        return None;
    }

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(5..7)?.parse().ok()?;
    let day: u32 = s.get(8..10)?.parse().ok()?;
    let hour: i64 = s.get(11..13)?.parse().ok()?;
    let minute: i64 = s.get(14..16)?.parse().ok()?;
    let second: i64 = s.get(17..19)?.parse().ok()?;
    let off_h: i64 = s.get(20..22)?.parse().ok()?;
    let off_m: i64 = s.get(23..25)?.parse().ok()?;

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    if hour > 23 || minute > 59 || second > 59 || off_h > 23 || off_m > 59 {
        return None;
    }

    let days = days_from_civil(year, month, day);
    if civil_from_days(days) != (year, month, day) {
        return None;
    }

    let local = days * SECS_PER_DAY + hour * 3600 + minute * 60 + second;
    Some(local - sign * (off_h * 3600 + off_m * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_epoch_is_day_zero() {
        assert_eq!(days_from_civil(1970, 1, 1), 0);
        assert_eq!(civil_from_days(0), (1970, 1, 1));
    }

    #[test]
    fn known_dates_round_trip() {
        // 2000-03-01 (post leap day), 2024-01-01, 2024-02-29
        for (days, date) in [
            (11_017, (2000, 3, 1)),
            (19_723, (2024, 1, 1)),
            (19_782, (2024, 2, 29)),
        ] {
            assert_eq!(civil_from_days(days), date);
            assert_eq!(days_from_civil(date.0, date.1, date.2), days);
        }
    }

    #[test]
    fn negative_days_before_epoch() {
        assert_eq!(civil_from_days(-1), (1969, 12, 31));
        assert_eq!(days_from_civil(1969, 12, 31), -1);
    }

    #[test]
    fn formats_jst() {
        // 2024-06-01 00:00:00 UTC → 09:00 JST
        let ts = format_iso8601(1_717_200_000, 540);
        assert_eq!(ts.as_str(), "2024-06-01T09:00:00+09:00");
    }

    #[test]
    fn formats_epoch_zero_fallback() {
        let ts = format_iso8601(0, 540);
        assert_eq!(ts.as_str(), "1970-01-01T09:00:00+09:00");
    }

    #[test]
    fn formats_negative_offset() {
        let ts = format_iso8601(0, -330);
        assert_eq!(ts.as_str(), "1969-12-31T18:30:00-05:30");
    }

    #[test]
    fn hour_wraps_past_midnight() {
        // 2024-06-01 16:00 UTC = 01:00 JST next day
        assert_eq!(hour_of_day(1_717_257_600, 540), 1);
        assert_eq!(hour_of_day(0, 540), 9);
        assert_eq!(hour_of_day(0, 0), 0);
    }

    #[test]
    fn parse_inverts_format() {
        for epoch in [0_i64, 1_577_836_800, 1_717_200_000, 2_000_000_000] {
            let ts = format_iso8601(epoch, 540);
            assert_eq!(parse_iso8601(ts.as_str()), Some(epoch));
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_iso8601(""), None);
        assert_eq!(parse_iso8601("2024-06-01 09:00:00+09:00"), None); // space, not T
        assert_eq!(parse_iso8601("2024-06-01T09:00:00Z"), None); // no numeric offset
        assert_eq!(parse_iso8601("2024-13-01T09:00:00+09:00"), None); // month 13
        assert_eq!(parse_iso8601("2024-02-31T09:00:00+09:00"), None); // Feb 31
        assert_eq!(parse_iso8601("2024-06-01T24:00:00+09:00"), None); // hour 24
    }
}
