//! Provider date/time parsing into canonical, zone-correct instants.
//!
//! The upstream encodes match close times in two shapes depending on the
//! feed variant:
//!
//! - packed 14 digits: `yyyyMMddHHmmss` (e.g. `20250619220000`)
//! - locale-formatted: `yy.MM.dd (weekday) HH:mm` (e.g. `25.06.19 (목) 22:00`)
//!
//! Both express wall-clock time in the board's fixed zone already, so the
//! instant is constructed by pairing the field values with that zone's
//! offset, never by reinterpreting them from some other zone.

use chrono::{DateTime, LocalResult, TimeZone};
use chrono_tz::Tz;

use crate::error::ParseError;

/// Parse a provider date/time string into an instant in `zone`.
///
/// Accepts either recognized shape; anything else, including a digit string
/// of the wrong length or an out-of-range field, is a `ParseError`.
pub fn parse_instant(input: &str, zone: Tz) -> Result<DateTime<Tz>, ParseError> {
    let trimmed = input.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        parse_packed(trimmed, zone)
    } else {
        parse_locale(trimmed, zone)
    }
}

/// Render an instant back into the packed `yyyyMMddHHmmss` layout.
///
/// For any instant produced by parsing a valid packed string this
/// round-trips to the original digits.
pub fn format_packed(instant: &DateTime<Tz>) -> String {
    instant.format("%Y%m%d%H%M%S").to_string()
}

/// Packed shape: exactly 14 ASCII digits, positions 0-3 year, 4-5 month,
/// 6-7 day, 8-9 hour, 10-11 minute, 12-13 second.
fn parse_packed(digits: &str, zone: Tz) -> Result<DateTime<Tz>, ParseError> {
    if digits.len() != 14 {
        return Err(ParseError::UnrecognizedShape(digits.to_string()));
    }

    let year = field(digits, &digits[0..4], "year")?;
    let month = field(digits, &digits[4..6], "month")?;
    let day = field(digits, &digits[6..8], "day")?;
    let hour = field(digits, &digits[8..10], "hour")?;
    let minute = field(digits, &digits[10..12], "minute")?;
    let second = field(digits, &digits[12..14], "second")?;

    build_instant(digits, zone, year as i32, month, day, hour, minute, second)
}

/// Locale shape: `yy.MM.dd (weekday) HH:mm`. The weekday token is display
/// chrome and ignored; two-digit years are assumed to be in the 2000s;
/// seconds default to 00.
fn parse_locale(input: &str, zone: Tz) -> Result<DateTime<Tz>, ParseError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let (date_part, time_part) = match tokens.as_slice() {
        [date, weekday, time] if weekday.starts_with('(') => (*date, *time),
        [date, time] => (*date, *time),
        _ => return Err(ParseError::UnrecognizedShape(input.to_string())),
    };

    let date_fields: Vec<&str> = date_part.split('.').collect();
    let [yy, mm, dd] = date_fields.as_slice() else {
        return Err(ParseError::UnrecognizedShape(input.to_string()));
    };
    let time_fields: Vec<&str> = time_part.split(':').collect();
    let [hh, mi] = time_fields.as_slice() else {
        return Err(ParseError::UnrecognizedShape(input.to_string()));
    };

    let year = 2000 + field(input, yy, "year")?;
    let month = field(input, mm, "month")?;
    let day = field(input, dd, "day")?;
    let hour = field(input, hh, "hour")?;
    let minute = field(input, mi, "minute")?;

    build_instant(input, zone, year as i32, month, day, hour, minute, 0)
}

fn field(input: &str, digits: &str, name: &'static str) -> Result<u32, ParseError> {
    digits
        .parse::<u32>()
        .map_err(|_| ParseError::NonNumericField {
            field: name,
            input: input.to_string(),
        })
}

#[allow(clippy::too_many_arguments)]
fn build_instant(
    input: &str,
    zone: Tz,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Result<DateTime<Tz>, ParseError> {
    range_check(input, "month", month, 1, 12)?;
    range_check(input, "day", day, 1, 31)?;
    range_check(input, "hour", hour, 0, 23)?;
    range_check(input, "minute", minute, 0, 59)?;
    range_check(input, "second", second, 0, 59)?;

    // Per-field ranges passed; chrono still rejects non-dates like Feb 30,
    // and zone gaps yield no instant at all.
    match zone.with_ymd_and_hms(year, month, day, hour, minute, second) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(ParseError::InvalidInstant(input.to_string())),
    }
}

fn range_check(
    input: &str,
    name: &'static str,
    value: u32,
    min: u32,
    max: u32,
) -> Result<(), ParseError> {
    if value < min || value > max {
        return Err(ParseError::FieldOutOfRange {
            field: name,
            value,
            input: input.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Offset, Timelike};
    use chrono_tz::Asia::Seoul;

    #[test]
    fn test_parse_packed() {
        let dt = parse_instant("20250619220000", Seoul).unwrap();
        assert_eq!(
            (dt.year(), dt.month(), dt.day()),
            (2025, 6, 19),
        );
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (22, 0, 0));
        // KST is UTC+9
        assert_eq!(dt.offset().fix().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn test_packed_round_trip() {
        for digits in ["20250619220000", "20251231235959", "20240229120000"] {
            let dt = parse_instant(digits, Seoul).unwrap();
            assert_eq!(format_packed(&dt), digits);
        }
    }

    #[test]
    fn test_parse_locale_formatted() {
        let dt = parse_instant("25.06.19 (목) 22:00", Seoul).unwrap();
        assert_eq!(
            (dt.year(), dt.month(), dt.day(), dt.hour(), dt.minute(), dt.second()),
            (2025, 6, 19, 22, 0, 0)
        );
    }

    #[test]
    fn test_parse_locale_without_weekday_token() {
        let dt = parse_instant("25.06.19 22:00", Seoul).unwrap();
        assert_eq!((dt.year(), dt.hour()), (2025, 22));
    }

    #[test]
    fn test_weekday_token_not_validated() {
        // 2025-06-19 is a Thursday; a wrong weekday char still parses
        let dt = parse_instant("25.06.19 (월) 22:00", Seoul).unwrap();
        assert_eq!(dt.day(), 19);
    }

    #[test]
    fn test_wrong_length_digits_rejected() {
        assert!(matches!(
            parse_instant("202506192200", Seoul),
            Err(ParseError::UnrecognizedShape(_))
        ));
        assert!(matches!(
            parse_instant("2025061922000000", Seoul),
            Err(ParseError::UnrecognizedShape(_))
        ));
    }

    #[test]
    fn test_out_of_range_fields_rejected() {
        assert!(matches!(
            parse_instant("20251319220000", Seoul),
            Err(ParseError::FieldOutOfRange { field: "month", .. })
        ));
        assert!(matches!(
            parse_instant("20250600220000", Seoul),
            Err(ParseError::FieldOutOfRange { field: "day", .. })
        ));
        assert!(matches!(
            parse_instant("20250619240000", Seoul),
            Err(ParseError::FieldOutOfRange { field: "hour", .. })
        ));
        assert!(matches!(
            parse_instant("20250619226000", Seoul),
            Err(ParseError::FieldOutOfRange { field: "minute", .. })
        ));
    }

    #[test]
    fn test_non_calendar_date_rejected() {
        // Feb 30 passes the per-field 1-31 check but is not a real date
        assert!(matches!(
            parse_instant("20250230120000", Seoul),
            Err(ParseError::InvalidInstant(_))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(parse_instant("", Seoul).is_err());
        assert!(parse_instant("tomorrow 10pm", Seoul).is_err());
        assert!(parse_instant("25/06/19 22:00", Seoul).is_err());
    }
}
