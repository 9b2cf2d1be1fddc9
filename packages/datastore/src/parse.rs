//! Field-level parsers for the CSV column contract.
//!
//! The Seattle exports are not consistent about date formatting: older
//! files carry ISO dates (with or without a time component), newer ones
//! use US-style `MM/DD/YYYY` timestamps. Both shapes are accepted;
//! anything else fails fast with [`DataError::InvalidDate`].

use chrono::{NaiveDate, NaiveDateTime};

use crate::DataError;

/// Parses a `Created Date` field.
///
/// # Errors
///
/// Returns [`DataError::InvalidDate`] if the value matches none of the
/// accepted formats.
pub fn parse_created_date(value: &str) -> Result<NaiveDate, DataError> {
    let trimmed = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%m/%d/%Y") {
        return Ok(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%m/%d/%Y %I:%M:%S %p") {
        return Ok(dt.date());
    }

    Err(DataError::InvalidDate {
        value: value.to_string(),
    })
}

/// Parses a `Latitude` or `Longitude` field.
///
/// An empty field is a missing geocode, not an error.
///
/// # Errors
///
/// Returns [`DataError::InvalidCoordinate`] if a non-empty value is not
/// a finite number. `f64::from_str` accepts `NaN` and `inf` spellings,
/// which are never valid geocodes and would poison downstream averaging
/// and cell rounding.
pub fn parse_coordinate(value: &str) -> Result<Option<f64>, DataError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .map(Some)
        .ok_or_else(|| DataError::InvalidCoordinate {
            value: value.to_string(),
        })
}

/// Title-cases a neighborhood label for display, matching the selector
/// labels the dashboards have always shown (`"SOUTH LAKE UNION"` →
/// `"South Lake Union"`).
#[must_use]
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date() {
        let date = parse_created_date("2024-12-16").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 12, 16).unwrap());
    }

    #[test]
    fn parses_iso_datetime() {
        let date = parse_created_date("2024-12-16 08:30:00").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 12, 16).unwrap());
    }

    #[test]
    fn parses_us_date() {
        let date = parse_created_date("12/16/2024").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 12, 16).unwrap());
    }

    #[test]
    fn parses_us_datetime_with_meridiem() {
        let date = parse_created_date("01/03/2025 10:15:00 AM").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 3).unwrap());
    }

    #[test]
    fn rejects_garbage_date() {
        assert!(matches!(
            parse_created_date("yesterday"),
            Err(DataError::InvalidDate { .. })
        ));
    }

    #[test]
    fn empty_coordinate_is_none() {
        assert_eq!(parse_coordinate("").unwrap(), None);
        assert_eq!(parse_coordinate("   ").unwrap(), None);
    }

    #[test]
    fn numeric_coordinate_parses() {
        assert_eq!(parse_coordinate("47.6001").unwrap(), Some(47.6001));
        assert_eq!(parse_coordinate("-122.33").unwrap(), Some(-122.33));
    }

    #[test]
    fn rejects_non_numeric_coordinate() {
        assert!(matches!(
            parse_coordinate("n/a"),
            Err(DataError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn rejects_non_finite_coordinate() {
        // f64::from_str happily parses these; a geocode never is one.
        for value in ["NaN", "nan", "inf", "-inf", "infinity"] {
            assert!(
                matches!(
                    parse_coordinate(value),
                    Err(DataError::InvalidCoordinate { .. })
                ),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn title_cases_screaming_labels() {
        assert_eq!(title_case("SOUTH LAKE UNION"), "South Lake Union");
        assert_eq!(title_case("downtown"), "Downtown");
        assert_eq!(title_case(""), "");
    }
}
