// src/db/format.rs
//
// Wire formats shared by both stores: dates travel as "YYYY-MM-DD",
// timestamps as "YYYY-MM-DD HH:MM:SS". The same strings are written to SQLite,
// so lexical ORDER BY on start_time is chronological.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::db::error::{Result, StoreError};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_datetime(ts: NaiveDateTime) -> String {
    ts.format(DATETIME_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| StoreError::InvalidValue(format!("bad date '{s}': {e}")))
}

pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), DATETIME_FORMAT)
        .map_err(|e| StoreError::InvalidValue(format!("bad timestamp '{s}': {e}")))
}

/// Joins a date and a time picked in separate form controls.
/// Sub-second precision is dropped, the storage format has none.
pub fn combine_date_time(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    let time = time.with_nanosecond(0).unwrap_or(time);
    date.and_time(time)
}

/// Both halves or nothing: a lone date or a lone time means "no end".
pub fn combine_optional(date: Option<NaiveDate>, time: Option<NaiveTime>) -> Option<NaiveDateTime> {
    match (date, time) {
        (Some(d), Some(t)) => Some(combine_date_time(d, t)),
        _ => None,
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn earliest_birth_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

pub fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Empty form inputs are stored as NULL rather than "".
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Recovers the identifier from a legacy "id: title" selection label.
pub fn parse_label_id(label: &str) -> Option<i64> {
    label.split(':').next()?.trim().parse().ok()
}

/// serde adapters for form payloads: blank strings read as `None`.
pub mod opt_date_format {
    use super::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> std::result::Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_some(&d.format(DATE_FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) if !raw.trim().is_empty() => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

pub mod datetime_format {
    use super::DATETIME_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&ts.format(DATETIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(raw.trim(), DATETIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

pub mod opt_datetime_format {
    use super::DATETIME_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &Option<NaiveDateTime>, s: S) -> std::result::Result<S::Ok, S::Error> {
        match ts {
            Some(t) => s.serialize_some(&t.format(DATETIME_FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) if !raw.trim().is_empty() => NaiveDateTime::parse_from_str(raw.trim(), DATETIME_FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_combine_date_time_drops_subseconds() {
        let t = NaiveTime::from_hms_milli_opt(9, 30, 15, 250).unwrap();
        let ts = combine_date_time(d(2024, 6, 1), t);
        assert_eq!(format_datetime(ts), "2024-06-01 09:30:15");
    }

    #[test]
    fn test_combine_optional_needs_both_parts() {
        let t = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        assert!(combine_optional(Some(d(2024, 6, 1)), None).is_none());
        assert!(combine_optional(None, Some(t)).is_none());
        assert_eq!(
            combine_optional(Some(d(2024, 6, 1)), Some(t)).map(format_datetime),
            Some("2024-06-01 10:00:00".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_other_layouts() {
        assert!(parse_date("01/06/2024").is_err());
        assert!(parse_datetime("2024-06-01T09:00:00").is_err());
        assert_eq!(parse_date(" 1990-01-01 ").unwrap(), d(1990, 1, 1));
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("name", "Li Wei").is_ok());
        let err = require_non_empty("name", "   ").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_parse_label_id() {
        assert_eq!(parse_label_id("12: Meeting"), Some(12));
        assert_eq!(parse_label_id(" 7 :Lunch: with Bob"), Some(7));
        assert_eq!(parse_label_id("Meeting"), None);
        assert_eq!(parse_label_id(""), None);
    }

    #[test]
    fn test_blank_to_none() {
        assert_eq!(blank_to_none(Some("  ".into())), None);
        assert_eq!(blank_to_none(Some("a@b.c".into())), Some("a@b.c".into()));
        assert_eq!(blank_to_none(None), None);
    }
}
