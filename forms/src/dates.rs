// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use chrono::NaiveDate;

use crate::errors::Error;

/// Strip the separators used in Korean date notation.
pub fn normalize_date(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '-' | '/' | '.'))
        .collect()
}

/// Parse `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYY.MM.DD` or `YYYYMMDD`.
pub fn parse_date(value: &str) -> Result<NaiveDate, Error> {
    let clean = normalize_date(value.trim());
    if clean.len() == 8 && clean.chars().all(|c| c.is_ascii_digit()) {
        let year: i32 = clean[..4].parse().expect("digits");
        let month: u32 = clean[4..6].parse().expect("digits");
        let day: u32 = clean[6..8].parse().expect("digits");
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Ok(date);
        }
    }
    Err(Error::BadDate(value.to_string()))
}

/// Format a date in the compact `YYYYMMDD` wire form.
pub fn format_compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_separator_styles() {
        let expected = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        for s in ["2026-01-15", "2026/01/15", "2026.01.15", "20260115"] {
            assert_eq!(parse_date(s).unwrap(), expected, "{s}");
        }
    }

    #[test]
    fn rejects_garbage_and_impossible_dates() {
        assert!(parse_date("15 Jan 2026").is_err());
        assert!(parse_date("20261315").is_err());
        assert!(parse_date("2026-02-30").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn compact_format_roundtrips() {
        let date = parse_date("2026-01-15").unwrap();
        assert_eq!(format_compact_date(date), "20260115");
    }
}
