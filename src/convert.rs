// Bookhub - Book Shelf & Reading Statistics
// Copyright (C) 2025 Bookhub contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Conversion helpers for text input
//!
//! Counts arrive from forms and search results with thousands separators
//! ("1,640"); ids and timestamps arrive as strings. These helpers turn them
//! into the typed values the stores expect, and back.

use chrono::{DateTime, Utc};

use crate::error::{BookhubError, Result};
use crate::storage::models::{BookRef, BookStatus};

/// Parse a non-negative count, ignoring thousands separators
pub fn parse_count(input: &str) -> Result<i64> {
    let digits: String = input.trim().chars().filter(|c| *c != ',').collect();
    if digits.is_empty() {
        return Err(BookhubError::invalid_input("count must not be empty"));
    }

    let value: i64 = digits.parse()?;
    if value < 0 {
        return Err(BookhubError::invalid_input(format!(
            "count must not be negative: {}",
            input
        )));
    }
    Ok(value)
}

/// Format a count with thousands separators
pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn parse_book_id(input: &str) -> Result<i64> {
    let id: i64 = input.trim().parse()?;
    if id <= 0 {
        return Err(BookhubError::invalid_input(format!("invalid book id: {}", input)));
    }
    Ok(id)
}

/// Parse a batch of book ids
///
/// Fails on the first malformed id; nothing is returned partially.
pub fn parse_book_refs(inputs: &[String]) -> Result<Vec<BookRef>> {
    inputs
        .iter()
        .map(|s| parse_book_id(s).map(BookRef::new))
        .collect()
}

/// Parse an RFC 3339 timestamp into UTC
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(input.trim())?.with_timezone(&Utc))
}

pub fn parse_status(input: &str) -> Result<BookStatus> {
    BookStatus::from_str(&input.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("1,640").unwrap(), 1640);
        assert_eq!(parse_count("980").unwrap(), 980);
        assert_eq!(parse_count(" 1,234,567 ").unwrap(), 1_234_567);
        assert_eq!(parse_count("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_count_rejects_garbage() {
        assert!(parse_count("").unwrap_err().is_validation_error());
        assert!(parse_count("12a").unwrap_err().is_validation_error());
        assert!(parse_count("-5").unwrap_err().is_validation_error());
        assert!(parse_count("1.5").unwrap_err().is_validation_error());
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(980), "980");
        assert_eq!(format_count(1640), "1,640");
        assert_eq!(format_count(1_234_567), "1,234,567");
        assert_eq!(format_count(-3870), "-3,870");
        assert_eq!(parse_count(&format_count(123_456)).unwrap(), 123_456);
    }

    #[test]
    fn test_parse_book_refs() {
        let refs = parse_book_refs(&["3".to_string(), " 12".to_string()]).unwrap();
        assert_eq!(refs, vec![BookRef::new(3), BookRef::new(12)]);

        let err = parse_book_refs(&["3".to_string(), "x".to_string()]).unwrap_err();
        assert!(err.is_validation_error());
        assert!(parse_book_id("0").unwrap_err().is_validation_error());
    }

    #[test]
    fn test_parse_timestamp() {
        let expected = Utc.with_ymd_and_hms(2024, 2, 5, 14, 43, 0).unwrap();
        assert_eq!(parse_timestamp("2024-02-05T14:43:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-02-05T23:43:00+09:00").unwrap(), expected);
        assert!(parse_timestamp("2024/02/05").unwrap_err().is_validation_error());
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("read").unwrap(), BookStatus::Read);
        assert_eq!(parse_status("Reading").unwrap(), BookStatus::Reading);
        assert!(parse_status("lost").is_err());
    }
}
