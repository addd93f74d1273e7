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


//! Reading record
//!
//! A [`Record`] summarises one owner's shelf. It is computed on demand from
//! the live book rows and never stored.

use serde::{Deserialize, Serialize};

use crate::storage::models::Book;

/// Shelf totals, overall and restricted to books marked read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub total_cost: i64,
    pub total_cost_read: i64,
    pub total_volumes: i64,
    pub total_volumes_read: i64,
    pub total_pages: i64,
    pub total_pages_read: i64,
}

/// Aggregate a book list into a record
///
/// Sums saturate at `i64::MAX`.
pub fn build_record(books: &[Book]) -> Record {
    let mut record = Record {
        total_volumes: books.len() as i64,
        ..Record::default()
    };

    for book in books {
        record.total_cost = record.total_cost.saturating_add(book.price);
        record.total_pages = record.total_pages.saturating_add(book.page);
        if book.is_read() {
            record.total_cost_read = record.total_cost_read.saturating_add(book.price);
            record.total_volumes_read += 1;
            record.total_pages_read = record.total_pages_read.saturating_add(book.page);
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, FixedClock};
    use crate::storage::models::BookStatus;

    fn book(id: i64, price: i64, page: i64, status: BookStatus) -> Book {
        let now = FixedClock::default().now();
        Book {
            id,
            isbn10: String::new(),
            image_url: String::new(),
            title: format!("Book {}", id),
            author: "Higashino Keigo".to_string(),
            page,
            price,
            status,
            owner_id: "c0cc3f0c-9a02-45ba-9de7-7d7276bb6058".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_build_record_mixed_statuses() {
        let books = vec![
            book(1, 1640, 330, BookStatus::Read),
            book(2, 770, 234, BookStatus::Reading),
            book(3, 0, 49, BookStatus::Bought),
            book(4, 1240, 890, BookStatus::Read),
            book(5, 220, 220, BookStatus::Bought),
        ];

        let record = build_record(&books);

        assert_eq!(
            record,
            Record {
                total_cost: 3870,
                total_cost_read: 2880,
                total_volumes: 5,
                total_volumes_read: 2,
                total_pages: 1723,
                total_pages_read: 1220,
            }
        );
    }

    #[test]
    fn test_build_record_saturates_large_totals() {
        let books = vec![
            book(1, i64::MAX, i64::MAX, BookStatus::Read),
            book(2, 10, 5, BookStatus::Read),
        ];

        let record = build_record(&books);

        assert_eq!(record.total_cost, i64::MAX);
        assert_eq!(record.total_cost_read, i64::MAX);
        assert_eq!(record.total_pages, i64::MAX);
        assert_eq!(record.total_pages_read, i64::MAX);
        assert_eq!(record.total_volumes_read, 2);
    }

    #[test]
    fn test_build_record_empty() {
        assert_eq!(build_record(&[]), Record::default());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let json = serde_json::to_value(Record::default()).unwrap();
        assert!(json.get("totalCostRead").is_some());
        assert!(json.get("totalPagesRead").is_some());
    }
}
