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


//! Chart derivation
//!
//! A book contributes three chart rows, one per [`ChartLabel`], bucketed by
//! the year and month of its creation timestamp:
//!
//! | label   | value        |
//! |---------|--------------|
//! | PRICE   | `book.price` |
//! | VOLUMES | `1`          |
//! | PAGES   | `book.page`  |
//!
//! The bucket comes from the creation timestamp captured when the rows are
//! derived and is never recomputed later.

use chrono::{DateTime, Datelike, Utc};

use crate::storage::models::{Book, ChartLabel, NewBook, NewChart};

/// Derive the chart rows for a book that has not been persisted yet
///
/// `created_at` is the instant the store stamps on the book. `book_id` is
/// left unset; the store fills it in once the book row has an id.
pub fn derive_charts(book: &NewBook, created_at: DateTime<Utc>) -> [NewChart; 3] {
    ChartLabel::ALL.map(|label| NewChart {
        label,
        year: created_at.year(),
        month: created_at.month() as i32,
        value: value_for(label, book.price, book.page),
        owner_id: book.owner_id.clone(),
        book_id: None,
        created_at: None,
    })
}

/// Derive pre-populated chart shells for an already persisted book
///
/// Same values as [`derive_charts`], with `book_id` and `created_at`
/// copied from the book. The update path does not use this: it mutates the
/// existing rows in place.
pub fn derive_charts_for_update(book: &Book) -> [NewChart; 3] {
    ChartLabel::ALL.map(|label| NewChart {
        label,
        year: book.created_at.year(),
        month: book.created_at.month() as i32,
        value: value_for(label, book.price, book.page),
        owner_id: book.owner_id.clone(),
        book_id: Some(book.id),
        created_at: Some(book.created_at),
    })
}

/// Value a chart with `label` carries for a book with `price` and `page`
pub fn value_for(label: ChartLabel, price: i64, page: i64) -> i64 {
    match label {
        ChartLabel::Price => price,
        ChartLabel::Volumes => 1,
        ChartLabel::Pages => page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, FixedClock};
    use crate::storage::models::BookStatus;

    fn sample_book() -> NewBook {
        NewBook::new(
            "c0cc3f0c-9a02-45ba-9de7-7d7276bb6058".to_string(),
            "Yogisha X no Kenshin".to_string(),
            BookStatus::Read,
        )
        .with_page(247)
        .with_price(980)
    }

    #[test]
    fn test_derive_charts_one_per_label() {
        let now = FixedClock::default().now();
        let charts = derive_charts(&sample_book(), now);

        let labels: Vec<ChartLabel> = charts.iter().map(|c| c.label).collect();
        assert_eq!(labels, ChartLabel::ALL.to_vec());

        let values: Vec<i64> = charts.iter().map(|c| c.value).collect();
        assert_eq!(values, vec![980, 1, 247]);

        for chart in &charts {
            assert_eq!((chart.year, chart.month), (2024, 2));
            assert_eq!(chart.owner_id, "c0cc3f0c-9a02-45ba-9de7-7d7276bb6058");
            assert_eq!(chart.book_id, None);
            assert_eq!(chart.created_at, None);
        }
    }

    #[test]
    fn test_derive_charts_for_update_copies_identity() {
        let created_at = FixedClock::default().now();
        let new_book = sample_book();
        let book = Book {
            id: 42,
            isbn10: new_book.isbn10.clone(),
            image_url: new_book.image_url.clone(),
            title: new_book.title.clone(),
            author: new_book.author.clone(),
            page: 300,
            price: 1200,
            status: BookStatus::Reading,
            owner_id: new_book.owner_id.clone(),
            created_at,
            updated_at: created_at,
        };

        let charts = derive_charts_for_update(&book);
        assert!(charts.iter().all(|c| c.book_id == Some(42)));
        assert!(charts.iter().all(|c| c.created_at == Some(created_at)));
        assert_eq!(charts[0].value, 1200);
        assert_eq!(charts[1].value, 1);
        assert_eq!(charts[2].value, 300);
    }

    #[test]
    fn test_volume_value_ignores_price_and_page() {
        assert_eq!(value_for(ChartLabel::Volumes, 0, 0), 1);
        assert_eq!(value_for(ChartLabel::Volumes, 5000, 900), 1);
    }
}
