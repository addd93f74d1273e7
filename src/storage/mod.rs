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


//! Database storage and models
//!
//! This module handles all database operations using SQLite through sqlx.
//!
//! # Database Schema
//! - users: accounts keyed by the external auth identifier
//! - books: one row per shelved book, owned by a user
//! - charts: three derived rows per book (PRICE, VOLUMES, PAGES) bucketed
//!   by the book's creation month
//!
//! Books and charts are only written through [`ShelfStore`], which keeps
//! the two tables consistent inside one transaction per operation.
//!
//! # Usage Example
//! ```no_run
//! use bookhub_core::storage::{Database, NewBook, BookStatus, ShelfRepository, ShelfStore};
//! use bookhub_core::clock::SystemClock;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new("./bookhub.db").await?;
//! let shelf = ShelfStore::new(Arc::new(db), Arc::new(SystemClock));
//!
//! let book = NewBook::new("auth0|alice".to_string(), "Kokoro".to_string(), BookStatus::Read)
//!     .with_price(462)
//!     .with_page(384);
//! let stored = shelf.create(book).await?;
//! let charts = shelf.charts_for_book(stored.id).await?;
//! assert_eq!(charts.len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod charts;
pub mod database;
pub mod handle;
pub mod migrations;
pub mod models;
pub mod shelf;
pub mod users;

// Re-export commonly used types
pub use charts::{ChartRepository, ChartStore};
pub use database::Database;
pub use handle::StoreHandle;
pub use models::{
    Book, BookRef, BookStatus, Chart, ChartLabel, ChartPoint, NewBook, NewChart, NewUser, User,
};
pub use shelf::{ShelfRepository, ShelfStore};
pub use users::UserStore;
