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


//! Shelf store
//!
//! Transactional persistence of books together with their derived chart
//! rows. Every live book has exactly three charts (PRICE, VOLUMES, PAGES)
//! tagged with the book's id, owner and creation month:
//!
//! - **create** inserts the book and its three charts in one transaction
//! - **update** rewrites the book row and the PRICE/PAGES chart values in
//!   place; chart ids, buckets and the VOLUMES row are never touched
//! - **delete** removes a batch of books and every chart that points at them
//!
//! Each operation opens one transaction and commits only after every step
//! succeeded. Dropping the transaction on an early return rolls it back.
//!
//! The first statement of every write transaction is itself a write. SQLite
//! transactions start deferred; one that reads first cannot take the write
//! lock while another writer holds it and fails with SQLITE_BUSY without
//! waiting. Leading with the write makes a second writer queue on
//! `busy_timeout` instead.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::derive::derive_charts;
use crate::error::{BookhubError, Result, StoreContext};
use crate::storage::handle::StoreHandle;
use crate::storage::models::{check_counts, Book, BookRef, Chart, ChartLabel, NewBook, NewChart};

/// Shelf operations, independent of how the chart rows are kept
#[async_trait]
pub trait ShelfRepository: Send + Sync {
    /// Persist a new book and its charts; returns the stored book
    async fn create(&self, book: NewBook) -> Result<Book>;

    /// All books of one owner, in insertion order
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Book>>;

    /// One book by id
    async fn find_book(&self, book_id: i64) -> Result<Book>;

    /// Raw chart rows of one book, in insertion order
    async fn charts_for_book(&self, book_id: i64) -> Result<Vec<Chart>>;

    /// Rewrite a book and refresh its PRICE/PAGES chart values
    async fn update(&self, book: Book) -> Result<Book>;

    /// Delete a batch of books and their charts; returns books deleted
    async fn delete(&self, books: &[BookRef]) -> Result<u64>;
}

/// SQLite shelf with denormalized chart rows
#[derive(Clone)]
pub struct ShelfStore {
    handle: Arc<dyn StoreHandle>,
    clock: Arc<dyn Clock>,
}

impl ShelfStore {
    pub fn new(handle: Arc<dyn StoreHandle>, clock: Arc<dyn Clock>) -> Self {
        Self { handle, clock }
    }
}

#[async_trait]
impl ShelfRepository for ShelfStore {
    async fn create(&self, book: NewBook) -> Result<Book> {
        check_counts(book.price, book.page)?;

        let now = self.clock.now();
        let charts = derive_charts(&book, now);

        let mut tx = self.handle.begin().await?;

        let book_id = sqlx::query(
            r#"
            INSERT INTO books (
                isbn10, image_url, title, author, page, price,
                status, owner_id, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&book.isbn10)
        .bind(&book.image_url)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.page)
        .bind(book.price)
        .bind(book.status)
        .bind(&book.owner_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .step("insert book")?
        .last_insert_rowid();

        insert_charts(&mut tx, &charts, book_id, now).await?;

        tx.commit().await.step("commit")?;

        info!(book_id, owner_id = %book.owner_id, "created book with charts");

        Ok(Book {
            id: book_id,
            isbn10: book.isbn10,
            image_url: book.image_url,
            title: book.title,
            author: book.author,
            page: book.page,
            price: book.price,
            status: book.status,
            owner_id: book.owner_id,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE owner_id = ? ORDER BY id")
            .bind(owner_id)
            .fetch_all(self.handle.reader())
            .await
            .step("select books")?;

        debug!(owner_id, count = books.len(), "loaded shelf");
        Ok(books)
    }

    async fn find_book(&self, book_id: i64) -> Result<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
            .bind(book_id)
            .fetch_optional(self.handle.reader())
            .await
            .step("select book")?
            .ok_or_else(|| BookhubError::not_found(format!("book {}", book_id)))
    }

    async fn charts_for_book(&self, book_id: i64) -> Result<Vec<Chart>> {
        sqlx::query_as::<_, Chart>("SELECT * FROM charts WHERE book_id = ? ORDER BY id")
            .bind(book_id)
            .fetch_all(self.handle.reader())
            .await
            .step("select charts")
    }

    async fn update(&self, book: Book) -> Result<Book> {
        check_counts(book.price, book.page)?;

        let now = self.clock.now();
        let mut tx = self.handle.begin().await?;

        // created_at and owner_id stay as stored: the chart buckets and
        // chart owner were derived from them
        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                isbn10 = ?, image_url = ?, title = ?, author = ?,
                page = ?, price = ?, status = ?, updated_at = ?
            WHERE id = ? AND owner_id = ?
            RETURNING *
            "#,
        )
        .bind(&book.isbn10)
        .bind(&book.image_url)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.page)
        .bind(book.price)
        .bind(book.status)
        .bind(now)
        .bind(book.id)
        .bind(&book.owner_id)
        .fetch_optional(&mut *tx)
        .await
        .step("update book")?;

        let updated = match updated {
            Some(updated) => updated,
            None => return Err(missing_or_foreign(&mut tx, &book).await),
        };

        let charts = sqlx::query_as::<_, Chart>("SELECT * FROM charts WHERE book_id = ? ORDER BY id")
            .bind(book.id)
            .fetch_all(&mut *tx)
            .await
            .step("select charts")?;

        ensure_chart_set(book.id, &charts)?;

        let changed: Vec<(i64, i64)> = charts
            .iter()
            .filter_map(|chart| match chart.label {
                ChartLabel::Price => Some((chart.id, updated.price)),
                ChartLabel::Pages => Some((chart.id, updated.page)),
                ChartLabel::Volumes => None,
            })
            .collect();

        update_chart_values(&mut tx, &changed, now).await?;

        tx.commit().await.step("commit")?;

        info!(book_id = updated.id, "updated book with charts");
        Ok(updated)
    }

    async fn delete(&self, books: &[BookRef]) -> Result<u64> {
        let mut ids: Vec<i64> = books.iter().map(|b| b.id).collect();
        ids.sort_unstable();
        ids.dedup();

        if ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.handle.begin().await?;

        let mut delete_charts = QueryBuilder::<Sqlite>::new("DELETE FROM charts WHERE book_id IN ");
        push_id_list(&mut delete_charts, &ids);
        let charts_deleted = delete_charts
            .build()
            .execute(&mut *tx)
            .await
            .step("delete charts")?
            .rows_affected();

        let mut delete_books = QueryBuilder::<Sqlite>::new("DELETE FROM books WHERE id IN ");
        push_id_list(&mut delete_books, &ids);
        delete_books.push(" RETURNING id");
        let deleted: Vec<i64> = delete_books
            .build_query_scalar()
            .fetch_all(&mut *tx)
            .await
            .step("delete books")?;

        if deleted.len() != ids.len() {
            let missing: Vec<String> = ids
                .iter()
                .filter(|id| !deleted.contains(id))
                .map(|id| id.to_string())
                .collect();
            return Err(BookhubError::not_found(format!("books {}", missing.join(", "))));
        }
        let books_deleted = deleted.len() as u64;

        tx.commit().await.step("commit")?;

        info!(books_deleted, charts_deleted, "deleted books with charts");
        Ok(books_deleted)
    }
}

/// Explain why an update matched no row: the book is gone or is not the
/// caller's
async fn missing_or_foreign(conn: &mut SqliteConnection, book: &Book) -> BookhubError {
    let owner: Option<String> = match sqlx::query_scalar("SELECT owner_id FROM books WHERE id = ?")
        .bind(book.id)
        .fetch_optional(conn)
        .await
        .step("select book owner")
    {
        Ok(owner) => owner,
        Err(e) => return e,
    };

    match owner {
        Some(_) => BookhubError::invalid_input(format!("book {} belongs to another owner", book.id)),
        None => BookhubError::not_found(format!("book {}", book.id)),
    }
}

/// Insert the derived charts of a freshly inserted book
async fn insert_charts(
    conn: &mut SqliteConnection,
    charts: &[NewChart],
    book_id: i64,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<()> {
    let mut insert = QueryBuilder::<Sqlite>::new(
        "INSERT INTO charts (label, year, month, value, owner_id, book_id, created_at, updated_at) ",
    );
    insert.push_values(charts, |mut row, chart| {
        row.push_bind(chart.label)
            .push_bind(chart.year)
            .push_bind(chart.month)
            .push_bind(chart.value)
            .push_bind(chart.owner_id.as_str())
            .push_bind(book_id)
            .push_bind(now)
            .push_bind(now);
    });

    insert
        .build()
        .execute(conn)
        .await
        .step("insert charts")?;

    Ok(())
}

/// Set new values on chart rows in a single statement
async fn update_chart_values(
    conn: &mut SqliteConnection,
    changed: &[(i64, i64)],
    now: chrono::DateTime<chrono::Utc>,
) -> Result<()> {
    if changed.is_empty() {
        return Ok(());
    }

    let mut update = QueryBuilder::<Sqlite>::new("UPDATE charts SET value = CASE id");
    for (id, value) in changed {
        update.push(" WHEN ").push_bind(*id).push(" THEN ").push_bind(*value);
    }
    update.push(" END, updated_at = ").push_bind(now).push(" WHERE id IN ");
    let ids: Vec<i64> = changed.iter().map(|(id, _)| *id).collect();
    push_id_list(&mut update, &ids);

    update
        .build()
        .execute(conn)
        .await
        .step("update charts")?;

    Ok(())
}

/// Append `(?, ?, ...)` bound to `ids`
fn push_id_list(builder: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    builder.push("(");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

/// A book must carry exactly one chart per label
fn ensure_chart_set(book_id: i64, charts: &[Chart]) -> Result<()> {
    let complete = charts.len() == ChartLabel::ALL.len()
        && ChartLabel::ALL
            .iter()
            .all(|label| charts.iter().filter(|c| c.label == *label).count() == 1);

    if !complete {
        warn!(book_id, rows = charts.len(), "chart rows out of shape");
        return Err(BookhubError::InvariantViolation(format!(
            "book {} has {} chart rows, expected one per label",
            book_id,
            charts.len()
        )));
    }

    Ok(())
}
