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


//! Library facade
//!
//! [`Library`] bundles the shelf, chart and user stores over one database
//! and exposes the operations a request handler or the CLI needs. Each
//! method maps onto a single store call, so every write still runs in its
//! own transaction.

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::Result;
use crate::record::{self, Record};
use crate::storage::{
    Book, BookRef, ChartPoint, ChartRepository, ChartStore, Database, NewBook, NewUser,
    ShelfRepository, ShelfStore, User, UserStore,
};

#[derive(Clone)]
pub struct Library {
    db: Database,
    shelf: ShelfStore,
    charts: ChartStore,
    users: UserStore,
}

impl Library {
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        let handle = Arc::new(db.clone());
        Self {
            shelf: ShelfStore::new(handle.clone(), clock.clone()),
            charts: ChartStore::new(handle.clone()),
            users: UserStore::new(handle, clock),
            db,
        }
    }

    /// Open the configured database with the system clock
    pub async fn open(config: &Config) -> Result<Self> {
        let db = Database::connect(config).await?;
        Ok(Self::new(db, Arc::new(SystemClock)))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn shelf(&self) -> &ShelfStore {
        &self.shelf
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    // ===== Books =====

    pub async fn create_book_with_charts(&self, book: NewBook) -> Result<Book> {
        self.shelf.create(book).await
    }

    pub async fn find_books_by_owner(&self, owner_id: &str) -> Result<Vec<Book>> {
        self.shelf.find_by_owner(owner_id).await
    }

    pub async fn find_book(&self, book_id: i64) -> Result<Book> {
        self.shelf.find_book(book_id).await
    }

    pub async fn update_book_with_charts(&self, book: Book) -> Result<Book> {
        self.shelf.update(book).await
    }

    pub async fn delete_books_with_charts(&self, books: &[BookRef]) -> Result<u64> {
        self.shelf.delete(books).await
    }

    // ===== Charts and records =====

    pub async fn find_charts_by_owner(&self, owner_id: &str) -> Result<Vec<ChartPoint>> {
        self.charts.find_by_owner(owner_id).await
    }

    pub fn build_record(books: &[Book]) -> Record {
        record::build_record(books)
    }

    /// Load an owner's shelf and summarise it
    pub async fn record_for_owner(&self, owner_id: &str) -> Result<Record> {
        let books = self.shelf.find_by_owner(owner_id).await?;
        Ok(record::build_record(&books))
    }

    // ===== Users =====

    pub async fn register_user(&self, user: NewUser) -> Result<User> {
        self.users.create(user).await
    }

    pub async fn find_user(&self, external_id: &str) -> Result<User> {
        self.users.find_by_external_id(external_id).await
    }

    pub async fn update_user(&self, user: User) -> Result<User> {
        self.users.update(user).await
    }

    /// Delete a user by external id, with their shelf
    pub async fn remove_user(&self, external_id: &str) -> Result<()> {
        let user = self.users.find_by_external_id(external_id).await?;
        self.users.delete(&user).await
    }

    // ===== Health =====

    pub async fn is_active(&self) -> bool {
        self.db.is_active().await
    }
}
