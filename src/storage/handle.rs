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


//! Storage handle capability
//!
//! Stores do not depend on the concrete pool. They receive a `StoreHandle`
//! that can open a transaction or hand out a reader for single-statement
//! queries, and nothing else.
//!
//! A transaction returned by [`StoreHandle::begin`] rolls back when dropped
//! unless `commit()` was called, so every early return (including `?` and a
//! cancelled future) leaves the store untouched.
//!
//! Transactions begin deferred. Writers must issue a write as their first
//! statement so that a concurrent writer waits on the busy timeout rather
//! than failing on a read-to-write lock upgrade.

use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::{Result, StoreContext};
use crate::storage::database::Database;

#[async_trait]
pub trait StoreHandle: Send + Sync {
    /// Start a transaction
    async fn begin(&self) -> Result<Transaction<'static, Sqlite>>;

    /// Pool for reads that need no transaction
    fn reader(&self) -> &SqlitePool;
}

#[async_trait]
impl StoreHandle for Database {
    async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        self.pool().begin().await.step("begin transaction")
    }

    fn reader(&self) -> &SqlitePool {
        self.pool()
    }
}
