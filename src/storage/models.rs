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


//! Database models for Bookhub
//!
//! Entities persisted by the shelf and user stores, plus the input shapes
//! used to create them.
//!
//! # SQLite Adaptations
//! - `BookStatus` stored as lowercase TEXT (`bought`, `reading`, `read`)
//! - `ChartLabel` stored as INTEGER rank so that `ORDER BY label DESC`
//!   yields PRICE, VOLUMES, PAGES
//! - DateTime stored as TEXT in ISO 8601 format

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use crate::error::{BookhubError, Result};

// ============================================================================
// ENUMS
// ============================================================================

/// Reading state of a book on the shelf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Bought,
    Reading,
    Read,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Bought => "bought",
            BookStatus::Reading => "reading",
            BookStatus::Read => "read",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "bought" => Ok(BookStatus::Bought),
            "reading" => Ok(BookStatus::Reading),
            "read" => Ok(BookStatus::Read),
            other => Err(BookhubError::invalid_input(format!(
                "unknown book status '{}'",
                other
            ))),
        }
    }
}

/// Metric a chart row carries
///
/// The discriminant is the stored value; higher ranks sort first under
/// `ORDER BY label DESC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChartLabel {
    Pages = 1,
    Volumes = 2,
    Price = 3,
}

impl ChartLabel {
    /// All labels in derivation order
    pub const ALL: [ChartLabel; 3] = [ChartLabel::Price, ChartLabel::Volumes, ChartLabel::Pages];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartLabel::Price => "PRICE",
            ChartLabel::Volumes => "VOLUMES",
            ChartLabel::Pages => "PAGES",
        }
    }
}

impl fmt::Display for ChartLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// BOOKS
// ============================================================================

/// Book entity - one volume on an owner's shelf
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Primary key (auto-increment)
    pub id: i64,
    pub isbn10: String,
    pub image_url: String,
    pub title: String,
    pub author: String,
    pub page: i64,
    pub price: i64,
    pub status: BookStatus,
    /// External user identifier (users.external_id)
    pub owner_id: String,

    // Timestamps
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn is_read(&self) -> bool {
        self.status == BookStatus::Read
    }

    /// Reference usable in a delete batch
    pub fn to_ref(&self) -> BookRef {
        BookRef { id: self.id }
    }
}

/// Input for creating a book; id and timestamps are assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    #[serde(default)]
    pub isbn10: String,
    #[serde(default)]
    pub image_url: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub price: i64,
    pub status: BookStatus,
    pub owner_id: String,
}

impl NewBook {
    pub fn new(owner_id: String, title: String, status: BookStatus) -> Self {
        Self {
            isbn10: String::new(),
            image_url: String::new(),
            title,
            author: String::new(),
            page: 0,
            price: 0,
            status,
            owner_id,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_isbn10(mut self, isbn10: impl Into<String>) -> Self {
        self.isbn10 = isbn10.into();
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    pub fn with_page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    pub fn with_price(mut self, price: i64) -> Self {
        self.price = price;
        self
    }
}

/// Book identity for batch deletes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookRef {
    pub id: i64,
}

impl BookRef {
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}

/// Reject negative counts before they reach the store
pub(crate) fn check_counts(price: i64, page: i64) -> Result<()> {
    if price < 0 {
        return Err(BookhubError::invalid_input(format!(
            "price must not be negative (got {})",
            price
        )));
    }
    if page < 0 {
        return Err(BookhubError::invalid_input(format!(
            "page must not be negative (got {})",
            page
        )));
    }
    Ok(())
}

// ============================================================================
// CHARTS
// ============================================================================

/// Chart row - one derived metric of one book, bucketed by creation month
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub id: i64,
    pub label: ChartLabel,
    pub year: i32,
    /// 1-12
    pub month: i32,
    pub value: i64,
    pub owner_id: String,
    pub book_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Chart shell produced by derivation, before it is persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChart {
    pub label: ChartLabel,
    pub year: i32,
    pub month: i32,
    pub value: i64,
    pub owner_id: String,
    /// Unset until the owning book has an id
    pub book_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

/// One point of a monthly series: summed value per (label, year, month)
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: ChartLabel,
    pub year: i32,
    pub month: i32,
    pub value: i64,
}

// ============================================================================
// USERS
// ============================================================================

/// User account
///
/// `Debug` redacts the e-mail address and password hash.
#[derive(Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    /// Identifier issued by the external auth provider
    pub external_id: String,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string; `None` for federated accounts
    #[serde(skip_serializing)]
    #[sqlx(default)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check a plaintext password against the stored hash
    ///
    /// Federated accounts (no hash) never match.
    pub fn verify_password(&self, raw: &str) -> bool {
        match &self.password_hash {
            Some(hash) => crate::password::verify_password(raw, hash),
            None => false,
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("external_id", &self.external_id)
            .field("name", &self.name)
            .field("email", &"xxxx@xxxx")
            .field("password_hash", &self.password_hash.as_ref().map(|_| "xxxxxxxxx"))
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Input for registering a user
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub external_id: String,
    pub name: String,
    pub email: String,
    /// Plaintext; hashed by the store, never persisted as given
    #[serde(default)]
    pub password: Option<String>,
}

impl NewUser {
    pub fn new(external_id: String, name: String, email: String) -> Self {
        Self {
            external_id,
            name,
            email,
            password: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("external_id", &self.external_id)
            .field("name", &self.name)
            .field("email", &"xxxx@xxxx")
            .field("password", &self.password.as_ref().map(|_| "xxxxxxxxx"))
            .finish()
    }
}
