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


//! Error types for Bookhub
//!
//! This module defines error types using thiserror for ergonomic error handling.
//! Errors are grouped by the layer that raises them so callers (the HTTP layer,
//! the CLI) can map them to a response without string matching.
//!
//! ## Taxonomy
//!
//! - `NotFound` - a lookup by identifier found no row (404-equivalent)
//! - `AlreadyExists` - a uniqueness precondition failed (400-equivalent)
//! - `InvalidInput` - malformed numeric/date input handed to a conversion helper
//! - `StoreFailure` - any statement or transaction error, tagged with the step
//! - `InvariantViolation` - persisted book/chart rows are out of shape
//!
//! Store errors are wrapped with the step that failed but never translated
//! into other semantics. Nothing in this crate retries.

use thiserror::Error;

/// Result type alias using our BookhubError type
pub type Result<T> = std::result::Result<T, BookhubError>;

/// Main error type for Bookhub
#[derive(Error, Debug)]
pub enum BookhubError {
    // ===== Domain Errors =====

    /// Lookup by identifier found no row
    #[error("Not found: {0}")]
    NotFound(String),

    /// Create would violate a uniqueness rule (checked before insert)
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Malformed input (numbers, ids, timestamps, statuses)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Persisted rows break the book <-> charts invariant
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    // ===== Database Errors =====

    /// A statement or transaction step failed
    #[error("Store failure during {step}: {source}")]
    StoreFailure {
        /// Step that failed, e.g. "insert book" or "commit"
        step: String,
        #[source]
        source: sqlx::Error,
    },

    /// Database schema migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    // ===== Configuration/State Errors =====

    /// Configuration value missing or unparsable
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Generic file I/O error with path context
    #[error("File I/O error: {0}")]
    FileIoError(String),

    /// Application state is invalid for the requested operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    // ===== Search Errors =====

    /// Book search request failed or returned a non-success status
    #[error("Book search request failed: {message}")]
    SearchRequestFailed {
        message: String,
        /// HTTP status code if available
        status_code: Option<u16>,
    },

    /// Book search returned a body that is not valid JSON
    #[error("Invalid book search response: {0}")]
    InvalidSearchResponse(String),

    // ===== Credential Errors =====

    /// Password hashing failed
    #[error("Password hashing failed: {0}")]
    PasswordHashFailed(String),

    // ===== External Library Errors =====

    /// HTTP client error from reqwest
    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Database driver error from sqlx (bootstrap paths without a step)
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<std::num::ParseIntError> for BookhubError {
    fn from(err: std::num::ParseIntError) -> Self {
        BookhubError::InvalidInput(format!("Failed to parse integer: {}", err))
    }
}

impl From<chrono::ParseError> for BookhubError {
    fn from(err: chrono::ParseError) -> Self {
        BookhubError::InvalidInput(format!("Failed to parse timestamp: {}", err))
    }
}

// Helper methods for creating common errors
impl BookhubError {
    /// Create a NotFound error with a resource description
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        BookhubError::NotFound(resource.into())
    }

    /// Create an AlreadyExists error with a resource description
    pub fn already_exists<S: Into<String>>(resource: S) -> Self {
        BookhubError::AlreadyExists(resource.into())
    }

    /// Create an InvalidInput error with a message
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        BookhubError::InvalidInput(message.into())
    }

    /// Wrap a driver error with the step that produced it
    pub fn store<S: Into<String>>(step: S, source: sqlx::Error) -> Self {
        BookhubError::StoreFailure {
            step: step.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BookhubError::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, BookhubError::AlreadyExists(_))
    }

    /// Check if error was caused by malformed caller input
    pub fn is_validation_error(&self) -> bool {
        matches!(self, BookhubError::InvalidInput(_))
    }

    /// Check if error originated in the database layer
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            BookhubError::StoreFailure { .. }
                | BookhubError::SqlxError(_)
                | BookhubError::MigrationFailed(_)
                | BookhubError::InvariantViolation(_)
        )
    }

    /// Name of the failed store step, if any
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            BookhubError::StoreFailure { step, .. } => Some(step),
            _ => None,
        }
    }

    /// Get user-friendly error message suitable for display
    ///
    /// Store internals are not exposed; domain errors keep their detail.
    pub fn user_message(&self) -> String {
        match self {
            BookhubError::NotFound(what) => format!("{} could not be found.", what),
            BookhubError::AlreadyExists(what) => format!("{} is already registered.", what),
            BookhubError::InvalidInput(message) => format!("Please check your input: {}", message),
            BookhubError::SearchRequestFailed { .. } | BookhubError::InvalidSearchResponse(_) => {
                "Book search is unavailable right now. Please try again later.".to_string()
            }
            e if e.is_store_failure() => {
                "Something went wrong while saving your shelf. Nothing was changed.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Attach a step name to raw sqlx results
///
/// ```ignore
/// sqlx::query("DELETE FROM books WHERE id = ?")
///     .bind(id)
///     .execute(&mut *tx)
///     .await
///     .step("delete books")?;
/// ```
pub trait StoreContext<T> {
    fn step(self, step: &str) -> Result<T>;
}

impl<T> StoreContext<T> for std::result::Result<T, sqlx::Error> {
    fn step(self, step: &str) -> Result<T> {
        self.map_err(|e| BookhubError::store(step, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_context_keeps_step() {
        let raw: std::result::Result<(), sqlx::Error> = Err(sqlx::Error::RowNotFound);
        let err = raw.step("insert charts").unwrap_err();

        assert!(err.is_store_failure());
        assert_eq!(err.failed_step(), Some("insert charts"));
        assert!(err.to_string().contains("insert charts"));
    }

    #[test]
    fn test_classifiers() {
        assert!(BookhubError::not_found("user abc").is_not_found());
        assert!(BookhubError::already_exists("user abc").is_already_exists());
        assert!(BookhubError::invalid_input("price").is_validation_error());
        assert!(!BookhubError::not_found("x").is_store_failure());
    }

    #[test]
    fn test_parse_int_maps_to_invalid_input() {
        let err: BookhubError = "12a".parse::<i64>().unwrap_err().into();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_user_message_hides_store_details() {
        let err = BookhubError::store("commit", sqlx::Error::PoolTimedOut);
        assert!(!err.user_message().contains("commit"));
    }
}
