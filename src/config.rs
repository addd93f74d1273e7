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


//! Runtime configuration
//!
//! Settings come from serde defaults, optionally a JSON file, then
//! environment variables:
//!
//! | variable                    | field                |
//! |-----------------------------|----------------------|
//! | `BOOKHUB_DATABASE_PATH`     | `database_path`      |
//! | `BOOKHUB_MAX_CONNECTIONS`   | `max_connections`    |
//! | `BOOKHUB_BUSY_TIMEOUT_SECS` | `busy_timeout_secs`  |
//! | `BOOKHUB_SEARCH_BASE_URL`   | `search_base_url`    |
//! | `GOOGLE_BOOKS_API_KEY`      | `search_api_key`     |
//! | `BOOKHUB_LOG`               | `log_filter`         |

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BookhubError, Result};
use crate::storage::Database;

/// Configuration for the shelf database, book search and logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Maximum connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds SQLite waits on a locked database before failing
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,

    /// Volumes endpoint of the book search API
    #[serde(default = "default_search_base_url")]
    pub search_base_url: String,

    /// API key sent as `key=`; empty when unset
    #[serde(default)]
    pub search_api_key: Option<String>,

    /// Number of search results requested
    #[serde(default = "default_search_max_results")]
    pub search_max_results: u32,

    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            max_connections: default_max_connections(),
            busy_timeout_secs: default_busy_timeout(),
            search_base_url: default_search_base_url(),
            search_api_key: None,
            search_max_results: default_search_max_results(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file; missing fields take defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BookhubError::FileIoError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            BookhubError::ConfigurationError(format!("{}: {}", path.display(), e))
        })
    }

    /// Defaults overlaid with environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Overlay values from a lookup function (environment in production)
    pub fn overlay<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("BOOKHUB_DATABASE_PATH") {
            self.database_path = PathBuf::from(path);
        }
        if let Some(value) = lookup("BOOKHUB_MAX_CONNECTIONS") {
            self.max_connections = parse_setting("BOOKHUB_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = lookup("BOOKHUB_BUSY_TIMEOUT_SECS") {
            self.busy_timeout_secs = parse_setting("BOOKHUB_BUSY_TIMEOUT_SECS", &value)?;
        }
        if let Some(url) = lookup("BOOKHUB_SEARCH_BASE_URL") {
            self.search_base_url = url;
        }
        if let Some(key) = lookup("GOOGLE_BOOKS_API_KEY").filter(|k| !k.is_empty()) {
            self.search_api_key = Some(key);
        }
        if let Some(filter) = lookup("BOOKHUB_LOG") {
            self.log_filter = filter;
        }

        if self.max_connections == 0 {
            return Err(BookhubError::ConfigurationError(
                "max_connections must be at least 1".to_string(),
            ));
        }

        Ok(self)
    }
}

fn parse_setting<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        BookhubError::ConfigurationError(format!("{}='{}': {}", key, value, e))
    })
}

fn default_database_path() -> PathBuf {
    Database::get_default_path()
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout() -> u64 {
    30
}

fn default_search_base_url() -> String {
    "https://www.googleapis.com/books/v1/volumes".to_string()
}

fn default_search_max_results() -> u32 {
    10
}

fn default_log_filter() -> String {
    "info".to_string()
}
