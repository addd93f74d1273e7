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


//! Book search pass-through
//!
//! Forwards a free-text query to a Google Books compatible volumes endpoint
//! and flattens the response into [`BookResult`] rows ready to be shown in
//! an "add to shelf" form. One request per search; no retries, no caching.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::convert::format_count;
use crate::error::{BookhubError, Result};

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One search hit, formatted for display
///
/// `page` and `price` carry thousands separators ("1,640").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResult {
    pub isbn10: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub title: String,
    pub author: String,
    pub page: String,
    pub price: String,
}

/// Client for the book search endpoint
#[derive(Debug, Clone)]
pub struct BookSearch {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    max_results: u32,
}

impl BookSearch {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, max_results: u32) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("bookhub/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
            max_results,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.search_base_url.clone(),
            config.search_api_key.clone(),
            config.search_max_results,
        )
    }

    /// Build the request URL for `query`
    pub fn request_url(&self, query: &str) -> Result<Url> {
        if self.base_url.trim().is_empty() {
            return Err(BookhubError::invalid_input("search base url must not be empty"));
        }

        let mut url = Url::parse(&self.base_url).map_err(|e| {
            BookhubError::invalid_input(format!("invalid search base url {}: {}", self.base_url, e))
        })?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("key", self.api_key.as_deref().unwrap_or(""))
            .append_pair("startIndex", "0")
            .append_pair("maxResults", &self.max_results.to_string());

        Ok(url)
    }

    /// Run one search
    pub async fn search(&self, query: &str) -> Result<Vec<BookResult>> {
        let url = self.request_url(query)?;
        debug!(query, "searching books");

        let response = self.client.get(url).send().await.map_err(|e| {
            BookhubError::SearchRequestFailed {
                message: e.to_string(),
                status_code: None,
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| BookhubError::SearchRequestFailed {
            message: format!("Failed to read response body: {}", e),
            status_code: Some(status.as_u16()),
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "book search returned an error status");
            return Err(BookhubError::SearchRequestFailed {
                message: format!("search returned {}: {}", status, body),
                status_code: Some(status.as_u16()),
            });
        }

        let books = extract_books(&body)?;
        debug!(query, results = books.len(), "book search finished");
        Ok(books)
    }
}

/// Flatten a volumes response into display rows
///
/// A body without `items` yields no rows. Missing fields become empty
/// strings, missing counts become "0".
pub fn extract_books(json: &str) -> Result<Vec<BookResult>> {
    let root: Value = serde_json::from_str(json)
        .map_err(|e| BookhubError::InvalidSearchResponse(e.to_string()))?;

    let items = match root.get("items").and_then(Value::as_array) {
        Some(items) => items,
        None => return Ok(Vec::new()),
    };

    Ok(items.iter().map(book_from_item).collect())
}

fn book_from_item(item: &Value) -> BookResult {
    let info = &item["volumeInfo"];

    let author = info["authors"]
        .as_array()
        .map(|authors| {
            authors
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    let isbn10 = info["industryIdentifiers"]
        .as_array()
        .and_then(|ids| {
            ids.iter()
                .find(|id| id["type"].as_str() == Some("ISBN_10"))
                .and_then(|id| id["identifier"].as_str())
        })
        .unwrap_or_default();

    BookResult {
        isbn10: isbn10.to_string(),
        image_url: text(&info["imageLinks"]["thumbnail"]),
        title: text(&info["title"]),
        author,
        page: format_count(count(&info["pageCount"])),
        price: format_count(count(&item["saleInfo"]["listPrice"]["amount"])),
    }
}

fn text(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_string()
}

/// Integer part of a JSON number; prices may be fractional
fn count(value: &Value) -> i64 {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.trunc() as i64))
        .unwrap_or(0)
}
