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


//! Bookhub core
//!
//! Book shelf persistence with derived monthly reading charts.

pub mod clock;
pub mod config;
pub mod convert;
pub mod derive;
pub mod error;
pub mod library;
pub mod logging;
pub mod password;
pub mod record;
pub mod search;
pub mod storage;

pub use config::Config;
pub use error::{BookhubError, Result};
pub use library::Library;
pub use record::Record;
pub use search::{BookResult, BookSearch};
