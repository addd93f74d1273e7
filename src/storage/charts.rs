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


//! Chart queries
//!
//! Monthly series for the shelf dashboard. Rows are summed per
//! (label, year, month) for one owner. Output order is label descending by
//! rank (PRICE, VOLUMES, PAGES), then year descending, then month ascending.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, StoreContext};
use crate::storage::handle::StoreHandle;
use crate::storage::models::ChartPoint;

#[async_trait]
pub trait ChartRepository: Send + Sync {
    /// Summed chart points of one owner
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<ChartPoint>>;
}

#[derive(Clone)]
pub struct ChartStore {
    handle: Arc<dyn StoreHandle>,
}

impl ChartStore {
    pub fn new(handle: Arc<dyn StoreHandle>) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ChartRepository for ChartStore {
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<ChartPoint>> {
        let points = sqlx::query_as::<_, ChartPoint>(
            r#"
            SELECT label, year, month, SUM(value) AS value
            FROM charts
            WHERE owner_id = ?
            GROUP BY label, year, month
            ORDER BY label DESC, year DESC, month ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.handle.reader())
        .await
        .step("select charts")?;

        debug!(owner_id, points = points.len(), "loaded chart series");
        Ok(points)
    }
}
