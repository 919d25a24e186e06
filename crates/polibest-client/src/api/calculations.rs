//! # Calculation API
//!
//! Saved calculator results, the ledger behind the calculations page.

use polibest_core::ledger::{CalculationPatch, NewCalculation, SavedCalculation};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, info};

use super::ApiClient;
use crate::error::ClientResult;

#[derive(Debug, Deserialize)]
struct ToggleResponse {
    include_in_total: bool,
}

/// Calculation endpoints.
#[derive(Debug, Clone)]
pub struct CalculationApi {
    api: ApiClient,
}

impl CalculationApi {
    pub fn new(api: ApiClient) -> Self {
        CalculationApi { api }
    }

    pub async fn list(&self) -> ClientResult<Vec<SavedCalculation>> {
        let calculations: Vec<SavedCalculation> = self.api.get_json("calculations").await?;
        debug!(count = calculations.len(), "Loaded calculations");
        Ok(calculations)
    }

    pub async fn get(&self, id: &str) -> ClientResult<SavedCalculation> {
        self.api.get_json(&format!("calculations/{}", id)).await
    }

    pub async fn create(&self, calculation: &NewCalculation) -> ClientResult<SavedCalculation> {
        let saved: SavedCalculation = self
            .api
            .send_json(Method::POST, "calculations", calculation)
            .await?;
        info!(id = %saved.id, total = saved.total_price, "Calculation saved");
        Ok(saved)
    }

    /// Edits the order fields; returns the updated record.
    pub async fn patch(&self, id: &str, patch: &CalculationPatch) -> ClientResult<SavedCalculation> {
        self.api
            .send_json(Method::PATCH, &format!("calculations/{}", id), patch)
            .await
    }

    /// Flips whether the record counts toward the ledger total; returns the new value.
    pub async fn toggle_total(&self, id: &str) -> ClientResult<bool> {
        let response: ToggleResponse = self
            .api
            .call(Method::PATCH, &format!("calculations/{}/toggle-total", id))
            .await?;
        debug!(id = %id, include = response.include_in_total, "Toggled ledger inclusion");
        Ok(response.include_in_total)
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.api.delete(&format!("calculations/{}", id)).await?;
        info!(id = %id, "Calculation deleted");
        Ok(())
    }
}
