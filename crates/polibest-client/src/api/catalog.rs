//! # Catalog API
//!
//! Products, application settings, calculator prices and dashboard stats.

use polibest_core::catalog::{AppSettings, AppSettingsUpdate, Product, ProductInput};
use polibest_core::calculator::{CalculatorPrices, CalculatorPricesUpdate};
use polibest_core::ledger::SavedCalculation;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ApiClient;
use crate::error::ClientResult;

/// Figures shown on the dashboard.
///
/// Calculation count and revenue cover only calculations included in the
/// ledger total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub products_count: u64,
    pub calculations_count: u64,
    pub documents_count: u64,
    pub total_revenue: f64,
    #[serde(default)]
    pub recent_calculations: Vec<SavedCalculation>,
}

/// Catalog endpoints.
#[derive(Debug, Clone)]
pub struct CatalogApi {
    api: ApiClient,
}

impl CatalogApi {
    pub fn new(api: ApiClient) -> Self {
        CatalogApi { api }
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub async fn products(&self) -> ClientResult<Vec<Product>> {
        self.api.get_json("products").await
    }

    pub async fn create_product(&self, input: &ProductInput) -> ClientResult<Product> {
        input.validate()?;
        let product: Product = self.api.send_json(Method::POST, "products", input).await?;
        info!(id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    pub async fn update_product(&self, id: &str, input: &ProductInput) -> ClientResult<Product> {
        input.validate()?;
        self.api
            .send_json(Method::PUT, &format!("products/{}", id), input)
            .await
    }

    pub async fn delete_product(&self, id: &str) -> ClientResult<()> {
        self.api.delete(&format!("products/{}", id)).await?;
        info!(id = %id, "Product deleted");
        Ok(())
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub async fn settings(&self) -> ClientResult<AppSettings> {
        self.api.get_json("settings").await
    }

    /// Changes the set fields; returns the merged settings.
    pub async fn update_settings(&self, update: &AppSettingsUpdate) -> ClientResult<AppSettings> {
        update.validate()?;
        self.api.send_json(Method::PUT, "settings", update).await
    }

    // =========================================================================
    // Calculator Prices
    // =========================================================================

    pub async fn calculator_prices(&self) -> ClientResult<CalculatorPrices> {
        self.api.get_json("calculator-prices").await
    }

    /// Changes the set prices; returns the full price table.
    pub async fn update_calculator_prices(
        &self,
        update: &CalculatorPricesUpdate,
    ) -> ClientResult<CalculatorPrices> {
        let prices: CalculatorPrices = self
            .api
            .send_json(Method::PUT, "calculator-prices", update)
            .await?;
        info!("Calculator prices updated");
        Ok(prices)
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    pub async fn stats(&self) -> ClientResult<DashboardStats> {
        self.api.get_json("stats").await
    }
}
