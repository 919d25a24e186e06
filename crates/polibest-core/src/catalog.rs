//! # Catalog
//!
//! Products and application-wide settings kept by the backend.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::validation::{validate_consumption, validate_price, validate_required, ValidationResult};

// =============================================================================
// Product
// =============================================================================

/// A product of the price list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price_per_kg: f64,
    /// Recommended consumption, kg/m².
    pub consumption_kg_m2: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl Product {
    /// Material cost of covering `area_m2` with this product.
    pub fn cost_for_area(&self, area_m2: f64) -> f64 {
        area_m2 * self.consumption_kg_m2 * self.price_per_kg
    }
}

/// Create/update body for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub name: String,
    pub price_per_kg: f64,
    pub consumption_kg_m2: f64,
    #[serde(default)]
    pub description: String,
}

impl ProductInput {
    /// Validates the product before it is sent.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("name", &self.name)?;
        validate_price(self.price_per_kg)?;
        validate_consumption(self.consumption_kg_m2)?;
        Ok(())
    }
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        ProductInput {
            name: product.name.clone(),
            price_per_kg: product.price_per_kg,
            consumption_kg_m2: product.consumption_kg_m2,
            description: product.description.clone().unwrap_or_default(),
        }
    }
}

// =============================================================================
// Application Settings
// =============================================================================

/// Settings shared by every user of the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppSettings {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default = "default_company_name")]
    pub company_name: String,
}

fn default_currency() -> String {
    "RUB".to_string()
}

fn default_unit() -> String {
    "m2".to_string()
}

fn default_company_name() -> String {
    crate::PRODUCT_LINE.to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            currency: default_currency(),
            unit: default_unit(),
            company_name: default_company_name(),
        }
    }
}

/// Partial settings change; unset fields stay unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppSettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

impl AppSettingsUpdate {
    /// Merges the set fields into `settings`.
    pub fn apply(&self, settings: &AppSettings) -> AppSettings {
        AppSettings {
            currency: self.currency.clone().unwrap_or_else(|| settings.currency.clone()),
            unit: self.unit.clone().unwrap_or_else(|| settings.unit.clone()),
            company_name: self
                .company_name
                .clone()
                .unwrap_or_else(|| settings.company_name.clone()),
        }
    }

    /// Rejects blank values for the fields that are set.
    pub fn validate(&self) -> ValidationResult<()> {
        for (field, value) in [
            ("currency", &self.currency),
            ("unit", &self.unit),
            ("company_name", &self.company_name),
        ] {
            if let Some(value) = value {
                if value.trim().is_empty() {
                    return Err(ValidationError::Required {
                        field: field.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_cost_for_area() {
        let product = Product {
            id: "p1".to_string(),
            name: "PoliBest 911".to_string(),
            price_per_kg: 1512.0,
            consumption_kg_m2: 0.3,
            description: None,
        };
        assert!((product.cost_for_area(100.0) - 45_360.0).abs() < 1e-6);
        assert_eq!(ProductInput::from(&product).description, "");
    }

    #[test]
    fn test_product_input_validation() {
        let input = ProductInput {
            name: "Лак".to_string(),
            price_per_kg: 1440.0,
            consumption_kg_m2: 0.12,
            description: String::new(),
        };
        assert!(input.validate().is_ok());
        assert!(ProductInput {
            name: " ".to_string(),
            ..input.clone()
        }
        .validate()
        .is_err());
        assert!(ProductInput {
            consumption_kg_m2: 0.0,
            ..input
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_settings_defaults_and_update() {
        let settings: AppSettings = serde_json::from_str(r#"{"id":"main_settings"}"#).unwrap();
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.company_name, "PoliBest 911");

        let update = AppSettingsUpdate {
            company_name: Some("ТОВ «ВедеВперед»".to_string()),
            ..AppSettingsUpdate::default()
        };
        let merged = update.apply(&settings);
        assert_eq!(merged.company_name, "ТОВ «ВедеВперед»");
        assert_eq!(merged.unit, "m2");
        assert!(update.validate().is_ok());

        let blank = AppSettingsUpdate {
            unit: Some(String::new()),
            ..AppSettingsUpdate::default()
        };
        assert!(blank.validate().is_err());
    }
}
