//! # Calculation Ledger
//!
//! Saved calculator results, the running total of the ones the user keeps
//! "in the total", and the conversion from a fresh calculator result into a
//! record the backend stores.
//!
//! ## Record Flow
//! ```text
//! SurfaceInput + CalculatorResult + OrderMeta
//!        │
//!        ▼  NewCalculation::from_result
//! NewCalculation ──POST /calculations──► SavedCalculation
//!                                           │
//!             ┌─────────────────────────────┼──────────────────────┐
//!             ▼                             ▼                      ▼
//!     toggle include_in_total      patch client/date/source    duplicate()
//!             │                                                    │
//!             ▼                                                    ▼
//!     LedgerSummary::of(..)                                 NewCalculation
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::calculator::{CalculatorResult, CoatingMode, LineItem, SurfaceInput};

// =============================================================================
// Order Metadata
// =============================================================================

/// Who ordered and where the order came from. All fields are optional text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderMeta {
    #[serde(default)]
    pub client_name: String,
    /// Order date as entered (`YYYY-MM-DD`).
    #[serde(default)]
    pub order_date: String,
    /// Lead source, e.g. "Instagram".
    #[serde(default)]
    pub order_source: String,
}

// =============================================================================
// Saved Calculation
// =============================================================================

/// A calculation stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SavedCalculation {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub order_date: Option<String>,
    #[serde(default)]
    pub order_source: Option<String>,
    pub area_m2: f64,
    pub layers: i64,
    pub consumption_kg_m2: f64,
    pub total_kg: f64,
    pub price_per_kg: f64,
    pub total_price: f64,
    #[serde(default)]
    pub with_primer: bool,
    #[serde(default)]
    pub lac_type: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
    /// Missing or null counts as included.
    #[serde(default)]
    pub include_in_total: Option<bool>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SavedCalculation {
    /// Whether the record counts toward the ledger total.
    pub fn is_included(&self) -> bool {
        self.include_in_total.unwrap_or(true)
    }

    /// Price per m² as shown in share texts.
    pub fn price_per_m2(&self) -> f64 {
        self.total_price / self.area_m2
    }

    /// Copy of this record as a new calculation, included in the total.
    pub fn duplicate(&self) -> NewCalculation {
        NewCalculation {
            product_id: self.product_id.clone(),
            product_name: self.product_name.clone(),
            client_name: self.client_name.clone().unwrap_or_default(),
            order_date: self.order_date.clone().unwrap_or_default(),
            order_source: self.order_source.clone().unwrap_or_default(),
            area_m2: self.area_m2,
            layers: self.layers,
            consumption_kg_m2: self.consumption_kg_m2,
            total_kg: self.total_kg,
            price_per_kg: self.price_per_kg,
            total_price: self.total_price,
            with_primer: self.with_primer,
            lac_type: self.lac_type.clone(),
            items: self.items.clone(),
            include_in_total: true,
        }
    }
}

/// Create body for a calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCalculation {
    pub product_id: String,
    pub product_name: String,
    pub client_name: String,
    pub order_date: String,
    pub order_source: String,
    pub area_m2: f64,
    pub layers: i64,
    pub consumption_kg_m2: f64,
    pub total_kg: f64,
    pub price_per_kg: f64,
    pub total_price: f64,
    pub with_primer: bool,
    pub lac_type: Option<String>,
    pub items: Option<Vec<LineItem>>,
    pub include_in_total: bool,
}

impl NewCalculation {
    /// Builds the record for a calculator result.
    ///
    /// ## Derived Fields
    /// - `layers`: 1 for floki, otherwise the chosen coat count
    /// - `total_kg`: Σ item kg
    /// - `consumption_kg_m2`: total_kg / area
    /// - `price_per_kg`: total / total_kg
    /// - `lac_type`: only for floki
    ///
    /// Returns `None` when the input has no mode (no result can exist then).
    pub fn from_result(
        input: &SurfaceInput,
        result: &CalculatorResult,
        meta: &OrderMeta,
    ) -> Option<Self> {
        let mode = input.mode?;
        let total_kg = result.total_kg();

        Some(NewCalculation {
            product_id: mode.as_str().to_string(),
            product_name: mode.summary_label(input.with_primer),
            client_name: meta.client_name.clone(),
            order_date: meta.order_date.clone(),
            order_source: meta.order_source.clone(),
            area_m2: result.area,
            layers: if mode == CoatingMode::Floki {
                1
            } else {
                i64::from(input.layers)
            },
            consumption_kg_m2: total_kg / result.area,
            total_kg,
            price_per_kg: result.total / total_kg,
            total_price: result.total,
            with_primer: input.with_primer,
            lac_type: (mode == CoatingMode::Floki).then(|| input.lacquer.as_str().to_string()),
            items: Some(result.items.clone()),
            include_in_total: true,
        })
    }
}

/// Partial edit of a saved calculation; unset fields stay unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalculationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_source: Option<String>,
}

impl CalculationPatch {
    /// Applies the set fields to a local copy of a record.
    pub fn apply_to(&self, calc: &mut SavedCalculation) {
        if let Some(name) = &self.client_name {
            calc.client_name = Some(name.clone());
        }
        if let Some(date) = &self.order_date {
            calc.order_date = Some(date.clone());
        }
        if let Some(source) = &self.order_source {
            calc.order_source = Some(source.clone());
        }
    }
}

// =============================================================================
// Ledger Summary
// =============================================================================

/// Running totals over a list of saved calculations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerSummary {
    pub total_count: usize,
    pub included_count: usize,
    /// Σ total_price of the included records.
    pub included_total: f64,
}

impl LedgerSummary {
    pub fn of(calculations: &[SavedCalculation]) -> Self {
        calculations
            .iter()
            .fold(LedgerSummary::default(), |mut summary, calc| {
                summary.total_count += 1;
                if calc.is_included() {
                    summary.included_count += 1;
                    summary.included_total += calc.total_price;
                }
                summary
            })
    }
}

/// Sorts records by creation time, newest first.
pub fn sort_newest_first(calculations: &mut [SavedCalculation]) {
    calculations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{calculate, CalculatorPrices, LacquerFinish};
    use chrono::TimeZone;

    fn saved(id: &str, total: f64, included: Option<bool>, day: u32) -> SavedCalculation {
        SavedCalculation {
            id: id.to_string(),
            product_id: "paint".to_string(),
            product_name: "Фарба".to_string(),
            client_name: None,
            order_date: None,
            order_source: None,
            area_m2: 100.0,
            layers: 2,
            consumption_kg_m2: 0.2,
            total_kg: 20.0,
            price_per_kg: 990.0,
            total_price: total,
            with_primer: false,
            lac_type: None,
            items: None,
            include_in_total: included,
            created_at: Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_from_result_paint() {
        let input = SurfaceInput::new(CoatingMode::Paint, 100.0)
            .with_primer(true)
            .with_layers(3);
        let result = calculate(&input, &CalculatorPrices::default()).unwrap();
        let meta = OrderMeta {
            client_name: "Іван".to_string(),
            ..OrderMeta::default()
        };

        let record = NewCalculation::from_result(&input, &result, &meta).unwrap();

        assert_eq!(record.product_id, "paint");
        assert_eq!(record.product_name, "Фарба + Ґрунт");
        assert_eq!(record.layers, 3);
        assert_eq!(record.total_kg, 50.0);
        assert!((record.consumption_kg_m2 - 0.5).abs() < 1e-12);
        assert!((record.price_per_kg - result.total / 50.0).abs() < 1e-9);
        assert_eq!(record.lac_type, None);
        assert_eq!(record.client_name, "Іван");
        assert!(record.include_in_total);
    }

    #[test]
    fn test_from_result_floki() {
        let input =
            SurfaceInput::new(CoatingMode::Floki, 40.0).with_lacquer(LacquerFinish::Matte);
        let result = calculate(&input, &CalculatorPrices::default()).unwrap();

        let record = NewCalculation::from_result(&input, &result, &OrderMeta::default()).unwrap();

        assert_eq!(record.layers, 1);
        assert_eq!(record.lac_type.as_deref(), Some("matte"));
        assert_eq!(record.items.as_ref().map(Vec::len), Some(3));
        assert_eq!(record.total_kg, 14.0);
    }

    #[test]
    fn test_ledger_summary_counts_only_included() {
        let calcs = vec![
            saved("a", 1000.0, Some(true), 1),
            saved("b", 500.0, Some(false), 2),
            saved("c", 250.0, None, 3),
        ];
        let summary = LedgerSummary::of(&calcs);
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.included_count, 2);
        assert_eq!(summary.included_total, 1250.0);
    }

    #[test]
    fn test_duplicate_resets_inclusion() {
        let copy = saved("a", 1000.0, Some(false), 1).duplicate();
        assert!(copy.include_in_total);
        assert_eq!(copy.total_price, 1000.0);
        assert_eq!(copy.client_name, "");
    }

    #[test]
    fn test_patch_only_sets_given_fields() {
        let mut calc = saved("a", 1000.0, None, 1);
        let patch = CalculationPatch {
            order_source: Some("Instagram".to_string()),
            ..CalculationPatch::default()
        };
        patch.apply_to(&mut calc);
        assert_eq!(calc.order_source.as_deref(), Some("Instagram"));
        assert_eq!(calc.client_name, None);

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"order_source": "Instagram"}));
    }

    #[test]
    fn test_sort_newest_first() {
        let mut calcs = vec![
            saved("old", 1.0, None, 1),
            saved("new", 1.0, None, 9),
            saved("mid", 1.0, None, 5),
        ];
        sort_newest_first(&mut calcs);
        let ids: Vec<&str> = calcs.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_deserialize_backend_record() {
        let json = r#"{"id":"1","product_id":"floki","product_name":"Флоки",
            "client_name":"","order_date":"","order_source":"","area_m2":40,
            "layers":1,"consumption_kg_m2":0.35,"total_kg":14,"price_per_kg":1330.7,
            "total_price":18630,"with_primer":false,"lac_type":"glossy",
            "items":[{"name":"Емаль","kg":8,"pricePerKg":1260,"total":10080}],
            "created_at":"2025-02-01T08:30:00.123456+00:00"}"#;
        let calc: SavedCalculation = serde_json::from_str(json).unwrap();
        assert!(calc.is_included());
        assert_eq!(calc.items.unwrap()[0].price_per_kg, 1260.0);
    }
}
