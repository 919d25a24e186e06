//! # Single-Surface Calculator
//!
//! Quick estimate of material kilograms and cost for one surface, driven by
//! fixed consumption tables instead of free-form material lines.
//!
//! ## Coating Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Calculator Lines                                 │
//! │                                                                         │
//! │  with_primer?  ──►  Ґрунтівка     kg = ⌈area × 0.2⌉                     │
//! │                                                                         │
//! │  PAINT         ──►  Фарба (N шар.) kg = ⌈area × coef(N)⌉                │
//! │  ENAMEL        ──►  Емаль (N шар.) kg = ⌈area × coef(N)⌉                │
//! │  FLOKI         ──►  Емаль          kg = ⌈area × 0.2⌉                    │
//! │                     Флоки          kg = ⌈area × 0.025 × 20⌉ / 20        │
//! │                     Лак            kg = ⌈area × 0.12⌉                   │
//! │                                                                         │
//! │  coef(2) = 0.2   coef(3) = 0.3   coef(4) = 0.4                          │
//! │                                                                         │
//! │  line total = kg × price_per_kg      price per m² = total / area        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Kilograms are rounded UP because material is sold by the whole kilogram
//! (floki chips by 0.05 kg). The layer coefficient here is unrelated to the
//! derived layer count of the quote engine (see [`crate::pricing`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Consumption Constants
// =============================================================================

/// Primer consumption, kg/m².
pub const PRIMER_KG_PER_M2: f64 = 0.2;

/// Enamel base coat of the floki system, kg/m².
pub const FLOKI_ENAMEL_KG_PER_M2: f64 = 0.2;

/// Decorative chips of the floki system, kg/m².
pub const FLOKI_CHIPS_KG_PER_M2: f64 = 0.025;

/// Top lacquer of the floki system, kg/m².
pub const LACQUER_KG_PER_M2: f64 = 0.12;

/// Floki chips are sold in steps of 1/20 kg.
const FLOKI_STEPS_PER_KG: f64 = 20.0;

// =============================================================================
// Modes
// =============================================================================

/// Coating system selected in the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CoatingMode {
    /// Paint in 2–4 coats.
    Paint,
    /// Enamel in 2–4 coats.
    Enamel,
    /// Enamel base + decorative chips + lacquer.
    Floki,
}

impl CoatingMode {
    /// Wire name, also used as the product id of a saved calculation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CoatingMode::Paint => "paint",
            CoatingMode::Enamel => "enamel",
            CoatingMode::Floki => "floki",
        }
    }

    /// Ukrainian name shown to users.
    pub fn display_name(&self) -> &'static str {
        match self {
            CoatingMode::Paint => "Фарба",
            CoatingMode::Enamel => "Емаль",
            CoatingMode::Floki => "Флоки",
        }
    }

    /// Name with a short primer suffix, e.g. "Фарба + Ґрунт".
    pub fn summary_label(&self, with_primer: bool) -> String {
        if with_primer {
            format!("{} + Ґрунт", self.display_name())
        } else {
            self.display_name().to_string()
        }
    }

    /// Name with the full primer suffix, e.g. "Фарба + Ґрунтівка".
    pub fn full_label(&self, with_primer: bool) -> String {
        if with_primer {
            format!("{} + Ґрунтівка", self.display_name())
        } else {
            self.display_name().to_string()
        }
    }
}

impl fmt::Display for CoatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoatingMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paint" => Ok(CoatingMode::Paint),
            "enamel" => Ok(CoatingMode::Enamel),
            "floki" | "flakes" => Ok(CoatingMode::Floki),
            _ => Err(ValidationError::NotAllowed {
                field: "mode".to_string(),
                allowed: vec!["paint".into(), "enamel".into(), "floki".into()],
            }),
        }
    }
}

/// Lacquer finish of the floki system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LacquerFinish {
    #[default]
    Glossy,
    Matte,
}

impl LacquerFinish {
    pub fn as_str(&self) -> &'static str {
        match self {
            LacquerFinish::Glossy => "glossy",
            LacquerFinish::Matte => "matte",
        }
    }

    /// Line name in the result.
    pub fn line_name(&self) -> &'static str {
        match self {
            LacquerFinish::Glossy => "Лак глянц.",
            LacquerFinish::Matte => "Лак матовий",
        }
    }
}

impl FromStr for LacquerFinish {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "glossy" | "gloss" => Ok(LacquerFinish::Glossy),
            "matte" | "matt" => Ok(LacquerFinish::Matte),
            _ => Err(ValidationError::NotAllowed {
                field: "lacquer".to_string(),
                allowed: vec!["glossy".into(), "matte".into()],
            }),
        }
    }
}

// =============================================================================
// Layer Coefficient Table
// =============================================================================

/// Paint/enamel consumption per coat count (kg/m² for all coats).
///
/// | coats | kg/m² |
/// |-------|-------|
/// | 2     | 0.2   |
/// | 3     | 0.3   |
/// | 4     | 0.4   |
///
/// Any other coat count is priced as the 4-coat row.
pub struct LayerCoefficientTable;

impl LayerCoefficientTable {
    /// Coat counts offered by the calculator.
    pub const CHOICES: [u8; 3] = [2, 3, 4];

    /// kg/m² for `layers` coats.
    pub fn coefficient(layers: u8) -> f64 {
        match layers {
            2 => 0.2,
            3 => 0.3,
            _ => 0.4,
        }
    }
}

// =============================================================================
// Prices
// =============================================================================

/// Price per kg of every calculator material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorPrices {
    #[serde(default = "default_primer")]
    pub primer: f64,
    #[serde(default = "default_paint")]
    pub paint: f64,
    #[serde(default = "default_enamel")]
    pub enamel: f64,
    #[serde(default = "default_floki")]
    pub floki: f64,
    #[serde(default = "default_lac_glossy")]
    pub lac_glossy: f64,
    #[serde(default = "default_lac_matte")]
    pub lac_matte: f64,
}

fn default_primer() -> f64 {
    720.0
}
fn default_paint() -> f64 {
    990.0
}
fn default_enamel() -> f64 {
    1260.0
}
fn default_floki() -> f64 {
    1350.0
}
fn default_lac_glossy() -> f64 {
    1440.0
}
fn default_lac_matte() -> f64 {
    1800.0
}

impl Default for CalculatorPrices {
    fn default() -> Self {
        CalculatorPrices {
            primer: default_primer(),
            paint: default_paint(),
            enamel: default_enamel(),
            floki: default_floki(),
            lac_glossy: default_lac_glossy(),
            lac_matte: default_lac_matte(),
        }
    }
}

impl CalculatorPrices {
    /// Price per kg of the chosen lacquer finish.
    pub fn lacquer(&self, finish: LacquerFinish) -> f64 {
        match finish {
            LacquerFinish::Glossy => self.lac_glossy,
            LacquerFinish::Matte => self.lac_matte,
        }
    }
}

/// Partial price change: only the fields that are set are overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorPricesUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primer: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paint: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enamel: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floki: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lac_glossy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lac_matte: Option<f64>,
}

impl CalculatorPricesUpdate {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == CalculatorPricesUpdate::default()
    }

    /// Merges the set fields into `prices`.
    pub fn apply(&self, prices: &CalculatorPrices) -> CalculatorPrices {
        CalculatorPrices {
            primer: self.primer.unwrap_or(prices.primer),
            paint: self.paint.unwrap_or(prices.paint),
            enamel: self.enamel.unwrap_or(prices.enamel),
            floki: self.floki.unwrap_or(prices.floki),
            lac_glossy: self.lac_glossy.unwrap_or(prices.lac_glossy),
            lac_matte: self.lac_matte.unwrap_or(prices.lac_matte),
        }
    }
}

// =============================================================================
// Input and Result
// =============================================================================

/// One calculator request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceInput {
    /// `None` until the user picks a mode; no result is produced then.
    pub mode: Option<CoatingMode>,
    pub with_primer: bool,
    /// Surface area in m².
    pub area_m2: f64,
    /// Coat count for paint/enamel; ignored by floki.
    pub layers: u8,
    /// Lacquer finish for floki; ignored otherwise.
    pub lacquer: LacquerFinish,
}

impl SurfaceInput {
    /// A request for `mode` on `area_m2` with 2 coats, no primer, glossy lacquer.
    pub fn new(mode: CoatingMode, area_m2: f64) -> Self {
        SurfaceInput {
            mode: Some(mode),
            with_primer: false,
            area_m2,
            layers: 2,
            lacquer: LacquerFinish::Glossy,
        }
    }

    pub fn with_primer(mut self, with_primer: bool) -> Self {
        self.with_primer = with_primer;
        self
    }

    pub fn with_layers(mut self, layers: u8) -> Self {
        self.layers = layers;
        self
    }

    pub fn with_lacquer(mut self, lacquer: LacquerFinish) -> Self {
        self.lacquer = lacquer;
        self
    }
}

/// One line of a calculator result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    pub kg: f64,
    pub price_per_kg: f64,
    pub total: f64,
}

impl LineItem {
    fn priced(name: impl Into<String>, kg: f64, price_per_kg: f64) -> Self {
        LineItem {
            name: name.into(),
            kg,
            price_per_kg,
            total: kg * price_per_kg,
        }
    }
}

/// Result of [`calculate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorResult {
    /// Primer first (if any), then the mode lines.
    pub items: Vec<LineItem>,
    pub total: f64,
    pub price_per_m2: f64,
    pub area: f64,
}

impl CalculatorResult {
    /// Sum of the kilograms of every line.
    pub fn total_kg(&self) -> f64 {
        self.items.iter().map(|item| item.kg).sum()
    }
}

// =============================================================================
// Calculation
// =============================================================================

/// Computes the material list for one surface.
///
/// Returns `None` when no mode is selected or the area is not a positive
/// finite number.
///
/// ## Example
/// ```rust
/// use polibest_core::calculator::{calculate, CalculatorPrices, CoatingMode, SurfaceInput};
///
/// let input = SurfaceInput::new(CoatingMode::Paint, 100.0).with_primer(true);
/// let result = calculate(&input, &CalculatorPrices::default()).unwrap();
///
/// assert_eq!(result.items[0].name, "Ґрунтівка");
/// assert_eq!(result.items[1].name, "Фарба (2 шар.)");
/// assert_eq!(result.total, 20.0 * 720.0 + 20.0 * 990.0);
/// ```
pub fn calculate(input: &SurfaceInput, prices: &CalculatorPrices) -> Option<CalculatorResult> {
    let mode = input.mode?;
    let area = input.area_m2;
    if !area.is_finite() || area <= 0.0 {
        return None;
    }

    let mut items = Vec::with_capacity(4);

    if input.with_primer {
        let kg = (area * PRIMER_KG_PER_M2).ceil();
        items.push(LineItem::priced("Ґрунтівка", kg, prices.primer));
    }

    match mode {
        CoatingMode::Paint | CoatingMode::Enamel => {
            let kg = (area * LayerCoefficientTable::coefficient(input.layers)).ceil();
            let (label, price) = if mode == CoatingMode::Paint {
                ("Фарба", prices.paint)
            } else {
                ("Емаль", prices.enamel)
            };
            items.push(LineItem::priced(
                format!("{} ({} шар.)", label, input.layers),
                kg,
                price,
            ));
        }
        CoatingMode::Floki => {
            let enamel_kg = (area * FLOKI_ENAMEL_KG_PER_M2).ceil();
            let chips_kg =
                (area * FLOKI_CHIPS_KG_PER_M2 * FLOKI_STEPS_PER_KG).ceil() / FLOKI_STEPS_PER_KG;
            let lacquer_kg = (area * LACQUER_KG_PER_M2).ceil();

            items.push(LineItem::priced("Емаль", enamel_kg, prices.enamel));
            items.push(LineItem::priced("Флоки", chips_kg, prices.floki));
            items.push(LineItem::priced(
                input.lacquer.line_name(),
                lacquer_kg,
                prices.lacquer(input.lacquer),
            ));
        }
    }

    let total: f64 = items.iter().map(|item| item.total).sum();
    Some(CalculatorResult {
        items,
        total,
        price_per_m2: total / area,
        area,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
