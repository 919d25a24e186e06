//! # Quote Records
//!
//! The data model of a commercial proposal ("КП").
//!
//! ## Record Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              Quote                                      │
//! │  id, title, client, location, date, status, status_history             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌──────────────────────────────────────────────┐ │
//! │  │ QuoteSettings   │  │ rooms: Vec<Room>                             │ │
//! │  │ ─────────────── │  │  ┌────────────────────────────────────────┐  │ │
//! │  │ currency        │  │  │ Room { id, name, area }                │  │ │
//! │  │ include_vat     │  │  │  materials: Vec<MaterialLine>          │  │ │
//! │  │ vat_rate        │  │  │   └ { id, name, consumption, price }   │  │ │
//! │  │ dealer_discount │  │  │  totals: Option<RoomTotals> (snapshot) │  │ │
//! │  │ production_time │  │  └────────────────────────────────────────┘  │ │
//! │  │ warranty        │  └──────────────────────────────────────────────┘ │
//! │  └─────────────────┘                                                   │
//! │  additional_data: description, advantages, tech params, company,       │
//! │                   signature                                            │
//! │  grand_total: snapshot written when the quote was saved                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Semantics
//! `Room::totals` and `Quote::grand_total` are written at save time and are
//! NOT refreshed when prices change later. [`Quote::live_grand_total`]
//! recomputes from the room data, [`Quote::snapshot_drift`] reports the
//! difference and [`Quote::recalculate`] refreshes the snapshots on request.
//!
//! ## Wire Format
//! Field names follow the backend: camelCase (`includeVat`, `grandTotal`,
//! `additionalData`) except `status_history` and `created_at`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Currency;
use crate::pricing::{quote_grand_total, room_total, RoomTotals};
use crate::DEFAULT_VAT_RATE;

// =============================================================================
// Material Line
// =============================================================================

/// One material applied to a room.
///
/// `consumption` is the total kg per m² for this line with every coat already
/// included (0.30 kg/m² = 3 coats).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MaterialLine {
    /// Identifier unique within the quote (assigned by the wizard).
    #[serde(default)]
    pub id: i64,

    /// Free-text material name.
    #[serde(default)]
    pub name: String,

    /// kg per m², all coats included.
    pub consumption: f64,

    /// Price per kg in the quote's currency.
    pub price: f64,
}

impl MaterialLine {
    /// Creates a material line.
    pub fn new(id: i64, name: impl Into<String>, consumption: f64, price: f64) -> Self {
        MaterialLine {
            id,
            name: name.into(),
            consumption,
            price,
        }
    }
}

// =============================================================================
// Room
// =============================================================================

/// A floor area priced as one block of the quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Room {
    /// Identifier unique within the quote (assigned by the wizard).
    #[serde(default)]
    pub id: i64,

    /// Room name, e.g. "Цех №1".
    #[serde(default)]
    pub name: String,

    /// Floor area in m².
    pub area: f64,

    /// Material lines; may be empty.
    #[serde(default)]
    pub materials: Vec<MaterialLine>,

    /// Totals computed when the quote was last saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totals: Option<RoomTotals>,
}

impl Room {
    /// Creates a room without material lines.
    pub fn new(id: i64, name: impl Into<String>, area: f64) -> Self {
        Room {
            id,
            name: name.into(),
            area,
            materials: Vec::new(),
            totals: None,
        }
    }

    /// Appends a material line (builder style).
    pub fn with_material(mut self, material: MaterialLine) -> Self {
        self.materials.push(material);
        self
    }
}

// =============================================================================
// Quote Settings
// =============================================================================

/// Per-quote pricing and presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSettings {
    #[serde(default)]
    pub currency: Currency,

    /// Whether VAT is added on top of the materials sum.
    #[serde(default = "default_include_vat")]
    pub include_vat: bool,

    /// VAT rate in percent.
    #[serde(default = "default_vat_rate")]
    pub vat_rate: f64,

    /// Dealer discount in percent, taken from the VAT-inclusive amount.
    #[serde(default)]
    pub dealer_discount: f64,

    /// Free-text production lead time printed on the document.
    #[serde(default)]
    pub production_time: String,

    /// Free-text warranty terms printed on the document.
    #[serde(default)]
    pub warranty: String,
}

fn default_include_vat() -> bool {
    true
}

fn default_vat_rate() -> f64 {
    DEFAULT_VAT_RATE
}

impl Default for QuoteSettings {
    /// Backend defaults: UAH, VAT 20 % included, no discount, empty terms.
    fn default() -> Self {
        QuoteSettings {
            currency: Currency::Uah,
            include_vat: true,
            vat_rate: DEFAULT_VAT_RATE,
            dealer_discount: 0.0,
            production_time: String::new(),
            warranty: String::new(),
        }
    }
}

impl QuoteSettings {
    /// Settings a freshly started quote opens with.
    pub fn wizard_defaults() -> Self {
        QuoteSettings {
            dealer_discount: 20.0,
            production_time: "до 9 календарних днів, після 100% оплати".to_string(),
            warranty: "7 років гарантії на матеріали".to_string(),
            ..QuoteSettings::default()
        }
    }
}

// =============================================================================
// Additional Data
// =============================================================================

/// A name/value row of the technical parameters table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TechParam {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl TechParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        TechParam {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Seller requisites printed in the document header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct CompanyDetails {
    pub name: String,
    pub address: String,
    /// State registry code (ЄДРПОУ).
    pub edrpou: String,
    pub iban: String,
    pub bank: String,
    /// VAT payer certificate number.
    pub pdv: String,
    /// Individual tax number.
    pub ipn: String,
    pub phones: String,
}

impl CompanyDetails {
    /// Requisites of the selling company used by new quotes.
    pub fn seller() -> Self {
        CompanyDetails {
            name: "ТОВ «ВедеВперед»".to_string(),
            address: "03195, м. Київ, пров. Павла Ле, буд. 21".to_string(),
            edrpou: "41842552".to_string(),
            iban: "UA623052990000260000362068860".to_string(),
            bank: "Печерська філія ПАТ КБ \"ПРИВАТБАНК\", м.Київ МФО 300711".to_string(),
            pdv: "1826504500200".to_string(),
            ipn: "418425526506".to_string(),
            phones: "067-402-11-17, 093-512-58-38".to_string(),
        }
    }
}

/// Signature block at the end of the document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct Signature {
    pub position: String,
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// Free-form blocks of the document that do not affect pricing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalData {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub advantages: Vec<String>,

    #[serde(default)]
    pub tech_params: Vec<TechParam>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyDetails>,

    #[serde(default)]
    pub signature: Signature,
}

const STANDARD_DESCRIPTION: &str = "Полімерні матеріали для захисного полімерного покриття PoliBest 911 (без розчинників).

Призначене для:
• Виробничих цехів та приміщень
• Складських комплексів
• Паркінгів та автосервісів
• Торгових площ
• Харчових виробництв
• Фармацевтичних підприємств";

const STANDARD_ADVANTAGES: [&str; 8] = [
    "Безпечне та екологічне: без шкідливих домішок, можна використовувати в житлових приміщеннях",
    "Глибоко проникаюче: 3-7 мм в бетон, що забезпечує надійну адгезію",
    "Стійке до навантажень: витримує вилочні навантажувачі та важку техніку",
    "Паропроникне: немає ефекту відшарування покриття",
    "Легке в догляді: миється звичайними засобами для підлоги",
    "Хімічна стійкість: до масел, бензину, кислот та лугів",
    "Естетичний вигляд: широкий вибір кольорів",
    "Довговічність: термін служби 15-25 років",
];

const STANDARD_TECH_PARAMS: [(&str, &str); 7] = [
    ("Тип", "Двокомпонентні"),
    ("Колір", "За погодженням із замовником"),
    ("Термін служби в змішаному стані", "40 хвилин (+20°C)"),
    ("Температура нанесення", "+10...+30°C"),
    ("Товщина шару", "0.3-0.5 мм"),
    ("Повна полімеризація", "7 діб"),
    ("Термін служби", "15-25 років"),
];

impl AdditionalData {
    /// The standard product texts every new quote starts from.
    pub fn standard() -> Self {
        AdditionalData {
            description: STANDARD_DESCRIPTION.to_string(),
            advantages: STANDARD_ADVANTAGES.iter().map(|s| s.to_string()).collect(),
            tech_params: STANDARD_TECH_PARAMS
                .iter()
                .map(|(name, value)| TechParam::new(*name, *value))
                .collect(),
            company: Some(CompanyDetails::seller()),
            signature: Signature {
                position: "Комерційний директор".to_string(),
                name: String::new(),
                phone: "067-402-11-17".to_string(),
                email: String::new(),
            },
        }
    }

    /// Fills empty blocks of a loaded quote with the standard texts.
    pub fn or_standard(self) -> Self {
        let standard = AdditionalData::standard();
        AdditionalData {
            description: if self.description.is_empty() {
                standard.description
            } else {
                self.description
            },
            advantages: if self.advantages.is_empty() {
                standard.advantages
            } else {
                self.advantages
            },
            tech_params: if self.tech_params.is_empty() {
                standard.tech_params
            } else {
                self.tech_params
            },
            company: self.company.or(standard.company),
            signature: self.signature,
        }
    }
}

// =============================================================================
// Quote Status
// =============================================================================

/// Sales pipeline status of a quote.
///
/// ## Pipeline
/// ```text
/// Draft ──► Sent ──► Paid
///   │         │
///   └────┬────┘
///        ▼
///    Cancelled
/// ```
/// Any status may be set from any other one; every change is recorded in
/// `Quote::status_history`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Cancelled,
}

impl QuoteStatus {
    /// All statuses in pipeline order.
    pub const ALL: [QuoteStatus; 4] = [
        QuoteStatus::Draft,
        QuoteStatus::Sent,
        QuoteStatus::Paid,
        QuoteStatus::Cancelled,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Paid => "paid",
            QuoteStatus::Cancelled => "cancelled",
        }
    }

    /// Ukrainian label shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "Чернетка",
            QuoteStatus::Sent => "Відправлено",
            QuoteStatus::Paid => "Оплачено",
            QuoteStatus::Cancelled => "Скасовано",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(QuoteStatus::Draft),
            "sent" => Ok(QuoteStatus::Sent),
            "paid" => Ok(QuoteStatus::Paid),
            "cancelled" | "canceled" => Ok(QuoteStatus::Cancelled),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }
}

/// One entry of a quote's status history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusChange {
    pub from_status: QuoteStatus,
    pub to_status: QuoteStatus,
    #[ts(as = "String")]
    pub changed_at: DateTime<Utc>,
}

// =============================================================================
// Quote
// =============================================================================

/// A saved commercial proposal as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,

    pub title: String,

    pub client: String,

    #[serde(default)]
    pub location: String,

    /// `None` when the stored date is blank or not `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "lenient_date")]
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub settings: QuoteSettings,

    #[serde(default)]
    pub rooms: Vec<Room>,

    #[serde(default)]
    pub additional_data: AdditionalData,

    /// Grand total snapshot written at save time.
    #[serde(default)]
    pub grand_total: f64,

    #[serde(default)]
    pub status: QuoteStatus,

    #[serde(rename = "status_history", default)]
    pub status_history: Vec<StatusChange>,

    #[serde(rename = "created_at")]
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Quote {
    /// Date printed on the document, the creation day when none is stored.
    pub fn document_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| self.created_at.date_naive())
    }

    /// Grand total recomputed from the current room data.
    pub fn live_grand_total(&self) -> f64 {
        quote_grand_total(&self.rooms, &self.settings)
    }

    /// Difference between the live grand total and the stored snapshot.
    ///
    /// Zero (up to float noise) for a quote saved with current data; non-zero
    /// after room data was edited outside the wizard.
    pub fn snapshot_drift(&self) -> f64 {
        self.live_grand_total() - self.grand_total
    }

    /// True when the stored snapshot differs from the live total by more
    /// than `tolerance`, or when any room is missing its snapshot.
    pub fn has_stale_snapshot(&self, tolerance: f64) -> bool {
        self.snapshot_drift().abs() > tolerance || self.rooms.iter().any(|r| r.totals.is_none())
    }

    /// Refreshes every room snapshot and the grand total from live data.
    pub fn recalculate(&mut self) {
        for room in &mut self.rooms {
            room.totals = Some(room_total(room, &self.settings));
        }
        self.grand_total = self.live_grand_total();
    }

    /// Sum of the areas of all rooms.
    pub fn total_area(&self) -> f64 {
        self.rooms.iter().map(|r| r.area).sum()
    }

    /// Body for the backend's update endpoint.
    pub fn to_payload(&self) -> QuotePayload {
        QuotePayload {
            title: self.title.clone(),
            client: self.client.clone(),
            location: self.location.clone(),
            date: self.document_date(),
            settings: self.settings.clone(),
            rooms: self.rooms.clone(),
            additional_data: self.additional_data.clone(),
            grand_total: self.grand_total,
            status: self.status,
        }
    }
}

/// Parses a stored quote date. Blank or malformed text becomes `None`.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().map(str::trim).and_then(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .or_else(|| s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
    }))
}

/// Create/update body for a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuotePayload {
    pub title: String,
    pub client: String,
    pub location: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub settings: QuoteSettings,
    pub rooms: Vec<Room>,
    pub additional_data: AdditionalData,
    pub grand_total: f64,
    #[serde(default)]
    pub status: QuoteStatus,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_quote() -> Quote {
        let room = Room::new(1, "Цех №1", 100.0)
            .with_material(MaterialLine::new(1, "Ґрунтівка", 0.15, 864.0))
            .with_material(MaterialLine::new(2, "Емаль", 0.30, 1512.0));
        Quote {
            id: "kp-1".to_string(),
            title: "Склад".to_string(),
            client: "ТОВ Клієнт".to_string(),
            location: "Київ".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1),
            settings: QuoteSettings::default(),
            rooms: vec![room],
            additional_data: AdditionalData::default(),
            grand_total: 0.0,
            status: QuoteStatus::Draft,
            status_history: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_settings_defaults() {
        let backend = QuoteSettings::default();
        assert_eq!(backend.currency, Currency::Uah);
        assert!(backend.include_vat);
        assert_eq!(backend.vat_rate, 20.0);
        assert_eq!(backend.dealer_discount, 0.0);

        let wizard = QuoteSettings::wizard_defaults();
        assert_eq!(wizard.dealer_discount, 20.0);
        assert_eq!(wizard.warranty, "7 років гарантії на матеріали");
    }

    #[test]
    fn test_settings_wire_names() {
        let json = serde_json::to_value(QuoteSettings::default()).unwrap();
        assert_eq!(json["includeVat"], true);
        assert_eq!(json["vatRate"], 20.0);
        assert_eq!(json["currency"], "UAH");
        assert!(json.get("dealerDiscount").is_some());
    }

    #[test]
    fn test_quote_deserializes_backend_record() {
        let json = r#"{
            "id": "abc",
            "title": "Паркінг",
            "client": "ТОВ Ромашка",
            "date": "2025-01-15",
            "settings": {"currency": "EUR", "includeVat": false, "vatRate": 20,
                         "dealerDiscount": 10, "productionTime": "", "warranty": ""},
            "rooms": [{"id": 1, "name": "Зал", "area": 50, "layers": 3,
                       "materials": [{"id": 2, "name": "Емаль", "consumption": 0.3, "price": 1000}],
                       "totals": {"materialsSum": 15000, "withVat": 15000, "discount": 1500,
                                  "total": 13500, "totalLayers": 3}}],
            "additionalData": {"description": "", "advantages": [], "techParams": [],
                               "signature": {"position": "", "name": "", "phone": "", "email": ""}},
            "grandTotal": 13500,
            "status": "sent",
            "status_history": [],
            "doc_type": "kp",
            "created_at": "2025-01-15T10:00:00.000000+00:00"
        }"#;

        let quote: Quote = serde_json::from_str(json).unwrap();
        assert_eq!(quote.settings.currency, Currency::Eur);
        assert_eq!(quote.status, QuoteStatus::Sent);
        assert_eq!(quote.rooms[0].materials.len(), 1);
        assert_eq!(quote.rooms[0].totals.as_ref().unwrap().total, 13_500.0);
        assert!(!quote.has_stale_snapshot(0.01));
    }

    #[test]
    fn test_missing_status_defaults_to_draft() {
        let json = r#"{"id":"x","title":"t","client":"c","date":"2025-01-01",
                       "created_at":"2025-01-01T00:00:00Z"}"#;
        let quote: Quote = serde_json::from_str(json).unwrap();
        assert_eq!(quote.status, QuoteStatus::Draft);
        assert!(quote.rooms.is_empty());
        assert_eq!(quote.settings, QuoteSettings::default());
    }

    #[test]
    fn test_blank_or_malformed_date_is_none() {
        let blank = r#"{"id":"x","title":"t","client":"c","date":"",
                        "created_at":"2025-02-03T00:00:00Z"}"#;
        let quote: Quote = serde_json::from_str(blank).unwrap();
        assert_eq!(quote.date, None);
        assert_eq!(quote.document_date(), NaiveDate::from_ymd_opt(2025, 2, 3).unwrap());
        assert_eq!(quote.to_payload().date, NaiveDate::from_ymd_opt(2025, 2, 3).unwrap());

        let garbage = r#"{"id":"x","title":"t","client":"c","date":"15.01.2025",
                          "created_at":"2025-02-03T00:00:00Z"}"#;
        assert_eq!(serde_json::from_str::<Quote>(garbage).unwrap().date, None);

        let missing = r#"{"id":"x","title":"t","client":"c","created_at":"2025-02-03T00:00:00Z"}"#;
        assert_eq!(serde_json::from_str::<Quote>(missing).unwrap().date, None);

        let timestamp = r#"{"id":"x","title":"t","client":"c","date":"2025-01-15T00:00:00",
                            "created_at":"2025-02-03T00:00:00Z"}"#;
        assert_eq!(
            serde_json::from_str::<Quote>(timestamp).unwrap().date,
            NaiveDate::from_ymd_opt(2025, 1, 15)
        );
    }

    #[test]
    fn test_list_survives_blank_date() {
        let json = r#"[
            {"id":"a","title":"t","client":"c","date":"2025-01-01","created_at":"2025-01-01T00:00:00Z"},
            {"id":"b","title":"t","client":"c","date":"","created_at":"2025-01-01T00:00:00Z"}
        ]"#;
        let quotes: Vec<Quote> = serde_json::from_str(json).unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[1].date, None);
    }

    #[test]
    fn test_recalculate_refreshes_snapshots() {
        let mut quote = sample_quote();
        assert!(quote.has_stale_snapshot(0.01));

        quote.recalculate();

        let totals = quote.rooms[0].totals.as_ref().unwrap();
        // (100 × 0.15 × 864 + 100 × 0.30 × 1512) × 1.2
        assert!((totals.with_vat - 69_984.0).abs() < 1e-6);
        assert!((quote.grand_total - 69_984.0).abs() < 1e-6);
        assert!(!quote.has_stale_snapshot(0.01));
    }

    #[test]
    fn test_snapshot_drift_after_edit() {
        let mut quote = sample_quote();
        quote.recalculate();
        quote.rooms[0].area = 200.0;
        assert!(quote.snapshot_drift() > 0.0);
        assert!(quote.has_stale_snapshot(0.01));
    }

    #[test]
    fn test_status_parse_and_labels() {
        assert_eq!("paid".parse::<QuoteStatus>().unwrap(), QuoteStatus::Paid);
        assert_eq!(QuoteStatus::Sent.label(), "Відправлено");
        assert!(matches!(
            "archived".parse::<QuoteStatus>(),
            Err(CoreError::UnknownStatus(_))
        ));
    }

    #[test]
    fn test_or_standard_keeps_user_text() {
        let data = AdditionalData {
            description: "Свій опис".to_string(),
            ..AdditionalData::default()
        }
        .or_standard();
        assert_eq!(data.description, "Свій опис");
        assert_eq!(data.advantages.len(), 8);
        assert_eq!(data.tech_params.len(), 7);
        assert!(data.company.is_some());
    }
}
