//! # Quote Preview
//!
//! The printable commercial proposal built from a saved quote.
//!
//! ## Document Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ТОВ «ВедеВперед»                             067-402-11-17, ...       │
//! │  ЄДРПОУ · ІПН · ПДВ · IBAN · bank                                      │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                     КОМЕРЦІЙНА ПРОПОЗИЦІЯ                               │
//! │      на бетонній підлозі площею 700 м² • Київ                          │
//! │  Клієнт | Проект | Дата КП                                             │
//! │  description                                                            │
//! │  ┌───────────────────────────────────────────────────────────────────┐  │
//! │  │ Цех №1 — 500 м²                                         5 шарів   │  │
//! │  │ № │ Матеріал │ Шари │ кг/м² │ кг │ Ціна/кг │ Сума з ПДВ           │  │
//! │  │ Вартість з ПДВ · Знижка 20% · РАЗОМ                               │  │
//! │  └───────────────────────────────────────────────────────────────────┘  │
//! │  ... one section per selected room ...                                  │
//! │  Загальна вартість з ПДВ                              279 936 грн      │
//! │  Переваги · Технічні параметри · signature                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every figure comes from [`crate::pricing`] applied to the room data, and
//! the grand total is the sum of the section totals shown above it.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::money::Currency;
use crate::pricing::{
    apply_vat, grand_total, material_total, room_total, total_area, RoomSelection,
};
use crate::quote::{CompanyDetails, Quote, Room, Signature, TechParam};
use crate::PRODUCT_LINE;

const FALLBACK_COMPANY_NAME: &str = "ТОВ «ВедеВперед»";

const GENITIVE_MONTHS: [&str; 12] = [
    "січня",
    "лютого",
    "березня",
    "квітня",
    "травня",
    "червня",
    "липня",
    "серпня",
    "вересня",
    "жовтня",
    "листопада",
    "грудня",
];

// =============================================================================
// Layer Labels
// =============================================================================

/// Ukrainian plural ending of "шар" for `n` coats.
pub fn layer_suffix(n: i64) -> &'static str {
    match n {
        1 => "",
        2..=4 => "и",
        _ => "ів",
    }
}

/// "1 шар", "3 шари", "5 шарів".
pub fn layer_label(n: i64) -> String {
    format!("{} шар{}", n, layer_suffix(n))
}

/// Date as printed on the document, e.g. "01 червня 2025 р.".
pub fn format_document_date(date: NaiveDate) -> String {
    format!(
        "{:02} {} {} р.",
        date.day(),
        GENITIVE_MONTHS[date.month0() as usize],
        date.year()
    )
}

// =============================================================================
// Document Model
// =============================================================================

/// One row of a room's materials table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentLine {
    /// 1-based row number.
    pub number: usize,
    pub name: String,
    pub layers: i64,
    pub consumption: f64,
    pub total_kg: f64,
    pub price: f64,
    pub sum_with_vat: f64,
}

/// One room of the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomSection {
    pub name: String,
    pub area: f64,
    pub total_layers: i64,
    pub lines: Vec<DocumentLine>,
    pub with_vat: f64,
    /// Dealer discount percent and amount; absent when no discount applies.
    pub discount: Option<(f64, f64)>,
    pub total: f64,
    pub production_time: Option<String>,
    pub warranty: Option<String>,
}

impl RoomSection {
    /// Section heading, e.g. "Цех №1 — 500 м²".
    pub fn heading(&self) -> String {
        format!("{} — {} м²", self.name, crate::money::format_number(self.area))
    }

    pub fn layer_label(&self) -> String {
        layer_label(self.total_layers)
    }
}

/// Everything the printed proposal shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewDocument {
    pub company: CompanyDetails,
    pub title: String,
    pub client: String,
    pub location: String,
    pub date: String,
    pub total_area: f64,
    pub description: Option<String>,
    pub currency: Currency,
    pub rooms: Vec<RoomSection>,
    /// Sum of the section totals; absent when no room is selected.
    pub grand_total: Option<f64>,
    pub advantages: Vec<String>,
    pub tech_params: Vec<TechParam>,
    pub signature: Signature,
    pub year: i32,
}

impl PreviewDocument {
    /// "на бетонній підлозі площею 700 м² • Київ".
    pub fn area_line(&self) -> String {
        let mut line = format!(
            "на бетонній підлозі площею {} м²",
            crate::money::format_number(self.total_area)
        );
        if !self.location.is_empty() {
            line.push_str(" • ");
            line.push_str(&self.location);
        }
        line
    }

    pub fn subtitle(&self) -> String {
        format!("Полімерні матеріали для захисного покриття {PRODUCT_LINE}")
    }

    pub fn footer(&self) -> [String; 2] {
        [
            format!("© {} {}", self.year, self.company.name),
            "Ціни дійсні на момент формування пропозиції".to_string(),
        ]
    }
}

// =============================================================================
// Preview
// =============================================================================

/// A saved quote with a room selection.
///
/// ## Example
/// ```rust,ignore
/// let mut preview = QuotePreview::new(quote);
/// preview.toggle_room(1);            // leave the second room out
/// let document = preview.document();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QuotePreview {
    quote: Quote,
    selection: RoomSelection,
}

impl QuotePreview {
    /// Opens a quote with every room selected.
    pub fn new(quote: Quote) -> Self {
        let selection = RoomSelection::all(quote.rooms.len());
        QuotePreview { quote, selection }
    }

    pub fn quote(&self) -> &Quote {
        &self.quote
    }

    pub fn selection(&self) -> &RoomSelection {
        &self.selection
    }

    /// Includes or excludes a room; returns whether it is now included.
    pub fn toggle_room(&mut self, index: usize) -> bool {
        self.selection.toggle(index)
    }

    pub fn selected_rooms(&self) -> Vec<&Room> {
        self.selection.select(&self.quote.rooms).collect()
    }

    /// Grand total over the selected rooms, from live room data.
    pub fn grand_total(&self) -> f64 {
        grand_total(&self.quote.rooms, &self.quote.settings, &self.selection)
    }

    pub fn total_area(&self) -> f64 {
        total_area(&self.quote.rooms, &self.selection)
    }

    /// Builds the document for the current selection.
    pub fn document(&self) -> PreviewDocument {
        let quote = &self.quote;
        let settings = &quote.settings;

        let mut company = quote.additional_data.company.clone().unwrap_or_default();
        if company.name.is_empty() {
            company.name = FALLBACK_COMPANY_NAME.to_string();
        }

        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

        let rooms: Vec<RoomSection> = self
            .selected_rooms()
            .into_iter()
            .map(|room| {
                let totals = room_total(room, settings);
                let lines = room
                    .materials
                    .iter()
                    .enumerate()
                    .map(|(i, material)| {
                        let line = material_total(room, material);
                        DocumentLine {
                            number: i + 1,
                            name: material.name.clone(),
                            layers: line.layers,
                            consumption: material.consumption,
                            total_kg: line.total_kg,
                            price: material.price,
                            sum_with_vat: apply_vat(line.sum, settings),
                        }
                    })
                    .collect();
                RoomSection {
                    name: room.name.clone(),
                    area: room.area,
                    total_layers: totals.total_layers,
                    lines,
                    with_vat: totals.with_vat,
                    discount: (settings.dealer_discount > 0.0)
                        .then_some((settings.dealer_discount, totals.discount)),
                    total: totals.total,
                    production_time: non_empty(&settings.production_time),
                    warranty: non_empty(&settings.warranty),
                }
            })
            .collect();

        let grand_total = (!rooms.is_empty()).then(|| rooms.iter().map(|r| r.total).sum::<f64>());

        PreviewDocument {
            company,
            title: quote.title.clone(),
            client: quote.client.clone(),
            location: quote.location.clone(),
            date: format_document_date(quote.document_date()),
            total_area: self.total_area(),
            description: non_empty(&quote.additional_data.description),
            currency: settings.currency,
            rooms,
            grand_total,
            advantages: quote.additional_data.advantages.clone(),
            tech_params: quote.additional_data.tech_params.clone(),
            signature: quote.additional_data.signature.clone(),
            year: quote.document_date().year(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{AdditionalData, MaterialLine, QuoteSettings, QuoteStatus};
    use chrono::Utc;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn quote() -> Quote {
        Quote {
            id: "kp-1".to_string(),
            title: "Логістичний центр".to_string(),
            client: "ТОВ Клієнт".to_string(),
            location: "Київ".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1),
            settings: QuoteSettings::wizard_defaults(),
            rooms: vec![
                Room::new(1, "Цех №1", 500.0)
                    .with_material(MaterialLine::new(1, "Ґрунтівка", 0.15, 864.0))
                    .with_material(MaterialLine::new(2, "Емаль", 0.30, 1512.0)),
                Room::new(2, "Склад", 200.0)
                    .with_material(MaterialLine::new(3, "Емаль", 0.30, 1512.0)),
            ],
            additional_data: AdditionalData::standard(),
            // stale snapshot: the preview must not use it
            grand_total: 1.0,
            status: QuoteStatus::Sent,
            status_history: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_layer_labels() {
        assert_eq!(layer_label(1), "1 шар");
        assert_eq!(layer_label(3), "3 шари");
        assert_eq!(layer_label(5), "5 шарів");
        assert_eq!(layer_label(0), "0 шарів");
        assert_eq!(layer_suffix(4), "и");
    }

    #[test]
    fn test_document_date() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(format_document_date(date), "01 червня 2025 р.");
    }

    #[test]
    fn test_selection_drives_totals() {
        let mut preview = QuotePreview::new(quote());
        assert_eq!(preview.selected_rooms().len(), 2);
        assert!(approx(preview.total_area(), 700.0));
        let all = preview.grand_total();

        assert!(!preview.toggle_room(1));
        assert!(approx(preview.total_area(), 500.0));
        assert!(approx(preview.grand_total(), 279_936.0));
        assert!(preview.grand_total() < all);
    }

    #[test]
    fn test_document_matches_engine() {
        let preview = QuotePreview::new(quote());
        let document = preview.document();

        assert_eq!(document.rooms.len(), 2);
        let first = &document.rooms[0];
        assert_eq!(first.heading(), "Цех №1 — 500 м²");
        assert_eq!(first.total_layers, 5);
        assert_eq!(first.layer_label(), "5 шарів");
        assert_eq!(first.lines[0].number, 1);
        assert_eq!(first.lines[0].layers, 2);
        assert!(approx(first.lines[0].total_kg, 75.0));
        // 75 kg × 864 × 1.2
        assert!(approx(first.lines[0].sum_with_vat, 77_760.0));
        let (percent, amount) = first.discount.unwrap();
        assert_eq!(percent, 20.0);
        assert!(approx(amount, first.with_vat * 0.2));
        assert!(approx(first.total, 279_936.0));

        let section_sum: f64 = document.rooms.iter().map(|r| r.total).sum();
        assert!(approx(document.grand_total.unwrap(), section_sum));
        assert!(approx(document.grand_total.unwrap(), preview.grand_total()));
        assert_eq!(document.area_line(), "на бетонній підлозі площею 700 м² • Київ");
        assert_eq!(document.company.name, "ТОВ «ВедеВперед»");
        assert_eq!(document.footer()[0], "© 2025 ТОВ «ВедеВперед»");
    }

    #[test]
    fn test_no_discount_section() {
        let mut q = quote();
        q.settings.dealer_discount = 0.0;
        q.additional_data.company = None;
        let document = QuotePreview::new(q).document();
        assert!(document.rooms.iter().all(|r| r.discount.is_none()));
        assert_eq!(document.company.name, "ТОВ «ВедеВперед»");
    }

    #[test]
    fn test_empty_selection_has_no_grand_total() {
        let mut preview = QuotePreview::new(quote());
        preview.toggle_room(0);
        preview.toggle_room(1);
        let document = preview.document();
        assert!(document.rooms.is_empty());
        assert!(document.grand_total.is_none());
        assert_eq!(preview.grand_total(), 0.0);
    }
}
