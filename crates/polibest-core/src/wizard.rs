//! # Quote Wizard
//!
//! Editable state of a quote while it is being built, before it is sent to
//! the backend.
//!
//! ## Steps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Quote Wizard Steps                               │
//! │                                                                         │
//! │   1 Дані КП  ──►  2 Налаштування  ──►  3 Приміщення  ──►  4 Додатково   │
//! │   title            currency             rooms               description │
//! │   client           VAT                  material lines      advantages  │
//! │   location         dealer discount                          tech params │
//! │   date             terms                                    signature   │
//! │                                                                         │
//! │   submit() ── title or client missing ──► back to step 1               │
//! │       │                                                                 │
//! │       └── ok ──► QuotePayload (rooms carry fresh totals snapshots)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rooms and material lines are addressed by ids that are unique within the
//! draft. Ids are handed out by the draft itself, never by the caller.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use ts_rs::TS;

use crate::calculator::CalculatorPrices;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::pricing::{quote_grand_total, room_total, RoomTotals};
use crate::quote::{
    AdditionalData, MaterialLine, Quote, QuotePayload, QuoteSettings, QuoteStatus, Room, TechParam,
};
use crate::validation::{validate_client, validate_title};

/// Largest room or line id kept when loading a saved quote (2^53 - 1, the
/// largest integer a browser number holds exactly).
pub const MAX_LINE_ID: i64 = (1 << 53) - 1;

/// Name of the primer line added to new rooms.
pub const PRIMER_LINE_NAME: &str = "PoliBest 911 ґрунтівка (захисна епоксидна глибокопроникна)";

/// Name of the enamel line added to new rooms.
pub const ENAMEL_LINE_NAME: &str = "PoliBest 911 (захисна епоксидна емаль, колір за погодженням)";

/// Primer price used when no calculator price is known.
pub const FALLBACK_PRIMER_PRICE: f64 = 864.0;

/// Enamel price used when no calculator price is known.
pub const FALLBACK_ENAMEL_PRICE: f64 = 1512.0;

/// Material names offered when a line is edited.
pub const SUGGESTED_MATERIALS: [&str; 10] = [
    ENAMEL_LINE_NAME,
    PRIMER_LINE_NAME,
    "PoliBest 500 (зміцнюючий склад для бетону глибокопроникний)",
    "Флокове покриття PoliBest",
    "Лак глянцевий PoliBest",
    "Лак матовий PoliBest",
    "Кварцовий наповнювач",
    "Декоративні чіпси (флоки)",
    "Антистатичне покриття",
    "Іскробезпечне покриття",
];

// =============================================================================
// Steps
// =============================================================================

/// Page of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Details,
    Settings,
    Rooms,
    Extras,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Details,
        WizardStep::Settings,
        WizardStep::Rooms,
        WizardStep::Extras,
    ];

    /// 1-based position shown in the progress bar.
    pub fn number(&self) -> usize {
        match self {
            WizardStep::Details => 1,
            WizardStep::Settings => 2,
            WizardStep::Rooms => 3,
            WizardStep::Extras => 4,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Details => "Дані КП",
            WizardStep::Settings => "Налаштування",
            WizardStep::Rooms => "Приміщення",
            WizardStep::Extras => "Додатково",
        }
    }

    /// The following step; the last step stays where it is.
    pub fn next(self) -> Self {
        match self {
            WizardStep::Details => WizardStep::Settings,
            WizardStep::Settings => WizardStep::Rooms,
            WizardStep::Rooms | WizardStep::Extras => WizardStep::Extras,
        }
    }

    /// The preceding step; the first step stays where it is.
    pub fn prev(self) -> Self {
        match self {
            WizardStep::Details | WizardStep::Settings => WizardStep::Details,
            WizardStep::Rooms => WizardStep::Settings,
            WizardStep::Extras => WizardStep::Rooms,
        }
    }
}

// =============================================================================
// Material Field Edits
// =============================================================================

/// A single field change of a material line.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialField {
    Name(String),
    Consumption(f64),
    Price(f64),
}

/// A single field change of a technical parameter row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TechParamField {
    Name(String),
    Value(String),
}

// =============================================================================
// Draft
// =============================================================================

/// A quote being created or edited.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use polibest_core::wizard::QuoteDraft;
///
/// let mut draft = QuoteDraft::new(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
/// draft.title = "Склад".to_string();
/// draft.client = "ТОВ Клієнт".to_string();
///
/// let payload = draft.submit().unwrap();
/// assert_eq!(payload.rooms.len(), 1);
/// assert!(payload.rooms[0].totals.is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteDraft {
    /// Backend id when an existing quote is being edited.
    pub editing_id: Option<String>,
    pub step: WizardStep,
    pub title: String,
    pub client: String,
    pub location: String,
    pub date: NaiveDate,
    pub settings: QuoteSettings,
    pub additional_data: AdditionalData,
    /// Status carried over from an edited quote.
    pub status: QuoteStatus,
    rooms: Vec<Room>,
    next_id: i64,
}

impl QuoteDraft {
    /// A new draft with one 500 m² room priced with primer and enamel at
    /// the fallback prices.
    pub fn new(today: NaiveDate) -> Self {
        let mut draft = QuoteDraft {
            editing_id: None,
            step: WizardStep::Details,
            title: String::new(),
            client: String::new(),
            location: String::new(),
            date: today,
            settings: QuoteSettings::wizard_defaults(),
            additional_data: AdditionalData::standard(),
            status: QuoteStatus::Draft,
            rooms: Vec::new(),
            next_id: 1,
        };
        let room = draft.standard_room("Цех №1", 500.0, FALLBACK_PRIMER_PRICE, FALLBACK_ENAMEL_PRICE);
        draft.rooms.push(room);
        draft
    }

    /// Loads a saved quote for editing.
    ///
    /// Rooms and lines with a missing (zero) or repeated id get a fresh one.
    /// Blank document texts are replaced with the standard texts. A quote
    /// without rooms gets one empty room so the draft is never roomless.
    /// A quote with no usable date is redated `today`.
    pub fn from_quote(quote: &Quote, today: NaiveDate) -> Self {
        let mut draft = QuoteDraft {
            editing_id: Some(quote.id.clone()),
            step: WizardStep::Details,
            title: quote.title.clone(),
            client: quote.client.clone(),
            location: quote.location.clone(),
            date: quote.date.unwrap_or(today),
            settings: quote.settings.clone(),
            additional_data: quote.additional_data.clone().or_standard(),
            status: quote.status,
            rooms: Vec::with_capacity(quote.rooms.len()),
            next_id: 1,
        };

        let max_id = quote
            .rooms
            .iter()
            .flat_map(|r| std::iter::once(r.id).chain(r.materials.iter().map(|m| m.id)))
            .max()
            .unwrap_or(0);
        // Ids past MAX_LINE_ID leave no room to allocate; renumber from 1.
        let reassign_all = max_id > MAX_LINE_ID;
        draft.next_id = if reassign_all { 1 } else { max_id.max(0) + 1 };

        let mut room_ids = HashSet::new();
        for room in &quote.rooms {
            let mut room = room.clone();
            room.totals = None;
            if reassign_all || room.id <= 0 || !room_ids.insert(room.id) {
                room.id = draft.allocate_id();
                room_ids.insert(room.id);
            }
            let mut material_ids = HashSet::new();
            for material in &mut room.materials {
                if reassign_all || material.id <= 0 || !material_ids.insert(material.id) {
                    material.id = draft.allocate_id();
                    material_ids.insert(material.id);
                }
            }
            draft.rooms.push(room);
        }

        if draft.rooms.is_empty() {
            let id = draft.allocate_id();
            draft.rooms.push(Room::new(id, "Цех №1", 0.0));
        }
        draft
    }

    /// True when the draft edits a saved quote.
    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    fn standard_room(&mut self, name: &str, area: f64, primer: f64, enamel: f64) -> Room {
        let room_id = self.allocate_id();
        let primer_id = self.allocate_id();
        let enamel_id = self.allocate_id();
        Room::new(room_id, name, area)
            .with_material(MaterialLine::new(primer_id, PRIMER_LINE_NAME, 0.15, primer))
            .with_material(MaterialLine::new(enamel_id, ENAMEL_LINE_NAME, 0.30, enamel))
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    pub fn next_step(&mut self) {
        self.step = self.step.next();
    }

    pub fn prev_step(&mut self) {
        self.step = self.step.prev();
    }

    pub fn go_to(&mut self, step: WizardStep) {
        self.step = step;
    }

    // -------------------------------------------------------------------------
    // Rooms
    // -------------------------------------------------------------------------

    /// Rooms in quote order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, room_id: i64) -> CoreResult<&Room> {
        self.rooms
            .iter()
            .find(|r| r.id == room_id)
            .ok_or(CoreError::RoomNotFound(room_id))
    }

    fn room_mut(&mut self, room_id: i64) -> CoreResult<&mut Room> {
        self.rooms
            .iter_mut()
            .find(|r| r.id == room_id)
            .ok_or(CoreError::RoomNotFound(room_id))
    }

    /// Appends a 200 m² room with primer and enamel lines and returns its id.
    ///
    /// Line prices come from the calculator prices; a missing or zero price
    /// falls back to 864 (primer) and 1512 (enamel).
    pub fn add_room(&mut self, prices: Option<&CalculatorPrices>) -> i64 {
        let pick = |price: Option<f64>, fallback: f64| match price {
            Some(p) if p != 0.0 && p.is_finite() => p,
            _ => fallback,
        };
        let primer = pick(prices.map(|p| p.primer), FALLBACK_PRIMER_PRICE);
        let enamel = pick(prices.map(|p| p.enamel), FALLBACK_ENAMEL_PRICE);

        let name = format!("Приміщення {}", self.rooms.len() + 1);
        let room = self.standard_room(&name, 200.0, primer, enamel);
        let id = room.id;
        self.rooms.push(room);
        id
    }

    pub fn rename_room(&mut self, room_id: i64, name: impl Into<String>) -> CoreResult<()> {
        self.room_mut(room_id)?.name = name.into();
        Ok(())
    }

    pub fn set_room_area(&mut self, room_id: i64, area: f64) -> CoreResult<()> {
        self.room_mut(room_id)?.area = area;
        Ok(())
    }

    /// Removes a room. The only remaining room cannot be removed.
    pub fn remove_room(&mut self, room_id: i64) -> CoreResult<Room> {
        let index = self
            .rooms
            .iter()
            .position(|r| r.id == room_id)
            .ok_or(CoreError::RoomNotFound(room_id))?;
        if self.rooms.len() <= 1 {
            return Err(CoreError::LastRoom);
        }
        Ok(self.rooms.remove(index))
    }

    // -------------------------------------------------------------------------
    // Material Lines
    // -------------------------------------------------------------------------

    /// Appends an empty line (0.2 kg/m², price 0) and returns its id.
    pub fn add_material(&mut self, room_id: i64) -> CoreResult<i64> {
        self.room(room_id)?;
        let id = self.allocate_id();
        self.room_mut(room_id)?
            .materials
            .push(MaterialLine::new(id, "", 0.2, 0.0));
        Ok(id)
    }

    pub fn update_material(
        &mut self,
        room_id: i64,
        material_id: i64,
        field: MaterialField,
    ) -> CoreResult<()> {
        let material = self
            .room_mut(room_id)?
            .materials
            .iter_mut()
            .find(|m| m.id == material_id)
            .ok_or(CoreError::MaterialNotFound {
                room_id,
                material_id,
            })?;
        match field {
            MaterialField::Name(name) => material.name = name,
            MaterialField::Consumption(consumption) => material.consumption = consumption,
            MaterialField::Price(price) => material.price = price,
        }
        Ok(())
    }

    /// Removes a material line. A room may be left without lines.
    pub fn remove_material(&mut self, room_id: i64, material_id: i64) -> CoreResult<MaterialLine> {
        let room = self.room_mut(room_id)?;
        let index = room
            .materials
            .iter()
            .position(|m| m.id == material_id)
            .ok_or(CoreError::MaterialNotFound {
                room_id,
                material_id,
            })?;
        Ok(room.materials.remove(index))
    }

    // -------------------------------------------------------------------------
    // Extras
    // -------------------------------------------------------------------------

    /// Appends an empty advantage and returns its index.
    pub fn add_advantage(&mut self) -> usize {
        self.additional_data.advantages.push(String::new());
        self.additional_data.advantages.len() - 1
    }

    pub fn update_advantage(&mut self, index: usize, text: impl Into<String>) -> CoreResult<()> {
        let slot = self
            .additional_data
            .advantages
            .get_mut(index)
            .ok_or(CoreError::IndexOutOfRange {
                list: "advantages",
                index,
            })?;
        *slot = text.into();
        Ok(())
    }

    pub fn remove_advantage(&mut self, index: usize) -> CoreResult<String> {
        if index >= self.additional_data.advantages.len() {
            return Err(CoreError::IndexOutOfRange {
                list: "advantages",
                index,
            });
        }
        Ok(self.additional_data.advantages.remove(index))
    }

    /// Appends an empty technical parameter and returns its index.
    pub fn add_tech_param(&mut self) -> usize {
        self.additional_data.tech_params.push(TechParam::default());
        self.additional_data.tech_params.len() - 1
    }

    pub fn update_tech_param(&mut self, index: usize, field: TechParamField) -> CoreResult<()> {
        let param = self
            .additional_data
            .tech_params
            .get_mut(index)
            .ok_or(CoreError::IndexOutOfRange {
                list: "tech_params",
                index,
            })?;
        match field {
            TechParamField::Name(name) => param.name = name,
            TechParamField::Value(value) => param.value = value,
        }
        Ok(())
    }

    pub fn remove_tech_param(&mut self, index: usize) -> CoreResult<TechParam> {
        if index >= self.additional_data.tech_params.len() {
            return Err(CoreError::IndexOutOfRange {
                list: "tech_params",
                index,
            });
        }
        Ok(self.additional_data.tech_params.remove(index))
    }

    // -------------------------------------------------------------------------
    // Totals
    // -------------------------------------------------------------------------

    /// Live totals of one room.
    pub fn room_totals(&self, room_id: i64) -> CoreResult<RoomTotals> {
        Ok(room_total(self.room(room_id)?, &self.settings))
    }

    /// Live grand total over every room.
    pub fn grand_total(&self) -> f64 {
        quote_grand_total(&self.rooms, &self.settings)
    }

    // -------------------------------------------------------------------------
    // Submit
    // -------------------------------------------------------------------------

    /// Checks the draft and builds the body sent to the backend.
    ///
    /// ## When This Fails
    /// A blank title or client name. The wizard is moved back to
    /// [`WizardStep::Details`] so the user sees the missing field.
    pub fn submit(&mut self) -> CoreResult<QuotePayload> {
        if let Err(e) = self.check_details() {
            self.step = WizardStep::Details;
            return Err(e.into());
        }

        let rooms: Vec<Room> = self
            .rooms
            .iter()
            .map(|room| Room {
                totals: Some(room_total(room, &self.settings)),
                ..room.clone()
            })
            .collect();

        Ok(QuotePayload {
            title: self.title.clone(),
            client: self.client.clone(),
            location: self.location.clone(),
            date: self.date,
            settings: self.settings.clone(),
            grand_total: self.grand_total(),
            rooms,
            additional_data: self.additional_data.clone(),
            status: self.status,
        })
    }

    fn check_details(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_client(&self.client)?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_new_draft_defaults() {
        let draft = QuoteDraft::new(today());
        assert_eq!(draft.step, WizardStep::Details);
        assert_eq!(draft.rooms().len(), 1);

        let room = &draft.rooms()[0];
        assert_eq!(room.name, "Цех №1");
        assert_eq!(room.area, 500.0);
        assert_eq!(room.materials[0].consumption, 0.15);
        assert_eq!(room.materials[0].price, 864.0);
        assert_eq!(room.materials[1].consumption, 0.30);
        assert_eq!(room.materials[1].price, 1512.0);
        assert_eq!(draft.settings.dealer_discount, 20.0);
        assert_eq!(draft.additional_data.advantages.len(), 8);
    }

    #[test]
    fn test_new_draft_grand_total() {
        let draft = QuoteDraft::new(today());
        // (500 × 0.15 × 864 + 500 × 0.30 × 1512) × 1.2 × 0.8
        assert!(approx(draft.grand_total(), 279_936.0));
    }

    #[test]
    fn test_step_navigation_clamps() {
        let mut draft = QuoteDraft::new(today());
        draft.prev_step();
        assert_eq!(draft.step, WizardStep::Details);
        for _ in 0..10 {
            draft.next_step();
        }
        assert_eq!(draft.step, WizardStep::Extras);
        assert_eq!(draft.step.number(), 4);
        assert_eq!(WizardStep::Rooms.title(), "Приміщення");
    }

    #[test]
    fn test_add_room_uses_prices() {
        let mut draft = QuoteDraft::new(today());
        let prices = CalculatorPrices::default();
        let id = draft.add_room(Some(&prices));

        let room = draft.room(id).unwrap();
        assert_eq!(room.name, "Приміщення 2");
        assert_eq!(room.area, 200.0);
        assert_eq!(room.materials[0].price, 720.0);
        assert_eq!(room.materials[1].price, 1260.0);

        let fallback = draft.add_room(None);
        assert_eq!(draft.room(fallback).unwrap().materials[0].price, 864.0);
        assert_eq!(draft.room(fallback).unwrap().name, "Приміщення 3");
    }

    #[test]
    fn test_ids_are_unique() {
        let mut draft = QuoteDraft::new(today());
        let room_id = draft.add_room(None);
        draft.add_material(room_id).unwrap();

        let mut seen = HashSet::new();
        for room in draft.rooms() {
            assert!(seen.insert(room.id));
            for material in &room.materials {
                assert!(seen.insert(material.id));
            }
        }
    }

    #[test]
    fn test_cannot_remove_last_room() {
        let mut draft = QuoteDraft::new(today());
        let first = draft.rooms()[0].id;
        assert!(matches!(draft.remove_room(first), Err(CoreError::LastRoom)));

        let second = draft.add_room(None);
        assert!(draft.remove_room(first).is_ok());
        assert_eq!(draft.rooms()[0].id, second);
        assert!(matches!(draft.remove_room(999), Err(CoreError::RoomNotFound(999))));
    }

    #[test]
    fn test_material_lines() {
        let mut draft = QuoteDraft::new(today());
        let room_id = draft.rooms()[0].id;
        let line = draft.add_material(room_id).unwrap();

        let added = draft.room(room_id).unwrap().materials.last().unwrap().clone();
        assert_eq!(added.name, "");
        assert_eq!(added.consumption, 0.2);
        assert_eq!(added.price, 0.0);

        draft
            .update_material(room_id, line, MaterialField::Price(500.0))
            .unwrap();
        draft
            .update_material(room_id, line, MaterialField::Name("Лак".to_string()))
            .unwrap();
        assert_eq!(draft.room(room_id).unwrap().materials[2].price, 500.0);
        assert!(matches!(
            draft.update_material(room_id, 12345, MaterialField::Price(1.0)),
            Err(CoreError::MaterialNotFound { .. })
        ));

        let ids: Vec<i64> = draft.room(room_id).unwrap().materials.iter().map(|m| m.id).collect();
        for id in ids {
            draft.remove_material(room_id, id).unwrap();
        }
        assert!(draft.room(room_id).unwrap().materials.is_empty());
        assert_eq!(draft.room_totals(room_id).unwrap(), RoomTotals::default());
    }

    #[test]
    fn test_extras_editing() {
        let mut draft = QuoteDraft::new(today());
        let index = draft.add_advantage();
        draft.update_advantage(index, "Швидкий монтаж").unwrap();
        assert_eq!(draft.additional_data.advantages[index], "Швидкий монтаж");
        assert_eq!(draft.remove_advantage(index).unwrap(), "Швидкий монтаж");
        assert!(matches!(
            draft.update_advantage(100, "x"),
            Err(CoreError::IndexOutOfRange { list: "advantages", index: 100 })
        ));

        let param = draft.add_tech_param();
        draft
            .update_tech_param(param, TechParamField::Name("Колір".to_string()))
            .unwrap();
        draft
            .update_tech_param(param, TechParamField::Value("RAL 7040".to_string()))
            .unwrap();
        assert_eq!(
            draft.remove_tech_param(param).unwrap(),
            TechParam::new("Колір", "RAL 7040")
        );
        assert!(draft.remove_tech_param(100).is_err());
    }

    #[test]
    fn test_submit_requires_title_and_client() {
        let mut draft = QuoteDraft::new(today());
        draft.go_to(WizardStep::Extras);
        draft.title = "Склад".to_string();

        let err = draft.submit().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Required { ref field }) if field == "client"
        ));
        assert_eq!(draft.step, WizardStep::Details);
    }

    #[test]
    fn test_submit_snapshots_totals() {
        let mut draft = QuoteDraft::new(today());
        draft.title = "Склад".to_string();
        draft.client = "ТОВ Клієнт".to_string();
        draft.add_room(None);

        let payload = draft.submit().unwrap();
        let snapshot_sum: f64 = payload
            .rooms
            .iter()
            .map(|r| r.totals.as_ref().unwrap().total)
            .sum();
        assert!(approx(payload.grand_total, snapshot_sum));
        assert!(approx(payload.grand_total, draft.grand_total()));
        assert_eq!(payload.status, QuoteStatus::Draft);
    }

    #[test]
    fn test_from_quote_reassigns_ids() {
        let quote = Quote {
            id: "kp-7".to_string(),
            title: "Паркінг".to_string(),
            client: "ТОВ Ромашка".to_string(),
            location: String::new(),
            date: Some(today()),
            settings: QuoteSettings::default(),
            rooms: vec![
                Room::new(0, "A", 10.0)
                    .with_material(MaterialLine::new(0, "x", 0.1, 1.0))
                    .with_material(MaterialLine::new(0, "y", 0.1, 1.0)),
                Room::new(5, "B", 20.0).with_material(MaterialLine::new(5, "z", 0.1, 1.0)),
                Room::new(5, "C", 30.0),
            ],
            additional_data: AdditionalData::default(),
            grand_total: 0.0,
            status: QuoteStatus::Sent,
            status_history: Vec::new(),
            created_at: Utc::now(),
        };

        let mut draft = QuoteDraft::from_quote(&quote, today());
        assert!(draft.is_editing());
        assert_eq!(draft.status, QuoteStatus::Sent);
        assert_eq!(draft.additional_data.tech_params.len(), 7);

        let room_ids: HashSet<i64> = draft.rooms().iter().map(|r| r.id).collect();
        assert_eq!(room_ids.len(), 3);
        assert!(!room_ids.contains(&0));
        let first = &draft.rooms()[0];
        assert_ne!(first.materials[0].id, first.materials[1].id);

        let added = draft.add_room(None);
        assert!(!room_ids.contains(&added));
    }

    fn quote_with_rooms(date: Option<NaiveDate>, rooms: Vec<Room>) -> Quote {
        Quote {
            id: "kp-8".to_string(),
            title: "Склад".to_string(),
            client: "ТОВ Клієнт".to_string(),
            location: String::new(),
            date,
            settings: QuoteSettings::default(),
            rooms,
            additional_data: AdditionalData::default(),
            grand_total: 0.0,
            status: QuoteStatus::Draft,
            status_history: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_from_quote_without_date_uses_today() {
        let quote = quote_with_rooms(None, vec![Room::new(1, "A", 10.0)]);
        let draft = QuoteDraft::from_quote(&quote, today());
        assert_eq!(draft.date, today());

        let dated = quote_with_rooms(NaiveDate::from_ymd_opt(2024, 12, 31), vec![]);
        let draft = QuoteDraft::from_quote(&dated, today());
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn test_from_quote_renumbers_huge_ids() {
        let quote = quote_with_rooms(
            Some(today()),
            vec![
                Room::new(i64::MAX, "A", 10.0).with_material(MaterialLine::new(i64::MAX, "x", 0.1, 1.0)),
                Room::new(7, "B", 20.0),
            ],
        );

        let mut draft = QuoteDraft::from_quote(&quote, today());
        let ids: Vec<i64> = draft
            .rooms()
            .iter()
            .flat_map(|r| std::iter::once(r.id).chain(r.materials.iter().map(|m| m.id)))
            .collect();
        assert!(ids.iter().all(|id| (1..=MAX_LINE_ID).contains(id)));
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());

        let added = draft.add_room(None);
        assert!(added > 0 && !ids.contains(&added));
    }

    #[test]
    fn test_from_quote_keeps_ids_at_limit() {
        let quote = quote_with_rooms(Some(today()), vec![Room::new(MAX_LINE_ID, "A", 10.0)]);
        let mut draft = QuoteDraft::from_quote(&quote, today());
        assert_eq!(draft.rooms()[0].id, MAX_LINE_ID);
        assert_eq!(draft.add_room(None), MAX_LINE_ID + 1);
    }
}
