//! # Quote Pricing Engine
//!
//! Line, room and quote totals for commercial proposals.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Room Total Calculation                             │
//! │                                                                         │
//! │  For each material line:                                               │
//! │     total_kg = area × consumption                                      │
//! │     sum      = total_kg × price                                        │
//! │     layers   = round(consumption × 10)                                 │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  materials_sum = Σ sum              total_layers = Σ layers            │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  with_vat = include_vat ? materials_sum × (1 + vat_rate / 100)         │
//! │                         : materials_sum                                │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  discount = with_vat × dealer_discount / 100                           │
//! │  total    = with_vat − discount                                        │
//! │                                                                         │
//! │  grand_total = Σ room.total over the included rooms                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Precision
//! Nothing in this module rounds. Rounding is a display concern
//! (see [`crate::money`]).
//!
//! ## No Validation
//! The engine accepts whatever numbers it is given: a negative area or price
//! produces negative sums, a zero area produces zero. Inputs are normalized
//! by the caller (see [`crate::validation::parse_number_or_zero`]).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use ts_rs::TS;

use crate::money::round_half_up;
use crate::quote::{MaterialLine, QuoteSettings, Room};
use crate::LAYERS_PER_KG;

// =============================================================================
// Derived Layer Count
// =============================================================================

/// Number of coats recovered from a consumption figure.
///
/// One coat is 0.1 kg/m², so a line with 0.30 kg/m² has 3 coats. The value
/// is informational: it never changes a price.
///
/// ## Example
/// ```rust
/// use polibest_core::pricing::DerivedLayerCount;
///
/// assert_eq!(DerivedLayerCount::from_consumption(0.15).get(), 2);
/// assert_eq!(DerivedLayerCount::from_consumption(0.30).get(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct DerivedLayerCount(i64);

impl DerivedLayerCount {
    /// `round(consumption × 10)`, ties toward positive infinity.
    ///
    /// Multiplying by [`LAYERS_PER_KG`] instead of dividing by
    /// [`KG_PER_LAYER`](crate::KG_PER_LAYER) keeps 0.3 from turning into
    /// 2.9999999999999996.
    pub fn from_consumption(consumption: f64) -> Self {
        DerivedLayerCount(round_half_up(consumption * LAYERS_PER_KG) as i64)
    }

    /// The coat count.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::ops::Add for DerivedLayerCount {
    type Output = DerivedLayerCount;

    fn add(self, rhs: Self) -> Self::Output {
        DerivedLayerCount(self.0 + rhs.0)
    }
}

impl std::iter::Sum for DerivedLayerCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(DerivedLayerCount::default(), |acc, x| acc + x)
    }
}

/// Shorthand for `DerivedLayerCount::from_consumption(consumption).get()`.
pub fn layers_from_consumption(consumption: f64) -> i64 {
    DerivedLayerCount::from_consumption(consumption).get()
}

// =============================================================================
// Totals
// =============================================================================

/// Totals of one material line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MaterialTotals {
    /// area × consumption
    pub total_kg: f64,
    /// total_kg × price, before VAT and discount
    pub sum: f64,
    /// Derived coat count of the line.
    pub layers: i64,
}

/// Totals of one room.
///
/// Also stored on [`Room::totals`] as the save-time snapshot, so the field
/// names match the backend record (`materialsSum`, `withVat`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RoomTotals {
    pub materials_sum: f64,
    pub with_vat: f64,
    pub discount: f64,
    pub total: f64,
    #[serde(default)]
    pub total_layers: i64,
}

/// Computes the totals of one material line in a room.
pub fn material_total(room: &Room, material: &MaterialLine) -> MaterialTotals {
    let total_kg = room.area * material.consumption;
    MaterialTotals {
        total_kg,
        sum: total_kg * material.price,
        layers: layers_from_consumption(material.consumption),
    }
}

/// Adds VAT to `amount` when the settings ask for it.
pub fn apply_vat(amount: f64, settings: &QuoteSettings) -> f64 {
    if settings.include_vat {
        amount * (1.0 + settings.vat_rate / 100.0)
    } else {
        amount
    }
}

/// Computes the totals of one room.
///
/// ## Example
/// ```rust
/// use polibest_core::pricing::room_total;
/// use polibest_core::quote::{MaterialLine, QuoteSettings, Room};
///
/// let room = Room::new(1, "Склад", 200.0)
///     .with_material(MaterialLine::new(1, "Ґрунтівка", 0.15, 864.0))
///     .with_material(MaterialLine::new(2, "Емаль", 0.30, 1512.0));
/// let settings = QuoteSettings { dealer_discount: 20.0, ..QuoteSettings::default() };
///
/// let totals = room_total(&room, &settings);
/// assert!((totals.total - 111_974.4).abs() < 1e-6);
/// assert_eq!(totals.total_layers, 5);
/// ```
pub fn room_total(room: &Room, settings: &QuoteSettings) -> RoomTotals {
    let mut materials_sum = 0.0;
    let mut total_layers = DerivedLayerCount::default();
    for material in &room.materials {
        let line = material_total(room, material);
        materials_sum += line.sum;
        total_layers = total_layers + DerivedLayerCount(line.layers);
    }

    let with_vat = apply_vat(materials_sum, settings);
    let discount = with_vat * (settings.dealer_discount / 100.0);

    RoomTotals {
        materials_sum,
        with_vat,
        discount,
        total: with_vat - discount,
        total_layers: total_layers.get(),
    }
}

// =============================================================================
// Room Selection
// =============================================================================

/// The set of rooms included in a total.
///
/// Rooms are identified by their position in the quote. Positions that do
/// not name a room are ignored by the totals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoomSelection {
    included: BTreeSet<usize>,
}

impl RoomSelection {
    /// Selects the first `room_count` rooms.
    pub fn all(room_count: usize) -> Self {
        RoomSelection {
            included: (0..room_count).collect(),
        }
    }

    /// Selects nothing.
    pub fn none() -> Self {
        RoomSelection::default()
    }

    /// Selects exactly the given positions.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        RoomSelection {
            included: indices.into_iter().collect(),
        }
    }

    /// Flips the inclusion of one position and returns the new state.
    pub fn toggle(&mut self, index: usize) -> bool {
        if self.included.remove(&index) {
            false
        } else {
            self.included.insert(index);
            true
        }
    }

    /// Whether the room at `index` is included.
    pub fn contains(&self, index: usize) -> bool {
        self.included.contains(&index)
    }

    /// Included positions in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.included.iter().copied()
    }

    /// Number of included positions.
    pub fn len(&self) -> usize {
        self.included.len()
    }

    /// True when nothing is included.
    pub fn is_empty(&self) -> bool {
        self.included.is_empty()
    }

    /// The included rooms of `rooms`, in quote order.
    pub fn select<'a>(&'a self, rooms: &'a [Room]) -> impl Iterator<Item = &'a Room> + 'a {
        rooms
            .iter()
            .enumerate()
            .filter(move |(i, _)| self.contains(*i))
            .map(|(_, room)| room)
    }
}

// =============================================================================
// Quote Totals
// =============================================================================

/// Sum of `room_total(..).total` over the selected rooms.
pub fn grand_total(rooms: &[Room], settings: &QuoteSettings, selection: &RoomSelection) -> f64 {
    selection
        .select(rooms)
        .map(|room| room_total(room, settings).total)
        .sum()
}

/// Sum of the areas of the selected rooms.
pub fn total_area(rooms: &[Room], selection: &RoomSelection) -> f64 {
    selection.select(rooms).map(|room| room.area).sum()
}

/// Grand total over every room of a quote.
pub fn quote_grand_total(rooms: &[Room], settings: &QuoteSettings) -> f64 {
    grand_total(rooms, settings, &RoomSelection::all(rooms.len()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn room(area: f64, lines: &[(f64, f64)]) -> Room {
        lines
            .iter()
            .enumerate()
            .fold(Room::new(1, "Room", area), |room, (i, (consumption, price))| {
                room.with_material(MaterialLine::new(i as i64, "m", *consumption, *price))
            })
    }

    fn settings(include_vat: bool, vat_rate: f64, dealer_discount: f64) -> QuoteSettings {
        QuoteSettings {
            include_vat,
            vat_rate,
            dealer_discount,
            ..QuoteSettings::default()
        }
    }

    #[test]
    fn test_layers_from_consumption() {
        assert_eq!(layers_from_consumption(0.15), 2);
        assert_eq!(layers_from_consumption(0.30), 3);
        assert_eq!(layers_from_consumption(0.1), 1);
        assert_eq!(layers_from_consumption(0.04), 0);
        assert_eq!(layers_from_consumption(0.0), 0);
        assert_eq!(layers_from_consumption(-0.15), -1);
    }

    #[test]
    fn test_material_total() {
        let r = room(100.0, &[(0.3, 1000.0)]);
        let line = material_total(&r, &r.materials[0]);
        assert!(approx(line.total_kg, 30.0));
        assert!(approx(line.sum, 30_000.0));
        assert_eq!(line.layers, 3);
    }

    #[test]
    fn test_standard_workshop_line_by_line() {
        let r = room(500.0, &[(0.15, 864.0), (0.30, 1512.0)]);

        let primer = material_total(&r, &r.materials[0]);
        assert!(approx(primer.total_kg, 75.0));
        assert!(approx(primer.sum, 64_800.0));
        assert_eq!(primer.layers, 2);

        let enamel = material_total(&r, &r.materials[1]);
        assert!(approx(enamel.total_kg, 150.0));
        assert!(approx(enamel.sum, 226_800.0));
        assert_eq!(enamel.layers, 3);

        let totals = room_total(&r, &settings(true, 20.0, 20.0));
        assert!(approx(totals.materials_sum, 291_600.0));
        assert!(approx(totals.with_vat, 349_920.0));
        assert!(approx(totals.discount, 69_984.0));
        assert!(approx(totals.total, 279_936.0));
        assert_eq!(totals.total_layers, 5);
    }

    #[test]
    fn test_totals_scale_with_area_and_price() {
        let base = room(120.0, &[(0.15, 864.0), (0.30, 1512.0)]);
        let double_area = room(240.0, &[(0.15, 864.0), (0.30, 1512.0)]);
        let double_price = room(120.0, &[(0.15, 1728.0), (0.30, 3024.0)]);

        for i in 0..2 {
            let line = material_total(&base, &base.materials[i]);
            let by_area = material_total(&double_area, &double_area.materials[i]);
            let by_price = material_total(&double_price, &double_price.materials[i]);

            assert!(approx(by_area.total_kg, 2.0 * line.total_kg));
            assert!(approx(by_area.sum, 2.0 * line.sum));
            assert_eq!(by_area.layers, line.layers);

            assert!(approx(by_price.total_kg, line.total_kg));
            assert!(approx(by_price.sum, 2.0 * line.sum));
            assert_eq!(by_price.layers, line.layers);
        }

        let s = settings(true, 20.0, 20.0);
        assert!(approx(room_total(&double_area, &s).total, 2.0 * room_total(&base, &s).total));
        assert!(approx(room_total(&double_price, &s).total, 2.0 * room_total(&base, &s).total));
    }

    #[test]
    fn test_totals_are_repeatable() {
        let rooms = vec![
            room(500.0, &[(0.15, 864.0), (0.30, 1512.0)]),
            room(37.5, &[(0.2, 990.0)]),
        ];
        let s = settings(true, 20.0, 15.0);
        let selection = RoomSelection::from_indices([0, 1]);

        let first = room_total(&rooms[0], &s);
        let first_grand = grand_total(&rooms, &s, &selection);
        for _ in 0..3 {
            assert_eq!(room_total(&rooms[0], &s), first);
            assert_eq!(grand_total(&rooms, &s, &selection).to_bits(), first_grand.to_bits());
        }
    }

    #[test]
    fn test_room_total_with_vat_and_discount() {
        let r = room(100.0, &[(0.3, 1000.0)]);
        let totals = room_total(&r, &settings(true, 20.0, 10.0));
        assert!(approx(totals.materials_sum, 30_000.0));
        assert!(approx(totals.with_vat, 36_000.0));
        assert!(approx(totals.discount, 3_600.0));
        assert!(approx(totals.total, 32_400.0));
        assert_eq!(totals.total_layers, 3);
    }

    #[test]
    fn test_room_total_two_lines() {
        let r = room(200.0, &[(0.15, 864.0), (0.30, 1512.0)]);
        let totals = room_total(&r, &settings(true, 20.0, 20.0));
        assert!(approx(totals.materials_sum, 116_640.0));
        assert!(approx(totals.with_vat, 139_968.0));
        assert!(approx(totals.discount, 27_993.6));
        assert!(approx(totals.total, 111_974.4));
        assert_eq!(totals.total_layers, 5);
    }

    #[test]
    fn test_room_total_without_vat() {
        let r = room(50.0, &[(0.2, 990.0)]);
        let totals = room_total(&r, &settings(false, 20.0, 0.0));
        assert!(approx(totals.with_vat, totals.materials_sum));
        assert!(approx(totals.total, 9_900.0));
        assert_eq!(totals.discount, 0.0);
    }

    #[test]
    fn test_empty_room_is_zero() {
        let r = room(120.0, &[]);
        let totals = room_total(&r, &settings(true, 20.0, 20.0));
        assert_eq!(totals, RoomTotals::default());
    }

    #[test]
    fn test_zero_area_is_zero() {
        let r = room(0.0, &[(0.3, 1512.0)]);
        let totals = room_total(&r, &settings(true, 20.0, 0.0));
        assert_eq!(totals.total, 0.0);
        assert_eq!(totals.total_layers, 3);
    }

    #[test]
    fn test_negative_price_flows_through() {
        let r = room(10.0, &[(0.1, -100.0)]);
        let totals = room_total(&r, &settings(false, 0.0, 0.0));
        assert!(approx(totals.total, -100.0));
    }

    #[test]
    fn test_full_discount_is_zero() {
        let r = room(10.0, &[(0.3, 1000.0)]);
        let totals = room_total(&r, &settings(true, 20.0, 100.0));
        assert!(approx(totals.total, 0.0));
    }

    #[test]
    fn test_grand_total_respects_selection() {
        let rooms = vec![room(100.0, &[(0.3, 1000.0)]), room(10.0, &[(0.1, 1000.0)])];
        let s = settings(false, 20.0, 0.0);

        assert!(approx(grand_total(&rooms, &s, &RoomSelection::all(2)), 31_000.0));
        assert!(approx(
            grand_total(&rooms, &s, &RoomSelection::from_indices([1])),
            1_000.0
        ));
        assert_eq!(grand_total(&rooms, &s, &RoomSelection::none()), 0.0);
        assert!(approx(quote_grand_total(&rooms, &s), 31_000.0));
    }

    #[test]
    fn test_selection_ignores_unknown_indices() {
        let rooms = vec![room(100.0, &[(0.3, 1000.0)])];
        let s = settings(false, 20.0, 0.0);
        let selection = RoomSelection::from_indices([0, 5]);
        assert!(approx(grand_total(&rooms, &s, &selection), 30_000.0));
        assert!(approx(total_area(&rooms, &selection), 100.0));
    }

    #[test]
    fn test_total_area() {
        let rooms = vec![room(500.0, &[]), room(200.0, &[])];
        assert!(approx(total_area(&rooms, &RoomSelection::all(2)), 700.0));
        assert!(approx(total_area(&rooms, &RoomSelection::from_indices([1])), 200.0));
    }

    #[test]
    fn test_selection_toggle() {
        let mut selection = RoomSelection::all(3);
        assert!(!selection.toggle(1));
        assert!(!selection.contains(1));
        assert!(selection.toggle(1));
        assert_eq!(selection.indices().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_room_totals_wire_names() {
        let json = serde_json::to_value(RoomTotals::default()).unwrap();
        assert!(json.get("materialsSum").is_some());
        assert!(json.get("withVat").is_some());
        assert!(json.get("totalLayers").is_some());
    }
}
