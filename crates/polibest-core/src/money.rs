//! # Money Display
//!
//! Currencies and Ukrainian-locale number formatting.
//!
//! ## Precision Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where Rounding Happens                             │
//! │                                                                         │
//! │   pricing / calculator         money (THIS MODULE)        output       │
//! │   ────────────────────         ───────────────────        ──────       │
//! │   36 288.000000001     ──►     format_money          ──►  36 288,00 ₴  │
//! │   (full f64 precision)         format_rounded        ──►  36 288 грн   │
//! │                                format_number         ──►  36 288       │
//! │                                                                         │
//! │   Formatting NEVER feeds back into computation.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Grouping follows the `uk-UA` locale: thousands are separated by a
//! non-breaking space (U+00A0) and the decimal separator is a comma.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// Thousands separator used by the `uk-UA` locale.
pub const GROUP_SEPARATOR: char = '\u{a0}';

// =============================================================================
// Currency
// =============================================================================

/// Display currency of a quote.
///
/// The currency is a label only: no exchange rates are applied anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Ukrainian hryvnia.
    #[default]
    Uah,
    /// Euro.
    Eur,
    /// US dollar.
    Usd,
}

impl Currency {
    /// All supported currencies, in the order the wizard offers them.
    pub const ALL: [Currency; 3] = [Currency::Uah, Currency::Eur, Currency::Usd];

    /// ISO code as sent over the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Uah => "UAH",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }

    /// Symbol used while editing a quote.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Uah => "₴",
            Currency::Eur => "€",
            Currency::Usd => "$",
        }
    }

    /// Label printed on the customer-facing document.
    pub fn document_label(&self) -> &'static str {
        match self {
            Currency::Uah => "грн",
            Currency::Eur => "€",
            Currency::Usd => "$",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "UAH" | "ГРН" | "₴" => Ok(Currency::Uah),
            "EUR" | "€" => Ok(Currency::Eur),
            "USD" | "$" => Ok(Currency::Usd),
            _ => Err(ValidationError::NotAllowed {
                field: "currency".to_string(),
                allowed: Currency::ALL.iter().map(|c| c.code().to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Number Formatting
// =============================================================================

/// Formats a number the way the price lists show it.
///
/// Up to three fraction digits, trailing zeros dropped, grouped thousands.
///
/// ## Example
/// ```rust
/// use polibest_core::money::format_number;
///
/// assert_eq!(format_number(19_800.0), "19\u{a0}800");
/// assert_eq!(format_number(1.05), "1,05");
/// ```
pub fn format_number(value: f64) -> String {
    format_grouped(value, 0, 3)
}

/// Formats an amount with two decimals and the editing symbol (`₴`, `€`, `$`).
///
/// ## Example
/// ```rust
/// use polibest_core::money::{format_money, Currency};
///
/// assert_eq!(format_money(1234.5, Currency::Uah), "1\u{a0}234,50 ₴");
/// ```
pub fn format_money(value: f64, currency: Currency) -> String {
    format!("{} {}", format_grouped(value, 2, 3), currency.symbol())
}

/// Formats an amount rounded to whole units with the document label.
///
/// ## Example
/// ```rust
/// use polibest_core::money::{format_rounded, Currency};
///
/// assert_eq!(format_rounded(36_288.4, Currency::Uah), "36\u{a0}288 грн");
/// assert_eq!(format_rounded(99.5, Currency::Eur), "100 €");
/// ```
pub fn format_rounded(value: f64, currency: Currency) -> String {
    format!(
        "{} {}",
        format_grouped(round_half_up(value), 0, 0),
        currency.document_label()
    )
}

/// Rounds to the nearest integer, ties toward positive infinity.
///
/// This is the rounding every displayed figure and the derived layer count
/// use: `1.5 → 2`, `-1.5 → -1`, `2.4 → 2`.
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Formats `value` with grouped thousands and between `min_frac` and
/// `max_frac` fraction digits.
fn format_grouped(value: f64, min_frac: usize, max_frac: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    let fixed = format!("{:.*}", max_frac, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (fixed.as_str(), ""),
    };

    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < min_frac {
        frac.push('0');
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac.chars().all(|c| c == '0');
    let mut out = String::new();
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac.is_empty() {
        out.push(',');
        out.push_str(&frac);
    }
    out
}

/// Inserts the group separator every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / 3 * 2);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(c);
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
