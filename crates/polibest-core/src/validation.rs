//! # Validation Module
//!
//! Input validation for records crossing the API boundary.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form input                                                   │
//! │  └── parse_number_or_zero: "12,5 м²" → 12, "abc" → 0                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Pricing engine                                               │
//! │  └── NO validation: any number flows through the arithmetic            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: API boundary (THIS MODULE)                                   │
//! │  ├── Required texts (title, client)                                    │
//! │  ├── Positive areas and consumptions, non-negative prices              │
//! │  └── Percentages between 0 and 100                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use polibest_core::validation::{validate_title, validate_percentage};
//!
//! assert!(validate_title("Склад №2").is_ok());
//! assert!(validate_percentage("vat_rate", 120.0).is_err());
//! ```

use uuid::Uuid;

use crate::error::ValidationError;
use crate::quote::{QuotePayload, Room};
use crate::MAX_NAME_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates that a text field is present (not blank).
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    validate_required(field, value)?;
    if value.trim().chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

/// Validates a quote title.
///
/// ## Rules
/// - Must not be blank
/// - At most 200 characters
pub fn validate_title(title: &str) -> ValidationResult<()> {
    validate_name("title", title)
}

/// Validates a client name.
///
/// ## Rules
/// - Must not be blank
/// - At most 200 characters
pub fn validate_client(client: &str) -> ValidationResult<()> {
    validate_name("client", client)
}

/// Validates a UUID string.
pub fn validate_uuid(field: &str, value: &str) -> ValidationResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

// =============================================================================
// Numeric Validators
// =============================================================================

fn validate_finite(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        });
    }
    Ok(())
}

/// Validates a floor area (m²): finite and greater than zero.
pub fn validate_area(area: f64) -> ValidationResult<()> {
    validate_finite("area", area)?;
    if area <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "area".to_string(),
        });
    }
    Ok(())
}

/// Validates a consumption figure (kg/m²): finite and greater than zero.
pub fn validate_consumption(consumption: f64) -> ValidationResult<()> {
    validate_finite("consumption", consumption)?;
    if consumption <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "consumption".to_string(),
        });
    }
    Ok(())
}

/// Validates a price per kg: finite and not negative.
pub fn validate_price(price: f64) -> ValidationResult<()> {
    validate_finite("price", price)?;
    if price < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates a percentage (VAT rate, dealer discount): 0 to 100 inclusive.
pub fn validate_percentage(field: &str, value: f64) -> ValidationResult<()> {
    validate_finite(field, value)?;
    if !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: 100.0,
        });
    }
    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates every room and material line of a quote.
pub fn validate_room(room: &Room) -> ValidationResult<()> {
    validate_area(room.area)?;
    for material in &room.materials {
        validate_consumption(material.consumption)?;
        validate_price(material.price)?;
    }
    Ok(())
}

/// Validates a quote before it is sent to the backend.
///
/// ## Rules
/// - Title and client present
/// - VAT rate and dealer discount between 0 and 100
/// - At least one room; every room and material line valid
pub fn validate_quote_payload(payload: &QuotePayload) -> ValidationResult<()> {
    validate_title(&payload.title)?;
    validate_client(&payload.client)?;
    validate_percentage("vat_rate", payload.settings.vat_rate)?;
    validate_percentage("dealer_discount", payload.settings.dealer_discount)?;

    if payload.rooms.is_empty() {
        return Err(ValidationError::Required {
            field: "rooms".to_string(),
        });
    }
    for room in &payload.rooms {
        validate_room(room)?;
    }
    Ok(())
}

// =============================================================================
// Input Normalization
// =============================================================================

/// Reads the leading number of a form field, or 0 when there is none.
///
/// Accepts an optional sign, digits, one decimal point and an exponent;
/// anything after the number is ignored. A comma ends the number.
///
/// ## Example
/// ```rust
/// use polibest_core::validation::parse_number_or_zero;
///
/// assert_eq!(parse_number_or_zero("12.5"), 12.5);
/// assert_eq!(parse_number_or_zero(" 200 м²"), 200.0);
/// assert_eq!(parse_number_or_zero("12,5"), 12.0);
/// assert_eq!(parse_number_or_zero("abc"), 0.0);
/// ```
pub fn parse_number_or_zero(input: &str) -> f64 {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return 0.0;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    match s[..end].parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{AdditionalData, MaterialLine, QuoteSettings, QuoteStatus};
    use chrono::NaiveDate;

    fn payload() -> QuotePayload {
        QuotePayload {
            title: "Склад".to_string(),
            client: "ТОВ Клієнт".to_string(),
            location: String::new(),
            date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            settings: QuoteSettings::default(),
            rooms: vec![Room::new(1, "Цех", 100.0)
                .with_material(MaterialLine::new(1, "Емаль", 0.3, 1512.0))],
            additional_data: AdditionalData::default(),
            grand_total: 0.0,
            status: QuoteStatus::Draft,
        }
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Паркінг").is_ok());
        assert!(matches!(
            validate_title("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_title(&"я".repeat(201)),
            Err(ValidationError::TooLong { max: 200, .. })
        ));
        assert!(validate_title(&"я".repeat(200)).is_ok());
    }

    #[test]
    fn test_validate_numbers() {
        assert!(validate_area(0.5).is_ok());
        assert!(validate_area(0.0).is_err());
        assert!(validate_area(f64::INFINITY).is_err());
        assert!(validate_consumption(-0.1).is_err());
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(-1.0).is_err());
        assert!(validate_percentage("dealer_discount", 100.0).is_ok());
        assert!(validate_percentage("dealer_discount", -5.0).is_err());
        assert!(validate_percentage("vat_rate", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_quote_payload() {
        assert!(validate_quote_payload(&payload()).is_ok());

        let mut missing_client = payload();
        missing_client.client = String::new();
        assert!(matches!(
            validate_quote_payload(&missing_client),
            Err(ValidationError::Required { field }) if field == "client"
        ));

        let mut no_rooms = payload();
        no_rooms.rooms.clear();
        assert!(validate_quote_payload(&no_rooms).is_err());

        let mut bad_price = payload();
        bad_price.rooms[0].materials[0].price = -10.0;
        assert!(validate_quote_payload(&bad_price).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "not-a-uuid").is_err());
    }

    #[test]
    fn test_parse_number_or_zero() {
        assert_eq!(parse_number_or_zero("500"), 500.0);
        assert_eq!(parse_number_or_zero("0.15"), 0.15);
        assert_eq!(parse_number_or_zero(".5"), 0.5);
        assert_eq!(parse_number_or_zero("-3"), -3.0);
        assert_eq!(parse_number_or_zero("1e3"), 1000.0);
        assert_eq!(parse_number_or_zero("1e"), 1.0);
        assert_eq!(parse_number_or_zero("7."), 7.0);
        assert_eq!(parse_number_or_zero(""), 0.0);
        assert_eq!(parse_number_or_zero("-"), 0.0);
        assert_eq!(parse_number_or_zero("."), 0.0);
        assert_eq!(parse_number_or_zero("м² 40"), 0.0);
    }
}
