//! # Error Types
//!
//! Domain-specific error types for polibest-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  polibest-core errors (this file)                                      │
//! │  ├── CoreError        - Quote draft and domain rule failures           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  polibest-client errors (separate crate)                               │
//! │  └── ClientError      - HTTP, session, config failures                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → CLI / front end     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pricing engine itself never fails: malformed numbers simply flow
//! through the arithmetic. Errors exist for the draft editing rules and for
//! validation at the API boundary.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations while editing a quote.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Room cannot be found in the draft.
    #[error("Room not found: {0}")]
    RoomNotFound(i64),

    /// Material line cannot be found in the given room.
    #[error("Material {material_id} not found in room {room_id}")]
    MaterialNotFound { room_id: i64, material_id: i64 },

    /// Attempt to delete the only room of a quote.
    ///
    /// ## User Workflow
    /// ```text
    /// Quote with rooms: [Цех №1]
    ///      │
    ///      ▼
    /// Delete "Цех №1"
    ///      │
    ///      ▼
    /// LastRoom
    ///      │
    ///      ▼
    /// UI shows: "Потрібно хоча б одне приміщення"
    /// ```
    #[error("A quote needs at least one room")]
    LastRoom,

    /// Index into a list (advantages, technical parameters) is out of bounds.
    #[error("{list} has no entry at index {index}")]
    IndexOutOfRange { list: &'static str, index: usize },

    /// Status string is not one of the known quote statuses.
    #[error("Unknown quote status: {0}")]
    UnknownStatus(String),

    /// Attached file could not be decoded.
    #[error("Attached file cannot be decoded: {reason}")]
    InvalidAttachment { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for validation at the API boundary before a record is sent.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
