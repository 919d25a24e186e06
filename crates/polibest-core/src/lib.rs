//! # polibest-core: Pure Business Logic for PoliBest 911
//!
//! This crate is the **heart** of the PoliBest 911 sales tooling. It turns
//! floor areas, material consumptions and prices into quotes, and contains
//! all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     PoliBest 911 Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Web front end / `polibest` command line              │   │
//! │  │   Calculator ──► Quote Wizard ──► Preview ──► Ledger / Docs     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ polibest-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │  pricing  │  │calculator │  │  wizard   │  │  preview  │   │   │
//! │  │   │ room/quote│  │ surface   │  │ QuoteDraft│  │ document  │   │   │
//! │  │   │  totals   │  │  kg/price │  │ snapshots │  │  model    │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   quote   │  │  ledger   │  │ pipeline  │  │  report   │   │   │
//! │  │   │  records  │  │ saved calc│  │  funnel   │  │share texts│   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO FILES • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              polibest-client (REST backend access)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`quote`] - Quote, room and material line records
//! - [`pricing`] - Quote pricing engine (line, room and grand totals)
//! - [`calculator`] - Single-surface calculator with fixed consumption tables
//! - [`wizard`] - Four-step quote draft used before a quote is saved
//! - [`preview`] - Printable document model with room selection
//! - [`report`] - Plain-text share and print renderings
//! - [`ledger`] - Saved calculations and their running total
//! - [`pipeline`] - Quote status changes and funnel statistics
//! - [`catalog`] - Products and application settings
//! - [`library`] - Stored documents and the instruction library
//! - [`money`] - Currencies and number display
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation at the API boundary
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Network and file system access is FORBIDDEN here
//! 3. **Full Precision**: Money is `f64` and is never rounded during computation;
//!    rounding happens only when a figure is displayed
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use polibest_core::pricing::room_total;
//! use polibest_core::quote::{MaterialLine, QuoteSettings, Room};
//!
//! let room = Room::new(1, "Цех №1", 100.0)
//!     .with_material(MaterialLine::new(1, "Емаль", 0.3, 1000.0));
//!
//! let totals = room_total(&room, &QuoteSettings::default());
//!
//! // 100 m² × 0.3 kg/m² × 1000 = 30 000, plus 20 % VAT
//! assert!((totals.with_vat - 36_000.0).abs() < 1e-6);
//! assert_eq!(totals.total_layers, 3);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod catalog;
pub mod error;
pub mod ledger;
pub mod library;
pub mod money;
pub mod pipeline;
pub mod preview;
pub mod pricing;
pub mod quote;
pub mod report;
pub mod validation;
pub mod wizard;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use polibest_core::Quote` instead of
// `use polibest_core::quote::Quote`

pub use calculator::{CalculatorPrices, CalculatorResult, CoatingMode, LacquerFinish, SurfaceInput};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Currency;
pub use pricing::{MaterialTotals, RoomSelection, RoomTotals};
pub use quote::*;
pub use wizard::QuoteDraft;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Product line name printed on every share text and document.
pub const PRODUCT_LINE: &str = "PoliBest 911";

/// Kilograms per square metre that make up one coat.
///
/// ## Business Reason
/// A quote line's consumption already includes every coat, so the number of
/// coats is recovered as `consumption / 0.1`.
pub const KG_PER_LAYER: f64 = 0.1;

/// Coats per kilogram per square metre, the inverse of [`KG_PER_LAYER`].
pub const LAYERS_PER_KG: f64 = 10.0;

/// VAT rate applied when nothing else is configured (percent).
pub const DEFAULT_VAT_RATE: f64 = 20.0;

/// Maximum length of a quote title or client name.
pub const MAX_NAME_LEN: usize = 200;
