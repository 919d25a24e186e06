//! # Workflows
//!
//! The steps a manager takes, each combining the pure engine in
//! `polibest-core` with one or two backend calls.
//!
//! ## Quote Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  start_quote(today) ─┐                                                 │
//! │                      ├──► QuoteDraft ──► save_quote ──► POST /kp       │
//! │  edit_quote(id) ─────┘    (wizard)        (snapshots)   PUT  /kp/{id}  │
//! │                                                                         │
//! │  open_preview(id) ──► QuotePreview (live totals, room selection)       │
//! │                                                                         │
//! │  recalculate_quote(id) ──► fresh snapshots ──► PUT /kp/{id}            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Local, NaiveDate};
use polibest_core::calculator::{CalculatorPrices, CalculatorResult, SurfaceInput};
use polibest_core::ledger::{NewCalculation, OrderMeta, SavedCalculation};
use polibest_core::library::Document;
use polibest_core::preview::QuotePreview;
use polibest_core::report::calculator_document;
use polibest_core::validation::validate_quote_payload;
use polibest_core::{Quote, QuoteDraft, ValidationError};
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::error::ClientResult;

/// Engine plus backend, for one session.
///
/// ## Usage
/// ```rust,ignore
/// let workflow = Workflow::new(api);
///
/// let mut draft = Workflow::start_quote(today);
/// draft.title = "Склад".into();
/// draft.client = "ТОВ Клієнт".into();
/// let id = workflow.save_quote(&mut draft).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Workflow {
    api: ApiClient,
}

impl Workflow {
    pub fn new(api: ApiClient) -> Self {
        Workflow { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // =========================================================================
    // Prices
    // =========================================================================

    /// Calculator prices from the backend.
    ///
    /// Never fails: any error (offline, signed out, bad body) falls back to
    /// the built-in price list.
    pub async fn load_prices(&self) -> CalculatorPrices {
        match self.api.catalog().calculator_prices().await {
            Ok(prices) => prices,
            Err(e) => {
                warn!(error = %e, "Failed to load calculator prices, using defaults");
                CalculatorPrices::default()
            }
        }
    }

    // =========================================================================
    // Quotes
    // =========================================================================

    /// Fresh wizard draft dated `today`.
    pub fn start_quote(today: NaiveDate) -> QuoteDraft {
        QuoteDraft::new(today)
    }

    /// Loads a saved quote into the wizard. A quote without a usable date
    /// is redated today.
    pub async fn edit_quote(&self, id: &str) -> ClientResult<QuoteDraft> {
        let quote = self.api.quotes().get(id).await?;
        debug!(id = %id, rooms = quote.rooms.len(), "Editing quote");
        Ok(QuoteDraft::from_quote(&quote, Local::now().date_naive()))
    }

    /// Saves the draft with fresh room snapshots and grand total.
    ///
    /// Creates the quote when the draft is new, otherwise updates it. The
    /// returned id is also stored on the draft so a second save updates.
    pub async fn save_quote(&self, draft: &mut QuoteDraft) -> ClientResult<String> {
        let payload = draft.submit()?;
        validate_quote_payload(&payload)?;

        let id = match draft.editing_id.clone() {
            Some(id) => self.api.quotes().update(&id, &payload).await?,
            None => self.api.quotes().create(&payload).await?,
        };
        info!(id = %id, grand_total = payload.grand_total, "Quote saved");

        draft.editing_id = Some(id.clone());
        Ok(id)
    }

    /// Loads a quote for the printable preview, every room selected.
    pub async fn open_preview(&self, id: &str) -> ClientResult<QuotePreview> {
        let quote = self.api.quotes().get(id).await?;
        if quote.has_stale_snapshot(0.005) {
            debug!(id = %id, drift = quote.snapshot_drift(), "Stored totals differ from room data");
        }
        Ok(QuotePreview::new(quote))
    }

    /// Recomputes the stored snapshots of a quote and saves them.
    pub async fn recalculate_quote(&self, id: &str) -> ClientResult<Quote> {
        let mut quote = self.api.quotes().get(id).await?;
        let before = quote.grand_total;
        quote.recalculate();
        self.api.quotes().update(id, &quote.to_payload()).await?;
        info!(id = %id, before, after = quote.grand_total, "Quote totals recalculated");
        Ok(quote)
    }

    // =========================================================================
    // Calculations
    // =========================================================================

    /// Stores a calculator result in the ledger.
    pub async fn save_calculation(
        &self,
        input: &SurfaceInput,
        result: &CalculatorResult,
        meta: &OrderMeta,
    ) -> ClientResult<SavedCalculation> {
        let record = NewCalculation::from_result(input, result, meta).ok_or_else(|| {
            ValidationError::Required {
                field: "mode".to_string(),
            }
        })?;
        self.api.calculations().create(&record).await
    }

    /// Stores a calculator result as a commercial proposal document,
    /// optionally linked to a saved calculation.
    pub async fn save_calculation_document(
        &self,
        input: &SurfaceInput,
        result: &CalculatorResult,
        client_name: &str,
        calculation_id: Option<String>,
    ) -> ClientResult<Document> {
        let document = calculator_document(input, result, client_name, calculation_id);
        self.api.documents().create(&document).await
    }
}
