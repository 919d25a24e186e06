//! # Quote Pipeline
//!
//! Status changes of quotes and the sales funnel built from them.
//!
//! ## Funnel
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Sales Funnel                                   │
//! │                                                                         │
//! │   Чернетка (draft)     10 quotes   ███████████████████  100 %           │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   Відправлено (sent)    4 quotes   ████████              40 %           │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   Оплачено (paid)       1 quote    ██                    25 %           │
//! │                                                                         │
//! │   Скасовано (cancelled) reported separately, not a funnel stage         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A stage's conversion is its count relative to the last preceding stage
//! with a non-zero count; a stage with no such predecessor reports 100 %.
//! Sums use each quote's stored grand total snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::quote::{Quote, QuoteStatus, StatusChange};

/// Statuses that form the funnel, in order.
pub const FUNNEL_STAGES: [QuoteStatus; 3] =
    [QuoteStatus::Draft, QuoteStatus::Sent, QuoteStatus::Paid];

// =============================================================================
// Status Changes
// =============================================================================

/// Statuses a quote in `current` can be moved to.
pub fn transitions_from(current: QuoteStatus) -> Vec<QuoteStatus> {
    QuoteStatus::ALL
        .iter()
        .copied()
        .filter(|status| *status != current)
        .collect()
}

/// Sets a new status on a local quote copy and records the change.
///
/// Returns the recorded history entry.
pub fn change_status(quote: &mut Quote, to: QuoteStatus, at: DateTime<Utc>) -> StatusChange {
    let change = StatusChange {
        from_status: quote.status,
        to_status: to,
        changed_at: at,
    };
    quote.status = to;
    quote.status_history.push(change.clone());
    change
}

/// Quotes with the given status, or all quotes when `status` is `None`.
pub fn filter_by_status(quotes: &[Quote], status: Option<QuoteStatus>) -> Vec<&Quote> {
    quotes
        .iter()
        .filter(|quote| status.map_or(true, |s| quote.status == s))
        .collect()
}

// =============================================================================
// Funnel Statistics
// =============================================================================

/// Count and grand-total sum of the quotes in one status.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StageTotals {
    pub count: usize,
    pub total_sum: f64,
}

/// One funnel stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FunnelStage {
    pub status: QuoteStatus,
    pub label: String,
    pub count: usize,
    pub total_sum: f64,
    /// Percent of the previous non-empty stage, one decimal.
    /// 100 when no earlier stage has quotes.
    pub conversion: f64,
}

/// Funnel statistics over a set of quotes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FunnelStats {
    pub funnel: Vec<FunnelStage>,
    pub cancelled: StageTotals,
    pub total_count: usize,
    pub total_sum: f64,
}

impl FunnelStats {
    /// Builds the funnel from a list of quotes.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let stats = FunnelStats::from_quotes(&quotes);
    /// for stage in &stats.funnel {
    ///     println!("{}: {} ({}%)", stage.label, stage.count, stage.conversion);
    /// }
    /// ```
    pub fn from_quotes(quotes: &[Quote]) -> Self {
        let totals_for = |status: QuoteStatus| {
            quotes
                .iter()
                .filter(|q| q.status == status)
                .fold(StageTotals::default(), |mut acc, q| {
                    acc.count += 1;
                    acc.total_sum += q.grand_total;
                    acc
                })
        };

        let mut funnel = Vec::with_capacity(FUNNEL_STAGES.len());
        let mut previous: Option<usize> = None;
        for status in FUNNEL_STAGES {
            let stage = totals_for(status);
            let conversion = match previous {
                Some(prev) => stage.count as f64 / prev as f64 * 100.0,
                None => 100.0,
            };
            funnel.push(FunnelStage {
                status,
                label: status.label().to_string(),
                count: stage.count,
                total_sum: stage.total_sum,
                conversion: round_one_decimal(conversion),
            });
            if stage.count > 0 {
                previous = Some(stage.count);
            }
        }

        FunnelStats {
            funnel,
            cancelled: totals_for(QuoteStatus::Cancelled),
            total_count: quotes.len(),
            total_sum: quotes.iter().map(|q| q.grand_total).sum(),
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// =============================================================================
// Unit Tests
// =============================================================================
