//! # Quote API
//!
//! Commercial proposals under `/kp`.

use polibest_core::pipeline::FunnelStats;
use polibest_core::{Quote, QuotePayload, QuoteStatus};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ApiClient, Created};
use crate::error::ClientResult;

#[derive(Debug, Serialize)]
struct StatusBody {
    status: QuoteStatus,
}

/// Response of a status change.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusUpdated {
    pub id: String,
    pub status: QuoteStatus,
    #[serde(default)]
    pub status_label: String,
}

/// Quote endpoints.
///
/// ## Usage
/// ```rust,ignore
/// let id = api.quotes().create(&draft.submit()?).await?;
/// api.quotes().set_status(&id, QuoteStatus::Sent).await?;
/// ```
#[derive(Debug, Clone)]
pub struct QuoteApi {
    api: ApiClient,
}

impl QuoteApi {
    pub fn new(api: ApiClient) -> Self {
        QuoteApi { api }
    }

    /// All quotes, newest first as the backend orders them.
    pub async fn list(&self) -> ClientResult<Vec<Quote>> {
        let quotes: Vec<Quote> = self.api.get_json("kp").await?;
        debug!(count = quotes.len(), "Loaded quotes");
        Ok(quotes)
    }

    pub async fn get(&self, id: &str) -> ClientResult<Quote> {
        self.api.get_json(&format!("kp/{}", id)).await
    }

    /// Creates a quote and returns its id.
    pub async fn create(&self, payload: &QuotePayload) -> ClientResult<String> {
        let created: Created = self.api.send_json(Method::POST, "kp", payload).await?;
        info!(id = %created.id, "Quote created");
        Ok(created.id)
    }

    /// Replaces the content of a quote. Status and history are kept by the backend.
    pub async fn update(&self, id: &str, payload: &QuotePayload) -> ClientResult<String> {
        let updated: Created = self
            .api
            .send_json(Method::PUT, &format!("kp/{}", id), payload)
            .await?;
        info!(id = %updated.id, "Quote updated");
        Ok(updated.id)
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.api.delete(&format!("kp/{}", id)).await?;
        info!(id = %id, "Quote deleted");
        Ok(())
    }

    /// Moves a quote to another status; the backend appends the history entry.
    pub async fn set_status(&self, id: &str, status: QuoteStatus) -> ClientResult<StatusUpdated> {
        self.api
            .send_json(
                Method::PATCH,
                &format!("kp/{}/status", id),
                &StatusBody { status },
            )
            .await
    }

    /// Funnel statistics over all quotes.
    pub async fn funnel(&self) -> ClientResult<FunnelStats> {
        self.api.get_json("kp/stats/funnel").await
    }
}
