//! # Document API
//!
//! Plain-text documents generated from calculations.

use polibest_core::library::{Document, NewDocument};
use reqwest::Method;
use tracing::info;

use super::{ApiClient, Download};
use crate::error::ClientResult;

/// Document endpoints.
#[derive(Debug, Clone)]
pub struct DocumentApi {
    api: ApiClient,
}

impl DocumentApi {
    pub fn new(api: ApiClient) -> Self {
        DocumentApi { api }
    }

    pub async fn list(&self) -> ClientResult<Vec<Document>> {
        self.api.get_json("documents").await
    }

    pub async fn create(&self, document: &NewDocument) -> ClientResult<Document> {
        let created: Document = self.api.send_json(Method::POST, "documents", document).await?;
        info!(id = %created.id, title = %created.title, "Document created");
        Ok(created)
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.api.delete(&format!("documents/{}", id)).await?;
        info!(id = %id, "Document deleted");
        Ok(())
    }

    /// Downloads the document as a `.txt` file.
    pub async fn download(&self, id: &str) -> ClientResult<Download> {
        self.api
            .download(&format!("documents/{}/file", id), "document.txt")
            .await
    }
}
