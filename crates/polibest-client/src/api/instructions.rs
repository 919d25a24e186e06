//! # Instruction API
//!
//! The instruction library: text articles and attached PDF/image files.

use polibest_core::library::{Instruction, InstructionInput};
use reqwest::Method;
use tracing::info;

use super::{ApiClient, Download};
use crate::error::ClientResult;

/// Instruction endpoints.
#[derive(Debug, Clone)]
pub struct InstructionApi {
    api: ApiClient,
}

impl InstructionApi {
    pub fn new(api: ApiClient) -> Self {
        InstructionApi { api }
    }

    pub async fn list(&self) -> ClientResult<Vec<Instruction>> {
        self.api.get_json("instructions").await
    }

    pub async fn create(&self, input: &InstructionInput) -> ClientResult<Instruction> {
        input.validate()?;
        let created: Instruction = self.api.send_json(Method::POST, "instructions", input).await?;
        info!(id = %created.id, category = %created.category, "Instruction created");
        Ok(created)
    }

    pub async fn update(&self, id: &str, input: &InstructionInput) -> ClientResult<Instruction> {
        input.validate()?;
        self.api
            .send_json(Method::PUT, &format!("instructions/{}", id), input)
            .await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.api.delete(&format!("instructions/{}", id)).await?;
        info!(id = %id, "Instruction deleted");
        Ok(())
    }

    /// Downloads the attached file. 404 when the instruction has none.
    pub async fn download(&self, id: &str) -> ClientResult<Download> {
        self.api
            .download(&format!("instructions/{}/file", id), "instruction.bin")
            .await
    }
}
