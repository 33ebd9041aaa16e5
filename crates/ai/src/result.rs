use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Outcome of a prediction job: a score plus how it was reached.
///
/// Informational only; nothing here is ever written back to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiResult {
    /// Job-specific score (for low stock: how many items were flagged).
    pub score: f64,
    pub explanation: Option<String>,
    /// Job kind, parameters and the flagged records.
    pub metadata: JsonValue,
}

impl AiResult {
    pub fn scored(score: f64) -> Self {
        Self {
            score,
            explanation: None,
            metadata: JsonValue::Null,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AiError {
    #[error("invalid job input: {0}")]
    InvalidInput(String),
}
