//! Baseline analysis request

use serde::{Deserialize, Serialize};

use super::characterization::RawCharacterization;

/// One request to compute baselines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineRequest {
    /// Free-form description of what the caller wants baselined
    pub user_query: String,

    /// Extracted use case document text, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_content: Option<String>,

    /// Caller-supplied characterization fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characterization: Option<RawCharacterization>,
}

impl BaselineRequest {
    pub fn new(user_query: impl Into<String>) -> Self {
        Self {
            user_query: user_query.into(),
            ..Default::default()
        }
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document_content = Some(document.into());
        self
    }

    pub fn with_characterization(mut self, raw: RawCharacterization) -> Self {
        self.characterization = Some(raw);
        self
    }

    /// Parse a single request from JSON text
    pub fn from_json(text: &str) -> ctower_common::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a batch of requests from a JSON array
    pub fn batch_from_json(text: &str) -> ctower_common::Result<Vec<Self>> {
        Ok(serde_json::from_str(text)?)
    }
}
