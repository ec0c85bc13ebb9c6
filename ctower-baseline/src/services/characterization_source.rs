//! Characterization producers
//!
//! A source turns a request into the raw characterization map the normalizer
//! consumes. Sources are the only place a workflow suspends on an external
//! collaborator (a reasoning service, a human form, a keyword scan).

use async_trait::async_trait;
use tracing::debug;

use crate::error::SourceError;
use crate::models::{BaselineRequest, RawCharacterization};

/// Producer of raw characterizations
#[async_trait]
pub trait CharacterizationSource: Send + Sync {
    /// Source identifier used in logs and error messages
    fn name(&self) -> &'static str;

    /// Produce a raw characterization for the request
    ///
    /// # Returns
    /// * `Ok(RawCharacterization)` - Any subset of the known fields
    /// * `Err(SourceError)` - Producer failed; fatal for the workflow
    async fn characterize(&self, request: &BaselineRequest) -> Result<RawCharacterization, SourceError>;
}

/// Passes through the characterization carried on the request
///
/// A request without one yields an empty map, which normalizes to all
/// defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvidedSource;

#[async_trait]
impl CharacterizationSource for ProvidedSource {
    fn name(&self) -> &'static str {
        "provided"
    }

    async fn characterize(&self, request: &BaselineRequest) -> Result<RawCharacterization, SourceError> {
        match &request.characterization {
            Some(raw) => Ok(raw.clone()),
            None => {
                debug!("Request carries no characterization, defaults will apply");
                Ok(RawCharacterization::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::characterization::fields;

    #[tokio::test]
    async fn test_provided_source_passes_map_through() {
        let mut raw = RawCharacterization::new();
        raw.insert(fields::SCENARIO_TYPE, "replacement");
        let request = BaselineRequest::new("q").with_characterization(raw.clone());

        let produced = ProvidedSource.characterize(&request).await.unwrap();
        assert_eq!(produced, raw);
    }

    #[tokio::test]
    async fn test_provided_source_without_map_is_empty() {
        let produced = ProvidedSource
            .characterize(&BaselineRequest::new("q"))
            .await
            .unwrap();
        assert!(produced.is_empty());
        assert_eq!(ProvidedSource.name(), "provided");
    }
}
