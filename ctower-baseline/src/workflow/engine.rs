//! Shared, immutable stage services
//!
//! One engine is built at startup and shared by every workflow instance
//! behind an `Arc`. It holds no per-task state.

use std::sync::Arc;

use ctower_common::config::{CalculationMode, TomlConfig};

use crate::error::StageError;
use crate::models::{BaselineRequest, BaselineSet, CharacterizationRecord, InsightReport};
use crate::range_table::RangeTable;
use crate::services::{
    BaselineResolver, CharacterizationNormalizer, CharacterizationSource, InsightSynthesizer,
};

pub struct BaselineEngine {
    source: Arc<dyn CharacterizationSource>,
    normalizer: CharacterizationNormalizer,
    resolver: BaselineResolver,
    synthesizer: InsightSynthesizer,
}

impl BaselineEngine {
    pub fn new(
        source: Arc<dyn CharacterizationSource>,
        table: Arc<RangeTable>,
        mode: CalculationMode,
    ) -> Self {
        Self {
            source,
            normalizer: CharacterizationNormalizer::new(),
            resolver: BaselineResolver::new(table, mode),
            synthesizer: InsightSynthesizer::new(mode),
        }
    }

    /// Build from bootstrap configuration
    ///
    /// Uses the configured `[range_table]` when present, the built-in table
    /// otherwise.
    pub fn from_config(
        config: &TomlConfig,
        source: Arc<dyn CharacterizationSource>,
    ) -> ctower_common::Result<Self> {
        let table = match &config.range_table {
            Some(raw) => {
                let table = RangeTable::from_config(raw)?;
                tracing::info!(
                    categories = table.category_count(),
                    metrics = table.metric_count(),
                    "Using configured range table"
                );
                table
            }
            None => RangeTable::standard(),
        };
        Ok(Self::new(source, Arc::new(table), config.engine.mode))
    }

    pub fn range_table(&self) -> &RangeTable {
        self.resolver.table()
    }

    pub fn mode(&self) -> CalculationMode {
        self.resolver.mode()
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Analysis stage: characterize the request and normalize the result
    pub(crate) async fn analyze(
        &self,
        request: &BaselineRequest,
    ) -> Result<CharacterizationRecord, StageError> {
        let raw = self
            .source
            .characterize(request)
            .await
            .map_err(|e| StageError::Source {
                provider: self.source.name().to_string(),
                message: e.to_string(),
            })?;
        Ok(self.normalizer.normalize(&raw, Some(&request.user_query)))
    }

    /// Baseline stage
    pub(crate) fn calculate(&self, record: &CharacterizationRecord) -> Result<BaselineSet, StageError> {
        self.resolver.resolve(record)
    }

    /// Insight stage
    pub(crate) fn synthesize(
        &self,
        baselines: &BaselineSet,
        record: &CharacterizationRecord,
    ) -> InsightReport {
        self.synthesizer.synthesize(baselines, record)
    }
}

impl std::fmt::Debug for BaselineEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaselineEngine")
            .field("source", &self.source.name())
            .field("mode", &self.mode())
            .finish()
    }
}
