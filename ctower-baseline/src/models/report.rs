//! Final aggregated report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::baseline::BaselineSet;
use super::characterization::{
    AutomationPotential, CharacterizationRecord, ComplexityLevel, DomainType,
};
use super::insight::{InsightReport, ReadinessAssessment};

/// Placeholder used in the summary when no analysis result exists yet
pub const UNKNOWN: &str = "unknown";

/// Aggregated output of one workflow
///
/// Fields whose stage has not run yet hold placeholders (`None`, an empty
/// baseline set, or `"unknown"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub timestamp: DateTime<Utc>,
    pub user_query: String,
    pub analysis: Option<CharacterizationRecord>,
    pub baseline_calculations: BaselineCalculations,
    pub comparison_results: ComparisonResults,
    pub summary: ReportSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineCalculations {
    pub calculated_baselines: BaselineSet,
    pub summary: Option<BaselineSummary>,
}

/// Characterization echo next to the calculated baselines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineSummary {
    pub total_metrics: usize,
    pub complexity_assessment: ComplexityLevel,
    pub domain_maturity: DomainType,
    pub automation_readiness: AutomationPotential,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResults {
    pub insights: Option<InsightReport>,
    pub readiness_assessment: Option<ReadinessAssessment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_metrics_analyzed: usize,
    pub complexity_level: String,
    pub domain_type: String,
    pub readiness_assessment: Option<ReadinessAssessment>,
}

impl FinalReport {
    /// Assemble a report from whatever stage outputs exist
    pub fn assemble(
        user_query: &str,
        analysis: Option<&CharacterizationRecord>,
        baselines: Option<&BaselineSet>,
        insights: Option<&InsightReport>,
    ) -> Self {
        let calculated_baselines = baselines.cloned().unwrap_or_default();
        let total_metrics = calculated_baselines.len();

        let baseline_summary = match (analysis, baselines) {
            (Some(record), Some(set)) => Some(BaselineSummary {
                total_metrics: set.len(),
                complexity_assessment: record.complexity_level,
                domain_maturity: record.domain_type,
                automation_readiness: record.automation_potential,
            }),
            _ => None,
        };

        let readiness = insights.map(|report| report.readiness);

        Self {
            timestamp: ctower_common::time::now(),
            user_query: user_query.to_string(),
            analysis: analysis.cloned(),
            baseline_calculations: BaselineCalculations {
                calculated_baselines,
                summary: baseline_summary,
            },
            comparison_results: ComparisonResults {
                insights: insights.cloned(),
                readiness_assessment: readiness,
            },
            summary: ReportSummary {
                total_metrics_analyzed: total_metrics,
                complexity_level: analysis
                    .map(|r| r.complexity_level.to_string())
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                domain_type: analysis
                    .map(|r| r.domain_type.to_string())
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                readiness_assessment: readiness,
            },
        }
    }

    /// True when at least one stage output is missing
    pub fn is_partial(&self) -> bool {
        self.analysis.is_none()
            || self.baseline_calculations.summary.is_none()
            || self.comparison_results.insights.is_none()
    }
}
