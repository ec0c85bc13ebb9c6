//! Baseline resolver
//!
//! Maps a characterization record onto range table buckets. Each metric has
//! one selector field; the recommended value is the bucket midpoint unless an
//! explicit escalation or first-contact-resolution target overrides it.

use std::sync::Arc;

use ctower_common::config::CalculationMode;
use tracing::{debug, warn};

use crate::error::StageError;
use crate::models::{
    AutomationPotential, BaselineSet, CharacterizationRecord, ComplexityLevel, DomainType,
    MetricBaseline, MetricName, ScenarioType, TaskComplexity, ToolMaturity,
};
use crate::range_table::{Range, RangeTable};

/// Guardrail bucket used in extended mode
pub const GUARDRAIL_BUCKET: &str = "moderate_requirements";

fn trajectory_bucket(level: ComplexityLevel) -> &'static str {
    match level {
        ComplexityLevel::Simple => "simple_queries",
        ComplexityLevel::HighlySpecialized => "highly_specialized",
        ComplexityLevel::Complex => "complex_multi_step",
    }
}

fn tool_bucket(maturity: ToolMaturity) -> &'static str {
    match maturity {
        ToolMaturity::WellDefined => "well_defined_tools",
        ToolMaturity::Unstable => "unstable_tools",
        ToolMaturity::Experimental => "experimental_tools",
    }
}

fn escalation_bucket(complexity: TaskComplexity) -> &'static str {
    match complexity {
        TaskComplexity::Simple => "simple_tasks",
        TaskComplexity::Novel => "novel_tasks",
        TaskComplexity::Complex => "complex_tasks",
    }
}

fn velocity_bucket(domain: DomainType) -> &'static str {
    match domain {
        DomainType::Stable => "stable_domain",
        DomainType::New => "new_domain",
        DomainType::Evolving => "evolving_domain",
    }
}

fn roi_bucket(potential: AutomationPotential) -> &'static str {
    match potential {
        AutomationPotential::High => "high_automation_potential",
        AutomationPotential::Low => "low_automation",
        AutomationPotential::Medium => "medium_automation",
    }
}

fn satisfaction_bucket(scenario: ScenarioType) -> &'static str {
    match scenario {
        ScenarioType::Replacement => "replacement_scenarios",
        ScenarioType::NewCapability => "new_capability_scenarios",
        ScenarioType::Enhancement => "enhancement_scenarios",
    }
}

/// Escalation override: `[max(t-5, 0), t+3]` recommending `t`
pub fn escalation_override(target: f64) -> MetricBaseline {
    MetricBaseline {
        min: (target - 5.0).max(0.0),
        max: target + 3.0,
        recommended: target,
        rationale: documented_target(target),
    }
}

/// First-contact-resolution override: `[max(t-10, 40), min(t+5, 95)]` recommending `t`
pub fn fcr_override(target: f64) -> MetricBaseline {
    MetricBaseline {
        min: (target - 10.0).max(40.0),
        max: (target + 5.0).min(95.0),
        recommended: target,
        rationale: documented_target(target),
    }
}

fn documented_target(target: f64) -> String {
    format!("Based on documented target of {}%", target)
}

/// Deterministic record → baseline set resolution over an injected table
#[derive(Debug, Clone)]
pub struct BaselineResolver {
    table: Arc<RangeTable>,
    mode: CalculationMode,
}

impl BaselineResolver {
    pub fn new(table: Arc<RangeTable>, mode: CalculationMode) -> Self {
        Self { table, mode }
    }

    pub fn table(&self) -> &RangeTable {
        &self.table
    }

    pub fn mode(&self) -> CalculationMode {
        self.mode
    }

    /// Resolve every metric for the record
    ///
    /// # Errors
    ///
    /// `StageError::MissingBucket` if the table lacks a selected bucket,
    /// `StageError::InconsistentBaseline` if a result breaks
    /// `min <= recommended <= max`.
    pub fn resolve(&self, record: &CharacterizationRecord) -> Result<BaselineSet, StageError> {
        let mut entries = vec![
            (
                MetricName::TrajectoryComplexity,
                self.bucketed(
                    MetricName::TrajectoryComplexity,
                    trajectory_bucket(record.complexity_level),
                    format!("Based on {} complexity level", record.complexity_level),
                )?,
            ),
            (
                MetricName::ToolUtilization,
                self.bucketed(
                    MetricName::ToolUtilization,
                    tool_bucket(record.tool_maturity),
                    format!("Based on {} tool maturity", record.tool_maturity),
                )?,
            ),
            (MetricName::TaskEscalationRate, self.escalation(record)?),
            (MetricName::FirstContactResolution, self.first_contact_resolution(record)?),
            (
                MetricName::ImprovementVelocity,
                self.bucketed(
                    MetricName::ImprovementVelocity,
                    velocity_bucket(record.domain_type),
                    format!("Based on {} domain characteristics", record.domain_type),
                )?,
            ),
            (
                MetricName::CostSavingsRoi,
                self.bucketed(
                    MetricName::CostSavingsRoi,
                    roi_bucket(record.automation_potential),
                    format!("Based on {} automation potential", record.automation_potential),
                )?,
            ),
            (
                MetricName::CustomerSatisfactionImprovement,
                self.bucketed(
                    MetricName::CustomerSatisfactionImprovement,
                    satisfaction_bucket(record.scenario_type),
                    format!("Based on {} scenario type", record.scenario_type),
                )?,
            ),
        ];

        if self.mode == CalculationMode::Extended {
            entries.push((
                MetricName::GuardrailViolations,
                self.bucketed(
                    MetricName::GuardrailViolations,
                    GUARDRAIL_BUCKET,
                    "Based on moderate safety requirements for customer service".to_string(),
                )?,
            ));
        }

        for (metric, baseline) in &entries {
            if !baseline.is_consistent() {
                return Err(StageError::InconsistentBaseline {
                    metric: metric.to_string(),
                    min: baseline.min,
                    max: baseline.max,
                    recommended: baseline.recommended,
                });
            }
        }

        debug!(metrics = entries.len(), mode = ?self.mode, "Resolved baselines");
        Ok(entries.into_iter().collect())
    }

    fn range(&self, metric: MetricName, bucket: &str) -> Result<Range, StageError> {
        self.table
            .lookup(metric.table_category(), metric.table_metric(), bucket)
            .ok_or_else(|| StageError::MissingBucket {
                category: metric.table_category().to_string(),
                metric: metric.table_metric().to_string(),
                bucket: bucket.to_string(),
            })
    }

    fn bucketed(
        &self,
        metric: MetricName,
        bucket: &str,
        rationale: String,
    ) -> Result<MetricBaseline, StageError> {
        let range = self.range(metric, bucket)?;
        Ok(MetricBaseline::midpoint(range.min, range.max, rationale))
    }

    fn escalation(&self, record: &CharacterizationRecord) -> Result<MetricBaseline, StageError> {
        if let Some(target) = record.explicit_escalation_target_pct {
            let baseline = escalation_override(target);
            if baseline.is_consistent() {
                return Ok(baseline);
            }
            warn!(target_pct = target, "Escalation target outside valid range, using categorical bucket");
        }
        self.bucketed(
            MetricName::TaskEscalationRate,
            escalation_bucket(record.task_complexity),
            format!("Based on {} task complexity", record.task_complexity),
        )
    }

    fn first_contact_resolution(
        &self,
        record: &CharacterizationRecord,
    ) -> Result<MetricBaseline, StageError> {
        if let Some(target) = record.explicit_fcr_target_pct {
            let baseline = fcr_override(target);
            if baseline.is_consistent() {
                return Ok(baseline);
            }
            warn!(target_pct = target, "First contact resolution target outside valid range, using categorical bucket");
        }

        let (bucket, rationale) = if record.task_complexity == TaskComplexity::Simple {
            ("simple_inquiries", "Based on simple inquiry type".to_string())
        } else if record.mentions_technical() {
            ("technical_problems", "Based on technical problem inquiry type".to_string())
        } else {
            (
                "complex_issues",
                format!("Based on {} inquiry type", record.task_complexity),
            )
        };
        self.bucketed(MetricName::FirstContactResolution, bucket, rationale)
    }
}
