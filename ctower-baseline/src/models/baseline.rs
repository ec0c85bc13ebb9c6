//! Metric baselines and the ordered baseline set

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Baseline metric names, ordered as they appear in reports
///
/// Declaration order drives `Ord`, so a `BTreeMap<MetricName, _>` iterates in
/// report order with `guardrail_violations` after `improvement_velocity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    TrajectoryComplexity,
    ToolUtilization,
    TaskEscalationRate,
    FirstContactResolution,
    ImprovementVelocity,
    GuardrailViolations,
    CostSavingsRoi,
    CustomerSatisfactionImprovement,
}

/// Which insight list a metric's sentence belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricCategory {
    Technical,
    Operational,
    Business,
}

impl MetricName {
    pub const ALL: [MetricName; 8] = [
        MetricName::TrajectoryComplexity,
        MetricName::ToolUtilization,
        MetricName::TaskEscalationRate,
        MetricName::FirstContactResolution,
        MetricName::ImprovementVelocity,
        MetricName::GuardrailViolations,
        MetricName::CostSavingsRoi,
        MetricName::CustomerSatisfactionImprovement,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricName::TrajectoryComplexity => "trajectory_complexity",
            MetricName::ToolUtilization => "tool_utilization",
            MetricName::TaskEscalationRate => "task_escalation_rate",
            MetricName::FirstContactResolution => "first_contact_resolution",
            MetricName::ImprovementVelocity => "improvement_velocity",
            MetricName::GuardrailViolations => "guardrail_violations",
            MetricName::CostSavingsRoi => "cost_savings_roi",
            MetricName::CustomerSatisfactionImprovement => "customer_satisfaction_improvement",
        }
    }

    /// Range table category holding this metric's buckets
    pub fn table_category(self) -> &'static str {
        match self {
            MetricName::TrajectoryComplexity | MetricName::ToolUtilization => "technical_metrics",
            MetricName::TaskEscalationRate | MetricName::FirstContactResolution => {
                "solution_level_kpis"
            }
            MetricName::ImprovementVelocity | MetricName::GuardrailViolations => {
                "learning_safety_metrics"
            }
            MetricName::CostSavingsRoi | MetricName::CustomerSatisfactionImprovement => {
                "business_metrics"
            }
        }
    }

    /// Metric key inside the range table category
    ///
    /// Business metrics are keyed by their short table names.
    pub fn table_metric(self) -> &'static str {
        match self {
            MetricName::CostSavingsRoi => "cost_savings",
            MetricName::CustomerSatisfactionImprovement => "customer_satisfaction",
            other => other.as_str(),
        }
    }

    pub fn category(self) -> MetricCategory {
        match self {
            MetricName::TrajectoryComplexity | MetricName::ToolUtilization => {
                MetricCategory::Technical
            }
            MetricName::TaskEscalationRate
            | MetricName::FirstContactResolution
            | MetricName::ImprovementVelocity
            | MetricName::GuardrailViolations => MetricCategory::Operational,
            MetricName::CostSavingsRoi | MetricName::CustomerSatisfactionImprovement => {
                MetricCategory::Business
            }
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quantitative baseline for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricBaseline {
    pub min: f64,
    pub max: f64,
    pub recommended: f64,
    pub rationale: String,
}

impl MetricBaseline {
    /// Baseline recommending the midpoint of `[min, max]`
    pub fn midpoint(min: f64, max: f64, rationale: impl Into<String>) -> Self {
        Self {
            min,
            max,
            recommended: (min + max) / 2.0,
            rationale: rationale.into(),
        }
    }

    /// `min <= recommended <= max` with finite values
    pub fn is_consistent(&self) -> bool {
        [self.min, self.max, self.recommended].iter().all(|v| v.is_finite())
            && self.min <= self.recommended
            && self.recommended <= self.max
    }
}

/// Ordered mapping of metric names to baselines
///
/// Built once per run by the resolver. There is no mutation API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaselineSet(BTreeMap<MetricName, MetricBaseline>);

impl BaselineSet {
    pub fn get(&self, metric: MetricName) -> Option<&MetricBaseline> {
        self.0.get(&metric)
    }

    pub fn contains(&self, metric: MetricName) -> bool {
        self.0.contains_key(&metric)
    }

    /// Entries in report order
    pub fn iter(&self) -> impl Iterator<Item = (MetricName, &MetricBaseline)> {
        self.0.iter().map(|(name, baseline)| (*name, baseline))
    }

    pub fn metric_names(&self) -> Vec<MetricName> {
        self.0.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(MetricName, MetricBaseline)> for BaselineSet {
    fn from_iter<I: IntoIterator<Item = (MetricName, MetricBaseline)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
