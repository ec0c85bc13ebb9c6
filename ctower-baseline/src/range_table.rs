//! Static range table: category → metric → bucket → [min, max]
//!
//! The table is built once at startup (built-in or from the `[range_table]`
//! config section), validated, and shared read-only behind an `Arc`.

use ctower_common::config::RangeTableConfig;
use ctower_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Closed numeric interval for one bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

impl From<[f64; 2]> for Range {
    fn from([min, max]: [f64; 2]) -> Self {
        Self { min, max }
    }
}

impl From<Range> for [f64; 2] {
    fn from(range: Range) -> Self {
        [range.min, range.max]
    }
}

type Buckets = BTreeMap<String, Range>;

/// Read-only range table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RangeTable {
    categories: BTreeMap<String, BTreeMap<String, Buckets>>,
}

/// Built-in buckets: (category, metric, bucket, min, max)
const STANDARD_BUCKETS: &[(&str, &str, &str, f64, f64)] = &[
    ("technical_metrics", "trajectory_complexity", "simple_queries", 20.0, 30.0),
    ("technical_metrics", "trajectory_complexity", "complex_multi_step", 40.0, 60.0),
    ("technical_metrics", "trajectory_complexity", "highly_specialized", 60.0, 80.0),
    ("technical_metrics", "tool_utilization", "well_defined_tools", 80.0, 95.0),
    ("technical_metrics", "tool_utilization", "experimental_tools", 60.0, 80.0),
    ("technical_metrics", "tool_utilization", "unstable_tools", 40.0, 60.0),
    ("solution_level_kpis", "task_escalation_rate", "simple_tasks", 5.0, 10.0),
    ("solution_level_kpis", "task_escalation_rate", "complex_tasks", 15.0, 25.0),
    ("solution_level_kpis", "task_escalation_rate", "novel_tasks", 25.0, 40.0),
    ("solution_level_kpis", "first_contact_resolution", "simple_inquiries", 80.0, 90.0),
    ("solution_level_kpis", "first_contact_resolution", "complex_issues", 60.0, 75.0),
    ("solution_level_kpis", "first_contact_resolution", "technical_problems", 40.0, 60.0),
    ("learning_safety_metrics", "improvement_velocity", "stable_domain", 3.0, 5.0),
    ("learning_safety_metrics", "improvement_velocity", "evolving_domain", 5.0, 10.0),
    ("learning_safety_metrics", "improvement_velocity", "new_domain", 10.0, 20.0),
    ("learning_safety_metrics", "guardrail_violations", "strict_requirements", 0.0, 0.5),
    ("learning_safety_metrics", "guardrail_violations", "moderate_requirements", 1.0, 2.0),
    ("learning_safety_metrics", "guardrail_violations", "lenient_requirements", 2.0, 5.0),
    ("business_metrics", "cost_savings", "high_automation_potential", 5.0, 10.0),
    ("business_metrics", "cost_savings", "medium_automation", 2.0, 5.0),
    ("business_metrics", "cost_savings", "low_automation", 1.0, 2.0),
    ("business_metrics", "customer_satisfaction", "replacement_scenarios", 10.0, 20.0),
    ("business_metrics", "customer_satisfaction", "enhancement_scenarios", 5.0, 15.0),
    ("business_metrics", "customer_satisfaction", "new_capability_scenarios", 0.0, 10.0),
];

impl RangeTable {
    /// Built-in industry baseline ranges
    pub fn standard() -> Self {
        let mut categories: BTreeMap<String, BTreeMap<String, Buckets>> = BTreeMap::new();
        for (category, metric, bucket, min, max) in STANDARD_BUCKETS {
            categories
                .entry(category.to_string())
                .or_default()
                .entry(metric.to_string())
                .or_default()
                .insert(bucket.to_string(), Range::new(*min, *max));
        }
        Self { categories }
    }

    /// Build from the `[range_table]` config section and validate it
    pub fn from_config(config: &RangeTableConfig) -> Result<Self> {
        let categories = config
            .iter()
            .map(|(category, metrics)| {
                let metrics = metrics
                    .iter()
                    .map(|(metric, buckets)| {
                        let buckets = buckets
                            .iter()
                            .map(|(bucket, pair)| (bucket.clone(), Range::from(*pair)))
                            .collect();
                        (metric.clone(), buckets)
                    })
                    .collect();
                (category.clone(), metrics)
            })
            .collect();

        let table = Self { categories };
        table.validate()?;
        Ok(table)
    }

    /// Every range must be finite with `min <= max`
    pub fn validate(&self) -> Result<()> {
        for (category, metrics) in &self.categories {
            for (metric, buckets) in metrics {
                for (bucket, range) in buckets {
                    if !range.is_valid() {
                        return Err(Error::InvalidInput(format!(
                            "Range {}.{}.{} is invalid: [{}, {}]",
                            category, metric, bucket, range.min, range.max
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn lookup(&self, category: &str, metric: &str, bucket: &str) -> Option<Range> {
        self.categories
            .get(category)?
            .get(metric)?
            .get(bucket)
            .copied()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Total metrics across all categories
    pub fn metric_count(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }
}

impl Default for RangeTable {
    fn default() -> Self {
        Self::standard()
    }
}
