//! Insight report produced from a baseline set

use serde::{Deserialize, Serialize};

use super::characterization::AutomationPotential;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessLevel {
    High,
    Medium,
    Low,
}

impl From<AutomationPotential> for ReadinessLevel {
    fn from(potential: AutomationPotential) -> Self {
        match potential {
            AutomationPotential::High => ReadinessLevel::High,
            AutomationPotential::Medium => ReadinessLevel::Medium,
            AutomationPotential::Low => ReadinessLevel::Low,
        }
    }
}

/// Readiness across the three assessment axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessAssessment {
    #[serde(rename = "technical_readiness")]
    pub technical: ReadinessLevel,
    #[serde(rename = "operational_readiness")]
    pub operational: ReadinessLevel,
    #[serde(rename = "business_readiness")]
    pub business: ReadinessLevel,
}

/// Categorized insight sentences, recommendations and readiness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    pub technical_insights: Vec<String>,
    pub operational_insights: Vec<String>,
    pub business_insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub readiness: ReadinessAssessment,
}

impl InsightReport {
    /// Number of insight sentences across all categories
    pub fn insight_count(&self) -> usize {
        self.technical_insights.len() + self.operational_insights.len() + self.business_insights.len()
    }
}
