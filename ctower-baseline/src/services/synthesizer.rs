//! Insight synthesizer
//!
//! Renders one sentence per resolved metric into its category, followed by
//! characterization-driven recommendations and a readiness assessment.

use ctower_common::config::CalculationMode;

use crate::models::{
    BaselineSet, CharacterizationRecord, ComplexityLevel, DomainType, InsightReport,
    MetricBaseline, MetricCategory, MetricName, ReadinessAssessment, ReadinessLevel,
};

pub const SIMPLE_COMPLEXITY_RECOMMENDATION: &str =
    "Focus on high throughput and consistent performance metrics";
pub const SPECIALIZED_COMPLEXITY_RECOMMENDATION: &str =
    "Prioritize accuracy and expert-level reasoning capabilities";
pub const BALANCED_COMPLEXITY_RECOMMENDATION: &str =
    "Balance efficiency with comprehensive problem-solving";

pub const NEW_DOMAIN_RECOMMENDATION: &str = "Plan for rapid learning and adaptation phases";
pub const STABLE_DOMAIN_RECOMMENDATION: &str = "Optimize for reliability and minimal variance";
pub const EVOLVING_DOMAIN_RECOMMENDATION: &str = "Build flexibility for evolving requirements";

/// Best-practice sentences appended in extended mode
pub const EXTENDED_RECOMMENDATIONS: [&str; 2] = [
    "Implement progressive escalation pathways for complex issues",
    "Monitor tool performance and adjust utilization targets accordingly",
];

/// Render the insight sentence for one metric
///
/// Range bounds print as-is (`20`, `0.5`); the recommended value is rounded
/// to the precision of the metric's unit.
pub fn insight_sentence(metric: MetricName, baseline: &MetricBaseline) -> String {
    let MetricBaseline {
        min,
        max,
        recommended,
        rationale,
    } = baseline;

    match metric {
        MetricName::TrajectoryComplexity => format!(
            "Trajectory complexity should be {:.0} on average (range: {}-{}). {}.",
            recommended, min, max, rationale
        ),
        MetricName::ToolUtilization => format!(
            "Tool utilization should target {:.0}% (range: {}-{}%). {}.",
            recommended, min, max, rationale
        ),
        MetricName::TaskEscalationRate => format!(
            "Task escalation rate should be {:.1}% (range: {}-{}%). {}.",
            recommended, min, max, rationale
        ),
        MetricName::FirstContactResolution => format!(
            "First contact resolution should achieve {:.0}% (range: {}-{}%). {}.",
            recommended, min, max, rationale
        ),
        MetricName::ImprovementVelocity => format!(
            "Improvement velocity should be {:.1}% monthly (range: {}-{}% monthly). {}.",
            recommended, min, max, rationale
        ),
        MetricName::GuardrailViolations => format!(
            "Guardrail violation rate should be held to {:.1}% (range: {}-{}%). {}.",
            recommended, min, max, rationale
        ),
        MetricName::CostSavingsRoi => format!(
            "Expected ROI should be {:.1}x (range: {}-{}x). {}.",
            recommended, min, max, rationale
        ),
        MetricName::CustomerSatisfactionImprovement => format!(
            "Customer satisfaction improvement should be {:.0}% (range: {}-{}%). {}.",
            recommended, min, max, rationale
        ),
    }
}

fn complexity_recommendation(level: ComplexityLevel) -> &'static str {
    match level {
        ComplexityLevel::Simple => SIMPLE_COMPLEXITY_RECOMMENDATION,
        ComplexityLevel::HighlySpecialized => SPECIALIZED_COMPLEXITY_RECOMMENDATION,
        ComplexityLevel::Complex => BALANCED_COMPLEXITY_RECOMMENDATION,
    }
}

fn domain_recommendation(domain: DomainType) -> &'static str {
    match domain {
        DomainType::New => NEW_DOMAIN_RECOMMENDATION,
        DomainType::Stable => STABLE_DOMAIN_RECOMMENDATION,
        DomainType::Evolving => EVOLVING_DOMAIN_RECOMMENDATION,
    }
}

/// Readiness derived from the originating record
pub fn assess_readiness(record: &CharacterizationRecord) -> ReadinessAssessment {
    ReadinessAssessment {
        technical: if record.complexity_level != ComplexityLevel::Complex {
            ReadinessLevel::High
        } else {
            ReadinessLevel::Medium
        },
        operational: if record.domain_type == DomainType::Stable {
            ReadinessLevel::High
        } else {
            ReadinessLevel::Medium
        },
        business: record.automation_potential.into(),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InsightSynthesizer {
    mode: CalculationMode,
}

impl InsightSynthesizer {
    pub fn new(mode: CalculationMode) -> Self {
        Self { mode }
    }

    pub fn synthesize(&self, baselines: &BaselineSet, record: &CharacterizationRecord) -> InsightReport {
        let mut technical_insights = Vec::new();
        let mut operational_insights = Vec::new();
        let mut business_insights = Vec::new();

        for (metric, baseline) in baselines.iter() {
            let sentence = insight_sentence(metric, baseline);
            match metric.category() {
                MetricCategory::Technical => technical_insights.push(sentence),
                MetricCategory::Operational => operational_insights.push(sentence),
                MetricCategory::Business => business_insights.push(sentence),
            }
        }

        let mut recommendations = vec![
            complexity_recommendation(record.complexity_level).to_string(),
            domain_recommendation(record.domain_type).to_string(),
        ];
        if self.mode == CalculationMode::Extended {
            recommendations.extend(EXTENDED_RECOMMENDATIONS.iter().map(|s| s.to_string()));
        }

        InsightReport {
            technical_insights,
            operational_insights,
            business_insights,
            recommendations,
            readiness: assess_readiness(record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AutomationPotential, TaskComplexity};
    use crate::range_table::RangeTable;
    use crate::services::resolver::{escalation_override, BaselineResolver};
    use std::sync::Arc;

    fn resolve(record: &CharacterizationRecord, mode: CalculationMode) -> BaselineSet {
        BaselineResolver::new(Arc::new(RangeTable::standard()), mode)
            .resolve(record)
            .unwrap()
    }

    #[test]
    fn test_sentences_land_in_categories() {
        let record = CharacterizationRecord::default();
        let report = InsightSynthesizer::new(CalculationMode::Standard)
            .synthesize(&resolve(&record, CalculationMode::Standard), &record);

        assert_eq!(report.technical_insights.len(), 2);
        assert_eq!(report.operational_insights.len(), 3);
        assert_eq!(report.business_insights.len(), 2);
        assert_eq!(
            report.technical_insights[0],
            "Trajectory complexity should be 50 on average (range: 40-60). Based on complex complexity level."
        );
        assert_eq!(
            report.operational_insights[0],
            "Task escalation rate should be 20.0% (range: 15-25%). Based on complex task complexity."
        );
        assert_eq!(
            report.business_insights[0],
            "Expected ROI should be 3.5x (range: 2-5x). Based on medium automation potential."
        );
    }

    #[test]
    fn test_override_sentence_mentions_documented_target() {
        let sentence = insight_sentence(MetricName::TaskEscalationRate, &escalation_override(15.0));
        assert_eq!(
            sentence,
            "Task escalation rate should be 15.0% (range: 10-18%). Based on documented target of 15%."
        );
    }

    #[test]
    fn test_recommendations_follow_complexity_then_domain() {
        let record = CharacterizationRecord {
            complexity_level: ComplexityLevel::Simple,
            domain_type: DomainType::New,
            ..Default::default()
        };
        let report = InsightSynthesizer::new(CalculationMode::Standard)
            .synthesize(&resolve(&record, CalculationMode::Standard), &record);
        assert_eq!(
            report.recommendations,
            vec![SIMPLE_COMPLEXITY_RECOMMENDATION, NEW_DOMAIN_RECOMMENDATION]
        );
    }

    #[test]
    fn test_extended_mode_appends_best_practices_and_guardrail() {
        let record = CharacterizationRecord::default();
        let report = InsightSynthesizer::new(CalculationMode::Extended)
            .synthesize(&resolve(&record, CalculationMode::Extended), &record);

        assert_eq!(report.recommendations.len(), 4);
        assert_eq!(report.recommendations[2], EXTENDED_RECOMMENDATIONS[0]);
        assert_eq!(report.operational_insights.len(), 4);
        assert!(report.operational_insights[3].starts_with("Guardrail violation rate should be held to 1.5%"));
    }

    #[test]
    fn test_readiness_rules() {
        let record = CharacterizationRecord {
            complexity_level: ComplexityLevel::HighlySpecialized,
            domain_type: DomainType::Stable,
            automation_potential: AutomationPotential::Low,
            task_complexity: TaskComplexity::Novel,
            ..Default::default()
        };
        let readiness = assess_readiness(&record);
        assert_eq!(readiness.technical, ReadinessLevel::High);
        assert_eq!(readiness.operational, ReadinessLevel::High);
        assert_eq!(readiness.business, ReadinessLevel::Low);

        let default = assess_readiness(&CharacterizationRecord::default());
        assert_eq!(default.technical, ReadinessLevel::Medium);
        assert_eq!(default.operational, ReadinessLevel::Medium);
        assert_eq!(default.business, ReadinessLevel::Medium);
    }

    #[test]
    fn test_empty_set_yields_no_insights() {
        let report = InsightSynthesizer::default()
            .synthesize(&BaselineSet::default(), &CharacterizationRecord::default());
        assert_eq!(report.insight_count(), 0);
        assert_eq!(report.recommendations.len(), 2);
    }
}
