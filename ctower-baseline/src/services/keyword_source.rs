//! Keyword-based characterization over document text
//!
//! Offline fallback for when no reasoning collaborator is available. Each
//! categorical field is inferred from whole-word keyword hits; performance
//! targets are the first percentage token in a clause that mentions
//! escalation or first contact resolution. A characterization carried on the
//! request overrides inferred fields one by one.

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use super::characterization_source::CharacterizationSource;
use crate::error::SourceError;
use crate::models::characterization::fields;
use crate::models::{
    AutomationPotential, BaselineRequest, ComplexityLevel, DomainType, RawCharacterization,
    ScenarioType, TaskComplexity, ToolMaturity,
};

fn words(pattern: &str) -> Result<Regex, SourceError> {
    Regex::new(&format!(r"(?i)\b(?:{})\b", pattern))
        .map_err(|e| SourceError::Unavailable(format!("keyword pattern failed to compile: {}", e)))
}

/// Keyword and percentage-token heuristics
#[derive(Debug, Clone)]
pub struct KeywordSource {
    simple_use_case: Regex,
    specialized_use_case: Regex,
    stable_domain: Regex,
    new_domain: Regex,
    mature_tools: Regex,
    technical_tasks: Regex,
    novel_tasks: Regex,
    simple_tasks: Regex,
    replacement: Regex,
    new_capability: Regex,
    fcr: Regex,
    clause_break: Regex,
    percent: Regex,
}

impl KeywordSource {
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self {
            simple_use_case: words("simple|basic|routine|faqs?")?,
            specialized_use_case: words("specialized|expert|advanced|complex technical")?,
            stable_domain: words("established|mature|stable|proven")?,
            new_domain: words("new|novel|emerging|experimental")?,
            mature_tools: words("well-defined|well defined|stable|reliable|mature")?,
            technical_tasks: words("technical support|technical issues")?,
            novel_tasks: words("novel|specialized|expert")?,
            simple_tasks: words("simple|basic|routine")?,
            replacement: words("replace|replaces|replaced|replacing|replacement")?,
            new_capability: words("new capability|new capabilities|new feature|new features")?,
            fcr: words("fcr")?,
            clause_break: Regex::new(r"[,;\n]|\.\s")
                .map_err(|e| SourceError::Unavailable(e.to_string()))?,
            percent: Regex::new(r"[<>]?\s*\d+(?:\.\d+)?\s*%")
                .map_err(|e| SourceError::Unavailable(e.to_string()))?,
        })
    }

    /// Infer a raw characterization from free text
    pub fn infer(&self, text: &str) -> RawCharacterization {
        let complexity = if self.simple_use_case.is_match(text) {
            ComplexityLevel::Simple
        } else if self.specialized_use_case.is_match(text) {
            ComplexityLevel::HighlySpecialized
        } else {
            ComplexityLevel::Complex
        };

        let domain = if self.stable_domain.is_match(text) {
            DomainType::Stable
        } else if self.new_domain.is_match(text) {
            DomainType::New
        } else {
            DomainType::Evolving
        };

        let tools = if self.mature_tools.is_match(text) {
            ToolMaturity::WellDefined
        } else {
            ToolMaturity::Experimental
        };

        let tasks = if self.technical_tasks.is_match(text) {
            TaskComplexity::Complex
        } else if self.novel_tasks.is_match(text) {
            TaskComplexity::Novel
        } else if self.simple_tasks.is_match(text) {
            TaskComplexity::Simple
        } else {
            TaskComplexity::Complex
        };

        let automation = if complexity == ComplexityLevel::Simple && tools == ToolMaturity::WellDefined {
            AutomationPotential::High
        } else {
            AutomationPotential::Medium
        };

        let scenario = if self.replacement.is_match(text) {
            ScenarioType::Replacement
        } else if self.new_capability.is_match(text) {
            ScenarioType::NewCapability
        } else {
            ScenarioType::Enhancement
        };

        let mut raw = RawCharacterization::new();
        raw.insert(fields::COMPLEXITY_LEVEL, complexity.as_str());
        raw.insert(fields::DOMAIN_TYPE, domain.as_str());
        raw.insert(fields::TOOL_MATURITY, tools.as_str());
        raw.insert(fields::TASK_COMPLEXITY, tasks.as_str());
        raw.insert(fields::AUTOMATION_POTENTIAL, automation.as_str());
        raw.insert(fields::SCENARIO_TYPE, scenario.as_str());

        if let Some(target) = self.clause_target(text, |clause| {
            clause.contains("escalat") && !clause.contains("without escalation")
        }) {
            raw.insert(fields::ESCALATION_TARGET, target);
        }
        if let Some(target) = self.clause_target(text, |clause| {
            clause.contains("first contact")
                || clause.contains("first-contact")
                || self.fcr.is_match(clause)
        }) {
            raw.insert(fields::FCR_TARGET, target);
        }

        raw
    }

    /// First percentage token in the first clause accepted by `mentions`
    fn clause_target(&self, text: &str, mentions: impl Fn(&str) -> bool) -> Option<String> {
        self.clause_break
            .split(text)
            .map(str::to_lowercase)
            .filter(|clause| mentions(clause))
            .find_map(|clause| {
                self.percent
                    .find(&clause)
                    .map(|m| m.as_str().chars().filter(|c| !c.is_whitespace()).collect())
            })
    }
}

#[async_trait]
impl CharacterizationSource for KeywordSource {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn characterize(&self, request: &BaselineRequest) -> Result<RawCharacterization, SourceError> {
        let text = request
            .document_content
            .as_deref()
            .unwrap_or(&request.user_query);
        let mut inferred = self.infer(text);
        debug!(fields = inferred.len(), "Inferred characterization from keywords");

        let Some(provided) = &request.characterization else {
            return Ok(inferred);
        };

        // A provided target in either shape replaces the scanned one
        for (flat, nested) in [
            (fields::ESCALATION_TARGET, fields::NESTED_ESCALATION),
            (fields::FCR_TARGET, fields::NESTED_FCR),
        ] {
            if provided.get(flat).is_some() || provided.performance_target(nested).is_some() {
                inferred.remove(flat);
            }
        }
        Ok(inferred.overlay(provided))
    }
}
