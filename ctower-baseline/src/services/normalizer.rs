//! Characterization normalizer
//!
//! Turns a raw, partial characterization into a complete record. Never fails:
//! unknown categorical values fall back to defaults and unparsable numeric
//! targets are left absent.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::models::characterization::fields;
use crate::models::{
    AutomationPotential, CharacterizationRecord, ComplexityLevel, DomainType, RawCharacterization,
    ScenarioType, TaskComplexity, ToolMaturity,
};

/// Malformed numeric target; recovered by treating the target as absent
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TargetParseError {
    #[error("empty target")]
    Empty,

    #[error("not a number: '{0}'")]
    NotANumber(String),

    #[error("non-finite target")]
    NonFinite,

    #[error("unsupported target type")]
    UnsupportedType,
}

/// Parse a free-form percentage target such as `"<15%"`, `"75%"` or `"12.5"`
///
/// Strips one leading `<` or `>` and one trailing `%`, trims whitespace and
/// parses the remainder as a finite float.
pub fn parse_target_pct(raw: &str) -> Result<f64, TargetParseError> {
    let trimmed = raw.trim();
    let without_bound = trimmed
        .strip_prefix('<')
        .or_else(|| trimmed.strip_prefix('>'))
        .unwrap_or(trimmed)
        .trim();
    let number = without_bound
        .strip_suffix('%')
        .unwrap_or(without_bound)
        .trim();

    if number.is_empty() {
        return Err(TargetParseError::Empty);
    }

    let value: f64 = number
        .parse()
        .map_err(|_| TargetParseError::NotANumber(raw.to_string()))?;

    if !value.is_finite() {
        return Err(TargetParseError::NonFinite);
    }
    Ok(value)
}

fn parse_target_value(value: &Value) -> Result<f64, TargetParseError> {
    match value {
        Value::String(s) => parse_target_pct(s),
        Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or(TargetParseError::NonFinite),
        _ => Err(TargetParseError::UnsupportedType),
    }
}

/// Stateless normalizer from raw fields to a canonical record
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterizationNormalizer;

impl CharacterizationNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize `raw` into a complete record, carrying `context` along
    pub fn normalize(&self, raw: &RawCharacterization, context: Option<&str>) -> CharacterizationRecord {
        CharacterizationRecord {
            complexity_level: categorical(raw, fields::COMPLEXITY_LEVEL, ComplexityLevel::from_raw),
            tool_maturity: categorical(raw, fields::TOOL_MATURITY, ToolMaturity::from_raw),
            domain_type: categorical(raw, fields::DOMAIN_TYPE, DomainType::from_raw),
            task_complexity: categorical(raw, fields::TASK_COMPLEXITY, TaskComplexity::from_raw),
            automation_potential: categorical(
                raw,
                fields::AUTOMATION_POTENTIAL,
                AutomationPotential::from_raw,
            ),
            scenario_type: categorical(raw, fields::SCENARIO_TYPE, ScenarioType::from_raw),
            explicit_escalation_target_pct: target(
                raw,
                fields::ESCALATION_TARGET,
                fields::NESTED_ESCALATION,
            ),
            explicit_fcr_target_pct: target(raw, fields::FCR_TARGET, fields::NESTED_FCR),
            context: context.map(str::to_string),
        }
    }
}

fn categorical<T>(raw: &RawCharacterization, field: &str, parse: fn(&str) -> Option<T>) -> T
where
    T: Default + std::fmt::Display,
{
    match raw.get_str(field).and_then(parse) {
        Some(value) => value,
        None => {
            let fallback = T::default();
            debug!(
                field,
                raw = ?raw.get(field),
                default = %fallback,
                "Substituting default for missing or unrecognized field"
            );
            fallback
        }
    }
}

/// Flat field takes precedence over the nested `performance_targets` entry
fn target(raw: &RawCharacterization, flat: &str, nested: &str) -> Option<f64> {
    let value = raw.get(flat).or_else(|| raw.performance_target(nested))?;
    match parse_target_value(value) {
        Ok(pct) => Some(pct),
        Err(e) => {
            debug!(field = flat, raw = %value, error = %e, "Ignoring unparsable target");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawCharacterization {
        RawCharacterization::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_target_forms() {
        assert_eq!(parse_target_pct("<15%"), Ok(15.0));
        assert_eq!(parse_target_pct(">70%"), Ok(70.0));
        assert_eq!(parse_target_pct("75%"), Ok(75.0));
        assert_eq!(parse_target_pct(" 12.5 % "), Ok(12.5));
        assert_eq!(parse_target_pct("< 8%"), Ok(8.0));
        assert_eq!(parse_target_pct("30"), Ok(30.0));
    }

    #[test]
    fn test_parse_target_failures() {
        assert_eq!(parse_target_pct(""), Err(TargetParseError::Empty));
        assert_eq!(parse_target_pct("%"), Err(TargetParseError::Empty));
        assert!(matches!(
            parse_target_pct("about fifteen"),
            Err(TargetParseError::NotANumber(_))
        ));
        assert!(matches!(parse_target_pct("<<15%"), Err(TargetParseError::NotANumber(_))));
        assert_eq!(parse_target_pct("inf"), Err(TargetParseError::NonFinite));
        assert_eq!(parse_target_pct("NaN%"), Err(TargetParseError::NonFinite));
    }

    #[test]
    fn test_empty_input_yields_all_defaults() {
        let record = CharacterizationNormalizer::new().normalize(&RawCharacterization::new(), None);
        assert_eq!(record, CharacterizationRecord::default());
    }

    #[test]
    fn test_unrecognized_values_fall_back() {
        let record = CharacterizationNormalizer::new().normalize(
            &raw(json!({
                "complexity_level": "SIMPLE",
                "tool_maturity": 3,
                "domain_type": "stable",
                "scenario_type": null,
            })),
            None,
        );
        assert_eq!(record.complexity_level, ComplexityLevel::Complex);
        assert_eq!(record.tool_maturity, ToolMaturity::Experimental);
        assert_eq!(record.domain_type, DomainType::Stable);
        assert_eq!(record.scenario_type, ScenarioType::Enhancement);
    }

    #[test]
    fn test_flat_targets() {
        let record = CharacterizationNormalizer::new().normalize(
            &raw(json!({
                "explicit_escalation_target_pct": "<15%",
                "explicit_fcr_target_pct": 75,
            })),
            Some("support"),
        );
        assert_eq!(record.explicit_escalation_target_pct, Some(15.0));
        assert_eq!(record.explicit_fcr_target_pct, Some(75.0));
        assert_eq!(record.context.as_deref(), Some("support"));
    }

    #[test]
    fn test_nested_targets_and_flat_precedence() {
        let record = CharacterizationNormalizer::new().normalize(
            &raw(json!({
                "explicit_escalation_target_pct": "12%",
                "performance_targets": {
                    "escalation_rate": "<20%",
                    "first_contact_resolution": ">70%"
                }
            })),
            None,
        );
        assert_eq!(record.explicit_escalation_target_pct, Some(12.0));
        assert_eq!(record.explicit_fcr_target_pct, Some(70.0));
    }

    #[test]
    fn test_unparsable_targets_are_absent() {
        let record = CharacterizationNormalizer::new().normalize(
            &raw(json!({
                "explicit_escalation_target_pct": "low",
                "explicit_fcr_target_pct": ["75%"],
            })),
            None,
        );
        assert_eq!(record.explicit_escalation_target_pct, None);
        assert_eq!(record.explicit_fcr_target_pct, None);
    }
}
