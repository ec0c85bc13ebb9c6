//! Characterization record and its raw, producer-facing form
//!
//! A raw characterization is whatever a producer emitted: a JSON object with
//! any subset of the known fields, possibly malformed. The normalizer turns it
//! into a [`CharacterizationRecord`] where every categorical field holds a
//! valid member.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Declares a closed categorical field with a default member and
/// case-sensitive parsing from its snake_case wire name.
macro_rules! categorical {
    (
        $(#[$meta:meta])*
        $name:ident default $default:ident {
            $($variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every member, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire name of the member
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            /// Exact, case-sensitive match against the wire names
            pub fn from_raw(raw: &str) -> Option<Self> {
                match raw {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

categorical! {
    /// Overall use case complexity
    ComplexityLevel default Complex {
        Simple => "simple",
        Complex => "complex",
        HighlySpecialized => "highly_specialized",
    }
}

categorical! {
    /// Maturity of the agent's tool ecosystem
    ToolMaturity default Experimental {
        WellDefined => "well_defined",
        Experimental => "experimental",
        Unstable => "unstable",
    }
}

categorical! {
    /// Maturity of the business domain
    DomainType default Evolving {
        Stable => "stable",
        Evolving => "evolving",
        New => "new",
    }
}

categorical! {
    /// Complexity of individual tasks handled by the agent
    TaskComplexity default Complex {
        Simple => "simple",
        Complex => "complex",
        Novel => "novel",
    }
}

categorical! {
    AutomationPotential default Medium {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

categorical! {
    /// How the agent relates to the existing process
    ScenarioType default Enhancement {
        Replacement => "replacement",
        Enhancement => "enhancement",
        NewCapability => "new_capability",
    }
}

/// Canonical characterization driving baseline selection
///
/// Immutable once produced by the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterizationRecord {
    pub complexity_level: ComplexityLevel,
    pub tool_maturity: ToolMaturity,
    pub domain_type: DomainType,
    pub task_complexity: TaskComplexity,
    pub automation_potential: AutomationPotential,
    pub scenario_type: ScenarioType,

    /// Documented escalation-rate target in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_escalation_target_pct: Option<f64>,

    /// Documented first-contact-resolution target in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_fcr_target_pct: Option<f64>,

    /// Contextual query the record was normalized with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl CharacterizationRecord {
    /// True when the contextual query mentions technical work
    pub fn mentions_technical(&self) -> bool {
        self.context
            .as_deref()
            .map(|c| c.to_lowercase().contains("technical"))
            .unwrap_or(false)
    }
}

/// Raw field names understood by the normalizer
pub mod fields {
    pub const COMPLEXITY_LEVEL: &str = "complexity_level";
    pub const TOOL_MATURITY: &str = "tool_maturity";
    pub const DOMAIN_TYPE: &str = "domain_type";
    pub const TASK_COMPLEXITY: &str = "task_complexity";
    pub const AUTOMATION_POTENTIAL: &str = "automation_potential";
    pub const SCENARIO_TYPE: &str = "scenario_type";
    pub const ESCALATION_TARGET: &str = "explicit_escalation_target_pct";
    pub const FCR_TARGET: &str = "explicit_fcr_target_pct";

    /// Nested target object emitted by reasoning collaborators
    pub const PERFORMANCE_TARGETS: &str = "performance_targets";
    pub const NESTED_ESCALATION: &str = "escalation_rate";
    pub const NESTED_FCR: &str = "first_contact_resolution";
}

/// Partial, unvalidated characterization as emitted by a producer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawCharacterization(Map<String, Value>);

impl RawCharacterization {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value; anything but an object is rejected
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Look up a key inside the nested `performance_targets` object
    pub fn performance_target(&self, key: &str) -> Option<&Value> {
        self.0
            .get(fields::PERFORMANCE_TARGETS)
            .and_then(Value::as_object)
            .and_then(|targets| targets.get(key))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Overlay `other` on top of `self`; keys present in `other` win
    pub fn overlay(mut self, other: &RawCharacterization) -> Self {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
