//! Stage services
//!
//! Sources produce raw characterizations; the normalizer, resolver and
//! synthesizer are the pure computations behind the three workflow stages.

pub mod characterization_source;
pub mod keyword_source;
pub mod normalizer;
pub mod resolver;
pub mod synthesizer;

pub use characterization_source::{CharacterizationSource, ProvidedSource};
pub use keyword_source::KeywordSource;
pub use normalizer::{parse_target_pct, CharacterizationNormalizer, TargetParseError};
pub use resolver::BaselineResolver;
pub use synthesizer::InsightSynthesizer;
