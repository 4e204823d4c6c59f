// Structure Module
// Section-boundary detection core organized into specialized submodules:
// - heading: pattern-based heading scan over page text
// - uniform: bounded near-equal page splitting (guaranteed fallback)
// - ai: external-LLM structure classification
// - detector: strategy dispatch, auto fallback chain, span repair

pub mod ai;
pub mod detector;
pub mod heading;
pub mod uniform;

use thiserror::Error;

use crate::models::Strategy;
use crate::services::providers::ProviderError;

// Re-export commonly used items
pub use detector::{DetectOptions, SectionDetector};
pub use heading::HeadingRules;
pub use uniform::SectionCountBounds;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Malformed or empty input. Fatal, no retry.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    /// Caller passed a strategy value outside the enumerated set.
    #[error("unsupported strategy: {0}")]
    UnsupportedStrategy(String),
    /// External classification call failed, timed out, or returned content
    /// that cannot be parsed into page-numbered spans. Recovered by `auto`,
    /// fatal for an explicit `ai` request.
    #[error("classification service error: {0}")]
    ClassificationService(String),
}

impl From<ProviderError> for AnalysisError {
    fn from(err: ProviderError) -> Self {
        AnalysisError::ClassificationService(err.to_string())
    }
}

impl std::str::FromStr for Strategy {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heading" => Ok(Strategy::Heading),
            "ai" => Ok(Strategy::Ai),
            "uniform" => Ok(Strategy::Uniform),
            "auto" => Ok(Strategy::Auto),
            other => Err(AnalysisError::UnsupportedStrategy(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse_known_values() {
        assert_eq!("heading".parse::<Strategy>().unwrap(), Strategy::Heading);
        assert_eq!(" AI ".parse::<Strategy>().unwrap(), Strategy::Ai);
        assert_eq!("uniform".parse::<Strategy>().unwrap(), Strategy::Uniform);
        assert_eq!("auto".parse::<Strategy>().unwrap(), Strategy::Auto);
    }

    #[test]
    fn test_strategy_parse_rejects_unknown() {
        let err = "by_meaning".parse::<Strategy>().unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedStrategy(_)));
        assert!(err.to_string().contains("by_meaning"));
    }
}
