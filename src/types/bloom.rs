//! Bloom's taxonomy levels

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Cognitive-skill category of a learning outcome, lowest to highest
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum BloomLevel {
    Remember,
    Understand,
    Apply,
    Analyze,
    Evaluate,
    Create,
}

impl BloomLevel {
    /// Typical action verbs for each level
    pub fn verbs(self) -> &'static [&'static str] {
        match self {
            Self::Remember => &["define", "list", "recall", "identify", "name", "state"],
            Self::Understand => &["explain", "describe", "summarize", "classify", "discuss"],
            Self::Apply => &["apply", "implement", "use", "solve", "demonstrate", "compute"],
            Self::Analyze => &["analyze", "analyse", "compare", "contrast", "examine", "differentiate"],
            Self::Evaluate => &["evaluate", "assess", "justify", "critique", "judge", "defend"],
            Self::Create => &["design", "create", "develop", "construct", "formulate", "propose"],
        }
    }

    /// Best-effort level for an outcome statement, from its action verbs.
    ///
    /// The highest level whose verb appears wins; statements without a known verb
    /// are classed as `Remember`.
    pub fn classify(text: &str) -> Self {
        use strum::IntoEnumIterator;

        let words: Vec<String> = text
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();

        Self::iter()
            .rev()
            .find(|level| {
                level
                    .verbs()
                    .iter()
                    .any(|verb| words.iter().any(|w| w == verb))
            })
            .unwrap_or(Self::Remember)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parses_case_insensitively() {
        assert_eq!(BloomLevel::from_str("analyze").ok(), Some(BloomLevel::Analyze));
        assert_eq!(BloomLevel::from_str("CREATE").ok(), Some(BloomLevel::Create));
        assert!(BloomLevel::from_str("memorize").is_err());
    }

    #[test]
    fn test_classify_prefers_highest_level() {
        assert_eq!(
            BloomLevel::classify("Students will list and then design a sorting network"),
            BloomLevel::Create
        );
        assert_eq!(
            BloomLevel::classify("Explain the role of invariants"),
            BloomLevel::Understand
        );
        assert_eq!(BloomLevel::classify("Know things"), BloomLevel::Remember);
    }
}
