//! Learning-outcome quality check types

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single learning outcome to assess
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OutcomeRequest {
    #[serde(alias = "text")]
    pub outcome: String,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq)]
pub struct OutcomeAssessment {
    #[serde(default)]
    pub current_bloom_level: String,
    /// 1 (poor) to 10 (excellent)
    #[serde(default)]
    pub quality_score: u8,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub suggested_improvements: Vec<String>,
    #[serde(default)]
    pub improved_outcome: String,
}
