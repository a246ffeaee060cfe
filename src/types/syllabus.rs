//! Syllabus analysis types

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Text extracted from an uploaded syllabus, with the name it was uploaded under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyllabusSubmission {
    pub filename: String,
    pub content: String,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq)]
pub struct SyllabusAssessment {
    /// All scores are 1-10
    #[serde(default)]
    pub overall_score: u8,
    #[serde(default)]
    pub completeness_score: u8,
    #[serde(default)]
    pub bloom_alignment: u8,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub missing_elements: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub outcome_analysis: Vec<OutcomeAnalysis>,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct OutcomeAnalysis {
    pub outcome: String,
    pub bloom_level: String,
    /// Good, Fair or Poor
    pub quality: String,
    pub suggestion: String,
}
