//! Course generation request and design types

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input for course generation
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CourseRequest {
    /// Course title, e.g. "Intro to Algorithms"
    pub title: String,
    /// Credit value as entered by the user
    pub credits: String,
    /// Load distribution in lecture:tutorial:practical form, e.g. "3:1:0"
    #[serde(alias = "load_distribution")]
    pub ltp: String,
    /// Intended audience, e.g. "undergraduate"
    pub audience: String,
}

/// A complete course outline produced by the model
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq)]
pub struct CourseDesign {
    #[serde(default)]
    pub modules: Vec<CourseModule>,
    #[serde(default)]
    pub outcomes: Vec<LearningOutcome>,
    #[serde(default)]
    pub labs: Vec<Lab>,
    #[serde(default)]
    pub textbooks: Vec<Textbook>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CourseModule {
    pub title: String,
    /// Contact hours allotted to the module
    pub hours: u32,
    pub description: String,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LearningOutcome {
    pub text: String,
    /// One of Remember, Understand, Apply, Analyze, Evaluate, Create
    pub bloom_level: String,
    pub description: String,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Lab {
    pub title: String,
    /// Module number (1-5) the lab belongs to
    pub module: String,
    pub description: String,
    pub duration: String,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Textbook {
    pub title: String,
    pub author: String,
    pub year: String,
    pub isbn: String,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Reference {
    pub title: String,
    pub url: String,
    pub description: String,
}
