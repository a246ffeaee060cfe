//! Textbook recommendation types

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BookRequest {
    pub subject: String,
    pub audience: String,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq)]
pub struct BookRecommendation {
    #[serde(default)]
    pub textbooks: Vec<RecommendedTextbook>,
    #[serde(default)]
    pub online_resources: Vec<OnlineResource>,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RecommendedTextbook {
    pub title: String,
    pub author: String,
    pub year: String,
    pub isbn: String,
    pub description: String,
    /// Why the book fits the audience
    pub suitability: String,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct OnlineResource {
    pub title: String,
    pub url: String,
    pub description: String,
    /// Video, Article, Tutorial or Other
    #[serde(rename = "type")]
    pub kind: String,
}
