//! Prompt-and-parse generation service
//!
//! Every use case goes through the same pipeline: build a prompt, send it to the
//! model and recover a JSON object from the reply. The recovered object is what
//! callers get back; the output schema only fills in fields the model left out.
//! A templated object stands in when no object can be recovered at all. A failed
//! model call is the only thing that surfaces as an error, and it does so as a
//! [`GenerationError`] value rather than a panic.

pub mod fallback;
pub mod output_validator;
pub mod parser;
pub mod prompt;

use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::database::Collection;
use crate::llm_providers::LLMProvider;
use crate::types::{
    BookRecommendation, BookRequest, CourseDesign, CourseRequest, OutcomeAssessment, OutcomeRequest,
    SyllabusAssessment, SyllabusSubmission,
};
use crate::{log_debug, log_error, log_warn};

pub use output_validator::{ValidationResult, validate_and_parse};
pub use parser::{ParseFailure, ParseStrategy, ParsedReply, ResponseParser};

/// One use case: how to ask, where results go, what to return when the reply is useless
pub trait GenerationTask: Send + Sync {
    /// Expected reply shape; used to fill gaps and to build the template
    type Output: Serialize + DeserializeOwned + JsonSchema + Send;

    /// Collection the merged request/result document is appended to
    const COLLECTION: Collection;

    /// The `error` label reported when the model call fails
    const FAILURE_LABEL: &'static str;

    fn prompt(&self) -> String;

    /// Request fields stored alongside the generated ones
    fn record(&self) -> Map<String, Value>;

    fn fallback(&self) -> Self::Output;
}

/// Error-tagged result; serializes as `{"error": ..., "details": ...}`
#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
#[error("{error}: {details}")]
pub struct GenerationError {
    pub error: String,
    pub details: String,
}

impl GenerationError {
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

/// A successful generation and how it was obtained
#[derive(Debug, Clone)]
pub struct Generated {
    /// Always a JSON object
    pub value: Value,
    pub strategy: ParseStrategy,
    /// Fields that were filled in, or the reason for falling back
    pub warnings: Vec<String>,
}

impl Generated {
    pub fn is_fallback(&self) -> bool {
        self.strategy == ParseStrategy::TemplateFallback
    }
}

/// Drives a model through the prompt → parse → complete pipeline
pub struct GenerationService {
    provider: Arc<dyn LLMProvider>,
    parser: ResponseParser,
}

impl GenerationService {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            parser: ResponseParser::new(),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.metadata().name
    }

    /// Run one task end to end
    pub async fn generate<T: GenerationTask>(&self, task: &T) -> Result<Generated, GenerationError> {
        let prompt = task.prompt();
        log_debug!(
            "Sending {} prompt to {} - {} chars",
            T::COLLECTION,
            self.provider_name(),
            prompt.len()
        );

        let reply = self
            .provider
            .generate_message(&prompt)
            .await
            .map_err(|e| {
                log_error!("{}: {:#}", T::FAILURE_LABEL, e);
                GenerationError::new(T::FAILURE_LABEL, format!("{e:#}"))
            })?;

        Ok(self.interpret(task, &reply))
    }

    /// Turn a raw reply into the task's result; never fails
    pub fn interpret<T: GenerationTask>(&self, task: &T, reply: &str) -> Generated {
        match self.parser.parse(reply) {
            Ok(ParsedReply { value, strategy }) => {
                let (value, warnings) = complete_missing_fields::<T::Output>(value);
                Generated {
                    value,
                    strategy,
                    warnings,
                }
            }
            Err(failure) => {
                log_warn!(
                    "Unparseable {} reply, using template: {}",
                    T::COLLECTION,
                    failure
                );
                Generated {
                    value: serde_json::to_value(task.fallback())
                        .unwrap_or_else(|_| Value::Object(Map::new())),
                    strategy: ParseStrategy::TemplateFallback,
                    warnings: vec![failure.to_string()],
                }
            }
        }
    }

    pub async fn generate_course_syllabus(
        &self,
        request: &CourseRequest,
    ) -> Result<Generated, GenerationError> {
        self.generate(request).await
    }

    pub async fn check_outcome_quality(
        &self,
        request: &OutcomeRequest,
    ) -> Result<Generated, GenerationError> {
        self.generate(request).await
    }

    pub async fn analyze_syllabus_content(
        &self,
        submission: &SyllabusSubmission,
    ) -> Result<Generated, GenerationError> {
        self.generate(submission).await
    }

    pub async fn recommend_textbooks(
        &self,
        request: &BookRequest,
    ) -> Result<Generated, GenerationError> {
        self.generate(request).await
    }
}

/// Add top-level fields of `T` that the reply left out, keeping every field it has.
///
/// Values the model did send are never rewritten, even when they do not match
/// `T`; a reply that cannot be coerced at all is returned untouched.
fn complete_missing_fields<T>(reply: Value) -> (Value, Vec<String>)
where
    T: Serialize + DeserializeOwned + JsonSchema,
{
    let Value::Object(mut fields) = reply else {
        return (reply, Vec::new());
    };

    let completed = validate_and_parse::<T>(Value::Object(fields.clone()))
        .ok()
        .and_then(|result| serde_json::to_value(result.value).ok());
    let Some(Value::Object(completed)) = completed else {
        log_debug!("Reply does not fit the expected shape, returning it as sent");
        return (Value::Object(fields), Vec::new());
    };

    let mut warnings = Vec::new();
    for (key, value) in completed {
        if !fields.contains_key(&key) {
            warnings.push(format!("Added missing field '{key}'"));
            fields.insert(key, value);
        }
    }
    (Value::Object(fields), warnings)
}

fn record_of(fields: &[(&str, &str)]) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, value)| ((*key).to_string(), Value::String((*value).to_string())))
        .collect()
}

impl GenerationTask for CourseRequest {
    type Output = CourseDesign;
    const COLLECTION: Collection = Collection::Courses;
    const FAILURE_LABEL: &'static str = "Failed to generate course syllabus";

    fn prompt(&self) -> String {
        prompt::create_course_prompt(self)
    }

    fn record(&self) -> Map<String, Value> {
        record_of(&[
            ("title", &self.title),
            ("credits", &self.credits),
            ("ltp", &self.ltp),
            ("audience", &self.audience),
        ])
    }

    fn fallback(&self) -> CourseDesign {
        fallback::course_design(self)
    }
}

impl GenerationTask for OutcomeRequest {
    type Output = OutcomeAssessment;
    const COLLECTION: Collection = Collection::Outcomes;
    const FAILURE_LABEL: &'static str = "Failed to analyze outcome";

    fn prompt(&self) -> String {
        prompt::create_outcome_prompt(self)
    }

    fn record(&self) -> Map<String, Value> {
        record_of(&[("input", &self.outcome)])
    }

    fn fallback(&self) -> OutcomeAssessment {
        fallback::outcome_assessment(self)
    }
}

impl GenerationTask for SyllabusSubmission {
    type Output = SyllabusAssessment;
    const COLLECTION: Collection = Collection::Syllabi;
    const FAILURE_LABEL: &'static str = "Failed to analyze syllabus";

    fn prompt(&self) -> String {
        prompt::create_syllabus_prompt(self)
    }

    fn record(&self) -> Map<String, Value> {
        record_of(&[("filename", &self.filename)])
    }

    fn fallback(&self) -> SyllabusAssessment {
        fallback::syllabus_assessment(self)
    }
}

impl GenerationTask for BookRequest {
    type Output = BookRecommendation;
    const COLLECTION: Collection = Collection::Books;
    const FAILURE_LABEL: &'static str = "Failed to recommend textbooks";

    fn prompt(&self) -> String {
        prompt::create_books_prompt(self)
    }

    fn record(&self) -> Map<String, Value> {
        record_of(&[("subject", &self.subject), ("audience", &self.audience)])
    }

    fn fallback(&self) -> BookRecommendation {
        fallback::book_recommendation(self)
    }
}
