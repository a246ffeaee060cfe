//! Request and response records for the four CourseWeaver use cases
//!
//! - Course generation
//! - Learning-outcome checks
//! - Syllabus analysis
//! - Textbook recommendations
//!
//! Output types derive `JsonSchema` so the validator can coerce slightly-off model
//! replies into shape. Every output field is defaulted: a reply that omits a list
//! still deserializes.

mod bloom;
mod books;
mod course;
mod outcome;
mod syllabus;

pub use bloom::BloomLevel;
pub use books::{BookRecommendation, BookRequest, OnlineResource, RecommendedTextbook};
pub use course::{CourseDesign, CourseModule, CourseRequest, Lab, LearningOutcome, Reference, Textbook};
pub use outcome::{OutcomeAssessment, OutcomeRequest};
pub use syllabus::{OutcomeAnalysis, SyllabusAssessment, SyllabusSubmission};
