//! CourseWeaver - AI-powered university course design assistant
//!
//! This library serves an HTTP API that designs courses, checks learning outcomes,
//! analyzes uploaded syllabi and recommends textbooks by prompting a generative model
//! and recovering structured JSON from its replies.

// Allow certain clippy warnings that are either stylistic or from external dependencies
#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::format_push_string)] // Performance improvement but stylistic
#![allow(clippy::items_after_statements)] // Locally-scoped use statements are fine
#![allow(clippy::option_as_ref_cloned)] // .as_ref().cloned() is sometimes clearer
#![allow(clippy::redundant_clone)] // Sometimes more explicit is clearer

pub mod cli;
pub mod config;
pub mod database;
pub mod documents;
pub mod generation;
pub mod llm_providers;
pub mod logger;
pub mod server;
pub mod types;
pub mod ui;

// Re-export important structs and functions for easier testing
pub use config::Config;
pub use database::{Collection, DocumentStore, MemoryStore};
pub use generation::{GenerationError, GenerationService};
pub use server::{AppState, build_router};
