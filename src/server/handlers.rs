use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use super::AppState;
use super::error::ApiError;
use crate::database::merge_document;
use crate::documents::{self, DocumentError, DocumentKind};
use crate::generation::GenerationTask;
use crate::types::{BookRequest, CourseRequest, OutcomeRequest, SyllabusSubmission};
use crate::{log_error, log_info, log_warn};

const UPLOAD_FIELD: &str = "file";

#[derive(Serialize)]
pub struct RootResponse {
    message: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "CourseWeaver API is running!",
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "CourseWeaver API",
    })
}

/// Generate, persist, respond; storage failures never reach the caller.
///
/// The stored document carries exactly the fields returned to the caller.
async fn run_task<T: GenerationTask>(state: &AppState, task: &T) -> Result<Value, ApiError> {
    let generated = state.generator.generate(task).await?;
    if generated.is_fallback() {
        log_warn!("Returning templated {} result", T::COLLECTION);
    }

    let document = merge_document(task.record(), &generated.value);
    if let Err(e) = state.store.insert(T::COLLECTION, document).await {
        log_error!("Failed to store {} document: {}", T::COLLECTION, e);
    }

    Ok(generated.value)
}

pub async fn generate_course(
    State(state): State<AppState>,
    payload: Result<Json<CourseRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    log_info!("Generating course '{}'", request.title);
    Ok(Json(run_task(&state, &request).await?))
}

pub async fn check_outcome(
    State(state): State<AppState>,
    payload: Result<Json<OutcomeRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(run_task(&state, &request).await?))
}

pub async fn get_books(
    State(state): State<AppState>,
    payload: Result<Json<BookRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(run_task(&state, &request).await?))
}

pub async fn upload_syllabus(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let (filename, bytes) = loop {
        let Some(field) = multipart.next_field().await? else {
            return Err(ApiError::bad_request("No file uploaded in field 'file'"));
        };
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .and_then(|name| Path::new(name).file_name())
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("Uploaded file has no filename"))?;
        break (filename, field.bytes().await?);
    };

    let kind = DocumentKind::from_filename(&filename).ok_or(DocumentError::Unsupported)?;
    log_info!(
        "Received {} syllabus '{}' ({} bytes)",
        kind,
        filename,
        bytes.len()
    );

    let upload_dir = state.upload_dir.clone();
    let name = filename.clone();
    let content = tokio::task::spawn_blocking(move || {
        documents::save_upload(&upload_dir, &name, &bytes)?;
        documents::extract_text(kind, &bytes)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("extraction task failed: {e}")))??;

    let submission = SyllabusSubmission { filename, content };
    Ok(Json(run_task(&state, &submission).await?))
}
