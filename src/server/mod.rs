//! HTTP surface
//!
//! Thin axum handlers over the generation service and the document store. Both
//! are injected through [`AppState`] so tests can swap in stubs.

mod error;
mod handlers;

pub use error::ApiError;

use anyhow::{Context, Result};
use axum::Router;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Request};
use axum::routing::{get, post};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::Config;
use crate::database::{DocumentStore, MemoryStore, MongoStore};
use crate::generation::GenerationService;
use crate::llm_providers::GeminiProvider;
use crate::ui::ServeBanner;
use crate::{log_info, log_warn};

/// Largest accepted syllabus upload
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

const ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<GenerationService>,
    pub store: Arc<dyn DocumentStore>,
    pub upload_dir: PathBuf,
}

/// Command-line overrides for `serve`
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub memory_store: bool,
}

impl ServeOptions {
    /// Command-line values win over the environment
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.upload_dir);

    let api = Router::new()
        .route("/generate-course", post(handlers::generate_course))
        .route("/check-outcome", post(handlers::check_outcome))
        .route(
            "/upload-syllabus",
            post(handlers::upload_syllabus).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/get-books", post(handlers::get_books));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .nest_service("/uploads", uploads)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    let origins = ALLOWED_ORIGINS.map(HeaderValue::from_static);
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// One span per request, tagged with a fresh id so log lines can be correlated
fn request_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        id = %Uuid::new_v4(),
        method = %request.method(),
        uri = %request.uri(),
    )
}

/// Build dependencies, serve until Ctrl-C, then release the store
pub async fn serve(mut config: Config, options: ServeOptions) -> Result<()> {
    options.apply(&mut config);

    if let Err(e) = config.api_key() {
        log_warn!("{}; generation requests will fail until it is set", e);
    }

    let generator = Arc::new(GenerationService::new(Arc::new(
        GeminiProvider::from_config(&config),
    )));

    let store: Arc<dyn DocumentStore> = if options.memory_store {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(
            MongoStore::connect(&config.mongodb_uri, &config.database_name)
                .await
                .with_context(|| format!("invalid MongoDB URI '{}'", config.mongodb_uri))?,
        )
    };
    match store.ping().await {
        Ok(()) => log_info!("Connected to {} store", store.backend()),
        Err(e) => log_warn!("{} store is not reachable yet: {}", store.backend(), e),
    }

    std::fs::create_dir_all(&config.upload_dir).with_context(|| {
        format!(
            "failed to create upload directory {}",
            config.upload_dir.display()
        )
    })?;

    let state = AppState {
        generator,
        store: Arc::clone(&store),
        upload_dir: config.upload_dir.clone(),
    };

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    log_info!("CourseWeaver API listening on http://{}", address);
    ServeBanner {
        version: env!("CARGO_PKG_VERSION"),
        address: &address,
        store: store.backend(),
        model: &config.gemini_model,
    }
    .print();

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    log_info!("CourseWeaver API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log_warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    log_info!("Shutdown signal received");
}
