use std::sync::Arc;

use axum::extract::FromRef;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::documents;
use crate::auth::jwt::JwtVerifier;
use crate::config::{AppConfig, StorageBackend};
use crate::db::memory::InMemoryDocumentRepository;
use crate::db::repository::{DocumentRepository, MongoDocumentRepository};
use crate::error::AppError;
use crate::service::documents::DocumentService;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub documents: DocumentService,
    pub verifier: Arc<JwtVerifier>,
}

impl FromRef<AppState> for Arc<JwtVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}

impl AppState {
    pub fn new(documents: DocumentService, verifier: JwtVerifier) -> Self {
        Self {
            documents,
            verifier: Arc::new(verifier),
        }
    }

    /// Connect the configured storage backend and wire the service.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let repo: Arc<dyn DocumentRepository> = match config.storage.backend {
            StorageBackend::Mongo => {
                let client = mongodb::Client::with_uri_str(&config.storage.mongodb_uri).await?;
                let repo = MongoDocumentRepository::new(&client.database(&config.storage.database));
                repo.ensure_indexes().await?;
                tracing::info!(
                    "Connected to MongoDB at {} (database '{}')",
                    config.storage.mongodb_uri,
                    config.storage.database
                );
                Arc::new(repo)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using the in-memory document store; data is lost on restart");
                Arc::new(InMemoryDocumentRepository::new())
            }
        };

        let documents = DocumentService::new(repo)
            .with_cascade(config.documents.cascade)
            .with_delete_policy(config.documents.delete_policy);

        Ok(Self::new(documents, JwtVerifier::new(&config.auth)))
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/documents", post(documents::create_handler))
        .route("/api/v1/documents/sidebar", get(documents::sidebar_handler))
        .route("/api/v1/documents/trash", get(documents::trash_handler))
        .route("/api/v1/documents/search", get(documents::search_handler))
        .route(
            "/api/v1/documents/{id}/archive",
            post(documents::archive_handler),
        )
        .route(
            "/api/v1/documents/{id}/restore",
            post(documents::restore_handler),
        )
        .route("/api/v1/documents/{id}", delete(documents::remove_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
