//! HTTP surface of the document service.
//!
//! Handlers only extract the caller and arguments; all rules live in
//! `DocumentService`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::errors::ApiJson;
use crate::app::AppState;
use crate::auth::middleware::CallerIdentity;
use crate::db::models::{CreateDocumentRequest, Document, DocumentId, SidebarQuery};
use crate::error::AppError;

/// `POST /api/v1/documents`
pub async fn create_handler(
    State(state): State<AppState>,
    caller: CallerIdentity,
    ApiJson(request): ApiJson<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<Document>), AppError> {
    let doc = state
        .documents
        .create(caller.user(), request.title, request.parent_document)
        .await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// `POST /api/v1/documents/{id}/archive`
pub async fn archive_handler(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<DocumentId>,
) -> Result<Json<Document>, AppError> {
    let doc = state.documents.archive(caller.user(), &id).await?;
    Ok(Json(doc))
}

/// `POST /api/v1/documents/{id}/restore`
pub async fn restore_handler(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<DocumentId>,
) -> Result<Json<Document>, AppError> {
    let doc = state.documents.restore(caller.user(), &id).await?;
    Ok(Json(doc))
}

/// `DELETE /api/v1/documents/{id}`
pub async fn remove_handler(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<DocumentId>,
) -> Result<StatusCode, AppError> {
    state.documents.remove(caller.user(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/v1/documents/sidebar?parentDocument=<id>`
pub async fn sidebar_handler(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(query): Query<SidebarQuery>,
) -> Result<Json<Vec<Document>>, AppError> {
    let docs = state
        .documents
        .get_sidebar(caller.user(), query.parent_document)
        .await?;
    Ok(Json(docs))
}

/// `GET /api/v1/documents/trash`
pub async fn trash_handler(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<Document>>, AppError> {
    Ok(Json(state.documents.get_trash(caller.user()).await?))
}

/// `GET /api/v1/documents/search`
pub async fn search_handler(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<Document>>, AppError> {
    Ok(Json(state.documents.get_search(caller.user()).await?))
}
