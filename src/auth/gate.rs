//! Authorization gate shared by every document operation.
//!
//! Queries only need an identity; mutations additionally need the target
//! document to exist and to belong to that identity.

use crate::auth::models::AuthenticatedUser;
use crate::db::models::{Document, DocumentId};
use crate::db::repository::DocumentRepository;
use crate::error::AppError;

/// Fail with `Unauthenticated` when no caller identity was resolved.
pub fn require_identity(caller: Option<&AuthenticatedUser>) -> Result<&AuthenticatedUser, AppError> {
    caller.ok_or_else(|| AppError::Unauthenticated("Not authenticated".into()))
}

/// Fail with `Forbidden` unless `user` owns `doc`.
pub fn ensure_owner(doc: &Document, user: &AuthenticatedUser) -> Result<(), AppError> {
    if doc.user_id != user.user_id {
        return Err(AppError::Forbidden(format!(
            "Document '{}' belongs to another user",
            doc.id
        )));
    }
    Ok(())
}

/// Fetch `id` and check that `user` owns it.
pub async fn load_owned(
    repo: &dyn DocumentRepository,
    user: &AuthenticatedUser,
    id: &DocumentId,
) -> Result<Document, AppError> {
    let doc = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document '{}' not found", id)))?;
    ensure_owner(&doc, user)?;
    Ok(doc)
}
