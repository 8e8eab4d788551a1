use std::sync::Arc;

use serde::Deserialize;

use crate::auth::gate::{load_owned, require_identity};
use crate::auth::models::AuthenticatedUser;
use crate::db::models::{Document, DocumentId, DocumentPatch};
use crate::db::repository::DocumentRepository;
use crate::error::AppError;
use crate::service::cascade::{collect_descendants, set_archived_below, CascadeMode};

/// What `remove` does with the children of the deleted document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Delete only the target; children keep a dangling parent reference.
    #[default]
    Orphan,
    /// Delete the target and its whole subtree.
    Cascade,
    /// Refuse with `Conflict` while the target still has children.
    Reject,
}

/// Per-user document forest: create, archive/restore with cascade, hard
/// delete, and the sidebar/trash/search listings.
///
/// Every operation takes the resolved caller, if any. A missing caller fails
/// with `Unauthenticated` before the repository is touched.
#[derive(Clone)]
pub struct DocumentService {
    repo: Arc<dyn DocumentRepository>,
    cascade: CascadeMode,
    delete_policy: DeletePolicy,
}

impl DocumentService {
    pub fn new(repo: Arc<dyn DocumentRepository>) -> Self {
        Self {
            repo,
            cascade: CascadeMode::default(),
            delete_policy: DeletePolicy::default(),
        }
    }

    pub fn with_cascade(mut self, cascade: CascadeMode) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn with_delete_policy(mut self, delete_policy: DeletePolicy) -> Self {
        self.delete_policy = delete_policy;
        self
    }

    /// Insert a new root or child document owned by the caller.
    ///
    /// The parent is stored as given; it is not checked for existence.
    pub async fn create(
        &self,
        caller: Option<&AuthenticatedUser>,
        title: String,
        parent_document: Option<DocumentId>,
    ) -> Result<Document, AppError> {
        let user = require_identity(caller)?;

        let doc = Document::new(title, user.user_id.clone(), parent_document);
        self.repo.insert(doc.clone()).await?;

        tracing::info!(document_id = %doc.id, user_id = %user.user_id, "document created");
        Ok(doc)
    }

    /// Move a document and its subtree to the trash.
    ///
    /// The returned document reflects only the target's own change. With
    /// `CascadeMode::Background` descendants are archived after this returns.
    pub async fn archive(
        &self,
        caller: Option<&AuthenticatedUser>,
        id: &DocumentId,
    ) -> Result<Document, AppError> {
        let user = require_identity(caller)?;
        load_owned(self.repo.as_ref(), user, id).await?;

        let doc = self.patch_existing(id, DocumentPatch::archived(true)).await?;
        self.cascade_archived(&user.user_id, id, true).await?;

        tracing::info!(document_id = %id, user_id = %user.user_id, "document archived");
        Ok(doc)
    }

    /// Bring a document and its subtree back from the trash.
    ///
    /// If the document's parent is still archived, the document is detached
    /// to the root so it does not stay hidden under a trashed ancestor.
    /// Descendants are only un-archived, never re-parented.
    pub async fn restore(
        &self,
        caller: Option<&AuthenticatedUser>,
        id: &DocumentId,
    ) -> Result<Document, AppError> {
        let user = require_identity(caller)?;
        let existing = load_owned(self.repo.as_ref(), user, id).await?;

        let mut patch = DocumentPatch::archived(false);
        if let Some(parent_id) = &existing.parent_document {
            let parent = self.repo.get_by_id(parent_id).await?;
            if parent.is_some_and(|p| p.is_archived) {
                tracing::debug!(document_id = %id, parent_id = %parent_id, "detaching from archived parent");
                patch = patch.detached();
            }
        }

        let doc = self.patch_existing(id, patch).await?;
        self.cascade_archived(&user.user_id, id, false).await?;

        tracing::info!(document_id = %id, user_id = %user.user_id, "document restored");
        Ok(doc)
    }

    /// Permanently delete a document. Children are handled per `DeletePolicy`.
    pub async fn remove(
        &self,
        caller: Option<&AuthenticatedUser>,
        id: &DocumentId,
    ) -> Result<(), AppError> {
        let user = require_identity(caller)?;
        load_owned(self.repo.as_ref(), user, id).await?;

        match self.delete_policy {
            DeletePolicy::Orphan => {}
            DeletePolicy::Reject => {
                let children = self
                    .repo
                    .find_by_owner_and_parent(&user.user_id, Some(id.clone()))
                    .await?;
                if !children.is_empty() {
                    return Err(AppError::Conflict(format!(
                        "Document '{}' still has {} child document(s)",
                        id,
                        children.len()
                    )));
                }
            }
            DeletePolicy::Cascade => {
                let descendants =
                    collect_descendants(self.repo.as_ref(), &user.user_id, id).await?;
                // children before their parents
                for descendant in descendants.iter().rev() {
                    self.repo.delete(descendant).await?;
                }
                tracing::debug!(document_id = %id, count = descendants.len(), "deleted descendants");
            }
        }

        self.repo.delete(id).await?;

        tracing::info!(document_id = %id, user_id = %user.user_id, "document removed");
        Ok(())
    }

    /// Non-archived children of `parent_document` (root when `None`), newest first.
    pub async fn get_sidebar(
        &self,
        caller: Option<&AuthenticatedUser>,
        parent_document: Option<DocumentId>,
    ) -> Result<Vec<Document>, AppError> {
        let user = require_identity(caller)?;

        let mut docs = self
            .repo
            .find_by_owner_and_parent(&user.user_id, parent_document)
            .await?;
        docs.retain(|d| !d.is_archived);
        Ok(docs)
    }

    /// Every archived document of the caller, newest first.
    pub async fn get_trash(
        &self,
        caller: Option<&AuthenticatedUser>,
    ) -> Result<Vec<Document>, AppError> {
        let user = require_identity(caller)?;

        let mut docs = self.repo.find_by_owner(&user.user_id).await?;
        docs.retain(|d| d.is_archived);
        Ok(docs)
    }

    /// Every non-archived document of the caller as a flat list, newest first.
    pub async fn get_search(
        &self,
        caller: Option<&AuthenticatedUser>,
    ) -> Result<Vec<Document>, AppError> {
        let user = require_identity(caller)?;

        let mut docs = self.repo.find_by_owner(&user.user_id).await?;
        docs.retain(|d| !d.is_archived);
        Ok(docs)
    }

    async fn patch_existing(
        &self,
        id: &DocumentId,
        patch: DocumentPatch,
    ) -> Result<Document, AppError> {
        self.repo
            .patch(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document '{}' not found", id)))
    }

    async fn cascade_archived(
        &self,
        user_id: &str,
        root: &DocumentId,
        archived: bool,
    ) -> Result<(), AppError> {
        match self.cascade {
            CascadeMode::Awaited => {
                let patched = set_archived_below(self.repo.as_ref(), user_id, root, archived).await?;
                tracing::debug!(document_id = %root, patched, archived, "cascade finished");
            }
            CascadeMode::Background => {
                let repo = Arc::clone(&self.repo);
                let user_id = user_id.to_string();
                let root = root.clone();
                tokio::spawn(async move {
                    match set_archived_below(repo.as_ref(), &user_id, &root, archived).await {
                        Ok(patched) => {
                            tracing::debug!(document_id = %root, patched, archived, "cascade finished")
                        }
                        Err(e) => {
                            tracing::error!(document_id = %root, archived, "cascade failed: {e}")
                        }
                    }
                });
            }
        }
        Ok(())
    }
}
