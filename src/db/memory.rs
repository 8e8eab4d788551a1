use std::sync::RwLock;

use async_trait::async_trait;

use crate::db::models::{Document, DocumentId, DocumentPatch};
use crate::db::repository::DocumentRepository;
use crate::error::AppError;

/// Process-local DocumentRepository.
///
/// Documents are kept in insertion order, so listings simply walk the
/// vector backwards. Used by the test suites and by the `memory` storage
/// backend for local development.
#[derive(Debug, Default)]
pub struct InMemoryDocumentRepository {
    documents: RwLock<Vec<Document>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, archived ones included.
    ///
    /// Still counts after a writer panicked, while the repository methods
    /// report the poisoned lock as `AppError::Database`.
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<Document>>, AppError> {
        self.documents
            .read()
            .map_err(|_| AppError::Database("document store lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<Document>>, AppError> {
        self.documents
            .write()
            .map_err(|_| AppError::Database("document store lock poisoned".into()))
    }

    fn newest_first(&self, keep: impl Fn(&Document) -> bool) -> Result<Vec<Document>, AppError> {
        Ok(self.read()?.iter().rev().filter(|d| keep(d)).cloned().collect())
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn get_by_id(&self, id: &DocumentId) -> Result<Option<Document>, AppError> {
        Ok(self.read()?.iter().find(|d| &d.id == id).cloned())
    }

    async fn find_by_owner(&self, user_id: &str) -> Result<Vec<Document>, AppError> {
        self.newest_first(|d| d.user_id == user_id)
    }

    async fn find_by_owner_and_parent(
        &self,
        user_id: &str,
        parent: Option<DocumentId>,
    ) -> Result<Vec<Document>, AppError> {
        self.newest_first(|d| d.user_id == user_id && d.parent_document == parent)
    }

    async fn insert(&self, doc: Document) -> Result<(), AppError> {
        let mut docs = self.write()?;
        if docs.iter().any(|d| d.id == doc.id) {
            return Err(AppError::Database(format!("duplicate document id '{}'", doc.id)));
        }
        docs.push(doc);
        Ok(())
    }

    async fn patch(
        &self,
        id: &DocumentId,
        patch: DocumentPatch,
    ) -> Result<Option<Document>, AppError> {
        let mut docs = self.write()?;
        Ok(docs.iter_mut().find(|d| &d.id == id).map(|doc| {
            patch.apply(doc);
            doc.clone()
        }))
    }

    async fn delete(&self, id: &DocumentId) -> Result<bool, AppError> {
        let mut docs = self.write()?;
        let before = docs.len();
        docs.retain(|d| &d.id != id);
        Ok(docs.len() < before)
    }
}
