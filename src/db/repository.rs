use async_trait::async_trait;
use bson::{doc, Bson, Document as BsonDocument};

use crate::db::models::{Document, DocumentId, DocumentPatch};
use crate::error::AppError;

/// Repository trait for document operations.
///
/// Mirrors the two store indexes (`by_user`, `by_user_parent`) plus point
/// access by id. Listing methods return documents newest first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Point lookup by id.
    async fn get_by_id(&self, id: &DocumentId) -> Result<Option<Document>, AppError>;

    /// All documents owned by `user_id`, archived or not.
    async fn find_by_owner(&self, user_id: &str) -> Result<Vec<Document>, AppError>;

    /// Direct children of `parent` owned by `user_id`. `None` selects root documents.
    async fn find_by_owner_and_parent(
        &self,
        user_id: &str,
        parent: Option<DocumentId>,
    ) -> Result<Vec<Document>, AppError>;

    async fn insert(&self, doc: Document) -> Result<(), AppError>;

    /// Apply a partial update and return the document as stored afterwards.
    /// Returns `None` if no document has this id.
    async fn patch(
        &self,
        id: &DocumentId,
        patch: DocumentPatch,
    ) -> Result<Option<Document>, AppError>;

    /// Delete exactly one record. Returns `false` if it did not exist.
    async fn delete(&self, id: &DocumentId) -> Result<bool, AppError>;
}

/// MongoDB implementation of the DocumentRepository.
pub struct MongoDocumentRepository {
    collection: mongodb::Collection<Document>,
}

impl MongoDocumentRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("documents"),
        }
    }

    /// Create the `by_user` and `by_user_parent` indexes if they are missing.
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        let by_user = IndexModel::builder()
            .keys(doc! { "userId": 1 })
            .options(IndexOptions::builder().name("by_user".to_string()).build())
            .build();
        let by_user_parent = IndexModel::builder()
            .keys(doc! { "userId": 1, "parentDocument": 1 })
            .options(
                IndexOptions::builder()
                    .name("by_user_parent".to_string())
                    .build(),
            )
            .build();

        self.collection
            .create_indexes([by_user, by_user_parent])
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn find_newest_first(&self, filter: BsonDocument) -> Result<Vec<Document>, AppError> {
        use futures::TryStreamExt;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            // creation times are unique per process; `_id` only settles
            // ties between documents created by separate instances
            .sort(doc! { "creationTime": -1, "_id": -1 })
            .build();

        let cursor = self
            .collection
            .find(filter)
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Translate a patch into a `$set` / `$unset` update document.
fn update_document(patch: &DocumentPatch) -> BsonDocument {
    let mut set = BsonDocument::new();
    let mut unset = BsonDocument::new();

    if let Some(flag) = patch.is_archived {
        set.insert("isArchived", flag);
    }
    match &patch.parent_document {
        Some(Some(parent)) => {
            set.insert("parentDocument", parent.as_str());
        }
        Some(None) => {
            unset.insert("parentDocument", "");
        }
        None => {}
    }

    let mut update = BsonDocument::new();
    if !set.is_empty() {
        update.insert("$set", set);
    }
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }
    update
}

#[async_trait]
impl DocumentRepository for MongoDocumentRepository {
    async fn get_by_id(&self, id: &DocumentId) -> Result<Option<Document>, AppError> {
        self.collection
            .find_one(doc! { "_id": id.as_str() })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_by_owner(&self, user_id: &str) -> Result<Vec<Document>, AppError> {
        self.find_newest_first(doc! { "userId": user_id }).await
    }

    async fn find_by_owner_and_parent(
        &self,
        user_id: &str,
        parent: Option<DocumentId>,
    ) -> Result<Vec<Document>, AppError> {
        // `null` also matches documents where the field is absent.
        let parent = match parent {
            Some(id) => Bson::String(id.to_string()),
            None => Bson::Null,
        };
        self.find_newest_first(doc! { "userId": user_id, "parentDocument": parent })
            .await
    }

    async fn insert(&self, doc: Document) -> Result<(), AppError> {
        self.collection
            .insert_one(&doc)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn patch(
        &self,
        id: &DocumentId,
        patch: DocumentPatch,
    ) -> Result<Option<Document>, AppError> {
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        if patch.is_empty() {
            return self.get_by_id(id).await;
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(doc! { "_id": id.as_str() }, update_document(&patch))
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn delete(&self, id: &DocumentId) -> Result<bool, AppError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id.as_str() })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.deleted_count > 0)
    }
}
