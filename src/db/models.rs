use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier of a record in the `documents` collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A note owned by a single user, stored in the `documents` collection.
///
/// Documents form a per-user forest through `parent_document`. The parent
/// is expected to belong to the same owner; this is guaranteed by scoping
/// every lookup to the owner rather than by a stored constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub title: String,
    /// Owner. Never changes after creation.
    pub user_id: String,
    /// Parent document. `None` means the document sits at the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_document: Option<DocumentId>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_published: bool,
    /// Insertion time; listings are ordered by it, newest first.
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub creation_time: DateTime<Utc>,
}

impl Document {
    /// Build a fresh, unarchived and unpublished document.
    pub fn new(title: String, user_id: String, parent_document: Option<DocumentId>) -> Self {
        Self {
            id: DocumentId::generate(),
            title,
            user_id,
            parent_document,
            is_archived: false,
            is_published: false,
            creation_time: next_creation_time(),
        }
    }
}

static LAST_CREATION_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Current time at microsecond precision, strictly increasing within the
/// process so that two documents never share a creation time.
fn next_creation_time() -> DateTime<Utc> {
    let now = Utc::now().trunc_subsecs(6);
    let now_micros = now.timestamp_micros();
    let previous = LAST_CREATION_MICROS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now_micros.max(last.saturating_add(1)))
        })
        .unwrap_or(now_micros);
    let micros = now_micros.max(previous.saturating_add(1));
    DateTime::from_timestamp_micros(micros).unwrap_or(now)
}

/// Partial update applied to a stored document.
///
/// `parent_document: Some(None)` clears the parent reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    pub is_archived: Option<bool>,
    pub parent_document: Option<Option<DocumentId>>,
}

impl DocumentPatch {
    pub fn archived(flag: bool) -> Self {
        Self {
            is_archived: Some(flag),
            parent_document: None,
        }
    }

    /// Also clear the parent reference.
    pub fn detached(mut self) -> Self {
        self.parent_document = Some(None);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.is_archived.is_none() && self.parent_document.is_none()
    }

    pub fn apply(&self, doc: &mut Document) {
        if let Some(flag) = self.is_archived {
            doc.is_archived = flag;
        }
        if let Some(parent) = &self.parent_document {
            doc.parent_document = parent.clone();
        }
    }
}

/// Request payload for `create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub title: String,
    #[serde(default)]
    pub parent_document: Option<DocumentId>,
}

/// Query string for `getSidebar`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarQuery {
    #[serde(default)]
    pub parent_document: Option<DocumentId>,
}
