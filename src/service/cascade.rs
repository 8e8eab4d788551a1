//! Subtree walks used by archive, restore and cascading delete.
//!
//! Walks use an explicit worklist so tree depth never turns into stack
//! depth. Every lookup is scoped to the owner, so a child that somehow
//! points at another user's document is never reached.

use std::collections::HashSet;

use serde::Deserialize;

use crate::db::models::{DocumentId, DocumentPatch};
use crate::db::repository::DocumentRepository;
use crate::error::AppError;

/// When archive/restore propagate to descendants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CascadeMode {
    /// Spawn the walk and return right after the target is patched.
    /// Descendants settle eventually; walk failures are only logged.
    #[default]
    Background,
    /// Finish the walk before returning; walk failures reach the caller.
    Awaited,
}

/// Set `is_archived = archived` on every descendant of `root`.
///
/// `root` itself is not touched. Returns the number of patched documents.
/// A failure stops the walk where it is; earlier patches are kept.
pub async fn set_archived_below(
    repo: &dyn DocumentRepository,
    user_id: &str,
    root: &DocumentId,
    archived: bool,
) -> Result<usize, AppError> {
    let mut pending = vec![root.clone()];
    let mut visited = HashSet::from([root.clone()]);
    let mut patched = 0;

    while let Some(parent) = pending.pop() {
        let children = repo.find_by_owner_and_parent(user_id, Some(parent)).await?;
        for child in children {
            // guards against parent cycles in malformed data
            if !visited.insert(child.id.clone()) {
                continue;
            }
            repo.patch(&child.id, DocumentPatch::archived(archived))
                .await?;
            patched += 1;
            pending.push(child.id);
        }
    }

    Ok(patched)
}

/// Ids of every descendant of `root`, parents before their children.
pub async fn collect_descendants(
    repo: &dyn DocumentRepository,
    user_id: &str,
    root: &DocumentId,
) -> Result<Vec<DocumentId>, AppError> {
    let mut pending = vec![root.clone()];
    let mut visited = HashSet::from([root.clone()]);
    let mut found = Vec::new();

    while let Some(parent) = pending.pop() {
        for child in repo.find_by_owner_and_parent(user_id, Some(parent)).await? {
            if visited.insert(child.id.clone()) {
                found.push(child.id.clone());
                pending.push(child.id);
            }
        }
    }

    Ok(found)
}
