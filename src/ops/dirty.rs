use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::model::article::{ArticleFields, Field};
use crate::model::status::ContentStatus;

/// Derived dirty-state for the editor: which fields changed since the last
/// save, and the coarse status badge. Recomputed on every working-buffer
/// mutation, never stored long-term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirtySnapshot {
    /// Fields whose working value differs from the saved snapshot
    pub changed: IndexSet<Field>,
    pub status: ContentStatus,
}

/// Fields whose working value differs from the last saved snapshot.
///
/// Before any save exists there is nothing to diff against, so the editing
/// surface's own touched-field bookkeeping is the answer. After a save this
/// is a true value diff: a field edited away and back to its saved value
/// drops out of the set.
pub fn changed_fields(
    working: &ArticleFields,
    saved: Option<&ArticleFields>,
    touched: &IndexSet<Field>,
) -> IndexSet<Field> {
    match saved {
        Some(saved) => working.diff(saved),
        None => touched.clone(),
    }
}

/// Derive the coarse status badge. Precedence: conflict, then modified,
/// then never-saved draft, then synced.
pub fn content_status(
    changed: &IndexSet<Field>,
    conflicts: &IndexSet<Field>,
    has_saved: bool,
) -> ContentStatus {
    if !conflicts.is_empty() {
        ContentStatus::Conflict
    } else if !changed.is_empty() {
        ContentStatus::Modified
    } else if !has_saved {
        ContentStatus::Draft
    } else {
        ContentStatus::Synced
    }
}

/// Full dirty scan: changed fields plus derived status. Total function,
/// no failure states.
pub fn scan(
    working: &ArticleFields,
    saved: Option<&ArticleFields>,
    touched: &IndexSet<Field>,
    conflicts: &IndexSet<Field>,
) -> DirtySnapshot {
    let changed = changed_fields(working, saved, touched);
    let status = content_status(&changed, conflicts, saved.is_some());
    DirtySnapshot { changed, status }
}

/// Fields edited on both sides since the shared baseline.
///
/// A field conflicts when the freshly fetched remote value and the local
/// working value both diverged from the held original, and not to the same
/// text. Fields absent from either snapshot never conflict, and a session
/// that has not loaded an original yet cannot conflict at all.
pub fn conflict_fields(
    baseline: &IndexMap<Field, String>,
    remote: &IndexMap<Field, String>,
    working: &ArticleFields,
) -> IndexSet<Field> {
    let mut out = IndexSet::new();
    for field in Field::ALL {
        let Some(base) = baseline.get(&field).map(String::as_str) else {
            continue;
        };
        let Some(theirs) = remote.get(&field).map(String::as_str) else {
            continue;
        };
        let ours = working.get(field);
        if theirs != base && ours != base && ours != theirs {
            out.insert(field);
        }
    }
    out
}
