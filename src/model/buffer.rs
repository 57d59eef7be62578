use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::article::{ArticleFields, Field};

/// The three content representations of one article being edited.
///
/// - `original` is the last snapshot confirmed synced from the
///   authoritative source. It is partial: only the fields the source
///   actually reported are present. It changes only on an explicit
///   refetch, never from local edits.
/// - `working` is the live edit buffer and the single source of truth for
///   what a save will persist.
/// - `drafts` holds at most one pending AI-generated replacement per
///   field. An entry exists only while the suggestion is unresolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBuffer {
    #[serde(default)]
    pub original: IndexMap<Field, String>,
    pub working: ArticleFields,
    #[serde(default)]
    pub drafts: IndexMap<Field, String>,
}

impl ContentBuffer {
    /// Start a buffer for a new editing session. The original snapshot is
    /// empty until the first refetch lands.
    pub fn new(working_seed: ArticleFields) -> Self {
        ContentBuffer {
            original: IndexMap::new(),
            working: working_seed,
            drafts: IndexMap::new(),
        }
    }

    /// The pending draft for a field, if any
    pub fn draft(&self, field: Field) -> Option<&str> {
        self.drafts.get(&field).map(String::as_str)
    }

    pub fn has_draft(&self, field: Field) -> bool {
        self.drafts.contains_key(&field)
    }

    /// Insert or overwrite the pending draft for a field. The working
    /// buffer is not touched.
    pub fn set_draft(&mut self, field: Field, value: impl Into<String>) {
        self.drafts.insert(field, value.into());
    }

    /// Remove the pending draft for a field. Safe to call when none exists.
    pub fn clear_draft(&mut self, field: Field) {
        self.drafts.shift_remove(&field);
    }

    /// Write a value into the working buffer and drop the field's pending
    /// draft in the same step. This is the commit half of an accept.
    pub fn promote(&mut self, field: Field, value: impl Into<String>) {
        self.working.set(field, value);
        self.clear_draft(field);
    }
}
