//! copydesk: the state engine behind an AI-assisted article editor.
//!
//! An editing session holds three representations of one article: the
//! `original` snapshot last confirmed synced from the authoritative
//! source, the live `working` buffer the user edits, and per-field AI
//! `drafts` awaiting accept or reject. [`EditorSession`] is the single
//! mutation surface over all three; from every change it derives which
//! fields are dirty, a coarse content status, and an SEO assessment, and
//! republishes them as immutable snapshots.
//!
//! The rich-text surface, persistence transport, AI generation, and
//! multi-platform publication are collaborators behind the traits in
//! [`backend`]; this crate implements none of them.

pub mod backend;
pub mod model;
pub mod ops;
pub mod session;

pub use backend::{
    BackendError, GenerateError, GenerationIntent, GeneratorRegistry, SaveBackend,
    ScheduleOptions, SuggestionBackend, SyncBackend, SyncReport,
};
pub use model::{
    Article, ArticleFields, ConfigError, ContentBuffer, ContentStatus, EditorConfig, Field,
    Platform, SyncStatus,
};
pub use ops::{ActionFlags, DirtySnapshot, DraftAction, SeoAssessment, SeoCheck, Severity};
pub use session::{EditorBackends, EditorDerived, EditorSession, RegenerateOutcome};
