use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::backend::BackendError;
use crate::backend::generate::{self, GenerateError, GeneratorRegistry, SuggestionBackend};
use crate::backend::publish::{ScheduleOptions, SyncBackend, SyncReport};
use crate::backend::save::SaveBackend;
use crate::model::article::{Article, ArticleFields, Field};
use crate::model::buffer::ContentBuffer;
use crate::model::config::EditorConfig;
use crate::model::status::Platform;
use crate::ops::dirty::{self, DirtySnapshot};
use crate::ops::drafts::{ActionFlags, DraftAction, ProposalLedger};
use crate::ops::seo::{self, SeoAssessment};

/// The external collaborators an editing session is wired to
pub struct EditorBackends {
    pub suggestions: Arc<dyn SuggestionBackend>,
    pub saver: Arc<dyn SaveBackend>,
    pub sync: Arc<dyn SyncBackend>,
}

/// What a regenerate call ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegenerateOutcome {
    /// A fresh draft is staged and the field has a pending proposal
    Proposed,
    /// The backend had nothing to offer; no state changed
    NoSuggestion,
    /// The result arrived after the field's proposal state moved on
    Stale,
    /// No generator is registered for this field
    Unsupported,
}

/// Everything derived from the working buffer, republished on each change
#[derive(Debug, Clone)]
pub struct EditorDerived {
    pub dirty: DirtySnapshot,
    pub seo: SeoAssessment,
}

struct SessionState {
    buffer: ContentBuffer,
    /// Fields the editing surface has written since the session opened
    touched: IndexSet<Field>,
    /// Working values as of the last successful save
    saved: Option<ArticleFields>,
    /// Fields where remote and local edits diverged from the baseline
    conflicts: IndexSet<Field>,
    ledger: ProposalLedger,
}

/// One article-editing session.
///
/// The session is the only mutation surface over the content buffer:
/// editing widgets write fields through it, suggestion verbs stage and
/// settle drafts through it, and saves advance its snapshot. Observers
/// receive immutable value snapshots over watch channels; nothing hands
/// out a live reference into the buffer.
///
/// Construct one when the editor opens and drop it when the editor
/// closes. A session owns exactly one article and is never shared between
/// concurrent editors.
pub struct EditorSession {
    article_id: String,
    config: EditorConfig,
    registry: GeneratorRegistry,
    suggestions: Arc<dyn SuggestionBackend>,
    saver: Arc<dyn SaveBackend>,
    sync: Arc<dyn SyncBackend>,
    state: Mutex<SessionState>,
    buffer_tx: watch::Sender<ContentBuffer>,
    derived_tx: watch::Sender<EditorDerived>,
    flags_tx: watch::Sender<ActionFlags>,
}

impl EditorSession {
    /// Open a session for one article. `seed` is the complete working
    /// record to start editing from; the original snapshot stays empty
    /// until [`EditorSession::refresh_original`] lands one.
    pub fn new(
        article_id: impl Into<String>,
        seed: ArticleFields,
        backends: EditorBackends,
        config: EditorConfig,
    ) -> Self {
        let state = SessionState {
            buffer: ContentBuffer::new(seed),
            touched: IndexSet::new(),
            saved: None,
            conflicts: IndexSet::new(),
            ledger: ProposalLedger::new(),
        };
        let (buffer_tx, _) = watch::channel(state.buffer.clone());
        let (derived_tx, _) = watch::channel(derive(&state));
        let (flags_tx, _) = watch::channel(ActionFlags::default());

        EditorSession {
            article_id: article_id.into(),
            config,
            registry: GeneratorRegistry::standard(),
            suggestions: backends.suggestions,
            saver: backends.saver,
            sync: backends.sync,
            state: Mutex::new(state),
            buffer_tx,
            derived_tx,
            flags_tx,
        }
    }

    /// Replace the dispatch table, e.g. to route extra fields
    pub fn with_registry(mut self, registry: GeneratorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn article_id(&self) -> &str {
        &self.article_id
    }

    // -----------------------------------------------------------------------
    // Form surface
    // -----------------------------------------------------------------------

    /// Current working value of one field
    pub fn field(&self, field: Field) -> String {
        self.state.lock().buffer.working.get(field).to_string()
    }

    /// The complete working record
    pub fn working(&self) -> ArticleFields {
        self.state.lock().buffer.working.clone()
    }

    /// Write one field of the working buffer. Marks the field touched and
    /// republishes the buffer and derived state.
    pub fn set_field(&self, field: Field, value: impl Into<String>) {
        let mut s = self.state.lock();
        s.buffer.working.set(field, value);
        s.touched.insert(field);
        self.publish_buffer(&s);
        self.publish_derived(&s);
    }

    /// Fields written by the editing surface since the session opened
    pub fn touched(&self) -> IndexSet<Field> {
        self.state.lock().touched.clone()
    }

    // -----------------------------------------------------------------------
    // Reads and subscriptions
    // -----------------------------------------------------------------------

    /// Snapshot of all three content representations
    pub fn buffer(&self) -> ContentBuffer {
        self.state.lock().buffer.clone()
    }

    pub fn dirty(&self) -> DirtySnapshot {
        self.derived_tx.borrow().dirty.clone()
    }

    pub fn seo(&self) -> SeoAssessment {
        self.derived_tx.borrow().seo.clone()
    }

    /// Fields with an outstanding proposal banner, oldest first
    pub fn remaining_proposals(&self) -> Vec<Field> {
        self.state.lock().ledger.proposals().iter().copied().collect()
    }

    pub fn flags(&self) -> ActionFlags {
        *self.flags_tx.borrow()
    }

    /// The verb currently holding a field busy, if any
    pub fn field_busy(&self, field: Field) -> Option<DraftAction> {
        self.state.lock().ledger.busy(field)
    }

    /// Whether a field differs from the last saved snapshot
    pub fn is_field_modified(&self, field: Field) -> bool {
        self.derived_tx.borrow().dirty.changed.contains(&field)
    }

    /// Whether a field has a pending suggestion draft
    pub fn is_field_with_draft(&self, field: Field) -> bool {
        self.state.lock().buffer.has_draft(field)
    }

    pub fn watch_buffer(&self) -> watch::Receiver<ContentBuffer> {
        self.buffer_tx.subscribe()
    }

    pub fn watch_derived(&self) -> watch::Receiver<EditorDerived> {
        self.derived_tx.subscribe()
    }

    pub fn watch_flags(&self) -> watch::Receiver<ActionFlags> {
        self.flags_tx.subscribe()
    }

    // -----------------------------------------------------------------------
    // Suggestion verbs
    // -----------------------------------------------------------------------

    /// Ask the AI backend for a replacement draft for one field.
    ///
    /// The draft lands in the buffer, not in the working record: the field
    /// gains a proposal the user settles with [`EditorSession::accept`] or
    /// [`EditorSession::reject`]. A result that comes back after the
    /// field's proposal state has moved on (a newer regenerate, an accept,
    /// or a reject) is dropped.
    pub async fn regenerate(&self, field: Field) -> Result<RegenerateOutcome, GenerateError> {
        let Some(intent) = self.registry.route(field) else {
            debug!(field = %field, "no generator registered, nothing to do");
            return Ok(RegenerateOutcome::Unsupported);
        };

        let (ticket, content, title) = {
            let mut s = self.state.lock();
            let content = s.buffer.working.content.clone();
            if content.trim().is_empty() {
                return Err(GenerateError::NoSource);
            }
            let title = s.buffer.working.title.clone();
            let ticket = s.ledger.begin(field, DraftAction::Regenerating);
            self.publish_flags(&s);
            (ticket, content, title)
        };

        debug!(field = %field, ?intent, "requesting suggestion");
        let result = generate::dispatch(
            self.suggestions.as_ref(),
            intent,
            &content,
            &title,
            self.config.generation.title_variants,
        )
        .await;

        let mut s = self.state.lock();
        s.ledger.finish(field);
        let outcome = match result {
            Err(e) => {
                warn!(field = %field, error = %e, "suggestion request failed");
                self.publish_flags(&s);
                return Err(e.into());
            }
            Ok(None) => RegenerateOutcome::NoSuggestion,
            Ok(Some(text)) => {
                if s.ledger.propose(ticket) {
                    s.buffer.set_draft(field, text);
                    self.publish_buffer(&s);
                    RegenerateOutcome::Proposed
                } else {
                    debug!(field = %field, "dropping stale suggestion");
                    RegenerateOutcome::Stale
                }
            }
        };
        self.publish_flags(&s);
        Ok(outcome)
    }

    /// Promote a field's pending draft into the working buffer and settle
    /// the proposal. A field with no draft is a silent no-op. Returns
    /// whether a draft was promoted.
    pub fn accept(&self, field: Field) -> bool {
        let mut s = self.state.lock();
        let Some(value) = s.buffer.draft(field).map(str::to_string) else {
            return false;
        };
        s.ledger.begin(field, DraftAction::Accepting);
        self.publish_flags(&s);

        // Committed through the same write path as a manual edit, so
        // dirty tracking reacts to the promoted value.
        s.buffer.promote(field, value);
        s.touched.insert(field);
        s.ledger.resolve(field);
        s.ledger.finish(field);
        debug!(field = %field, "accepted draft");

        self.publish_buffer(&s);
        self.publish_derived(&s);
        self.publish_flags(&s);
        true
    }

    /// Discard a field's pending draft and settle the proposal. Safe on a
    /// field with no draft. Returns whether anything was discarded.
    pub fn reject(&self, field: Field) -> bool {
        let mut s = self.state.lock();
        s.ledger.begin(field, DraftAction::Rejecting);
        self.publish_flags(&s);

        let had_draft = s.buffer.has_draft(field);
        s.buffer.clear_draft(field);
        let had_proposal = s.ledger.resolve(field);
        s.ledger.finish(field);

        if had_draft || had_proposal {
            debug!(field = %field, "rejected draft");
            self.publish_buffer(&s);
        }
        self.publish_flags(&s);
        had_draft || had_proposal
    }

    /// Accept every outstanding proposal, oldest first. Returns how many
    /// drafts were promoted.
    pub fn accept_all(&self) -> usize {
        self.remaining_proposals()
            .into_iter()
            .filter(|field| self.accept(*field))
            .count()
    }

    /// Discard every outstanding proposal. Returns how many were dropped.
    pub fn reject_all(&self) -> usize {
        self.remaining_proposals()
            .into_iter()
            .filter(|field| self.reject(*field))
            .count()
    }

    /// Generate an opening paragraph from the current content. The text is
    /// returned for the editing surface to insert, not staged as a draft.
    pub async fn generate_intro(&self) -> Result<Option<String>, GenerateError> {
        self.content_assist(Assist::Intro).await
    }

    /// Generate a closing paragraph from the current content
    pub async fn generate_conclusion(&self) -> Result<Option<String>, GenerateError> {
        self.content_assist(Assist::Conclusion).await
    }

    async fn content_assist(&self, which: Assist) -> Result<Option<String>, GenerateError> {
        let content = {
            let mut s = self.state.lock();
            let content = s.buffer.working.content.clone();
            if content.trim().is_empty() {
                return Err(GenerateError::NoSource);
            }
            s.ledger.begin(Field::Content, DraftAction::Regenerating);
            self.publish_flags(&s);
            content
        };

        let result = match which {
            Assist::Intro => self.suggestions.generate_intro(&content).await,
            Assist::Conclusion => self.suggestions.generate_conclusion(&content).await,
        };

        let mut s = self.state.lock();
        s.ledger.finish(Field::Content);
        self.publish_flags(&s);
        match result {
            Err(e) => {
                warn!(error = %e, "content assist failed");
                Err(e.into())
            }
            Ok(text) => Ok(text.filter(|t| !t.trim().is_empty())),
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Persist the working buffer as a draft.
    ///
    /// On success the saved snapshot advances to the value captured at
    /// call time, so dirty tracking resets while edits made during the
    /// save stay dirty. Conflicts clear: the save establishes a new agreed
    /// baseline.
    pub async fn save_draft(&self) -> Result<Option<Article>, BackendError> {
        self.save_with(false).await
    }

    /// Persist the working buffer and mark the article for publication
    pub async fn save_and_publish(&self) -> Result<Option<Article>, BackendError> {
        self.save_with(true).await
    }

    async fn save_with(&self, publish: bool) -> Result<Option<Article>, BackendError> {
        let fields = self.working();
        debug!(article = %self.article_id, publish, "saving working buffer");

        let result = if publish {
            self.saver.save_and_publish(&fields).await
        } else {
            self.saver.save_draft(&fields).await
        };

        match result {
            Err(e) => {
                warn!(article = %self.article_id, error = %e, "save failed");
                Err(e)
            }
            Ok(article) => {
                let mut s = self.state.lock();
                s.saved = Some(fields);
                s.conflicts.clear();
                self.publish_derived(&s);
                Ok(article)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Remote reconciliation
    // -----------------------------------------------------------------------

    /// Replace the original snapshot with a freshly fetched remote
    /// version, flagging fields edited on both sides since the previous
    /// baseline. Conflicts stand until the next successful save.
    pub fn refresh_original(&self, remote: IndexMap<Field, String>) {
        let mut s = self.state.lock();
        let conflicts = dirty::conflict_fields(&s.buffer.original, &remote, &s.buffer.working);
        if !conflicts.is_empty() {
            warn!(
                article = %self.article_id,
                fields = ?conflicts.iter().map(|f| f.as_str()).collect::<Vec<_>>(),
                "remote edits conflict with local changes"
            );
        }
        s.conflicts = conflicts;
        s.buffer.original = remote;
        self.publish_buffer(&s);
        self.publish_derived(&s);
    }

    /// Fields currently in conflict with the remote version
    pub fn conflicts(&self) -> IndexSet<Field> {
        self.state.lock().conflicts.clone()
    }

    // -----------------------------------------------------------------------
    // Publication sync pass-through
    // -----------------------------------------------------------------------

    /// Current sync state, straight from the sync backend
    pub fn sync_report(&self) -> SyncReport {
        self.sync.report()
    }

    pub fn is_published(&self) -> bool {
        self.sync.report().is_published()
    }

    pub fn is_scheduled(&self) -> bool {
        self.sync.report().is_scheduled()
    }

    /// Push to the given platforms now, or to the configured defaults
    pub async fn publish_now(&self, platforms: Option<&[Platform]>) -> Result<(), BackendError> {
        let platforms = match platforms {
            Some(p) => p.to_vec(),
            None => self.config.publish.default_platforms.clone(),
        };
        debug!(article = %self.article_id, ?platforms, "publishing");
        self.sync.publish_now(&platforms).await
    }

    pub async fn schedule_publish(&self, options: &ScheduleOptions) -> Result<(), BackendError> {
        debug!(article = %self.article_id, at = %options.publish_at, "scheduling publish");
        self.sync.schedule_publish(options).await
    }

    pub async fn retry_sync(&self, platform: Platform) -> Result<(), BackendError> {
        debug!(article = %self.article_id, platform = %platform, "retrying sync");
        self.sync.retry_sync(platform).await
    }

    // -----------------------------------------------------------------------
    // Publication of value snapshots
    // -----------------------------------------------------------------------

    fn publish_buffer(&self, s: &SessionState) {
        self.buffer_tx.send_replace(s.buffer.clone());
    }

    fn publish_derived(&self, s: &SessionState) {
        self.derived_tx.send_replace(derive(s));
    }

    fn publish_flags(&self, s: &SessionState) {
        self.flags_tx.send_replace(s.ledger.flags());
    }
}

#[derive(Debug, Clone, Copy)]
enum Assist {
    Intro,
    Conclusion,
}

fn derive(s: &SessionState) -> EditorDerived {
    EditorDerived {
        dirty: dirty::scan(
            &s.buffer.working,
            s.saved.as_ref(),
            &s.touched,
            &s.conflicts,
        ),
        seo: seo::assess(&s.buffer.working),
    }
}
