//! End-to-end tests for an editing session wired to scripted fake
//! backends: suggestion queues, a gateable saver, and a recording sync
//! collaborator.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::Notify;

use copydesk::{
    ActionFlags, Article, ArticleFields, BackendError, ContentStatus, DraftAction, EditorBackends,
    EditorConfig, EditorSession, Field, GenerateError, Platform, RegenerateOutcome, SaveBackend,
    ScheduleOptions, SuggestionBackend, SyncBackend, SyncReport, SyncStatus,
};

// ---------------------------------------------------------------------------
// Fake backends
// ---------------------------------------------------------------------------

/// Suggestion backend answering from per-intent queues. When a gate is
/// set, every call waits for one `notify_one` before answering, which
/// lets tests interleave user actions with in-flight generation.
#[derive(Default)]
struct FakeSuggestions {
    titles: Mutex<VecDeque<Vec<String>>>,
    excerpts: Mutex<VecDeque<Option<String>>>,
    descriptions: Mutex<VecDeque<Option<String>>>,
    intros: Mutex<VecDeque<Option<String>>>,
    gate: Mutex<Option<Arc<Notify>>>,
    fail_next: Mutex<bool>,
    title_limits_seen: Mutex<Vec<usize>>,
}

impl FakeSuggestions {
    async fn answer(&self) -> Result<(), BackendError> {
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if std::mem::take(&mut *self.fail_next.lock()) {
            return Err(BackendError::Request("model timed out".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl SuggestionBackend for FakeSuggestions {
    async fn generate_intro(&self, _content: &str) -> Result<Option<String>, BackendError> {
        self.answer().await?;
        Ok(self
            .intros
            .lock()
            .pop_front()
            .unwrap_or(Some("Fresh intro.".into())))
    }

    async fn generate_conclusion(&self, _content: &str) -> Result<Option<String>, BackendError> {
        self.answer().await?;
        Ok(Some("Fresh conclusion.".into()))
    }

    async fn suggest_titles(
        &self,
        _content: &str,
        _current_title: &str,
        limit: usize,
    ) -> Result<Vec<String>, BackendError> {
        self.answer().await?;
        self.title_limits_seen.lock().push(limit);
        Ok(self.titles.lock().pop_front().unwrap_or_default())
    }

    async fn generate_meta_description(
        &self,
        _content: &str,
        _title: &str,
    ) -> Result<Option<String>, BackendError> {
        self.answer().await?;
        Ok(self.descriptions.lock().pop_front().unwrap_or(None))
    }

    async fn generate_excerpt(&self, _content: &str) -> Result<Option<String>, BackendError> {
        self.answer().await?;
        Ok(self.excerpts.lock().pop_front().unwrap_or(None))
    }
}

/// Save backend recording every write, gateable like the suggestions
#[derive(Default)]
struct FakeSaver {
    gate: Mutex<Option<Arc<Notify>>>,
    saves: Mutex<Vec<ArticleFields>>,
    fail_next: Mutex<bool>,
}

impl FakeSaver {
    async fn write(&self, fields: &ArticleFields) -> Result<Option<Article>, BackendError> {
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if std::mem::take(&mut *self.fail_next.lock()) {
            return Err(BackendError::Request("storage rejected the write".into()));
        }
        self.saves.lock().push(fields.clone());
        Ok(Some(Article {
            id: "article-7".into(),
            fields: fields.clone(),
            updated_at: Utc::now(),
        }))
    }
}

#[async_trait]
impl SaveBackend for FakeSaver {
    async fn save_draft(&self, fields: &ArticleFields) -> Result<Option<Article>, BackendError> {
        self.write(fields).await
    }

    async fn save_and_publish(
        &self,
        fields: &ArticleFields,
    ) -> Result<Option<Article>, BackendError> {
        self.write(fields).await
    }
}

/// Sync backend that records intent and reports whatever it is told to
#[derive(Default)]
struct FakeSync {
    report: Mutex<SyncReport>,
    published: Mutex<Vec<Vec<Platform>>>,
    scheduled: Mutex<Vec<ScheduleOptions>>,
    retried: Mutex<Vec<Platform>>,
}

#[async_trait]
impl SyncBackend for FakeSync {
    fn report(&self) -> SyncReport {
        self.report.lock().clone()
    }

    async fn publish_now(&self, platforms: &[Platform]) -> Result<(), BackendError> {
        self.published.lock().push(platforms.to_vec());
        Ok(())
    }

    async fn schedule_publish(&self, options: &ScheduleOptions) -> Result<(), BackendError> {
        self.scheduled.lock().push(options.clone());
        Ok(())
    }

    async fn retry_sync(&self, platform: Platform) -> Result<(), BackendError> {
        self.retried.lock().push(platform);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    session: Arc<EditorSession>,
    suggestions: Arc<FakeSuggestions>,
    saver: Arc<FakeSaver>,
    sync: Arc<FakeSync>,
}

fn harness(seed: ArticleFields) -> Harness {
    let suggestions = Arc::new(FakeSuggestions::default());
    let saver = Arc::new(FakeSaver::default());
    let sync = Arc::new(FakeSync::default());
    let session = EditorSession::new(
        "article-7",
        seed,
        EditorBackends {
            suggestions: suggestions.clone(),
            saver: saver.clone(),
            sync: sync.clone(),
        },
        EditorConfig::default(),
    );
    Harness {
        session: Arc::new(session),
        suggestions,
        saver,
        sync,
    }
}

fn seeded() -> ArticleFields {
    serde_json::from_value(json!({
        "title": "Old",
        "content": "<p>short</p>",
    }))
    .unwrap()
}

/// Let a spawned session verb run up to its backend await point
async fn settle() {
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
}

// ---------------------------------------------------------------------------
// Draft lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reject_without_a_draft_changes_nothing() {
    let h = harness(seeded());

    assert!(!h.session.reject(Field::Title));
    assert!(h.session.remaining_proposals().is_empty());
    assert!(h.session.buffer().drafts.is_empty());
}

#[tokio::test]
async fn accept_promotes_the_draft_and_clears_it() {
    let h = harness(seeded());
    h.suggestions.titles.lock().push_back(vec!["X".into()]);

    let outcome = h.session.regenerate(Field::Title).await.unwrap();
    assert_eq!(outcome, RegenerateOutcome::Proposed);
    assert_eq!(h.session.buffer().draft(Field::Title), Some("X"));

    assert!(h.session.accept(Field::Title));
    assert_eq!(h.session.field(Field::Title), "X");
    assert!(!h.session.is_field_with_draft(Field::Title));
    assert!(h.session.remaining_proposals().is_empty());

    // A second accept has nothing left to promote.
    assert!(!h.session.accept(Field::Title));
}

#[tokio::test]
async fn full_cycle_from_suggestion_to_working_buffer() {
    let h = harness(seeded());
    h.suggestions
        .titles
        .lock()
        .push_back(vec!["New Title".into(), "Alternative".into()]);

    h.session.regenerate(Field::Title).await.unwrap();
    assert_eq!(h.session.remaining_proposals(), vec![Field::Title]);

    h.session.accept(Field::Title);
    assert_eq!(h.session.field(Field::Title), "New Title");
    assert!(h.session.remaining_proposals().is_empty());
}

#[tokio::test]
async fn regenerate_overwrites_the_prior_draft_in_place() {
    let h = harness(seeded());
    {
        let mut excerpts = h.suggestions.excerpts.lock();
        excerpts.push_back(Some("First take.".into()));
        excerpts.push_back(Some("Second take.".into()));
    }

    h.session.regenerate(Field::Excerpt).await.unwrap();
    h.session.regenerate(Field::Excerpt).await.unwrap();

    let buffer = h.session.buffer();
    assert_eq!(buffer.drafts.len(), 1);
    assert_eq!(buffer.draft(Field::Excerpt), Some("Second take."));
    assert_eq!(h.session.remaining_proposals(), vec![Field::Excerpt]);
}

#[tokio::test]
async fn unrouted_fields_make_regenerate_a_no_op() {
    let h = harness(seeded());

    let outcome = h.session.regenerate(Field::Slug).await.unwrap();
    assert_eq!(outcome, RegenerateOutcome::Unsupported);
    assert!(h.session.buffer().drafts.is_empty());
}

#[tokio::test]
async fn regenerate_without_content_is_a_reported_error() {
    let h = harness(ArticleFields {
        title: "Old".into(),
        ..Default::default()
    });

    let result = h.session.regenerate(Field::Title).await;
    assert!(matches!(result, Err(GenerateError::NoSource)));
    assert_eq!(h.session.flags(), ActionFlags::default());
}

#[tokio::test]
async fn backend_failure_leaves_every_buffer_untouched() {
    let h = harness(seeded());
    *h.suggestions.fail_next.lock() = true;

    let result = h.session.regenerate(Field::Excerpt).await;
    assert!(matches!(result, Err(GenerateError::Backend(_))));
    assert!(h.session.buffer().drafts.is_empty());
    assert!(h.session.remaining_proposals().is_empty());
    assert_eq!(h.session.flags(), ActionFlags::default());
}

#[tokio::test]
async fn blank_suggestions_are_quietly_dropped() {
    let h = harness(seeded());
    h.suggestions.excerpts.lock().push_back(Some("   ".into()));

    let outcome = h.session.regenerate(Field::Excerpt).await.unwrap();
    assert_eq!(outcome, RegenerateOutcome::NoSuggestion);
    assert!(h.session.buffer().drafts.is_empty());
}

#[tokio::test]
async fn title_requests_use_the_configured_variant_count() {
    let h = harness(seeded());
    h.suggestions.titles.lock().push_back(vec!["T".into()]);

    h.session.regenerate(Field::SeoTitle).await.unwrap();
    assert_eq!(h.suggestions.title_limits_seen.lock().clone(), vec![3]);
}

#[tokio::test]
async fn a_result_arriving_after_reject_is_dropped() {
    let h = harness(seeded());
    let gate = Arc::new(Notify::new());
    *h.suggestions.gate.lock() = Some(gate.clone());
    h.suggestions
        .excerpts
        .lock()
        .push_back(Some("Late arrival.".into()));

    let session = h.session.clone();
    let in_flight = tokio::spawn(async move { session.regenerate(Field::Excerpt).await });
    settle().await;

    assert!(h.session.flags().regenerating);
    assert_eq!(
        h.session.field_busy(Field::Excerpt),
        Some(DraftAction::Regenerating)
    );

    // The user dismisses the field while generation is still running.
    h.session.reject(Field::Excerpt);
    gate.notify_one();

    let outcome = in_flight.await.unwrap().unwrap();
    assert_eq!(outcome, RegenerateOutcome::Stale);
    assert!(h.session.buffer().drafts.is_empty());
    assert!(h.session.remaining_proposals().is_empty());
    assert_eq!(h.session.flags(), ActionFlags::default());
}

#[tokio::test]
async fn accept_all_settles_every_proposal_in_order() {
    let h = harness(seeded());
    h.suggestions.titles.lock().push_back(vec!["Bold".into()]);
    h.suggestions
        .excerpts
        .lock()
        .push_back(Some("Short and sweet.".into()));

    h.session.regenerate(Field::Title).await.unwrap();
    h.session.regenerate(Field::Excerpt).await.unwrap();
    assert_eq!(
        h.session.remaining_proposals(),
        vec![Field::Title, Field::Excerpt]
    );

    assert_eq!(h.session.accept_all(), 2);
    assert_eq!(h.session.field(Field::Title), "Bold");
    assert_eq!(h.session.field(Field::Excerpt), "Short and sweet.");
    assert!(h.session.remaining_proposals().is_empty());
    assert!(h.session.buffer().drafts.is_empty());
}

#[tokio::test]
async fn reject_all_discards_without_touching_working_values() {
    let h = harness(seeded());
    h.suggestions.titles.lock().push_back(vec!["Bold".into()]);
    h.suggestions
        .descriptions
        .lock()
        .push_back(Some("A description that nobody asked for.".into()));

    h.session.regenerate(Field::Title).await.unwrap();
    h.session.regenerate(Field::SeoDescription).await.unwrap();

    assert_eq!(h.session.reject_all(), 2);
    assert_eq!(h.session.field(Field::Title), "Old");
    assert_eq!(h.session.field(Field::SeoDescription), "");
    assert!(h.session.remaining_proposals().is_empty());
    assert_eq!(h.session.reject_all(), 0);
}

#[tokio::test]
async fn intro_and_conclusion_are_returned_not_staged() {
    let h = harness(seeded());

    let intro = h.session.generate_intro().await.unwrap();
    assert_eq!(intro.as_deref(), Some("Fresh intro."));

    let conclusion = h.session.generate_conclusion().await.unwrap();
    assert_eq!(conclusion.as_deref(), Some("Fresh conclusion."));

    assert!(h.session.buffer().drafts.is_empty());
    assert!(h.session.remaining_proposals().is_empty());
}

// ---------------------------------------------------------------------------
// Dirty tracking and saves
// ---------------------------------------------------------------------------

#[tokio::test]
async fn a_new_session_reads_as_draft_until_saved() {
    let h = harness(ArticleFields::default());
    assert_eq!(h.session.dirty().status, ContentStatus::Draft);

    h.session.set_field(Field::Title, "Hello");
    assert_eq!(h.session.dirty().status, ContentStatus::Modified);
    assert!(h.session.is_field_modified(Field::Title));
}

#[tokio::test]
async fn edit_and_revert_round_trips_to_synced() {
    let h = harness(seeded());
    h.session.save_draft().await.unwrap();
    assert_eq!(h.session.dirty().status, ContentStatus::Synced);

    h.session.set_field(Field::Title, "Olda");
    assert_eq!(h.session.dirty().status, ContentStatus::Modified);
    assert!(h.session.is_field_modified(Field::Title));

    h.session.set_field(Field::Title, "Old");
    assert!(h.session.dirty().changed.is_empty());
    assert_eq!(h.session.dirty().status, ContentStatus::Synced);
}

#[tokio::test]
async fn accepting_a_draft_marks_the_field_dirty() {
    let h = harness(seeded());
    h.session.save_draft().await.unwrap();
    h.suggestions.titles.lock().push_back(vec!["Bolder".into()]);

    h.session.regenerate(Field::Title).await.unwrap();
    assert_eq!(h.session.dirty().status, ContentStatus::Synced);

    h.session.accept(Field::Title);
    assert!(h.session.is_field_modified(Field::Title));
    assert_eq!(h.session.dirty().status, ContentStatus::Modified);
}

#[tokio::test]
async fn failed_saves_keep_the_buffer_dirty() {
    let h = harness(seeded());
    *h.saver.fail_next.lock() = true;
    h.session.set_field(Field::Title, "Edited");

    assert!(h.session.save_draft().await.is_err());
    assert_eq!(h.session.dirty().status, ContentStatus::Modified);
    assert!(h.saver.saves.lock().is_empty());
}

#[tokio::test]
async fn edits_made_during_a_save_stay_dirty() {
    let h = harness(seeded());
    let gate = Arc::new(Notify::new());
    *h.saver.gate.lock() = Some(gate.clone());

    let session = h.session.clone();
    let in_flight = tokio::spawn(async move { session.save_draft().await });
    settle().await;

    h.session.set_field(Field::Excerpt, "Written mid-save");
    gate.notify_one();
    in_flight.await.unwrap().unwrap();

    let dirty = h.session.dirty();
    assert_eq!(
        dirty.changed.iter().copied().collect::<Vec<_>>(),
        vec![Field::Excerpt]
    );
    assert_eq!(dirty.status, ContentStatus::Modified);
    assert_eq!(h.saver.saves.lock()[0].excerpt, "");
}

// ---------------------------------------------------------------------------
// Remote reconciliation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remote_divergence_flags_conflicts_until_the_next_save() {
    let h = harness(seeded());

    let mut first = IndexMap::new();
    first.insert(Field::Title, "Old".to_string());
    h.session.refresh_original(first);
    assert!(h.session.conflicts().is_empty());

    h.session.set_field(Field::Title, "Mine");

    let mut second = IndexMap::new();
    second.insert(Field::Title, "Theirs".to_string());
    h.session.refresh_original(second);

    assert_eq!(
        h.session.conflicts().iter().copied().collect::<Vec<_>>(),
        vec![Field::Title]
    );
    assert_eq!(h.session.dirty().status, ContentStatus::Conflict);
    assert_eq!(
        h.session.buffer().original.get(&Field::Title).map(String::as_str),
        Some("Theirs")
    );

    h.session.save_draft().await.unwrap();
    assert!(h.session.conflicts().is_empty());
    assert_eq!(h.session.dirty().status, ContentStatus::Synced);
}

#[tokio::test]
async fn clean_refreshes_do_not_conflict() {
    let h = harness(seeded());

    let mut first = IndexMap::new();
    first.insert(Field::Title, "Old".to_string());
    h.session.refresh_original(first);

    // Remote moved, local did not: the new baseline just lands.
    let mut second = IndexMap::new();
    second.insert(Field::Title, "Theirs".to_string());
    h.session.refresh_original(second);

    assert!(h.session.conflicts().is_empty());
}

// ---------------------------------------------------------------------------
// Publication sync pass-through
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_defaults_come_from_config() {
    let h = harness(seeded());

    h.session.publish_now(None).await.unwrap();
    h.session
        .publish_now(Some(&[Platform::WordPress, Platform::WooCommerce]))
        .await
        .unwrap();

    assert_eq!(
        h.sync.published.lock().clone(),
        vec![
            vec![Platform::Blog],
            vec![Platform::WordPress, Platform::WooCommerce],
        ]
    );
}

#[tokio::test]
async fn sync_state_is_read_through_not_owned() {
    let h = harness(seeded());
    assert!(!h.session.is_published());
    assert!(!h.session.is_scheduled());

    *h.sync.report.lock() = SyncReport {
        status: SyncStatus::Partial,
        scheduled_for: Some(Utc::now()),
        platforms: IndexMap::new(),
    };
    assert!(h.session.is_published());
    assert!(h.session.is_scheduled());
}

#[tokio::test]
async fn schedule_and_retry_forward_to_the_backend() {
    let h = harness(seeded());

    let options = ScheduleOptions {
        publish_at: Utc::now() + chrono::Duration::hours(2),
        platforms: vec![Platform::Blog, Platform::WordPress],
    };
    h.session.schedule_publish(&options).await.unwrap();
    h.session.retry_sync(Platform::WooCommerce).await.unwrap();

    assert_eq!(h.sync.scheduled.lock().clone(), vec![options]);
    assert_eq!(h.sync.retried.lock().clone(), vec![Platform::WooCommerce]);
}

// ---------------------------------------------------------------------------
// Observers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn observers_receive_immutable_snapshots() {
    let h = harness(seeded());
    let mut buffers = h.session.watch_buffer();
    let mut derived = h.session.watch_derived();

    h.session.set_field(Field::Title, "Observed");

    buffers.changed().await.unwrap();
    assert_eq!(buffers.borrow().working.title, "Observed");

    derived.changed().await.unwrap();
    let snapshot = derived.borrow().clone();
    assert!(snapshot.dirty.changed.contains(&Field::Title));
}
