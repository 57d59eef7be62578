use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::status::{Platform, SyncStatus};

use super::BackendError;

/// Current publication state across target platforms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Rolled-up status across all platforms
    pub status: SyncStatus,
    /// When a scheduled publish will run, if one is set
    #[serde(default)]
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Per-platform detail, in display order
    #[serde(default)]
    pub platforms: IndexMap<Platform, SyncStatus>,
}

impl SyncReport {
    /// Whether the article is live somewhere
    pub fn is_published(&self) -> bool {
        matches!(self.status, SyncStatus::Synced | SyncStatus::Partial)
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled_for.is_some()
    }
}

/// Options for a scheduled publish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOptions {
    pub publish_at: DateTime<Utc>,
    pub platforms: Vec<Platform>,
}

/// Publication sync collaborator.
///
/// The editor reads state from it and forwards user intent to it; it never
/// mutates sync state itself, and it never retries on the backend's behalf.
#[async_trait]
pub trait SyncBackend: Send + Sync {
    /// Read-only view of the current sync state
    fn report(&self) -> SyncReport;

    /// Push to the given platforms immediately
    async fn publish_now(&self, platforms: &[Platform]) -> Result<(), BackendError>;

    /// Arrange a publish at a later time
    async fn schedule_publish(&self, options: &ScheduleOptions) -> Result<(), BackendError>;

    /// Retry a failed push on one platform
    async fn retry_sync(&self, platform: Platform) -> Result<(), BackendError>;
}
