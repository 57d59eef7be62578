use serde::{Deserialize, Serialize};

/// Coarse state of the working buffer relative to its saved snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    /// Working buffer matches the last saved snapshot
    Synced,
    /// At least one field differs from the last saved snapshot
    Modified,
    /// The article has never been saved in this session
    Draft,
    /// Remote and local edits diverged from the shared baseline
    Conflict,
}

impl std::fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContentStatus::Synced => "synced",
            ContentStatus::Modified => "modified",
            ContentStatus::Draft => "draft",
            ContentStatus::Conflict => "conflict",
        };
        f.write_str(s)
    }
}

/// Publication sync state, as reported by the sync backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Not yet pushed anywhere
    #[default]
    Draft,
    /// Queued for publication
    Pending,
    /// A push is in progress
    Syncing,
    /// Live on every target platform
    Synced,
    /// The last push failed everywhere
    Failed,
    /// Live on some platforms, failed on others
    Partial,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SyncStatus::Draft => "draft",
            SyncStatus::Pending => "pending",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Synced => "synced",
            SyncStatus::Failed => "failed",
            SyncStatus::Partial => "partial",
        };
        f.write_str(s)
    }
}

/// A publication target platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// The native blog
    Blog,
    WooCommerce,
    WordPress,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Platform::Blog => "blog",
            Platform::WooCommerce => "woocommerce",
            Platform::WordPress => "wordpress",
        };
        f.write_str(s)
    }
}
