use async_trait::async_trait;

use crate::model::article::{Article, ArticleFields};

use super::BackendError;

/// Persistence collaborator for the working buffer.
///
/// Implementations own transport, retries, and storage format. The editor
/// only cares whether the write landed; a `None` article means the backend
/// accepted the save but has nothing newer to report back.
#[async_trait]
pub trait SaveBackend: Send + Sync {
    /// Persist the working buffer without changing publication state
    async fn save_draft(&self, fields: &ArticleFields) -> Result<Option<Article>, BackendError>;

    /// Persist the working buffer and mark the article for publication
    async fn save_and_publish(
        &self,
        fields: &ArticleFields,
    ) -> Result<Option<Article>, BackendError>;
}
