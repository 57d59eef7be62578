use async_trait::async_trait;
use indexmap::IndexMap;

use crate::model::article::Field;

use super::BackendError;

/// Error type for the suggestion verbs
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("nothing to generate from: write some content first")]
    NoSource,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// AI generation collaborator.
///
/// Each call returns the generated text, or `None`/an empty list when the
/// model had nothing useful to offer. "No suggestion" is a quiet outcome,
/// never an error; errors are reserved for failed requests.
#[async_trait]
pub trait SuggestionBackend: Send + Sync {
    /// Generate an opening paragraph for the given content
    async fn generate_intro(&self, content: &str) -> Result<Option<String>, BackendError>;

    /// Generate a closing paragraph for the given content
    async fn generate_conclusion(&self, content: &str) -> Result<Option<String>, BackendError>;

    /// Suggest up to `limit` replacement titles, best first
    async fn suggest_titles(
        &self,
        content: &str,
        current_title: &str,
        limit: usize,
    ) -> Result<Vec<String>, BackendError>;

    /// Generate a search-result meta description
    async fn generate_meta_description(
        &self,
        content: &str,
        title: &str,
    ) -> Result<Option<String>, BackendError>;

    /// Generate a short excerpt for listing pages
    async fn generate_excerpt(&self, content: &str) -> Result<Option<String>, BackendError>;
}

/// Which kind of suggestion a field regenerates with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationIntent {
    TitleSuggestion,
    Excerpt,
    MetaDescription,
}

/// Explicit dispatch table from field to generation intent.
///
/// Fields without a route simply cannot regenerate; asking is a no-op for
/// the caller, not an error.
#[derive(Debug, Clone)]
pub struct GeneratorRegistry {
    routes: IndexMap<Field, GenerationIntent>,
}

impl GeneratorRegistry {
    /// The standard routes of the article editor
    pub fn standard() -> Self {
        let mut registry = GeneratorRegistry {
            routes: IndexMap::new(),
        };
        registry.register(Field::Title, GenerationIntent::TitleSuggestion);
        registry.register(Field::SeoTitle, GenerationIntent::TitleSuggestion);
        registry.register(Field::Excerpt, GenerationIntent::Excerpt);
        registry.register(Field::SeoDescription, GenerationIntent::MetaDescription);
        registry
    }

    /// Add or replace a route
    pub fn register(&mut self, field: Field, intent: GenerationIntent) {
        self.routes.insert(field, intent);
    }

    /// The intent a field regenerates with, if any
    pub fn route(&self, field: Field) -> Option<GenerationIntent> {
        self.routes.get(&field).copied()
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        GeneratorRegistry::standard()
    }
}

/// Run one intent against the backend and normalize the result: blank
/// output collapses to `None`, and title suggestions reduce to the top
/// candidate.
pub async fn dispatch(
    backend: &dyn SuggestionBackend,
    intent: GenerationIntent,
    content: &str,
    current_title: &str,
    title_limit: usize,
) -> Result<Option<String>, BackendError> {
    let result = match intent {
        GenerationIntent::TitleSuggestion => backend
            .suggest_titles(content, current_title, title_limit)
            .await?
            .into_iter()
            .next(),
        GenerationIntent::MetaDescription => {
            backend.generate_meta_description(content, current_title).await?
        }
        GenerationIntent::Excerpt => backend.generate_excerpt(content).await?,
    };
    Ok(result.filter(|text| !text.trim().is_empty()))
}
