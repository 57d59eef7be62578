pub mod generate;
pub mod publish;
pub mod save;

pub use generate::*;
pub use publish::*;
pub use save::*;

/// Error from an external collaborator (AI, persistence, or sync).
/// Messages are short and human-readable; the surface shows them as-is.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend unavailable")]
    Unavailable,
    #[error("request failed: {0}")]
    Request(String),
}
