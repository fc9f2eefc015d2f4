//! Unified error types for the crate.

use embedding_service::EmbeddingError;
use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// JSON parsing / serialization errors.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Mismatch in vector dimensionality.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// Embedding provider failed; the whole batch is lost.
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Provider returned a different number of vectors than inputs.
    #[error("embedding count mismatch: got {got}, want {want}")]
    EmbeddingCount { got: usize, want: usize },

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),
}
