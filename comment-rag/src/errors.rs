//! Error taxonomy surfaced by [`crate::CommentRag`] operations.
//!
//! Lower crates keep their own enums; they are folded into
//! [`CommentRagError`] here so an invoking layer can map each kind to a
//! stable code and HTTP status.

use channel_sources::SourceError;
use embedding_service::EmbeddingError;
use rag_store::RagError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CommentRagError>;

#[derive(Debug, Error)]
pub enum CommentRagError {
    /// Rejected input; no network call was made.
    #[error("validation error: {0}")]
    Validation(String),

    /// Non-success status or malformed payload from a named dependency.
    #[error("upstream {service} failed at {url} (status {status:?}): {body}")]
    Upstream {
        service: String,
        url: String,
        status: Option<u16>,
        body: String,
    },

    /// Connect or timeout failure talking to a named dependency.
    #[error("network error calling {service} at {url}: {message}")]
    Network {
        service: String,
        url: String,
        message: String,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl CommentRagError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            CommentRagError::Validation(_) => "VALIDATION_ERROR",
            CommentRagError::Upstream { .. } => "UPSTREAM_ERROR",
            CommentRagError::Network { .. } => "NETWORK_ERROR",
            CommentRagError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Suggested HTTP status for an invoking layer.
    pub fn http_status(&self) -> u16 {
        match self {
            CommentRagError::Validation(_) => 400,
            CommentRagError::Upstream { .. } | CommentRagError::Network { .. } => 502,
            CommentRagError::Internal(_) => 500,
        }
    }
}

impl From<SourceError> for CommentRagError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Upstream {
                service,
                url,
                status,
                body,
            } => CommentRagError::Upstream {
                service: service.to_string(),
                url,
                status,
                body,
            },
            SourceError::Network {
                service,
                url,
                message,
            } => CommentRagError::Network {
                service: service.to_string(),
                url,
                message,
            },
            SourceError::Config(msg) => CommentRagError::Internal(msg),
        }
    }
}

impl From<RagError> for CommentRagError {
    fn from(e: RagError) -> Self {
        CommentRagError::Internal(e.to_string())
    }
}

impl From<EmbeddingError> for CommentRagError {
    fn from(e: EmbeddingError) -> Self {
        CommentRagError::Internal(e.to_string())
    }
}
