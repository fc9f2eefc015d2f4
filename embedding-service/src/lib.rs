//! Batched text embeddings over an OpenAI-compatible HTTP API.
//!
//! - Construct one [`OpenAiEmbeddingService`] at startup and share it (`Arc`).
//! - Every call is all-or-nothing: a failed batch yields no vectors.
//! - Dimensions are checked against the configured model dimension.

pub mod config;
pub mod error_handler;
pub mod services;

pub use config::embedding_config::EmbeddingModelConfig;
pub use error_handler::{ConfigError, EmbeddingError, HttpError};
pub use services::open_ai_service::OpenAiEmbeddingService;
