use crate::errors::RagError;
use std::{future::Future, pin::Pin};

/// Provider interface for embedding generation.
///
/// Async is required because real providers (OpenAI, etc.) perform HTTP
/// requests. Implementations must return exactly one vector per input, in
/// input order, each of length [`EmbeddingsProvider::dim`], or fail the whole
/// batch.
pub trait EmbeddingsProvider: Send + Sync {
    /// Dimensionality of every vector this provider returns.
    fn dim(&self) -> usize;

    /// Async batched embedding function.
    fn embed_batch<'a>(
        &'a self,
        texts: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Vec<f32>>, RagError>> + Send + 'a>>;
}

pub mod openai;
