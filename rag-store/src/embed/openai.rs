//! OpenAI embedding provider implementation.
//!
//! Adapts the shared [`OpenAiEmbeddingService`] to [`EmbeddingsProvider`].

use std::sync::Arc;

use embedding_service::OpenAiEmbeddingService;
use tracing::trace;

use crate::{EmbeddingsProvider, RagError};

/// OpenAI embedding provider (async).
#[derive(Clone)]
pub struct OpenAiEmbedder {
    pub svc: Arc<OpenAiEmbeddingService>,
}

impl OpenAiEmbedder {
    /// Wraps an already constructed service.
    pub fn new(svc: Arc<OpenAiEmbeddingService>) -> Self {
        Self { svc }
    }
}

impl EmbeddingsProvider for OpenAiEmbedder {
    fn dim(&self) -> usize {
        self.svc.dim()
    }

    fn embed_batch<'a>(
        &'a self,
        texts: &'a [String],
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<Vec<f32>>, RagError>> + Send + 'a>,
    > {
        Box::pin(async move {
            trace!("OpenAiEmbedder::embed_batch n={}", texts.len());
            let vectors = self.svc.embed_batch(texts).await?;

            if vectors.len() != texts.len() {
                return Err(RagError::EmbeddingCount {
                    got: vectors.len(),
                    want: texts.len(),
                });
            }

            Ok(vectors)
        })
    }
}
