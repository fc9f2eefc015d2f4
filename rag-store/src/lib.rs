//! Namespaced vector storage for comment embeddings.
//!
//! This crate provides:
//! - [`EmbeddingsProvider`]: the async seam to an embedding model
//! - [`VectorStore`]: upsert/query over a namespaced index
//! - [`QdrantFacade`]: the Qdrant-backed store
//! - [`MemoryStore`]: an in-process store with the same contract

mod config;
mod embed;
mod errors;
mod filters;
mod memory_store;
mod qdrant_facade;
mod record;
mod store;

pub use config::{DistanceKind, RagConfig, VectorSpace};
pub use embed::{EmbeddingsProvider, openai::OpenAiEmbedder};
pub use errors::RagError;
pub use memory_store::MemoryStore;
pub use qdrant_facade::QdrantFacade;
pub use record::{ItemKind, ItemMetadata, Match, RagFilter, StoredItem};
pub use store::{StoreFuture, VectorStore};
