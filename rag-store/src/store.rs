//! Namespaced vector store contract.

use std::{future::Future, pin::Pin};

use crate::errors::RagError;
use crate::record::{Match, RagFilter, StoredItem};

/// Boxed future returned by [`VectorStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RagError>> + Send + 'a>>;

/// Upsert/query capability over a namespaced vector index.
///
/// Implementations must treat `namespace` as an isolated partition: a query
/// never returns items upserted under a different namespace.
pub trait VectorStore: Send + Sync {
    /// Inserts or overwrites items by id. Returns the number of items written.
    ///
    /// Items are written in chunks; chunks written before a failure stay
    /// committed.
    fn upsert<'a>(&'a self, namespace: &'a str, items: Vec<StoredItem>) -> StoreFuture<'a, usize>;

    /// Returns up to `top_k` matches in descending score order, restricted to
    /// items whose metadata satisfies every predicate in `filter`.
    fn query<'a>(
        &'a self,
        namespace: &'a str,
        vector: &'a [f32],
        top_k: usize,
        filter: &'a RagFilter,
    ) -> StoreFuture<'a, Vec<Match>>;
}
