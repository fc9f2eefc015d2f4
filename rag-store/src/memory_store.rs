//! In-process [`VectorStore`] with cosine similarity.
//!
//! Used by tests and local dry runs. Items are kept per namespace in
//! insertion order; re-upserting an id replaces it in place.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::trace;

use crate::errors::RagError;
use crate::record::{Match, RagFilter, StoredItem};
use crate::store::{StoreFuture, VectorStore};

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, Vec<StoredItem>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids stored under `namespace`, in insertion order.
    pub fn ids(&self, namespace: &str) -> Vec<String> {
        self.read(|map| {
            map.get(namespace)
                .map(|items| items.iter().map(|i| i.id.clone()).collect())
                .unwrap_or_default()
        })
    }

    /// Looks up one item by id.
    pub fn get(&self, namespace: &str, id: &str) -> Option<StoredItem> {
        self.read(|map| {
            map.get(namespace)
                .and_then(|items| items.iter().find(|i| i.id == id).cloned())
        })
    }

    pub fn len(&self, namespace: &str) -> usize {
        self.read(|map| map.get(namespace).map_or(0, Vec::len))
    }

    pub fn is_empty(&self, namespace: &str) -> bool {
        self.len(namespace) == 0
    }

    fn read<T>(&self, f: impl FnOnce(&HashMap<String, Vec<StoredItem>>) -> T) -> T {
        match self.inner.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn upsert_now(&self, namespace: &str, items: Vec<StoredItem>) -> usize {
        let mut guard = match self.inner.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let bucket = guard.entry(namespace.to_string()).or_default();
        let n = items.len();
        for item in items {
            match bucket.iter_mut().find(|existing| existing.id == item.id) {
                Some(slot) => *slot = item,
                None => bucket.push(item),
            }
        }
        trace!(namespace, upserted = n, total = bucket.len(), "memory upsert");
        n
    }

    fn query_now(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        filter: &RagFilter,
    ) -> Result<Vec<Match>, RagError> {
        self.read(|map| {
            let Some(items) = map.get(namespace) else {
                return Ok(Vec::new());
            };

            let mut hits = Vec::new();
            for item in items {
                if item.vector.len() != vector.len() {
                    return Err(RagError::VectorSizeMismatch {
                        got: vector.len(),
                        want: item.vector.len(),
                    });
                }
                let metadata = serde_json::to_value(&item.metadata)?;
                if !filter.matches(&metadata) {
                    continue;
                }
                hits.push(Match {
                    id: item.id.clone(),
                    score: cosine(vector, &item.vector),
                    metadata,
                });
            }

            // Stable: equal scores keep insertion order.
            hits.sort_by(|a, b| b.score.total_cmp(&a.score));
            hits.truncate(top_k);
            Ok(hits)
        })
    }
}

impl VectorStore for MemoryStore {
    fn upsert<'a>(&'a self, namespace: &'a str, items: Vec<StoredItem>) -> StoreFuture<'a, usize> {
        Box::pin(async move { Ok(self.upsert_now(namespace, items)) })
    }

    fn query<'a>(
        &'a self,
        namespace: &'a str,
        vector: &'a [f32],
        top_k: usize,
        filter: &'a RagFilter,
    ) -> StoreFuture<'a, Vec<Match>> {
        Box::pin(async move { self.query_now(namespace, vector, top_k, filter) })
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ItemKind, ItemMetadata};

    fn item(id: &str, kind: ItemKind, video: &str, text: &str, vector: Vec<f32>) -> StoredItem {
        StoredItem {
            id: id.into(),
            vector,
            metadata: ItemMetadata {
                kind,
                video_id: video.into(),
                text: text.into(),
                source: "youtube".into(),
                ingested_at: "2025-01-01T00:00:00+00:00".into(),
            },
        }
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let store = MemoryStore::new();
        store
            .upsert("ns", vec![item("a", ItemKind::Comment, "v1", "old", vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .upsert("ns", vec![item("a", ItemKind::Comment, "v1", "new", vec![1.0, 0.0])])
            .await
            .unwrap();
        assert_eq!(store.ids("ns"), vec!["a"]);
        assert_eq!(store.get("ns", "a").unwrap().metadata.text, "new");
    }

    #[tokio::test]
    async fn query_ranks_and_filters() {
        let store = MemoryStore::new();
        store
            .upsert(
                "ns",
                vec![
                    item("c1", ItemKind::Comment, "v1", "near", vec![1.0, 0.0]),
                    item("c2", ItemKind::Comment, "v2", "far", vec![0.0, 1.0]),
                    item("d1", ItemKind::VideoDoc, "v1", "doc", vec![1.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        let comments = RagFilter::kind(ItemKind::Comment);
        let hits = store.query("ns", &[1.0, 0.1], 10, &comments).await.unwrap();
        assert_eq!(
            hits.iter().map(|h| h.id.as_str()).collect::<Vec<_>>(),
            vec!["c1", "c2"]
        );
        assert!(hits[0].score > hits[1].score);

        let only_v2 = RagFilter::kind(ItemKind::Comment).eq("video_id", "v2");
        let hits = store.query("ns", &[1.0, 0.0], 10, &only_v2).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].video_id(), Some("v2"));
    }

    #[tokio::test]
    async fn namespaces_are_isolated() {
        let store = MemoryStore::new();
        store
            .upsert("a", vec![item("x", ItemKind::Comment, "v1", "t", vec![1.0])])
            .await
            .unwrap();
        let hits = store
            .query("b", &[1.0], 5, &RagFilter::default())
            .await
            .unwrap();
        assert!(hits.is_empty());
        assert_eq!(store.len("a"), 1);
    }

    #[tokio::test]
    async fn top_k_truncates() {
        let store = MemoryStore::new();
        let items = (0..5)
            .map(|i| item(&format!("c{i}"), ItemKind::Comment, "v", "t", vec![1.0, i as f32]))
            .collect();
        store.upsert("ns", items).await.unwrap();
        let hits = store
            .query("ns", &[1.0, 0.0], 2, &RagFilter::default())
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "c0");
    }
}
