//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! This facade concentrates all Qdrant interactions behind [`VectorStore`],
//! hiding away the verbose builder pattern and keeping the rest of the
//! application decoupled from `qdrant-client`.
//!
//! Point ids are UUIDv5 values derived from `<namespace>/<item id>`; the
//! logical id and namespace are kept in the payload (`item_id`, `namespace`).

use std::collections::HashMap;

use crate::config::{DistanceKind, RagConfig, VectorSpace};
use crate::errors::RagError;
use crate::filters::{NAMESPACE_KEY, to_qdrant_filter};
use crate::record::{Match, RagFilter, StoredItem};
use crate::store::{StoreFuture, VectorStore};

use qdrant_client::qdrant::{
    CreateCollectionBuilder, CreateFieldIndexCollectionBuilder, Distance, FieldType, PointStruct,
    SearchParamsBuilder, SearchPointsBuilder, UpsertPointsBuilder, Value as QValue,
    VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use services::uuid::namespaced_uuid;
use tracing::{debug, info, warn};

/// Payload key holding the logical item id.
pub const ITEM_ID_KEY: &str = "item_id";

/// Payload fields that get a keyword index on collection creation.
const INDEXED_FIELDS: [&str; 3] = [NAMESPACE_KEY, "type", "video_id"];

/// A facade over the Qdrant client to keep the rest of the code clean and stable.
///
/// This struct encapsulates:
/// - The underlying Qdrant client.
/// - The target collection name.
/// - The vector space every point must fit.
pub struct QdrantFacade {
    client: Qdrant,
    collection: String,
    space: VectorSpace,
    upsert_batch: usize,
    exact_search: bool,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// Uses the builder-based API of `qdrant-client` and supports
    /// optional API key authentication.
    pub fn new(cfg: &RagConfig, space: VectorSpace) -> Result<Self, RagError> {
        cfg.validate()?;
        if space.size == 0 {
            return Err(RagError::Config("vector size must be > 0".into()));
        }

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
            space,
            upsert_batch: cfg.upsert_batch,
            exact_search: cfg.exact_search,
        })
    }

    /// Ensures that the collection exists in Qdrant.
    ///
    /// - If the collection already exists → no-op.
    /// - If missing → creates it with the configured vector space and keyword
    ///   payload indexes on `namespace`, `type` and `video_id`.
    pub async fn ensure_collection(&self) -> Result<(), RagError> {
        info!(
            collection = %self.collection,
            size = self.space.size,
            distance = ?self.space.distance,
            "ensuring collection"
        );

        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        if exists {
            debug!("Collection '{}' already exists", self.collection);
            return Ok(());
        }

        warn!("Collection '{}' not found, creating", self.collection);

        let distance = match self.space.distance {
            DistanceKind::Cosine => Distance::Cosine,
            DistanceKind::Dot => Distance::Dot,
            DistanceKind::Euclid => Distance::Euclid,
        };

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(self.space.size as u64, distance)),
            )
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        for field in INDEXED_FIELDS {
            self.client
                .create_field_index(CreateFieldIndexCollectionBuilder::new(
                    &self.collection,
                    field,
                    FieldType::Keyword,
                ))
                .await
                .map_err(|e| RagError::Qdrant(e.to_string()))?;
        }

        info!("Collection '{}' created successfully", self.collection);
        Ok(())
    }

    fn to_point(&self, namespace: &str, item: StoredItem) -> Result<PointStruct, RagError> {
        if item.vector.len() != self.space.size {
            return Err(RagError::VectorSizeMismatch {
                got: item.vector.len(),
                want: self.space.size,
            });
        }

        let mut payload = serde_json::to_value(&item.metadata)?;
        if let serde_json::Value::Object(map) = &mut payload {
            map.insert(ITEM_ID_KEY.into(), item.id.clone().into());
            map.insert(NAMESPACE_KEY.into(), namespace.into());
        }
        let payload = Payload::try_from(payload).map_err(|e| RagError::Qdrant(e.to_string()))?;

        let point_id = namespaced_uuid(namespace, &item.id).to_string();
        Ok(PointStruct::new(point_id, item.vector, payload))
    }

    async fn upsert_items(
        &self,
        namespace: &str,
        items: Vec<StoredItem>,
    ) -> Result<usize, RagError> {
        if items.is_empty() {
            debug!("No points provided for upsert");
            return Ok(0);
        }

        let points = items
            .into_iter()
            .map(|item| self.to_point(namespace, item))
            .collect::<Result<Vec<_>, _>>()?;

        let total = points.len();
        let mut written = 0usize;
        for chunk in points.chunks(self.upsert_batch) {
            self.client
                .upsert_points(
                    UpsertPointsBuilder::new(&self.collection, chunk.to_vec()).wait(true),
                )
                .await
                .map_err(|e| RagError::Qdrant(e.to_string()))?;
            written += chunk.len();
            debug!(
                collection = %self.collection,
                written,
                total,
                "upsert chunk acknowledged"
            );
        }

        info!(
            collection = %self.collection,
            namespace,
            upserted = written,
            "upsert completed"
        );
        Ok(written)
    }

    async fn search(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        filter: &RagFilter,
    ) -> Result<Vec<Match>, RagError> {
        if vector.len() != self.space.size {
            return Err(RagError::VectorSizeMismatch {
                got: vector.len(),
                want: self.space.size,
            });
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }

        debug!(
            collection = %self.collection,
            namespace,
            top_k,
            predicates = filter.equals.len(),
            "searching"
        );

        let mut builder = SearchPointsBuilder::new(&self.collection, vector.to_vec(), top_k as u64)
            .filter(to_qdrant_filter(namespace, filter))
            .with_payload(true);
        if self.exact_search {
            builder = builder.params(SearchParamsBuilder::default().exact(true));
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        let mut out = Vec::with_capacity(res.result.len());
        for r in res.result.into_iter() {
            let mut metadata = qpayload_to_json(r.payload);
            let id = match &mut metadata {
                serde_json::Value::Object(map) => {
                    map.remove(NAMESPACE_KEY);
                    match map.remove(ITEM_ID_KEY) {
                        Some(serde_json::Value::String(s)) => s,
                        _ => String::new(),
                    }
                }
                _ => String::new(),
            };
            out.push(Match {
                id,
                score: r.score,
                metadata,
            });
        }

        debug!("Search completed: {} hits returned", out.len());
        Ok(out)
    }
}

impl VectorStore for QdrantFacade {
    fn upsert<'a>(&'a self, namespace: &'a str, items: Vec<StoredItem>) -> StoreFuture<'a, usize> {
        Box::pin(self.upsert_items(namespace, items))
    }

    fn query<'a>(
        &'a self,
        namespace: &'a str,
        vector: &'a [f32],
        top_k: usize,
        filter: &'a RagFilter,
    ) -> StoreFuture<'a, Vec<Match>> {
        Box::pin(self.search(namespace, vector, top_k, filter))
    }
}

/// Converts a Qdrant payload (`HashMap<String, qdrant::Value>`) into JSON.
///
/// Unsupported nested objects/arrays are mapped to `Null`.
fn qpayload_to_json(mut p: HashMap<String, QValue>) -> serde_json::Value {
    use qdrant_client::qdrant::value::Kind as K;
    let mut m = serde_json::Map::new();
    for (k, v) in p.drain() {
        let j = match v.kind {
            Some(K::StringValue(s)) => serde_json::Value::String(s),
            Some(K::IntegerValue(i)) => serde_json::Value::Number(i.into()),
            Some(K::DoubleValue(f)) => serde_json::json!(f),
            Some(K::BoolValue(b)) => serde_json::Value::Bool(b),
            _ => serde_json::Value::Null,
        };
        m.insert(k, j);
    }
    serde_json::Value::Object(m)
}
