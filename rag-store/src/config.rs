//! Runtime and collection configuration.

use crate::errors::RagError;

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceKind {
    /// Cosine distance (recommended for most embeddings).
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2).
    Euclid,
}

impl DistanceKind {
    /// Parse from env string (case-insensitive). Defaults to Cosine.
    pub fn from_env(s: Option<String>) -> Self {
        match s
            .unwrap_or_else(|| "Cosine".to_string())
            .to_lowercase()
            .as_str()
        {
            "dot" | "dotproduct" => DistanceKind::Dot,
            "euclid" | "l2" => DistanceKind::Euclid,
            _ => DistanceKind::Cosine,
        }
    }
}

/// Describes the vector space of the collection.
#[derive(Clone, Copy, Debug)]
pub struct VectorSpace {
    /// Dimensionality of vectors.
    pub size: usize,
    /// Distance function.
    pub distance: DistanceKind,
}

/// Configuration for the vector store gateway.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Logical partition inside the collection.
    pub namespace: String,
    /// Distance function (Cosine by default).
    pub distance: DistanceKind,
    /// Points per upsert call.
    pub upsert_batch: usize,
    /// Exact search flag (false = HNSW ANN).
    pub exact_search: bool,
}

impl RagConfig {
    /// Creates a sane default config for a given collection name and Qdrant endpoint.
    pub fn new_default(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            collection: collection.into(),
            namespace: "youtube".to_string(),
            distance: DistanceKind::Cosine,
            upsert_batch: 10,
            exact_search: false,
        }
    }

    /// Build configuration from environment variables.
    ///
    /// Environment variables used:
    /// - `QDRANT_URL` (default: "http://localhost:6334")
    /// - `QDRANT_API_KEY` (optional)
    /// - `QDRANT_COLLECTION` (default: "yt-comments")
    /// - `QDRANT_DISTANCE` (values: "Cosine" | "Dot" | "Euclid"; default: "Cosine")
    /// - `QDRANT_UPSERT_BATCH` (default: 10)
    /// - `QDRANT_EXACT_SEARCH` (default: false)
    /// - `RAG_NAMESPACE` (default: "youtube")
    pub fn from_env() -> Result<Self, RagError> {
        let cfg = Self {
            qdrant_url: read_string_env("QDRANT_URL")
                .unwrap_or_else(|| "http://localhost:6334".into()),
            qdrant_api_key: read_string_env("QDRANT_API_KEY"),
            collection: read_string_env("QDRANT_COLLECTION")
                .unwrap_or_else(|| "yt-comments".into()),
            namespace: read_string_env("RAG_NAMESPACE").unwrap_or_else(|| "youtube".into()),
            distance: DistanceKind::from_env(read_string_env("QDRANT_DISTANCE")),
            upsert_batch: read_usize_env("QDRANT_UPSERT_BATCH")?.unwrap_or(10),
            exact_search: read_bool_env("QDRANT_EXACT_SEARCH")?.unwrap_or(false),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(RagError::Config("qdrant_url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(RagError::Config("collection is empty".into()));
        }
        if self.namespace.trim().is_empty() {
            return Err(RagError::Config("namespace is empty".into()));
        }
        if self.upsert_batch == 0 {
            return Err(RagError::Config("upsert_batch must be > 0".into()));
        }
        Ok(())
    }
}

fn read_string_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Read an optional `usize` from env.
fn read_usize_env(key: &str) -> Result<Option<usize>, RagError> {
    match read_string_env(key) {
        Some(v) => v
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| RagError::Config(format!("failed to parse env variable: {key} = '{v}'"))),
        None => Ok(None),
    }
}

/// Read an optional `bool` from env.
fn read_bool_env(key: &str) -> Result<Option<bool>, RagError> {
    match read_string_env(key) {
        Some(v) => v
            .trim()
            .to_lowercase()
            .parse::<bool>()
            .map(Some)
            .map_err(|_| RagError::Config(format!("failed to parse env variable: {key} = '{v}'"))),
        None => Ok(None),
    }
}
