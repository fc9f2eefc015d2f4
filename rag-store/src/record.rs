//! Core data models used by the library.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of stored item, persisted under the `type` payload field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// One vector per clean comment.
    Comment,
    /// One aggregate vector per video.
    VideoDoc,
}

impl ItemKind {
    /// Wire value used in payloads and filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Comment => "comment",
            ItemKind::VideoDoc => "video_doc",
        }
    }
}

/// Metadata stored next to every vector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub video_id: String,
    pub text: String,
    pub source: String,
    /// ISO-8601 UTC timestamp of the ingestion run.
    pub ingested_at: String,
}

/// Canonical record written to the vector index.
#[derive(Clone, Debug)]
pub struct StoredItem {
    /// Logical id, e.g. `<video_id>#<hash>#<offset>` or `<video_id>#all`.
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: ItemMetadata,
}

/// A single similarity match with score and raw payload.
///
/// Payload fields are read best-effort: a malformed payload yields `None`
/// from the accessors instead of an error.
#[derive(Clone, Debug)]
pub struct Match {
    pub id: String,
    pub score: f32,
    pub metadata: Value,
}

impl Match {
    fn str_field(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    /// `video_id` payload field, if present and non-empty.
    pub fn video_id(&self) -> Option<&str> {
        self.str_field("video_id").filter(|s| !s.is_empty())
    }

    /// `text` payload field, if present.
    pub fn text(&self) -> Option<&str> {
        self.str_field("text")
    }
}

/// Conjunction of exact-match predicates on payload fields.
#[derive(Clone, Debug, Default)]
pub struct RagFilter {
    /// Exact match on a field, e.g. `("video_id", "abc123")`.
    pub equals: Vec<(String, Value)>,
}

impl RagFilter {
    /// Filter selecting one item kind.
    pub fn kind(kind: ItemKind) -> Self {
        Self::default().eq("type", kind.as_str())
    }

    /// Adds an exact-match predicate.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.equals.push((field.into(), value.into()));
        self
    }

    /// Evaluates the filter against a JSON payload.
    pub fn matches(&self, payload: &Value) -> bool {
        self.equals
            .iter()
            .all(|(field, want)| payload.get(field) == Some(want))
    }
}
