//! Best-video selection over per-comment matches.
//!
//! The pool of top comment matches is grouped by `video_id`; each video is
//! scored by the sum of its best `sum_top_k` scores and the highest sum wins.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rag_store::{EmbeddingsProvider, ItemKind, Match, RagFilter, VectorStore};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SelectorConfig;
use crate::errors::{CommentRagError, Result};

/// Winning video and its most relevant comments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    pub video_id: Option<String>,
    pub comments: Vec<String>,
}

pub struct BestVideoSelector {
    embedder: Arc<dyn EmbeddingsProvider>,
    store: Arc<dyn VectorStore>,
    namespace: String,
    cfg: SelectorConfig,
}

impl BestVideoSelector {
    pub fn new(
        embedder: Arc<dyn EmbeddingsProvider>,
        store: Arc<dyn VectorStore>,
        namespace: impl Into<String>,
        cfg: SelectorConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            namespace: namespace.into(),
            cfg,
        }
    }

    /// Finds the best-matching video for `query` and returns its top comments.
    pub async fn select(&self, query: &str) -> Result<QueryResult> {
        let query = query.trim();
        let input = [query.to_string()];
        let qvec = self
            .embedder
            .embed_batch(&input)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CommentRagError::Internal("no vector for query".into()))?;

        let pool = self
            .store
            .query(
                &self.namespace,
                &qvec,
                self.cfg.pool_k,
                &RagFilter::kind(ItemKind::Comment),
            )
            .await?;
        debug!(pool = pool.len(), "selector pool fetched");

        let Some(best) = pick_best_video(&pool, self.cfg.sum_top_k) else {
            info!("no matching video");
            return Ok(QueryResult::default());
        };

        let filter = RagFilter::kind(ItemKind::Comment).eq("video_id", best.as_str());
        let hits = self
            .store
            .query(&self.namespace, &qvec, self.cfg.return_k, &filter)
            .await?;

        let comments = unique_texts(&hits);
        info!(video_id = %best, comments = comments.len(), "best video selected");

        Ok(QueryResult {
            video_id: Some(best),
            comments,
        })
    }
}

/// Picks the video with the highest sum of its top `sum_top_k` scores.
///
/// Matches without a `video_id` are ignored. On equal sums the video seen
/// first in `matches` wins. Returns `None` when no match carries a video id.
pub fn pick_best_video(matches: &[Match], sum_top_k: usize) -> Option<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut scores: HashMap<&str, Vec<f32>> = HashMap::new();

    for m in matches {
        let Some(vid) = m.video_id() else { continue };
        scores
            .entry(vid)
            .or_insert_with(|| {
                order.push(vid);
                Vec::new()
            })
            .push(m.score);
    }

    let mut best: Option<(&str, f32)> = None;
    for vid in order {
        let Some(s) = scores.get_mut(vid) else { continue };
        s.sort_by(|a, b| b.total_cmp(a));
        let sum: f32 = s.iter().take(sum_top_k).sum();
        if best.is_none_or(|(_, b)| sum > b) {
            best = Some((vid, sum));
        }
    }

    best.map(|(vid, _)| vid.to_string())
}

/// Non-empty `text` values in rank order, exact duplicates removed.
fn unique_texts(hits: &[Match]) -> Vec<String> {
    let mut seen = HashSet::new();
    hits.iter()
        .filter_map(Match::text)
        .filter(|t| !t.is_empty() && seen.insert(*t))
        .map(str::to_string)
        .collect()
}
