//! Next-video idea generation.
//!
//! Runs the selector over a list of request-style phrases, merges the
//! returned comments and hands them, together with a gap analysis, to the
//! next-idea agent.

use std::collections::HashSet;
use std::sync::Arc;

use channel_sources::IdeaService;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::Result;
use crate::select::BestVideoSelector;

/// Phrases searched when looking for viewer requests, in priority order.
pub const DEFAULT_PHRASES: [&str; 10] = [
    "make another video",
    "please make a video",
    "can you make another video",
    "you should cover this next",
    "next video idea",
    "do a follow-up video",
    "make a video on this topic",
    "please do a detailed video",
    "can you cover this in your next video",
    "video request",
];

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NextIdeaRequest {
    pub query: String,
    pub yt_channel_id: String,
    #[serde(default)]
    pub extra_phrases: Vec<String>,
}

/// Echo of the effective request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IdeaRequestEcho {
    pub yt_channel_id: String,
    pub seed_query: String,
    pub phrases_used: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NextIdeaReport {
    pub request: IdeaRequestEcho,
    pub gap_analysis: Value,
    pub comments_used_count: usize,
    pub suggestion: Value,
}

/// Caller phrases first (trimmed, blanks and repeats dropped), then the
/// defaults not already present.
pub fn build_phrase_list(extra: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    extra
        .iter()
        .map(|p| p.trim())
        .chain(DEFAULT_PHRASES)
        .filter(|p| !p.is_empty() && seen.insert(p.to_string()))
        .map(str::to_string)
        .collect()
}

/// Appends trimmed, non-empty comments not yet in `seen`.
fn merge_unique(out: &mut Vec<String>, seen: &mut HashSet<String>, comments: Vec<String>) {
    for c in comments {
        let t = c.trim();
        if !t.is_empty() && seen.insert(t.to_string()) {
            out.push(t.to_string());
        }
    }
}

pub struct IdeaAggregator {
    selector: Arc<BestVideoSelector>,
    ideas: Arc<dyn IdeaService>,
}

impl IdeaAggregator {
    pub fn new(selector: Arc<BestVideoSelector>, ideas: Arc<dyn IdeaService>) -> Self {
        Self { selector, ideas }
    }

    /// Gap analysis → phrase searches → next-video suggestion.
    pub async fn run(&self, req: &NextIdeaRequest) -> Result<NextIdeaReport> {
        let phrases = build_phrase_list(&req.extra_phrases);

        let gap_analysis = self
            .ideas
            .gap_analysis(&req.query, &req.yt_channel_id)
            .await?;

        let mut comments = Vec::new();
        let mut seen = HashSet::new();
        for phrase in &phrases {
            let found = self.selector.select(phrase).await?;
            debug!(
                phrase = %phrase,
                video_id = ?found.video_id,
                comments = found.comments.len(),
                "phrase searched"
            );
            merge_unique(&mut comments, &mut seen, found.comments);
        }
        info!(
            phrases = phrases.len(),
            comments = comments.len(),
            "viewer requests collected"
        );

        let suggestion = self
            .ideas
            .next_suggestion(&gap_analysis, &comments, &req.yt_channel_id)
            .await?;

        Ok(NextIdeaReport {
            request: IdeaRequestEcho {
                yt_channel_id: req.yt_channel_id.clone(),
                seed_query: req.query.clone(),
                phrases_used: phrases,
            },
            gap_analysis,
            comments_used_count: comments.len(),
            suggestion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorConfig;
    use crate::testing::{FakeEmbedder, FakeIdeas};
    use rag_store::{ItemKind, ItemMetadata, MemoryStore, StoredItem, VectorStore};

    #[test]
    fn defaults_when_no_extras() {
        let list = build_phrase_list(&[]);
        assert_eq!(list, DEFAULT_PHRASES.map(String::from).to_vec());
    }

    #[test]
    fn extras_first_without_duplicates() {
        let extra = vec![
            "rust async".to_string(),
            "  ".to_string(),
            "video request".to_string(),
            "rust async".to_string(),
        ];
        let list = build_phrase_list(&extra);
        assert_eq!(list[0], "rust async");
        assert_eq!(list[1], "video request");
        assert_eq!(list.len(), 11);
        assert_eq!(list.iter().filter(|p| *p == "video request").count(), 1);
        assert_eq!(list[2], "make another video");
    }

    #[test]
    fn merge_keeps_first_appearance() {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        merge_unique(&mut out, &mut seen, vec!["a".into(), " b ".into()]);
        merge_unique(&mut out, &mut seen, vec!["b".into(), "".into(), "c".into(), "a".into()]);
        assert_eq!(out, vec!["a", "b", "c"]);
    }

    fn comment(id: &str, video: &str, text: &str, vector: Vec<f32>) -> StoredItem {
        StoredItem {
            id: id.into(),
            vector,
            metadata: ItemMetadata {
                kind: ItemKind::Comment,
                video_id: video.into(),
                text: text.into(),
                source: "youtube".into(),
                ingested_at: "2025-01-01T00:00:00+00:00".into(),
            },
        }
    }

    async fn aggregator(ideas: Arc<FakeIdeas>) -> IdeaAggregator {
        let store = Arc::new(MemoryStore::new());
        store
            .upsert(
                "youtube",
                vec![
                    comment("a1", "A", "please cover lifetimes", vec![1.0, 0.0]),
                    comment("a2", "A", "follow-up on traits", vec![0.9, 0.1]),
                    comment("b1", "B", "cooking again", vec![0.0, 1.0]),
                ],
            )
            .await
            .unwrap();
        // "cooking" phrases land on video B, everything else on A.
        let embedder = FakeEmbedder::new(2).keyword("cooking", vec![0.0, 1.0]);
        let selector = Arc::new(BestVideoSelector::new(
            Arc::new(embedder),
            store,
            "youtube",
            SelectorConfig::default(),
        ));
        IdeaAggregator::new(selector, ideas)
    }

    #[tokio::test]
    async fn merges_unique_comments_across_phrases() {
        let ideas = Arc::new(FakeIdeas::default());
        let agg = aggregator(ideas.clone()).await;

        let report = agg
            .run(&NextIdeaRequest {
                query: "rust".into(),
                yt_channel_id: "UC1".into(),
                extra_phrases: vec!["more cooking".into()],
            })
            .await
            .unwrap();

        assert_eq!(report.request.phrases_used.len(), 11);
        assert_eq!(report.request.seed_query, "rust");
        assert_eq!(report.suggestion["idea"], "async rust deep dive");
        assert_eq!(report.gap_analysis["gaps"][0], "more rust");

        let (gap, comments, channel) = ideas.received.lock().unwrap().clone().unwrap();
        assert_eq!(gap, report.gap_analysis);
        assert_eq!(channel, "UC1");
        assert_eq!(
            comments,
            vec![
                "cooking again",
                "please cover lifetimes",
                "follow-up on traits"
            ]
        );
        assert_eq!(report.comments_used_count, 3);
    }

    #[tokio::test]
    async fn gap_failure_aborts_before_suggestion() {
        let ideas = Arc::new(FakeIdeas {
            fail_gap: true,
            ..FakeIdeas::default()
        });
        let agg = aggregator(ideas.clone()).await;

        let err = agg
            .run(&NextIdeaRequest {
                query: "rust".into(),
                yt_channel_id: "UC1".into(),
                extra_phrases: Vec::new(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), "UPSTREAM_ERROR");
        assert!(ideas.received.lock().unwrap().is_none());
    }
}
