//! Channel ingestion: fetch → normalize → embed → upsert.

use std::sync::Arc;

use channel_sources::{CommentSource, VideoSource};
use chrono::Utc;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use rag_store::{EmbeddingsProvider, ItemKind, ItemMetadata, StoredItem, VectorStore};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::IngestConfig;
use crate::errors::{CommentRagError, Result};
use crate::normalize::{CleanComment, normalize_comments};

/// `source` payload value of every stored item.
pub const SOURCE_YOUTUBE: &str = "youtube";
/// Max characters of an aggregate doc kept in its `text` metadata.
pub const VIDEO_DOC_TEXT_MAX_CHARS: usize = 8000;

/// Items written per kind during one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UpsertCounts {
    pub comments: usize,
    pub videos: usize,
}

/// Outcome of [`IngestPipeline::run`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub channel_id: String,
    /// Videos whose comment fetch succeeded, including ones with no usable comments.
    pub videos_found: usize,
    pub upserted: UpsertCounts,
}

/// Comments fetched for one video.
struct VideoComments {
    video_id: String,
    raw: Vec<String>,
}

pub struct IngestPipeline {
    videos: Arc<dyn VideoSource>,
    comments: Arc<dyn CommentSource>,
    embedder: Arc<dyn EmbeddingsProvider>,
    store: Arc<dyn VectorStore>,
    namespace: String,
    cfg: IngestConfig,
}

impl IngestPipeline {
    pub fn new(
        videos: Arc<dyn VideoSource>,
        comments: Arc<dyn CommentSource>,
        embedder: Arc<dyn EmbeddingsProvider>,
        store: Arc<dyn VectorStore>,
        namespace: impl Into<String>,
        cfg: IngestConfig,
    ) -> Self {
        Self {
            videos,
            comments,
            embedder,
            store,
            namespace: namespace.into(),
            cfg,
        }
    }

    /// Ingests every video of `channel_id`.
    ///
    /// A failed channel resolution aborts the run; a failed per-video fetch
    /// only drops that video. Embedding and index failures abort the run,
    /// leaving already written items in place.
    pub async fn run(&self, channel_id: &str) -> Result<IngestReport> {
        let video_ids = self
            .videos
            .list_videos(&self.cfg.channel_query, channel_id)
            .await?;
        info!(channel_id, videos = video_ids.len(), "channel resolved");

        let fetched = self.fetch_comments(&video_ids).await;
        let ingested_at = Utc::now().to_rfc3339();

        let mut upserted = UpsertCounts::default();
        for video in &fetched {
            let clean = normalize_comments(&video.video_id, &video.raw);
            debug!(
                video_id = %video.video_id,
                raw = video.raw.len(),
                clean = clean.len(),
                "normalized comments"
            );

            upserted.comments += self.store_comments(&clean, &ingested_at).await?;
            if self.cfg.video_aggregate && !clean.is_empty() {
                upserted.videos += self
                    .store_video_doc(&video.video_id, &clean, &ingested_at)
                    .await?;
            }
        }

        info!(
            channel_id,
            videos_found = fetched.len(),
            comments = upserted.comments,
            video_docs = upserted.videos,
            "ingestion complete"
        );

        Ok(IngestReport {
            channel_id: channel_id.to_string(),
            videos_found: fetched.len(),
            upserted,
        })
    }

    /// Fetches comments for all videos with bounded concurrency. Results keep
    /// the input order; failed videos are logged and omitted.
    async fn fetch_comments(&self, video_ids: &[String]) -> Vec<VideoComments> {
        let sem = Arc::new(Semaphore::new(self.cfg.concurrency.max(1)));
        let pb = progress_bar(video_ids.len());

        let tasks = video_ids.iter().map(|video_id| {
            let sem = Arc::clone(&sem);
            let pb = pb.clone();
            async move {
                let res = match sem.acquire().await {
                    Ok(_permit) => {
                        self.comments
                            .fetch_comments(video_id, self.cfg.max_pages)
                            .await
                    }
                    Err(e) => {
                        warn!(%video_id, error = %e, "fetch slot unavailable");
                        pb.inc(1);
                        return None;
                    }
                };
                pb.inc(1);

                match res {
                    Ok(raw) => Some(VideoComments {
                        video_id: video_id.clone(),
                        raw,
                    }),
                    Err(e) => {
                        warn!(%video_id, error = %e, "comment fetch failed, skipping video");
                        None
                    }
                }
            }
        });

        let out: Vec<VideoComments> = join_all(tasks).await.into_iter().flatten().collect();
        pb.finish_with_message("comments fetched");
        out
    }

    /// Embeds and upserts one video's comments in batches.
    async fn store_comments(&self, clean: &[CleanComment], ingested_at: &str) -> Result<usize> {
        let mut written = 0usize;

        for (batch_no, chunk) in clean.chunks(self.cfg.embed_batch.max(1)).enumerate() {
            let offset = batch_no * self.cfg.embed_batch.max(1);
            let texts: Vec<String> = chunk.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embed(&texts).await?;

            let items: Vec<StoredItem> = chunk
                .iter()
                .zip(vectors)
                .enumerate()
                .map(|(j, (c, vector))| StoredItem {
                    id: comment_item_id(&c.video_id, &c.content_hash, offset + j),
                    vector,
                    metadata: ItemMetadata {
                        kind: ItemKind::Comment,
                        video_id: c.video_id.clone(),
                        text: c.text.clone(),
                        source: SOURCE_YOUTUBE.to_string(),
                        ingested_at: ingested_at.to_string(),
                    },
                })
                .collect();

            written += self.store.upsert(&self.namespace, items).await?;
        }

        Ok(written)
    }

    /// Embeds the full comment concatenation and upserts `<video_id>#all`.
    async fn store_video_doc(
        &self,
        video_id: &str,
        clean: &[CleanComment],
        ingested_at: &str,
    ) -> Result<usize> {
        let doc = clean
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let vector = self
            .embed(std::slice::from_ref(&doc))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CommentRagError::Internal("no vector for video doc".into()))?;

        let item = StoredItem {
            id: video_doc_item_id(video_id),
            vector,
            metadata: ItemMetadata {
                kind: ItemKind::VideoDoc,
                video_id: video_id.to_string(),
                text: truncate_chars(&doc, VIDEO_DOC_TEXT_MAX_CHARS),
                source: SOURCE_YOUTUBE.to_string(),
                ingested_at: ingested_at.to_string(),
            },
        };

        Ok(self.store.upsert(&self.namespace, vec![item]).await?)
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let vectors = self.embedder.embed_batch(texts).await?;
        if vectors.len() != texts.len() {
            return Err(CommentRagError::Internal(format!(
                "embedding provider returned {} vectors for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }
}

/// `<video_id>#<content_hash>#<offset>`
pub fn comment_item_id(video_id: &str, content_hash: &str, offset: usize) -> String {
    format!("{video_id}#{content_hash}#{offset}")
}

/// `<video_id>#all`
pub fn video_doc_item_id(video_id: &str) -> String {
    format!("{video_id}#all")
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} videos ({eta})",
    ) {
        pb.set_style(style.progress_chars("##-"));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeComments, FakeEmbedder, FakeVideos, TrackingComments};
    use std::sync::atomic::Ordering;
    use rag_store::MemoryStore;
    use services::hash::short_hash;

    const NS: &str = "youtube";

    fn pipeline(
        videos: FakeVideos,
        comments: FakeComments,
        embedder: Arc<FakeEmbedder>,
        store: Arc<MemoryStore>,
        cfg: IngestConfig,
    ) -> IngestPipeline {
        IngestPipeline::new(
            Arc::new(videos),
            Arc::new(comments),
            embedder,
            store,
            NS,
            cfg,
        )
    }

    #[tokio::test]
    async fn fetches_are_bounded_and_page_capped() {
        let ids: Vec<String> = (0..12).map(|i| format!("v{i}")).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let comments = Arc::new(TrackingComments::default());
        let cfg = IngestConfig {
            concurrency: 3,
            max_pages: Some(2),
            ..IngestConfig::default()
        };
        let p = IngestPipeline::new(
            Arc::new(FakeVideos::ok(&id_refs)),
            comments.clone(),
            Arc::new(FakeEmbedder::new(3)),
            Arc::new(MemoryStore::new()),
            NS,
            cfg,
        );

        let report = p.run("UC1").await.unwrap();
        assert_eq!(report.videos_found, 12);
        assert_eq!(report.upserted.comments, 12);

        let peak = comments.peak.load(Ordering::SeqCst);
        assert!(peak >= 2, "fetches never overlapped (peak {peak})");
        assert!(peak <= 3, "more than 3 fetches in flight (peak {peak})");

        let pages = comments.pages_seen.lock().unwrap();
        assert_eq!(pages.len(), 12);
        assert!(pages.iter().all(|cap| *cap == Some(2)));
    }

    #[tokio::test]
    async fn ingests_comments_and_video_docs() {
        let store = Arc::new(MemoryStore::new());
        let embedder = Arc::new(FakeEmbedder::new(3));
        let p = pipeline(
            FakeVideos::ok(&["v1", "v2"]),
            FakeComments::new()
                .with("v1", &["great", " great ", "", "more please"])
                .with("v2", &["   "]),
            embedder.clone(),
            store.clone(),
            IngestConfig::default(),
        );

        let report = p.run("UC1").await.unwrap();
        assert_eq!(report.channel_id, "UC1");
        assert_eq!(report.videos_found, 2);
        assert_eq!(
            report.upserted,
            UpsertCounts {
                comments: 2,
                videos: 1
            }
        );

        let ids = store.ids(NS);
        assert!(ids.contains(&format!("v1#{}#0", short_hash("great"))));
        assert!(ids.contains(&format!("v1#{}#1", short_hash("more please"))));
        assert!(ids.contains(&"v1#all".to_string()));
        assert!(!ids.iter().any(|id| id.starts_with("v2")));

        let doc = store.get(NS, "v1#all").unwrap();
        assert_eq!(doc.metadata.kind, ItemKind::VideoDoc);
        assert_eq!(doc.metadata.text, "great\n\nmore please");
        assert_eq!(doc.metadata.source, "youtube");
    }

    #[tokio::test]
    async fn reingestion_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let comments = || FakeComments::new().with("v1", &["a", "b", "a", "c"]);
        let run = |c| {
            pipeline(
                FakeVideos::ok(&["v1"]),
                c,
                Arc::new(FakeEmbedder::new(3)),
                store.clone(),
                IngestConfig::default(),
            )
        };

        run(comments()).run("UC1").await.unwrap();
        let first = store.ids(NS);
        run(comments()).run("UC1").await.unwrap();
        let second = store.ids(NS);

        assert_eq!(first, second);
        assert_eq!(first.len(), 4); // 3 comments + 1 doc
    }

    #[tokio::test]
    async fn offsets_span_batches() {
        let store = Arc::new(MemoryStore::new());
        let texts: Vec<String> = (0..5).map(|i| format!("c{i}")).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let embedder = Arc::new(FakeEmbedder::new(3));
        let p = pipeline(
            FakeVideos::ok(&["v1"]),
            FakeComments::new().with("v1", &refs),
            embedder.clone(),
            store.clone(),
            IngestConfig {
                embed_batch: 2,
                video_aggregate: false,
                ..IngestConfig::default()
            },
        );

        let report = p.run("UC1").await.unwrap();
        assert_eq!(report.upserted.comments, 5);
        assert_eq!(embedder.batch_sizes(), vec![2, 2, 1]);
        assert!(store.get(NS, &format!("v1#{}#4", short_hash("c4"))).is_some());
    }

    #[tokio::test]
    async fn failed_video_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        let p = pipeline(
            FakeVideos::ok(&["v1", "broken", "v3"]),
            FakeComments::new()
                .with("v1", &["x"])
                .failing("broken")
                .with("v3", &[]),
            Arc::new(FakeEmbedder::new(3)),
            store.clone(),
            IngestConfig::default(),
        );

        let report = p.run("UC1").await.unwrap();
        assert_eq!(report.videos_found, 2);
        assert_eq!(report.upserted.comments, 1);
        assert_eq!(report.upserted.videos, 1);
    }

    #[tokio::test]
    async fn channel_resolution_failure_is_upstream() {
        let store = Arc::new(MemoryStore::new());
        let p = pipeline(
            FakeVideos::failing(),
            FakeComments::new(),
            Arc::new(FakeEmbedder::new(3)),
            store.clone(),
            IngestConfig::default(),
        );

        let err = p.run("UC1").await.unwrap_err();
        assert_eq!(err.code(), "UPSTREAM_ERROR");
        assert!(store.is_empty(NS));
    }

    #[tokio::test]
    async fn long_video_doc_is_truncated_but_fully_embedded() {
        let store = Arc::new(MemoryStore::new());
        let embedder = Arc::new(FakeEmbedder::new(3));
        let long_a = "a".repeat(5000);
        let long_b = "b".repeat(5000);
        let p = pipeline(
            FakeVideos::ok(&["v1"]),
            FakeComments::new().with("v1", &[long_a.as_str(), long_b.as_str()]),
            embedder.clone(),
            store.clone(),
            IngestConfig::default(),
        );

        p.run("UC1").await.unwrap();

        let doc = store.get(NS, "v1#all").unwrap();
        assert_eq!(doc.metadata.text.chars().count(), VIDEO_DOC_TEXT_MAX_CHARS);

        let full_len = 5000 + 2 + 5000;
        assert!(
            embedder
                .inputs()
                .iter()
                .any(|t| t.chars().count() == full_len)
        );
    }

    #[tokio::test]
    async fn embedding_failure_is_internal() {
        let store = Arc::new(MemoryStore::new());
        let p = pipeline(
            FakeVideos::ok(&["v1"]),
            FakeComments::new().with("v1", &["x"]),
            Arc::new(FakeEmbedder::failing()),
            store,
            IngestConfig::default(),
        );

        let err = p.run("UC1").await.unwrap_err();
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }
}
