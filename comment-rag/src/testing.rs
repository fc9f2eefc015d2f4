//! In-crate fakes for the collaborator traits.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use channel_sources::{CommentSource, IdeaService, SourceError, SourceFuture, VideoSource};
use rag_store::{EmbeddingsProvider, RagError};
use serde_json::{Value, json};

/// Deterministic embedder: texts containing a registered keyword get that
/// keyword's vector, everything else gets the default vector.
pub struct FakeEmbedder {
    dim: usize,
    fail: bool,
    keywords: Vec<(String, Vec<f32>)>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            fail: false,
            keywords: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(3)
        }
    }

    pub fn keyword(mut self, word: &str, vector: Vec<f32>) -> Self {
        assert_eq!(vector.len(), self.dim);
        self.keywords.push((word.to_string(), vector));
        self
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.calls.lock().unwrap().iter().map(Vec::len).collect()
    }

    pub fn inputs(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().flatten().cloned().collect()
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        self.keywords
            .iter()
            .find(|(w, _)| text.contains(w.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| {
                let mut v = vec![0.0; self.dim];
                v[0] = 1.0;
                v
            })
    }
}

impl EmbeddingsProvider for FakeEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch<'a>(
        &'a self,
        texts: &'a [String],
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<Vec<f32>>, RagError>> + Send + 'a>,
    > {
        Box::pin(async move {
            if self.fail {
                return Err(RagError::Config("embedding backend down".into()));
            }
            self.calls.lock().unwrap().push(texts.to_vec());
            Ok(texts.iter().map(|t| self.vector_for(t)).collect())
        })
    }
}

fn upstream(service: &'static str, status: u16) -> SourceError {
    SourceError::Upstream {
        service,
        url: format!("http://fake/{service}"),
        status: Some(status),
        body: "fake failure".into(),
    }
}

pub struct FakeVideos {
    ids: Option<Vec<String>>,
}

impl FakeVideos {
    pub fn ok(ids: &[&str]) -> Self {
        Self {
            ids: Some(ids.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn failing() -> Self {
        Self { ids: None }
    }
}

impl VideoSource for FakeVideos {
    fn list_videos<'a>(
        &'a self,
        _query: &'a str,
        _channel_id: &'a str,
    ) -> SourceFuture<'a, Vec<String>> {
        Box::pin(async move { self.ids.clone().ok_or_else(|| upstream("video-list", 500)) })
    }
}

#[derive(Default)]
pub struct FakeComments {
    by_video: HashMap<String, Vec<String>>,
    failing: Vec<String>,
}

impl FakeComments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, video_id: &str, comments: &[&str]) -> Self {
        self.by_video.insert(
            video_id.to_string(),
            comments.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn failing(mut self, video_id: &str) -> Self {
        self.failing.push(video_id.to_string());
        self
    }
}

impl CommentSource for FakeComments {
    fn fetch_comments<'a>(
        &'a self,
        video_id: &'a str,
        _max_pages: Option<usize>,
    ) -> SourceFuture<'a, Vec<String>> {
        Box::pin(async move {
            if self.failing.iter().any(|v| v == video_id) {
                return Err(upstream("youtube", 403));
            }
            Ok(self.by_video.get(video_id).cloned().unwrap_or_default())
        })
    }
}

/// Comment source that records in-flight fetches and the page cap it was given.
#[derive(Default)]
pub struct TrackingComments {
    in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    pub pages_seen: Mutex<Vec<Option<usize>>>,
}

impl CommentSource for TrackingComments {
    fn fetch_comments<'a>(
        &'a self,
        video_id: &'a str,
        max_pages: Option<usize>,
    ) -> SourceFuture<'a, Vec<String>> {
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.pages_seen.lock().unwrap().push(max_pages);

            // Park so sibling fetches get a chance to start.
            for _ in 0..4 {
                tokio::task::yield_now().await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![format!("comment on {video_id}")])
        })
    }
}

/// Records what the next-idea agent received.
#[derive(Default)]
pub struct FakeIdeas {
    pub fail_gap: bool,
    pub received: Mutex<Option<(Value, Vec<String>, String)>>,
}

impl IdeaService for FakeIdeas {
    fn gap_analysis<'a>(&'a self, query: &'a str, channel_id: &'a str) -> SourceFuture<'a, Value> {
        Box::pin(async move {
            if self.fail_gap {
                return Err(upstream("gap-finder", 500));
            }
            Ok(json!({"query": query, "channel": channel_id, "gaps": ["more rust"]}))
        })
    }

    fn next_suggestion<'a>(
        &'a self,
        gap_analysis: &'a Value,
        comments: &'a [String],
        channel_id: &'a str,
    ) -> SourceFuture<'a, Value> {
        Box::pin(async move {
            *self.received.lock().unwrap() = Some((
                gap_analysis.clone(),
                comments.to_vec(),
                channel_id.to_string(),
            ));
            Ok(json!({"idea": "async rust deep dive"}))
        })
    }
}
