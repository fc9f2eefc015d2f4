//! Collaborator traits consumed by the ingestion and idea pipelines.
//!
//! Boxed futures keep the traits object-safe so callers can hold
//! `Arc<dyn VideoSource>` and swap in fakes.

use std::{future::Future, pin::Pin};

use serde_json::Value;

use crate::errors::SourceResult;

/// Boxed future returned by every collaborator.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = SourceResult<T>> + Send + 'a>>;

/// Resolves a channel to the ids of its videos.
pub trait VideoSource: Send + Sync {
    fn list_videos<'a>(&'a self, query: &'a str, channel_id: &'a str)
    -> SourceFuture<'a, Vec<String>>;
}

/// Fetches top-level comment texts for one video.
pub trait CommentSource: Send + Sync {
    /// `max_pages = None` follows pagination to the end.
    fn fetch_comments<'a>(
        &'a self,
        video_id: &'a str,
        max_pages: Option<usize>,
    ) -> SourceFuture<'a, Vec<String>>;
}

/// Gap analysis and next-video suggestion agents.
pub trait IdeaService: Send + Sync {
    fn gap_analysis<'a>(&'a self, query: &'a str, channel_id: &'a str) -> SourceFuture<'a, Value>;

    fn next_suggestion<'a>(
        &'a self,
        gap_analysis: &'a Value,
        comments: &'a [String],
        channel_id: &'a str,
    ) -> SourceFuture<'a, Value>;
}
