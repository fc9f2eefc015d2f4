//! Video-list agent: resolves a channel to its original video ids.
//!
//! Endpoint: POST {VIDEO_LIST_URL} with `{query, yt_channel_id}`.
//! The agent answers with either
//! `{result: {Output: {original_videos: [..]}}}` or
//! `{result: {Output: {original_videos: {videoList: [..]}}}}`.

use reqwest::Client;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::SourcesConfig;
use crate::errors::SourceResult;
use crate::http::{client, send_json};
use crate::sources::{SourceFuture, VideoSource};

const SERVICE: &str = "video-list";

/// HTTP client for the video-list agent.
#[derive(Debug, Clone)]
pub struct VideoListClient {
    http: Client,
    url: String,
}

impl VideoListClient {
    pub fn new(cfg: &SourcesConfig) -> SourceResult<Self> {
        Ok(Self {
            http: client(cfg.video_list_timeout_secs)?,
            url: cfg.video_list_url.clone(),
        })
    }

    /// Returns the ids of the channel's original videos, in agent order.
    pub async fn fetch_video_ids(
        &self,
        query: &str,
        channel_id: &str,
    ) -> SourceResult<Vec<String>> {
        debug!(channel_id, "video-list fetch");
        let body = VideoListRequest {
            query,
            yt_channel_id: channel_id,
        };
        let json = send_json(SERVICE, &self.url, self.http.post(&self.url).json(&body)).await?;
        let ids = extract_video_ids(json);
        info!(channel_id, videos = ids.len(), "video-list resolved");
        Ok(ids)
    }
}

impl VideoSource for VideoListClient {
    fn list_videos<'a>(
        &'a self,
        query: &'a str,
        channel_id: &'a str,
    ) -> SourceFuture<'a, Vec<String>> {
        Box::pin(self.fetch_video_ids(query, channel_id))
    }
}

#[derive(Debug, Serialize)]
struct VideoListRequest<'a> {
    query: &'a str,
    yt_channel_id: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    result: Option<ResultBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct ResultBlock {
    #[serde(default, rename = "Output")]
    output: Option<OutputBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputBlock {
    #[serde(default)]
    original_videos: Option<OriginalVideos>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OriginalVideos {
    List(Vec<Value>),
    Wrapped {
        #[serde(default, rename = "videoList")]
        video_list: Option<Vec<Value>>,
    },
    Other(IgnoredAny),
}

/// Maps the agent payload to video ids. Any unexpected shape yields an
/// empty list; items without a non-empty string `video_id` are skipped.
fn extract_video_ids(json: Value) -> Vec<String> {
    let parsed: VideoListResponse = serde_json::from_value(json).unwrap_or_default();

    let items = match parsed
        .result
        .and_then(|r| r.output)
        .and_then(|o| o.original_videos)
    {
        Some(OriginalVideos::List(items)) => items,
        Some(OriginalVideos::Wrapped { video_list }) => video_list.unwrap_or_default(),
        Some(OriginalVideos::Other(_)) | None => Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| item.get("video_id").and_then(Value::as_str))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
