//! Idea agents: gap analysis and next-video suggestion.
//!
//! Both are opaque JSON-in/JSON-out endpoints:
//!   * POST {GAP_FINDER_URL} `{query, yt_channel_id}`
//!   * POST {NEXT_IDEA_URL}  `{response_01, response_02, yt_id}`

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::config::SourcesConfig;
use crate::errors::SourceResult;
use crate::http::{client, send_json};
use crate::sources::{IdeaService, SourceFuture};

/// HTTP client for both idea agents.
#[derive(Debug, Clone)]
pub struct IdeaAgentClient {
    http: Client,
    gap_finder_url: String,
    next_idea_url: String,
}

impl IdeaAgentClient {
    pub fn new(cfg: &SourcesConfig) -> SourceResult<Self> {
        Ok(Self {
            http: client(cfg.upstream_timeout_secs)?,
            gap_finder_url: cfg.gap_finder_url.clone(),
            next_idea_url: cfg.next_idea_url.clone(),
        })
    }

    pub async fn post_gap_analysis(&self, query: &str, channel_id: &str) -> SourceResult<Value> {
        let body = GapRequest {
            query,
            yt_channel_id: channel_id,
        };
        let out = send_json(
            "gap-finder",
            &self.gap_finder_url,
            self.http.post(&self.gap_finder_url).json(&body),
        )
        .await?;
        info!(channel_id, "gap analysis received");
        Ok(out)
    }

    pub async fn post_next_suggestion(
        &self,
        gap_analysis: &Value,
        comments: &[String],
        channel_id: &str,
    ) -> SourceResult<Value> {
        let body = NextIdeaRequest {
            response_01: gap_analysis,
            response_02: comments,
            yt_id: channel_id,
        };
        let out = send_json(
            "next-idea",
            &self.next_idea_url,
            self.http.post(&self.next_idea_url).json(&body),
        )
        .await?;
        info!(channel_id, comments = comments.len(), "next-video suggestion received");
        Ok(out)
    }
}

impl IdeaService for IdeaAgentClient {
    fn gap_analysis<'a>(&'a self, query: &'a str, channel_id: &'a str) -> SourceFuture<'a, Value> {
        Box::pin(self.post_gap_analysis(query, channel_id))
    }

    fn next_suggestion<'a>(
        &'a self,
        gap_analysis: &'a Value,
        comments: &'a [String],
        channel_id: &'a str,
    ) -> SourceFuture<'a, Value> {
        Box::pin(self.post_next_suggestion(gap_analysis, comments, channel_id))
    }
}

#[derive(Debug, Serialize)]
struct GapRequest<'a> {
    query: &'a str,
    yt_channel_id: &'a str,
}

#[derive(Debug, Serialize)]
struct NextIdeaRequest<'a> {
    response_01: &'a Value,
    response_02: &'a [String],
    yt_id: &'a str,
}
