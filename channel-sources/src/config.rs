//! Endpoint and timeout configuration for every upstream client.

use crate::errors::{SourceError, SourceResult};

pub const DEFAULT_YT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_VIDEO_LIST_URL: &str =
    "https://cmfwzo2zi1we6jxgtai6c9rye.agent.a.smyth.ai/api/Get_My_and_My_Competitors_Video_List";
pub const DEFAULT_GAP_FINDER_URL: &str =
    "https://cmfwzo2zi1we6jxgtai6c9rye.agent.a.smyth.ai/api/Auto_Gap_Finder";
pub const DEFAULT_NEXT_IDEA_URL: &str =
    "https://cmfwzo2zi1we6jxgtai6c9rye.agent.a.smyth.ai/api/Next_Video_Suggestion";

/// Runtime configuration for the upstream clients.
#[derive(Debug, Clone)]
pub struct SourcesConfig {
    /// YouTube Data API key.
    pub yt_api_key: String,
    /// YouTube Data API base, without trailing slash.
    pub yt_api_base: String,
    /// `maxResults` per commentThreads page.
    pub yt_page_size: u32,
    pub video_list_url: String,
    pub gap_finder_url: String,
    pub next_idea_url: String,
    /// Timeout for YouTube and idea agent calls.
    pub upstream_timeout_secs: u64,
    /// Timeout for the video-list agent, which is slower.
    pub video_list_timeout_secs: u64,
}

impl SourcesConfig {
    /// Defaults for everything except the API key.
    pub fn with_api_key(yt_api_key: impl Into<String>) -> Self {
        Self {
            yt_api_key: yt_api_key.into(),
            yt_api_base: DEFAULT_YT_API_BASE.to_string(),
            yt_page_size: 10,
            video_list_url: DEFAULT_VIDEO_LIST_URL.to_string(),
            gap_finder_url: DEFAULT_GAP_FINDER_URL.to_string(),
            next_idea_url: DEFAULT_NEXT_IDEA_URL.to_string(),
            upstream_timeout_secs: 200,
            video_list_timeout_secs: 250,
        }
    }

    /// Build configuration from environment variables.
    ///
    /// Environment variables used:
    /// - `YT_API_KEY` (required)
    /// - `YT_API_BASE` (default: "https://www.googleapis.com/youtube/v3")
    /// - `YT_PAGE_SIZE` (default: 10)
    /// - `VIDEO_LIST_URL`, `GAP_FINDER_URL`, `NEXT_IDEA_URL` (agent endpoints)
    /// - `UPSTREAM_TIMEOUT_SECS` (default: 200)
    /// - `VIDEO_LIST_TIMEOUT_SECS` (default: 250)
    pub fn from_env() -> SourceResult<Self> {
        let key = read_string_env("YT_API_KEY").ok_or_else(|| {
            SourceError::Config("missing required env variable: YT_API_KEY".into())
        })?;
        let mut cfg = Self::with_api_key(key);

        if let Some(v) = read_string_env("YT_API_BASE") {
            cfg.yt_api_base = v;
        }
        if let Some(v) = read_u64_env("YT_PAGE_SIZE")? {
            cfg.yt_page_size = u32::try_from(v).map_err(|_| {
                SourceError::Config(format!("YT_PAGE_SIZE out of range: {v}"))
            })?;
        }
        if let Some(v) = read_string_env("VIDEO_LIST_URL") {
            cfg.video_list_url = v;
        }
        if let Some(v) = read_string_env("GAP_FINDER_URL") {
            cfg.gap_finder_url = v;
        }
        if let Some(v) = read_string_env("NEXT_IDEA_URL") {
            cfg.next_idea_url = v;
        }
        if let Some(v) = read_u64_env("UPSTREAM_TIMEOUT_SECS")? {
            cfg.upstream_timeout_secs = v;
        }
        if let Some(v) = read_u64_env("VIDEO_LIST_TIMEOUT_SECS")? {
            cfg.video_list_timeout_secs = v;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> SourceResult<()> {
        if self.yt_api_key.trim().is_empty() {
            return Err(SourceError::Config("yt_api_key is empty".into()));
        }
        if self.yt_page_size == 0 {
            return Err(SourceError::Config("yt_page_size must be > 0".into()));
        }
        for (name, url) in [
            ("YT_API_BASE", &self.yt_api_base),
            ("VIDEO_LIST_URL", &self.video_list_url),
            ("GAP_FINDER_URL", &self.gap_finder_url),
            ("NEXT_IDEA_URL", &self.next_idea_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(SourceError::Config(format!(
                    "{name} must start with http:// or https://"
                )));
            }
        }
        Ok(())
    }
}

fn read_string_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_u64_env(key: &str) -> SourceResult<Option<u64>> {
    match read_string_env(key) {
        Some(v) => v.parse::<u64>().map(Some).map_err(|_| {
            SourceError::Config(format!("failed to parse env variable: {key} = '{v}'"))
        }),
        None => Ok(None),
    }
}
