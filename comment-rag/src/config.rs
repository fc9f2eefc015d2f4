//! Pipeline tunables read from the environment.

use crate::errors::{CommentRagError, Result};

/// Ingestion knobs.
#[derive(Clone, Debug)]
pub struct IngestConfig {
    /// Seed query sent to the video-list agent.
    pub channel_query: String,
    /// Max in-flight per-video comment fetches.
    pub concurrency: usize,
    /// Comment pages per video; `None` follows pagination to the end.
    pub max_pages: Option<usize>,
    /// Comments per embedding call.
    pub embed_batch: usize,
    /// Whether to store one aggregate `video_doc` item per video.
    pub video_aggregate: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            channel_query: "my query".to_string(),
            concurrency: 5,
            max_pages: Some(1),
            embed_batch: 10,
            video_aggregate: true,
        }
    }
}

impl IngestConfig {
    /// Environment variables used:
    /// - `INGEST_CHANNEL_QUERY` (default: "my query")
    /// - `INGEST_CONCURRENCY` (default: 5)
    /// - `INGEST_MAX_PAGES` (default: 1; "all" removes the cap)
    /// - `INGEST_EMBED_BATCH` (default: 10)
    /// - `INGEST_VIDEO_AGGREGATE` (default: true)
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(q) = read_string_env("INGEST_CHANNEL_QUERY") {
            cfg.channel_query = q;
        }
        if let Some(n) = read_usize_env("INGEST_CONCURRENCY")? {
            cfg.concurrency = n;
        }
        cfg.max_pages = match read_string_env("INGEST_MAX_PAGES") {
            Some(v) if v.eq_ignore_ascii_case("all") => None,
            Some(_) => read_usize_env("INGEST_MAX_PAGES")?,
            None => cfg.max_pages,
        };
        if let Some(n) = read_usize_env("INGEST_EMBED_BATCH")? {
            cfg.embed_batch = n;
        }
        if let Some(b) = read_bool_env("INGEST_VIDEO_AGGREGATE")? {
            cfg.video_aggregate = b;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(config_err("INGEST_CONCURRENCY must be > 0"));
        }
        if self.embed_batch == 0 {
            return Err(config_err("INGEST_EMBED_BATCH must be > 0"));
        }
        if self.max_pages == Some(0) {
            return Err(config_err("INGEST_MAX_PAGES must be > 0 or 'all'"));
        }
        Ok(())
    }
}

/// Best-video selection knobs.
#[derive(Clone, Copy, Debug)]
pub struct SelectorConfig {
    /// Matches pulled in the global comment search.
    pub pool_k: usize,
    /// Top scores summed per video.
    pub sum_top_k: usize,
    /// Comments returned for the winning video.
    pub return_k: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            pool_k: 200,
            sum_top_k: 5,
            return_k: 50,
        }
    }
}

impl SelectorConfig {
    /// Environment variables used:
    /// - `SELECT_POOL_K` (default: 200)
    /// - `SELECT_SUM_TOP_K` (default: 5)
    /// - `SELECT_RETURN_K` (default: 50)
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        let cfg = Self {
            pool_k: read_usize_env("SELECT_POOL_K")?.unwrap_or(d.pool_k),
            sum_top_k: read_usize_env("SELECT_SUM_TOP_K")?.unwrap_or(d.sum_top_k),
            return_k: read_usize_env("SELECT_RETURN_K")?.unwrap_or(d.return_k),
        };
        if cfg.pool_k == 0 || cfg.sum_top_k == 0 || cfg.return_k == 0 {
            return Err(config_err("SELECT_* values must be > 0"));
        }
        Ok(cfg)
    }
}

fn config_err(msg: &str) -> CommentRagError {
    CommentRagError::Internal(format!("config error: {msg}"))
}

fn read_string_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_usize_env(key: &str) -> Result<Option<usize>> {
    match read_string_env(key) {
        Some(v) => v
            .parse::<usize>()
            .map(Some)
            .map_err(|_| config_err(&format!("failed to parse env variable: {key} = '{v}'"))),
        None => Ok(None),
    }
}

fn read_bool_env(key: &str) -> Result<Option<bool>> {
    match read_string_env(key) {
        Some(v) => match v.to_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(Some(true)),
            "0" | "false" | "no" => Ok(Some(false)),
            _ => Err(config_err(&format!(
                "failed to parse env variable: {key} = '{v}'"
            ))),
        },
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_behaviour() {
        let i = IngestConfig::default();
        assert_eq!(i.channel_query, "my query");
        assert_eq!((i.concurrency, i.max_pages, i.embed_batch), (5, Some(1), 10));
        assert!(i.video_aggregate);
        assert!(i.validate().is_ok());

        let s = SelectorConfig::default();
        assert_eq!((s.pool_k, s.sum_top_k, s.return_k), (200, 5, 50));
    }

    #[test]
    fn zero_page_cap_is_invalid() {
        let cfg = IngestConfig {
            max_pages: Some(0),
            ..IngestConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(CommentRagError::Internal(_))));
    }
}
