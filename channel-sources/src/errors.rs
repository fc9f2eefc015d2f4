//! Crate-wide error hierarchy for channel-sources.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type SourceResult<T> = Result<T, SourceError>;

/// Maximum number of characters of an upstream body kept in errors.
const BODY_MAX_CHARS: usize = 512;

/// Root error type for the channel-sources crate.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Non-success status or undecodable payload from a named dependency.
    ///
    /// `status` is `None` when the response was 2xx but not the expected JSON.
    #[error("{service} returned {status:?} from {url}: {body}")]
    Upstream {
        service: &'static str,
        url: String,
        status: Option<u16>,
        body: String,
    },

    /// Timeout or connect/transport failure without an HTTP status.
    #[error("{service} unreachable at {url}: {message}")]
    Network {
        service: &'static str,
        url: String,
        message: String,
    },

    /// Missing or malformed configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SourceError {
    /// Maps a `reqwest` transport failure for `service`.
    pub(crate) fn transport(service: &'static str, url: &str, e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return SourceError::Upstream {
                service,
                url: url.to_string(),
                status: Some(status.as_u16()),
                body: String::new(),
            };
        }

        let message = if e.is_timeout() {
            "timeout".to_string()
        } else {
            e.to_string()
        };
        SourceError::Network {
            service,
            url: url.to_string(),
            message,
        }
    }

    pub(crate) fn upstream(
        service: &'static str,
        url: &str,
        status: Option<u16>,
        body: &str,
    ) -> Self {
        SourceError::Upstream {
            service,
            url: url.to_string(),
            status,
            body: truncate_body(body),
        }
    }
}

fn truncate_body(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= BODY_MAX_CHARS {
        body.to_string()
    } else {
        let mut s: String = body.chars().take(BODY_MAX_CHARS).collect();
        s.push('…');
        s
    }
}
