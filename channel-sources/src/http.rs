//! Shared request/response handling for JSON upstreams.

use reqwest::RequestBuilder;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{SourceError, SourceResult};

/// Sends `req` and returns the parsed JSON body.
///
/// Non-2xx responses and non-JSON bodies are [`SourceError::Upstream`];
/// transport failures are [`SourceError::Network`].
pub(crate) async fn send_json(
    service: &'static str,
    url: &str,
    req: RequestBuilder,
) -> SourceResult<Value> {
    debug!(service, %url, "sending request");

    let resp = req
        .send()
        .await
        .map_err(|e| SourceError::transport(service, url, e))?;
    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| SourceError::transport(service, url, e))?;

    if !status.is_success() {
        warn!(service, %url, %status, "upstream returned non-success status");
        return Err(SourceError::upstream(
            service,
            url,
            Some(status.as_u16()),
            &text,
        ));
    }

    serde_json::from_str(&text).map_err(|e| {
        warn!(service, %url, error = %e, "upstream body is not JSON");
        SourceError::upstream(service, url, None, &text)
    })
}

/// Builds a client with a per-request timeout and stable user agent.
pub(crate) fn client(timeout_secs: u64) -> SourceResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent("channel-sources/0.1")
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| SourceError::Config(format!("failed to build HTTP client: {e}")))
}
