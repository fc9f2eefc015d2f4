//! OpenAI embeddings service.
//!
//! Minimal client around the OpenAI-compatible REST API:
//! - POST {endpoint}/v1/embeddings — batched embeddings retrieval
//!
//! Constructor validation:
//! - `cfg.api_key` must be non-empty
//! - `cfg.endpoint` must start with http:// or https://
//!
//! Errors are normalized via unified error types in `error_handler`.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    config::embedding_config::EmbeddingModelConfig,
    error_handler::{EmbeddingError, HttpError, make_snippet},
};

/// Thin client for the OpenAI embeddings API.
///
/// Constructed from a complete [`EmbeddingModelConfig`]. Internally keeps a
/// preconfigured `reqwest::Client` (with timeout and default headers), so one
/// instance is built at startup and shared for the life of the process.
#[derive(Debug)]
pub struct OpenAiEmbeddingService {
    client: reqwest::Client,
    cfg: EmbeddingModelConfig,
    url_embeddings: String,
}

impl OpenAiEmbeddingService {
    /// Creates a new [`OpenAiEmbeddingService`] from the given config.
    ///
    /// # Errors
    /// - [`EmbeddingError::Config`] if the config is invalid
    /// - [`EmbeddingError::Decode`] if the API key cannot be used as a header
    /// - [`EmbeddingError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: EmbeddingModelConfig) -> Result<Self, EmbeddingError> {
        cfg.validate()?;

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", cfg.api_key.trim()))
                .map_err(|e| EmbeddingError::Decode(format!("invalid API key header: {e}")))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let base = cfg.endpoint.trim().trim_end_matches('/').to_string();
        let url_embeddings = format!("{}/v1/embeddings", base);

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            dim = cfg.dim,
            timeout_secs = cfg.timeout_secs.unwrap_or(60),
            "OpenAiEmbeddingService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_embeddings,
        })
    }

    /// Configured vector dimensionality.
    pub fn dim(&self) -> usize {
        self.cfg.dim
    }

    /// Configured model identifier.
    pub fn model(&self) -> &str {
        &self.cfg.model
    }

    /// Embeds a batch of strings via `/v1/embeddings`.
    ///
    /// Returns exactly one vector per input, in input order. An empty batch
    /// returns immediately without a network call.
    ///
    /// # Errors
    /// - [`EmbeddingError::HttpStatus`] for non-2xx responses
    /// - [`EmbeddingError::HttpTransport`] for client/network failures
    /// - [`EmbeddingError::Decode`] if the JSON cannot be parsed
    /// - [`EmbeddingError::CountMismatch`] / [`EmbeddingError::DimensionMismatch`]
    ///   if the response violates the batch contract
    pub async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            input: inputs,
            dimensions: self.cfg.send_dimensions.then_some(self.cfg.dim),
        };

        debug!(
            model = %self.cfg.model,
            batch = inputs.len(),
            "POST {}", self.url_embeddings
        );

        let resp = self
            .client
            .post(&self.url_embeddings)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_embeddings.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "/v1/embeddings returned non-success status"
            );

            return Err(EmbeddingError::HttpStatus(HttpError {
                status,
                url,
                snippet,
            }));
        }

        let out: EmbeddingsResponse = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                error!(
                    error = %e,
                    model = %self.cfg.model,
                    latency_ms = started.elapsed().as_millis(),
                    "failed to decode /v1/embeddings response"
                );
                return Err(EmbeddingError::Decode(format!(
                    "serde error: {e}; expected `data[].embedding`"
                )));
            }
        };

        let vectors = out.into_ordered(inputs.len(), self.cfg.dim)?;

        info!(
            model = %self.cfg.model,
            batch = vectors.len(),
            latency_ms = started.elapsed().as_millis(),
            "embeddings completed"
        );

        Ok(vectors)
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Request body for `/v1/embeddings`.
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

/// Response body for `/v1/embeddings`.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

impl EmbeddingsResponse {
    /// Restores input order via `index` and enforces count and dimension.
    fn into_ordered(
        self,
        expected_len: usize,
        dim: usize,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if self.data.len() != expected_len {
            return Err(EmbeddingError::CountMismatch {
                got: self.data.len(),
                want: expected_len,
            });
        }

        // Items without an index keep their wire position.
        let mut keyed: Vec<(usize, Vec<f32>)> = self
            .data
            .into_iter()
            .enumerate()
            .map(|(pos, item)| (item.index.unwrap_or(pos), item.embedding))
            .collect();
        keyed.sort_by_key(|(i, _)| *i);

        if keyed.iter().enumerate().any(|(i, (idx, _))| *idx != i) {
            return Err(EmbeddingError::Decode(format!(
                "embedding indices are not a permutation of 0..{expected_len}"
            )));
        }

        let mut out = Vec::with_capacity(expected_len);
        for (i, (_, v)) in keyed.into_iter().enumerate() {
            if v.len() != dim {
                return Err(EmbeddingError::DimensionMismatch {
                    index: i,
                    got: v.len(),
                    want: dim,
                });
            }
            out.push(v);
        }
        Ok(out)
    }
}
