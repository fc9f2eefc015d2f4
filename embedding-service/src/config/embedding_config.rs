use crate::error_handler::{
    ConfigError, EmbeddingError, env_opt, env_opt_u64, must_env, validate_http_endpoint,
};

/// Default OpenAI API base (without the `/v1` suffix).
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
/// Default embedding model (1536-d, cheaper).
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Configuration for an embedding model invocation.
///
/// # Fields
///
/// - `model`: model identifier (e.g. `"text-embedding-3-small"`).
/// - `endpoint`: API base URL; `/v1/embeddings` is appended.
/// - `api_key`: bearer token for the provider.
/// - `dim`: expected vector dimensionality; every response is checked against it.
/// - `send_dimensions`: whether `dim` is forwarded as the `dimensions` request field.
/// - `timeout_secs`: optional request timeout in seconds.
#[derive(Debug, Clone)]
pub struct EmbeddingModelConfig {
    pub model: String,
    pub endpoint: String,
    pub api_key: String,
    pub dim: usize,
    pub send_dimensions: bool,
    pub timeout_secs: Option<u64>,
}

impl EmbeddingModelConfig {
    /// Expected dimension for the well-known OpenAI models.
    pub fn default_dim_for(model: &str) -> usize {
        match model {
            "text-embedding-3-large" => 3072,
            _ => 1536,
        }
    }

    /// Builds the config strictly from environment.
    ///
    /// # Env
    /// - `OPENAI_API_KEY` (required)
    /// - `OPENAI_BASE_URL` (default: `https://api.openai.com`)
    /// - `EMBEDDING_MODEL` (default: `text-embedding-3-small`)
    /// - `EMBEDDING_DIM` (default: 1536, or 3072 for `text-embedding-3-large`)
    /// - `EMBEDDING_SEND_DIMENSIONS` (default: false)
    /// - `EMBEDDING_TIMEOUT_SECS` (default: 60)
    ///
    /// # Errors
    /// Returns [`EmbeddingError::Config`] on missing or malformed variables.
    pub fn from_env() -> Result<Self, EmbeddingError> {
        let api_key = must_env("OPENAI_API_KEY")?;
        let endpoint =
            env_opt("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
        validate_http_endpoint("OPENAI_BASE_URL", &endpoint)?;

        let model =
            env_opt("EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string());
        let dim = match env_opt_u64("EMBEDDING_DIM")? {
            Some(0) => {
                return Err(ConfigError::InvalidNumber {
                    var: "EMBEDDING_DIM",
                    reason: "must be > 0",
                }
                .into());
            }
            Some(d) => d as usize,
            None => Self::default_dim_for(&model),
        };
        let send_dimensions = env_opt("EMBEDDING_SEND_DIMENSIONS")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let timeout_secs = env_opt_u64("EMBEDDING_TIMEOUT_SECS")?.or(Some(60));

        let cfg = Self {
            model,
            endpoint,
            api_key,
            dim,
            send_dimensions,
            timeout_secs,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates values that do not depend on the environment.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingVar("OPENAI_API_KEY").into());
        }
        validate_http_endpoint("OPENAI_BASE_URL", self.endpoint.trim())
    }
}
