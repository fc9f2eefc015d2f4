//! YouTube comment retrieval over a vector index.
//!
//! [`CommentRag`] is the entry point and exposes three operations:
//! - [`CommentRag::ingest`]: store every comment of a channel's videos
//! - [`CommentRag::query`]: find the best-matching video and its comments
//! - [`CommentRag::next_idea`]: turn viewer requests into a video suggestion

pub mod config;
pub mod errors;
pub mod ideas;
pub mod ingest;
pub mod normalize;
pub mod select;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use channel_sources::{
    CommentSource, IdeaAgentClient, IdeaService, SourcesConfig, VideoListClient, VideoSource,
    YouTubeCommentsClient,
};
use embedding_service::{EmbeddingModelConfig, OpenAiEmbeddingService};
use rag_store::{
    EmbeddingsProvider, OpenAiEmbedder, QdrantFacade, RagConfig, VectorSpace, VectorStore,
};
use tracing::{info, trace};

pub use config::{IngestConfig, SelectorConfig};
pub use errors::{CommentRagError, Result};
pub use ideas::{DEFAULT_PHRASES, NextIdeaReport, NextIdeaRequest};
pub use ingest::{IngestReport, UpsertCounts};
pub use normalize::{CleanComment, normalize_comments};
pub use select::QueryResult;

use ideas::IdeaAggregator;
use ingest::IngestPipeline;
use select::BestVideoSelector;

/// External capabilities the pipelines run against.
#[derive(Clone)]
pub struct Collaborators {
    pub videos: Arc<dyn VideoSource>,
    pub comments: Arc<dyn CommentSource>,
    pub ideas: Arc<dyn IdeaService>,
    pub embedder: Arc<dyn EmbeddingsProvider>,
    pub store: Arc<dyn VectorStore>,
}

/// Facade wiring ingestion, selection and idea generation.
pub struct CommentRag {
    ingest: IngestPipeline,
    selector: Arc<BestVideoSelector>,
    ideas: IdeaAggregator,
}

impl CommentRag {
    pub fn new(
        deps: Collaborators,
        namespace: &str,
        ingest_cfg: IngestConfig,
        selector_cfg: SelectorConfig,
    ) -> Self {
        let ingest = IngestPipeline::new(
            deps.videos,
            deps.comments,
            Arc::clone(&deps.embedder),
            Arc::clone(&deps.store),
            namespace,
            ingest_cfg,
        );
        let selector = Arc::new(BestVideoSelector::new(
            deps.embedder,
            deps.store,
            namespace,
            selector_cfg,
        ));
        let ideas = IdeaAggregator::new(Arc::clone(&selector), deps.ideas);
        Self {
            ingest,
            selector,
            ideas,
        }
    }

    /// Builds every client from the environment and makes sure the Qdrant
    /// collection exists.
    pub async fn from_env() -> Result<Self> {
        let embed_cfg = EmbeddingModelConfig::from_env()?;
        let svc = Arc::new(OpenAiEmbeddingService::new(embed_cfg)?);
        let model = svc.model().to_string();
        let embedder = Arc::new(OpenAiEmbedder::new(svc));

        let rag_cfg = RagConfig::from_env()?;
        let space = VectorSpace {
            size: embedder.dim(),
            distance: rag_cfg.distance,
        };
        let qdrant = QdrantFacade::new(&rag_cfg, space)?;
        qdrant.ensure_collection().await?;

        let sources = SourcesConfig::from_env()?;
        let deps = Collaborators {
            videos: Arc::new(VideoListClient::new(&sources)?),
            comments: Arc::new(YouTubeCommentsClient::new(&sources)?),
            ideas: Arc::new(IdeaAgentClient::new(&sources)?),
            embedder,
            store: Arc::new(qdrant),
        };

        info!(
            collection = %rag_cfg.collection,
            namespace = %rag_cfg.namespace,
            dim = space.size,
            model = %model,
            "comment rag ready"
        );

        Ok(Self::new(
            deps,
            &rag_cfg.namespace,
            IngestConfig::from_env()?,
            SelectorConfig::from_env()?,
        ))
    }

    /// Fetches, embeds and stores the comments of every video of a channel.
    ///
    /// # Errors
    /// - [`CommentRagError::Validation`] on a blank channel id
    /// - [`CommentRagError::Upstream`] / [`CommentRagError::Network`] if the
    ///   channel cannot be resolved
    /// - [`CommentRagError::Internal`] on embedding or index failures
    pub async fn ingest(&self, channel_id: &str) -> Result<IngestReport> {
        let channel_id = require_channel_id(channel_id)?;
        trace!(channel_id, "CommentRag::ingest");
        self.ingest.run(channel_id).await
    }

    /// Returns the video whose comments best match `text`, with its top comments.
    ///
    /// # Errors
    /// [`CommentRagError::Validation`] on blank text, [`CommentRagError::Internal`] otherwise.
    pub async fn query(&self, text: &str) -> Result<QueryResult> {
        let text = require_query_text(text)?;
        trace!(text, "CommentRag::query");
        self.selector.select(text).await
    }

    /// Produces a next-video suggestion from gap analysis and viewer requests.
    pub async fn next_idea(&self, req: NextIdeaRequest) -> Result<NextIdeaReport> {
        req.validate()?;
        trace!(channel_id = %req.yt_channel_id, "CommentRag::next_idea");
        self.ideas.run(&req).await
    }
}

/// Trims a channel id, rejecting it when blank.
pub fn require_channel_id(channel_id: &str) -> Result<&str> {
    non_blank(channel_id, "yt_channel_id is required")
}

/// Trims query text, rejecting it when blank.
pub fn require_query_text(text: &str) -> Result<&str> {
    non_blank(text, "query must be a non-empty string")
}

impl NextIdeaRequest {
    /// Rejects a blank query or channel id.
    pub fn validate(&self) -> Result<()> {
        non_blank(&self.query, "query is required")?;
        require_channel_id(&self.yt_channel_id)?;
        Ok(())
    }
}

fn non_blank<'a>(value: &'a str, msg: &str) -> Result<&'a str> {
    let v = value.trim();
    if v.is_empty() {
        Err(CommentRagError::Validation(msg.to_string()))
    } else {
        Ok(v)
    }
}
