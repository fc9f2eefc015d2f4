//! Upstream collaborators of the comment pipeline.
//!
//! - [`VideoListClient`]: channel → video ids
//! - [`YouTubeCommentsClient`]: video → top-level comment texts
//! - [`IdeaAgentClient`]: gap analysis and next-video suggestion
//!
//! Each client also implements the matching trait in [`sources`] so the
//! pipeline can be driven by fakes.

pub mod config;
pub mod errors;
mod http;
pub mod ideas;
pub mod sources;
pub mod video_list;
pub mod youtube;

pub use config::SourcesConfig;
pub use errors::{SourceError, SourceResult};
pub use ideas::IdeaAgentClient;
pub use sources::{CommentSource, IdeaService, SourceFuture, VideoSource};
pub use video_list::VideoListClient;
pub use youtube::YouTubeCommentsClient;
