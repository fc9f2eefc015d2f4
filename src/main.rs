use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use comment_rag::{
    CommentRag, CommentRagError, NextIdeaRequest, require_channel_id, require_query_text,
};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "comment-rag-backend",
    about = "Ingest YouTube comments into a vector index and query them"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, embed and store the comments of every video of a channel
    Ingest {
        /// YouTube channel id
        channel_id: String,
    },
    /// Find the video whose comments best match a query
    Query {
        /// Natural-language query
        text: String,
    },
    /// Generate a next-video suggestion from viewer requests
    NextIdea {
        /// Seed query for the gap analysis
        #[arg(long)]
        query: String,

        /// YouTube channel id
        #[arg(long = "channel")]
        channel_id: String,

        /// Extra search phrase, searched before the defaults (repeatable)
        #[arg(long = "phrase")]
        phrases: Vec<String>,
    },
}

impl Command {
    /// Rejects blank arguments with the same errors the library returns.
    fn validate(&self) -> comment_rag::Result<()> {
        match self {
            Command::Ingest { channel_id } => require_channel_id(channel_id).map(drop),
            Command::Query { text } => require_query_text(text).map(drop),
            Command::NextIdea { query, channel_id, .. } => {
                require_query_text(query)?;
                require_channel_id(channel_id).map(drop)
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Optional: a missing .env is fine, the environment may be set already.
    let dotenv = dotenvy::dotenv();

    if let Err(e) = services::telemetry::init() {
        eprintln!("failed to install tracing subscriber: {e}");
    }
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "loaded .env");
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(out) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            match e.downcast_ref::<CommentRagError>() {
                Some(rag) => error!(
                    code = rag.code(),
                    http_status = rag.http_status(),
                    "{e:#}"
                ),
                None => error!("{e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<String> {
    // Nothing is built from the environment until the arguments are valid.
    cli.command.validate()?;

    let rag = CommentRag::from_env()
        .await
        .context("failed to initialize comment rag")?;

    let value = match cli.command {
        Command::Ingest { channel_id } => serde_json::to_value(rag.ingest(&channel_id).await?)?,
        Command::Query { text } => serde_json::to_value(rag.query(&text).await?)?,
        Command::NextIdea {
            query,
            channel_id,
            phrases,
        } => serde_json::to_value(
            rag.next_idea(NextIdeaRequest {
                query,
                yt_channel_id: channel_id,
                extra_phrases: phrases,
            })
            .await?,
        )?,
    };

    Ok(serde_json::to_string_pretty(&value)?)
}
