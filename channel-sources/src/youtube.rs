//! YouTube Data API v3 comment threads.
//!
//! Endpoint used:
//!   * GET {base}/commentThreads?part=snippet&videoId=..&key=..&maxResults=..[&pageToken=..]

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::SourcesConfig;
use crate::errors::SourceResult;
use crate::http::{client, send_json};
use crate::sources::{CommentSource, SourceFuture};

const SERVICE: &str = "youtube";

/// YouTube HTTP client wrapper.
#[derive(Debug, Clone)]
pub struct YouTubeCommentsClient {
    http: Client,
    url: String,
    api_key: String,
    page_size: u32,
}

impl YouTubeCommentsClient {
    pub fn new(cfg: &SourcesConfig) -> SourceResult<Self> {
        let base = cfg.yt_api_base.trim_end_matches('/');
        Ok(Self {
            http: client(cfg.upstream_timeout_secs)?,
            url: format!("{base}/commentThreads"),
            api_key: cfg.yt_api_key.clone(),
            page_size: cfg.yt_page_size,
        })
    }

    /// Collects trimmed, non-empty top-level comment texts for a video.
    ///
    /// Follows `nextPageToken` until it is absent or `max_pages` pages were read.
    pub async fn fetch_all(
        &self,
        video_id: &str,
        max_pages: Option<usize>,
    ) -> SourceResult<Vec<String>> {
        let mut comments = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page_size = self.page_size.to_string();
            let mut query: Vec<(&str, &str)> = vec![
                ("part", "snippet"),
                ("videoId", video_id),
                ("key", &self.api_key),
                ("maxResults", &page_size),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let json =
                send_json(SERVICE, &self.url, self.http.get(&self.url).query(&query)).await?;
            let page: CommentThreadsPage = serde_json::from_value(json).unwrap_or_default();
            pages += 1;

            let before = comments.len();
            comments.extend(page.items.into_iter().filter_map(top_level_text));
            debug!(video_id, page = pages, added = comments.len() - before, "comment page");

            page_token = page.next_page_token.filter(|t| !t.is_empty());
            if page_token.is_none() {
                break;
            }
            if max_pages.is_some_and(|cap| pages >= cap) {
                break;
            }
        }

        info!(video_id, pages, comments = comments.len(), "comments fetched");
        Ok(comments)
    }
}

impl CommentSource for YouTubeCommentsClient {
    fn fetch_comments<'a>(
        &'a self,
        video_id: &'a str,
        max_pages: Option<usize>,
    ) -> SourceFuture<'a, Vec<String>> {
        Box::pin(self.fetch_all(video_id, max_pages))
    }
}

#[derive(Debug, Default, Deserialize)]
struct CommentThreadsPage {
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default, rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: ThreadSnippet,
}

#[derive(Debug, Deserialize)]
struct ThreadSnippet {
    #[serde(rename = "topLevelComment")]
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
struct CommentSnippet {
    #[serde(rename = "textOriginal")]
    text_original: String,
}

/// Text of one thread item; items missing any field are skipped.
fn top_level_text(item: Value) -> Option<String> {
    let thread: CommentThread = serde_json::from_value(item).ok()?;
    let text = thread.snippet.top_level_comment.snippet.text_original.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SourceError;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn thread(text: &str) -> Value {
        json!({"snippet": {"topLevelComment": {"snippet": {"textOriginal": text}}}})
    }

    async fn client_for(server: &MockServer) -> YouTubeCommentsClient {
        let mut cfg = SourcesConfig::with_api_key("yt-key");
        cfg.yt_api_base = server.uri();
        YouTubeCommentsClient::new(&cfg).unwrap()
    }

    #[test]
    fn malformed_items_are_skipped() {
        assert_eq!(top_level_text(thread("  hi  ")), Some("hi".to_string()));
        assert_eq!(top_level_text(thread("   ")), None);
        assert_eq!(top_level_text(json!({"snippet": {}})), None);
        let non_string = json!({"snippet": {"topLevelComment": {"snippet": {"textOriginal": 5}}}});
        assert_eq!(top_level_text(non_string), None);
    }

    #[tokio::test]
    async fn follows_pages_until_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .and(query_param("pageToken", "p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [thread("third")]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .and(query_param("videoId", "v1"))
            .and(query_param("key", "yt-key"))
            .and(query_param("maxResults", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [thread("first"), {"bogus": true}, thread("second")],
                "nextPageToken": "p2"
            })))
            .mount(&server)
            .await;

        let yt = client_for(&server).await;
        let out = yt.fetch_all("v1", None).await.unwrap();
        assert_eq!(out, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn page_cap_stops_early() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [thread("only")],
                "nextPageToken": "more"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let yt = client_for(&server).await;
        let out = yt.fetch_all("v1", Some(1)).await.unwrap();
        assert_eq!(out, vec!["only"]);
    }

    #[tokio::test]
    async fn forbidden_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("commentsDisabled"))
            .mount(&server)
            .await;

        let yt = client_for(&server).await;
        let err = yt.fetch_all("v1", Some(1)).await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::Upstream { service: "youtube", status: Some(403), .. }
        ));
    }
}
