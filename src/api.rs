use std::time::Duration;

use anyhow::{bail, Result};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com/";

const POSTS_PATH: &str = "posts";

/// Terminal outcomes of a single posts fetch. One request is made per call;
/// none of these is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("http error: status {status}")]
    HttpStatus { status: u16 },
    #[error("parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub user_agent: String,
    pub base_url: Option<String>,
    pub http_client: Option<HttpClient>,
}

pub struct Client {
    http: HttpClient,
    user_agent: String,
    base_url: Url,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.user_agent.trim().is_empty() {
            bail!("tagfeed client user agent required");
        }
        let base = config
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base)?;
        let http = match config.http_client {
            Some(client) => client,
            None => HttpClient::builder()
                .timeout(Duration::from_secs(20))
                .build()?,
        };

        Ok(Client {
            http,
            user_agent: config.user_agent,
            base_url,
        })
    }

    /// Issues exactly one GET against the posts resource and decodes the
    /// `{ "posts": [...] }` envelope. Extra payload fields (`total`, `skip`,
    /// `limit`) are ignored.
    pub fn fetch_posts(&self) -> Result<Vec<Post>, FetchError> {
        let url = self
            .base_url
            .join(POSTS_PATH)
            .map_err(|err| FetchError::Network(err.to_string()))?;
        let resp = self
            .http
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .map_err(|err| FetchError::Network(err.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .map_err(|err| FetchError::Network(err.to_string()))?;
        let envelope: PostsEnvelope =
            serde_json::from_str(&body).map_err(|err| FetchError::Parse(err.to_string()))?;
        Ok(envelope.posts)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct PostsEnvelope {
    posts: Vec<Post>,
}

/// A post as delivered by the API. The collection is read-only after fetch;
/// `id` is the stable list key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, rename = "userId")]
    pub user_id: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub views: Option<i64>,
}

impl Post {
    /// Display value for `views`; absent on the wire means zero.
    pub fn view_count(&self) -> i64 {
        self.views.unwrap_or(0)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tiny_http::{Response, Server};

    fn serve_once(response: Response<std::io::Cursor<Vec<u8>>>) -> String {
        let server = Server::http("127.0.0.1:0").expect("bind fixture server");
        let addr = server.server_addr().to_string();
        thread::spawn(move || {
            if let Ok(request) = server.recv() {
                let _ = request.respond(response);
            }
        });
        format!("http://{}/", addr)
    }

    fn client_for(base_url: String) -> Client {
        Client::new(ClientConfig {
            user_agent: "tagfeed-test/0.1".into(),
            base_url: Some(base_url),
            http_client: None,
        })
        .expect("build client")
    }

    #[test]
    fn fetch_posts_decodes_envelope() {
        let payload = r#"{
            "posts": [
                {"id": 1, "title": "T1", "tags": ["history"], "userId": 5, "views": 10, "thumbnail": "u1"},
                {"id": 2, "title": "T2", "tags": ["magical"], "userId": 6, "thumbnail": "u2"}
            ],
            "total": 2, "skip": 0, "limit": 30
        }"#;
        let base = serve_once(Response::from_string(payload));
        let posts = client_for(base).fetch_posts().expect("fetch ok");

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, 1);
        assert_eq!(posts[0].tags, vec!["history".to_string()]);
        assert_eq!(posts[0].views, Some(10));
        assert_eq!(posts[1].views, None);
        assert_eq!(posts[1].view_count(), 0);
        assert!(posts[1].body.is_empty());
    }

    #[test]
    fn fetch_posts_surfaces_http_status() {
        let base = serve_once(Response::from_string("oops").with_status_code(500));
        let err = client_for(base).fetch_posts().unwrap_err();
        assert_eq!(err, FetchError::HttpStatus { status: 500 });
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn fetch_posts_surfaces_parse_error() {
        let base = serve_once(Response::from_string("{\"posts\": \"nope\"}"));
        let err = client_for(base).fetch_posts().unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn fetch_posts_surfaces_network_error() {
        // Bind, learn the port, then drop the listener before connecting.
        let server = Server::http("127.0.0.1:0").expect("bind fixture server");
        let base = format!("http://{}/", server.server_addr());
        drop(server);

        let err = client_for(base).fetch_posts().unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }

    #[test]
    fn client_requires_user_agent() {
        let result = Client::new(ClientConfig::default());
        assert!(result.is_err());
    }
}
