use std::sync::Arc;

use crate::api::{self, FetchError, Post};

/// Seam between the fetch state machine and the HTTP client. The UI only
/// sees this trait, so tests can substitute canned outcomes.
pub trait PostService: Send + Sync {
    fn fetch_posts(&self) -> Result<Vec<Post>, FetchError>;
}

pub struct ApiPostService {
    client: Arc<api::Client>,
}

impl ApiPostService {
    pub fn new(client: Arc<api::Client>) -> Self {
        Self { client }
    }
}

impl PostService for ApiPostService {
    fn fetch_posts(&self) -> Result<Vec<Post>, FetchError> {
        self.client.fetch_posts()
    }
}

/// Canned service used by tests and offline demos.
pub struct MockPostService {
    outcome: Result<Vec<Post>, FetchError>,
}

impl MockPostService {
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self { outcome: Ok(posts) }
    }

    pub fn with_error(error: FetchError) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

impl PostService for MockPostService {
    fn fetch_posts(&self) -> Result<Vec<Post>, FetchError> {
        self.outcome.clone()
    }
}

pub fn sample_posts() -> Vec<Post> {
    vec![
        Post {
            id: 1,
            title: "T1".into(),
            body: "First body".into(),
            user_id: 5,
            tags: vec!["history".into()],
            thumbnail: "u1".into(),
            views: Some(10),
        },
        Post {
            id: 2,
            title: "T2".into(),
            body: "Second body".into(),
            user_id: 6,
            tags: vec!["magical".into()],
            thumbnail: "u2".into(),
            views: None,
        },
    ]
}
