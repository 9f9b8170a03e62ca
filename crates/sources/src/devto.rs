//! dev.to articles tagged "algorithms".

use async_trait::async_trait;
use leetdigest_core::error::SourceError;
use leetdigest_core::model::Article;
use leetdigest_core::source::ArticleSource;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::http::{build_client, ensure_success, network_error};
use crate::sampler::Sampler;

pub const DEVTO_API_URL: &str = "https://dev.to/api/articles?tag=algorithms&per_page=50";

/// dev.to public articles API.
pub struct DevToSource {
    client: reqwest::Client,
    url: String,
    sampler: Arc<Sampler>,
}

impl DevToSource {
    pub fn new(timeout: Duration, sampler: Arc<Sampler>) -> Self {
        Self::with_endpoint(DEVTO_API_URL, timeout, sampler)
    }

    pub fn with_endpoint(url: impl Into<String>, timeout: Duration, sampler: Arc<Sampler>) -> Self {
        Self {
            client: build_client(timeout),
            url: url.into(),
            sampler,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DevToArticle {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    user: DevToUser,
}

#[derive(Debug, Default, Deserialize)]
struct DevToUser {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

impl DevToUser {
    /// Author name, else username, else the site name.
    fn label(&self) -> String {
        [&self.name, &self.username]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("dev.to")
            .to_string()
    }
}

#[async_trait]
impl ArticleSource for DevToSource {
    fn name(&self) -> &str {
        "devto"
    }

    async fn fetch_articles(&self, count: usize) -> Result<Vec<Article>, SourceError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(network_error)?;
        let payload: Vec<DevToArticle> = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        if payload.is_empty() {
            return Err(SourceError::Empty("dev.to returned no articles".into()));
        }
        debug!(available = payload.len(), requested = count, "dev.to articles fetched");

        let picked = self.sampler.sample(payload, count);
        Ok(picked
            .into_iter()
            .map(|item| {
                let source = item.user.label();
                Article::new(item.title, item.url, source)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn source_for(body: serde_json::Value) -> (MockServer, DevToSource) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        let source = DevToSource::with_endpoint(
            format!("{}/api/articles", server.uri()),
            Duration::from_secs(5),
            Arc::new(Sampler::seeded(5)),
        );
        (server, source)
    }

    #[test]
    fn label_prefers_name_then_username() {
        let named = DevToUser {
            name: Some("Ada".into()),
            username: Some("ada99".into()),
        };
        let handle = DevToUser {
            name: Some("  ".into()),
            username: Some("ada99".into()),
        };
        assert_eq!(named.label(), "Ada");
        assert_eq!(handle.label(), "ada99");
        assert_eq!(DevToUser::default().label(), "dev.to");
    }

    #[tokio::test]
    async fn samples_requested_count() {
        let body = json!([
            {"title": "A", "url": "https://dev.to/a", "user": {"name": "Ann"}},
            {"title": "B", "url": "https://dev.to/b", "user": {"username": "bee"}},
            {"title": "C", "url": "https://dev.to/c"}
        ]);
        let (_server, source) = source_for(body).await;

        let out = source.fetch_articles(2).await.unwrap();
        assert_eq!(out.len(), 2);

        let all = source.fetch_articles(10).await.unwrap();
        assert_eq!(all.len(), 3);
        let c = all.iter().find(|a| a.title == "C").unwrap();
        assert_eq!(c.source, "dev.to");
    }

    #[tokio::test]
    async fn empty_payload_is_an_error() {
        let (_server, source) = source_for(json!([])).await;
        assert!(matches!(
            source.fetch_articles(2).await.unwrap_err(),
            SourceError::Empty(_)
        ));
    }

    #[tokio::test]
    async fn server_error_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;
        let source = DevToSource::with_endpoint(
            server.uri(),
            Duration::from_secs(5),
            Arc::new(Sampler::seeded(5)),
        );

        match source.fetch_articles(1).await.unwrap_err() {
            SourceError::ApiError {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 500);
                assert_eq!(message, "oops");
            }
            other => panic!("Expected ApiError, got: {other:?}"),
        }
    }
}
