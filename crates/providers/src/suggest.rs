//! Reading-list suggestions generated by Gemini, usable as an article source.

use async_trait::async_trait;
use leetdigest_core::error::{NarrativeError, SourceError};
use leetdigest_core::model::Article;
use leetdigest_core::source::ArticleSource;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::gemini::{GenerationConfig, GeminiClient};

const DEFAULT_SOURCE_LABEL: &str = "Gemini Suggestion";
const SEARCH_URL: &str = "https://www.google.com/search";

/// Asks a model for a JSON list of free study resources.
pub struct GeminiArticleSource {
    client: Arc<GeminiClient>,
    model: String,
    topic_limit: usize,
}

impl GeminiArticleSource {
    pub fn new(client: Arc<GeminiClient>, model: impl Into<String>, topic_limit: usize) -> Self {
        Self {
            client,
            model: model.into(),
            topic_limit,
        }
    }

    fn build_prompt(count: usize) -> String {
        format!(
            "You are an expert algorithms mentor curating daily study material.\n\
             Provide a JSON array with exactly {count} unique items.\n\
             Each item must have keys \"title\", \"link\", and \"source\".\n\
             - \"title\": concise topic or article title (max 80 characters).\n\
             - \"link\": valid URL to a high-quality free resource (official docs, reputable blogs, lectures).\n\
             - \"source\": the site or author name.\n\
             Do not include any additional text outside the JSON array."
        )
    }
}

#[derive(Debug, Deserialize)]
struct Suggestion {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    source: String,
}

fn to_source_error(e: NarrativeError) -> SourceError {
    match e {
        NarrativeError::ApiError {
            status_code,
            message,
        } => SourceError::ApiError {
            status_code,
            message,
        },
        NarrativeError::Network(m) => SourceError::Network(m),
        NarrativeError::Timeout(m) => SourceError::Timeout(m),
        NarrativeError::Decode(m) => SourceError::Decode(m),
        NarrativeError::NotConfigured(m) => SourceError::NotConfigured(m),
        other => SourceError::Empty(other.to_string()),
    }
}

/// Strip an optional Markdown code fence around the model's JSON.
fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    for prefix in ["```json", "```JSON", "```"] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest;
            break;
        }
    }
    text.strip_suffix("```").unwrap_or(text).trim()
}

fn search_link(title: &str) -> String {
    reqwest::Url::parse_with_params(SEARCH_URL, &[("q", title)])
        .map(String::from)
        .unwrap_or_else(|_| format!("{SEARCH_URL}?q={}", title.replace(' ', "+")))
}

fn parse_suggestions(raw: &str, limit: usize) -> Result<Vec<Article>, SourceError> {
    let items: Vec<Suggestion> = serde_json::from_str(strip_fences(raw))
        .map_err(|e| SourceError::Decode(format!("Failed to parse suggestions: {e}")))?;

    let articles: Vec<Article> = items
        .into_iter()
        .take(limit)
        .filter_map(|item| {
            let title = item.title.trim();
            if title.is_empty() {
                return None;
            }
            let link = match item.link.trim() {
                "" => search_link(title),
                link => link.to_string(),
            };
            let source = match item.source.trim() {
                "" => DEFAULT_SOURCE_LABEL,
                source => source,
            };
            Some(Article::new(title, link, source))
        })
        .collect();

    if articles.is_empty() {
        return Err(SourceError::Empty("Gemini suggestions were empty".into()));
    }
    Ok(articles)
}

#[async_trait]
impl ArticleSource for GeminiArticleSource {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn fetch_articles(&self, count: usize) -> Result<Vec<Article>, SourceError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let request_count = count.min(self.topic_limit.max(1));
        debug!(model = %self.model, request_count, "Requesting reading suggestions");

        let raw = self
            .client
            .generate(
                &self.model,
                &Self::build_prompt(request_count),
                GenerationConfig::SUGGESTIONS,
                false,
            )
            .await
            .map_err(to_source_error)?;

        parse_suggestions(&raw, request_count)
    }
}
