//! Two-tier article source: a primary feed, then a secondary path used only
//! when the primary comes up short.

use async_trait::async_trait;
use leetdigest_core::error::SourceError;
use leetdigest_core::model::Article;
use leetdigest_core::source::ArticleSource;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::sampler::Sampler;

/// One fetch path of a tiered source. Returns every candidate it can find.
#[async_trait]
pub trait FeedTier: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_all(&self) -> Result<Vec<Article>, SourceError>;
}

/// An article source backed by a primary and a secondary [`FeedTier`].
pub struct TieredSource {
    name: String,
    primary: Box<dyn FeedTier>,
    secondary: Box<dyn FeedTier>,
    sampler: Arc<Sampler>,
}

impl TieredSource {
    pub fn new(
        name: impl Into<String>,
        primary: Box<dyn FeedTier>,
        secondary: Box<dyn FeedTier>,
        sampler: Arc<Sampler>,
    ) -> Self {
        Self {
            name: name.into(),
            primary,
            secondary,
            sampler,
        }
    }
}

/// Append `items` to `into`, skipping blank or already-seen links.
fn merge_unique(into: &mut Vec<Article>, seen: &mut HashSet<String>, items: Vec<Article>) {
    for item in items {
        let key = item.link.trim().to_lowercase();
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        into.push(item);
    }
}

#[async_trait]
impl ArticleSource for TieredSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_articles(&self, count: usize) -> Result<Vec<Article>, SourceError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut unique = Vec::new();
        let mut seen = HashSet::new();
        let mut last_error = None;

        match self.primary.fetch_all().await {
            Ok(items) => merge_unique(&mut unique, &mut seen, items),
            Err(e) => {
                warn!(source = %self.name, tier = %self.primary.name(), error = %e, "Primary tier failed");
                last_error = Some(e);
            }
        }

        if unique.len() < count {
            debug!(
                source = %self.name,
                have = unique.len(),
                want = count,
                "Primary tier short, trying secondary"
            );
            match self.secondary.fetch_all().await {
                Ok(items) => merge_unique(&mut unique, &mut seen, items),
                Err(e) => {
                    warn!(source = %self.name, tier = %self.secondary.name(), error = %e, "Secondary tier failed");
                    last_error = Some(e);
                }
            }
        }

        if unique.is_empty() {
            return Err(last_error.unwrap_or_else(|| {
                SourceError::Empty(format!("{} returned no usable articles", self.name))
            }));
        }

        Ok(self.sampler.sample(unique, count))
    }
}
