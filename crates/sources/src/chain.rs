//! Article chain — ordered sources with per-source timeouts and deduplication.
//!
//! Sources are asked in order for the remaining deficit until the target
//! count of unique articles is met. A failing source is logged and skipped;
//! the chain itself only fails when every source it tried failed.

use async_trait::async_trait;
use leetdigest_core::error::SourceError;
use leetdigest_core::model::Article;
use leetdigest_core::source::ArticleSource;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// An article source that wraps an ordered list of article sources.
pub struct ArticleChain {
    name: String,
    chain: Vec<ChainEntry>,
}

/// A single entry in the chain.
struct ChainEntry {
    source: Arc<dyn ArticleSource>,
    timeout: Duration,
}

impl ArticleChain {
    /// Create a new chain with no entries.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chain: Vec::new(),
        }
    }

    /// Add a source to the chain with a custom timeout.
    pub fn add(mut self, source: Arc<dyn ArticleSource>, timeout: Duration) -> Self {
        self.chain.push(ChainEntry { source, timeout });
        self
    }

    /// Add a source with the default timeout (30s).
    pub fn add_default(self, source: Arc<dyn ArticleSource>) -> Self {
        self.add(source, Duration::from_secs(30))
    }

    /// Number of sources in the chain.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

#[async_trait]
impl ArticleSource for ArticleChain {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_articles(&self, count: usize) -> Result<Vec<Article>, SourceError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        if self.chain.is_empty() {
            return Err(SourceError::NotConfigured(
                "No sources in article chain".into(),
            ));
        }

        let mut results: Vec<Article> = Vec::with_capacity(count);
        let mut seen: HashSet<String> = HashSet::new();
        let mut first_error: Option<SourceError> = None;
        let mut attempted = 0;
        let mut failed = 0;

        for (i, entry) in self.chain.iter().enumerate() {
            if results.len() >= count {
                break;
            }
            let deficit = count - results.len();
            let source_name = entry.source.name().to_string();
            attempted += 1;

            info!(
                source = %source_name,
                attempt = i + 1,
                total = self.chain.len(),
                requested = deficit,
                "Article chain: querying source"
            );

            let outcome =
                match tokio::time::timeout(entry.timeout, entry.source.fetch_articles(deficit))
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => Err(SourceError::Timeout(format!(
                        "Source '{}' timed out after {}s",
                        source_name,
                        entry.timeout.as_secs()
                    ))),
                };

            match outcome {
                Ok(items) => {
                    for item in items {
                        let Some(key) = item.canonical_key() else {
                            continue;
                        };
                        if !seen.insert(key) {
                            continue;
                        }
                        results.push(item);
                        if results.len() >= count {
                            break;
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        source = %source_name,
                        error = %e,
                        "Article chain: source failed, trying next"
                    );
                    failed += 1;
                    first_error.get_or_insert(e);
                }
            }
        }

        if failed == attempted {
            if let Some(first) = first_error {
                return Err(SourceError::ChainExhausted {
                    attempted,
                    first: Box::new(first),
                });
            }
        }

        Ok(results)
    }
}
