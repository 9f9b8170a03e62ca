//! Source traits — the abstraction over item providers.
//!
//! A problem source knows how to fetch the featured problem and a random
//! sample of other problems; an article source fetches reading material.
//! Implementations may fail entirely; callers decide whether that is fatal.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::model::{Article, Problem};

/// The core problem source trait.
#[async_trait]
pub trait ProblemSource: Send + Sync {
    /// A human-readable name (e.g., "leetcode").
    fn name(&self) -> &str;

    /// Fetch the featured problem for today.
    async fn fetch_featured(&self) -> std::result::Result<Problem, SourceError>;

    /// Fetch up to `count` problems. `count == 0` returns an empty list.
    async fn fetch_random(&self, count: usize) -> std::result::Result<Vec<Problem>, SourceError>;
}

/// The core article source trait.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// A human-readable name (e.g., "medium", "devto").
    fn name(&self) -> &str;

    /// Fetch up to `count` articles. `count == 0` returns an empty list.
    async fn fetch_articles(&self, count: usize)
    -> std::result::Result<Vec<Article>, SourceError>;
}
