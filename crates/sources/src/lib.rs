//! Problem and article sources for leetdigest.
//!
//! Concrete sources implement `leetdigest_core::ProblemSource` or
//! `leetdigest_core::ArticleSource`. [`ArticleChain`] combines several article
//! sources in order with deduplication; [`TieredSource`] is a single source
//! with a primary and a secondary fetch path.

mod http;

pub mod chain;
pub mod devto;
pub mod leetcode;
pub mod medium;
pub mod sampler;
pub mod tiered;

pub use chain::ArticleChain;
pub use devto::DevToSource;
pub use leetcode::LeetCodeClient;
pub use medium::{medium, medium_with_endpoints};
pub use sampler::Sampler;
pub use tiered::{FeedTier, TieredSource};
