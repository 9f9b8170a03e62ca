//! Narrative backend trait — the abstraction over generative text models.
//!
//! A backend turns the day's items into a short narrative. Failures are
//! classified through [`NarrativeError::kind`](crate::error::NarrativeError::kind)
//! so a fallback list can tell availability problems from systemic ones.

use async_trait::async_trait;

use crate::error::NarrativeError;
use crate::model::{Article, Problem};

/// The items a narrative is written about.
#[derive(Debug, Clone, Copy)]
pub struct NarrativeInput<'a> {
    pub featured: Option<&'a Problem>,
    pub supplementary: &'a [Problem],
    pub articles: &'a [Article],
}

/// The core narrative backend trait.
///
/// Every generative backend (one per model) implements this trait. The
/// composer calls `compose()` without knowing which model answers.
#[async_trait]
pub trait NarrativeBackend: Send + Sync {
    /// A human-readable name, usually the model id.
    fn name(&self) -> &str;

    /// Produce narrative text for the given items.
    async fn compose(
        &self,
        input: NarrativeInput<'_>,
    ) -> std::result::Result<String, NarrativeError>;
}
