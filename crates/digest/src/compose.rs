//! Insight composer — optional narrative over the day's items.

use leetdigest_core::error::NarrativeError;
use leetdigest_core::narrative::{NarrativeBackend, NarrativeInput};
use leetdigest_core::text;
use std::sync::Arc;
use tracing::{debug, info};

/// Narrative output budget, in characters.
pub const NARRATIVE_BUDGET: usize = 1900;

/// Wraps an optional narrative backend and bounds its output.
///
/// An absent backend is a normal configuration: `compose` then reports
/// `NotConfigured` and callers fall back to a deterministic description.
pub struct InsightComposer {
    backend: Option<Arc<dyn NarrativeBackend>>,
    budget: usize,
}

impl InsightComposer {
    pub fn new(backend: Option<Arc<dyn NarrativeBackend>>) -> Self {
        Self {
            backend,
            budget: NARRATIVE_BUDGET,
        }
    }

    /// A composer with no backend.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Compose a narrative truncated to the output budget.
    pub async fn compose(&self, input: NarrativeInput<'_>) -> Result<String, NarrativeError> {
        let Some(backend) = &self.backend else {
            return Err(NarrativeError::NotConfigured(
                "No narrative backend configured".into(),
            ));
        };

        let raw = backend.compose(input).await?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NarrativeError::EmptyResponse {
                model: backend.name().to_string(),
                candidates: 0,
            });
        }

        let narrative = text::truncate(trimmed, self.budget);
        if narrative.len() < trimmed.len() {
            debug!(
                original_chars = trimmed.chars().count(),
                budget = self.budget,
                "Narrative truncated to budget"
            );
        }
        info!(backend = %backend.name(), chars = narrative.chars().count(), "Narrative composed");
        Ok(narrative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedBackend(Result<String, NarrativeError>);

    #[async_trait]
    impl NarrativeBackend for FixedBackend {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn compose(&self, _input: NarrativeInput<'_>) -> Result<String, NarrativeError> {
            self.0.clone()
        }
    }

    fn input() -> NarrativeInput<'static> {
        NarrativeInput {
            featured: None,
            supplementary: &[],
            articles: &[],
        }
    }

    fn composer(result: Result<String, NarrativeError>) -> InsightComposer {
        InsightComposer::new(Some(Arc::new(FixedBackend(result))))
    }

    #[tokio::test]
    async fn absent_backend_is_not_configured() {
        let composer = InsightComposer::disabled();
        assert!(!composer.is_enabled());
        assert!(matches!(
            composer.compose(input()).await.unwrap_err(),
            NarrativeError::NotConfigured(_)
        ));
    }

    #[tokio::test]
    async fn long_output_is_cut_at_a_word_boundary() {
        let long = "graph ".repeat(500);
        let out = composer(Ok(long)).compose(input()).await.unwrap();

        assert!(out.chars().count() <= NARRATIVE_BUDGET);
        assert!(out.ends_with("graph..."));
    }

    #[tokio::test]
    async fn short_output_is_kept() {
        let out = composer(Ok("  ## Plan\nSolve it.  ".into()))
            .compose(input())
            .await
            .unwrap();
        assert_eq!(out, "## Plan\nSolve it.");
    }

    #[tokio::test]
    async fn blank_output_is_empty_response() {
        let err = composer(Ok("   \n".into())).compose(input()).await.unwrap_err();
        assert_eq!(err.reason(), "empty_response");
    }

    #[tokio::test]
    async fn backend_errors_pass_through() {
        let err = composer(Err(NarrativeError::TruncatedBeforeContent("m".into())))
            .compose(input())
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "truncated_before_content");
    }

    #[tokio::test]
    async fn custom_budget_applies() {
        let out = composer(Ok("alpha beta gamma delta".into()))
            .with_budget(14)
            .compose(input())
            .await
            .unwrap();
        assert_eq!(out, "alpha beta...");
    }
}
