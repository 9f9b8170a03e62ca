//! Backend fallback — ordered model list with per-backend timeouts.
//!
//! When a backend reports an availability failure (model not found, rate
//! limited), the next backend in the list is tried. Any other failure stops
//! the list and is returned as-is.

use async_trait::async_trait;
use leetdigest_core::error::NarrativeError;
use leetdigest_core::narrative::{NarrativeBackend, NarrativeInput};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// A backend that wraps an ordered list of backends and falls back on
/// retryable failures.
pub struct FallbackBackend {
    name: String,
    chain: Vec<FallbackEntry>,
}

/// A single entry in the fallback list.
struct FallbackEntry {
    backend: Arc<dyn NarrativeBackend>,
    timeout: Duration,
}

impl FallbackBackend {
    /// Create a new fallback backend with no entries.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chain: Vec::new(),
        }
    }

    /// Add a backend to the list with a custom timeout.
    pub fn add(mut self, backend: Arc<dyn NarrativeBackend>, timeout: Duration) -> Self {
        self.chain.push(FallbackEntry { backend, timeout });
        self
    }

    /// Add a backend with the default timeout (120s).
    pub fn add_default(self, backend: Arc<dyn NarrativeBackend>) -> Self {
        self.add(backend, Duration::from_secs(120))
    }

    /// Number of backends in the list.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

#[async_trait]
impl NarrativeBackend for FallbackBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn compose(&self, input: NarrativeInput<'_>) -> Result<String, NarrativeError> {
        let mut last_error =
            NarrativeError::NotConfigured("No backends in fallback chain".into());

        for (i, entry) in self.chain.iter().enumerate() {
            let backend_name = entry.backend.name().to_string();

            info!(
                backend = %backend_name,
                attempt = i + 1,
                total = self.chain.len(),
                "Fallback: trying backend"
            );

            match tokio::time::timeout(entry.timeout, entry.backend.compose(input)).await {
                Ok(Ok(text)) => {
                    if i > 0 {
                        info!(backend = %backend_name, "Fallback: later backend succeeded");
                    }
                    return Ok(text);
                }
                Ok(Err(e)) if e.is_retryable() => {
                    warn!(
                        backend = %backend_name,
                        error = %e,
                        "Fallback: backend unavailable, trying next"
                    );
                    last_error = e;
                }
                Ok(Err(e)) => {
                    warn!(
                        backend = %backend_name,
                        error = %e,
                        reason = e.reason(),
                        "Fallback: backend failed, not retrying"
                    );
                    return Err(e);
                }
                Err(_) => {
                    warn!(
                        backend = %backend_name,
                        timeout_secs = entry.timeout.as_secs(),
                        "Fallback: backend timed out"
                    );
                    return Err(NarrativeError::Timeout(format!(
                        "Backend '{}' timed out after {}s",
                        backend_name,
                        entry.timeout.as_secs()
                    )));
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// A mock backend that always fails.
    struct FailingBackend {
        name: String,
        error: NarrativeError,
        call_count: Mutex<usize>,
    }

    impl FailingBackend {
        fn new(name: &str, error: NarrativeError) -> Self {
            Self {
                name: name.into(),
                error,
                call_count: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl NarrativeBackend for FailingBackend {
        fn name(&self) -> &str {
            &self.name
        }

        async fn compose(&self, _input: NarrativeInput<'_>) -> Result<String, NarrativeError> {
            *self.call_count.lock().unwrap() += 1;
            Err(self.error.clone())
        }
    }

    /// A mock backend that always succeeds.
    struct SuccessBackend {
        name: String,
        call_count: Mutex<usize>,
    }

    impl SuccessBackend {
        fn new(name: &str) -> Self {
            Self {
                name: name.into(),
                call_count: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl NarrativeBackend for SuccessBackend {
        fn name(&self) -> &str {
            &self.name
        }

        async fn compose(&self, _input: NarrativeInput<'_>) -> Result<String, NarrativeError> {
            *self.call_count.lock().unwrap() += 1;
            Ok(format!("from {}", self.name))
        }
    }

    /// A mock backend that hangs forever (for timeout testing).
    struct HangingBackend;

    #[async_trait]
    impl NarrativeBackend for HangingBackend {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn compose(&self, _input: NarrativeInput<'_>) -> Result<String, NarrativeError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }
    }

    fn input() -> NarrativeInput<'static> {
        NarrativeInput {
            featured: None,
            supplementary: &[],
            articles: &[],
        }
    }

    #[tokio::test]
    async fn first_backend_succeeds() {
        let b1 = Arc::new(SuccessBackend::new("primary"));
        let b2 = Arc::new(SuccessBackend::new("secondary"));

        let fallback = FallbackBackend::new("test")
            .add_default(b1.clone())
            .add_default(b2.clone());

        assert_eq!(fallback.compose(input()).await.unwrap(), "from primary");
        assert_eq!(b1.calls(), 1);
        assert_eq!(b2.calls(), 0);
    }

    #[tokio::test]
    async fn falls_back_on_model_not_found() {
        let b1 = Arc::new(FailingBackend::new(
            "primary",
            NarrativeError::ModelNotFound("gemini-old".into()),
        ));
        let b2 = Arc::new(SuccessBackend::new("secondary"));

        let fallback = FallbackBackend::new("test")
            .add_default(b1.clone())
            .add_default(b2.clone());

        assert_eq!(fallback.compose(input()).await.unwrap(), "from secondary");
        assert_eq!(b1.calls(), 1);
        assert_eq!(b2.calls(), 1);
    }

    #[tokio::test]
    async fn falls_back_on_rate_limit() {
        let b1 = Arc::new(FailingBackend::new(
            "primary",
            NarrativeError::RateLimited("gemini-a".into()),
        ));
        let b2 = Arc::new(SuccessBackend::new("secondary"));

        let fallback = FallbackBackend::new("test")
            .add_default(b1.clone())
            .add_default(b2.clone());

        assert!(fallback.compose(input()).await.is_ok());
        assert_eq!(b2.calls(), 1);
    }

    #[tokio::test]
    async fn terminal_error_stops_the_list() {
        let b1 = Arc::new(FailingBackend::new(
            "primary",
            NarrativeError::ApiError {
                status_code: 500,
                message: "Internal Server Error".into(),
            },
        ));
        let b2 = Arc::new(SuccessBackend::new("secondary"));

        let fallback = FallbackBackend::new("test")
            .add_default(b1.clone())
            .add_default(b2.clone());

        match fallback.compose(input()).await.unwrap_err() {
            NarrativeError::ApiError { status_code: 500, .. } => {}
            other => panic!("Expected ApiError, got: {other:?}"),
        }
        assert_eq!(b1.calls(), 1);
        assert_eq!(b2.calls(), 0);
    }

    #[tokio::test]
    async fn empty_result_stops_the_list() {
        let b1 = Arc::new(FailingBackend::new(
            "primary",
            NarrativeError::TruncatedBeforeContent("gemini-a".into()),
        ));
        let b2 = Arc::new(SuccessBackend::new("secondary"));

        let fallback = FallbackBackend::new("test")
            .add_default(b1)
            .add_default(b2.clone());

        let err = fallback.compose(input()).await.unwrap_err();
        assert_eq!(err.reason(), "truncated_before_content");
        assert_eq!(b2.calls(), 0);
    }

    #[tokio::test]
    async fn all_unavailable_returns_last_error() {
        let b1 = Arc::new(FailingBackend::new(
            "primary",
            NarrativeError::ModelNotFound("a".into()),
        ));
        let b2 = Arc::new(FailingBackend::new(
            "secondary",
            NarrativeError::RateLimited("b".into()),
        ));

        let fallback = FallbackBackend::new("test")
            .add_default(b1.clone())
            .add_default(b2.clone());

        match fallback.compose(input()).await.unwrap_err() {
            NarrativeError::RateLimited(model) => assert_eq!(model, "b"),
            other => panic!("Expected RateLimited, got: {other:?}"),
        }
        assert_eq!(b1.calls(), 1);
        assert_eq!(b2.calls(), 1);
    }

    #[tokio::test]
    async fn timeout_is_terminal() {
        let b2 = Arc::new(SuccessBackend::new("secondary"));

        let fallback = FallbackBackend::new("test")
            .add(Arc::new(HangingBackend), Duration::from_millis(50))
            .add_default(b2.clone());

        assert!(matches!(
            fallback.compose(input()).await.unwrap_err(),
            NarrativeError::Timeout(_)
        ));
        assert_eq!(b2.calls(), 0);
    }

    #[tokio::test]
    async fn empty_chain_returns_not_configured() {
        let fallback = FallbackBackend::new("empty");
        assert!(fallback.is_empty());
        match fallback.compose(input()).await.unwrap_err() {
            NarrativeError::NotConfigured(_) => {}
            other => panic!("Expected NotConfigured, got: {other:?}"),
        }
    }
}
