//! Error types for the leetdigest domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context (sources, narrative, delivery) has its own error enum;
//! the top-level [`Error`] only carries the failures that end a run.

use thiserror::Error;

/// The top-level error type for a digest run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Featured problem unavailable: {0}")]
    FeaturedUnavailable(SourceError),

    #[error("Delivery failed: {0}")]
    Delivery(#[from] NotifyError),

    #[error("Run cancelled")]
    Cancelled,
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failure of a problem or article source.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("No usable items: {0}")]
    Empty(String),

    #[error("Source not configured: {0}")]
    NotConfigured(String),

    #[error("All {attempted} sources failed; first error: {first}")]
    ChainExhausted {
        attempted: usize,
        first: Box<SourceError>,
    },
}

/// How a narrative failure should be treated by a model fallback list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeFailureKind {
    /// The model is unavailable right now; the next candidate may work.
    Retryable,
    /// A systemic failure; trying other models will not help.
    Terminal,
    /// The backend answered but produced nothing usable.
    EmptyResult,
}

/// Failure of the narrative (insight) backend.
#[derive(Debug, Clone, Error)]
pub enum NarrativeError {
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Rate limited on model {0}")]
    RateLimited(String),

    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Model {0} hit its output token limit before producing content")]
    TruncatedBeforeContent(String),

    #[error("Model {model} returned empty text ({candidates} candidates)")]
    EmptyResponse { model: String, candidates: usize },

    #[error("Prompt blocked: {0}")]
    Blocked(String),

    #[error("Narrative backend not configured: {0}")]
    NotConfigured(String),
}

impl NarrativeError {
    /// Classify this failure for fallback decisions.
    pub fn kind(&self) -> NarrativeFailureKind {
        match self {
            Self::ModelNotFound(_) | Self::RateLimited(_) => NarrativeFailureKind::Retryable,
            Self::TruncatedBeforeContent(_) | Self::EmptyResponse { .. } => {
                NarrativeFailureKind::EmptyResult
            }
            _ => NarrativeFailureKind::Terminal,
        }
    }

    /// Whether the next model in a fallback list should be tried.
    pub fn is_retryable(&self) -> bool {
        self.kind() == NarrativeFailureKind::Retryable
    }

    /// Short machine-friendly reason, used in logs and run reports.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::TruncatedBeforeContent(_) => "truncated_before_content",
            Self::EmptyResponse { .. } => "empty_response",
            Self::ModelNotFound(_) | Self::RateLimited(_) => "backend_unavailable",
            Self::NotConfigured(_) => "not_configured",
            Self::Timeout(_) => "timeout",
            Self::Blocked(_) => "blocked",
            Self::ApiError { .. } | Self::Network(_) | Self::Decode(_) => "backend_error",
        }
    }
}

/// Failure to deliver a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notifier not configured: {0}")]
    NotConfigured(String),

    #[error("Endpoint rejected notification (status {status_code}): {body}")]
    Rejected { status_code: u16, body: String },

    #[error("Delivery failed to {channel}: {reason}")]
    DeliveryFailed { channel: String, reason: String },
}
