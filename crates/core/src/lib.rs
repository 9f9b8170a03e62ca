//! # leetdigest core
//!
//! Domain types, traits, and error definitions for the daily practice digest.
//! This crate has **no I/O dependencies** — it defines the domain model that
//! every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here. Implementations live
//! in their respective crates. This enables:
//! - Swapping sources and channels via configuration
//! - Testing the pipeline with stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod model;
pub mod narrative;
pub mod notifier;
pub mod source;
pub mod text;

// Re-export key types at crate root for ergonomics
pub use error::{Error, NarrativeError, NarrativeFailureKind, NotifyError, Result, SourceError};
pub use model::{Article, Difficulty, DigestRun, FieldWidth, Notification, NotificationField, Problem};
pub use narrative::{NarrativeBackend, NarrativeInput};
pub use notifier::Notifier;
pub use source::{ArticleSource, ProblemSource};
