//! The leetdigest pipeline.
//!
//! - [`aggregate`] — supplementary problems, filtered against the featured slug
//! - [`compose`] — optional narrative with an output budget
//! - [`assemble`] — total, size-bounded mapping to a notification
//! - [`pipeline`] — sequential orchestration with cancellation

pub mod aggregate;
pub mod assemble;
pub mod compose;
pub mod pipeline;

pub use aggregate::{ProblemAggregator, dedupe_problems};
pub use assemble::{DigestAssembler, DigestLimits};
pub use compose::{InsightComposer, NARRATIVE_BUDGET};
pub use pipeline::{DigestPipeline, NarrativeOutcome, PipelineSettings, RunReport};
