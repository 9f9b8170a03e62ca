//! Generative backends for leetdigest.
//!
//! [`GeminiWriter`] implements `leetdigest_core::NarrativeBackend` for one
//! model; [`FallbackBackend`] chains several into a model fallback list.
//! [`GeminiArticleSource`] offers model-suggested reading as an article source.

pub mod fallback;
pub mod gemini;
pub mod suggest;
pub mod writer;

pub use fallback::FallbackBackend;
pub use gemini::{GeminiClient, GenerationConfig};
pub use suggest::GeminiArticleSource;
pub use writer::GeminiWriter;
