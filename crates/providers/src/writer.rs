//! Gemini-backed study narrative for one model.

use async_trait::async_trait;
use leetdigest_core::error::NarrativeError;
use leetdigest_core::narrative::{NarrativeBackend, NarrativeInput};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::debug;

use crate::gemini::{GenerationConfig, GeminiClient};

/// Writes the digest narrative with a single Gemini model.
///
/// Wrap several of these in a [`crate::FallbackBackend`] to get a model
/// fallback list.
pub struct GeminiWriter {
    name: String,
    model: String,
    client: Arc<GeminiClient>,
    topic_limit: usize,
}

impl GeminiWriter {
    pub fn new(client: Arc<GeminiClient>, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            name: format!("gemini:{model}"),
            model,
            client,
            topic_limit: 3,
        }
    }

    /// Cap on featured-problem topics listed in the prompt.
    pub fn with_topic_limit(mut self, limit: usize) -> Self {
        self.topic_limit = limit.max(1);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_prompt(&self, input: NarrativeInput<'_>) -> String {
        let mut prompt = String::from(
            "Write concise algorithm study notes with exactly this structure:\n\n\
             ## 🎯 **Problem Analysis**\n\
             Main approach and why it works (2 sentences)\n\n\
             ## 📚 **Related Concept**\n\
             One classic algorithms concept and how it connects to the problem (2 sentences)\n\n\
             ## 💡 **Study Plan**\n\
             2-3 practice steps\n\n\
             Rules: Markdown links, max 600 words total.\n\n",
        );

        if let Some(p) = input.featured {
            let _ = writeln!(prompt, "Daily LeetCode Challenge:");
            let _ = writeln!(prompt, "- {} ({}) – {}", p.title, p.difficulty, p.link);
            if !p.topics.is_empty() {
                let topics: Vec<&str> = p
                    .topics
                    .iter()
                    .take(self.topic_limit)
                    .map(String::as_str)
                    .collect();
                let _ = writeln!(prompt, "  Topics: {}", topics.join(", "));
            }
        }

        if !input.supplementary.is_empty() {
            let _ = writeln!(prompt, "\nAdditional Practice Problems:");
            for p in input.supplementary {
                let _ = writeln!(prompt, "- {} ({}) – {}", p.title, p.difficulty, p.link);
            }
        }

        if !input.articles.is_empty() {
            let _ = writeln!(prompt, "\nBackground Reading:");
            for a in input.articles {
                let _ = writeln!(prompt, "- {} – {}", a.title, a.link);
            }
        }

        prompt.push_str("\nWrite the 3 sections above. Be concise.\n");
        prompt
    }
}

#[async_trait]
impl NarrativeBackend for GeminiWriter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn compose(&self, input: NarrativeInput<'_>) -> Result<String, NarrativeError> {
        let prompt = self.build_prompt(input);
        debug!(model = %self.model, "Composing narrative");
        self.client
            .generate(&self.model, &prompt, GenerationConfig::NARRATIVE, true)
            .await
    }
}
