//! The digest run: fetch, compose, assemble, deliver.
//!
//! Steps run sequentially: featured problem, supplementary problems,
//! articles, narrative, then delivery. Only the featured fetch and delivery
//! can fail a run; every other step degrades. Cancellation is honoured at
//! each await point up to delivery; once delivery starts it runs to
//! completion.

use leetdigest_core::error::{Error, Result, SourceError};
use leetdigest_core::model::DigestRun;
use leetdigest_core::narrative::NarrativeInput;
use leetdigest_core::notifier::Notifier;
use leetdigest_core::source::{ArticleSource, ProblemSource};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::aggregate::ProblemAggregator;
use crate::assemble::DigestAssembler;
use crate::compose::InsightComposer;

/// Counts and deadlines for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub random_count: usize,
    pub article_count: usize,
    /// Deadline for each network-bound call.
    pub call_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            random_count: 2,
            article_count: 2,
            call_timeout: Duration::from_secs(30),
        }
    }
}

/// What happened to the narrative step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrativeOutcome {
    Composed,
    /// No backend configured.
    Skipped,
    /// The backend failed; the description was synthesized instead.
    Fallback(&'static str),
}

/// Summary of a delivered run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub featured_slug: String,
    pub supplementary: usize,
    pub articles: usize,
    pub narrative: NarrativeOutcome,
    pub elapsed: Duration,
}

/// One digest pipeline, reusable across runs.
pub struct DigestPipeline {
    problems: Arc<dyn ProblemSource>,
    articles: Option<Arc<dyn ArticleSource>>,
    composer: InsightComposer,
    assembler: DigestAssembler,
    notifier: Arc<dyn Notifier>,
    settings: PipelineSettings,
}

impl DigestPipeline {
    pub fn new(
        problems: Arc<dyn ProblemSource>,
        notifier: Arc<dyn Notifier>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            problems,
            articles: None,
            composer: InsightComposer::disabled(),
            assembler: DigestAssembler::new(),
            notifier,
            settings,
        }
    }

    pub fn with_articles(mut self, articles: Arc<dyn ArticleSource>) -> Self {
        self.articles = Some(articles);
        self
    }

    pub fn with_composer(mut self, composer: InsightComposer) -> Self {
        self.composer = composer;
        self
    }

    pub fn with_assembler(mut self, assembler: DigestAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Execute one run.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!("digest_run", %run_id);
        self.run_inner(run_id, cancel).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid, cancel: &CancellationToken) -> Result<RunReport> {
        let start = Instant::now();
        info!(
            random_count = self.settings.random_count,
            article_count = self.settings.article_count,
            "Starting daily digest"
        );

        // ── Featured problem (mandatory) ──
        let timeout = self.settings.call_timeout;
        let featured = match guarded(cancel, tokio::time::timeout(timeout, self.problems.fetch_featured())).await? {
            Ok(Ok(problem)) => problem,
            Ok(Err(e)) => {
                error!(error = %e, "Failed to fetch featured problem");
                return Err(Error::FeaturedUnavailable(e));
            }
            Err(_) => {
                error!(timeout_secs = timeout.as_secs(), "Featured problem fetch timed out");
                return Err(Error::FeaturedUnavailable(SourceError::Timeout(format!(
                    "Featured problem fetch exceeded {}s",
                    timeout.as_secs()
                ))));
            }
        };

        // ── Supplementary problems ──
        let exclude: HashSet<String> = HashSet::from([featured.slug.clone()]);
        let aggregator = ProblemAggregator::new(self.problems.clone(), timeout);
        let supplementary =
            guarded(cancel, aggregator.fetch(self.settings.random_count, &exclude)).await?;

        // ── Articles ──
        let articles = match &self.articles {
            Some(source) if self.settings.article_count > 0 => {
                match guarded(cancel, source.fetch_articles(self.settings.article_count)).await? {
                    Ok(items) => items,
                    Err(e) => {
                        warn!(source = %source.name(), error = %e, "Articles unavailable");
                        Vec::new()
                    }
                }
            }
            _ => Vec::new(),
        };

        // ── Narrative ──
        let (narrative, outcome) = if self.composer.is_enabled() {
            let input = NarrativeInput {
                featured: Some(&featured),
                supplementary: &supplementary,
                articles: &articles,
            };
            match guarded(cancel, self.composer.compose(input)).await? {
                Ok(text) => (Some(text), NarrativeOutcome::Composed),
                Err(e) => {
                    warn!(error = %e, reason = e.reason(), "Narrative failed, using fallback description");
                    (None, NarrativeOutcome::Fallback(e.reason()))
                }
            }
        } else {
            (None, NarrativeOutcome::Skipped)
        };

        let run = DigestRun {
            featured: Some(featured),
            supplementary,
            articles,
            narrative,
        };
        let notification = self.assembler.assemble(&run);

        // Last chance to stop before anything leaves the process.
        if cancel.is_cancelled() {
            warn!("Run cancelled before delivery");
            return Err(Error::Cancelled);
        }

        if let Err(e) = self.notifier.send(&notification).await {
            error!(notifier = %self.notifier.name(), error = %e, "Failed to send notification");
            return Err(Error::Delivery(e));
        }

        let report = RunReport {
            run_id,
            featured_slug: run.featured.map(|p| p.slug).unwrap_or_default(),
            supplementary: run.supplementary.len(),
            articles: run.articles.len(),
            narrative: outcome,
            elapsed: start.elapsed(),
        };
        info!(
            featured = %report.featured_slug,
            supplementary = report.supplementary,
            articles = report.articles,
            narrative = ?report.narrative,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Daily digest completed"
        );
        Ok(report)
    }
}

/// Race `fut` against cancellation.
async fn guarded<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!("Run cancelled");
            Err(Error::Cancelled)
        }
        out = fut => Ok(out),
    }
}
