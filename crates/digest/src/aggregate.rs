//! Supplementary problem aggregation.
//!
//! One upstream call per run, filtered against an exclusion set (normally the
//! featured slug) and against itself. Short results are not padded and
//! failures degrade to an empty list.

use leetdigest_core::model::Problem;
use leetdigest_core::source::ProblemSource;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Drop problems whose slug is excluded or already seen, keeping order.
pub fn dedupe_problems(problems: Vec<Problem>, exclude: &HashSet<String>) -> Vec<Problem> {
    let mut seen: HashSet<String> = exclude.clone();
    problems
        .into_iter()
        .filter(|p| seen.insert(p.slug.clone()))
        .collect()
}

/// Fetches supplementary problems from a single source.
pub struct ProblemAggregator {
    source: Arc<dyn ProblemSource>,
    timeout: Duration,
}

impl ProblemAggregator {
    pub fn new(source: Arc<dyn ProblemSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Request `count` problems and filter them. Never fails.
    pub async fn fetch(&self, count: usize, exclude: &HashSet<String>) -> Vec<Problem> {
        if count == 0 {
            return Vec::new();
        }

        let outcome = tokio::time::timeout(self.timeout, self.source.fetch_random(count)).await;
        let problems = match outcome {
            Ok(Ok(problems)) => problems,
            Ok(Err(e)) => {
                warn!(source = %self.source.name(), error = %e, "Supplementary problems unavailable");
                return Vec::new();
            }
            Err(_) => {
                warn!(
                    source = %self.source.name(),
                    timeout_secs = self.timeout.as_secs(),
                    "Supplementary problems timed out"
                );
                return Vec::new();
            }
        };

        let fetched = problems.len();
        let unique = dedupe_problems(problems, exclude);
        debug!(requested = count, fetched, kept = unique.len(), "Supplementary problems filtered");
        unique
    }
}
