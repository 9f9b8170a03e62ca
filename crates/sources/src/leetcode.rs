//! LeetCode problem source: the daily challenge and the public problem set.

use async_trait::async_trait;
use leetdigest_core::error::SourceError;
use leetdigest_core::model::{Difficulty, Problem};
use leetdigest_core::source::ProblemSource;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::http::{build_client, ensure_success, network_error};
use crate::sampler::Sampler;

pub const LEETCODE_BASE_URL: &str = "https://leetcode.com";
pub const GRAPHQL_URL: &str = "https://leetcode.com/graphql";
pub const PROBLEMSET_URL: &str = "https://leetcode.com/api/problems/all/";

const DAILY_QUERY: &str = "query questionOfToday { activeDailyCodingChallengeQuestion { link question { questionFrontendId title titleSlug difficulty content topicTags { name } } } }";

/// Wrap width for problem statements converted from HTML.
const TEXT_WIDTH: usize = 100;

/// Client for LeetCode's public endpoints.
pub struct LeetCodeClient {
    client: reqwest::Client,
    graphql_url: String,
    problemset_url: String,
    sampler: Arc<Sampler>,
}

impl LeetCodeClient {
    pub fn new(timeout: Duration, sampler: Arc<Sampler>) -> Self {
        Self::with_endpoints(GRAPHQL_URL, PROBLEMSET_URL, timeout, sampler)
    }

    pub fn with_endpoints(
        graphql_url: impl Into<String>,
        problemset_url: impl Into<String>,
        timeout: Duration,
        sampler: Arc<Sampler>,
    ) -> Self {
        Self {
            client: build_client(timeout),
            graphql_url: graphql_url.into(),
            problemset_url: problemset_url.into(),
            sampler,
        }
    }
}

// ── Wire types ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct DailyResponse {
    data: Option<DailyData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyData {
    active_daily_coding_challenge_question: Option<DailyChallenge>,
}

#[derive(Debug, Deserialize)]
struct DailyChallenge {
    #[serde(default)]
    link: String,
    question: DailyQuestion,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyQuestion {
    #[serde(default)]
    question_frontend_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    title_slug: String,
    #[serde(default)]
    difficulty: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    topic_tags: Vec<TopicTag>,
}

#[derive(Debug, Deserialize)]
struct TopicTag {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ProblemSet {
    #[serde(default)]
    stat_status_pairs: Vec<StatStatusPair>,
}

#[derive(Debug, Deserialize)]
struct StatStatusPair {
    stat: Stat,
    #[serde(default)]
    difficulty: Level,
    #[serde(default)]
    paid_only: bool,
}

#[derive(Debug, Deserialize)]
struct Stat {
    #[serde(default)]
    question_id: u32,
    #[serde(rename = "question__title", default)]
    title: String,
    #[serde(rename = "question__title_slug", default)]
    title_slug: String,
}

#[derive(Debug, Default, Deserialize)]
struct Level {
    #[serde(default)]
    level: u8,
}

// ── Mapping helpers ────────────────────────────────────────────────────────

/// Absolute problem link: the site-relative link when given, else the slug URL.
fn resolve_link(slug: &str, relative: &str) -> String {
    if relative.is_empty() {
        format!("{LEETCODE_BASE_URL}/problems/{slug}/")
    } else {
        format!("{LEETCODE_BASE_URL}{relative}")
    }
}

fn html_to_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    html2text::from_read(html.as_bytes(), TEXT_WIDTH)
        .unwrap_or_else(|_| html.to_string())
        .trim()
        .to_string()
}

impl From<DailyChallenge> for Problem {
    fn from(daily: DailyChallenge) -> Self {
        let q = daily.question;
        let description = q
            .content
            .as_deref()
            .map(html_to_text)
            .filter(|text| !text.is_empty());
        Problem {
            id: q.question_frontend_id.trim().parse().unwrap_or(0),
            link: resolve_link(&q.title_slug, &daily.link),
            title: q.title,
            slug: q.title_slug,
            difficulty: Difficulty::from_label(&q.difficulty),
            description,
            topics: q.topic_tags.into_iter().map(|t| t.name).collect(),
        }
    }
}

#[async_trait]
impl ProblemSource for LeetCodeClient {
    fn name(&self) -> &str {
        "leetcode"
    }

    async fn fetch_featured(&self) -> Result<Problem, SourceError> {
        let response = self
            .client
            .post(&self.graphql_url)
            .header("Referer", LEETCODE_BASE_URL)
            .json(&json!({ "query": DAILY_QUERY }))
            .send()
            .await
            .map_err(network_error)?;
        let body: DailyResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        let daily = body
            .data
            .and_then(|d| d.active_daily_coding_challenge_question)
            .filter(|d| !d.question.title_slug.is_empty())
            .ok_or_else(|| SourceError::Empty("empty daily challenge data".into()))?;

        let problem = Problem::from(daily);
        info!(slug = %problem.slug, difficulty = %problem.difficulty, "Daily challenge fetched");
        Ok(problem)
    }

    async fn fetch_random(&self, count: usize) -> Result<Vec<Problem>, SourceError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .get(&self.problemset_url)
            .header("Referer", LEETCODE_BASE_URL)
            .send()
            .await
            .map_err(network_error)?;
        let set: ProblemSet = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        let candidates: Vec<Problem> = set
            .stat_status_pairs
            .into_iter()
            .filter(|p| !p.paid_only && !p.stat.title_slug.is_empty())
            .map(|p| Problem {
                id: p.stat.question_id,
                link: resolve_link(&p.stat.title_slug, ""),
                title: p.stat.title,
                slug: p.stat.title_slug,
                difficulty: Difficulty::from_level(p.difficulty.level),
                description: None,
                topics: Vec::new(),
            })
            .collect();

        if candidates.is_empty() {
            return Err(SourceError::Empty("no problems available".into()));
        }
        debug!(available = candidates.len(), requested = count, "Problem set fetched");

        Ok(self.sampler.sample(candidates, count))
    }
}
