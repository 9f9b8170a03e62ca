//! Digest assembler — a total mapping from a [`DigestRun`] to a size-bounded
//! [`Notification`].

use leetdigest_core::model::{
    Article, DigestRun, FieldWidth, Notification, NotificationField, Problem,
};
use leetdigest_core::text::{summarize, truncate};

pub const DIGEST_TITLE: &str = "Daily LeetCode & Algorithms Digest";
pub const FIELD_DAILY_CHALLENGE: &str = "Daily Challenge";
pub const FIELD_PRACTICE_QUEUE: &str = "Practice Queue";
pub const FIELD_READING_LIST: &str = "Algorithm Reading List";

const DEFAULT_ARTICLE_SOURCE: &str = "Curated";
const GENERIC_DESCRIPTION: &str = "Curated plan for algorithms practice today.";
const GENERIC_FOCUS: &str = "Focus on the core technique and how to optimise the solution.";

/// Size limits applied to every notification (Discord embed limits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestLimits {
    pub title: usize,
    pub description: usize,
    pub field_name: usize,
    pub field_value: usize,
    pub summary: usize,
    /// Whole payload: title, description, and every field name and value.
    pub total: usize,
    /// The description is never shrunk below this to meet `total`.
    pub min_description: usize,
}

impl Default for DigestLimits {
    fn default() -> Self {
        Self {
            title: 256,
            description: 4096,
            field_name: 256,
            field_value: 1024,
            summary: 420,
            total: 6000,
            min_description: 200,
        }
    }
}

/// Builds the notification for one run.
#[derive(Debug, Clone, Default)]
pub struct DigestAssembler {
    limits: DigestLimits,
}

impl DigestAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: DigestLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &DigestLimits {
        &self.limits
    }

    /// Map a run to a notification. Never fails.
    pub fn assemble(&self, run: &DigestRun) -> Notification {
        let mut fields = Vec::new();

        if let Some(featured) = &run.featured {
            fields.push(self.field(FIELD_DAILY_CHALLENGE, &self.problem_detail(featured)));
        }
        if !run.supplementary.is_empty() {
            fields.push(self.field(FIELD_PRACTICE_QUEUE, &practice_queue(&run.supplementary)));
        }
        if !run.articles.is_empty() {
            fields.push(self.field(FIELD_READING_LIST, &reading_list(&run.articles)));
        }

        let description = match run.narrative.as_deref().map(str::trim) {
            Some(narrative) if !narrative.is_empty() => narrative.to_string(),
            _ => fallback_description(run.featured.as_ref()),
        };

        let mut notification = Notification {
            title: truncate(DIGEST_TITLE, self.limits.title),
            description: truncate(&description, self.limits.description),
            fields,
        };
        self.fit_total(&mut notification);
        notification
    }

    fn field(&self, name: &str, value: &str) -> NotificationField {
        NotificationField {
            name: truncate(name, self.limits.field_name),
            value: truncate(value, self.limits.field_value),
            width: FieldWidth::Full,
        }
    }

    fn problem_detail(&self, p: &Problem) -> String {
        let mut out = format!(
            "**Link:** [{}]({})\n**Difficulty:** {}\n",
            p.title, p.link, p.difficulty
        );
        if !p.topics.is_empty() {
            out.push_str(&format!("**Topics:** {}\n", p.topics.join(", ")));
        }
        if let Some(description) = &p.description {
            let summary = summarize(description, self.limits.summary);
            if !summary.is_empty() {
                out.push_str(&format!("\n> _{summary}_"));
            }
        }
        out
    }

    /// Enforce the whole-payload limit: shrink the description first, then
    /// drop trailing fields. `min_description` yields only when no fields
    /// are left to drop.
    fn fit_total(&self, n: &mut Notification) {
        let total = n.total_chars();
        if total <= self.limits.total {
            return;
        }

        let excess = total - self.limits.total;
        let current = n.description.chars().count();
        let floor = self.limits.min_description.min(current);
        let target = current.saturating_sub(excess).max(floor);
        if target < current {
            n.description = truncate(&n.description, target);
        }

        while n.total_chars() > self.limits.total && n.fields.pop().is_some() {}

        if n.total_chars() > self.limits.total {
            n.title = truncate(&n.title, self.limits.total);
            let room = self.limits.total - n.title.chars().count();
            n.description = truncate(&n.description, room);
        }
    }
}

fn practice_queue(problems: &[Problem]) -> String {
    problems
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "**{}. [{}]({})**\n   Difficulty: *{}*",
                i + 1,
                p.title,
                p.link,
                p.difficulty
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn reading_list(articles: &[Article]) -> String {
    articles
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let source = match a.source.trim() {
                "" => DEFAULT_ARTICLE_SOURCE,
                s => s,
            };
            format!("**{}.** [{}]({})\n   _from {}_", i + 1, a.title, a.link, source)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Deterministic description used when there is no narrative.
pub fn fallback_description(featured: Option<&Problem>) -> String {
    let Some(p) = featured else {
        return GENERIC_DESCRIPTION.to_string();
    };
    let focus = if p.topics.is_empty() {
        GENERIC_FOCUS.to_string()
    } else {
        format!("Key topics: {}.", p.topics.join(", "))
    };
    format!("**Daily Focus:** {} ({})\n{focus}", p.title, p.difficulty)
}
