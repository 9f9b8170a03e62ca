//! Domain model — problems, articles, and the notification artifact.
//!
//! Every value here is transient: it is created during one digest run and
//! dropped when the run ends.

use serde::{Deserialize, Serialize};

/// Problem difficulty as reported by the problem source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    Unknown,
}

impl Difficulty {
    /// Map a numeric level (1 = easy, 2 = medium, 3 = hard).
    pub fn from_level(level: u8) -> Self {
        match level {
            1 => Self::Easy,
            2 => Self::Medium,
            3 => Self::Hard,
            _ => Self::Unknown,
        }
    }

    /// Parse a label such as `"Easy"` or `"hard"`. Unrecognised labels are `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" => Self::Easy,
            "medium" => Self::Medium,
            "hard" => Self::Hard,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A practice problem. The slug is its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: u32,
    pub title: String,
    pub slug: String,
    pub difficulty: Difficulty,
    pub link: String,

    /// Plain-text problem statement, when the source provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Topic tags in source order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
}

/// A piece of reading material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub source: String,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            source: source.into(),
        }
    }

    /// Deduplication key: lower-cased link, else lower-cased title.
    ///
    /// Returns `None` when both are blank; such articles are unusable.
    pub fn canonical_key(&self) -> Option<String> {
        let link = self.link.trim();
        if !link.is_empty() {
            return Some(link.to_lowercase());
        }
        let title = self.title.trim();
        if !title.is_empty() {
            return Some(title.to_lowercase());
        }
        None
    }
}

/// Display width hint for a notification field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldWidth {
    #[default]
    Full,
    Paired,
}

/// A named section of the final payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub width: FieldWidth,
}

/// The single artifact handed to a notifier.
///
/// Produced by the digest assembler, which guarantees every string respects
/// the delivery size limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub fields: Vec<NotificationField>,
}

impl Notification {
    /// Total characters across title, description, and every field name/value.
    pub fn total_chars(&self) -> usize {
        self.title.chars().count()
            + self.description.chars().count()
            + self
                .fields
                .iter()
                .map(|f| f.name.chars().count() + f.value.chars().count())
                .sum::<usize>()
    }
}

/// The working set of one digest run.
#[derive(Debug, Clone, Default)]
pub struct DigestRun {
    pub featured: Option<Problem>,
    pub supplementary: Vec<Problem>,
    pub articles: Vec<Article>,
    pub narrative: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_from_level() {
        assert_eq!(Difficulty::from_level(1), Difficulty::Easy);
        assert_eq!(Difficulty::from_level(2), Difficulty::Medium);
        assert_eq!(Difficulty::from_level(3), Difficulty::Hard);
        assert_eq!(Difficulty::from_level(9), Difficulty::Unknown);
    }

    #[test]
    fn difficulty_from_label_is_case_insensitive() {
        assert_eq!(Difficulty::from_label("EASY"), Difficulty::Easy);
        assert_eq!(Difficulty::from_label(" medium "), Difficulty::Medium);
        assert_eq!(Difficulty::from_label("impossible"), Difficulty::Unknown);
        assert_eq!(Difficulty::Hard.to_string(), "Hard");
    }

    #[test]
    fn article_key_prefers_link() {
        let a = Article::new("Graphs 101", "  https://Example.com/Graphs ", "Blog");
        assert_eq!(a.canonical_key().as_deref(), Some("https://example.com/graphs"));
    }

    #[test]
    fn article_key_falls_back_to_title() {
        let a = Article::new("Dynamic Programming", "", "Blog");
        assert_eq!(a.canonical_key().as_deref(), Some("dynamic programming"));

        let blank = Article::new("  ", " ", "Blog");
        assert_eq!(blank.canonical_key(), None);
    }

    #[test]
    fn notification_total_counts_chars() {
        let n = Notification {
            title: "ab".into(),
            description: "cdé".into(),
            fields: vec![NotificationField {
                name: "x".into(),
                value: "yz".into(),
                width: FieldWidth::Full,
            }],
        };
        assert_eq!(n.total_chars(), 8);
    }

    #[test]
    fn problem_serialization_skips_empty_optionals() {
        let p = Problem {
            id: 1,
            title: "Two Sum".into(),
            slug: "two-sum".into(),
            difficulty: Difficulty::Easy,
            link: "https://leetcode.com/problems/two-sum/".into(),
            description: None,
            topics: vec![],
        };
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("two-sum"));
        assert!(!json.contains("description"));
        assert!(!json.contains("topics"));
    }
}
