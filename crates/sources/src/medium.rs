//! Medium "algorithms" tag feed, read directly as RSS or through a text proxy.

use async_trait::async_trait;
use leetdigest_core::error::SourceError;
use leetdigest_core::model::Article;
use regex_lite::Regex;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use crate::http::{build_client, ensure_success, network_error, read_capped};
use crate::sampler::Sampler;
use crate::tiered::{FeedTier, TieredSource};

pub const MEDIUM_FEED_URL: &str = "https://medium.com/feed/tag/algorithms";
pub const MEDIUM_PROXY_URL: &str = "https://r.jina.ai/https://medium.com/feed/tag/algorithms";

const SOURCE_LABEL: &str = "Medium";
const CHANNEL_TITLE: &str = "Algorithms on Medium";
const PROXY_BLOCK_SEPARATOR: &str = "===============";
const PROXY_BODY_LIMIT: usize = 256 * 1024;

static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<item>(.*?)</item>").expect("valid item regex"));
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<title>(.*?)</title>").expect("valid title regex"));
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<link>(.*?)</link>").expect("valid link regex"));

/// Build the two-tier Medium source against the public endpoints.
pub fn medium(timeout: Duration, sampler: Arc<Sampler>) -> TieredSource {
    medium_with_endpoints(MEDIUM_FEED_URL, MEDIUM_PROXY_URL, timeout, sampler)
}

/// Build the two-tier Medium source against custom endpoints.
pub fn medium_with_endpoints(
    feed_url: impl Into<String>,
    proxy_url: impl Into<String>,
    timeout: Duration,
    sampler: Arc<Sampler>,
) -> TieredSource {
    let client = build_client(timeout);
    TieredSource::new(
        "medium",
        Box::new(MediumRss {
            client: client.clone(),
            url: feed_url.into(),
        }),
        Box::new(MediumProxy {
            client,
            url: proxy_url.into(),
        }),
        sampler,
    )
}

/// Tier 1: the RSS feed itself.
pub struct MediumRss {
    client: reqwest::Client,
    url: String,
}

#[async_trait]
impl FeedTier for MediumRss {
    fn name(&self) -> &str {
        "medium-rss"
    }

    async fn fetch_all(&self) -> Result<Vec<Article>, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/rss+xml, application/xml")
            .send()
            .await
            .map_err(network_error)?;
        let body = ensure_success(response)
            .await?
            .text()
            .await
            .map_err(network_error)?;

        let articles = parse_rss(&body);
        if articles.is_empty() {
            return Err(SourceError::Empty("medium feed has no items".into()));
        }
        Ok(articles)
    }
}

/// Tier 2: the same feed rendered as text by a reader proxy.
pub struct MediumProxy {
    client: reqwest::Client,
    url: String,
}

#[async_trait]
impl FeedTier for MediumProxy {
    fn name(&self) -> &str {
        "medium-proxy"
    }

    async fn fetch_all(&self) -> Result<Vec<Article>, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(network_error)?;
        let body = read_capped(ensure_success(response).await?, PROXY_BODY_LIMIT).await?;

        let articles = parse_proxy(&body);
        if articles.is_empty() {
            return Err(SourceError::Empty("medium proxy returned no articles".into()));
        }
        Ok(articles)
    }
}

// ── Parsing ────────────────────────────────────────────────────────────────

fn parse_rss(xml: &str) -> Vec<Article> {
    ITEM_RE
        .captures_iter(xml)
        .filter_map(|item| {
            let item = item.get(1)?.as_str();
            let title = TITLE_RE.captures(item)?.get(1)?.as_str();
            let link = LINK_RE.captures(item)?.get(1)?.as_str();

            let title = unescape(strip_cdata(title).trim());
            let link = normalize_link(strip_cdata(link));
            if title.is_empty() || link.is_empty() {
                return None;
            }
            Some(Article::new(title, link, SOURCE_LABEL))
        })
        .collect()
}

fn parse_proxy(text: &str) -> Vec<Article> {
    text.split(PROXY_BLOCK_SEPARATOR)
        .filter_map(|block| {
            let title = extract_cdata(block)?;
            if title.eq_ignore_ascii_case(CHANNEL_TITLE) {
                return None;
            }
            let link = first_medium_url(block)?;
            Some(Article::new(title, link, SOURCE_LABEL))
        })
        .collect()
}

fn strip_cdata(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("<![CDATA[")
        .and_then(|rest| rest.strip_suffix("]]>"))
        .unwrap_or(trimmed)
}

fn extract_cdata(block: &str) -> Option<String> {
    let start = block.find("<![CDATA[")? + "<![CDATA[".len();
    let end = start + block[start..].find("]]>")?;
    let title = unescape(block[start..end].trim());
    (!title.is_empty()).then_some(title)
}

/// The first article URL in a proxy block, preferring one that carries a
/// `?source=` tracking parameter. Tag pages are skipped.
fn first_medium_url(block: &str) -> Option<String> {
    let mut candidate = None;
    for token in block.split_whitespace() {
        let token = token.trim_start_matches('<');
        if !token.starts_with("https://medium.com/") {
            continue;
        }
        let clean = normalize_link(token);
        if clean.contains("/tag/") {
            continue;
        }
        if token.contains("?source=") {
            return Some(clean);
        }
        candidate.get_or_insert(clean);
    }
    candidate
}

fn normalize_link(link: &str) -> String {
    let link = link.trim().trim_start_matches('<').trim_end_matches('>');
    let link = link.split('?').next().unwrap_or(link);
    link.trim().to_string()
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail.find(';').and_then(|end| Some((decode_entity(&tail[1..end])?, end))) {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "amp" => Some('&'),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}
