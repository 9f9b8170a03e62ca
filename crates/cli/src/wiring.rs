//! Builds the digest pipeline from configuration.

use leetdigest_channels::{ConsoleNotifier, DiscordConfig, DiscordWebhook};
use leetdigest_config::{AppConfig, ConfigError};
use leetdigest_core::notifier::Notifier;
use leetdigest_core::source::ArticleSource;
use leetdigest_digest::{DigestPipeline, InsightComposer, PipelineSettings};
use leetdigest_providers::{FallbackBackend, GeminiArticleSource, GeminiClient, GeminiWriter};
use leetdigest_sources::{ArticleChain, DevToSource, LeetCodeClient, Sampler, medium};
use std::sync::Arc;
use tracing::{info, warn};

/// Per-invocation switches from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    pub seed: Option<u64>,
}

/// Assemble a pipeline with every collaborator the config enables.
pub fn build_pipeline(
    config: &AppConfig,
    options: RunOptions,
) -> Result<DigestPipeline, ConfigError> {
    let timeout = config.request_timeout();
    let sampler = Arc::new(match options.seed {
        Some(seed) => Sampler::seeded(seed),
        None => Sampler::from_entropy(),
    });

    let notifier = build_notifier(config, options.dry_run)?;
    let gemini = gemini_client(config);

    let settings = PipelineSettings {
        random_count: config.digest.random_problem_count as usize,
        article_count: config.digest.article_count as usize,
        call_timeout: timeout,
    };
    let problems = Arc::new(LeetCodeClient::new(timeout, sampler.clone()));
    let mut pipeline = DigestPipeline::new(problems, notifier, settings);

    let chain = build_article_chain(config, gemini.clone(), sampler);
    if !chain.is_empty() {
        pipeline = pipeline.with_articles(Arc::new(chain));
    }

    let composer = match build_narrative(config, gemini) {
        Some(backend) => InsightComposer::new(Some(Arc::new(backend))),
        None => {
            info!("No Gemini API key configured, narrative disabled");
            InsightComposer::disabled()
        }
    };

    Ok(pipeline.with_composer(composer))
}

fn gemini_client(config: &AppConfig) -> Option<Arc<GeminiClient>> {
    if !config.narrative_enabled() {
        return None;
    }
    let key = config.gemini.api_key.as_deref()?;
    Some(Arc::new(
        GeminiClient::new(key, config.request_timeout()).with_base_url(&config.gemini.api_url),
    ))
}

/// Discord in normal runs, stdout for dry runs.
pub fn build_notifier(config: &AppConfig, dry_run: bool) -> Result<Arc<dyn Notifier>, ConfigError> {
    if dry_run {
        return Ok(Arc::new(ConsoleNotifier::new()));
    }

    let webhook_url = config
        .discord
        .webhook_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| {
            ConfigError::Missing(
                "discord.webhook_url (or DISCORD_WEBHOOK_URL); use --dry-run to print instead"
                    .into(),
            )
        })?;

    Ok(Arc::new(DiscordWebhook::new(DiscordConfig {
        webhook_url: webhook_url.to_string(),
        bot_name: config.discord.bot_name.clone(),
        timeout: config.request_timeout(),
    })))
}

/// Article sources in configured order, each with the request deadline.
pub fn build_article_chain(
    config: &AppConfig,
    gemini: Option<Arc<GeminiClient>>,
    sampler: Arc<Sampler>,
) -> ArticleChain {
    let timeout = config.request_timeout();
    let mut chain = ArticleChain::new("articles");

    for name in &config.articles.sources {
        let source: Arc<dyn ArticleSource> = match name.as_str() {
            "medium" => Arc::new(medium(timeout, sampler.clone())),
            "devto" => Arc::new(DevToSource::new(timeout, sampler.clone())),
            "gemini" => match (&gemini, config.gemini.suggest_articles) {
                (Some(client), true) => Arc::new(GeminiArticleSource::new(
                    client.clone(),
                    config.gemini.model.clone(),
                    config.gemini.topic_limit as usize,
                )),
                _ => {
                    warn!("Gemini article source listed but suggestions are disabled or no API key is set, skipping");
                    continue;
                }
            },
            other => {
                warn!(source = %other, "Unknown article source, skipping");
                continue;
            }
        };
        // Medium may need two sequential requests when the feed falls short.
        let deadline = if name == "medium" {
            timeout.saturating_mul(2)
        } else {
            timeout
        };
        chain = chain.add(source, deadline);
    }

    chain
}

/// One writer per model in the configured chain, tried in order.
pub fn build_narrative(
    config: &AppConfig,
    gemini: Option<Arc<GeminiClient>>,
) -> Option<FallbackBackend> {
    let client = gemini?;
    let timeout = config.request_timeout();

    let backend = config
        .gemini
        .model_chain()
        .into_iter()
        .fold(FallbackBackend::new("gemini"), |backend, model| {
            let writer = GeminiWriter::new(client.clone(), model)
                .with_topic_limit(config.gemini.topic_limit as usize);
            backend.add(Arc::new(writer), timeout)
        });

    (!backend.is_empty()).then_some(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> AppConfig {
        let mut config = AppConfig::default();
        config.gemini.api_key = Some("test-key".into());
        config
    }

    #[test]
    fn dry_run_needs_no_webhook() {
        let config = AppConfig::default();
        let notifier = build_notifier(&config, true).unwrap();
        assert_eq!(notifier.name(), "console");
        assert!(build_pipeline(&config, RunOptions { dry_run: true, seed: Some(1) }).is_ok());
    }

    #[test]
    fn delivery_requires_a_webhook() {
        let mut config = AppConfig::default();
        let err = build_pipeline(&config, RunOptions::default()).err().unwrap();
        assert!(matches!(err, ConfigError::Missing(_)));

        config.discord.webhook_url = Some("   ".into());
        assert!(build_notifier(&config, false).is_err());

        config.discord.webhook_url = Some("https://discord.com/api/webhooks/1/abc".into());
        assert_eq!(build_notifier(&config, false).unwrap().name(), "discord");
    }

    #[test]
    fn default_chain_is_medium_then_devto() {
        let config = AppConfig::default();
        let chain = build_article_chain(&config, None, Arc::new(Sampler::seeded(1)));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn gemini_source_needs_key_and_opt_in() {
        let mut config = config_with_key();
        config.articles.sources = vec!["gemini".into(), "devto".into()];
        let sampler = Arc::new(Sampler::seeded(1));

        let client = gemini_client(&config);
        assert!(client.is_some());
        assert_eq!(build_article_chain(&config, client.clone(), sampler.clone()).len(), 1);

        config.gemini.suggest_articles = true;
        assert_eq!(build_article_chain(&config, client, sampler.clone()).len(), 2);

        assert_eq!(build_article_chain(&config, None, sampler).len(), 1);
    }

    #[test]
    fn huge_timeout_does_not_overflow_deadlines() {
        let mut config = config_with_key();
        config.digest.request_timeout_secs = u64::MAX;
        config.gemini.suggest_articles = true;
        config.articles.sources = vec!["medium".into(), "devto".into(), "gemini".into()];

        let chain = build_article_chain(&config, gemini_client(&config), Arc::new(Sampler::seeded(1)));
        assert_eq!(chain.len(), 3);
        assert!(build_pipeline(&config, RunOptions { dry_run: true, seed: Some(1) }).is_ok());
    }

    #[test]
    fn narrative_follows_model_chain() {
        let config = config_with_key();
        let backend = build_narrative(&config, gemini_client(&config)).unwrap();
        assert_eq!(backend.len(), config.gemini.model_chain().len());
    }

    #[test]
    fn no_key_means_no_narrative() {
        let config = AppConfig::default();
        assert!(gemini_client(&config).is_none());
        assert!(build_narrative(&config, None).is_none());
    }
}
