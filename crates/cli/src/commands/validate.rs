//! `leetdigest validate` — Check configuration and show effective settings.

use leetdigest_config::AppConfig;
use leetdigest_workflow::CronExpr;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 leetdigest — Configuration Check");
    println!("==================================\n");

    let path = super::config_path(config_path);
    if path.exists() {
        println!("  ✅ Config file: {}", path.display());
    } else {
        println!("  ℹ️  No config file at {}, using defaults", path.display());
    }

    let config = super::load_config(config_path)?;
    let schedule = CronExpr::parse(&config.schedule)?;
    println!("  ✅ Configuration valid\n");

    println!("  Schedule:      {schedule} (UTC)");
    if let Some(next) = schedule.next_after(&chrono::Utc::now()) {
        println!("  Next run:      {}", next.to_rfc3339());
    }
    println!(
        "  Digest:        {} practice problems, {} articles",
        config.digest.random_problem_count, config.digest.article_count
    );
    println!(
        "  Timeouts:      {}s per request, {}s per run",
        config.digest.request_timeout_secs, config.digest.run_timeout_secs
    );
    println!("  Articles:      {}", config.articles.sources.join(" → "));
    println!(
        "  Narrative:     {}",
        if config.narrative_enabled() {
            config.gemini.model_chain().join(" → ")
        } else {
            "disabled".into()
        }
    );

    let warnings = warnings(&config);
    println!();
    if warnings.is_empty() {
        println!("  🎉 Ready to deliver.");
    } else {
        for warning in &warnings {
            println!("  ⚠️  {warning}");
        }
        println!("\n  {} warning(s) found.", warnings.len());
    }

    Ok(())
}

/// Settings that load fine but will limit what a run can do.
fn warnings(config: &AppConfig) -> Vec<String> {
    let mut out = Vec::new();

    if config
        .discord
        .webhook_url
        .as_deref()
        .is_none_or(|u| u.trim().is_empty())
    {
        out.push("No Discord webhook configured: only `run --dry-run` will work".into());
    }
    if !config.narrative_enabled() {
        out.push("No GEMINI_API_KEY: the digest uses the fixed description".into());
    }
    let lists_gemini = config.articles.sources.iter().any(|s| s == "gemini");
    if lists_gemini && !(config.gemini.suggest_articles && config.narrative_enabled()) {
        out.push(
            "'gemini' is listed in articles.sources but suggestions are disabled or no API key is set"
                .into(),
        );
    }
    if config.digest.article_count > 0 && config.articles.sources.is_empty() {
        out.push("article_count > 0 but no article sources are configured".into());
    }
    if config.digest.run_timeout_secs < config.digest.request_timeout_secs {
        out.push("run_timeout_secs is shorter than request_timeout_secs".into());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_warn_about_missing_secrets() {
        let warnings = warnings(&AppConfig::default());
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("Discord"));
        assert!(warnings[1].contains("GEMINI_API_KEY"));
    }

    #[test]
    fn complete_config_has_no_warnings() {
        let mut config = AppConfig::default();
        config.discord.webhook_url = Some("https://discord.com/api/webhooks/1/abc".into());
        config.gemini.api_key = Some("key".into());
        assert!(warnings(&config).is_empty());
    }

    #[test]
    fn gemini_source_without_opt_in_warns() {
        let mut config = AppConfig::default();
        config.discord.webhook_url = Some("https://discord.com/api/webhooks/1/abc".into());
        config.gemini.api_key = Some("key".into());
        config.articles.sources.push("gemini".into());
        let warnings = warnings(&config);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("articles.sources"));
    }
}
