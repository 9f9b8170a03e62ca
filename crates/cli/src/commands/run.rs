//! `leetdigest run` — Build and deliver one digest.

use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::wiring::{self, RunOptions};

pub async fn run(
    config_path: Option<&Path>,
    dry_run: bool,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let pipeline = wiring::build_pipeline(&config, RunOptions { dry_run, seed })?;

    let cancel = CancellationToken::new();
    super::cancel_on_shutdown(cancel.clone());

    let report = pipeline
        .run(&cancel)
        .await
        .map_err(|e| format!("Digest run failed: {e}"))?;

    if !dry_run {
        println!(
            "✅ Digest delivered: {} (+{} problems, {} articles, narrative {:?}) in {:.1}s",
            report.featured_slug,
            report.supplementary,
            report.articles,
            report.narrative,
            report.elapsed.as_secs_f64()
        );
    }

    Ok(())
}
