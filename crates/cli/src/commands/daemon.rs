//! `leetdigest daemon` — Deliver digests on the configured schedule.

use leetdigest_digest::DigestPipeline;
use leetdigest_workflow::{CronExpr, Scheduler};
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::wiring::{self, RunOptions};

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let schedule = CronExpr::parse(&config.schedule)?;
    let pipeline = wiring::build_pipeline(&config, RunOptions::default())?;
    let run_timeout = config.run_timeout();

    println!("🗓️  leetdigest daemon — schedule '{schedule}' (UTC)");
    if let Some(next) = schedule.next_after(&chrono::Utc::now()) {
        println!("   Next scheduled run: {}", next.to_rfc3339());
    }

    let shutdown = CancellationToken::new();
    super::cancel_on_shutdown(shutdown.clone());

    // First digest goes out immediately.
    run_once(&pipeline, &shutdown, run_timeout).await;

    let (mut triggers, handle) = Scheduler::new(schedule).start(shutdown.clone());
    info!("Scheduler started");

    while let Some(trigger) = triggers.recv().await {
        info!(fired_at = %trigger.fired_at.to_rfc3339(), "Scheduled run");
        run_once(&pipeline, &shutdown, run_timeout).await;
        if shutdown.is_cancelled() {
            break;
        }
    }

    shutdown.cancel();
    handle.await?;
    info!("Daemon stopped");
    Ok(())
}

/// One bounded run. Failures are logged; the daemon keeps going.
///
/// The deadline cancels through the token; a delivery already in flight
/// completes.
async fn run_once(pipeline: &DigestPipeline, shutdown: &CancellationToken, limit: Duration) {
    if shutdown.is_cancelled() {
        return;
    }
    let cancel = shutdown.child_token();
    let deadline = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            warn!(timeout_secs = limit.as_secs(), "Scheduled digest exceeded run timeout");
            cancel.cancel();
        })
    };

    match pipeline.run(&cancel).await {
        Ok(report) => info!(
            run_id = %report.run_id,
            featured = %report.featured_slug,
            "Scheduled digest delivered"
        ),
        Err(e) => error!(error = %e, "Scheduled digest failed"),
    }
    deadline.abort();
}
