use anyhow::Context;
use showsync::shared::utils::logger::init_logger;
use showsync::shared::SyncConfig;
use showsync::SyncEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let config = SyncConfig::from_env().context("Failed to load configuration")?;
    let engine = SyncEngine::build(&config).context("Failed to start sync engine")?;

    let worker = engine.start();
    log::info!(
        "showsync running against {} (sync every {:?}), press Ctrl-C to stop",
        config.database_url,
        config.sync_interval
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    engine.stop();
    worker.await.context("Sync scheduler task panicked")?;

    let stats = engine.statistics().await?;
    log::info!(
        "Stopped after {} passes, {} jobs still queued",
        stats.passes_completed,
        stats.pending_jobs
    );
    Ok(())
}
