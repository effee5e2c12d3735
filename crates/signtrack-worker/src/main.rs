//! SignTrack worker binary.
//!
//! Ledger lifecycle commands for the tracking pipeline. Frame decoding and
//! detection backends are external collaborators registered by embedding
//! builds; batch processing is driven through the library API
//! ([`signtrack_worker::BatchExecutor`]).

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use signtrack_models::ExportEntry;
use signtrack_store::{write_export_index, JobFilter, Ledger};
use signtrack_worker::{ingest_manifest, read_manifest, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("signtrack=info".parse().unwrap())
        .add_directive("sqlx=warn".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let config = WorkerConfig::from_env()?;
    config.ensure_dirs()?;

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("stats");

    match command {
        "init-db" => cmd_init_db(&config).await,
        "ingest" => {
            let manifest = args.get(2).ok_or_else(|| {
                anyhow::anyhow!("usage: signtrack-worker ingest <manifest.jsonl>")
            })?;
            cmd_ingest(&config, manifest).await
        }
        "stats" => cmd_stats(&config).await,
        "export-index" => cmd_export_index(&config).await,
        "run" => anyhow::bail!(
            "no frame source or detection backend is linked into this binary; \
             embed signtrack-worker as a library and register a `{}` provider \
             with the BatchExecutor",
            config.provider
        ),
        other => anyhow::bail!(
            "unknown command `{other}`; expected init-db, ingest, stats or export-index"
        ),
    }
}

async fn open_ledger(config: &WorkerConfig) -> anyhow::Result<Ledger> {
    let ledger = Ledger::connect(&config.db_path).await?;
    ledger.init_schema().await?;
    Ok(ledger)
}

async fn cmd_init_db(config: &WorkerConfig) -> anyhow::Result<()> {
    open_ledger(config).await?;
    info!(db_path = %config.db_path.display(), "Database initialized");
    Ok(())
}

async fn cmd_ingest(config: &WorkerConfig, manifest: &str) -> anyhow::Result<()> {
    let ledger = open_ledger(config).await?;

    let records = read_manifest(manifest.as_ref())?;
    info!(count = records.len(), manifest = %manifest, "Read manifest");

    let summary = ingest_manifest(&ledger, &records).await?;
    info!(
        created = summary.created,
        existing = summary.existing,
        missing = summary.missing,
        "Ingest finished"
    );
    Ok(())
}

async fn cmd_stats(config: &WorkerConfig) -> anyhow::Result<()> {
    let ledger = open_ledger(config).await?;
    let stats = ledger.stats().await?;

    for (status, count) in &stats.by_status {
        info!(status = %status, count, "Jobs");
    }
    if let Some(avg) = stats.quality.avg {
        info!(
            avg = %format!("{avg:.2}"),
            min = %format!("{:.2}", stats.quality.min.unwrap_or(0.0)),
            max = %format!("{:.2}", stats.quality.max.unwrap_or(0.0)),
            "Quality scores"
        );
    }
    info!(total_videos = stats.total_videos, "Videos");
    Ok(())
}

async fn cmd_export_index(config: &WorkerConfig) -> anyhow::Result<()> {
    let ledger = open_ledger(config).await?;

    let done = ledger
        .list_jobs(&JobFilter {
            status: Some(signtrack_models::JobStatus::Done),
            ..JobFilter::default()
        })
        .await?;

    let entries: Vec<ExportEntry> = done
        .iter()
        .map(|listing| ExportEntry {
            label: listing.label.clone(),
            filename: listing.filename.clone(),
            video_id: listing.job.video_id.to_string(),
            quality_score: listing.job.quality_score,
            frame_count: listing.job.frame_count,
            tracking_path: config
                .tracks_dir
                .join(listing.job.video_id.as_str())
                .to_string_lossy()
                .into_owned(),
        })
        .collect();

    let path = write_export_index(&config.exports_dir, &entries)?;
    info!(entries = entries.len(), path = %path.display(), "Export index written");
    Ok(())
}
