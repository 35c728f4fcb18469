use anyhow::{Context, Result};
use log::info;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::citations::ValidityRule;
use crate::cli::PipelineArgs;
use crate::commands::download::download_corpus;
use crate::commands::features::{build_features, configure_threads, log_feature_summary};
use crate::common::{format_elapsed, setup_logging, DownloadStats, FeatureStats};

/// Shard directory for one pipeline run; removed afterwards unless kept
struct PipelineContext {
    data_dir: PathBuf,
    keep_shards: bool,
}

impl PipelineContext {
    fn new(args: &PipelineArgs) -> Result<Self> {
        let (data_dir, created) = match &args.data_dir {
            Some(dir) => (PathBuf::from(dir), false),
            None => {
                let run_id = &Uuid::new_v4().to_string()[..8];
                (env::temp_dir().join(format!("s2-shards-{}", run_id)), true)
            }
        };

        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Self {
            data_dir,
            // A user-supplied directory is never wiped
            keep_shards: args.keep_shards || !created,
        })
    }

    fn cleanup(&self) -> Result<()> {
        if self.keep_shards {
            info!("Keeping shards in: {}", self.data_dir.display());
            return Ok(());
        }

        info!("Cleaning up downloaded shards...");

        if self.data_dir.exists() {
            fs::remove_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to remove: {}", self.data_dir.display()))?;
        }

        Ok(())
    }
}

impl Drop for PipelineContext {
    fn drop(&mut self) {
        // Best-effort cleanup on drop (e.g., if a step fails)
        if !self.keep_shards && self.data_dir.exists() {
            let _ = fs::remove_dir_all(&self.data_dir);
        }
    }
}

/// Run the full pipeline: download -> features
pub fn run_pipeline(args: PipelineArgs) -> Result<(DownloadStats, FeatureStats)> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    info!("Starting citation feature pipeline");
    info!("Base URL: {}", args.base_url);
    info!("Output: {}", args.output);

    let ctx = PipelineContext::new(&args)?;
    info!("Data directory: {}", ctx.data_dir.display());

    configure_threads(args.threads);

    info!("");
    info!("=== STEP 1/2: Downloading shards ===");
    info!("");

    let rt = tokio::runtime::Runtime::new()?;
    let (shards, download_stats) = rt
        .block_on(download_corpus(
            &args.base_url,
            &ctx.data_dir,
            args.limit,
            args.concurrency,
            Duration::from_secs(args.timeout),
        ))
        .context("Download step failed")?;

    info!(
        "Download complete: {} shards ({} fetched)",
        shards.len(),
        download_stats.shards_downloaded
    );

    info!("");
    info!("=== STEP 2/2: Building features ===");
    info!("");

    let authors_output = args.authors_output.as_ref().map(PathBuf::from);
    let feature_stats = build_features(
        &shards,
        ValidityRule::new(args.validity_gap_years),
        Path::new(&args.output),
        authors_output.as_deref(),
    )
    .context("Features step failed")?;

    ctx.cleanup()?;

    info!("");
    info!("==================== PIPELINE COMPLETE ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("");
    info!("Download step:");
    info!("  Shards listed: {}", download_stats.shards_listed);
    info!("  Shards already present: {}", download_stats.shards_present);
    info!("  Shards downloaded: {}", download_stats.shards_downloaded);
    info!("");
    info!("Features step:");
    log_feature_summary(&feature_stats);
    info!("");
    info!("Output: {}", args.output);
    if let Some(ref authors) = args.authors_output {
        info!("Author table: {}", authors);
    }
    info!("===========================================================");

    Ok((download_stats, feature_stats))
}
