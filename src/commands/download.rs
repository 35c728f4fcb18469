use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::cli::DownloadArgs;
use crate::common::{create_count_progress_bar, format_elapsed, setup_logging, DownloadStats};
use crate::retrieval::{create_http_client, download_shards, fetch_manifest};

/// Fetch the manifest and make sure its (first `limit`) shards exist in `out_dir`.
/// Returns the local shard paths in manifest order.
pub async fn download_corpus(
    base_url: &str,
    out_dir: &Path,
    limit: Option<usize>,
    concurrency: usize,
    timeout: Duration,
) -> Result<(Vec<PathBuf>, DownloadStats)> {
    let client = create_http_client().context("Failed to build HTTP client")?;

    let mut names = fetch_manifest(&client, base_url).await?;
    info!("Manifest lists {} shards", names.len());

    if let Some(limit) = limit {
        names.truncate(limit);
        info!("Limiting to the first {} shards", names.len());
    }

    let progress = create_count_progress_bar(names.len() as u64);
    let stats = download_shards(
        &client,
        base_url,
        &names,
        out_dir,
        concurrency,
        timeout,
        Some(&progress),
    )
    .await?;
    progress.finish_with_message("downloads complete");

    let paths = names.iter().map(|name| out_dir.join(name)).collect();
    Ok((paths, stats))
}

pub fn run_download(args: DownloadArgs) -> Result<DownloadStats> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    info!("Starting corpus download");
    info!("Base URL: {}", args.base_url);
    info!("Output directory: {}", args.out_dir);

    let rt = tokio::runtime::Runtime::new()?;
    let (_, stats) = rt.block_on(download_corpus(
        &args.base_url,
        Path::new(&args.out_dir),
        args.limit,
        args.concurrency,
        Duration::from_secs(args.timeout),
    ))?;

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Shards listed: {}", stats.shards_listed);
    info!("Shards already present: {}", stats.shards_present);
    info!("Shards downloaded: {}", stats.shards_downloaded);
    info!("Bytes downloaded: {}", stats.bytes_downloaded);
    info!("Output directory: {}", args.out_dir);
    info!("========================================================");

    Ok(stats)
}
