use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use log::{debug, info};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::common::{format_elapsed, DownloadStats};

/// Base URL of the 2021-03-01 S2ORC release
pub const DEFAULT_CORPUS_URL: &str =
    "https://s3-us-west-2.amazonaws.com/ai2-s2-research-public/open-corpus/2021-03-01/";

/// Manifest file listing the shard names, one per line
pub const MANIFEST_NAME: &str = "manifest.txt";

/// Join a base URL and a file name with exactly one slash
pub fn join_url(base: &str, name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), name.trim_start_matches('/'))
}

/// Shard names listed in a manifest; blank lines and non-shard entries are ignored
pub fn parse_manifest(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| line.ends_with(".gz"))
        .map(str::to_string)
        .collect()
}

/// Shards from `names` that are not already present in `out_dir`
pub fn missing_shards(names: &[String], out_dir: &Path) -> Vec<String> {
    names
        .iter()
        .filter(|name| !out_dir.join(name.as_str()).is_file())
        .cloned()
        .collect()
}

/// Create an HTTP client for corpus and API requests (system proxies are honoured)
pub fn create_http_client() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(concat!("citation-impact-features/", env!("CARGO_PKG_VERSION")))
        .build()
}

pub async fn fetch_manifest(client: &Client, base_url: &str) -> Result<Vec<String>> {
    let url = join_url(base_url, MANIFEST_NAME);
    info!("Fetching manifest: {}", url);

    let text = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Failed to request manifest: {}", url))?
        .error_for_status()
        .with_context(|| format!("Manifest request failed: {}", url))?
        .text()
        .await
        .context("Failed to read manifest body")?;

    Ok(parse_manifest(&text))
}

/// Stream one shard to a temporary file in `out_dir`, then rename it into place.
/// Returns the number of bytes written.
pub async fn download_shard(
    client: &Client,
    base_url: &str,
    name: &str,
    out_dir: &Path,
    timeout: Duration,
) -> Result<u64> {
    let url = join_url(base_url, name);
    let final_path = out_dir.join(name);
    let tmp_path: PathBuf = out_dir.join(format!(".{}.{}.part", name, &Uuid::new_v4().to_string()[..8]));

    debug!("Downloading {} -> {}", url, final_path.display());

    let mut response = client
        .get(&url)
        .timeout(timeout)
        .send()
        .await
        .with_context(|| format!("Failed to request shard: {}", url))?
        .error_for_status()
        .with_context(|| format!("Shard request failed: {}", url))?;

    let mut file = tokio::fs::File::create(&tmp_path)
        .await
        .with_context(|| format!("Failed to create: {}", tmp_path.display()))?;

    let mut written = 0u64;
    let copied: Result<()> = async {
        while let Some(chunk) = response.chunk().await.context("Failed to read shard body")? {
            file.write_all(&chunk).await.context("Failed to write shard")?;
            written += chunk.len() as u64;
        }
        file.flush().await.context("Failed to flush shard")?;
        Ok(())
    }
    .await;

    if let Err(e) = copied {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e.context(format!("Download of {} aborted", name)));
    }

    tokio::fs::rename(&tmp_path, &final_path)
        .await
        .with_context(|| format!("Failed to move shard into place: {}", final_path.display()))?;

    Ok(written)
}

/// Download every shard of `names` missing from `out_dir`, `concurrency` at a time.
///
/// If all shards are already present nothing is requested. The first failed
/// shard fails the whole step; completed shards stay on disk.
pub async fn download_shards(
    client: &Client,
    base_url: &str,
    names: &[String],
    out_dir: &Path,
    concurrency: usize,
    timeout: Duration,
    progress: Option<&ProgressBar>,
) -> Result<DownloadStats> {
    let start = Instant::now();

    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let missing = missing_shards(names, out_dir);
    let mut stats = DownloadStats {
        shards_listed: names.len(),
        shards_present: names.len() - missing.len(),
        ..Default::default()
    };

    if missing.is_empty() {
        info!("All {} shards already present in {}", names.len(), out_dir.display());
        return Ok(stats);
    }

    info!(
        "Downloading {} of {} shards ({} concurrent)",
        missing.len(),
        names.len(),
        concurrency
    );

    let results: Vec<Result<u64>> = stream::iter(missing.iter())
        .map(|name| async move {
            let bytes = download_shard(client, base_url, name, out_dir, timeout).await;
            if let Some(pb) = progress {
                pb.inc(1);
            }
            bytes
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    for result in results {
        stats.bytes_downloaded += result?;
        stats.shards_downloaded += 1;
    }

    info!(
        "Downloaded {} shards ({} bytes) in {}",
        stats.shards_downloaded,
        stats.bytes_downloaded,
        format_elapsed(start.elapsed())
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("https://host/corpus/", "manifest.txt"), "https://host/corpus/manifest.txt");
        assert_eq!(join_url("https://host/corpus", "/a.gz"), "https://host/corpus/a.gz");
    }

    #[test]
    fn test_parse_manifest() {
        let text = "s2-corpus-000.gz\n\n  s2-corpus-001.gz  \nlicense.txt\n# comment\n";
        assert_eq!(parse_manifest(text), vec!["s2-corpus-000.gz", "s2-corpus-001.gz"]);
    }

    #[test]
    fn test_missing_shards() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("s2-corpus-000.gz"), b"").unwrap();

        let names = vec!["s2-corpus-000.gz".to_string(), "s2-corpus-001.gz".to_string()];
        assert_eq!(missing_shards(&names, dir.path()), vec!["s2-corpus-001.gz".to_string()]);
    }

    #[tokio::test]
    async fn test_download_skipped_when_all_present() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("s2-corpus-000.gz"), b"").unwrap();
        let client = create_http_client().unwrap();

        // Unroutable base URL: any request would fail the test
        let stats = download_shards(
            &client,
            "http://127.0.0.1:9/",
            &["s2-corpus-000.gz".to_string()],
            dir.path(),
            4,
            Duration::from_secs(1),
            None,
        )
        .await
        .unwrap();

        assert_eq!(stats.shards_present, 1);
        assert_eq!(stats.shards_downloaded, 0);
    }
}
