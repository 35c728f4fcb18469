use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use indicatif::ProgressBar;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::{Corpus, PaperRecord};
use crate::common::{format_elapsed, LoadStats};

/// Parsed rows of a single shard, in file order
pub struct ShardContents {
    pub papers: Vec<PaperRecord>,
    pub stats: LoadStats,
}

fn open_shard(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).with_context(|| format!("Failed to open shard: {}", path.display()))?;

    if path.extension().map_or(false, |ext| ext == "gz") {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Read one JSONL shard (gzipped when the name ends in `.gz`)
pub fn load_shard(path: &Path) -> Result<ShardContents> {
    let reader = BufReader::new(open_shard(path)?);

    let mut papers = Vec::new();
    let mut stats = LoadStats {
        shards_read: 1,
        ..Default::default()
    };

    for line_result in reader.lines() {
        let line = line_result
            .with_context(|| format!("Failed to read line from {}", path.display()))?;

        if line.trim().is_empty() {
            continue;
        }

        stats.lines_read += 1;

        match serde_json::from_str::<PaperRecord>(&line) {
            Ok(paper) => papers.push(paper),
            Err(e) => {
                if stats.lines_failed < 5 {
                    warn!("Failed to parse paper in {}: {}", path.display(), e);
                }
                stats.lines_failed += 1;
            }
        }
    }

    debug!(
        "Read {} papers from {} ({} lines failed)",
        papers.len(),
        path.display(),
        stats.lines_failed
    );

    Ok(ShardContents { papers, stats })
}

/// List shard files (`*.gz`, `*.jsonl`) in a directory, sorted by name
pub fn list_shards(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read shard directory: {}", dir.display()))?;

    let mut shards = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_shard = path.is_file()
            && path
                .extension()
                .map_or(false, |ext| ext == "gz" || ext == "jsonl");
        if is_shard {
            shards.push(path);
        }
    }

    shards.sort();
    Ok(shards)
}

/// Load shards in parallel and assemble them into one corpus.
///
/// Rows are inserted in shard order then file order, so the corpus iteration
/// order does not depend on thread scheduling.
pub fn load_corpus(paths: &[PathBuf], progress: Option<&ProgressBar>) -> Result<(Corpus, LoadStats)> {
    info!("Loading {} corpus shards", paths.len());
    let start = Instant::now();

    let shards: Vec<ShardContents> = paths
        .par_iter()
        .map(|path| {
            let contents = load_shard(path);
            if let Some(pb) = progress {
                pb.inc(1);
            }
            contents
        })
        .collect::<Result<Vec<_>>>()?;

    let total: usize = shards.iter().map(|s| s.papers.len()).sum();
    let mut corpus = Corpus::with_capacity(total);
    let mut stats = LoadStats::default();

    for shard in shards {
        stats.absorb(&shard.stats);
        for paper in shard.papers {
            if corpus.insert(paper) {
                stats.papers_loaded += 1;
            } else {
                stats.duplicate_ids += 1;
            }
        }
    }

    info!(
        "Loaded {} papers from {} shards in {}",
        stats.papers_loaded,
        stats.shards_read,
        format_elapsed(start.elapsed())
    );

    if stats.lines_failed > 0 {
        warn!("Failed to parse {} lines", stats.lines_failed);
    }
    if stats.duplicate_ids > 0 {
        warn!("Skipped {} rows with duplicate paper ids", stats.duplicate_ids);
    }

    Ok((corpus, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_gz_shard(path: &Path, lines: &[&str]) {
        let file = File::create(path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut writer = std::io::BufWriter::new(encoder);

        for line in lines {
            writeln!(writer, "{}", line).unwrap();
        }
        writer.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_load_shard_skips_bad_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s2-corpus-000.gz");
        write_gz_shard(
            &path,
            &[
                r#"{"id": "p1", "year": 2001}"#,
                "not json",
                "",
                r#"{"id": "p2", "authors": [{"name": "A", "ids": ["1"]}]}"#,
            ],
        );

        let contents = load_shard(&path).unwrap();

        assert_eq!(contents.papers.len(), 2);
        assert_eq!(contents.stats.lines_read, 3);
        assert_eq!(contents.stats.lines_failed, 1);
    }

    #[test]
    fn test_load_plain_jsonl() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("papers.jsonl");
        fs::write(&path, "{\"id\": \"p1\"}\n{\"id\": \"p2\"}\n").unwrap();

        let contents = load_shard(&path).unwrap();
        assert_eq!(contents.papers.len(), 2);
    }

    #[test]
    fn test_load_corpus_preserves_shard_order_and_dedups() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("s2-corpus-000.gz");
        let second = dir.path().join("s2-corpus-001.gz");
        write_gz_shard(&first, &[r#"{"id": "a"}"#, r#"{"id": "b"}"#]);
        write_gz_shard(&second, &[r#"{"id": "c"}"#, r#"{"id": "a", "year": 1900}"#]);
        fs::write(dir.path().join("manifest.txt"), "s2-corpus-000.gz\n").unwrap();

        let shards = list_shards(dir.path()).unwrap();
        assert_eq!(shards, vec![first, second]);

        let (corpus, stats) = load_corpus(&shards, None).unwrap();

        let ids: Vec<&str> = corpus.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(stats.shards_read, 2);
        assert_eq!(stats.papers_loaded, 3);
        assert_eq!(stats.duplicate_ids, 1);
        assert!(corpus.get("a").unwrap().year.is_none());
    }

    #[test]
    fn test_load_missing_shard_fails() {
        let result = load_corpus(&[PathBuf::from("/nonexistent/shard.gz")], None);
        assert!(result.is_err());
    }
}
