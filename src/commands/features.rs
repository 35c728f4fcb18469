use anyhow::Result;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::citations::ValidityRule;
use crate::cli::FeaturesArgs;
use crate::common::{create_count_progress_bar, format_elapsed, setup_logging, FeatureStats};
use crate::corpus::{list_shards, load_corpus};
use crate::features::{build_author_frame, build_feature_frame, write_table, TableFormat};
use crate::pipeline::FeaturePipeline;

/// Size the global rayon pool used for shard loading
pub fn configure_threads(threads: usize) {
    let num_threads = if threads == 0 {
        let cores = num_cpus::get();
        info!("Auto-detected {} CPU cores. Using {} threads.", cores, cores);
        cores
    } else {
        info!("Using specified {} threads.", threads);
        threads
    };

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        error!("Failed to build thread pool: {}. Using default.", e);
    }
}

/// Expand inputs into shard paths: directories contribute their shards, files are taken as is
pub fn resolve_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for input in inputs {
        let path = Path::new(input);
        if path.is_dir() {
            paths.extend(list_shards(path)?);
        } else if path.is_file() {
            paths.push(path.to_path_buf());
        } else {
            return Err(anyhow::anyhow!("Input does not exist: {}", input));
        }
    }

    if paths.is_empty() {
        return Err(anyhow::anyhow!("No shard files found in: {}", inputs.join(", ")));
    }

    Ok(paths)
}

/// Load shards, run the feature pipeline and write the output tables
pub fn build_features(
    shards: &[PathBuf],
    rule: ValidityRule,
    output: &Path,
    authors_output: Option<&Path>,
) -> Result<FeatureStats> {
    // Fail on a bad extension before spending time on the corpus
    TableFormat::from_path(output)?;
    if let Some(path) = authors_output {
        TableFormat::from_path(path)?;
    }

    let progress = create_count_progress_bar(shards.len() as u64);
    let (corpus, load_stats) = load_corpus(shards, Some(&progress))?;
    progress.finish_with_message("loaded");

    let output_tables = FeaturePipeline::new(rule).run(corpus);

    let mut features = build_feature_frame(&output_tables)?;
    write_table(&mut features, output)?;

    if let Some(path) = authors_output {
        let mut authors = build_author_frame(&output_tables)?;
        write_table(&mut authors, path)?;
    }

    Ok(FeatureStats {
        load: load_stats,
        resolve: output_tables.resolve_stats.clone(),
        citations_counted: output_tables.counters.accepted,
        citations_rejected: output_tables.counters.rejected,
        authors_with_citations: output_tables.counters.author_citations.len(),
        rows_written: features.height(),
    })
}

pub fn log_feature_summary(stats: &FeatureStats) {
    info!("Shards read: {}", stats.load.shards_read);
    info!("Papers loaded: {}", stats.load.papers_loaded);
    if stats.load.lines_failed > 0 {
        info!("Lines failed to parse: {}", stats.load.lines_failed);
    }
    if stats.load.duplicate_ids > 0 {
        info!("Duplicate paper ids skipped: {}", stats.load.duplicate_ids);
    }
    info!("Papers with authors: {}", stats.resolve.papers_with_authors);
    info!("Author mentions with id: {}", stats.resolve.mentions_with_id);
    info!("Author mentions given synthetic ids: {}", stats.resolve.mentions_without_id);
    info!("Distinct author names: {}", stats.resolve.distinct_names);
    info!("Citations counted: {}", stats.citations_counted);
    info!("Citations rejected by year gap: {}", stats.citations_rejected);
    info!("Authors with citations: {}", stats.authors_with_citations);
    info!("Feature rows written: {}", stats.rows_written);
}

pub fn run_features(args: FeaturesArgs) -> Result<FeatureStats> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    info!("Starting citation feature extraction");
    info!("Input: {}", args.input.join(", "));
    info!("Output: {}", args.output);

    configure_threads(args.threads);

    let shards = resolve_inputs(&args.input)?;
    let authors_output = args.authors_output.as_ref().map(PathBuf::from);

    let stats = build_features(
        &shards,
        ValidityRule::new(args.validity_gap_years),
        Path::new(&args.output),
        authors_output.as_deref(),
    )?;

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    log_feature_summary(&stats);
    info!("Output file: {}", args.output);
    if let Some(path) = &args.authors_output {
        info!("Author table: {}", path);
    }
    info!("========================================================");

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_inputs_mixes_dirs_and_files() {
        let dir = tempdir().unwrap();
        let shard_dir = dir.path().join("shards");
        std::fs::create_dir(&shard_dir).unwrap();
        std::fs::write(shard_dir.join("b.gz"), b"").unwrap();
        std::fs::write(shard_dir.join("a.gz"), b"").unwrap();
        let single = dir.path().join("extra.jsonl");
        std::fs::write(&single, b"").unwrap();

        let paths = resolve_inputs(&[
            shard_dir.to_string_lossy().to_string(),
            single.to_string_lossy().to_string(),
        ])
        .unwrap();

        assert_eq!(paths, vec![shard_dir.join("a.gz"), shard_dir.join("b.gz"), single]);
    }

    #[test]
    fn test_resolve_inputs_errors() {
        assert!(resolve_inputs(&["/nonexistent/shards".to_string()]).is_err());

        let dir = tempdir().unwrap();
        assert!(resolve_inputs(&[dir.path().to_string_lossy().to_string()]).is_err());
    }
}
