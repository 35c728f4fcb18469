use clap::{Parser, Subcommand};

use crate::citations::DEFAULT_MIN_GAP_YEARS;
use crate::retrieval::{DEFAULT_CORPUS_URL, DEFAULT_PAPER_API};

#[derive(Parser)]
#[command(name = "citation-impact-features")]
#[command(about = "Resolve author identities, aggregate citations and compute h-index features from S2ORC shards")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the corpus manifest and any shards missing from the data directory
    Download(DownloadArgs),

    /// Build the feature table (citation counts, max co-author h-index) from local shards
    Features(FeaturesArgs),

    /// Fetch a single paper from the Semantic Scholar API and print it as JSON
    Lookup(LookupArgs),

    /// Run the full pipeline: download -> features
    Pipeline(PipelineArgs),
}

#[derive(Parser, Clone)]
pub struct DownloadArgs {
    /// Corpus release base URL (must contain manifest.txt)
    #[arg(long, default_value = DEFAULT_CORPUS_URL)]
    pub base_url: String,

    /// Directory for the downloaded shards
    #[arg(short, long, default_value = "data")]
    pub out_dir: String,

    /// Only take the first N shards of the manifest
    #[arg(long)]
    pub limit: Option<usize>,

    /// Concurrent shard downloads
    #[arg(short, long, default_value = "4")]
    pub concurrency: usize,

    /// Timeout in seconds per shard download
    #[arg(short, long, default_value = "1800")]
    pub timeout: u64,

    /// Logging level (DEBUG, INFO, WARN, ERROR)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct FeaturesArgs {
    /// Shard files or directories of shards (*.gz, *.jsonl)
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Output feature table (.parquet or .csv)
    #[arg(short, long, default_value = "features.parquet")]
    pub output: String,

    /// Also write the per-author h-index table (.parquet or .csv)
    #[arg(long)]
    pub authors_output: Option<String>,

    /// Number of threads for shard loading (0 = auto-detect)
    #[arg(long, default_value = "0")]
    pub threads: usize,

    /// Citation-list entries dated this many years or more after the paper are discarded
    #[arg(long, default_value_t = DEFAULT_MIN_GAP_YEARS)]
    pub validity_gap_years: i32,

    /// Logging level (DEBUG, INFO, WARN, ERROR)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct LookupArgs {
    /// Semantic Scholar paper id (or DOI / arXiv id accepted by the API)
    #[arg(short, long, required = true)]
    pub paper_id: String,

    /// Paper API base URL
    #[arg(long, default_value = DEFAULT_PAPER_API)]
    pub api_url: String,

    /// Timeout in seconds for the request
    #[arg(short, long, default_value = "30")]
    pub timeout: u64,

    /// Logging level (DEBUG, INFO, WARN, ERROR)
    #[arg(short, long, default_value = "WARN")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct PipelineArgs {
    /// Corpus release base URL (must contain manifest.txt)
    #[arg(long, default_value = DEFAULT_CORPUS_URL)]
    pub base_url: String,

    /// Only take the first N shards of the manifest
    #[arg(long)]
    pub limit: Option<usize>,

    /// Directory for shards (default: a fresh directory under the system temp dir)
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Keep downloaded shards instead of deleting them
    #[arg(long, default_value = "false")]
    pub keep_shards: bool,

    /// Output feature table (.parquet or .csv)
    #[arg(short, long, default_value = "features.parquet")]
    pub output: String,

    /// Also write the per-author h-index table (.parquet or .csv)
    #[arg(long)]
    pub authors_output: Option<String>,

    /// Number of threads for shard loading (0 = auto-detect)
    #[arg(long, default_value = "0")]
    pub threads: usize,

    /// Concurrent shard downloads
    #[arg(short, long, default_value = "4")]
    pub concurrency: usize,

    /// Timeout in seconds per shard download
    #[arg(long, default_value = "1800")]
    pub timeout: u64,

    /// Citation-list entries dated this many years or more after the paper are discarded
    #[arg(long, default_value_t = DEFAULT_MIN_GAP_YEARS)]
    pub validity_gap_years: i32,

    /// Logging level (DEBUG, INFO, WARN, ERROR)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}
