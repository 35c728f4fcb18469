use anyhow::{Context, Result};
use std::time::Duration;

use crate::cli::LookupArgs;
use crate::common::setup_logging;
use crate::corpus::PaperRecord;
use crate::retrieval::PaperClient;

/// Fetch one paper and print it to stdout in corpus row shape
pub fn run_lookup(args: LookupArgs) -> Result<PaperRecord> {
    setup_logging(&args.log_level)?;

    let client = PaperClient::new(&args.api_url, Duration::from_secs(args.timeout))?;

    let rt = tokio::runtime::Runtime::new()?;
    let paper = rt.block_on(client.get_paper(&args.paper_id))?;

    let json = serde_json::to_string_pretty(&paper).context("Failed to serialize paper")?;
    println!("{}", json);

    Ok(paper)
}
