use anyhow::Result;
use clap::Parser;

use citation_impact_features::cli::{Cli, Commands};
use citation_impact_features::commands::{run_download, run_features, run_lookup, run_pipeline};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Download(args) => {
            run_download(args)?;
        }
        Commands::Features(args) => {
            run_features(args)?;
        }
        Commands::Lookup(args) => {
            run_lookup(args)?;
        }
        Commands::Pipeline(args) => {
            run_pipeline(args)?;
        }
    }

    Ok(())
}
