use anyhow::Result;
use clap::Parser;
use qc_forge::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    Cli::parse().execute().await
}
