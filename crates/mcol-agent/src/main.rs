//! Metric collector agent binary

use clap::Parser;
use mcol_agent::{Cli, run};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run(Cli::parse()).await
}
