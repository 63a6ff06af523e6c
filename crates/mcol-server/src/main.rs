//! Metric collector server binary

use clap::Parser;
use mcol_server::{Cli, run};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run(Cli::parse()).await
}
