//! # hwquote Entry Point
//!
//! ```text
//! hwquote items  [--format table|json|html] [--output FILE]
//! hwquote master
//! hwquote quote  SKU [--qty N] [--margin R] [--sheet PART=SPEC[:N]]... [--export FILE]
//! hwquote serve  [--bind ADDR] [--port N]
//! ```

use clap::Parser;
use hwquote::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    hwquote::init_tracing(cli.verbose);

    hwquote::run(cli).await
}
