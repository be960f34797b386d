//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hwquote_core::PricingMode;
use rust_decimal::Decimal;

use crate::config::AppConfig;
use crate::quoting::QuoteRequest;
use crate::render::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "hwquote")]
#[command(about = "Quote calculator for custom hardware items and BOM products", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: hwquote.toml in the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data file, overrides the configured catalog path
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Debug logging (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Quote every item record in the data file
    Items {
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the master data sections
    Master,

    /// Quote one BOM product
    Quote(QuoteArgs),

    /// Serve the browser renderer
    Serve {
        #[arg(long)]
        bind: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(clap::Args, Debug)]
pub struct QuoteArgs {
    /// Product SKU
    pub sku: String,

    /// Finished-goods quantity
    #[arg(long)]
    pub qty: Option<u64>,

    /// Overhead (management fee) ratio, e.g. 0.05
    #[arg(long)]
    pub overhead: Option<Decimal>,

    /// Tax ratio, e.g. 0.13
    #[arg(long)]
    pub tax: Option<Decimal>,

    /// Margin ratio, e.g. 0.18
    #[arg(long)]
    pub margin: Option<Decimal>,

    /// Scrap allowance for by-weight materials
    #[arg(long)]
    pub scrap: Option<Decimal>,

    /// gross_margin or markup
    #[arg(long)]
    pub mode: Option<PricingMode>,

    /// Shipping per order
    #[arg(long)]
    pub shipping: Option<Decimal>,

    /// Sheet override PART=SPEC[:PIECES], repeatable
    #[arg(long = "sheet")]
    pub sheets: Vec<String>,

    /// Write the quote workbook (JSON) to this path
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Print the quote as JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

impl QuoteArgs {
    pub fn request(&self) -> QuoteRequest {
        QuoteRequest {
            qty: self.qty,
            overhead_pct: self.overhead,
            tax_pct: self.tax,
            margin_pct: self.margin,
            scrap_rate: self.scrap,
            mode: self.mode,
            shipping: self.shipping,
            sheet: (!self.sheets.is_empty()).then(|| self.sheets.join(",")),
        }
    }
}

impl Cli {
    /// Applies command-line overrides, the last configuration layer.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(path) = &self.catalog {
            config.catalog.path = path.clone();
        }
        if let Commands::Serve { bind, port } = &self.command {
            if let Some(bind) = bind {
                config.server.bind_addr = bind.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
        }
    }
}
