//! # hwquote App Library
//!
//! Command dispatch, configuration and renderers for the `hwquote` binary.
//!
//! ## Module Organization
//! ```text
//! hwquote/
//! ├── lib.rs          ◄─── You are here (tracing setup & command dispatch)
//! ├── cli.rs          ◄─── clap definitions
//! ├── config.rs       ◄─── AppConfig: defaults → TOML → env → flags
//! ├── error.rs        ◄─── AppError + HTTP mapping
//! ├── quoting.rs      ◄─── QuoteRequest → QuoteParams → ProductQuote
//! ├── export.rs       ◄─── JSON workbooks
//! ├── render/
//! │   ├── table.rs    ◄─── Terminal tables
//! │   └── html.rs     ◄─── Browser pages
//! ├── state.rs        ◄─── Shared server state, quote sheet mutex
//! └── server.rs       ◄─── axum router and graceful shutdown
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Parse CLI ─────────────► clap                                      │
//! │  2. Initialize Logging ────► RUST_LOG, else info / debug (--verbose)   │
//! │  3. Load Configuration ────► defaults, TOML, HWQUOTE_* env, flags      │
//! │  4. Load Catalog ──────────► strict or lenient, warnings logged        │
//! │  5. Run Command ───────────► items | master | quote | serve            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod quoting;
pub mod render;
pub mod server;
pub mod state;

use std::path::Path;

use anyhow::Context;
use hwquote_catalog::{load_from_path, Catalog};
use hwquote_core::MasterData;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, QuoteArgs};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::render::{render_items, table, ItemsReport, OutputFormat};
use crate::state::AppState;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=...` always wins
/// - Default: `info,hwquote=debug,tower_http=info`
/// - `--verbose`: `debug`
pub fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "debug"
    } else {
        "info,hwquote=debug,tower_http=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads configuration, then the catalog, then runs the chosen command.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::load(cli.config.clone()).context("Failed to load configuration")?;
    cli.apply_to(&mut config);
    config.validate()?;

    let catalog = load_from_path(&config.catalog.path, config.catalog.load_mode)
        .with_context(|| format!("Failed to load catalog {}", config.catalog.path.display()))?;
    for skipped in catalog.skipped() {
        warn!(index = skipped.index, id = %skipped.id, reason = %skipped.reason, "Item record skipped");
    }

    match &cli.command {
        Commands::Items { format, output } => {
            items(&catalog, &config, *format, output.as_deref())?
        }
        Commands::Master => master(&catalog),
        Commands::Quote(args) => quote(&catalog, &config, args)?,
        Commands::Serve { .. } => {
            info!(catalog = %config.catalog.path.display(), "Starting browser renderer");
            server::serve(AppState::new(catalog, config)).await?
        }
    }

    Ok(())
}

fn currency<'a>(config: &'a AppConfig, catalog: &'a Catalog) -> &'a str {
    config
        .quote
        .currency
        .as_deref()
        .unwrap_or(&catalog.settings().currency)
}

fn items(
    catalog: &Catalog,
    config: &AppConfig,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), AppError> {
    let report = ItemsReport::from(catalog);
    let rendered = render_items(&report, format, currency(config, catalog))?;

    match output {
        Some(path) => {
            std::fs::write(path, rendered).map_err(|source| AppError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            info!(path = %path.display(), items = report.items.len(), format = format_name(format), "Items written");
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn format_name(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Table => "table",
        OutputFormat::Json => "json",
        OutputFormat::Html => "html",
    }
}

fn master(catalog: &Catalog) {
    for (title, table) in table::master_tables(catalog.master()) {
        println!("{}\n{}\n", title, table);
    }

    let dangling = catalog.dangling_references();
    if !dangling.is_empty() {
        println!("Dangling references:");
        for d in dangling {
            println!("  {} -> {} {}", d.owner, d.kind, d.code);
        }
    }
}

fn quote(catalog: &Catalog, config: &AppConfig, args: &QuoteArgs) -> Result<(), AppError> {
    let quote = quoting::quote_product(catalog, &args.sku, &args.request())?;
    let currency = currency(config, catalog);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&quote)?);
    } else {
        println!("{} {} x {}\n", quote.sku, quote.product_name, quote.params.qty);
        println!("BOM\n{}\n", table::bom_table(&quote));
        if !quote.process_lines.is_empty() {
            println!("Processes\n{}\n", table::process_table(&quote));
        }
        if !quote.sheet_alternatives.is_empty() {
            println!("Sheet alternatives\n{}\n", table::sheet_alternatives_table(&quote));
        }
        println!("Summary\n{}", table::cost_summary_table(&quote, currency));
    }

    for warning in &quote.warnings {
        warn!(sku = %quote.sku, "{}", warning);
    }

    if let Some(path) = &args.export {
        let header = config.quote.header(&catalog.settings().currency);
        export::product_quote_workbook(&quote, &header)?.write_to(path)?;
    }

    Ok(())
}
