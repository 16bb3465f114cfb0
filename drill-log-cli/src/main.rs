//! Drill Log Reader CLI Application
//!
//! Command-line driver for the drill-log-decoder library:
//! - Summarise a logger session (counts, time span, truncation)
//! - List the tag table
//! - Export decoded samples as JSON lines
//! - Export the wide table as CSV

use anyhow::{Context, Result};
use clap::Parser;
use drill_log_decoder::{CollectingSink, LogSession, WideTable};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod export;
mod report;

use config::{AppConfig, OutputFormat, Overrides, RunSettings};

/// Drill Log Reader - Decode PLC data-logger files
#[derive(Parser, Debug)]
#[command(name = "drill-log")]
#[command(about = "Decode drill rig data-logger files ((Tagname)/(Float) pairs)", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the tag-definition file ("... (Tagname).DAT")
    #[arg(short, long, value_name = "FILE")]
    tags: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// What to produce
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Tag name to keep in table output (can be repeated)
    #[arg(long = "column", value_name = "NAME")]
    columns: Vec<String>,

    /// Output file for exports (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Maximum number of samples to decode
    #[arg(long, value_name = "COUNT")]
    limit: Option<usize>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Drill Log Reader CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", drill_log_decoder::VERSION);

    let config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    let overrides = Overrides {
        tag_file: args.tags.clone(),
        format: args.format,
        columns: args.columns.clone(),
        output: args.output.clone(),
        limit: args.limit,
    };

    match config.settings(overrides) {
        Some(settings) => run(&config, &settings),
        None => {
            // No input - show help
            println!("Drill Log Reader - No input specified");
            println!("\nQuick Start:");
            println!("  drill-log --tags \"DataLog/2024 02 20 0000 BigRAID (Tagname).DAT\"");
            println!("  drill-log --tags <FILE> --format table --column \"[PLC]DRILLACTIVECURRENT\"");
            println!("\nWith a configuration file:");
            println!("  drill-log --config config.toml");
            println!("\nUse --help for more options");
            Ok(())
        }
    }
}

/// Open the session and produce the requested output
fn run(config: &AppConfig, settings: &RunSettings) -> Result<()> {
    let sink = Arc::new(CollectingSink::new());
    let session = LogSession::open_with(&settings.tag_file, config.decoder.clone(), sink.clone())
        .with_context(|| format!("Failed to open log session: {:?}", settings.tag_file))?;

    let mut out = open_output(settings)?;

    match settings.format {
        OutputFormat::Tags => {
            report::print_tags(&mut *out, session.tags())?;
        }
        OutputFormat::Summary => {
            let mut summary = report::SessionSummary::new();
            let mut samples = session.samples()?;
            for sample in samples.by_ref().take(settings.limit.unwrap_or(usize::MAX)) {
                summary.record(&sample);
            }
            summary.termination = samples.termination();
            summary.diagnostics = sink.diagnostics();
            summary.print(&mut *out, session.tag_file(), session.value_file(), session.tags())?;
        }
        OutputFormat::Samples => {
            let samples = session.samples()?;
            let count = export::write_samples(&mut *out, samples.take(settings.limit.unwrap_or(usize::MAX)))?;
            log::info!("Wrote {} samples", count);
        }
        OutputFormat::Table => {
            let samples = session.samples()?;
            let mut table = WideTable::from_samples(samples.take(settings.limit.unwrap_or(usize::MAX)));
            if !settings.columns.is_empty() {
                for missing in settings.columns.iter().filter(|c| !table.columns().contains(*c)) {
                    match session.tags().find_by_name(missing) {
                        Some(tag) => log::warn!("Column {:?} (index {}) has no samples", missing, tag.index),
                        None => log::warn!("Column {:?} is not defined in the tag file", missing),
                    }
                }
                table = table.select(settings.columns.as_slice());
            }
            log::info!("Table: {} rows x {} columns", table.row_count(), table.column_count());
            export::write_table(&mut *out, &table)?;
        }
    }

    out.flush()?;

    // The summary already lists diagnostics; other formats surface them as warnings
    if settings.format != OutputFormat::Summary {
        for diagnostic in sink.diagnostics() {
            log::warn!("{}", diagnostic);
        }
    }

    Ok(())
}

fn open_output(settings: &RunSettings) -> Result<Box<dyn Write>> {
    Ok(match &settings.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
