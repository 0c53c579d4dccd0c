use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

mod dataset;
mod report;

#[derive(Debug, Parser)]
#[command(name = "latency-report")]
#[command(about = "Summarize memory latency benchmark results as cache and TLB tables")]
struct Cli {
    /// Input CSV file produced by the memory latency benchmark
    filename: PathBuf,

    /// Verbose debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let file = File::open(&cli.filename)
        .with_context(|| format!("Failed to open input file: {}", cli.filename.display()))?;

    let records = dataset::load_measurements(file)
        .with_context(|| format!("Failed to load measurements from {}", cli.filename.display()))?;
    log::debug!("Loaded {} measurement records", records.len());

    let dataset = measurements::derive_metrics(&records)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::print_cache_table(&mut out, &dataset)?;
    report::print_tlb_table(&mut out, &dataset)?;
    out.flush()?;

    Ok(())
}
