use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use station_stats::config::{default_parallelism, parse_size};
use station_stats::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_MAX_RECORD_LEN, DEFAULT_REPORT_PRECISION, ENV_CHUNK_SIZE,
    ENV_MAX_RECORD_LEN, ENV_THREADS,
};
use station_stats::generate::{generate_file, load_stations, GenerateOptions};
use station_stats::{aggregate, write_report_file, ByteSource, Config, Decoder, ReportOptions};

#[derive(Debug, Parser)]
#[command(version, about = "Per-station min/mean/max over large `station;value` files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Aggregate an input file and write the CSV report.
    Run(RunArgs),
    /// Write a synthetic input file.
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    #[arg(default_value = "measurements.txt")]
    input: PathBuf,
    #[arg(short, long, default_value = "output.txt")]
    output: PathBuf,
    /// Target bytes per chunk; accepts K/M/G suffixes.
    #[arg(long, env = ENV_CHUNK_SIZE, value_parser = parse_size, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
    /// Worker threads; defaults to the number of available cores.
    #[arg(short = 'j', long, env = ENV_THREADS)]
    threads: Option<usize>,
    /// Longest record the chunk planner will search past.
    #[arg(long, env = ENV_MAX_RECORD_LEN, value_parser = parse_size, default_value_t = DEFAULT_MAX_RECORD_LEN)]
    max_record_len: usize,
    /// `fixed` for one-decimal inputs, `lexical` for general decimals.
    #[arg(long, default_value_t = Decoder::FixedPoint)]
    decoder: Decoder,
    #[arg(long, default_value_t = DEFAULT_REPORT_PRECISION)]
    precision: usize,
    /// Sort report rows by station name.
    #[arg(long)]
    sort: bool,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[arg(default_value = "measurements.txt")]
    output: PathBuf,
    #[arg(short, long, default_value_t = 1_000_000)]
    rows: u64,
    /// File with one station name per line; a built-in list is used otherwise.
    #[arg(long)]
    stations: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Run(args) => run(args),
        Command::Generate(args) => generate(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let config = Config {
        chunk_size: args.chunk_size,
        parallelism: args.threads.unwrap_or_else(default_parallelism),
        max_record_len: args.max_record_len,
        decoder: args.decoder,
    };
    let source = ByteSource::open(&args.input)?;
    let result = aggregate(&source, &config)
        .with_context(|| format!("aggregating {}", args.input.display()))?;
    if result.stats.skipped > 0 {
        info!(skipped = result.stats.skipped, "malformed lines were left out of the report");
    }

    let options = ReportOptions { precision: args.precision, sorted: args.sort };
    write_report_file(&args.output, &result.stations, options)?;
    Ok(())
}

fn generate(args: GenerateArgs) -> Result<()> {
    let mut options = GenerateOptions { rows: args.rows, seed: args.seed, ..GenerateOptions::default() };
    if let Some(path) = &args.stations {
        options.stations = load_stations(path)?;
    }
    generate_file(&args.output, &options)?;
    Ok(())
}
