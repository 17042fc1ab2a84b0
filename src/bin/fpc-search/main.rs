use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use tracing::info;

use fpc::{
    helpers::{f64s_from_le_bytes, ByteCounter},
    FpcCodec,
};

// Tries every table size on one file and reports the compressed sizes.
// Each codec runs single threaded, the sizes are spread over the rayon pool.

#[derive(Parser)]
#[command(name = "fpc-search", about = "Find the best predictor table size for a raw f64 file")]
struct Cli {
    path: PathBuf,
    #[arg(long, default_value_t = 4)]
    min: u32,
    /// Each size in flight holds 2 * 8 * 2^size bytes of tables
    #[arg(long, default_value_t = 20)]
    max: u32,
    /// Sizes searched at once, 0 for one per core
    #[arg(short, long, default_value_t = 4)]
    jobs: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    fpc::logging::setup_logging("info");

    let raw = std::fs::read(&cli.path)?;
    let values = f64s_from_le_bytes(&raw).context("file is not a whole number of f64s")?;

    let pool = rayon::ThreadPoolBuilder::new().num_threads(cli.jobs).build()?;
    let timer = Instant::now();
    let mut results = pool.install(|| {
        (cli.min..=cli.max)
            .into_par_iter()
            .map(|log_table_size| exec(&values, log_table_size))
            .collect::<Result<Vec<_>>>()
    })?;
    results.sort_by_key(|&(_, csize)| csize);

    for &(log_table_size, csize) in &results {
        info!(log_table_size, csize, ratio = fpc::helpers::ratio(csize, values.len()));
    }
    if let Some(&(log_table_size, csize)) = results.first() {
        info!(log_table_size, csize, elapsed = ?timer.elapsed(), "best");
    }
    Ok(())
}

fn exec(values: &[f64], log_table_size: u32) -> Result<(u32, usize)> {
    let mut codec = FpcCodec::new(log_table_size)?;
    let mut writer = ByteCounter::new();
    codec.encode(values, &mut writer)?;
    Ok((log_table_size, writer.count()))
}
