// Compresses raw little endian f64 files into .fpc files and back.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, ensure, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use fpc::helpers::{cmp, f64s_from_le_bytes, f64s_to_le_bytes, ratio};
use fpc::io::SliceSource;
use fpc::{encoded_len_bound, FpcCodec, DEFAULT_LOG_TABLE_SIZE};

/// Log table size byte + value count
const CONTAINER_HEADER_LEN: usize = 1 + 8;

#[derive(Clone, Copy, ValueEnum)]
enum Action {
    /// <file> -> <file>.fpc
    #[value(alias = "c")]
    Compress,
    /// <file>.fpc -> <file>.orig
    #[value(alias = "d")]
    Decompress,
    /// compress + decompress + compare
    #[value(alias = "t")]
    Test,
}

#[derive(Parser)]
#[command(name = "fpc", version, about = "Lossless compressor for raw f64 files")]
struct Cli {
    action: Action,
    /// A single file, or a directory (shallow traversed)
    path: PathBuf,
    /// log2 of the predictor table size, both directions must use the same
    #[arg(short, long, default_value_t = DEFAULT_LOG_TABLE_SIZE, env = "FPC_LOG_TABLE_SIZE")]
    log_table_size: u32,
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    fpc::logging::setup_logging(if cli.verbose { "debug" } else { "info" });

    if cli.path.is_dir() {
        for entry in fs::read_dir(&cli.path)? {
            let file_path = entry?.path();
            if file_path.is_file() {
                run(&file_path, cli.action, cli.log_table_size)?;
            }
        }
    } else if cli.path.is_file() {
        run(&cli.path, cli.action, cli.log_table_size)?;
    } else {
        bail!("{} is neither a file nor a directory", cli.path.display());
    }

    Ok(())
}

fn run(file_path: &Path, action: Action, log_table_size: u32) -> Result<()> {
    let mut out_path = std::env::current_dir()?;
    out_path.push(file_path.file_name().context("invalid file name")?);

    let compress_path = out_path.with_extension("fpc");
    let decompress_path = out_path.with_extension("orig");

    let timer = Instant::now();
    match action {
        Action::Compress => {
            compress(file_path, &compress_path, log_table_size)?;
            info!(file = %file_path.display(), elapsed = ?timer.elapsed(), "compressed");
        }
        Action::Decompress => {
            decompress(file_path, &decompress_path)?;
            info!(file = %file_path.display(), elapsed = ?timer.elapsed(), "decompressed");
        }
        Action::Test => {
            compress(file_path, &compress_path, log_table_size)?;
            info!(file = %file_path.display(), elapsed = ?timer.elapsed(), "compressed");
            let timer = Instant::now();
            decompress(&compress_path, &decompress_path)?;
            info!(file = %compress_path.display(), elapsed = ?timer.elapsed(), "decompressed");

            match cmp(file_path, &decompress_path)? {
                None => info!("compare: OK"),
                Some(pos) => bail!("{} differs at byte {pos}", decompress_path.display()),
            }
        }
    }

    Ok(())
}

fn compress(input_file: &Path, output_file: &Path, log_table_size: u32) -> Result<()> {
    let raw = fs::read(input_file).with_context(|| format!("reading {}", input_file.display()))?;
    let Some(values) = f64s_from_le_bytes(&raw) else {
        bail!("{} is {} bytes, not a whole number of f64s", input_file.display(), raw.len());
    };

    let mut codec = FpcCodec::new(log_table_size)?;
    let mut out = Vec::with_capacity(CONTAINER_HEADER_LEN + encoded_len_bound(values.len()));
    out.push(u8::try_from(log_table_size)?);
    out.extend_from_slice(&(values.len() as u64).to_be_bytes());
    let written = codec.encode(&values, &mut out)?;

    info!(
        values = values.len(),
        csize = written,
        ratio = ratio(written, values.len()),
        "encoded"
    );
    fs::write(output_file, out)?;
    Ok(())
}

fn decompress(input_file: &Path, output_file: &Path) -> Result<()> {
    let buf = fs::read(input_file).with_context(|| format!("reading {}", input_file.display()))?;
    ensure!(buf.len() >= CONTAINER_HEADER_LEN, "{} is too short for an fpc file", input_file.display());

    let log_table_size = u32::from(buf[0]);
    let count = u64::from_be_bytes(buf[1..CONTAINER_HEADER_LEN].try_into()?);
    let count = usize::try_from(count)?;
    // every record is at least its header byte
    ensure!(
        count.div_ceil(2) <= buf.len() - CONTAINER_HEADER_LEN,
        "{} claims {count} values, too many for its size",
        input_file.display()
    );

    let mut codec = FpcCodec::new(log_table_size)?;
    let mut source = SliceSource::new(&buf[CONTAINER_HEADER_LEN..]);
    let values = codec.decode(&mut source, count)?;

    let trailing = buf.len() - CONTAINER_HEADER_LEN - source.position();
    if trailing > 0 {
        warn!(trailing, "ignoring bytes after the last record");
    }
    fs::write(output_file, f64s_to_le_bytes(&values))?;
    Ok(())
}
