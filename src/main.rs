//! # Blocklens CLI
//!
//! Structured analysis of Bitcoin transactions and on-disk blocks.
//!
//! ## Usage
//!
//! ```bash
//! # Analyze a raw transaction fixture
//! blocklens tx fixture.json
//!
//! # Analyze the first block of a blk file with its undo data
//! blocklens block blk00000.dat rev00000.dat xor.dat
//! ```
//!
//! Results are printed to stdout as JSON and written to the output
//! directory, one document per transaction or block. Failures print an
//! `{ok: false, error: {code, message}}` record and exit non-zero.

use blocklens::config::files;
use blocklens::error::{AnalyzerError, AnalyzerResult};
use blocklens::{BlockAnalyzer, Fixture, NetworkTag, TransactionAnalyzer};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "blocklens")]
#[command(about = "Bitcoin block and transaction analyzer")]
struct Cli {
    /// Directory for analysis output documents
    #[arg(long, default_value = files::DEFAULT_OUT_DIR)]
    out_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a raw transaction fixture (JSON)
    Tx {
        /// Path to the fixture file
        fixture: PathBuf,
    },
    /// Analyze the first block of a blk file
    Block {
        /// Path to the blk*.dat file
        blk: PathBuf,
        /// Path to the matching rev*.dat undo file
        rev: PathBuf,
        /// Path to the XOR obfuscation key file
        xor: PathBuf,
        /// Network for address encoding
        #[arg(long, default_value = "mainnet")]
        network: NetworkTag,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // Help and version output keep clap's own rendering
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            print_error(&AnalyzerError::InvalidArgs {
                message: err.to_string(),
            });
            std::process::exit(1);
        }
    };

    let outcome = match cli.command {
        Commands::Tx { ref fixture } => run_tx_mode(fixture, &cli.out_dir),
        Commands::Block {
            ref blk,
            ref rev,
            ref xor,
            network,
        } => run_block_mode(blk, rev, xor, network, &cli.out_dir),
    };

    if let Err(err) = outcome {
        print_error(&err);
        std::process::exit(1);
    }
}

fn run_tx_mode(fixture_path: &Path, out_dir: &Path) -> AnalyzerResult<()> {
    let fixture_data = fs::read_to_string(fixture_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AnalyzerError::FileNotFound {
                path: fixture_path.display().to_string(),
            }
        } else {
            AnalyzerError::from(e)
        }
    })?;

    let fixture: Fixture = serde_json::from_str(&fixture_data)
        .map_err(|e| AnalyzerError::fixture(e.to_string()))?;
    debug!(network = %fixture.network, prevouts = fixture.prevouts.len(), "loaded fixture");

    let record = TransactionAnalyzer::analyze_fixture(&fixture)?;
    emit(out_dir, &format!("{}.json", record.txid), &record)
}

fn run_block_mode(
    blk: &Path,
    rev: &Path,
    xor: &Path,
    network: NetworkTag,
    out_dir: &Path,
) -> AnalyzerResult<()> {
    let record = BlockAnalyzer::new(network).analyze_files(blk, rev, xor)?;
    emit(
        out_dir,
        &format!("{}.json", record.block_header.block_hash),
        &record,
    )
}

/// Write the record to the output directory and echo it to stdout
fn emit<T: Serialize>(out_dir: &Path, file_name: &str, record: &T) -> AnalyzerResult<()> {
    let json = serde_json::to_string_pretty(record)
        .map_err(|e| AnalyzerError::from(std::io::Error::other(e)))?;

    fs::create_dir_all(out_dir)?;
    fs::write(out_dir.join(file_name), &json)?;

    println!("{}", json);
    Ok(())
}

fn print_error(err: &AnalyzerError) {
    #[derive(Serialize)]
    struct ErrorOutput {
        ok: bool,
        error: blocklens::ErrorRecord,
    }

    let output = ErrorOutput {
        ok: false,
        error: err.to_record(),
    };
    if let Ok(json) = serde_json::to_string(&output) {
        println!("{}", json);
    }
    eprintln!("Error: {}", err);
}
