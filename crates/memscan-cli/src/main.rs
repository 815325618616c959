mod commands;
mod repl;

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use memscan_core::{ProcessHandle, ScanConfig, ScanSession, ValueType};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "memscan")]
#[command(about = "Interactive exact-value memory scanner")]
struct Args {
    /// Process ID to scan
    #[arg(short, long, env = "MEMSCAN_PID")]
    pid: u32,

    /// Value type: byte, 2bytes, 4bytes or 8bytes
    #[arg(
        short = 't',
        long = "type",
        env = "MEMSCAN_VALUE_TYPE",
        default_value = "4bytes"
    )]
    value_type: ValueType,

    /// Bytes per bulk read during a first scan
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Maximum rows kept in the results table
    #[arg(long)]
    max_results: Option<usize>,

    /// Log every region and chunk decision
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let directive = if args.verbose {
        "memscan=debug"
    } else {
        "memscan=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(io::stderr)
        .init();

    let mut builder = ScanConfig::builder();
    if let Some(bytes) = args.chunk_size {
        builder = builder.chunk_size(bytes);
    }
    if let Some(rows) = args.max_results {
        builder = builder.max_results(rows);
    }

    let process = ProcessHandle::open(args.pid)
        .with_context(|| format!("Cannot attach to process {}", args.pid))?;
    info!("Attached to process {}", process.pid);

    let mut session = ScanSession::with_config(builder.build());
    session.set_value_type(args.value_type);

    let stdin = io::stdin();
    repl::run(&process, &mut session, stdin.lock(), io::stdout())
}
