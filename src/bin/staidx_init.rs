use std::io::{self, Write};

use anyhow::Context;
use clap::Parser;
use staidx_init::{prompt::Prompter, Error, Initializer, DATA_FILE, INDEX_FILE};
use tokio::io::BufReader;
use tracing::info;

const EXIT_CANCELED: i32 = 130;

/// Create an empty staidx0.mul and statics0.mul in the current directory.
#[derive(Parser)]
#[command(version)]
struct Args {}

fn main() {
    let _args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")
    {
        Ok(rt) => rt,
        Err(err) => fail(err),
    };

    // A stdin read may still be in flight after cancellation, so errors exit
    // without dropping the runtime.
    if let Err(err) = rt.block_on(run()) {
        fail(err);
    }
}

fn fail(err: anyhow::Error) -> ! {
    if let Some(Error::Canceled) = err.downcast_ref::<Error>() {
        eprintln!("\n{err}");
        std::process::exit(EXIT_CANCELED);
    }
    eprintln!("error: {err:#}");
    std::process::exit(1);
}

async fn run() -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "== Create empty {INDEX_FILE}/{DATA_FILE} ==")?;
    writeln!(
        stdout,
        "Each block is 8×8 tiles. You will enter block counts, not tiles.\n"
    )?;

    let mut prompter = Prompter::new(BufReader::new(tokio::io::stdin()), stdout);
    // The interrupt handler is installed on first poll, before any prompt
    // is shown.
    let dims = tokio::select! {
        biased;
        _ = tokio::signal::ctrl_c() => return Err(Error::Canceled.into()),
        dims = prompter.read_dimensions() => dims?,
    };
    info!(?dims, "dimensions accepted");

    let summary = Initializer::new(".").run(dims)?;

    let mut stdout = prompter.into_inner();
    writeln!(stdout, "\n{summary}")?;
    Ok(())
}
