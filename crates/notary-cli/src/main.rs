//! `notary`: tokens, canonical text, chain verification and ledger export.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{ExportArgs, LedgerSource, ReaderArgs};

#[derive(Parser)]
#[command(name = "notary")]
#[command(about = "Read, verify and export notary ledgers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token of a JSON value
    Token {
        /// JSON file (stdin if absent)
        file: Option<PathBuf>,
    },

    /// Print the canonical text of a JSON value
    Canonicalize {
        /// JSON file (stdin if absent)
        file: Option<PathBuf>,
    },

    /// Verify ledger snapshots from their head back to genesis
    Verify {
        /// IDENTITY=SNAPSHOT, repeatable
        #[arg(long = "ledger", required = true)]
        ledgers: Vec<LedgerSource>,

        #[command(flatten)]
        reader: ReaderArgs,
    },

    /// Read ledgers and print the selected statements as JSON
    Export {
        /// IDENTITY=SNAPSHOT, repeatable
        #[arg(long = "ledger")]
        ledgers: Vec<LedgerSource>,

        #[command(flatten)]
        reader: ReaderArgs,

        #[command(flatten)]
        export: ExportArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Token { file } => {
            let value = commands::read_json(file.as_deref())?;
            println!("{}", commands::token(&value)?);
        }
        Commands::Canonicalize { file } => {
            let value = commands::read_json(file.as_deref())?;
            println!("{}", commands::canonicalize(&value)?);
        }
        Commands::Verify { ledgers, reader } => {
            let (report, failed) = commands::verify(&ledgers, &reader).await?;
            for line in &report {
                println!("{}", line);
            }
            if failed > 0 {
                bail!("{} of {} ledgers failed verification", failed, ledgers.len());
            }
        }
        Commands::Export {
            ledgers,
            reader,
            export,
        } => {
            let output = commands::export(&ledgers, &reader, &export).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
