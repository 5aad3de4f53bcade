//! # Stagehand CLI
//!
//! This is the binary entry point for the `stagehand` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate stage based on the parsed arguments.
//! - Handling top-level application errors and translating them into
//!   user-friendly output.
//!
//! The core application logic is defined in the `lib.rs` library crate,
//! ensuring that the binary is a thin wrapper around the reusable library
//! functionality. The runtime is single-threaded: stages run strictly in
//! sequence, and the only internal concurrency is the merge engine's
//! sibling fan-out.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute().await
}
