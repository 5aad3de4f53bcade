//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;

use stagehand::output::OutputConfig;

use crate::commands;

/// Stagehand - staged build pipeline for npm-style library packages
#[derive(Parser, Debug)]
#[command(name = "stagehand")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Stage to run
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile the package sources into the dist directory
    Compile(commands::compile::CompileArgs),

    /// Run the package's typecheck and unit-test commands
    Test(commands::test::TestArgs),

    /// Generate the package's API documentation
    Document(commands::document::DocumentArgs),

    /// Preserve a dated snapshot of the working tree
    Snapshot(commands::snapshot::SnapshotArgs),

    /// Compile, rewrite placeholders, test, and document
    Build(commands::build::BuildArgs),

    /// Snapshot, build, and assemble a publishable release
    Package(commands::package::PackageArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(Env::default().default_filter_or(&self.log_level)).init();
        let output = OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Compile(args) => commands::compile::execute(args, &output).await,
            Commands::Test(args) => commands::test::execute(args, &output).await,
            Commands::Document(args) => commands::document::execute(args, &output).await,
            Commands::Snapshot(args) => commands::snapshot::execute(args, &output).await,
            Commands::Build(args) => commands::build::execute(args, &output).await,
            Commands::Package(args) => commands::package::execute(args, &output).await,
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
