//! Build command implementation
//!
//! The build command drives the composite everyday pipeline:
//! 1. Compile the sources into dist
//! 2. Rewrite placeholder tokens in the compiled output
//! 3. Run the typecheck and unit-test commands
//! 4. Generate the API documentation
//!
//! The compile, test, and document steps run as child stages; their
//! top-level config tables are forwarded along with this command's own.

use anyhow::Result;
use clap::Args;

use stagehand::output::OutputConfig;
use stagehand::stages::{BuildStage, Stage};

use super::StageFlags;

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub flags: StageFlags,
}

/// Execute the build command
pub async fn execute(args: BuildArgs, output: &OutputConfig) -> Result<()> {
    let overrides =
        super::assemble_overrides("build", &["compile", "test", "document"], &args.flags)?;
    let cwd = std::env::current_dir()?;
    let mut stage = BuildStage::new(&cwd, Some(&overrides), output)?;
    stage.run().await?;
    Ok(())
}
