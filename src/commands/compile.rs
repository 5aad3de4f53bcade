//! Compile command implementation

use anyhow::Result;
use clap::Args;

use stagehand::output::OutputConfig;
use stagehand::stages::{CompileStage, Stage};

use super::StageFlags;

/// Arguments for the compile command
#[derive(Args, Debug)]
pub struct CompileArgs {
    #[command(flatten)]
    pub flags: StageFlags,
}

/// Execute the compile command
pub async fn execute(args: CompileArgs, output: &OutputConfig) -> Result<()> {
    let overrides = super::assemble_overrides("compile", &[], &args.flags)?;
    let cwd = std::env::current_dir()?;
    let mut stage = CompileStage::new(&cwd, Some(&overrides), output)?;
    stage.run().await?;
    Ok(())
}
