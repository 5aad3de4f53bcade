//! Document command implementation

use anyhow::Result;
use clap::Args;

use stagehand::output::OutputConfig;
use stagehand::stages::{DocumentStage, Stage};

use super::StageFlags;

/// Arguments for the document command
#[derive(Args, Debug)]
pub struct DocumentArgs {
    #[command(flatten)]
    pub flags: StageFlags,
}

/// Execute the document command
pub async fn execute(args: DocumentArgs, output: &OutputConfig) -> Result<()> {
    let overrides = super::assemble_overrides("document", &[], &args.flags)?;
    let cwd = std::env::current_dir()?;
    let mut stage = DocumentStage::new(&cwd, Some(&overrides), output)?;
    stage.run().await?;
    Ok(())
}
