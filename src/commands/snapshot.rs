//! Snapshot command implementation

use anyhow::Result;
use clap::Args;

use stagehand::output::OutputConfig;
use stagehand::stages::{SnapshotStage, Stage};

use super::StageFlags;

/// Arguments for the snapshot command
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    #[command(flatten)]
    pub flags: StageFlags,
}

/// Execute the snapshot command
pub async fn execute(args: SnapshotArgs, output: &OutputConfig) -> Result<()> {
    let overrides = super::assemble_overrides("snapshot", &[], &args.flags)?;
    let cwd = std::env::current_dir()?;
    let mut stage = SnapshotStage::new(&cwd, Some(&overrides), output)?;
    stage.run().await?;
    Ok(())
}
