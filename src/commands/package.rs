//! Package command implementation
//!
//! The package command drives the full release pipeline:
//! 1. Preserve a dated snapshot of the working tree
//! 2. Run the composite build with `packaging` set
//! 3. Assemble the publishable file set into the release directory
//! 4. Pack the release directory into a tar
//!
//! The snapshot and build steps run as child stages; the build child's own
//! children (compile, test, document) receive their config tables through
//! it, so every stage table in `.stagehand.toml` applies to a package run.

use anyhow::Result;
use clap::Args;

use stagehand::output::OutputConfig;
use stagehand::stages::{PackageStage, Stage};

use super::StageFlags;

/// Arguments for the package command
#[derive(Args, Debug)]
pub struct PackageArgs {
    #[command(flatten)]
    pub flags: StageFlags,
}

/// Execute the package command
pub async fn execute(args: PackageArgs, output: &OutputConfig) -> Result<()> {
    let overrides = super::assemble_overrides(
        "package",
        &["snapshot", "build", "compile", "test", "document"],
        &args.flags,
    )?;
    let cwd = std::env::current_dir()?;
    let mut stage = PackageStage::new(&cwd, Some(&overrides), output)?;
    stage.run().await?;
    Ok(())
}
