//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `stagehand` command-line tool. Each subcommand is defined in its own file
//! to keep the logic separated and maintainable.
//!
//! ## Structure
//!
//! Each stage command module contains:
//! - An `Args` struct that flattens the shared [`StageFlags`], derived using
//!   `clap`.
//! - An `execute` function that assembles the stage's override object (file
//!   layer, then CLI flags, rightmost wins), constructs the stage, and
//!   awaits its full run.
//!
//! The override object is the command layer's whole contribution: all
//! configuration semantics live in the library's merge engine and stage
//! types.

pub mod build;
pub mod compile;
pub mod completions;
pub mod document;
pub mod package;
pub mod snapshot;

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde_json::{json, Map, Value as JsonValue};

use stagehand::config::{resolve_config_path, ProjectFile};

/// Flags shared by every stage subcommand.
///
/// Each recognized flag populates one field of the stage's override object;
/// unset flags leave the file layer and stage defaults alone.
#[derive(Args, Debug)]
pub struct StageFlags {
    /// Run only the named sub-stages (repeatable)
    #[arg(long, value_name = "SUB-STAGE")]
    pub only: Vec<String>,

    /// Skip the named sub-stages (repeatable)
    #[arg(long, value_name = "SUB-STAGE")]
    pub without: Vec<String>,

    /// Path to the project config file
    #[arg(short, long, value_name = "PATH", env = "STAGEHAND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show detailed progress information
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit debug detail on the log facade
    #[arg(long)]
    pub debug: bool,

    /// Show what would be done without making changes
    #[arg(short = 'n', long = "dryrun")]
    pub dry_run: bool,

    /// Mark this run as part of a package invocation
    #[arg(long)]
    pub packaging: bool,

    /// Mark this run as part of a release
    #[arg(long)]
    pub releasing: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Base indentation depth for progress lines
    #[arg(long, value_name = "N")]
    pub log_base_level: Option<u8>,

    /// Watcher event kind that triggered this run
    #[arg(long, value_name = "EVENT", requires = "watch_path")]
    pub watch_event: Option<String>,

    /// Path the watcher event fired for
    #[arg(long, value_name = "PATH", requires = "watch_event")]
    pub watch_path: Option<String>,
}

impl StageFlags {
    /// The override entries these flags contribute. Unset flags contribute
    /// nothing, so they never clobber the file layer.
    pub fn as_overrides(&self) -> JsonValue {
        let mut map = Map::new();
        if !self.only.is_empty() {
            map.insert("only".to_string(), json!(self.only));
        }
        if !self.without.is_empty() {
            map.insert("without".to_string(), json!(self.without));
        }
        if self.verbose {
            map.insert("verbose".to_string(), json!(true));
        }
        if self.debug {
            map.insert("debug".to_string(), json!(true));
        }
        if self.dry_run {
            map.insert("dry-run".to_string(), json!(true));
        }
        if self.packaging {
            map.insert("packaging".to_string(), json!(true));
        }
        if self.releasing {
            map.insert("releasing".to_string(), json!(true));
        }
        if self.quiet {
            map.insert("progress".to_string(), json!(false));
        }
        if let Some(level) = self.log_base_level {
            map.insert("log-base-level".to_string(), json!(level));
        }
        if let (Some(event), Some(path)) = (&self.watch_event, &self.watch_path) {
            map.insert(
                "watch".to_string(),
                json!({ "event": event, "path": path }),
            );
        }
        JsonValue::Object(map)
    }
}

/// Assemble a stage's complete override object: the project file's tables
/// (the named stage's plus its children's), then the CLI flags on top.
pub fn assemble_overrides(
    stage: &str,
    children: &[&str],
    flags: &StageFlags,
) -> Result<JsonValue> {
    let cwd = std::env::current_dir()?;
    let path = resolve_config_path(flags.config.as_deref(), &cwd);
    let file = ProjectFile::load(&path)?.unwrap_or_default();
    let mut overrides = file.stage_overrides_with_children(stage, children)?;

    // CLI flags win over the file layer.
    let flag_layer = flags.as_overrides();
    if let (Some(base), Some(extra)) = (overrides.as_object_mut(), flag_layer.as_object()) {
        for (key, value) in extra {
            base.insert(key.clone(), value.clone());
        }
    }

    log::debug!("resolved overrides for '{}': {}", stage, overrides);
    Ok(overrides)
}
