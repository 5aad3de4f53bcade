//! Snapshot stage
//!
//! Preserves the working tree before riskier work (a `package` run starts
//! with one). `copy` collects the configured file set into a dated directory
//! under the snapshot root, `zip` packs that directory into a tar next to
//! it, and `prune` deletes the oldest snapshots beyond the configured
//! retention count.
//!
//! The dated directory name is fixed at construction time, so `copy` and
//! `zip` agree on it even across a slow run.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Local;
use console::Color;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::archive::pack_dir;
use crate::args::{resolve_args, StageArgs};
use crate::error::{Error, Result};
use crate::files::FileOps;
use crate::output::{Logger, OutputConfig};
use crate::stages::Stage;

/// Configuration for a snapshot run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SnapshotArgs {
    #[serde(flatten)]
    pub shared: StageArgs,
    /// Directory the dated snapshots live under
    pub snapshot_dir: String,
    /// Glob patterns of the files a snapshot preserves
    pub include: Vec<String>,
    /// How many snapshots `prune` retains
    pub keep: u32,
}

impl Default for SnapshotArgs {
    fn default() -> Self {
        Self {
            shared: StageArgs::default(),
            snapshot_dir: ".stagehand-snapshots".to_string(),
            include: vec![
                "src/**/*".to_string(),
                "package.json".to_string(),
                "README.md".to_string(),
            ],
            keep: 5,
        }
    }
}

/// The snapshot stage: `copy` → `zip` → `prune`.
pub struct SnapshotStage {
    args: SnapshotArgs,
    ops: FileOps,
    logger: Logger,
    /// Dated name of this run's snapshot, fixed at construction
    snapshot_name: String,
}

impl SnapshotStage {
    pub fn new(root: &Path, overrides: Option<&JsonValue>, output: &OutputConfig) -> Result<Self> {
        let args: SnapshotArgs = resolve_args("snapshot", &SnapshotArgs::default(), overrides)?;
        let ops = FileOps::new(root, args.shared.dry_run);
        let logger = Logger::for_stage(&args.shared, Color::Blue, output.clone());
        let snapshot_name = format!(
            "{}-{}",
            args.shared.project.label(),
            Local::now().format("%Y%m%d-%H%M%S")
        );
        Ok(Self {
            args,
            ops,
            logger,
            snapshot_name,
        })
    }

    pub fn args(&self) -> &SnapshotArgs {
        &self.args
    }

    /// Absolute path of this run's snapshot directory.
    pub fn snapshot_path(&self) -> PathBuf {
        self.ops
            .resolve_path([&self.args.snapshot_dir, &self.snapshot_name])
    }

    fn copy(&self) -> Result<()> {
        let sources = self.ops.glob(&self.args.include)?;
        let dest = self.snapshot_path();
        self.logger.progress_log(
            1,
            &format!(
                "copying {} file(s) into {}",
                sources.len(),
                self.ops.relative_path(&dest).display()
            ),
        );
        self.ops.copy(&sources, &dest)?;
        Ok(())
    }

    /// Tar path next to `dir`. Built by appending, not `with_extension`,
    /// because dotted labels like `widget@1.4.0` would lose their tail.
    fn tar_sibling(dir: &Path) -> PathBuf {
        let mut name = dir.as_os_str().to_os_string();
        name.push(".tar");
        PathBuf::from(name)
    }

    fn zip(&self) -> Result<()> {
        let dir = self.snapshot_path();
        let dest = Self::tar_sibling(&dir);
        self.logger.progress_log(1, "packing snapshot");
        let written = pack_dir(&self.ops, &dir, &dest)?;
        self.logger
            .verbose_log(2, &self.ops.relative_path(&written).display().to_string());
        Ok(())
    }

    fn prune(&self) -> Result<()> {
        let root = self.ops.resolve_path([&self.args.snapshot_dir]);
        if !root.is_dir() {
            return Ok(());
        }

        // Dated names sort chronologically, so lexical order is age order.
        let mut snapshots: Vec<PathBuf> = fs::read_dir(&root)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        snapshots.sort();

        let keep = self.args.keep as usize;
        if snapshots.len() <= keep {
            self.logger.verbose_log(1, "nothing to prune");
            return Ok(());
        }

        let stale = snapshots.len() - keep;
        self.logger
            .progress_log(1, &format!("pruning {} old snapshot(s)", stale));
        let mut doomed = Vec::new();
        for dir in snapshots.into_iter().take(stale) {
            let tar = Self::tar_sibling(&dir);
            if tar.exists() {
                doomed.push(tar);
            }
            doomed.push(dir);
        }
        self.ops.delete(&doomed)
    }
}

#[async_trait]
impl Stage for SnapshotStage {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn sub_stages(&self) -> &'static [&'static str] {
        &["copy", "zip", "prune"]
    }

    fn shared(&self) -> &StageArgs {
        &self.args.shared
    }

    fn logger(&self) -> &Logger {
        &self.logger
    }

    fn emoji(&self) -> &'static str {
        "📸"
    }

    fn verbs(&self) -> (&'static str, &'static str) {
        ("snapshotting", "snapshotted")
    }

    async fn dispatch(&mut self, sub_stage: &str) -> Result<()> {
        match sub_stage {
            "copy" => self.copy(),
            "zip" => self.zip(),
            "prune" => self.prune(),
            other => Err(Error::UnknownSubStage {
                stage: self.name().to_string(),
                name: other.to_string(),
            }),
        }
    }
}
