//! Package stage
//!
//! The full release pipeline: `snapshot` preserves the working tree, `build`
//! runs the composite build with `packaging` set, `copy` assembles the
//! publishable file set into `release/<name>@<version>/`, and `zip` packs
//! that directory into a tar.
//!
//! An existing release directory is only replaced after a confirmation
//! prompt, which races against a timeout so unattended runs never hang.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use console::Color;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::archive::pack_dir;
use crate::args::{resolve_args, OneOrMany, StageArgs};
use crate::error::{Error, Result};
use crate::files::FileOps;
use crate::output::{Logger, OutputConfig};
use crate::prompt::{confirm, PromptOpts};
use crate::stages::{child_overrides, BuildStage, SnapshotStage, Stage};

fn default_package_files() -> Vec<String> {
    vec![
        "dist/**/*".to_string(),
        "package.json".to_string(),
        "README.md".to_string(),
        "LICENSE*".to_string(),
    ]
}

/// Configuration for a package run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PackageArgs {
    #[serde(flatten)]
    pub shared: StageArgs,
    /// Directory release artifacts land under
    pub release_dir: String,
    /// Glob patterns of the publishable file set
    pub files: Vec<String>,
    /// Prompt behavior when the release directory already exists
    pub prompt: PromptOpts,
    /// Filters forwarded to the snapshot child as its `only`/`without`
    pub only_snapshot: Option<OneOrMany>,
    pub without_snapshot: Option<OneOrMany>,
    /// Filters forwarded to the build child
    pub only_build: Option<OneOrMany>,
    pub without_build: Option<OneOrMany>,
    /// Override table forwarded to the snapshot child
    pub snapshot: Option<JsonValue>,
    /// Override table forwarded to the build child
    pub build: Option<JsonValue>,
    /// Override tables riding through the build child to its own children
    pub compile: Option<JsonValue>,
    pub test: Option<JsonValue>,
    pub document: Option<JsonValue>,
}

impl Default for PackageArgs {
    fn default() -> Self {
        Self {
            shared: StageArgs::default(),
            release_dir: "release".to_string(),
            files: default_package_files(),
            prompt: PromptOpts::default(),
            only_snapshot: None,
            without_snapshot: None,
            only_build: None,
            without_build: None,
            snapshot: None,
            build: None,
            compile: None,
            test: None,
            document: None,
        }
    }
}

/// The package stage: `snapshot` → `build` → `copy` → `zip`.
pub struct PackageStage {
    args: PackageArgs,
    root: PathBuf,
    ops: FileOps,
    logger: Logger,
    output: OutputConfig,
}

impl PackageStage {
    pub fn new(root: &Path, overrides: Option<&JsonValue>, output: &OutputConfig) -> Result<Self> {
        let args: PackageArgs = resolve_args("package", &PackageArgs::default(), overrides)?;
        let ops = FileOps::new(root, args.shared.dry_run);
        let logger = Logger::for_stage(&args.shared, Color::Red, output.clone());
        Ok(Self {
            args,
            root: root.to_path_buf(),
            ops,
            logger,
            output: output.clone(),
        })
    }

    pub fn args(&self) -> &PackageArgs {
        &self.args
    }

    /// Absolute path of the release directory this run assembles.
    pub fn release_path(&self) -> PathBuf {
        self.ops
            .resolve_path([&self.args.release_dir, &self.args.shared.project.label()])
    }

    /// This stage's resolved config, the override input for its children.
    fn resolved_value(&self) -> Result<JsonValue> {
        Ok(serde_json::to_value(&self.args)?)
    }

    async fn snapshot(&self) -> Result<()> {
        let overrides = child_overrides(&self.resolved_value()?, "snapshot");
        let mut child = SnapshotStage::new(&self.root, Some(&overrides), &self.output)?;
        child.run().await
    }

    async fn build(&self) -> Result<()> {
        let mut overrides = child_overrides(&self.resolved_value()?, "build");
        // A build inside a package run knows it is packaging.
        overrides["packaging"] = json!(true);
        let mut child = BuildStage::new(&self.root, Some(&overrides), &self.output)?;
        child.run().await
    }

    async fn copy(&self) -> Result<()> {
        let dest = self.release_path();
        if self.ops.exists(&dest) {
            let question = format!(
                "replace existing release directory {}?",
                self.ops.relative_path(&dest).display()
            );
            if !confirm(&question, Some(true), &self.args.prompt).await? {
                self.logger.progress_log(1, "keeping existing release dir");
                return Ok(());
            }
            self.ops.delete(&[dest.clone()])?;
        }

        let sources = self.ops.glob(&self.args.files)?;
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

    fn zip(&self) -> Result<()> {
        let dir = self.release_path();
        // Appended rather than `with_extension`, which would truncate the
        // dotted version in `<name>@<version>`.
        let mut name = dir.as_os_str().to_os_string();
        name.push(".tar");
        let dest = PathBuf::from(name);
        self.logger.progress_log(1, "packing release");
        let written = pack_dir(&self.ops, &dir, &dest)?;
        self.logger
            .verbose_log(2, &self.ops.relative_path(&written).display().to_string());
        Ok(())
    }
}

#[async_trait]
impl Stage for PackageStage {
    fn name(&self) -> &'static str {
        "package"
    }

    fn sub_stages(&self) -> &'static [&'static str] {
        &["snapshot", "build", "copy", "zip"]
    }

    fn shared(&self) -> &StageArgs {
        &self.args.shared
    }

    fn logger(&self) -> &Logger {
        &self.logger
    }

    fn emoji(&self) -> &'static str {
        "📦"
    }

    fn verbs(&self) -> (&'static str, &'static str) {
        ("packaging", "packaged")
    }

    async fn dispatch(&mut self, sub_stage: &str) -> Result<()> {
        match sub_stage {
            "snapshot" => self.snapshot().await,
            "build" => self.build().await,
            "copy" => self.copy().await,
            "zip" => self.zip(),
            other => Err(Error::UnknownSubStage {
                stage: self.name().to_string(),
                name: other.to_string(),
            }),
        }
    }
}
