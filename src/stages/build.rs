//! Build stage
//!
//! The composite everyday pipeline: `compile` → `replace` → `test` →
//! `document`. Three of the four sub-stages delegate to child stages
//! ([`CompileStage`], [`TestStage`], [`DocumentStage`]); each child receives
//! this stage's resolved config as its override input via
//! [`child_overrides`], with the log depth bumped by one and the namespaced
//! filters (`only-compile`, `without-test`, ...) translated into the child's
//! plain `only`/`without`.
//!
//! `replace` is the one local sub-stage: it rewrites placeholder tokens in
//! the compiled output, expanding `{{name}}` and `{{version}}` in
//! replacement strings from the project info.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use console::Color;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::args::{resolve_args, OneOrMany, ProjectInfo, StageArgs};
use crate::error::{Error, Result};
use crate::files::{FileOps, WriteOpts};
use crate::output::{Logger, OutputConfig};
use crate::stages::{child_overrides, CompileStage, DocumentStage, Stage, TestStage};

fn default_replace_paths() -> Vec<String> {
    vec!["dist/**/*.js".to_string(), "dist/**/*.d.ts".to_string()]
}

/// One placeholder rewrite applied to the compiled output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReplaceSpec {
    /// Regex matched against file contents
    pub pattern: String,
    /// Replacement text; `{{name}}` and `{{version}}` expand from the
    /// project info before the regex replacement runs
    pub replacement: String,
    /// Glob patterns of the files the rewrite applies to
    #[serde(default = "default_replace_paths")]
    pub paths: Vec<String>,
}

impl ReplaceSpec {
    /// The replacement string with project placeholders expanded.
    pub fn expand(&self, project: &ProjectInfo) -> String {
        self.replacement
            .replace("{{name}}", &project.name)
            .replace("{{version}}", &project.version)
    }
}

fn default_replace_specs() -> Vec<ReplaceSpec> {
    vec![ReplaceSpec {
        pattern: "___CURRENT_VERSION___".to_string(),
        replacement: "{{version}}".to_string(),
        paths: default_replace_paths(),
    }]
}

/// Configuration for a build run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildArgs {
    #[serde(flatten)]
    pub shared: StageArgs,
    /// Placeholder rewrites `replace` applies after compiling
    pub replace: Vec<ReplaceSpec>,
    /// Filters forwarded to the compile child as its `only`/`without`
    pub only_compile: Option<OneOrMany>,
    pub without_compile: Option<OneOrMany>,
    /// Filters forwarded to the test child
    pub only_test: Option<OneOrMany>,
    pub without_test: Option<OneOrMany>,
    /// Filters forwarded to the document child
    pub only_document: Option<OneOrMany>,
    pub without_document: Option<OneOrMany>,
    /// Override table forwarded to the compile child
    pub compile: Option<JsonValue>,
    /// Override table forwarded to the test child
    pub test: Option<JsonValue>,
    /// Override table forwarded to the document child
    pub document: Option<JsonValue>,
}

impl Default for BuildArgs {
    fn default() -> Self {
        Self {
            shared: StageArgs::default(),
            replace: default_replace_specs(),
            only_compile: None,
            without_compile: None,
            only_test: None,
            without_test: None,
            only_document: None,
            without_document: None,
            compile: None,
            test: None,
            document: None,
        }
    }
}

/// The build stage: `compile` → `replace` → `test` → `document`.
pub struct BuildStage {
    args: BuildArgs,
    root: PathBuf,
    ops: FileOps,
    logger: Logger,
    output: OutputConfig,
}

impl BuildStage {
    pub fn new(root: &Path, overrides: Option<&JsonValue>, output: &OutputConfig) -> Result<Self> {
        let args: BuildArgs = resolve_args("build", &BuildArgs::default(), overrides)?;
        let ops = FileOps::new(root, args.shared.dry_run);
        let logger = Logger::for_stage(&args.shared, Color::Green, output.clone());
        Ok(Self {
            args,
            root: root.to_path_buf(),
            ops,
            logger,
            output: output.clone(),
        })
    }

    pub fn args(&self) -> &BuildArgs {
        &self.args
    }

    /// This stage's resolved config, the override input for its children.
    fn resolved_value(&self) -> Result<JsonValue> {
        Ok(serde_json::to_value(&self.args)?)
    }

    async fn compile(&self) -> Result<()> {
        let overrides = child_overrides(&self.resolved_value()?, "compile");
        let mut child = CompileStage::new(&self.root, Some(&overrides), &self.output)?;
        child.run().await
    }

    fn replace(&self) -> Result<()> {
        let project = &self.args.shared.project;
        for spec in &self.args.replace {
            let regex = Regex::new(&spec.pattern)?;
            let replacement = spec.expand(project);
            let files = self.ops.glob(&spec.paths)?;
            let mut rewritten = 0usize;
            for file in &files {
                let content = self.ops.read(file)?;
                let replaced = regex.replace_all(&content, replacement.as_str());
                if replaced != content {
                    let force = WriteOpts {
                        force: true,
                        ..WriteOpts::default()
                    };
                    self.ops.write(file, &replaced, force)?;
                    rewritten += 1;
                }
            }
            self.logger.progress_log(
                1,
                &format!(
                    "replaced '{}' in {} of {} file(s)",
                    spec.pattern,
                    rewritten,
                    files.len()
                ),
            );
        }
        Ok(())
    }

    async fn test(&self) -> Result<()> {
        let overrides = child_overrides(&self.resolved_value()?, "test");
        let mut child = TestStage::new(&self.root, Some(&overrides), &self.output)?;
        child.run().await
    }

    async fn document(&self) -> Result<()> {
        let overrides = child_overrides(&self.resolved_value()?, "document");
        let mut child = DocumentStage::new(&self.root, Some(&overrides), &self.output)?;
        child.run().await
    }
}

#[async_trait]
impl Stage for BuildStage {
    fn name(&self) -> &'static str {
        "build"
    }

    fn sub_stages(&self) -> &'static [&'static str] {
        &["compile", "replace", "test", "document"]
    }

    fn shared(&self) -> &StageArgs {
        &self.args.shared
    }

    fn logger(&self) -> &Logger {
        &self.logger
    }

    fn emoji(&self) -> &'static str {
        "🏗️"
    }

    fn verbs(&self) -> (&'static str, &'static str) {
        ("building", "built")
    }

    async fn dispatch(&mut self, sub_stage: &str) -> Result<()> {
        match sub_stage {
            "compile" => self.compile().await,
            "replace" => self.replace(),
            "test" => self.test().await,
            "document" => self.document().await,
            other => Err(Error::UnknownSubStage {
                stage: self.name().to_string(),
                name: other.to_string(),
            }),
        }
    }
}
