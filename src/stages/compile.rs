//! Compile stage
//!
//! Turns the package's sources into its distributable form in three
//! sub-stages: `clean` empties the dist directory, `compile` runs the
//! configured compiler command, and `assets` copies non-compiled files
//! (stylesheets, JSON data, type shims) from the source tree into the dist
//! tree, preserving their layout below the source directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use console::Color;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::args::{resolve_args, StageArgs};
use crate::error::{Error, Result};
use crate::files::FileOps;
use crate::output::{Logger, OutputConfig};
use crate::shell::ShellRunner;
use crate::stages::Stage;

/// Configuration for a compile run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompileArgs {
    #[serde(flatten)]
    pub shared: StageArgs,
    /// Directory the sources live in
    pub src_dir: String,
    /// Directory the compiled output lands in; emptied by `clean`
    pub dist_dir: String,
    /// Compiler invocation, run through the shell
    pub command: String,
    /// Glob patterns of files copied verbatim from src to dist
    pub assets: Vec<String>,
}

impl Default for CompileArgs {
    fn default() -> Self {
        Self {
            shared: StageArgs::default(),
            src_dir: "src".to_string(),
            dist_dir: "dist".to_string(),
            command: "npx tsc".to_string(),
            assets: vec!["src/**/*.css".to_string(), "src/**/*.json".to_string()],
        }
    }
}

/// The compile stage: `clean` → `compile` → `assets`.
pub struct CompileStage {
    args: CompileArgs,
    ops: FileOps,
    shell: ShellRunner,
    logger: Logger,
}

impl CompileStage {
    pub fn new(root: &Path, overrides: Option<&JsonValue>, output: &OutputConfig) -> Result<Self> {
        let args: CompileArgs = resolve_args("compile", &CompileArgs::default(), overrides)?;
        let ops = FileOps::new(root, args.shared.dry_run);
        let shell = ShellRunner::new(root, args.shared.dry_run);
        let logger = Logger::for_stage(&args.shared, Color::Cyan, output.clone());
        Ok(Self {
            args,
            ops,
            shell,
            logger,
        })
    }

    pub fn args(&self) -> &CompileArgs {
        &self.args
    }

    fn clean(&self) -> Result<()> {
        self.logger.progress_log(1, "cleaning dist");
        self.ops.delete(&[PathBuf::from(&self.args.dist_dir)])
    }

    fn compile(&self) -> Result<()> {
        self.logger.progress_log(1, "compiling sources");
        self.logger.verbose_log(2, &self.args.command);
        self.shell.run(&self.args.command)
    }

    fn assets(&self) -> Result<()> {
        let matched = self.ops.glob(&self.args.assets)?;
        self.logger
            .progress_log(1, &format!("copying {} asset file(s)", matched.len()));
        for source in matched {
            let rel = self.ops.relative_path(&source);
            let below_src = rel
                .strip_prefix(&self.args.src_dir)
                .unwrap_or(&rel)
                .to_path_buf();
            let dest = self
                .ops
                .resolve_path([Path::new(&self.args.dist_dir), below_src.as_path()]);
            self.ops.copy_file(&source, &dest)?;
            self.logger.verbose_log(2, &below_src.to_string_lossy());
        }
        Ok(())
    }
}

#[async_trait]
impl Stage for CompileStage {
    fn name(&self) -> &'static str {
        "compile"
    }

    fn sub_stages(&self) -> &'static [&'static str] {
        &["clean", "compile", "assets"]
    }

    fn shared(&self) -> &StageArgs {
        &self.args.shared
    }

    fn logger(&self) -> &Logger {
        &self.logger
    }

    fn emoji(&self) -> &'static str {
        "🔧"
    }

    fn verbs(&self) -> (&'static str, &'static str) {
        ("compiling", "compiled")
    }

    async fn dispatch(&mut self, sub_stage: &str) -> Result<()> {
        match sub_stage {
            "clean" => self.clean(),
            "compile" => self.compile(),
            "assets" => self.assets(),
            other => Err(Error::UnknownSubStage {
                stage: self.name().to_string(),
                name: other.to_string(),
            }),
        }
    }
}
