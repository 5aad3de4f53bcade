//! Document stage
//!
//! Generates the package's API documentation: `clean` empties the output
//! directory, `generate` invokes the configured documentation generator with
//! its entry points and output directory. Generator failures are logged and
//! swallowed rather than failing the pipeline, because documentation is a
//! byproduct of a build, not a gate for it.

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

/// Static configuration handed to the documentation generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratorConfig {
    /// Generator invocation, run through the shell with the flags below
    pub command: String,
    /// Source entry points the generator starts from
    pub entry_points: Vec<String>,
    /// Directory the generated files land in; emptied by `clean`
    pub out_dir: String,
    /// Leave private symbols out of the generated docs
    pub exclude_private: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: "npx typedoc".to_string(),
            entry_points: vec!["src/index.ts".to_string()],
            out_dir: "docs".to_string(),
            exclude_private: true,
        }
    }
}

impl GeneratorConfig {
    /// The full shell invocation: command, entry points, output flags.
    pub fn invocation(&self) -> String {
        let mut parts = vec![self.command.clone()];
        parts.extend(self.entry_points.iter().cloned());
        parts.push(format!("--out {}", self.out_dir));
        if self.exclude_private {
            parts.push("--excludePrivate".to_string());
        }
        parts.join(" ")
    }
}

/// Configuration for a document run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DocumentArgs {
    #[serde(flatten)]
    pub shared: StageArgs,
    pub generator: GeneratorConfig,
}

/// The document stage: `clean` → `generate`.
pub struct DocumentStage {
    args: DocumentArgs,
    ops: FileOps,
    shell: ShellRunner,
    logger: Logger,
}

impl DocumentStage {
    pub fn new(root: &Path, overrides: Option<&JsonValue>, output: &OutputConfig) -> Result<Self> {
        let args: DocumentArgs = resolve_args("document", &DocumentArgs::default(), overrides)?;
        let ops = FileOps::new(root, args.shared.dry_run);
        let shell = ShellRunner::new(root, args.shared.dry_run);
        let logger = Logger::for_stage(&args.shared, Color::Magenta, output.clone());
        Ok(Self {
            args,
            ops,
            shell,
            logger,
        })
    }

    pub fn args(&self) -> &DocumentArgs {
        &self.args
    }

    fn clean(&self) -> Result<()> {
        self.logger.progress_log(1, "cleaning docs");
        self.ops
            .delete(&[PathBuf::from(&self.args.generator.out_dir)])
    }

    fn generate(&self) -> Result<()> {
        let invocation = self.args.generator.invocation();
        self.logger.progress_log(1, "generating documentation");
        self.logger.verbose_log(2, &invocation);
        // The generator may fail internally; that is logged, not thrown.
        if let Err(err) = self.shell.run(&invocation) {
            log::warn!("documentation generator failed: {}", err);
            self.logger
                .progress_log(1, &format!("documentation generator failed: {}", err));
        }
        Ok(())
    }
}

#[async_trait]
impl Stage for DocumentStage {
    fn name(&self) -> &'static str {
        "document"
    }

    fn sub_stages(&self) -> &'static [&'static str] {
        &["clean", "generate"]
    }

    fn shared(&self) -> &StageArgs {
        &self.args.shared
    }

    fn logger(&self) -> &Logger {
        &self.logger
    }

    fn emoji(&self) -> &'static str {
        "📚"
    }

    fn verbs(&self) -> (&'static str, &'static str) {
        ("documenting", "documented")
    }

    async fn dispatch(&mut self, sub_stage: &str) -> Result<()> {
        match sub_stage {
            "clean" => self.clean(),
            "generate" => self.generate(),
            other => Err(Error::UnknownSubStage {
                stage: self.name().to_string(),
                name: other.to_string(),
            }),
        }
    }
}
