//! # Project Configuration File
//!
//! This module defines the `.stagehand.toml` project file: a `[project]`
//! table naming the package being built, plus one optional table per stage
//! carrying that stage's overrides.
//!
//! Stage tables are deliberately held as raw values rather than typed
//! structs. They are *partial* configuration; each stage resolves its own
//! table against its own complete defaults at construction time, so typing
//! them here would force every field to be present.
//!
//! ## Example
//!
//! ```toml
//! [project]
//! name = "widget-utils"
//! version = "1.4.0"
//!
//! [compile]
//! command = "npx tsc"
//! assets = ["**/*.css"]
//!
//! [build]
//! without = "document"
//!
//! [[build.replace]]
//! pattern = "___CURRENT_VERSION___"
//! replacement = "{{version}}"
//!
//! [document.generator]
//! out-dir = "docs/api"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value as JsonValue};

use crate::args::ProjectInfo;
use crate::error::{Error, Result};

/// File name looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = ".stagehand.toml";

/// A parsed `.stagehand.toml`.
#[derive(Debug, Clone, Default)]
pub struct ProjectFile {
    root: JsonValue,
}

impl ProjectFile {
    /// Parse project configuration from TOML text.
    ///
    /// Syntax problems surface as [`Error::Toml`]; semantic problems (a stage
    /// entry that is not a table, an invalid project version) as
    /// [`Error::ConfigParse`] or [`Error::Semver`] with enough context to fix
    /// the file.
    pub fn parse(text: &str) -> Result<Self> {
        let toml_value: toml::Value = toml::from_str(text)?;
        let root = serde_json::to_value(toml_value)?;

        let file = Self { root };
        file.validate()?;
        Ok(file)
    }

    /// Load the file at `path`, or `None` when it does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            log::debug!("no project file at {}", path.display());
            return Ok(None);
        }
        let text = fs::read_to_string(path)?;
        Ok(Some(Self::parse(&text)?))
    }

    fn validate(&self) -> Result<()> {
        if let Some(project) = self.root.get("project") {
            if !project.is_object() {
                return Err(Error::ConfigParse {
                    message: "'project' must be a table".to_string(),
                    hint: Some("write it as [project] with name and version keys".to_string()),
                });
            }
            let info = self.project_info()?;
            if info.name.trim().is_empty() {
                return Err(Error::ConfigParse {
                    message: "project name is empty".to_string(),
                    hint: Some("set name under [project]".to_string()),
                });
            }
            semver::Version::parse(&info.version)?;
        }
        Ok(())
    }

    /// The raw `[project]` table, if present.
    pub fn project_table(&self) -> Option<&JsonValue> {
        self.root.get("project")
    }

    /// The `[project]` table as typed info, defaults filling the gaps.
    pub fn project_info(&self) -> Result<ProjectInfo> {
        match self.project_table() {
            Some(table) => {
                serde_json::from_value(table.clone()).map_err(|err| Error::ConfigParse {
                    message: format!("invalid [project] table: {}", err),
                    hint: Some("name and version must be strings".to_string()),
                })
            }
            None => Ok(ProjectInfo::default()),
        }
    }

    /// The raw override table for one stage, if present.
    pub fn stage_table(&self, stage: &str) -> Result<Option<JsonValue>> {
        match self.root.get(stage) {
            None => Ok(None),
            Some(table) if table.is_object() => Ok(Some(table.clone())),
            Some(_) => Err(Error::ConfigParse {
                message: format!("'{}' must be a table", stage),
                hint: Some(format!("write stage overrides as [{}]", stage)),
            }),
        }
    }

    /// The complete override object for one stage: its table with the
    /// `[project]` table injected under `project`.
    pub fn stage_overrides(&self, stage: &str) -> Result<JsonValue> {
        let mut overrides = self.stage_table(stage)?.unwrap_or_else(|| json!({}));
        if let Some(project) = self.project_table() {
            overrides["project"] = project.clone();
        }
        Ok(overrides)
    }

    /// [`stage_overrides`](Self::stage_overrides) for a composite stage,
    /// with the top-level tables of its (transitive) children injected under
    /// their own names so the stage can forward them.
    ///
    /// A table nested inside the stage's own table (`[build.compile]`) wins
    /// over the top-level one (`[compile]`).
    pub fn stage_overrides_with_children(
        &self,
        stage: &str,
        children: &[&str],
    ) -> Result<JsonValue> {
        let mut overrides = self.stage_overrides(stage)?;
        for &child in children {
            if overrides.get(child).is_some() {
                continue;
            }
            if let Some(table) = self.stage_table(child)? {
                overrides[child] = table;
            }
        }
        Ok(overrides)
    }
}

/// Where the project file lives: the `--config` flag when given, otherwise
/// [`DEFAULT_CONFIG_FILE`] in `dir`.
pub fn resolve_config_path(flag: Option<&Path>, dir: &Path) -> PathBuf {
    match flag {
        Some(path) => path.to_path_buf(),
        None => dir.join(DEFAULT_CONFIG_FILE),
    }
}
