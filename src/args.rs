//! Stage argument resolution
//!
//! Every configurable stage owns a complete default configuration (its
//! `Default` impl) and resolves its final, immutable arguments exactly once,
//! at construction time, by merging caller overrides on top of those
//! defaults via [`resolve_args`].
//!
//! Whether that merge is shallow or recursive is part of each component's own
//! default configuration: the `recursive-args` field of the serialized
//! defaults selects the mode, and a defaults value without the field resolves
//! shallowly. Overrides never decide the mode.
//!
//! The shared fields every stage carries live in [`StageArgs`], which
//! concrete stages embed with `#[serde(flatten)]`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::merge::merge_values;

/// Key of the serialized defaults that selects the merge mode.
pub const RECURSIVE_ARGS_KEY: &str = "recursive-args";

/// A single name or a list of names.
///
/// Filter fields (`only`, `without`) accept either shape in the config file
/// and from the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Whether `name` is the single value or an element of the list.
    pub fn contains(&self, name: &str) -> bool {
        match self {
            OneOrMany::One(single) => single == name,
            OneOrMany::Many(list) => list.iter().any(|entry| entry == name),
        }
    }

    /// True for an empty list; a single value is never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            OneOrMany::One(_) => false,
            OneOrMany::Many(list) => list.is_empty(),
        }
    }
}

impl From<&str> for OneOrMany {
    fn from(value: &str) -> Self {
        OneOrMany::One(value.to_string())
    }
}

impl From<Vec<String>> for OneOrMany {
    fn from(value: Vec<String>) -> Self {
        OneOrMany::Many(value)
    }
}

/// Details of the file-watcher event that triggered a run, when one did.
///
/// Presence of this value switches stage notices to their compact one-line
/// form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WatchEvent {
    /// Watcher event kind, e.g. `change` or `add`
    pub event: String,
    /// Path the event fired for
    pub path: String,
}

/// Name and version of the package being built.
///
/// Threaded into banners, replacement placeholders, and snapshot/release
/// artifact names. Populated from the `[project]` table of
/// `.stagehand.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProjectInfo {
    pub name: String,
    pub version: String,
}

impl Default for ProjectInfo {
    fn default() -> Self {
        Self {
            name: "package".to_string(),
            version: "0.0.0".to_string(),
        }
    }
}

impl ProjectInfo {
    /// `name@version`, the label banners and artifact names use.
    pub fn label(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

/// Configuration fields shared by every stage.
///
/// Concrete stages embed this with `#[serde(flatten)]` so the fields sit at
/// the top level of their config tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StageArgs {
    /// Run only the named sub-stages
    pub only: Option<OneOrMany>,
    /// Skip the named sub-stages
    pub without: Option<OneOrMany>,
    /// Indentation depth added to every log line; parents increment this by
    /// one when configuring a child stage
    pub log_base_level: u8,
    /// Emit progress lines
    pub progress: bool,
    /// Emit verbose lines
    pub verbose: bool,
    /// Emit debug detail to the log facade
    pub debug: bool,
    /// Log destructive work instead of performing it
    pub dry_run: bool,
    /// Set for runs that are part of a `package` invocation
    pub packaging: bool,
    /// Set for runs that are part of a release
    pub releasing: bool,
    /// Present when a file-watcher triggered this run
    pub watch: Option<WatchEvent>,
    /// Merge nested override tables key-by-key when resolving these args
    pub recursive_args: bool,
    /// The package this pipeline builds
    pub project: ProjectInfo,
}

impl Default for StageArgs {
    fn default() -> Self {
        Self {
            only: None,
            without: None,
            log_base_level: 0,
            progress: true,
            verbose: false,
            debug: false,
            dry_run: false,
            packaging: false,
            releasing: false,
            watch: None,
            recursive_args: true,
            project: ProjectInfo::default(),
        }
    }
}

impl StageArgs {
    /// Whether this run was triggered by a file watcher.
    pub fn is_watch_triggered(&self) -> bool {
        self.watch.is_some()
    }
}

/// Resolve a stage's final arguments from its defaults and caller overrides.
///
/// Serializes `defaults`, reads the merge mode from the defaults' own
/// `recursive-args` field (absent means shallow), merges the overrides on
/// top, and deserializes the merged value back into the args type.
///
/// The merge itself never fails. A merged value that no longer fits the args
/// type is the caller's fault and surfaces as [`Error::Args`] carrying the
/// stage name.
///
/// # Arguments
///
/// * `stage` - Stage name, for error reporting
/// * `defaults` - The component's complete default configuration
/// * `overrides` - Partial caller configuration, if any
pub fn resolve_args<T>(stage: &str, defaults: &T, overrides: Option<&JsonValue>) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let default_value = serde_json::to_value(defaults)?;
    let recursive = default_value
        .get(RECURSIVE_ARGS_KEY)
        .and_then(JsonValue::as_bool)
        .unwrap_or(false);
    let merged = merge_values(&default_value, overrides, recursive);
    serde_json::from_value(merged).map_err(|err| Error::Args {
        stage: stage.to_string(),
        message: err.to_string(),
    })
}
