//! # Stagehand Library
//!
//! This library provides the core functionality of the `stagehand` build
//! pipeline driver. It is designed to be used by the `stagehand`
//! command-line tool but can also be embedded by other applications that
//! want to drive a staged build programmatically.
//!
//! ## Quick Example
//!
//! ```
//! use serde_json::json;
//! use stagehand::merge::merge_values;
//! use stagehand::stages::is_included;
//!
//! // Resolve a partial configuration against complete defaults.
//! let defaults = json!({ "command": "npx tsc", "child": { "x": 1, "y": 2 } });
//! let overrides = json!({ "child": { "x": 9 } });
//! let resolved = merge_values(&defaults, Some(&overrides), true);
//! assert_eq!(resolved["command"], "npx tsc");
//! assert_eq!(resolved["child"], json!({ "x": 9, "y": 2 }));
//!
//! // Evaluate a sub-stage filter.
//! assert!(is_included("compile", None, None));
//! ```
//!
//! ## Core Concepts
//!
//! The library is built around a few key concepts:
//!
//! - **Merge engine (`merge`)**: pure functions that turn a complete default
//!   configuration plus a partial (possibly recursively partial) override
//!   into a fully-populated configuration value, with a concurrent async
//!   variant.
//! - **Argument resolution (`args`)**: the per-component contract every
//!   configurable stage follows to go from constructor input to immutable,
//!   fully-populated arguments.
//! - **Stages (`stages`)**: the [`Stage`](stages::Stage) trait driving a
//!   fixed, ordered list of named sub-stages with inclusion/exclusion
//!   filtering and depth-aware progress logging, plus the six concrete stage
//!   types (`compile`, `test`, `document`, `snapshot`, `build`, `package`).
//!   Composite stages construct child stages and forward a derived,
//!   depth-incremented configuration.
//! - **Collaborators (`files`, `shell`, `output`, `archive`, `prompt`)**:
//!   thin, dry-run-aware I/O wrappers stage bodies work through.
//! - **Project file (`config`)**: the `.stagehand.toml` schema supplying the
//!   file layer of each stage's overrides.
//!
//! ## Execution Flow
//!
//! A run starts at a concrete stage type:
//!
//! 1. The constructor resolves the stage's arguments by merging caller
//!    overrides over the stage's own complete defaults.
//! 2. `run()` emits a start notice, then walks the declared sub-stage list
//!    in order, skipping names the resolved `only`/`without` filter
//!    excludes and awaiting each included handler to completion.
//! 3. Composite handlers construct a child stage from the parent's resolved
//!    config (depth bumped by one, namespaced filters translated) and await
//!    the child's full run.
//! 4. The first error anywhere aborts everything after it; the end notice
//!    only follows a fully successful pass.

pub mod archive;
pub mod args;
pub mod config;
pub mod error;
pub mod files;
pub mod merge;
pub mod output;
pub mod prompt;
pub mod shell;
pub mod stages;

#[cfg(test)]
mod merge_proptest;
