//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `stagehand` application. It uses the `thiserror` library to create a
//! comprehensive `Error` enum that covers all anticipated failure modes,
//! providing clear and descriptive error messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the application. Each variant corresponds to a specific
//!   type of error and includes contextual information to aid in debugging.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the application to simplify function signatures and ensure
//!   type safety.
//!
//! The `Error` enum covers:
//!
//! - Project configuration parsing errors (`.stagehand.toml`).
//! - Stage argument resolution errors.
//! - Sub-stage dispatch errors.
//! - Shell command failures.
//! - Filesystem and path operations.
//! - Interactive prompt failures and timeouts.
//! - I/O errors.
//! - TOML and JSON (de)serialization errors.
//! - Regex, glob, and semver errors.
//!
//! Stage pipelines never recover from these locally; every error propagates
//! to the process boundary and the process exits non-zero.

use thiserror::Error;

/// Main error type for stagehand operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while parsing the `.stagehand.toml` project file.
    ///
    /// This error includes the specific parsing issue and optionally a hint
    /// about how to fix it.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A merged configuration no longer deserializes into the stage's args
    /// struct.
    ///
    /// The merge engine itself never fails; this is raised afterwards, when
    /// the merged value is turned back into typed args.
    #[error("Invalid arguments for stage '{stage}': {message}")]
    Args { stage: String, message: String },

    /// A sub-stage name reached dispatch without a matching handler.
    ///
    /// Declared sub-stage lists are fixed per stage type, so this indicates a
    /// filter value naming a sub-stage the stage does not have.
    #[error("Stage '{stage}' has no sub-stage named '{name}'")]
    UnknownSubStage { stage: String, name: String },

    /// A shell command exited unsuccessfully.
    #[error("Shell command failed with {}: {command}", code.map(|c| format!("exit code {}", c)).unwrap_or_else(|| "no exit code".to_string()))]
    Command {
        command: String,
        /// Exit code, if the process exited rather than being signalled
        code: Option<i32>,
    },

    /// An error occurred with a filesystem operation.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An error occurred with a path-related operation.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// An interactive prompt failed or timed out, wrapped from
    /// [`PromptError`](crate::prompt::PromptError).
    #[error("Prompt error: {0}")]
    Prompt(#[from] crate::prompt::PromptError),

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A TOML parsing error, wrapped from `toml::de::Error`.
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A JSON (de)serialization error, wrapped from `serde_json::Error`.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A semantic versioning parsing error, wrapped from `semver::Error`.
    #[error("Semver parsing error: {0}")]
    Semver(#[from] semver::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
