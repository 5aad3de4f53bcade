//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures, helper functions, and config
//! snippets to reduce duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_minimal_config();
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Common `.stagehand.toml` snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// Minimal valid configuration with just a project table.
    pub const MINIMAL: &str = r#"
[project]
name = "widget-utils"
version = "1.4.0"
"#;

    /// Configuration whose stage commands all succeed without touching
    /// anything outside the fixture.
    pub const HARMLESS_COMMANDS: &str = r#"
[project]
name = "widget-utils"
version = "1.4.0"

[compile]
command = "true"
assets = []

[test]
typecheck-command = "true"
unit-command = "true"

[document]
only = "clean"

[build]
replace = []
"#;

    /// Invalid TOML for error testing.
    pub const INVALID_TOML: &str = "project = [unclosed";

    /// Configuration with a bad project version.
    pub const BAD_VERSION: &str = r#"
[project]
name = "widget-utils"
version = "one-point-oh"
"#;
}

/// A temporary npm-style project directory with sources and a config file.
pub struct TestFixture {
    pub temp: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        let temp = assert_fs::TempDir::new().expect("create temp dir");
        temp.child("src/index.ts")
            .write_str("export const VERSION = '___CURRENT_VERSION___';\n")
            .unwrap();
        temp.child("src/theme/main.css")
            .write_str("body {}\n")
            .unwrap();
        temp.child("package.json")
            .write_str("{ \"name\": \"widget-utils\" }\n")
            .unwrap();
        temp.child("README.md").write_str("# widget-utils\n").unwrap();
        Self { temp }
    }

    /// Write `content` as the fixture's `.stagehand.toml`.
    pub fn with_config(self, content: &str) -> Self {
        self.temp
            .child(".stagehand.toml")
            .write_str(content)
            .unwrap();
        self
    }

    pub fn with_minimal_config(self) -> Self {
        self.with_config(configs::MINIMAL)
    }

    pub fn path(&self) -> &std::path::Path {
        self.temp.path()
    }
}
