//! # Console Output
//!
//! This module provides utilities for controlling CLI output appearance and
//! for the depth-indented progress-line protocol the stage pipeline uses.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Line Protocol
//!
//! Every progress line carries a depth. Depth maps to a four-space
//! indentation repeat, and styling follows the depth: bold up to depth 1,
//! italic beyond depth 2, dimmed beyond depth 3. Nested stages increment
//! their base depth by one per level, which keeps composed pipeline output
//! visually hierarchical.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stagehand::output::{emoji, LineOpts, OutputConfig};
//!
//! let config = OutputConfig::from_env_and_flag("auto");
//! output::log_line("compiling", &LineOpts::for_depth(1), &config);
//! println!("{} Done", emoji(&config, "✅", "[OK]"));
//! ```

use std::env;

use console::{Color, Style};

use crate::args::StageArgs;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// # Behavior
    /// - `--color=always`: Force colors on (overrides NO_COLOR)
    /// - `--color=never`: Force colors off
    /// - `--color=auto`: Detect based on environment
    ///
    /// In auto mode, colors are disabled if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stdout is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    /// Detect whether color output is supported based on environment.
    fn detect_color_support() -> bool {
        // Check NO_COLOR first (https://no-color.org/)
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        // Check CLICOLOR=0 disables colors
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        // Check CLICOLOR_FORCE=1 forces colors
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        // Check TERM=dumb
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        // Use console crate's detection for TTY and color support
        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the appropriate string based on color configuration.
///
/// When colors are enabled, returns the emoji. When disabled, returns
/// the plain text alternative.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Options for one formatted console line.
#[derive(Debug, Clone, Default)]
pub struct LineOpts {
    /// Indentation depth; each step is four spaces
    pub depth: u8,
    /// Foreground color, applied only when colors are enabled
    pub color: Option<Color>,
    pub bold: bool,
    pub italic: bool,
    pub dim: bool,
    /// Blank lines printed before the message
    pub lines_before: u8,
    /// Blank lines printed after the message
    pub lines_after: u8,
}

impl LineOpts {
    /// Line options following the depth styling conventions: bold up to
    /// depth 1, italic beyond depth 2, dimmed beyond depth 3.
    pub fn for_depth(depth: u8) -> Self {
        Self {
            depth,
            color: None,
            bold: depth <= 1,
            italic: depth > 2,
            dim: depth > 3,
            lines_before: 0,
            lines_after: 0,
        }
    }
}

/// Render one line of `message` with indentation and styling applied.
pub fn format_line(message: &str, opts: &LineOpts, config: &OutputConfig) -> String {
    let indent = "    ".repeat(opts.depth as usize);
    let body = if config.use_color {
        let mut style = Style::new();
        if let Some(color) = opts.color {
            style = style.fg(color);
        }
        if opts.bold {
            style = style.bold();
        }
        if opts.italic {
            style = style.italic();
        }
        if opts.dim {
            style = style.dim();
        }
        style.apply_to(message).to_string()
    } else {
        message.to_string()
    };
    format!("{}{}", indent, body)
}

/// Print `message` to stdout per `opts`, one indented line per input line.
pub fn log_line(message: &str, opts: &LineOpts, config: &OutputConfig) {
    for _ in 0..opts.lines_before {
        println!();
    }
    for line in message.lines() {
        println!("{}", format_line(line, opts, config));
    }
    for _ in 0..opts.lines_after {
        println!();
    }
}

/// Depth-aware progress writer bound to one stage's resolved arguments.
///
/// The effective depth of a message is the requested level plus the stage's
/// `log-base-level`. Progress lines are suppressed wholesale when the
/// resolved `progress` flag is off, verbose lines when `verbose` is off.
#[derive(Debug, Clone)]
pub struct Logger {
    progress: bool,
    verbose: bool,
    base_level: u8,
    color: Option<Color>,
    config: OutputConfig,
}

impl Logger {
    /// Build a logger for a stage from its resolved shared args.
    pub fn for_stage(shared: &StageArgs, color: Color, config: OutputConfig) -> Self {
        Self {
            progress: shared.progress,
            verbose: shared.verbose,
            base_level: shared.log_base_level,
            color: Some(color),
            config,
        }
    }

    /// A logger that prints nothing, for contexts without resolved args.
    pub fn silent() -> Self {
        Self {
            progress: false,
            verbose: false,
            base_level: 0,
            color: None,
            config: OutputConfig::without_color(),
        }
    }

    /// Effective depth for a requested level.
    pub fn depth(&self, level: u8) -> u8 {
        level.saturating_add(self.base_level)
    }

    /// Print a progress line at `level` above the stage's base depth.
    pub fn progress_log(&self, level: u8, message: &str) {
        if !self.progress {
            return;
        }
        let mut opts = LineOpts::for_depth(self.depth(level));
        opts.color = self.color;
        log_line(message, &opts, &self.config);
    }

    /// Print a verbose line at `level` above the stage's base depth.
    pub fn verbose_log(&self, level: u8, message: &str) {
        if !self.verbose {
            return;
        }
        let mut opts = LineOpts::for_depth(self.depth(level));
        opts.color = self.color;
        log_line(message, &opts, &self.config);
    }

    /// Print a stage banner: bold, colored, preceded by a blank line.
    pub fn banner(&self, message: &str) {
        if !self.progress {
            return;
        }
        let mut opts = LineOpts::for_depth(self.depth(0));
        opts.color = self.color;
        opts.bold = true;
        opts.lines_before = 1;
        log_line(message, &opts, &self.config);
    }
}
