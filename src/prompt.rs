//! Interactive prompts with a timeout policy
//!
//! The pipeline rarely asks questions, but when it does (for example before
//! replacing an existing release directory) the prompt must not hang an
//! unattended run. Every prompt therefore races against a configurable
//! millisecond budget, and a [`TimeoutPolicy`] decides whether hitting that
//! budget is an error or quietly resolves to the caller's fallback.
//!
//! Non-interactive sessions never prompt at all; they short-circuit to the
//! fallback.

use std::time::Duration;

use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the prompt layer.
///
/// This is the pipeline's only component with its own typed error; stage
/// bodies let it convert into the crate error and propagate.
#[derive(Debug, Error)]
pub enum PromptError {
    /// The prompt timed out and the policy demanded escalation.
    #[error("prompt timed out after {timeout_ms}ms: {message}")]
    TimedOut { message: String, timeout_ms: u64 },

    /// The terminal interaction itself failed.
    #[error("prompt interaction failed: {0}")]
    Interaction(#[from] dialoguer::Error),

    /// The blocking prompt task went away without an answer.
    #[error("prompt task failed: {message}")]
    Join { message: String },
}

/// What a prompt timeout means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeoutPolicy {
    /// A timeout is always an error, even when a fallback exists.
    Always,
    /// Fall back when the caller provided a fallback, error otherwise.
    #[default]
    Auto,
    /// Never error; resolve to the fallback (or `false` without one).
    Never,
}

/// Prompt configuration, nestable in a stage's config table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PromptOpts {
    /// Milliseconds to wait for an answer; `0` waits forever
    pub timeout_ms: u64,
    pub policy: TimeoutPolicy,
}

impl Default for PromptOpts {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            policy: TimeoutPolicy::Auto,
        }
    }
}

/// What a timed-out prompt resolves to: `Some(answer)` to swallow the
/// timeout, `None` to escalate it.
fn timeout_outcome(policy: TimeoutPolicy, fallback: Option<bool>) -> Option<bool> {
    match policy {
        TimeoutPolicy::Always => None,
        TimeoutPolicy::Auto => fallback,
        TimeoutPolicy::Never => Some(fallback.unwrap_or(false)),
    }
}

/// Ask a yes/no question on the terminal.
///
/// Returns the user's answer, the fallback on a swallowed timeout or a
/// non-interactive session, or [`PromptError::TimedOut`] when the policy
/// escalates. The prompt itself runs on the blocking pool; an abandoned
/// prompt thread parks on stdin until the process exits.
pub async fn confirm(
    question: &str,
    fallback: Option<bool>,
    opts: &PromptOpts,
) -> Result<bool, PromptError> {
    if !console::user_attended() {
        log::debug!("non-interactive session, prompt resolved to fallback");
        return Ok(fallback.unwrap_or(false));
    }

    let prompt_text = question.to_string();
    let default_answer = fallback.unwrap_or(false);
    let ask = tokio::task::spawn_blocking(move || {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt_text)
            .default(default_answer)
            .interact()
    });

    let joined = if opts.timeout_ms == 0 {
        ask.await
    } else {
        match tokio::time::timeout(Duration::from_millis(opts.timeout_ms), ask).await {
            Ok(joined) => joined,
            Err(_) => {
                return match timeout_outcome(opts.policy, fallback) {
                    Some(answer) => Ok(answer),
                    None => Err(PromptError::TimedOut {
                        message: question.to_string(),
                        timeout_ms: opts.timeout_ms,
                    }),
                };
            }
        }
    };

    match joined {
        Ok(Ok(answer)) => Ok(answer),
        Ok(Err(interaction)) => Err(PromptError::Interaction(interaction)),
        Err(join_err) => Err(PromptError::Join {
            message: join_err.to_string(),
        }),
    }
}
