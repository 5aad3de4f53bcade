//! # The Stage Pipeline
//!
//! Every build script this tool ships (`compile`, `test`, `document`,
//! `snapshot`, `build`, `package`) is one [`Stage`]: a fixed, ordered list
//! of named sub-stages plus one handler per name. The provided
//! [`Stage::run`] driver gives all of them identical behavior:
//!
//! 1. a start notice,
//! 2. every declared sub-stage in declared order, skipped when the resolved
//!    `only`/`without` filter excludes it, each awaited to completion before
//!    the next begins,
//! 3. an end notice.
//!
//! Composite stages (`build`, `package`) implement sub-stages by
//! constructing a child stage and awaiting its full run. The child receives
//! the parent's resolved config as its override input, with the log depth
//! bumped by one and the parent's namespaced filters (`only-compile`,
//! `without-test`, ...) translated into the child's plain `only`/`without` —
//! see [`child_overrides`].
//!
//! Failures are never caught between sub-stages. The first error aborts the
//! remainder of the stage and every ancestor's remaining sub-stages; the
//! process exits non-zero.

pub mod build;
pub mod compile;
pub mod document;
pub mod package;
pub mod snapshot;

pub use build::BuildStage;
pub use compile::CompileStage;
pub use document::DocumentStage;
pub use package::PackageStage;
pub use snapshot::SnapshotStage;
pub use test::TestStage;

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};

use crate::args::{OneOrMany, StageArgs};
use crate::error::Result;
use crate::output::Logger;

/// Key a parent bumps when configuring a child stage.
const LOG_BASE_LEVEL_KEY: &str = "log-base-level";

/// Start or end of a stage run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moment {
    Start,
    End,
}

/// Whether `name` passes an `only`/`without` filter pair.
///
/// A name runs iff `only` is absent or contains it, and `without` does not
/// contain it. An explicitly empty `only` list therefore runs nothing.
pub fn is_included(name: &str, only: Option<&OneOrMany>, without: Option<&OneOrMany>) -> bool {
    let kept = only.map_or(true, |filter| filter.contains(name));
    let dropped = without.is_some_and(|filter| filter.contains(name));
    kept && !dropped
}

/// Assemble a child stage's override object from a parent's resolved config.
///
/// The parent's own `only`/`without` never apply to the child; the parent's
/// namespaced fields (`only-<child>`, `without-<child>`) take their place
/// when set. A nested table under the child's name (`[build.compile]` style)
/// is hoisted to the top level of the child's overrides. The child's
/// `log-base-level` is the parent's plus one. All other resolved fields ride
/// along and land where the child's args struct recognizes them.
pub fn child_overrides(parent: &JsonValue, child: &str) -> JsonValue {
    let mut map = match parent {
        JsonValue::Object(map) => map.clone(),
        _ => Map::new(),
    };

    let depth = map
        .get(LOG_BASE_LEVEL_KEY)
        .and_then(JsonValue::as_u64)
        .unwrap_or(0);

    map.remove("only");
    map.remove("without");
    if let Some(JsonValue::Object(table)) = map.remove(child) {
        for (key, value) in table {
            map.insert(key, value);
        }
    }
    if let Some(only) = map.remove(&format!("only-{}", child)) {
        if !only.is_null() {
            map.insert("only".to_string(), only);
        }
    }
    if let Some(without) = map.remove(&format!("without-{}", child)) {
        if !without.is_null() {
            map.insert("without".to_string(), without);
        }
    }

    map.insert(LOG_BASE_LEVEL_KEY.to_string(), JsonValue::from(depth + 1));

    JsonValue::Object(map)
}

/// One orchestrated unit of build work.
///
/// Implementors supply the declared sub-stage list, a dispatch arm per
/// declared name, and their notice wording; the provided methods supply the
/// filter logic and the [`run`](Stage::run) driver.
#[async_trait]
pub trait Stage: Send {
    /// Stage name as it appears on the CLI, in config tables, and in errors.
    fn name(&self) -> &'static str;

    /// Declared sub-stage names, in run order. Fixed per type.
    fn sub_stages(&self) -> &'static [&'static str];

    /// The resolved shared arguments.
    fn shared(&self) -> &StageArgs;

    /// The stage's progress writer.
    fn logger(&self) -> &Logger;

    /// Banner emoji for full-run notices.
    fn emoji(&self) -> &'static str;

    /// Progressive and completed verbs for notices, e.g.
    /// `("compiling", "compiled")`.
    fn verbs(&self) -> (&'static str, &'static str);

    /// Run the handler for one declared sub-stage name.
    ///
    /// Implementations are an explicit match over [`sub_stages`]
    /// (Stage::sub_stages); an unknown name is an
    /// [`Error::UnknownSubStage`](crate::error::Error::UnknownSubStage).
    async fn dispatch(&mut self, sub_stage: &str) -> Result<()>;

    /// Notice wording for `moment`.
    ///
    /// Watch-triggered runs get a compact single line carrying the event;
    /// full runs get the emoji banner form.
    fn notice_text(&self, moment: Moment) -> String {
        let shared = self.shared();
        let label = shared.project.label();
        let (starting, finished) = self.verbs();
        match (moment, shared.watch.as_ref()) {
            (Moment::Start, Some(watch)) => {
                format!("{} {} ({}: {})", starting, label, watch.event, watch.path)
            }
            (Moment::End, Some(_)) => format!("{} {}", finished, label),
            (Moment::Start, None) => format!("{} {} {}", self.emoji(), starting, label),
            (Moment::End, None) => format!("{} {} {}", self.emoji(), finished, label),
        }
    }

    /// Emit the start or end notice.
    fn start_end_notice(&self, moment: Moment) {
        let text = self.notice_text(moment);
        if self.shared().is_watch_triggered() {
            self.logger().progress_log(0, &text);
        } else {
            self.logger().banner(&text);
        }
    }

    /// Whether the resolved filter lets `sub_stage` run.
    fn is_sub_stage_included(&self, sub_stage: &str) -> bool {
        let shared = self.shared();
        is_included(sub_stage, shared.only.as_ref(), shared.without.as_ref())
    }

    /// Drive the full stage: start notice, every included sub-stage in
    /// declared order, end notice.
    ///
    /// Sub-stages run strictly in sequence and each is awaited to completion
    /// before the next starts, because later sub-stages commonly consume
    /// filesystem state the earlier ones produced. The first error
    /// propagates immediately, skipping everything after it, end notice
    /// included. Calling `run` twice re-executes the whole list; instances
    /// are meant to be run once.
    async fn run(&mut self) -> Result<()> {
        self.start_end_notice(Moment::Start);
        for &sub_stage in self.sub_stages() {
            if !self.is_sub_stage_included(sub_stage) {
                log::debug!("{}: sub-stage '{}' filtered out", self.name(), sub_stage);
                self.logger()
                    .verbose_log(1, &format!("skipping {}", sub_stage));
                continue;
            }
            log::debug!("{}: running sub-stage '{}'", self.name(), sub_stage);
            self.dispatch(sub_stage).await?;
        }
        self.start_end_notice(Moment::End);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::WatchEvent;
    use crate::error::Error;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Minimal stage whose handlers only record their execution order.
    struct ScriptedStage {
        shared: StageArgs,
        logger: Logger,
        record: Arc<Mutex<Vec<String>>>,
        fail_on: Option<&'static str>,
        simulate_io: bool,
    }

    impl ScriptedStage {
        fn new(shared: StageArgs) -> Self {
            Self {
                shared,
                logger: Logger::silent(),
                record: Arc::new(Mutex::new(Vec::new())),
                fail_on: None,
                simulate_io: false,
            }
        }

        fn recorded(&self) -> Vec<String> {
            self.record.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Stage for ScriptedStage {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn sub_stages(&self) -> &'static [&'static str] {
            &["alpha", "beta", "gamma"]
        }

        fn shared(&self) -> &StageArgs {
            &self.shared
        }

        fn logger(&self) -> &Logger {
            &self.logger
        }

        fn emoji(&self) -> &'static str {
            "🎬"
        }

        fn verbs(&self) -> (&'static str, &'static str) {
            ("scripting", "scripted")
        }

        async fn dispatch(&mut self, sub_stage: &str) -> Result<()> {
            match sub_stage {
                "alpha" | "beta" | "gamma" => {
                    self.record.lock().unwrap().push(sub_stage.to_string());
                    if self.simulate_io {
                        // Variable-length awaits must not reorder execution.
                        let millis = match sub_stage {
                            "alpha" => 30,
                            "beta" => 1,
                            _ => 10,
                        };
                        tokio::time::sleep(Duration::from_millis(millis)).await;
                    }
                    if self.fail_on == Some(sub_stage) {
                        return Err(Error::Filesystem {
                            message: format!("{} exploded", sub_stage),
                        });
                    }
                    Ok(())
                }
                other => Err(Error::UnknownSubStage {
                    stage: self.name().to_string(),
                    name: other.to_string(),
                }),
            }
        }
    }

    mod filter_tests {
        use super::*;

        fn one(name: &str) -> Option<OneOrMany> {
            Some(OneOrMany::from(name))
        }

        fn many(names: &[&str]) -> Option<OneOrMany> {
            Some(OneOrMany::from(
                names.iter().map(|n| n.to_string()).collect::<Vec<_>>(),
            ))
        }

        #[test]
        fn test_no_filter_includes_everything() {
            assert!(is_included("a", None, None));
        }

        #[test]
        fn test_only_includes_named() {
            assert!(is_included("b", one("b").as_ref(), None));
            assert!(!is_included("a", one("b").as_ref(), None));
        }

        #[test]
        fn test_without_excludes_named() {
            let without = many(&["a", "c"]);
            assert!(is_included("b", None, without.as_ref()));
            assert!(!is_included("a", None, without.as_ref()));
            assert!(!is_included("c", None, without.as_ref()));
        }

        #[test]
        fn test_without_beats_only() {
            let only = many(&["a", "b"]);
            let without = one("b");
            assert!(is_included("a", only.as_ref(), without.as_ref()));
            assert!(!is_included("b", only.as_ref(), without.as_ref()));
        }

        #[test]
        fn test_empty_only_list_runs_nothing() {
            let only = many(&[]);
            assert!(!is_included("a", only.as_ref(), None));
        }
    }

    mod driver_tests {
        use super::*;

        #[tokio::test]
        async fn test_runs_all_sub_stages_in_declared_order() {
            let mut stage = ScriptedStage::new(StageArgs::default());
            stage.run().await.unwrap();
            assert_eq!(stage.recorded(), vec!["alpha", "beta", "gamma"]);
        }

        #[tokio::test]
        async fn test_only_single_name() {
            let mut shared = StageArgs::default();
            shared.only = Some(OneOrMany::from("beta"));
            let mut stage = ScriptedStage::new(shared);
            stage.run().await.unwrap();
            assert_eq!(stage.recorded(), vec!["beta"]);
        }

        #[tokio::test]
        async fn test_without_list() {
            let mut shared = StageArgs::default();
            shared.without = Some(OneOrMany::from(vec![
                "alpha".to_string(),
                "gamma".to_string(),
            ]));
            let mut stage = ScriptedStage::new(shared);
            stage.run().await.unwrap();
            assert_eq!(stage.recorded(), vec!["beta"]);
        }

        #[tokio::test]
        async fn test_only_and_without_combined() {
            let mut shared = StageArgs::default();
            shared.only = Some(OneOrMany::from(vec![
                "alpha".to_string(),
                "beta".to_string(),
            ]));
            shared.without = Some(OneOrMany::from("beta"));
            let mut stage = ScriptedStage::new(shared);
            stage.run().await.unwrap();
            assert_eq!(stage.recorded(), vec!["alpha"]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_variable_latency_keeps_declared_order() {
            let mut stage = ScriptedStage::new(StageArgs::default());
            stage.simulate_io = true;
            stage.run().await.unwrap();
            assert_eq!(stage.recorded(), vec!["alpha", "beta", "gamma"]);
        }

        #[tokio::test]
        async fn test_fail_fast_skips_rest() {
            let mut stage = ScriptedStage::new(StageArgs::default());
            stage.fail_on = Some("beta");
            let result = stage.run().await;
            match result {
                Err(Error::Filesystem { message }) => assert_eq!(message, "beta exploded"),
                other => panic!("expected beta's error, got {:?}", other),
            }
            // gamma never ran.
            assert_eq!(stage.recorded(), vec!["alpha", "beta"]);
        }

        #[tokio::test]
        async fn test_dispatch_rejects_undeclared_name() {
            let mut stage = ScriptedStage::new(StageArgs::default());
            let result = stage.dispatch("deploy").await;
            assert!(matches!(result, Err(Error::UnknownSubStage { .. })));
        }

        #[tokio::test]
        async fn test_run_twice_reexecutes_everything() {
            // Documented gap: no re-entrancy guard.
            let mut stage = ScriptedStage::new(StageArgs::default());
            stage.run().await.unwrap();
            stage.run().await.unwrap();
            assert_eq!(stage.recorded().len(), 6);
        }
    }

    mod notice_tests {
        use super::*;

        #[test]
        fn test_full_run_notice_wording() {
            let stage = ScriptedStage::new(StageArgs::default());
            insta::assert_snapshot!(
                stage.notice_text(Moment::Start),
                @"🎬 scripting package@0.0.0"
            );
            insta::assert_snapshot!(
                stage.notice_text(Moment::End),
                @"🎬 scripted package@0.0.0"
            );
        }

        #[test]
        fn test_watch_notice_is_compact() {
            let mut shared = StageArgs::default();
            shared.watch = Some(WatchEvent {
                event: "change".to_string(),
                path: "src/index.ts".to_string(),
            });
            let stage = ScriptedStage::new(shared);
            insta::assert_snapshot!(
                stage.notice_text(Moment::Start),
                @"scripting package@0.0.0 (change: src/index.ts)"
            );
            insta::assert_snapshot!(
                stage.notice_text(Moment::End),
                @"scripted package@0.0.0"
            );
        }
    }

    mod child_override_tests {
        use super::*;

        #[test]
        fn test_translates_namespaced_filters() {
            let parent = json!({
                "only": "compile",
                "without": ["test"],
                "only-compile": ["clean", "compile"],
                "without-compile": null,
                "log-base-level": 0,
                "verbose": true
            });
            let child = child_overrides(&parent, "compile");
            assert_eq!(child["only"], json!(["clean", "compile"]));
            assert!(child.get("without").is_none());
            assert_eq!(child["log-base-level"], json!(1));
            assert_eq!(child["verbose"], json!(true));
        }

        #[test]
        fn test_parent_filters_never_leak() {
            let parent = json!({ "only": "zip", "without": "copy", "log-base-level": 0 });
            let child = child_overrides(&parent, "build");
            assert!(child.get("only").is_none());
            assert!(child.get("without").is_none());
        }

        #[test]
        fn test_depth_increments_per_generation() {
            let parent = json!({ "log-base-level": 0 });
            let child = child_overrides(&parent, "build");
            assert_eq!(child["log-base-level"], json!(1));
            let grandchild = child_overrides(&child, "compile");
            assert_eq!(grandchild["log-base-level"], json!(2));
        }

        #[test]
        fn test_missing_depth_counts_from_zero() {
            let child = child_overrides(&json!({}), "compile");
            assert_eq!(child["log-base-level"], json!(1));
        }

        #[test]
        fn test_nested_child_table_is_hoisted() {
            let parent = json!({
                "log-base-level": 0,
                "verbose": true,
                "compile": { "command": "npx tsc", "verbose": false }
            });
            let child = child_overrides(&parent, "compile");
            assert_eq!(child["command"], json!("npx tsc"));
            // Hoisted entries win over ride-along parent fields.
            assert_eq!(child["verbose"], json!(false));
            assert!(child.get("compile").is_none());
        }

        #[test]
        fn test_namespaced_filter_wins_over_hoisted() {
            let parent = json!({
                "compile": { "only": "clean" },
                "only-compile": "assets"
            });
            let child = child_overrides(&parent, "compile");
            assert_eq!(child["only"], json!("assets"));
        }

        #[test]
        fn test_hoisted_depth_never_breaks_increment() {
            let parent = json!({
                "log-base-level": 2,
                "compile": { "log-base-level": 7 }
            });
            let child = child_overrides(&parent, "compile");
            assert_eq!(child["log-base-level"], json!(3));
        }
    }
}
