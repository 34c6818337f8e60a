// src/dag/view.rs

use std::collections::BTreeMap;

pub type JobId = String;

/// Read-only view of a job graph built by an external scheduler.
///
/// The reporter only ever talks to this trait; adapters wrap whatever engine
/// actually owns the graph. Unknown job ids yield empty / default answers.
pub trait DagView {
    /// All job ids, in a stable order.
    fn jobs(&self) -> Vec<JobId>;

    /// Jobs that `job` depends on.
    fn dependencies(&self, job: &str) -> Vec<JobId>;

    /// Jobs that depend on `job`.
    fn dependents(&self, job: &str) -> Vec<JobId>;

    /// Whether the scheduler intends to (re)run `job`.
    fn needs_run(&self, job: &str) -> bool;

    fn wildcards(&self, job: &str) -> BTreeMap<String, String>;

    fn rule_name(&self, job: &str) -> String;
}
