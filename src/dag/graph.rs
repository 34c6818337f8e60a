// src/dag/graph.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use serde::Deserialize;

use crate::dag::view::{DagView, JobId};
use crate::errors::{PlanError, Result};

/// Job graph file as read from TOML.
///
/// ```toml
/// [job.assemble_S1]
/// rule = "assemble"
/// needs_run = true
/// wildcards = { uuid = "S1" }
///
/// [job.all]
/// rule = "all"
/// after = ["assemble_S1"]
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawJobGraph {
    #[serde(default)]
    pub job: BTreeMap<String, JobConfig>,
}

/// `[job.<id>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    pub rule: String,

    #[serde(default = "default_needs_run")]
    pub needs_run: bool,

    /// Jobs this one depends on.
    #[serde(default)]
    pub after: Vec<String>,

    #[serde(default)]
    pub wildcards: BTreeMap<String, String>,
}

fn default_needs_run() -> bool {
    true
}

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone)]
struct JobNode {
    rule: String,
    needs_run: bool,
    wildcards: BTreeMap<String, String>,
    deps: Vec<JobId>,
    dependents: Vec<JobId>,
}

/// In-memory [`DagView`] adapter over a job graph file.
#[derive(Debug, Clone)]
pub struct JobGraph {
    nodes: BTreeMap<JobId, JobNode>,
}

impl JobGraph {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let raw: RawJobGraph = toml::from_str(&contents)?;
        Self::try_from(raw)
    }

    fn from_raw_unchecked(raw: RawJobGraph) -> Self {
        let mut nodes: BTreeMap<JobId, JobNode> = raw
            .job
            .into_iter()
            .map(|(id, cfg)| {
                (
                    id,
                    JobNode {
                        rule: cfg.rule,
                        needs_run: cfg.needs_run,
                        wildcards: cfg.wildcards,
                        deps: cfg.after,
                        dependents: Vec::new(),
                    },
                )
            })
            .collect();

        let edges: Vec<(JobId, JobId)> = nodes
            .iter()
            .flat_map(|(id, node)| node.deps.iter().map(move |dep| (dep.clone(), id.clone())))
            .collect();
        for (dep, job) in edges {
            if let Some(dep_node) = nodes.get_mut(&dep) {
                dep_node.dependents.push(job);
            }
        }

        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl TryFrom<RawJobGraph> for JobGraph {
    type Error = PlanError;

    fn try_from(raw: RawJobGraph) -> std::result::Result<Self, Self::Error> {
        validate_job_graph(&raw)?;
        Ok(Self::from_raw_unchecked(raw))
    }
}

fn validate_job_graph(raw: &RawJobGraph) -> Result<()> {
    for (id, job) in raw.job.iter() {
        for dep in job.after.iter() {
            if !raw.job.contains_key(dep) {
                return Err(PlanError::ConfigError(format!(
                    "job '{id}' has unknown dependency '{dep}' in `after`"
                )));
            }
            if dep == id {
                return Err(PlanError::ConfigError(format!(
                    "job '{id}' cannot depend on itself in `after`"
                )));
            }
        }
    }

    // Edge direction: dep -> job.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for id in raw.job.keys() {
        graph.add_node(id.as_str());
    }
    for (id, job) in raw.job.iter() {
        for dep in job.after.iter() {
            graph.add_edge(dep.as_str(), id.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(PlanError::SchedulingInvariant(format!(
            "cycle detected in job graph involving job '{}'",
            cycle.node_id()
        ))),
    }
}

impl DagView for JobGraph {
    fn jobs(&self) -> Vec<JobId> {
        self.nodes.keys().cloned().collect()
    }

    fn dependencies(&self, job: &str) -> Vec<JobId> {
        self.nodes
            .get(job)
            .map(|n| n.deps.clone())
            .unwrap_or_default()
    }

    fn dependents(&self, job: &str) -> Vec<JobId> {
        self.nodes
            .get(job)
            .map(|n| n.dependents.clone())
            .unwrap_or_default()
    }

    fn needs_run(&self, job: &str) -> bool {
        self.nodes.get(job).is_some_and(|n| n.needs_run)
    }

    fn wildcards(&self, job: &str) -> BTreeMap<String, String> {
        self.nodes
            .get(job)
            .map(|n| n.wildcards.clone())
            .unwrap_or_default()
    }

    fn rule_name(&self, job: &str) -> String {
        self.nodes
            .get(job)
            .map(|n| n.rule.clone())
            .unwrap_or_default()
    }
}
