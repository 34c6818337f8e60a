// src/dag/report.rs

//! Per-sample dependency forest of the jobs a scheduler intends to run.
//!
//! This is a one-shot diagnostic over a frozen, acyclic graph. It does not
//! guard against cycles and never blocks execution.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::dag::view::{DagView, JobId};
use crate::errors::{PlanError, Result};
use crate::naming::ArtifactName;

/// Bucket for jobs without a sample wildcard.
pub const DEFAULT_BUCKET: &str = "default";

/// Wildcards that carry a sample uuid directly.
const SAMPLE_WILDCARDS: [&str; 2] = ["uuid", "sample"];

/// Wildcards that carry a full artifact name.
const NAME_WILDCARDS: [&str; 2] = ["name", "assembly"];

pub const TSV_HEADER: &str = "sample\tdepth\trunMarker\tjobId\truleName";

/// Sample tag for a job, or [`DEFAULT_BUCKET`].
pub fn sample_tag(wildcards: &BTreeMap<String, String>) -> String {
    for key in SAMPLE_WILDCARDS {
        if let Some(uuid) = wildcards.get(key) {
            return uuid.clone();
        }
    }
    for key in NAME_WILDCARDS {
        if let Some(name) = wildcards.get(key) {
            if let Ok(parsed) = ArtifactName::parse(name) {
                return parsed.uuid;
            }
        }
    }
    DEFAULT_BUCKET.to_string()
}

/// Internal jobs are named with a leading underscore.
pub fn is_bookkeeping(rule: &str) -> bool {
    rule.starts_with('_')
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub sample: String,
    pub depth: usize,
    pub must_run: bool,
    pub job_id: JobId,
    pub rule: String,
}

impl ReportLine {
    pub fn marker(&self) -> char {
        if self.must_run { '*' } else { '-' }
    }

    pub fn to_console(&self) -> String {
        format!(
            "{}{} {} {} ({})",
            "  ".repeat(self.depth),
            self.depth,
            self.marker(),
            self.job_id,
            self.rule
        )
    }

    pub fn to_tsv(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.sample,
            self.depth,
            self.marker(),
            self.job_id,
            self.rule
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyReport {
    /// Lines per sample bucket, ordered by depth then job id.
    pub buckets: BTreeMap<String, Vec<ReportLine>>,
}

impl DependencyReport {
    pub fn lines(&self) -> impl Iterator<Item = &ReportLine> {
        self.buckets.values().flatten()
    }

    pub fn write_console<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for (sample, lines) in self.buckets.iter() {
            writeln!(out, "{sample}")?;
            for line in lines {
                writeln!(out, "{}", line.to_console())?;
            }
        }
        Ok(())
    }

    pub fn write_tsv<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "{TSV_HEADER}")?;
        for line in self.lines() {
            writeln!(out, "{}", line.to_tsv())?;
        }
        Ok(())
    }

    pub fn write_tsv_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut out = BufWriter::new(File::create(path)?);
        self.write_tsv(&mut out)?;
        out.flush()?;
        Ok(())
    }
}

/// The single terminal aggregate job: rule `terminal_rule`, nothing after it.
fn find_terminal(dag: &dyn DagView, jobs: &[JobId], terminal_rule: &str) -> Result<JobId> {
    let terminals: Vec<&JobId> = jobs
        .iter()
        .filter(|j| dag.rule_name(j) == terminal_rule)
        .collect();

    let terminal = match terminals.as_slice() {
        [one] => (*one).clone(),
        [] => {
            return Err(PlanError::SchedulingInvariant(format!(
                "no terminal job with rule '{terminal_rule}' in the job graph"
            )));
        }
        many => {
            return Err(PlanError::SchedulingInvariant(format!(
                "{} jobs with terminal rule '{terminal_rule}', expected exactly one",
                many.len()
            )));
        }
    };

    let dependents = dag.dependents(&terminal);
    if !dependents.is_empty() {
        return Err(PlanError::SchedulingInvariant(format!(
            "terminal job '{terminal}' has dependents: {dependents:?}"
        )));
    }
    Ok(terminal)
}

/// Longest distance from the bucket's roots for every job reachable inside
/// the bucket.
fn max_depths(dag: &dyn DagView, members: &BTreeSet<JobId>) -> BTreeMap<JobId, usize> {
    let roots = members.iter().filter(|job| {
        dag.dependencies(job)
            .iter()
            .all(|dep| !members.contains(dep))
    });

    let mut depth: BTreeMap<JobId, usize> = BTreeMap::new();
    let mut stack: Vec<(JobId, usize)> = roots.map(|r| (r.clone(), 0)).collect();

    while let Some((job, d)) = stack.pop() {
        if depth.get(&job).is_some_and(|&known| known >= d) {
            continue;
        }
        depth.insert(job.clone(), d);
        for next in dag.dependents(&job) {
            if members.contains(&next) {
                stack.push((next, d + 1));
            }
        }
    }
    depth
}

/// Build the per-sample report.
///
/// Fails with `SchedulingInvariant` if the terminal aggregate job is missing,
/// duplicated, or has dependents.
pub fn build_report(dag: &dyn DagView, terminal_rule: &str) -> Result<DependencyReport> {
    let jobs = dag.jobs();
    let terminal = find_terminal(dag, &jobs, terminal_rule)?;

    let mut buckets: BTreeMap<String, BTreeSet<JobId>> = BTreeMap::new();
    for job in jobs.iter() {
        buckets
            .entry(sample_tag(&dag.wildcards(job)))
            .or_default()
            .insert(job.clone());
    }
    debug!(buckets = buckets.len(), %terminal, "partitioned jobs by sample");

    let mut report = DependencyReport::default();
    for (sample, mut members) in buckets {
        if sample == DEFAULT_BUCKET {
            continue;
        }
        members.remove(&terminal);

        let depths = max_depths(dag, &members);
        // Keyed by job, so a job reached along several paths appears once.
        let mut lines: Vec<ReportLine> = depths
            .iter()
            .filter_map(|(job, d)| {
                let rule = dag.rule_name(job);
                (!is_bookkeeping(&rule)).then(|| ReportLine {
                    sample: sample.clone(),
                    depth: *d,
                    must_run: dag.needs_run(job),
                    job_id: job.clone(),
                    rule,
                })
            })
            .collect();
        lines.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.job_id.cmp(&b.job_id)));

        if !lines.is_empty() {
            report.buckets.insert(sample, lines);
        }
    }

    Ok(report)
}

/// Build the report, print it to `console` and write the flat TSV log.
pub fn run_report<W: Write>(
    dag: &dyn DagView,
    terminal_rule: &str,
    console: &mut W,
    log_path: &Path,
) -> Result<DependencyReport> {
    let report = build_report(dag, terminal_rule)?;
    report.write_console(console)?;
    report.write_tsv_file(log_path)?;
    info!(
        samples = report.buckets.len(),
        jobs = report.lines().count(),
        log = %log_path.display(),
        "dependency report written"
    );
    Ok(report)
}
