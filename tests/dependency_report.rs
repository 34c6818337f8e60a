use std::collections::BTreeMap;

use polishplan::dag::report::{DEFAULT_BUCKET, TSV_HEADER};
use polishplan::dag::{DagView, JobGraph, build_report, run_report, sample_tag};
use polishplan::errors::{ErrorKind, PlanError};
use polishplan_test_utils::builders::JobGraphBuilder;

/// S1: assemble -> racon1 -> racon2 -> medaka, plus assemble -> medaka
/// (a second, shorter path). S2: assemble only, already satisfied.
fn graph() -> JobGraph {
    JobGraphBuilder::new()
        .job("asm_S1", "assemble", true, &[], &[("uuid", "S1")])
        .job(
            "racon1_S1",
            "racon",
            true,
            &["asm_S1"],
            &[("name", "S1.spell.ctg.cns.racon-ont-1")],
        )
        .job(
            "racon2_S1",
            "racon",
            true,
            &["racon1_S1"],
            &[("name", "S1.spell.ctg.cns.racon-ont-2")],
        )
        .job(
            "medaka_S1",
            "medaka",
            true,
            &["racon2_S1", "asm_S1"],
            &[("name", "S1.spell.ctg.cns.racon-ont-2.medaka-ont-1")],
        )
        .job("_touch_S1", "_touch", true, &["asm_S1"], &[("uuid", "S1")])
        .job("asm_S2", "assemble", false, &[], &[("uuid", "S2")])
        .job("download_db", "download", false, &[], &[])
        .job(
            "all",
            "all",
            true,
            &["medaka_S1", "asm_S2", "download_db", "_touch_S1"],
            &[],
        )
        .build()
}

#[test]
fn sample_tag_uses_uuid_then_artifact_name() {
    let mut wc = BTreeMap::new();
    assert_eq!(sample_tag(&wc), DEFAULT_BUCKET);

    wc.insert("name".to_string(), "S7.spell.ctg.cns.racon-ont-1".to_string());
    assert_eq!(sample_tag(&wc), "S7");

    wc.insert("uuid".to_string(), "S8".to_string());
    assert_eq!(sample_tag(&wc), "S8");

    let mut bad = BTreeMap::new();
    bad.insert("name".to_string(), "not-a-name".to_string());
    assert_eq!(sample_tag(&bad), DEFAULT_BUCKET);
}

#[test]
fn graph_adapter_answers_queries() {
    let g = graph();
    assert_eq!(g.len(), 8);
    assert_eq!(g.dependencies("racon1_S1"), vec!["asm_S1".to_string()]);
    let mut dependents = g.dependents("asm_S1");
    dependents.sort();
    assert_eq!(dependents, vec!["_touch_S1", "medaka_S1", "racon1_S1"]);
    assert!(!g.needs_run("asm_S2"));
    assert_eq!(g.rule_name("all"), "all");
    assert!(g.dependencies("nope").is_empty());
}

#[test]
fn jobs_keep_their_deepest_position() {
    let report = build_report(&graph(), "all").unwrap();

    let s1 = &report.buckets["S1"];
    let depths: Vec<(&str, usize)> = s1.iter().map(|l| (l.job_id.as_str(), l.depth)).collect();
    assert_eq!(
        depths,
        vec![("asm_S1", 0), ("racon1_S1", 1), ("racon2_S1", 2), ("medaka_S1", 3)]
    );
}

#[test]
fn each_job_printed_once_and_bookkeeping_skipped() {
    let report = build_report(&graph(), "all").unwrap();
    let ids: Vec<&str> = report.lines().map(|l| l.job_id.as_str()).collect();

    assert_eq!(ids.iter().filter(|id| **id == "medaka_S1").count(), 1);
    assert!(!ids.contains(&"_touch_S1"));
    assert!(!ids.contains(&"all"));
    assert!(!ids.contains(&"download_db"));
    assert!(!report.buckets.contains_key(DEFAULT_BUCKET));
}

#[test]
fn markers_distinguish_run_from_satisfied() {
    let report = build_report(&graph(), "all").unwrap();
    let s2 = &report.buckets["S2"];
    assert_eq!(s2.len(), 1);
    assert_eq!(s2[0].marker(), '-');
    assert_eq!(s2[0].to_tsv(), "S2\t0\t-\tasm_S2\tassemble");
    assert_eq!(report.buckets["S1"][2].to_console(), "    2 * racon2_S1 (racon)");
}

#[test]
fn missing_terminal_job_is_an_invariant_violation() {
    let g = JobGraphBuilder::new()
        .job("asm_S1", "assemble", true, &[], &[("uuid", "S1")])
        .build();

    match build_report(&g, "all") {
        Err(err @ PlanError::SchedulingInvariant(_)) => {
            assert_eq!(err.kind(), ErrorKind::SchedulingInvariant);
            assert!(!err.is_plan_fatal());
        }
        other => panic!("expected SchedulingInvariant, got {other:?}"),
    }
}

#[test]
fn terminal_job_with_dependents_is_an_invariant_violation() {
    let g = JobGraphBuilder::new()
        .job("all", "all", true, &[], &[])
        .job("after_all", "cleanup", true, &["all"], &[])
        .build();

    assert!(matches!(
        build_report(&g, "all"),
        Err(PlanError::SchedulingInvariant(_))
    ));
}

#[test]
fn cyclic_or_dangling_job_files_are_rejected() {
    let cyclic = JobGraphBuilder::new()
        .job("a", "x", true, &["b"], &[])
        .job("b", "x", true, &["a"], &[])
        .raw();
    assert!(matches!(
        JobGraph::try_from(cyclic),
        Err(PlanError::SchedulingInvariant(_))
    ));

    let dangling = JobGraphBuilder::new()
        .job("a", "x", true, &["ghost"], &[])
        .raw();
    assert!(matches!(
        JobGraph::try_from(dangling),
        Err(PlanError::ConfigError(_))
    ));
}

#[test]
fn run_report_writes_console_and_tsv_log() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("logs/deps.tsv");
    let mut console = Vec::new();

    let report = run_report(&graph(), "all", &mut console, &log).unwrap();

    let console = String::from_utf8(console).unwrap();
    assert!(console.starts_with("S1\n0 * asm_S1 (assemble)\n"));
    assert!(console.contains("S2\n0 - asm_S2 (assemble)\n"));

    let tsv = std::fs::read_to_string(&log).unwrap();
    let mut rows = tsv.lines();
    assert_eq!(rows.next(), Some(TSV_HEADER));
    assert_eq!(rows.count(), report.lines().count());
}

#[test]
fn loads_job_graph_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.toml");
    std::fs::write(
        &path,
        r#"
[job.asm_S1]
rule = "assemble"
wildcards = { uuid = "S1" }

[job.all]
rule = "all"
needs_run = false
after = ["asm_S1"]
"#,
    )
    .unwrap();

    let g = JobGraph::load(&path).unwrap();
    assert!(g.needs_run("asm_S1"));
    assert!(!g.needs_run("all"));
    let report = build_report(&g, "all").unwrap();
    assert_eq!(report.buckets["S1"].len(), 1);
}
