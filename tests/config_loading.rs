use std::fs;
use std::path::Path;

use tempfile::TempDir;

use polishplan::Planner;
use polishplan::campaign::ReadColumn;
use polishplan::config::{
    InventoryKind, load_and_validate, load_campaign, parse_read_table, parse_sample_table,
};
use polishplan::errors::{ErrorKind, PlanError};
use polishplan_test_utils::builders::ConfigBuilder;

const SAMPLES: &str = "\
# campaign samples
uuid\tassemblerConfig\treadSourceKey\tpolishChainSpec\trepolishTarget\trefGroup\tmedakaModel\tcpu\tgpu
S1\tspell\trun1\tracon-ont-2.medaka-ont-1\t-\tg1\tr941_min_high\t8\t
S2\tspell\trun2\t\tS1\t\t-\t-\t1
";

const READS: &str = "\
readSourceKey\tont\ti1\ti2
run1\treads/run1.fq.gz\treads/run1_R1.fq.gz\treads/run1_R2.fq.gz
run2\treads/mux.fq.gz:barcode05\t-\t-
";

const CONFIG: &str = r#"
[campaign]
samples = "tables/samples.tsv"
reads = "tables/reads.tsv"
max_threads = 24

[threads]
racon = 16

[gpus]
medaka = 1

[devices]
inventory = "static"
ids = [0, 1]
max_load = 0.3
"#;

fn write_campaign(dir: &Path, config: &str, samples: &str, reads: &str) -> std::path::PathBuf {
    fs::create_dir_all(dir.join("tables")).unwrap();
    fs::write(dir.join("tables/samples.tsv"), samples).unwrap();
    fs::write(dir.join("tables/reads.tsv"), reads).unwrap();
    let path = dir.join("Polishplan.toml");
    fs::write(&path, config).unwrap();
    path
}

#[test]
fn loads_full_campaign() {
    let dir = TempDir::new().unwrap();
    let path = write_campaign(dir.path(), CONFIG, SAMPLES, READS);

    let cfg = load_and_validate(&path).unwrap();
    assert_eq!(cfg.campaign.max_threads, 24);
    assert_eq!(cfg.campaign.samples, dir.path().join("tables/samples.tsv"));
    assert_eq!(cfg.campaign.assembly_dir, dir.path().join("assembly"));
    assert_eq!(cfg.threads["racon"], 16);
    assert_eq!(cfg.devices.inventory, InventoryKind::Static);
    assert_eq!(cfg.devices.ids, vec![0, 1]);
    assert!((cfg.devices.max_load - 0.3).abs() < 1e-6);
    assert!((cfg.devices.max_memory - 0.5).abs() < 1e-6);
    assert_eq!(cfg.report.terminal_rule, "all");

    let campaign = load_campaign(&cfg).unwrap();
    assert_eq!(campaign.sample_count(), 2);

    let s1 = campaign.sample("S1").unwrap();
    assert_eq!(s1.polish_chain.to_string(), "racon-ont-2.medaka-ont-1");
    assert_eq!(s1.repolish_target, None);
    assert_eq!(s1.ref_group.as_deref(), Some("g1"));
    assert_eq!(s1.medaka_model.as_deref(), Some("r941_min_high"));
    assert_eq!(s1.cpu_override(), Some(8));
    assert_eq!(s1.gpu, None);

    let s2 = campaign.sample("S2").unwrap();
    assert!(s2.polish_chain.is_empty());
    assert_eq!(s2.repolish_target.as_deref(), Some("S1"));
    assert_eq!(s2.gpu_override(), Some(1));

    let run2 = campaign.read_source(s2).unwrap();
    let ont = run2.get(ReadColumn::Ont).unwrap();
    assert_eq!(ont.barcode.as_deref(), Some("barcode05"));
    assert!(run2.get(ReadColumn::I1).is_none());
}

#[test]
fn planner_wires_layout_and_settings() {
    let dir = TempDir::new().unwrap();
    let path = write_campaign(dir.path(), CONFIG, SAMPLES, READS);

    let planner = Planner::load(&path).unwrap();
    assert_eq!(planner.settings.max_threads, 24);
    assert_eq!(planner.layout.suffix, ".fa");

    let name = "S2.spell.ctg.cns.racon-ont-1".parse().unwrap();
    let contig = planner.resolver().resolve_contig_input(&name).unwrap();
    assert_eq!(contig, dir.path().join("assembly/S1.spell.ctg.cns.fa"));
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = load_and_validate(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, PlanError::IoError(_)));
}

#[test]
fn invalid_toml_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = write_campaign(dir.path(), "[campaign\nsamples = 1", SAMPLES, READS);
    assert!(matches!(
        load_and_validate(&path),
        Err(PlanError::TomlError(_))
    ));
}

#[test]
fn zero_max_threads_is_rejected() {
    let err = polishplan::config::CampaignConfig::try_from(
        ConfigBuilder::new().max_threads(0).raw(),
    )
    .unwrap_err();
    match err {
        PlanError::ConfigError(msg) => assert!(msg.contains("max_threads")),
        e => panic!("Expected ConfigError, got: {:?}", e),
    }
}

#[test]
fn out_of_range_threshold_is_rejected() {
    let result = polishplan::config::CampaignConfig::try_from(
        ConfigBuilder::new().thresholds(1.5, 0.5).raw(),
    );
    assert!(matches!(result, Err(PlanError::ConfigError(_))));
}

fn sample_table_error(contents: &str) -> String {
    match parse_sample_table("samples.tsv", contents) {
        Err(PlanError::ConfigError(msg)) => msg,
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn sample_table_errors() {
    let header = "uuid\tassemblerConfig\treadSourceKey\tpolishChainSpec\trepolishTarget\trefGroup\tmedakaModel\tcpu\tgpu\n";

    let msg = sample_table_error("uuid\tassemblerConfig\n");
    assert!(msg.contains("missing required column"));

    let msg = sample_table_error(&format!("{header}S1\tspell\n"));
    assert!(msg.contains("expected 9 columns"));

    let msg = sample_table_error(&format!(
        "{header}S1\tspell\tr\t\t\t\t\t\t\nS1\tspell\tr\t\t\t\t\t\t\n"
    ));
    assert!(msg.contains("duplicate uuid"));

    let msg = sample_table_error(&format!("{header}S1\tspell\tr\tracon-pacbio-1\t\t\t\t\t\n"));
    assert!(msg.contains("polishChainSpec"));

    let msg = sample_table_error(&format!("{header}S1\t-\tr\t\t\t\t\t\t\n"));
    assert!(msg.contains("assemblerConfig"));

    let msg = sample_table_error("");
    assert!(msg.contains("empty"));
}

#[test]
fn read_table_rejects_unknown_columns_and_duplicates() {
    let err = parse_read_table("reads.tsv", "readSourceKey\tpacbio\nr\tx.fq\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = parse_read_table("reads.tsv", "readSourceKey\tont\nr\ta.fq\nr\tb.fq\n").unwrap_err();
    assert!(err.to_string().contains("duplicate readSourceKey"));
}

#[test]
fn dangling_repolish_target_is_rejected() {
    let dir = TempDir::new().unwrap();
    let samples = "\
uuid\tassemblerConfig\treadSourceKey\tpolishChainSpec\trepolishTarget\trefGroup\tmedakaModel\tcpu\tgpu
S1\tspell\trun1\tracon-ont-1\tGHOST\t\t\t\t
";
    let path = write_campaign(dir.path(), CONFIG, samples, READS);
    let cfg = load_and_validate(&path).unwrap();

    match load_campaign(&cfg) {
        Err(PlanError::ConfigError(msg)) => assert!(msg.contains("GHOST")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn chained_repolish_targets_are_rejected() {
    let dir = TempDir::new().unwrap();
    let samples = "\
uuid\tassemblerConfig\treadSourceKey\tpolishChainSpec\trepolishTarget\trefGroup\tmedakaModel\tcpu\tgpu
A\tspell\trun1\t\tB\t\t\t\t
B\tspell\trun1\t\tC\t\t\t\t
C\tspell\trun1\t\t\t\t\t\t
";
    let path = write_campaign(dir.path(), CONFIG, samples, READS);
    let cfg = load_and_validate(&path).unwrap();
    assert!(matches!(load_campaign(&cfg), Err(PlanError::ConfigError(_))));
}

#[test]
fn unsupported_chain_step_fails_fast() {
    let dir = TempDir::new().unwrap();
    let samples = "\
uuid\tassemblerConfig\treadSourceKey\tpolishChainSpec\trepolishTarget\trefGroup\tmedakaModel\tcpu\tgpu
S1\tspell\trun1\tpilon-ont-1\t\t\t\t\t
";
    let path = write_campaign(dir.path(), CONFIG, samples, READS);
    let cfg = load_and_validate(&path).unwrap();
    assert!(matches!(
        load_campaign(&cfg),
        Err(PlanError::UnsupportedCombination { .. })
    ));
}

#[test]
fn dotted_uuid_or_assembler_config_is_rejected() {
    let header = "uuid\tassemblerConfig\treadSourceKey\tpolishChainSpec\trepolishTarget\trefGroup\tmedakaModel\tcpu\tgpu\n";

    for (row, field) in [
        ("S1.v2\tspell\trun1\tracon-ont-1\t\t\t\t\t\n", "S1.v2"),
        ("S1\tspell.v2\trun1\t\t\t\t\t\t\n", "spell.v2"),
    ] {
        let dir = TempDir::new().unwrap();
        let path = write_campaign(dir.path(), CONFIG, &format!("{header}{row}"), READS);
        let cfg = load_and_validate(&path).unwrap();

        match load_campaign(&cfg) {
            Err(PlanError::ConfigError(msg)) => assert!(msg.contains(field), "{msg}"),
            other => panic!("Expected ConfigError, got: {:?}", other),
        }
    }
}
