use std::collections::BTreeSet;

use polishplan::campaign::{Campaign, ReadColumn};
use polishplan::errors::PlanError;
use polishplan::plan::{AssemblyOptions, ReadOptions, enumerate_assemblies, enumerate_reads};
use polishplan_test_utils::builders::{CampaignBuilder, SampleBuilder};

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn three_samples() -> Campaign {
    CampaignBuilder::new()
        .with_sample(SampleBuilder::new("S1", "spell").build())
        .with_sample(SampleBuilder::new("S2", "spell").build())
        .with_sample(
            SampleBuilder::new("S3", "spell")
                .chain("racon-ont-2.medaka-ont-1")
                .build(),
        )
        .build()
}

#[test]
fn terminal_chain_only_without_unroll() {
    let names = enumerate_assemblies(
        &three_samples(),
        AssemblyOptions {
            polished: true,
            unroll: false,
            grouped_only: false,
        },
    );
    assert_eq!(
        names,
        set(&[
            "S1.spell.ctg.cns",
            "S2.spell.ctg.cns",
            "S3.spell.ctg.cns",
            "S3.spell.ctg.cns.racon-ont-2.medaka-ont-1",
        ])
    );
}

#[test]
fn every_round_with_unroll() {
    let names = enumerate_assemblies(
        &three_samples(),
        AssemblyOptions {
            polished: true,
            unroll: true,
            grouped_only: false,
        },
    );
    assert_eq!(
        names,
        set(&[
            "S1.spell.ctg.cns",
            "S2.spell.ctg.cns",
            "S3.spell.ctg.cns",
            "S3.spell.ctg.cns.racon-ont-2.medaka-ont-1",
            "S3.spell.ctg.cns.racon-ont-2",
            "S3.spell.ctg.cns.racon-ont-1",
        ])
    );
}

#[test]
fn base_only_skips_chains() {
    let names = enumerate_assemblies(
        &three_samples(),
        AssemblyOptions {
            polished: false,
            unroll: true,
            grouped_only: false,
        },
    );
    assert_eq!(
        names,
        set(&["S1.spell.ctg.cns", "S2.spell.ctg.cns", "S3.spell.ctg.cns"])
    );
}

#[test]
fn repolishing_sample_contributes_no_base_of_its_own() {
    let campaign = CampaignBuilder::new()
        .with_sample(SampleBuilder::new("REF", "spell").build())
        .with_sample(
            SampleBuilder::new("A", "spell")
                .repolish("REF")
                .chain("racon-ont-1")
                .build(),
        )
        .build();

    let names = enumerate_assemblies(&campaign, AssemblyOptions::default());
    assert_eq!(
        names,
        set(&["REF.spell.ctg.cns", "A.spell.ctg.cns.racon-ont-1"])
    );
}

#[test]
fn grouped_only_filters_ungrouped_samples() {
    let campaign = CampaignBuilder::new()
        .with_sample(SampleBuilder::new("S1", "spell").group("g1").build())
        .with_sample(SampleBuilder::new("S2", "spell").build())
        .build();

    let names = enumerate_assemblies(
        &campaign,
        AssemblyOptions {
            grouped_only: true,
            ..AssemblyOptions::default()
        },
    );
    assert_eq!(names, set(&["S1.spell.ctg.cns"]));
}

#[test]
fn enumeration_is_deterministic() {
    let a = enumerate_assemblies(&three_samples(), AssemblyOptions::default());
    let b = enumerate_assemblies(&three_samples(), AssemblyOptions::default());
    assert_eq!(
        a.iter().collect::<Vec<_>>(),
        b.iter().collect::<Vec<_>>()
    );
}

fn shared_reads() -> Campaign {
    CampaignBuilder::new()
        .with_sample(SampleBuilder::new("S1", "spell").reads("run1").group("g1").build())
        .with_sample(SampleBuilder::new("S2", "spell").reads("run1").group("g2").build())
        .with_sample(SampleBuilder::new("S3", "spell").reads("run2").build())
        .with_all_reads("run1")
        .with_read("run2", ReadColumn::Ont, "reads/run2.fq.gz:bc01")
        .build()
}

#[test]
fn reads_are_deduplicated_per_path() {
    let reads =
        enumerate_reads(&shared_reads(), &[ReadColumn::Ont], ReadOptions::default()).unwrap();
    assert_eq!(
        reads,
        set(&["reads/run1.ont.fq.gz", "reads/run2.fq.gz:bc01"])
    );
}

#[test]
fn reads_cover_requested_columns_only() {
    let reads = enumerate_reads(
        &shared_reads(),
        &[ReadColumn::I1, ReadColumn::I2],
        ReadOptions::default(),
    )
    .unwrap();
    assert_eq!(
        reads,
        set(&["reads/run1.i1.fq.gz", "reads/run1.i2.fq.gz"])
    );
}

#[test]
fn group_scoped_reads_split_shared_files_and_skip_ungrouped() {
    let reads = enumerate_reads(
        &shared_reads(),
        &[ReadColumn::Ont],
        ReadOptions { group_scoped: true },
    )
    .unwrap();
    assert_eq!(
        reads,
        set(&["reads/run1.ont.fq.gz.g1", "reads/run1.ont.fq.gz.g2"])
    );
}

#[test]
fn reads_for_sample_without_read_source_fail() {
    let campaign = CampaignBuilder::new()
        .with_sample(SampleBuilder::new("S1", "spell").reads("NOPE").build())
        .with_sample(SampleBuilder::new("S2", "spell").reads("R2").build())
        .with_read("R2", ReadColumn::Ont, "r2.fq")
        .build();

    match enumerate_reads(&campaign, &[ReadColumn::Ont], ReadOptions::default()) {
        Err(PlanError::MissingReadSource { sample, key }) => {
            assert_eq!(sample, "S1");
            assert_eq!(key, "NOPE");
        }
        other => panic!("expected MissingReadSource, got {other:?}"),
    }
}
