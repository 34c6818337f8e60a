// src/lib.rs

pub mod benchmark;
pub mod campaign;
pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod logging;
pub mod naming;
pub mod notify;
pub mod plan;
pub mod resolve;
pub mod resources;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, error, info};

use crate::campaign::{Campaign, ReadColumn};
use crate::cli::{CliArgs, Command};
use crate::config::{CampaignConfig, load_and_validate, load_campaign};
use crate::dag::{JobGraph, run_report};
use crate::errors::PlanError;
use crate::naming::{ArtifactName, unroll};
use crate::notify::{LogObserver, PlanObserver};
use crate::plan::{AssemblyOptions, ReadOptions, enumerate_assemblies, enumerate_reads};
use crate::resolve::{AssemblyLayout, InputResolver};
use crate::resources::{ResourceAllocator, ResourceSettings, inventory_from_config};

/// Everything loaded at plan-construction time.
#[derive(Debug, Clone)]
pub struct Planner {
    pub config: CampaignConfig,
    pub campaign: Campaign,
    pub layout: AssemblyLayout,
    pub settings: ResourceSettings,
}

impl Planner {
    pub fn load(config_path: &Path) -> errors::Result<Self> {
        let config = load_and_validate(config_path)?;
        let campaign = load_campaign(&config)?;
        Ok(Self::new(config, campaign))
    }

    pub fn new(config: CampaignConfig, campaign: Campaign) -> Self {
        let layout = AssemblyLayout::from_config(&config);
        let settings = ResourceSettings::from_config(&config);
        Self {
            config,
            campaign,
            layout,
            settings,
        }
    }

    pub fn resolver(&self) -> InputResolver<'_> {
        InputResolver::new(&self.campaign, &self.layout)
    }
}

/// High-level entry point used by `main.rs`.
///
/// Notifies the lifecycle observer around the command. A reporter invariant
/// violation is logged but does not fail the command.
pub fn run(args: CliArgs) -> Result<()> {
    let observer = LogObserver;
    let label = args.command.label();
    observer.plan_started(label);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match execute(&args, &mut out) {
        Ok(()) => {
            observer.plan_succeeded(label);
            Ok(())
        }
        Err(err @ PlanError::SchedulingInvariant(_)) => {
            error!("dependency report skipped: {err}");
            observer.plan_succeeded(label);
            Ok(())
        }
        Err(err) => {
            observer.plan_failed(label, &err);
            Err(err.into())
        }
    }
}

fn execute<W: Write>(args: &CliArgs, out: &mut W) -> errors::Result<()> {
    let config_path = PathBuf::from(&args.config);
    let planner = Planner::load(&config_path)?;

    match &args.command {
        Command::Check => print_summary(&planner, out)?,
        Command::Assemblies {
            unroll,
            base_only,
            grouped,
        } => {
            let options = AssemblyOptions {
                polished: !base_only,
                unroll: *unroll,
                grouped_only: *grouped,
            };
            for name in enumerate_assemblies(&planner.campaign, options) {
                writeln!(out, "{name}")?;
            }
        }
        Command::Reads {
            columns,
            group_scoped,
        } => {
            let columns: Vec<ReadColumn> = columns.iter().map(|c| (*c).into()).collect();
            let options = ReadOptions {
                group_scoped: *group_scoped,
            };
            for path in enumerate_reads(&planner.campaign, &columns, options)? {
                writeln!(out, "{path}")?;
            }
        }
        Command::Resolve { name } => {
            let name = ArtifactName::parse(name)?;
            let resolver = planner.resolver();
            let contig = resolver.resolve_contig_input(&name)?;
            let polish = resolver.resolve_reads_for_polish(&name)?;
            let align = resolver.resolve_alignment_reads(&name)?;

            writeln!(out, "contig\t{}", contig.display())?;
            match polish.depth {
                Some(depth) => writeln!(out, "polish_reads\t{}\tdepth={depth}", polish.reads)?,
                None => writeln!(out, "polish_reads\t{}", polish.reads)?,
            }
            writeln!(out, "alignment_reads\t{}", align.reads)?;
        }
        Command::Unroll { name } => {
            let name = ArtifactName::parse(name)?;
            planner.campaign.sample(&name.uuid)?;
            for chain in unroll(&name.chain, true) {
                writeln!(out, "{}", name.with_chain(chain))?;
            }
        }
        Command::Resources { name, key } => {
            let name = ArtifactName::parse(name)?;
            let sample = planner.campaign.sample(&name.uuid)?;
            let inventory = inventory_from_config(&planner.config.devices);
            let allocator = ResourceAllocator::new(&planner.settings, inventory.as_ref());
            let request = allocator.request(Some(sample), key)?;

            writeln!(out, "threads\t{}", request.threads)?;
            writeln!(out, "gpus\t{}", request.gpu_count)?;
            writeln!(out, "gpu_ids\t{}", request.cuda_visible_devices())?;
        }
        Command::Report { graph } => {
            let graph = JobGraph::load(graph)?;
            debug!(jobs = graph.len(), "job graph loaded");
            run_report(
                &graph,
                &planner.config.report.terminal_rule,
                out,
                &planner.config.report.log,
            )?;
        }
    }

    Ok(())
}

/// Dry-run output: what was loaded and what would be built.
fn print_summary<W: Write>(planner: &Planner, out: &mut W) -> errors::Result<()> {
    let cfg = &planner.config;
    writeln!(out, "polishplan check")?;
    writeln!(out, "  samples table = {}", cfg.campaign.samples.display())?;
    writeln!(out, "  reads table = {}", cfg.campaign.reads.display())?;
    writeln!(out, "  assembly_dir = {}", cfg.campaign.assembly_dir.display())?;
    writeln!(out, "  max_threads = {}", cfg.campaign.max_threads)?;
    writeln!(out)?;

    writeln!(out, "samples ({}):", planner.campaign.sample_count())?;
    for sample in planner.campaign.samples() {
        writeln!(out, "  - {}", sample.uuid)?;
        writeln!(out, "      assembler: {}", sample.assembler_config)?;
        writeln!(out, "      reads: {}", sample.read_source_key)?;
        if !sample.polish_chain.is_empty() {
            writeln!(out, "      chain: {}", sample.polish_chain)?;
        }
        if let Some(ref target) = sample.repolish_target {
            writeln!(out, "      repolishes: {target}")?;
        }
        if let Some(ref group) = sample.ref_group {
            writeln!(out, "      group: {group}")?;
        }
    }

    let wanted = enumerate_assemblies(&planner.campaign, AssemblyOptions::default());
    writeln!(out)?;
    writeln!(out, "wanted assemblies: {}", wanted.len())?;
    info!(wanted = wanted.len(), "check complete (no artifacts built)");
    Ok(())
}
