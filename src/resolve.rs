// src/resolve.rs

//! Input resolution: given a requested artifact, what does its build step
//! consume?
//!
//! The external scheduler calls into this while walking backwards from the
//! wanted artifacts. Every function is a pure lookup over the immutable
//! [`Campaign`]; all failures are plan-construction errors.

use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use crate::campaign::{Campaign, ReadColumn, ReadFile, SampleSpec};
use crate::config::CampaignConfig;
use crate::errors::{PlanError, Result};
use crate::naming::{ArtifactName, PolishStep, ReadType};

/// Where assembly artifacts live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyLayout {
    pub dir: PathBuf,
    pub suffix: String,
}

impl AssemblyLayout {
    pub fn new(dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            suffix: suffix.into(),
        }
    }

    pub fn from_config(cfg: &CampaignConfig) -> Self {
        Self::new(&cfg.campaign.assembly_dir, &cfg.campaign.assembly_suffix)
    }

    pub fn path_for(&self, name: &ArtifactName) -> PathBuf {
        self.dir.join(format!("{name}{}", self.suffix))
    }
}

/// Reads consumed by one polishing or alignment pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadPaths {
    Single(ReadFile),
    Paired(ReadFile, ReadFile),
}

impl ReadPaths {
    pub fn files(&self) -> Vec<&ReadFile> {
        match self {
            ReadPaths::Single(f) => vec![f],
            ReadPaths::Paired(r1, r2) => vec![r1, r2],
        }
    }
}

impl fmt::Display for ReadPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadPaths::Single(r) => write!(f, "{r}"),
            ReadPaths::Paired(r1, r2) => write!(f, "{r1} {r2}"),
        }
    }
}

/// Read selection for a pass. `depth` is carried through for the external
/// tool to sub-sample; the files are the same either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadSelection {
    pub reads: ReadPaths,
    pub depth: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
pub struct InputResolver<'a> {
    campaign: &'a Campaign,
    layout: &'a AssemblyLayout,
}

impl<'a> InputResolver<'a> {
    pub fn new(campaign: &'a Campaign, layout: &'a AssemblyLayout) -> Self {
        Self { campaign, layout }
    }

    /// Artifact that the final step of `requested` is applied to.
    ///
    /// - iteration > 1: the same chain one iteration earlier
    /// - iteration 1, first step: the base assembly, or the base assembly of
    ///   the sample's `repolishTarget` if one is set
    /// - iteration 1, later step: the base assembly plus the shorter chain
    pub fn predecessor(&self, requested: &ArtifactName) -> Result<ArtifactName> {
        let sample = self.sample_of(requested)?;
        let last = self.last_step(requested)?;
        last.check_supported()?;

        let pred = match last.previous_iteration() {
            Some(prev) => requested.with_chain(requested.chain.with_last(prev)),
            None if requested.chain.len() == 1 => self.base_assembly_of(sample)?,
            None => requested.with_chain(requested.chain.without_last()),
        };

        debug!(%requested, predecessor = %pred, "resolved contig input");
        Ok(pred)
    }

    /// Path of the contig file the final step of `requested` polishes.
    pub fn resolve_contig_input(&self, requested: &ArtifactName) -> Result<PathBuf> {
        Ok(self.layout.path_for(&self.predecessor(requested)?))
    }

    /// Reads used by the final polishing step of `requested`, with its depth
    /// qualifier.
    pub fn resolve_reads_for_polish(&self, requested: &ArtifactName) -> Result<ReadSelection> {
        let last = self.last_step(requested)?;
        last.check_supported()?;
        Ok(ReadSelection {
            reads: self.reads_for(self.sample_of(requested)?, last.read_type)?,
            depth: last.depth,
        })
    }

    /// Reads for the full-sample alignment pass; never depth-qualified.
    pub fn resolve_alignment_reads(&self, requested: &ArtifactName) -> Result<ReadSelection> {
        let last = self.last_step(requested)?;
        last.check_supported()?;
        Ok(ReadSelection {
            reads: self.reads_for(self.sample_of(requested)?, last.read_type)?,
            depth: None,
        })
    }

    /// The sample `requested` belongs to. Its assembler config must be the
    /// sample's own.
    fn sample_of(&self, requested: &ArtifactName) -> Result<&'a SampleSpec> {
        let sample = self.campaign.sample(&requested.uuid)?;
        if sample.assembler_config != requested.assembler_config {
            return Err(PlanError::ConfigError(format!(
                "'{requested}' uses assembler config '{}', but sample '{}' is assembled with '{}'",
                requested.assembler_config, sample.uuid, sample.assembler_config
            )));
        }
        Ok(sample)
    }

    fn last_step(&self, requested: &ArtifactName) -> Result<PolishStep> {
        requested.chain.last().copied().ok_or_else(|| {
            PlanError::malformed(
                requested.to_string(),
                "a base assembly has no polishing input",
            )
        })
    }

    fn base_assembly_of(&self, sample: &SampleSpec) -> Result<ArtifactName> {
        match sample.repolish_target {
            Some(ref target) => Ok(self.campaign.sample(target)?.base_assembly()),
            None => Ok(sample.base_assembly()),
        }
    }

    fn reads_for(&self, sample: &SampleSpec, read_type: ReadType) -> Result<ReadPaths> {
        let source = self.campaign.read_source(sample)?;
        let uuid = &sample.uuid;

        let file_for = |column: ReadColumn| {
            source.get(column).cloned().ok_or_else(|| {
                PlanError::ConfigError(format!(
                    "read source '{}' of sample '{uuid}' has no '{column}' reads",
                    source.key
                ))
            })
        };

        match read_type {
            ReadType::Ont => Ok(ReadPaths::Single(file_for(ReadColumn::Ont)?)),
            ReadType::Ill => Ok(ReadPaths::Paired(
                file_for(ReadColumn::I1)?,
                file_for(ReadColumn::I2)?,
            )),
        }
    }
}
