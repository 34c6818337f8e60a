// src/campaign.rs

//! Immutable campaign tables: samples and read sources.
//!
//! Both tables are loaded once (see [`crate::config::loader`]) and then only
//! ever borrowed by the resolver, enumerator and allocator.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::{PlanError, Result};
use crate::naming::{ArtifactName, PolishChain};

/// One row of the sample table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSpec {
    pub uuid: String,
    pub assembler_config: String,
    pub read_source_key: String,
    pub polish_chain: PolishChain,
    /// Reuse this sample's base assembly instead of our own.
    pub repolish_target: Option<String>,
    pub ref_group: Option<String>,
    pub medaka_model: Option<String>,
    /// Raw per-sample overrides; only honoured when they parse as integers.
    pub cpu: Option<String>,
    pub gpu: Option<String>,
}

impl SampleSpec {
    pub fn base_assembly(&self) -> ArtifactName {
        ArtifactName::base(&self.uuid, &self.assembler_config)
    }

    pub fn cpu_override(&self) -> Option<u32> {
        self.cpu
            .as_deref()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|n| *n >= 1)
    }

    pub fn gpu_override(&self) -> Option<u32> {
        self.gpu.as_deref().and_then(|s| s.trim().parse::<u32>().ok())
    }
}

/// Read table column, i.e. physical read-file kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReadColumn {
    Ont,
    I1,
    I2,
}

impl ReadColumn {
    pub const ALL: [ReadColumn; 3] = [ReadColumn::Ont, ReadColumn::I1, ReadColumn::I2];

    pub fn as_str(self) -> &'static str {
        match self {
            ReadColumn::Ont => "ont",
            ReadColumn::I1 => "i1",
            ReadColumn::I2 => "i2",
        }
    }
}

impl fmt::Display for ReadColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadColumn {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "ont" => Ok(ReadColumn::Ont),
            "i1" => Ok(ReadColumn::I1),
            "i2" => Ok(ReadColumn::I2),
            other => Err(format!("unknown read column '{other}' (expected ont, i1 or i2)")),
        }
    }
}

/// A physical read file, optionally one barcode of a multiplexed run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReadFile {
    pub path: PathBuf,
    pub barcode: Option<String>,
}

impl ReadFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            barcode: None,
        }
    }

    /// Parse a read-table cell: `path` or `path:barcode`.
    pub fn parse_cell(cell: &str) -> Self {
        match cell.rsplit_once(':') {
            Some((path, barcode)) if !path.is_empty() && !barcode.is_empty() => Self {
                path: PathBuf::from(path),
                barcode: Some(barcode.to_string()),
            },
            _ => Self::new(cell),
        }
    }
}

impl fmt::Display for ReadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())?;
        if let Some(ref barcode) = self.barcode {
            write!(f, ":{barcode}")?;
        }
        Ok(())
    }
}

/// One row of the read table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadSource {
    pub key: String,
    pub files: BTreeMap<ReadColumn, ReadFile>,
}

impl ReadSource {
    pub fn get(&self, column: ReadColumn) -> Option<&ReadFile> {
        self.files.get(&column)
    }
}

/// Keyed, immutable view over both tables.
#[derive(Debug, Clone, Default)]
pub struct Campaign {
    samples: BTreeMap<String, SampleSpec>,
    reads: BTreeMap<String, ReadSource>,
}

impl Campaign {
    /// Build a campaign without cross-table validation.
    ///
    /// Used by the loader after validation, and by tests.
    pub fn new_unchecked(
        samples: BTreeMap<String, SampleSpec>,
        reads: BTreeMap<String, ReadSource>,
    ) -> Self {
        Self { samples, reads }
    }

    pub fn samples(&self) -> impl Iterator<Item = &SampleSpec> {
        self.samples.values()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn read_source_count(&self) -> usize {
        self.reads.len()
    }

    pub fn sample(&self, uuid: &str) -> Result<&SampleSpec> {
        self.samples
            .get(uuid)
            .ok_or_else(|| PlanError::UnknownSample(uuid.to_string()))
    }

    pub fn read_source(&self, sample: &SampleSpec) -> Result<&ReadSource> {
        self.reads
            .get(&sample.read_source_key)
            .ok_or_else(|| PlanError::MissingReadSource {
                sample: sample.uuid.clone(),
                key: sample.read_source_key.clone(),
            })
    }
}
