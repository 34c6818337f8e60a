// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Top-level campaign settings as read from a TOML file.
///
/// ```toml
/// [campaign]
/// samples = "samples.tsv"
/// reads = "reads.tsv"
/// max_threads = 32
///
/// [threads]
/// racon = 16
///
/// [gpus]
/// medaka = 1
///
/// [devices]
/// inventory = "nvidia-smi"
/// max_load = 0.5
/// max_memory = 0.5
/// ```
///
/// All sections except `[campaign]` are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCampaignConfig {
    pub campaign: CampaignSection,

    /// Campaign-wide thread counts keyed by job kind.
    #[serde(default)]
    pub threads: BTreeMap<String, u32>,

    /// Campaign-wide GPU counts keyed by job kind.
    #[serde(default)]
    pub gpus: BTreeMap<String, u32>,

    #[serde(default)]
    pub devices: DeviceSection,

    #[serde(default)]
    pub report: ReportSection,
}

/// `[campaign]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignSection {
    /// Tab-separated sample table.
    pub samples: PathBuf,

    /// Tab-separated read table.
    pub reads: PathBuf,

    #[serde(default = "default_assembly_dir")]
    pub assembly_dir: PathBuf,

    #[serde(default = "default_assembly_suffix")]
    pub assembly_suffix: String,

    /// Global concurrency ceiling, the last fallback for thread counts.
    #[serde(default = "default_max_threads")]
    pub max_threads: u32,
}

fn default_assembly_dir() -> PathBuf {
    PathBuf::from("assembly")
}

fn default_assembly_suffix() -> String {
    ".fa".to_string()
}

fn default_max_threads() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum InventoryKind {
    #[default]
    Static,
    NvidiaSmi,
}

/// `[devices]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSection {
    #[serde(default)]
    pub inventory: InventoryKind,

    /// Device ids of a static inventory.
    #[serde(default)]
    pub ids: Vec<u32>,

    /// Maximum load fraction (0..=1) for a device to be eligible.
    #[serde(default = "default_threshold")]
    pub max_load: f32,

    /// Maximum used-memory fraction (0..=1) for a device to be eligible.
    #[serde(default = "default_threshold")]
    pub max_memory: f32,
}

fn default_threshold() -> f32 {
    0.5
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            inventory: InventoryKind::default(),
            ids: Vec::new(),
            max_load: default_threshold(),
            max_memory: default_threshold(),
        }
    }
}

/// `[report]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSection {
    /// Rule name of the terminal aggregate job.
    #[serde(default = "default_terminal_rule")]
    pub terminal_rule: String,

    /// Flat per-run dependency report file.
    #[serde(default = "default_report_log")]
    pub log: PathBuf,
}

fn default_terminal_rule() -> String {
    "all".to_string()
}

fn default_report_log() -> PathBuf {
    PathBuf::from("dependency-report.tsv")
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            terminal_rule: default_terminal_rule(),
            log: default_report_log(),
        }
    }
}

/// Validated campaign settings.
///
/// Only constructible through `TryFrom<RawCampaignConfig>` (see
/// `config::validate`), so holders may rely on the checked invariants.
#[derive(Debug, Clone)]
pub struct CampaignConfig {
    pub campaign: CampaignSection,
    pub threads: BTreeMap<String, u32>,
    pub gpus: BTreeMap<String, u32>,
    pub devices: DeviceSection,
    pub report: ReportSection,
}

impl CampaignConfig {
    pub(crate) fn new_unchecked(raw: RawCampaignConfig) -> Self {
        Self {
            campaign: raw.campaign,
            threads: raw.threads,
            gpus: raw.gpus,
            devices: raw.devices,
            report: raw.report,
        }
    }

    /// Resolve table and output paths against the config file's directory.
    pub fn rebase(mut self, root: &std::path::Path) -> Self {
        let join = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                root.join(p)
            }
        };
        self.campaign.samples = join(&self.campaign.samples);
        self.campaign.reads = join(&self.campaign.reads);
        self.campaign.assembly_dir = join(&self.campaign.assembly_dir);
        self.report.log = join(&self.report.log);
        self
    }
}
