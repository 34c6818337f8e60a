#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use polishplan::campaign::{Campaign, ReadColumn, ReadFile, ReadSource, SampleSpec};
use polishplan::config::{
    CampaignConfig, CampaignSection, DeviceSection, RawCampaignConfig, ReportSection,
    validate_campaign,
};
use polishplan::dag::{JobConfig, JobGraph, RawJobGraph};
use polishplan::naming::PolishChain;

/// Builder for `SampleSpec`.
pub struct SampleBuilder {
    sample: SampleSpec,
}

impl SampleBuilder {
    /// A sample assembled with `spell` whose read source key equals its uuid.
    pub fn new(uuid: &str, spell: &str) -> Self {
        Self {
            sample: SampleSpec {
                uuid: uuid.to_string(),
                assembler_config: spell.to_string(),
                read_source_key: uuid.to_string(),
                polish_chain: PolishChain::empty(),
                repolish_target: None,
                ref_group: None,
                medaka_model: None,
                cpu: None,
                gpu: None,
            },
        }
    }

    pub fn reads(mut self, key: &str) -> Self {
        self.sample.read_source_key = key.to_string();
        self
    }

    pub fn chain(mut self, spec: &str) -> Self {
        self.sample.polish_chain =
            PolishChain::parse(spec).expect("builder chain spec must parse");
        self
    }

    pub fn repolish(mut self, target: &str) -> Self {
        self.sample.repolish_target = Some(target.to_string());
        self
    }

    pub fn group(mut self, group: &str) -> Self {
        self.sample.ref_group = Some(group.to_string());
        self
    }

    pub fn cpu(mut self, raw: &str) -> Self {
        self.sample.cpu = Some(raw.to_string());
        self
    }

    pub fn gpu(mut self, raw: &str) -> Self {
        self.sample.gpu = Some(raw.to_string());
        self
    }

    pub fn build(self) -> SampleSpec {
        self.sample
    }
}

/// Builder for a validated `Campaign`.
pub struct CampaignBuilder {
    samples: BTreeMap<String, SampleSpec>,
    reads: BTreeMap<String, ReadSource>,
}

impl CampaignBuilder {
    pub fn new() -> Self {
        Self {
            samples: BTreeMap::new(),
            reads: BTreeMap::new(),
        }
    }

    pub fn with_sample(mut self, sample: SampleSpec) -> Self {
        self.samples.insert(sample.uuid.clone(), sample);
        self
    }

    /// Add one read file to a read source, creating the source if needed.
    pub fn with_read(mut self, key: &str, column: ReadColumn, cell: &str) -> Self {
        let source = self.reads.entry(key.to_string()).or_insert_with(|| ReadSource {
            key: key.to_string(),
            files: BTreeMap::new(),
        });
        source.files.insert(column, ReadFile::parse_cell(cell));
        self
    }

    /// Add `ont`, `i1` and `i2` files named after the key.
    pub fn with_all_reads(self, key: &str) -> Self {
        self.with_read(key, ReadColumn::Ont, &format!("reads/{key}.ont.fq.gz"))
            .with_read(key, ReadColumn::I1, &format!("reads/{key}.i1.fq.gz"))
            .with_read(key, ReadColumn::I2, &format!("reads/{key}.i2.fq.gz"))
    }

    pub fn build(self) -> Campaign {
        validate_campaign(self.samples, self.reads).expect("Failed to build valid campaign")
    }
}

impl Default for CampaignBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `CampaignConfig`.
pub struct ConfigBuilder {
    config: RawCampaignConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawCampaignConfig {
                campaign: CampaignSection {
                    samples: PathBuf::from("samples.tsv"),
                    reads: PathBuf::from("reads.tsv"),
                    assembly_dir: PathBuf::from("assembly"),
                    assembly_suffix: ".fa".to_string(),
                    max_threads: 1,
                },
                threads: BTreeMap::new(),
                gpus: BTreeMap::new(),
                devices: DeviceSection::default(),
                report: ReportSection::default(),
            },
        }
    }

    pub fn max_threads(mut self, n: u32) -> Self {
        self.config.campaign.max_threads = n;
        self
    }

    pub fn threads(mut self, key: &str, n: u32) -> Self {
        self.config.threads.insert(key.to_string(), n);
        self
    }

    pub fn gpus(mut self, key: &str, n: u32) -> Self {
        self.config.gpus.insert(key.to_string(), n);
        self
    }

    pub fn thresholds(mut self, max_load: f32, max_memory: f32) -> Self {
        self.config.devices.max_load = max_load;
        self.config.devices.max_memory = max_memory;
        self
    }

    pub fn raw(self) -> RawCampaignConfig {
        self.config
    }

    pub fn build(self) -> CampaignConfig {
        CampaignConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `JobGraph`.
pub struct JobGraphBuilder {
    graph: RawJobGraph,
}

impl JobGraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: RawJobGraph::default(),
        }
    }

    /// Add a job. `wildcards` are `key=value` pairs.
    pub fn job(mut self, id: &str, rule: &str, needs_run: bool, after: &[&str], wildcards: &[(&str, &str)]) -> Self {
        self.graph.job.insert(
            id.to_string(),
            JobConfig {
                rule: rule.to_string(),
                needs_run,
                after: after.iter().map(|s| s.to_string()).collect(),
                wildcards: wildcards
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            },
        );
        self
    }

    pub fn raw(self) -> RawJobGraph {
        self.graph
    }

    pub fn build(self) -> JobGraph {
        JobGraph::try_from(self.graph).expect("Failed to build valid job graph from builder")
    }
}

impl Default for JobGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
