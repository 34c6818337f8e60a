// src/resources/allocator.rs

//! Per-job thread / GPU declarations.
//!
//! Device selection samples live load at decision time and reserves nothing.
//! Two jobs admitted concurrently may therefore pick overlapping devices;
//! random choice among eligible devices only spreads load on average and is
//! not an exclusivity guarantee.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use rand::seq::IteratorRandom;
use tracing::{debug, warn};

use crate::campaign::SampleSpec;
use crate::config::CampaignConfig;
use crate::errors::{PlanError, Result};
use crate::resources::inventory::{DeviceId, DeviceInventory};

/// Campaign-wide resource defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSettings {
    pub threads: BTreeMap<String, u32>,
    pub gpus: BTreeMap<String, u32>,
    /// Global concurrency ceiling.
    pub max_threads: u32,
    pub max_load: f32,
    pub max_memory: f32,
}

impl ResourceSettings {
    pub fn from_config(cfg: &CampaignConfig) -> Self {
        Self {
            threads: cfg.threads.clone(),
            gpus: cfg.gpus.clone(),
            max_threads: cfg.campaign.max_threads,
            max_load: cfg.devices.max_load,
            max_memory: cfg.devices.max_memory,
        }
    }
}

/// Resources declared for one job right before dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub threads: u32,
    pub gpu_count: u32,
    pub gpu_ids: BTreeSet<DeviceId>,
}

impl ResourceRequest {
    /// Value for `CUDA_VISIBLE_DEVICES`.
    pub fn cuda_visible_devices(&self) -> String {
        cuda_visible_devices(&self.gpu_ids)
    }
}

pub fn cuda_visible_devices(ids: &BTreeSet<DeviceId>) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Debug, Clone, Copy)]
pub struct ResourceAllocator<'a> {
    settings: &'a ResourceSettings,
    inventory: &'a dyn DeviceInventory,
}

impl<'a> ResourceAllocator<'a> {
    pub fn new(settings: &'a ResourceSettings, inventory: &'a dyn DeviceInventory) -> Self {
        Self {
            settings,
            inventory,
        }
    }

    /// Per-sample `cpu`, then `[threads].<default_key>`, then the ceiling.
    pub fn thread_count(&self, sample: Option<&SampleSpec>, default_key: &str) -> u32 {
        if let Some(sample) = sample {
            if let Some(n) = sample.cpu_override() {
                return n;
            }
            if let Some(ref raw) = sample.cpu {
                warn!(
                    sample = %sample.uuid,
                    cpu = %raw,
                    "ignoring invalid cpu override (expected a positive integer)"
                );
            }
        }
        self.settings
            .threads
            .get(default_key)
            .copied()
            .unwrap_or(self.settings.max_threads)
    }

    /// Per-sample `gpu`, then `[gpus].<default_key>`, then every GPU the
    /// inventory can see.
    pub fn gpu_count(&self, sample: Option<&SampleSpec>, default_key: &str) -> Result<u32> {
        if let Some(sample) = sample {
            if let Some(n) = sample.gpu_override() {
                return Ok(n);
            }
            if let Some(ref raw) = sample.gpu {
                warn!(
                    sample = %sample.uuid,
                    gpu = %raw,
                    "ignoring invalid gpu override (expected a non-negative integer)"
                );
            }
        }
        if let Some(n) = self.settings.gpus.get(default_key) {
            return Ok(*n);
        }
        let visible = self.inventory.list_all()?;
        Ok(visible.len() as u32)
    }

    pub fn select_gpu_devices(&self, requested: u32) -> Result<BTreeSet<DeviceId>> {
        self.select_gpu_devices_with_rng(requested, &mut rand::rng())
    }

    /// Pick `requested` eligible devices uniformly at random.
    ///
    /// Fewer eligible devices than requested is a warning; none at all is
    /// `NoDeviceAvailable`.
    pub fn select_gpu_devices_with_rng<R: Rng + ?Sized>(
        &self,
        requested: u32,
        rng: &mut R,
    ) -> Result<BTreeSet<DeviceId>> {
        if requested == 0 {
            return Ok(BTreeSet::new());
        }

        let eligible = self
            .inventory
            .list_available(self.settings.max_load, self.settings.max_memory)?;

        if eligible.is_empty() {
            return Err(PlanError::NoDeviceAvailable { requested });
        }
        if eligible.len() < requested as usize {
            warn!(
                requested,
                available = eligible.len(),
                "fewer eligible GPUs than requested, continuing with a partial set"
            );
        }

        let chosen: BTreeSet<DeviceId> = eligible
            .iter()
            .copied()
            .choose_multiple(rng, requested as usize)
            .into_iter()
            .collect();
        debug!(requested, ?chosen, "selected GPU devices");
        Ok(chosen)
    }

    /// Full declaration for one job.
    pub fn request(&self, sample: Option<&SampleSpec>, default_key: &str) -> Result<ResourceRequest> {
        let threads = self.thread_count(sample, default_key);
        let gpu_count = self.gpu_count(sample, default_key)?;
        let gpu_ids = self.select_gpu_devices(gpu_count)?;
        Ok(ResourceRequest {
            threads,
            gpu_count,
            gpu_ids,
        })
    }
}
