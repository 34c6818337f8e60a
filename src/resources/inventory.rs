// src/resources/inventory.rs

//! GPU device discovery.

use std::fmt::Debug;
use std::process::Command;

use anyhow::{Context, anyhow};
use tracing::debug;

use crate::config::{DeviceSection, InventoryKind};
use crate::errors::Result;

pub type DeviceId = u32;

/// Source of GPU availability.
pub trait DeviceInventory: Send + Sync + Debug {
    /// Devices whose load and memory use are at or below the given fractions,
    /// in inventory order.
    fn list_available(&self, max_load: f32, max_memory: f32) -> Result<Vec<DeviceId>>;

    /// Every device visible on the host.
    fn list_all(&self) -> Result<Vec<DeviceId>> {
        self.list_available(1.0, 1.0)
    }
}

/// Fixed device list that always reports every device as idle.
#[derive(Debug, Clone, Default)]
pub struct StaticInventory {
    ids: Vec<DeviceId>,
}

impl StaticInventory {
    pub fn new(ids: Vec<DeviceId>) -> Self {
        Self { ids }
    }
}

impl DeviceInventory for StaticInventory {
    fn list_available(&self, _max_load: f32, _max_memory: f32) -> Result<Vec<DeviceId>> {
        Ok(self.ids.clone())
    }
}

/// Snapshot of one device's utilisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceStatus {
    pub id: DeviceId,
    /// Fraction 0..=1.
    pub load: f32,
    /// Fraction 0..=1 of total memory in use.
    pub memory: f32,
}

impl DeviceStatus {
    pub fn eligible(&self, max_load: f32, max_memory: f32) -> bool {
        self.load <= max_load && self.memory <= max_memory
    }
}

/// Queries `nvidia-smi` on every call.
#[derive(Debug, Clone)]
pub struct NvidiaSmiInventory {
    program: String,
}

impl Default for NvidiaSmiInventory {
    fn default() -> Self {
        Self {
            program: "nvidia-smi".to_string(),
        }
    }
}

impl NvidiaSmiInventory {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn query(&self) -> anyhow::Result<Vec<DeviceStatus>> {
        let output = Command::new(&self.program)
            .args([
                "--query-gpu=index,utilization.gpu,memory.used,memory.total",
                "--format=csv,noheader,nounits",
            ])
            .output()
            .with_context(|| format!("running {}", self.program))?;

        if !output.status.success() {
            return Err(anyhow!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        parse_nvidia_smi(&String::from_utf8_lossy(&output.stdout))
    }
}

impl DeviceInventory for NvidiaSmiInventory {
    fn list_available(&self, max_load: f32, max_memory: f32) -> Result<Vec<DeviceId>> {
        let statuses = self.query()?;
        debug!(?statuses, "nvidia-smi device query");
        Ok(statuses
            .iter()
            .filter(|s| s.eligible(max_load, max_memory))
            .map(|s| s.id)
            .collect())
    }
}

/// Parse `index, utilization.gpu, memory.used, memory.total` CSV rows
/// (no header, no units).
pub fn parse_nvidia_smi(output: &str) -> anyhow::Result<Vec<DeviceStatus>> {
    let mut devices = Vec::new();
    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let [id, util, used, total] = fields.as_slice() else {
            return Err(anyhow!("unexpected nvidia-smi row: {line:?}"));
        };

        let id: DeviceId = id
            .parse()
            .with_context(|| format!("device index in {line:?}"))?;
        let util: f32 = util
            .parse()
            .with_context(|| format!("utilization in {line:?}"))?;
        let used: f32 = used
            .parse()
            .with_context(|| format!("memory.used in {line:?}"))?;
        let total: f32 = total
            .parse()
            .with_context(|| format!("memory.total in {line:?}"))?;

        devices.push(DeviceStatus {
            id,
            load: util / 100.0,
            memory: if total > 0.0 { used / total } else { 1.0 },
        });
    }
    Ok(devices)
}

/// Build the inventory named by `[devices]`.
pub fn inventory_from_config(section: &DeviceSection) -> Box<dyn DeviceInventory> {
    match section.inventory {
        InventoryKind::Static => Box::new(StaticInventory::new(section.ids.clone())),
        InventoryKind::NvidiaSmi => Box::new(NvidiaSmiInventory::default()),
    }
}
