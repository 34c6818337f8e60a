// src/resources/mod.rs

//! Compute-resource declarations for jobs.
//!
//! - [`inventory`] abstracts GPU discovery behind [`DeviceInventory`].
//! - [`allocator`] applies override / default / fallback precedence and
//!   picks device ids.

pub mod allocator;
pub mod inventory;

pub use allocator::{ResourceAllocator, ResourceRequest, ResourceSettings, cuda_visible_devices};
pub use inventory::{
    DeviceId, DeviceInventory, DeviceStatus, NvidiaSmiInventory, StaticInventory,
    inventory_from_config, parse_nvidia_smi,
};
