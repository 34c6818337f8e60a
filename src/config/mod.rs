// src/config/mod.rs

//! Campaign configuration.
//!
//! Responsibilities:
//! - Define the TOML-backed settings model (`model.rs`).
//! - Parse the tab-separated sample and read tables (`tables.rs`).
//! - Load everything from disk (`loader.rs`).
//! - Validate settings and cross-table references (`validate.rs`).

pub mod loader;
pub mod model;
pub mod tables;
pub mod validate;

pub use loader::{load_and_validate, load_campaign, load_from_path};
pub use model::{
    CampaignConfig, CampaignSection, DeviceSection, InventoryKind, RawCampaignConfig,
    ReportSection,
};
pub use tables::{parse_read_table, parse_sample_table};
pub use validate::validate_campaign;
