// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::campaign::Campaign;
use crate::config::model::{CampaignConfig, RawCampaignConfig};
use crate::config::tables::{parse_read_table, parse_sample_table};
use crate::config::validate::validate_campaign;
use crate::errors::Result;

/// Load campaign settings from a given path without semantic validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawCampaignConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawCampaignConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load campaign settings and validate them.
///
/// Relative paths inside the file are resolved against the directory that
/// contains it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<CampaignConfig> {
    let path = path.as_ref();
    let raw = load_from_path(path)?;
    let config = CampaignConfig::try_from(raw)?;
    Ok(config.rebase(&config_root_dir(path)))
}

/// Read both tables named by `cfg` and freeze them into a [`Campaign`].
pub fn load_campaign(cfg: &CampaignConfig) -> Result<Campaign> {
    let samples_path = &cfg.campaign.samples;
    let reads_path = &cfg.campaign.reads;

    let samples = parse_sample_table(
        &samples_path.display().to_string(),
        &fs::read_to_string(samples_path)?,
    )?;
    let reads = parse_read_table(
        &reads_path.display().to_string(),
        &fs::read_to_string(reads_path)?,
    )?;

    let campaign = validate_campaign(samples, reads)?;
    info!(
        samples = campaign.sample_count(),
        read_sources = campaign.read_source_count(),
        "campaign loaded"
    );
    Ok(campaign)
}

/// Directory used to resolve relative paths found in a config file.
///
/// A bare filename (parent = "") resolves against the working directory.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
