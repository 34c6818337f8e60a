// src/config/validate.rs

use std::collections::BTreeMap;

use tracing::debug;

use crate::campaign::{Campaign, ReadSource, SampleSpec};
use crate::config::model::{CampaignConfig, RawCampaignConfig};
use crate::errors::{PlanError, Result};
use crate::naming::ArtifactName;

impl TryFrom<RawCampaignConfig> for CampaignConfig {
    type Error = PlanError;

    fn try_from(raw: RawCampaignConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(CampaignConfig::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawCampaignConfig) -> Result<()> {
    if cfg.campaign.max_threads == 0 {
        return Err(PlanError::ConfigError(
            "[campaign].max_threads must be >= 1 (got 0)".to_string(),
        ));
    }

    for (key, threads) in cfg.threads.iter() {
        if *threads == 0 {
            return Err(PlanError::ConfigError(format!(
                "[threads].{key} must be >= 1 (got 0)"
            )));
        }
    }

    for (name, value) in [
        ("max_load", cfg.devices.max_load),
        ("max_memory", cfg.devices.max_memory),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(PlanError::ConfigError(format!(
                "[devices].{name} must be within 0..=1 (got {value})"
            )));
        }
    }

    if cfg.report.terminal_rule.trim().is_empty() {
        return Err(PlanError::ConfigError(
            "[report].terminal_rule must not be empty".to_string(),
        ));
    }

    Ok(())
}

/// Cross-check the sample and read tables and freeze them into a
/// [`Campaign`].
///
/// Checks:
/// - every `repolishTarget` names another, existing sample
/// - a repolish target does not itself repolish another sample
/// - every polish chain only uses supported polisher / read-type pairs
///
/// - every uuid and assemblerConfig is usable as an artifact name field
///
/// Missing read sources are *not* rejected here: they surface as
/// `MissingReadSource` from the resolver and from read enumeration.
pub fn validate_campaign(
    samples: BTreeMap<String, SampleSpec>,
    reads: BTreeMap<String, ReadSource>,
) -> Result<Campaign> {
    for (uuid, sample) in samples.iter() {
        ArtifactName::check_parts(&sample.uuid, &sample.assembler_config).map_err(|e| {
            PlanError::ConfigError(format!("sample '{uuid}' cannot be named: {e}"))
        })?;

        if let Some(ref target) = sample.repolish_target {
            if target == uuid {
                return Err(PlanError::ConfigError(format!(
                    "sample '{uuid}' cannot use itself as repolishTarget"
                )));
            }
            let Some(target_spec) = samples.get(target) else {
                return Err(PlanError::ConfigError(format!(
                    "sample '{uuid}' has unknown repolishTarget '{target}'"
                )));
            };
            if let Some(ref nested) = target_spec.repolish_target {
                return Err(PlanError::ConfigError(format!(
                    "sample '{uuid}' repolishes '{target}', which itself repolishes '{nested}'"
                )));
            }
        }

        sample.polish_chain.check_supported()?;
    }

    debug!(
        samples = samples.len(),
        read_sources = reads.len(),
        "campaign tables validated"
    );

    Ok(Campaign::new_unchecked(samples, reads))
}
