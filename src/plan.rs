// src/plan.rs

//! Campaign-wide enumeration of wanted assemblies and referenced reads.
//!
//! Both functions return ordered sets so that identical tables always give
//! identical, stably ordered output.

use std::collections::BTreeSet;

use tracing::debug;

use crate::campaign::{Campaign, ReadColumn};
use crate::errors::Result;
use crate::naming::unroll;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyOptions {
    /// Include polished artifacts, not just base assemblies.
    pub polished: bool,
    /// Include every intermediate round of each polish chain.
    pub unroll: bool,
    /// Only consider samples that belong to a reference group.
    pub grouped_only: bool,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            polished: true,
            unroll: false,
            grouped_only: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadOptions {
    /// Suffix each path with the sample's reference group and skip samples
    /// without one.
    pub group_scoped: bool,
}

/// Every artifact name the campaign wants built.
///
/// A sample with a `repolishTarget` does not contribute its own base
/// assembly; it polishes the target's instead.
pub fn enumerate_assemblies(campaign: &Campaign, options: AssemblyOptions) -> BTreeSet<String> {
    let mut names = BTreeSet::new();

    for sample in campaign.samples() {
        if options.grouped_only && sample.ref_group.is_none() {
            continue;
        }

        let base = sample.base_assembly();
        if sample.repolish_target.is_none() {
            names.insert(base.to_string());
        }

        if options.polished && !sample.polish_chain.is_empty() {
            for chain in unroll(&sample.polish_chain, options.unroll) {
                names.insert(base.with_chain(chain).to_string());
            }
        }
    }

    debug!(count = names.len(), ?options, "enumerated assemblies");
    names
}

/// Every distinct read path referenced by a sample in one of `columns`.
///
/// With `group_scoped`, the same physical file used by two groups yields two
/// entries (`<path>.<refGroup>`). A sample whose read source is missing fails
/// with `MissingReadSource`.
pub fn enumerate_reads(
    campaign: &Campaign,
    columns: &[ReadColumn],
    options: ReadOptions,
) -> Result<BTreeSet<String>> {
    let mut reads = BTreeSet::new();

    for sample in campaign.samples() {
        let group = match (&sample.ref_group, options.group_scoped) {
            (_, false) => None,
            (Some(group), true) => Some(group.as_str()),
            (None, true) => continue,
        };

        let source = campaign.read_source(sample)?;

        for column in columns {
            if let Some(file) = source.get(*column) {
                let entry = match group {
                    Some(group) => format!("{file}.{group}"),
                    None => file.to_string(),
                };
                reads.insert(entry);
            }
        }
    }

    debug!(count = reads.len(), ?columns, "enumerated reads");
    Ok(reads)
}
