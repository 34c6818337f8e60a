// src/naming/artifact.rs

//! Artifact identity strings.
//!
//! Grammar (all separators are `.`):
//!
//! ```text
//! uuid . assemblerConfig . ctg . cns [ . step ]*
//! ```
//!
//! The string form is a pure serialization concern; all decomposition works
//! on [`ArtifactName`] and its [`PolishChain`].

use std::fmt;
use std::str::FromStr;

use crate::errors::{PlanError, Result};
use crate::naming::step::PolishStep;

const CONTIG_LITERAL: &str = "ctg";
const CONSENSUS_LITERAL: &str = "cns";

/// Ordered sequence of polishing passes, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PolishChain {
    steps: Vec<PolishStep>,
}

impl PolishChain {
    pub fn new(steps: Vec<PolishStep>) -> Self {
        Self { steps }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a `polishChainSpec` cell such as `racon-ont-2.medaka-ont-1`.
    /// An empty string is the empty chain.
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Ok(Self::empty());
        }
        let steps = spec
            .split('.')
            .map(|segment| PolishStep::parse_segment(segment, spec))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[PolishStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn last(&self) -> Option<&PolishStep> {
        self.steps.last()
    }

    /// The chain without its final step.
    pub fn without_last(&self) -> Self {
        let mut steps = self.steps.clone();
        steps.pop();
        Self { steps }
    }

    /// The chain with its final step replaced.
    pub fn with_last(&self, step: PolishStep) -> Self {
        let mut steps = self.steps.clone();
        match steps.last_mut() {
            Some(last) => *last = step,
            None => steps.push(step),
        }
        Self { steps }
    }

    /// Total number of passes encoded, counting every iteration.
    pub fn total_passes(&self) -> usize {
        self.steps.iter().map(|s| s.iteration as usize).sum()
    }

    pub fn check_supported(&self) -> Result<()> {
        self.steps.iter().try_for_each(PolishStep::check_supported)
    }
}

impl fmt::Display for PolishChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl From<Vec<PolishStep>> for PolishChain {
    fn from(steps: Vec<PolishStep>) -> Self {
        Self::new(steps)
    }
}

/// Canonical identity of an assembly artifact.
///
/// Fields are public for matching. [`ArtifactName::new`] and
/// [`ArtifactName::parse`] are the checked ways in; [`ArtifactName::base`]
/// trusts its caller to pass name-safe parts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactName {
    pub uuid: String,
    pub assembler_config: String,
    pub chain: PolishChain,
}

fn check_field(name: &str, field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(PlanError::malformed(name, format!("{field} is empty")));
    }
    if value.contains('.') || value.chars().any(char::is_whitespace) {
        return Err(PlanError::malformed(
            name,
            format!("{field} '{value}' must not contain '.' or whitespace"),
        ));
    }
    Ok(())
}

impl ArtifactName {
    /// The unpolished assembly of a sample.
    pub fn base(uuid: impl Into<String>, assembler_config: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            assembler_config: assembler_config.into(),
            chain: PolishChain::empty(),
        }
    }

    /// Fails with `MalformedName` unless the result would parse back to
    /// itself.
    pub fn new(
        uuid: impl Into<String>,
        assembler_config: impl Into<String>,
        chain: PolishChain,
    ) -> Result<Self> {
        let name = Self {
            uuid: uuid.into(),
            assembler_config: assembler_config.into(),
            chain,
        };
        Self::check_parts(&name.uuid, &name.assembler_config)?;
        name.chain
            .steps()
            .iter()
            .try_for_each(PolishStep::check_well_formed)
            .map_err(|e| PlanError::malformed(name.to_string(), e.to_string()))?;
        Ok(name)
    }

    /// Check that `uuid` and `assembler_config` can appear in a name.
    pub fn check_parts(uuid: &str, assembler_config: &str) -> Result<()> {
        let name = format!("{uuid}.{assembler_config}.ctg.cns");
        check_field(&name, "uuid", uuid)?;
        check_field(&name, "assembler config", assembler_config)
    }

    pub fn with_chain(&self, chain: PolishChain) -> Self {
        Self {
            uuid: self.uuid.clone(),
            assembler_config: self.assembler_config.clone(),
            chain,
        }
    }

    pub fn is_base(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn parse(s: &str) -> Result<Self> {
        let mut fields = s.split('.');
        let uuid = fields.next().unwrap_or_default();
        check_field(s, "uuid", uuid)?;
        let assembler_config = fields
            .next()
            .ok_or_else(|| PlanError::malformed(s, "missing assembler config"))?;
        check_field(s, "assembler config", assembler_config)?;

        for literal in [CONTIG_LITERAL, CONSENSUS_LITERAL] {
            match fields.next() {
                Some(seg) if seg == literal => {}
                Some(seg) => {
                    return Err(PlanError::malformed(
                        s,
                        format!("expected literal '{literal}', found '{seg}'"),
                    ));
                }
                None => {
                    return Err(PlanError::malformed(
                        s,
                        format!("missing literal '{literal}'"),
                    ));
                }
            }
        }

        let steps = fields
            .map(|segment| PolishStep::parse_segment(segment, s))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            uuid: uuid.to_string(),
            assembler_config: assembler_config.to_string(),
            chain: PolishChain::new(steps),
        })
    }

    pub fn serialize(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{CONTIG_LITERAL}.{CONSENSUS_LITERAL}",
            self.uuid, self.assembler_config
        )?;
        if !self.chain.is_empty() {
            write!(f, ".{}", self.chain)?;
        }
        Ok(())
    }
}

impl FromStr for ArtifactName {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
