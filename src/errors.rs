// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Malformed artifact name '{name}': {reason}")]
    MalformedName { name: String, reason: String },

    #[error("Unknown sample: {0}")]
    UnknownSample(String),

    #[error("Sample '{sample}' references read source '{key}' which is not in the read table")]
    MissingReadSource { sample: String, key: String },

    #[error("Polisher '{polisher}' does not support read type '{read_type}'")]
    UnsupportedCombination { polisher: String, read_type: String },

    #[error("No eligible GPU device available ({requested} requested)")]
    NoDeviceAvailable { requested: u32 },

    #[error("Scheduling invariant violated: {0}")]
    SchedulingInvariant(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse error taxonomy used for reporting and exit policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad table rows, unknown references, unsupported step combinations.
    Configuration,
    /// Unparseable or non-canonical artifact names.
    NameGrammar,
    /// Device shortfalls that stop a single job.
    Resource,
    /// The job graph does not have the expected shape.
    SchedulingInvariant,
    Io,
}

impl PlanError {
    pub fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        PlanError::MalformedName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PlanError::ConfigError(_)
            | PlanError::UnknownSample(_)
            | PlanError::MissingReadSource { .. }
            | PlanError::UnsupportedCombination { .. } => ErrorKind::Configuration,
            PlanError::MalformedName { .. } => ErrorKind::NameGrammar,
            PlanError::NoDeviceAvailable { .. } => ErrorKind::Resource,
            PlanError::SchedulingInvariant(_) => ErrorKind::SchedulingInvariant,
            PlanError::IoError(_) | PlanError::TomlError(_) | PlanError::Other(_) => ErrorKind::Io,
        }
    }

    /// Whether this error must abort plan construction as a whole.
    ///
    /// Device shortfalls only stop the affected job, and reporter
    /// invariant violations are diagnostics.
    pub fn is_plan_fatal(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::Resource | ErrorKind::SchedulingInvariant
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PlanError>;
