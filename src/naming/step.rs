// src/naming/step.rs

//! A single polishing pass: `<polisher>-<readType>[depth]-<iteration>`.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{PlanError, Result};

/// Tool applied in a polishing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Polisher {
    Racon,
    Medaka,
    Pilon,
    Dehumanizer,
}

impl Polisher {
    pub const ALL: [Polisher; 4] = [
        Polisher::Racon,
        Polisher::Medaka,
        Polisher::Pilon,
        Polisher::Dehumanizer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Polisher::Racon => "racon",
            Polisher::Medaka => "medaka",
            Polisher::Pilon => "pilon",
            Polisher::Dehumanizer => "dehumanizer",
        }
    }

    /// Whether this polisher can consume reads of the given type.
    pub fn supports(self, read_type: ReadType) -> bool {
        match self {
            Polisher::Racon | Polisher::Dehumanizer => true,
            Polisher::Medaka => read_type == ReadType::Ont,
            Polisher::Pilon => read_type == ReadType::Ill,
        }
    }
}

impl fmt::Display for Polisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Polisher {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "racon" => Ok(Polisher::Racon),
            "medaka" => Ok(Polisher::Medaka),
            "pilon" => Ok(Polisher::Pilon),
            "dehumanizer" => Ok(Polisher::Dehumanizer),
            other => Err(format!(
                "unknown polisher '{other}' (expected racon, medaka, pilon or dehumanizer)"
            )),
        }
    }
}

/// Read set used by a polishing pass.
///
/// - `Ont`: long reads, one file, may be sub-sampled to a target depth.
/// - `Ill`: paired short reads (`i1` + `i2`), never sub-sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReadType {
    Ont,
    Ill,
}

impl ReadType {
    pub const ALL: [ReadType; 2] = [ReadType::Ont, ReadType::Ill];

    pub fn as_str(self) -> &'static str {
        match self {
            ReadType::Ont => "ont",
            ReadType::Ill => "ill",
        }
    }

    /// Whether a `depth` qualifier is meaningful for this read type.
    pub fn supports_depth(self) -> bool {
        matches!(self, ReadType::Ont)
    }
}

impl fmt::Display for ReadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ont" => Ok(ReadType::Ont),
            "ill" => Ok(ReadType::Ill),
            other => Err(format!("unknown read type '{other}' (expected ont or ill)")),
        }
    }
}

/// One applied (or pending) polishing pass.
///
/// Fields are public for matching; build values with [`PolishStep::new`] or
/// [`PolishStep::parse_segment`] so they always serialize to a parseable
/// segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PolishStep {
    pub polisher: Polisher,
    pub read_type: ReadType,
    /// Sub-sampling depth; only ever set for read types that support it.
    pub depth: Option<u32>,
    /// 1-based count of consecutive applications of this pass.
    pub iteration: u32,
}

fn step_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([a-z]+)-([a-z]+)([0-9]*)-([0-9]+)$").unwrap_or_else(|e| {
            unreachable!("step pattern is a valid regex: {e}")
        })
    })
}

/// Parse a canonical positive integer (no sign, no leading zeros).
fn parse_positive(digits: &str) -> Option<u32> {
    if digits.is_empty() || digits.starts_with('0') {
        return None;
    }
    digits.parse::<u32>().ok().filter(|n| *n >= 1)
}

impl PolishStep {
    /// Fails with `MalformedName` for iteration 0.
    pub fn new(polisher: Polisher, read_type: ReadType, iteration: u32) -> Result<Self> {
        let step = Self {
            polisher,
            read_type,
            depth: None,
            iteration,
        };
        step.check_well_formed()?;
        Ok(step)
    }

    /// Fails with `MalformedName` for depth 0 or a read type without depth
    /// support.
    pub fn with_depth(mut self, depth: u32) -> Result<Self> {
        self.depth = Some(depth);
        self.check_well_formed()?;
        Ok(self)
    }

    /// Whether the step serializes to a segment that parses back to itself.
    pub fn check_well_formed(&self) -> Result<()> {
        let reason = if self.iteration == 0 {
            "iteration must be a positive integer"
        } else if self.depth == Some(0) {
            "depth must be a positive integer"
        } else if self.depth.is_some() && !self.read_type.supports_depth() {
            "read type cannot carry a depth"
        } else {
            return Ok(());
        };
        Err(PlanError::malformed(self.to_string(), reason))
    }

    /// Parse one step segment. `context` is the full string being parsed and
    /// is only used for error messages.
    pub fn parse_segment(segment: &str, context: &str) -> Result<Self> {
        let caps = step_regex().captures(segment).ok_or_else(|| {
            PlanError::malformed(
                context,
                format!("step '{segment}' does not match polisher-readType[depth]-iteration"),
            )
        })?;

        let polisher = caps[1]
            .parse::<Polisher>()
            .map_err(|e| PlanError::malformed(context, e))?;
        let read_type = caps[2]
            .parse::<ReadType>()
            .map_err(|e| PlanError::malformed(context, e))?;

        let depth = match &caps[3] {
            "" => None,
            digits => {
                if !read_type.supports_depth() {
                    return Err(PlanError::malformed(
                        context,
                        format!("read type '{read_type}' in step '{segment}' cannot carry a depth"),
                    ));
                }
                Some(parse_positive(digits).ok_or_else(|| {
                    PlanError::malformed(
                        context,
                        format!("depth '{digits}' in step '{segment}' must be a positive integer"),
                    )
                })?)
            }
        };

        let iteration = parse_positive(&caps[4]).ok_or_else(|| {
            PlanError::malformed(
                context,
                format!(
                    "iteration '{}' in step '{segment}' must be a positive integer",
                    &caps[4]
                ),
            )
        })?;

        Ok(Self {
            polisher,
            read_type,
            depth,
            iteration,
        })
    }

    /// Fail with `UnsupportedCombination` if the polisher cannot use the
    /// step's read type.
    pub fn check_supported(&self) -> Result<()> {
        if self.polisher.supports(self.read_type) {
            Ok(())
        } else {
            Err(PlanError::UnsupportedCombination {
                polisher: self.polisher.to_string(),
                read_type: self.read_type.to_string(),
            })
        }
    }

    /// The same pass, one iteration earlier. `None` at iteration 1.
    pub fn previous_iteration(&self) -> Option<Self> {
        if self.iteration > 1 {
            Some(Self {
                iteration: self.iteration - 1,
                ..*self
            })
        } else {
            None
        }
    }
}

impl fmt::Display for PolishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.polisher, self.read_type)?;
        if let Some(depth) = self.depth {
            write!(f, "{depth}")?;
        }
        write!(f, "-{}", self.iteration)
    }
}
