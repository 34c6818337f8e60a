// src/dag/mod.rs

//! Job graph access and the dependency tree report.
//!
//! - [`view`] is the narrow read-only interface to an external scheduler's
//!   graph.
//! - [`graph`] is an in-memory adapter loaded from a TOML job file.
//! - [`report`] buckets jobs by sample and prints each bucket's forest.

pub mod graph;
pub mod report;
pub mod view;

pub use graph::{JobConfig, JobGraph, RawJobGraph};
pub use report::{DependencyReport, ReportLine, build_report, run_report, sample_tag};
pub use view::{DagView, JobId};
