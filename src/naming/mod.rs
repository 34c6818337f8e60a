// src/naming/mod.rs

//! Artifact naming grammar.
//!
//! - [`step`] holds the closed polisher / read-type enumerations and the
//!   single-pass [`PolishStep`].
//! - [`artifact`] parses and serializes full artifact identities.
//! - [`unroll`] expands a chain into all of its intermediate chains.

pub mod artifact;
pub mod step;
pub mod unroll;

pub use artifact::{ArtifactName, PolishChain};
pub use step::{PolishStep, Polisher, ReadType};
pub use unroll::unroll;
