//! Diffraction solver abstraction and implementations.
//!
//! The [`DiffractionSolver`] trait defines the interface every method for
//! periodic stacks implements. Rigorous Coupled-Wave Analysis
//! ([`rcwa::RcwaSolver`]) is the implementation shipped today.

pub mod rcwa;

use thiserror::Error;

use crate::precision::Precision;
use crate::types::{Device, SolveResult, Source};

/// Errors that can occur during a diffraction solve.
///
/// Configuration problems ("bad input") are kept apart from numerical
/// failures ("solver instability") so callers can decide whether to change
/// the input or retry with a different truncation.
#[derive(Debug, Error)]
pub enum RcwaError {
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Linear algebra error: {0}")]
    LinAlgError(String),

    #[error("Divergent result: total power {total:.3e} is too small to renormalise")]
    DivergentResult { total: f64 },
}

/// The interface shared by diffraction solvers for periodic stacks.
///
/// A solve is a pure function of its inputs: implementations must not keep
/// results between calls, so independent solves may run on separate threads.
pub trait DiffractionSolver {
    /// Compute per-order reflectance and transmittance for `device`
    /// illuminated by `source`, in precision profile `P`.
    fn solve<P: Precision>(
        &self,
        device: &Device,
        source: &Source,
    ) -> Result<SolveResult<P>, RcwaError>;

    /// Human-readable name of the method.
    fn method_name(&self) -> &str;
}
