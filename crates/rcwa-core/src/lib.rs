//! # RCWA Core
//!
//! Diffraction efficiencies of periodic multilayer structures by Rigorous
//! Coupled-Wave Analysis. A [`types::Device`] (lattice periods, two
//! half-spaces and a stack of patterned layers) is illuminated by a plane
//! wave [`types::Source`]; a solve returns the reflected and transmitted
//! power fraction carried by every retained diffraction order.
//!
//! ## Architecture
//!
//! Solvers implement the [`solver::DiffractionSolver`] trait. The RCWA
//! implementation ([`solver::rcwa::RcwaSolver`]) is generic over a
//! [`precision::Precision`] bundle fixing the real, complex and index types
//! of one solve.
//!
//! ## Modules
//!
//! - [`types`]: Device, layer, source and result types.
//! - [`precision`]: Single/double precision bundles.
//! - [`solver`]: Solver trait, error taxonomy and the RCWA pipeline.
//! - [`fft`]: 2D FFT used by the convolution-matrix builder.
//! - [`thin_film`]: Analytic slab response for validation.

pub mod fft;
pub mod precision;
pub mod solver;
pub mod thin_film;
pub mod types;

pub use precision::{Double, Precision, PrecisionProfile, Single};
pub use solver::rcwa::{RcwaSolver, SolverOptions};
pub use solver::{DiffractionSolver, RcwaError};
pub use types::{Device, HalfSpace, Layer, SolveResult, Source};
