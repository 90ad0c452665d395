//! # RCWA Geometry
//!
//! Builds layer permittivity grids for the RCWA solver. This crate provides:
//!
//! - **Parametric primitives** ([`primitives`]): circles, ellipses and
//!   rectangles placed in the lattice unit cell.
//! - **Rasterisation** ([`raster`]): paints primitives into complex grids
//!   sampled at pixel centres.

pub mod primitives;
pub mod raster;

use thiserror::Error;

pub use primitives::{Circle, Ellipse, Primitive, Rectangle};
pub use raster::{add_circle, paint, uniform_grid, PixelGrid};

/// Errors raised while building permittivity grids.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Invalid primitive: {0}")]
    InvalidPrimitive(String),

    #[error("Invalid pixel grid: {0}")]
    InvalidGrid(String),
}
