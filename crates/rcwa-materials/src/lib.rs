//! # RCWA Materials
//!
//! Dispersion models for building RCWA devices. All materials implement the
//! [`DispersionModel`](provider::DispersionModel) trait, mapping a
//! free-space wavelength to a complex relative permittivity.
//!
//! ## Built-in materials
//!
//! | Identifier | Model | Module | Range (nm) |
//! |------------|-------|--------|------------|
//! | `Si` | Tabulated $n, k$ (Green 2008) | [`tabulated`] | 400-1550 |
//! | `SiO2` | Sellmeier (Malitson 1965) | [`sellmeier`] | 210-3710 |
//!
//! ## Interpolation
//!
//! Tabulated data is interpolated using natural cubic splines
//! ([`spline::CubicSpline`]) to provide smooth, continuous material
//! properties at arbitrary wavelengths within the data range.

pub mod provider;
pub mod sellmeier;
pub mod spline;
pub mod tabulated;

pub use provider::{DispersionModel, MaterialError};
pub use sellmeier::SellmeierMaterial;
pub use tabulated::TabulatedMaterial;

/// Identifiers accepted by [`lookup`].
pub const BUILTIN: &[&str] = &["Si", "SiO2"];

/// Resolve a built-in material by identifier (case-insensitive).
pub fn lookup(id: &str) -> Result<Box<dyn DispersionModel>, MaterialError> {
    match id.to_ascii_lowercase().as_str() {
        "si" => Ok(Box::new(TabulatedMaterial::silicon()?)),
        "sio2" => Ok(Box::new(SellmeierMaterial::fused_silica())),
        _ => Err(MaterialError::NotFound(id.to_string())),
    }
}
