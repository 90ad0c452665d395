//! Dispersion model trait.
//!
//! Every material source implements [`DispersionModel`], mapping a
//! free-space wavelength to a complex relative permittivity. The solver
//! only ever sees the resulting scalar or grid values.

use num_complex::Complex64;
use thiserror::Error;

/// Errors from dispersion models.
#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("Wavelength {wavelength_nm} nm is outside the data range [{min}, {max}] nm")]
    OutOfRange {
        wavelength_nm: f64,
        min: f64,
        max: f64,
    },

    #[error("Material not found: {0}")]
    NotFound(String),

    #[error("Data error: {0}")]
    DataError(String),
}

/// Wavelength-dependent complex permittivity.
///
/// The convention is $\epsilon = \epsilon' + i\epsilon''$ with
/// $\epsilon'' \ge 0$ for absorbing media.
pub trait DispersionModel: Send + Sync {
    /// Human-readable name of this material.
    fn name(&self) -> &str;

    /// Wavelength range over which the model is valid (nm).
    fn wavelength_range(&self) -> (f64, f64);

    /// Complex relative permittivity $\epsilon(\lambda)$.
    fn permittivity(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError>;

    /// Complex refractive index $\tilde{n} = n + ik$.
    ///
    /// Default implementation derives from $\epsilon = \tilde{n}^2$.
    fn refractive_index(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        let eps = self.permittivity(wavelength_nm)?;
        Ok(eps.sqrt())
    }
}

/// Reject wavelengths outside `range`.
pub(crate) fn check_range(wavelength_nm: f64, range: (f64, f64)) -> Result<(), MaterialError> {
    let (min, max) = range;
    if !(wavelength_nm >= min && wavelength_nm <= max) {
        return Err(MaterialError::OutOfRange {
            wavelength_nm,
            min,
            max,
        });
    }
    Ok(())
}
