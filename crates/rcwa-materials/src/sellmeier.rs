//! Sellmeier dispersion for transparent dielectrics.
//!
//! $$n^2(\lambda) = 1 + \sum_i \frac{B_i \lambda^2}{\lambda^2 - C_i^2}$$
//!
//! with $\lambda$ in micrometres. Materials modelled this way are lossless
//! inside their validity range.

use num_complex::Complex64;

use crate::provider::{check_range, DispersionModel, MaterialError};

/// A three-term Sellmeier fit.
#[derive(Debug, Clone)]
pub struct SellmeierMaterial {
    name: String,
    range: (f64, f64),
    /// Oscillator strengths $B_i$.
    b: [f64; 3],
    /// Resonance wavelengths $C_i$ (µm).
    c: [f64; 3],
}

impl SellmeierMaterial {
    pub fn new(name: impl Into<String>, range: (f64, f64), b: [f64; 3], c: [f64; 3]) -> Self {
        Self {
            name: name.into(),
            range,
            b,
            c,
        }
    }

    /// Fused silica (I. H. Malitson, *J. Opt. Soc. Am.* **55**, 1205 (1965)),
    /// 210-3710 nm.
    pub fn fused_silica() -> Self {
        Self::new(
            "SiO2 (fused silica)",
            (210.0, 3710.0),
            [0.696_166_3, 0.407_942_6, 0.897_479_4],
            [0.068_404_3, 0.116_241_4, 9.896_161],
        )
    }
}

impl DispersionModel for SellmeierMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn wavelength_range(&self) -> (f64, f64) {
        self.range
    }

    fn permittivity(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        check_range(wavelength_nm, self.range)?;
        let l2 = (wavelength_nm * 1e-3).powi(2);
        let n2 = 1.0
            + self
                .b
                .iter()
                .zip(self.c.iter())
                .map(|(b, c)| b * l2 / (l2 - c * c))
                .sum::<f64>();
        Ok(Complex64::new(n2, 0.0))
    }
}
