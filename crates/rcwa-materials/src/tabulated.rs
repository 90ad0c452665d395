//! Tabulated optical constants.
//!
//! Data is embedded at compile time as $(\lambda, n, k)$ triples and
//! interpolated via natural cubic splines in $n$ and $k$ separately, then
//! combined as $\epsilon = (n + ik)^2$.

use num_complex::Complex64;

use crate::provider::{check_range, DispersionModel, MaterialError};
use crate::spline::CubicSpline;

/// Crystalline silicon at 300 K, 400-1550 nm (M. A. Green, *Sol. Energy
/// Mater. Sol. Cells* **92**, 1305 (2008), thinned).
const SILICON: &[(f64, f64, f64)] = &[
    (400.0, 5.570, 0.387),
    (450.0, 4.674, 0.143),
    (500.0, 4.298, 0.073),
    (550.0, 4.077, 0.040),
    (600.0, 3.944, 0.025),
    (650.0, 3.852, 0.017),
    (700.0, 3.783, 0.012),
    (750.0, 3.733, 0.008),
    (800.0, 3.693, 0.0065),
    (850.0, 3.660, 0.0042),
    (900.0, 3.633, 0.0026),
    (950.0, 3.609, 0.0016),
    (1000.0, 3.590, 0.0009),
    (1050.0, 3.573, 0.0004),
    (1100.0, 3.560, 0.00015),
    (1150.0, 3.549, 0.00003),
    (1200.0, 3.540, 0.0),
    (1300.0, 3.513, 0.0),
    (1400.0, 3.494, 0.0),
    (1550.0, 3.477, 0.0),
];

/// A material with spline-interpolated optical constants.
#[derive(Debug, Clone)]
pub struct TabulatedMaterial {
    name: String,
    range: (f64, f64),
    spline_n: CubicSpline,
    spline_k: CubicSpline,
}

impl TabulatedMaterial {
    /// Construct from tabulated data.
    ///
    /// # Arguments
    /// * `name` - Material name.
    /// * `table` - `(wavelength_nm, n, k)` rows, strictly increasing in wavelength.
    pub fn new(name: impl Into<String>, table: &[(f64, f64, f64)]) -> Result<Self, MaterialError> {
        let wavelengths: Vec<f64> = table.iter().map(|r| r.0).collect();
        let spline_n = CubicSpline::new(wavelengths.clone(), table.iter().map(|r| r.1).collect())?;
        let spline_k = CubicSpline::new(wavelengths, table.iter().map(|r| r.2).collect())?;

        Ok(Self {
            name: name.into(),
            range: spline_n.domain(),
            spline_n,
            spline_k,
        })
    }

    /// Crystalline silicon, 400-1550 nm.
    pub fn silicon() -> Result<Self, MaterialError> {
        Self::new("Si (crystalline)", SILICON)
    }
}

impl DispersionModel for TabulatedMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn wavelength_range(&self) -> (f64, f64) {
        self.range
    }

    fn permittivity(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        Ok(self.refractive_index(wavelength_nm)?.powi(2))
    }

    fn refractive_index(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        check_range(wavelength_nm, self.range)?;
        let n = self.spline_n.evaluate(wavelength_nm);
        // Splines can undershoot between knots where k falls to zero.
        let k = self.spline_k.evaluate(wavelength_nm).max(0.0);
        Ok(Complex64::new(n, k))
    }
}
