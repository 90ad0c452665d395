//! Core types shared across the solver.
//!
//! This module defines the immutable inputs of a solve (the [`Device`] stack
//! and the incident [`Source`]) and the per-order [`SolveResult`] it returns.
//! Inputs are validated once at construction; the solver only reads them.
//!
//! Length quantities (periods, thicknesses, wavelength) share one unit chosen
//! by the caller, typically nanometres. Complex material parameters use
//! $\epsilon = \epsilon' + i\epsilon''$ with $\epsilon'' > 0$ for absorption.

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::precision::Precision;
use crate::solver::RcwaError;

/// Scalar material parameters of a semi-infinite half-space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalfSpace {
    /// Relative permittivity $\epsilon_r$.
    pub permittivity: Complex64,
    /// Relative permeability $\mu_r$.
    pub permeability: Complex64,
}

impl HalfSpace {
    /// A non-magnetic half-space ($\mu_r = 1$).
    pub fn dielectric(permittivity: impl Into<Complex64>) -> Self {
        Self {
            permittivity: permittivity.into(),
            permeability: Complex64::new(1.0, 0.0),
        }
    }

    /// A half-space with explicit permittivity and permeability.
    pub fn new(permittivity: impl Into<Complex64>, permeability: impl Into<Complex64>) -> Self {
        Self {
            permittivity: permittivity.into(),
            permeability: permeability.into(),
        }
    }

    /// Refractive index $n = \sqrt{\epsilon_r \mu_r}$ (principal branch).
    pub fn refractive_index(&self) -> Complex64 {
        (self.permittivity * self.permeability).sqrt()
    }

    /// Whether the medium has any absorption.
    pub fn is_lossy(&self) -> bool {
        self.permittivity.im.abs() > 0.0 || self.permeability.im.abs() > 0.0
    }
}

/// One patterned layer of the stack.
///
/// The permittivity grid is indexed `[row, col]` where rows run along the
/// in-plane axis paired with truncation order `q` (period `period_y`) and
/// columns run along the axis paired with `p` (period `period_x`).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layer {
    /// A layer described only by its permittivity distribution.
    Plain {
        permittivity: Array2<Complex64>,
        thickness: f64,
    },
    /// A layer that also carries normal-vector component grids for the
    /// normal-vector correction.
    WithNormalVectors {
        permittivity: Array2<Complex64>,
        thickness: f64,
        normal_x: Array2<f64>,
        normal_y: Array2<f64>,
    },
}

impl Layer {
    pub fn plain(permittivity: Array2<Complex64>, thickness: f64) -> Self {
        Layer::Plain {
            permittivity,
            thickness,
        }
    }

    /// A laterally homogeneous layer, stored as a single pixel.
    pub fn uniform(permittivity: impl Into<Complex64>, thickness: f64) -> Self {
        Layer::Plain {
            permittivity: Array2::from_elem((1, 1), permittivity.into()),
            thickness,
        }
    }

    pub fn with_normal_vectors(
        permittivity: Array2<Complex64>,
        thickness: f64,
        normal_x: Array2<f64>,
        normal_y: Array2<f64>,
    ) -> Self {
        Layer::WithNormalVectors {
            permittivity,
            thickness,
            normal_x,
            normal_y,
        }
    }

    pub fn permittivity(&self) -> &Array2<Complex64> {
        match self {
            Layer::Plain { permittivity, .. } | Layer::WithNormalVectors { permittivity, .. } => {
                permittivity
            }
        }
    }

    pub fn thickness(&self) -> f64 {
        match self {
            Layer::Plain { thickness, .. } | Layer::WithNormalVectors { thickness, .. } => {
                *thickness
            }
        }
    }

    pub fn has_normal_vectors(&self) -> bool {
        matches!(self, Layer::WithNormalVectors { .. })
    }

    fn validate(&self, index: usize) -> Result<(), RcwaError> {
        let thickness = self.thickness();
        if !(thickness.is_finite() && thickness > 0.0) {
            return Err(RcwaError::InvalidConfiguration(format!(
                "layer {index}: thickness must be positive, got {thickness}"
            )));
        }
        let grid = self.permittivity();
        if grid.is_empty() {
            return Err(RcwaError::InvalidConfiguration(format!(
                "layer {index}: permittivity grid is empty"
            )));
        }
        if grid.iter().any(|e| !(e.re.is_finite() && e.im.is_finite())) {
            return Err(RcwaError::InvalidConfiguration(format!(
                "layer {index}: permittivity grid contains non-finite values"
            )));
        }
        if let Layer::WithNormalVectors {
            normal_x, normal_y, ..
        } = self
        {
            if normal_x.dim() != grid.dim() || normal_y.dim() != grid.dim() {
                return Err(RcwaError::InvalidConfiguration(format!(
                    "layer {index}: normal-vector grids {:?}/{:?} do not match permittivity grid {:?}",
                    normal_x.dim(),
                    normal_y.dim(),
                    grid.dim()
                )));
            }
        }
        Ok(())
    }
}

/// A periodic multilayer device between two half-spaces.
///
/// Layers are ordered from the reflection side (where the source is) to
/// the transmission side.
#[derive(Debug, Clone, Serialize)]
pub struct Device {
    period_x: f64,
    period_y: f64,
    reflection: HalfSpace,
    transmission: HalfSpace,
    p: usize,
    q: usize,
    layers: Vec<Layer>,
}

impl Device {
    /// Build and validate a device.
    ///
    /// # Arguments
    /// * `period_x`, `period_y` - Lattice periods along the `p` and `q` axes.
    /// * `reflection`, `transmission` - Bounding half-spaces.
    /// * `p`, `q` - Harmonic truncation orders along x and y.
    /// * `layers` - Layer stack, reflection side first. All patterned
    ///   permittivity grids must share one shape; 1x1 uniform grids fit
    ///   any stack.
    pub fn new(
        period_x: f64,
        period_y: f64,
        reflection: HalfSpace,
        transmission: HalfSpace,
        p: usize,
        q: usize,
        layers: Vec<Layer>,
    ) -> Result<Self, RcwaError> {
        for (axis, period) in [("x", period_x), ("y", period_y)] {
            if !(period.is_finite() && period > 0.0) {
                return Err(RcwaError::InvalidConfiguration(format!(
                    "period along {axis} must be positive, got {period}"
                )));
            }
        }

        for (index, layer) in layers.iter().enumerate() {
            layer.validate(index)?;
        }
        let mut patterned = layers
            .iter()
            .enumerate()
            .filter(|(_, l)| l.permittivity().dim() != (1, 1));
        if let Some((first, reference)) = patterned.next() {
            let shape = reference.permittivity().dim();
            if let Some((index, layer)) = patterned.find(|(_, l)| l.permittivity().dim() != shape) {
                return Err(RcwaError::InvalidConfiguration(format!(
                    "layer {index} grid {:?} does not match layer {first} grid {:?}",
                    layer.permittivity().dim(),
                    shape
                )));
            }
        }

        Ok(Self {
            period_x,
            period_y,
            reflection,
            transmission,
            p,
            q,
            layers,
        })
    }

    pub fn period_x(&self) -> f64 {
        self.period_x
    }

    pub fn period_y(&self) -> f64 {
        self.period_y
    }

    pub fn reflection(&self) -> &HalfSpace {
        &self.reflection
    }

    pub fn transmission(&self) -> &HalfSpace {
        &self.transmission
    }

    /// Truncation order along x (columns of the grid).
    pub fn p(&self) -> usize {
        self.p
    }

    /// Truncation order along y (rows of the grid).
    pub fn q(&self) -> usize {
        self.q
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Whether any layer carries normal-vector data.
    pub fn has_normal_vectors(&self) -> bool {
        self.layers.iter().any(Layer::has_normal_vectors)
    }
}

/// Incident plane wave specification.
#[derive(Debug, Clone, Serialize)]
pub struct Source {
    theta: f64,
    phi: f64,
    wavelength: f64,
    p_te: Complex64,
    p_tm: Complex64,
    polarization: [Complex64; 3],
}

impl Source {
    /// Build a source and derive its polarization vector.
    ///
    /// # Arguments
    /// * `theta` - Polar angle of incidence (radians), measured from +z.
    /// * `phi` - Azimuthal angle (radians), measured from +x.
    /// * `wavelength` - Free-space wavelength, same unit as the device periods.
    /// * `p_te`, `p_tm` - Complex TE/TM amplitudes; only their ratio matters.
    pub fn new(
        theta: f64,
        phi: f64,
        wavelength: f64,
        p_te: impl Into<Complex64>,
        p_tm: impl Into<Complex64>,
    ) -> Result<Self, RcwaError> {
        if !(wavelength.is_finite() && wavelength > 0.0) {
            return Err(RcwaError::InvalidConfiguration(format!(
                "wavelength must be positive, got {wavelength}"
            )));
        }
        if !(theta.is_finite() && phi.is_finite()) {
            return Err(RcwaError::InvalidConfiguration(
                "incidence angles must be finite".into(),
            ));
        }
        let p_te = p_te.into();
        let p_tm = p_tm.into();
        let polarization = polarization_vector(theta, phi, p_te, p_tm).ok_or_else(|| {
            RcwaError::InvalidConfiguration("TE and TM amplitudes are both zero".into())
        })?;

        Ok(Self {
            theta,
            phi,
            wavelength,
            p_te,
            p_tm,
            polarization,
        })
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    pub fn amplitudes(&self) -> (Complex64, Complex64) {
        (self.p_te, self.p_tm)
    }

    /// Unit generalized polarization vector $(P_x, P_y, P_z)$.
    pub fn polarization(&self) -> [Complex64; 3] {
        self.polarization
    }

    /// Free-space wavenumber $k_0 = 2\pi/\lambda_0$.
    pub fn wavenumber(&self) -> f64 {
        2.0 * std::f64::consts::PI / self.wavelength
    }

    /// Unit propagation direction $\hat{k}$ of the incident wave.
    pub fn direction(&self) -> [f64; 3] {
        unit_direction(self.theta, self.phi)
    }
}

fn unit_direction(theta: f64, phi: f64) -> [f64; 3] {
    [
        theta.sin() * phi.cos(),
        theta.sin() * phi.sin(),
        theta.cos(),
    ]
}

/// Combine TE/TM amplitudes into a unit polarization vector.
///
/// $\hat{a}_{TE} = \hat{k} \times \hat{n} / |\hat{k} \times \hat{n}|$ with
/// $\hat{n} = -\hat{z}$ (or $\hat{y}$ at normal incidence),
/// $\hat{a}_{TM} = \hat{a}_{TE} \times \hat{k}$ normalised.
fn polarization_vector(
    theta: f64,
    phi: f64,
    p_te: Complex64,
    p_tm: Complex64,
) -> Option<[Complex64; 3]> {
    let k = unit_direction(theta, phi);
    let normal = [0.0, 0.0, -1.0];

    let a_te = if theta.abs() < 1e-6 {
        [0.0, 1.0, 0.0]
    } else {
        normalise(cross(&k, &normal))
    };
    let a_tm = normalise(cross(&a_te, &k));

    let p: [Complex64; 3] = std::array::from_fn(|i| p_te * a_te[i] + p_tm * a_tm[i]);
    let norm = p.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return None;
    }
    Some(p.map(|c| c / norm))
}

fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalise(v: [f64; 3]) -> [f64; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    [v[0] / len, v[1] / len, v[2] / len]
}

/// Per-order diffraction efficiencies returned by a solve.
///
/// All sequences follow the harmonic ordering used internally: orders are
/// enumerated `n`-major (`n = -q..=q` outer, `m = -p..=p` inner), keeping
/// only those that survive truncation.
#[derive(Debug, Clone)]
pub struct SolveResult<P: Precision> {
    /// Surviving harmonic orders `(m, n)`.
    pub orders: Vec<(P::Index, P::Index)>,
    /// Reflected power fraction per order.
    pub reflectance: Vec<P::Real>,
    /// Transmitted power fraction per order.
    pub transmittance: Vec<P::Real>,
    /// Sum of `reflectance`.
    pub total_reflectance: P::Real,
    /// Sum of `transmittance`.
    pub total_transmittance: P::Real,
    /// Whether both sequences were rescaled so the totals add to one.
    pub renormalized: bool,
}

impl<P: Precision> SolveResult<P> {
    /// $R_{tot} + T_{tot}$.
    pub fn total(&self) -> P::Real {
        self.total_reflectance + self.total_transmittance
    }

    /// Number of retained harmonic orders.
    pub fn num_orders(&self) -> usize {
        self.orders.len()
    }

    /// (reflectance, transmittance) of diffraction order `(m, n)`, if it
    /// survived truncation.
    pub fn order_efficiency(&self, m: i64, n: i64) -> Option<(P::Real, P::Real)> {
        let target = (P::index(m), P::index(n));
        self.orders
            .iter()
            .position(|&order| order == target)
            .map(|i| (self.reflectance[i], self.transmittance[i]))
    }
}
