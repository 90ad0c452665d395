//! Analytic reference for a homogeneous slab at normal incidence.
//!
//! A single isotropic, non-magnetic film of index $n$ and thickness $d$
//! between media $n_1$ (incidence side) and $n_2$ has the characteristic
//! matrix
//!
//! $$M = \begin{bmatrix} \cos\delta & -\tfrac{i}{n}\sin\delta \\ -i n \sin\delta & \cos\delta \end{bmatrix},
//!   \qquad \delta = \frac{2\pi n d}{\lambda_0}$$
//!
//! from which
//!
//! $$r = \frac{n_1 M_{11} + n_1 n_2 M_{12} - M_{21} - n_2 M_{22}}
//!            {n_1 M_{11} + n_1 n_2 M_{12} + M_{21} + n_2 M_{22}}, \qquad
//!   t = \frac{2 n_1}{n_1 M_{11} + n_1 n_2 M_{12} + M_{21} + n_2 M_{22}}$$
//!
//! and $R = |r|^2$, $T = \mathrm{Re}(n_2)/\mathrm{Re}(n_1)\,|t|^2$.
//! At normal incidence TE and TM coincide. Absorbing media have $\mathrm{Im}\,\epsilon > 0$.

use num_complex::Complex64;

/// Reflectance and transmittance of the slab.
///
/// # Arguments
/// * `er1` - Permittivity of the incidence half-space (must be lossless).
/// * `er_slab` - Slab permittivity.
/// * `er2` - Permittivity of the exit half-space.
/// * `thickness` - Slab thickness, same unit as `wavelength`.
/// * `wavelength` - Free-space wavelength.
pub fn slab_response(
    er1: Complex64,
    er_slab: Complex64,
    er2: Complex64,
    thickness: f64,
    wavelength: f64,
) -> (f64, f64) {
    let (n1, n, n2) = (er1.sqrt(), er_slab.sqrt(), er2.sqrt());
    let i = Complex64::i();
    let delta = n * (2.0 * std::f64::consts::PI * thickness / wavelength);

    let (cos, sin) = (delta.cos(), delta.sin());
    let (m11, m12, m21, m22) = (cos, -i * sin / n, -i * n * sin, cos);

    let a = n1 * m11 + n1 * n2 * m12;
    let b = m21 + n2 * m22;
    let r = (a - b) / (a + b);
    let t = 2.0 * n1 / (a + b);

    (r.norm_sqr(), n2.re / n1.re * t.norm_sqr())
}

/// Single-interface Fresnel reflectance at normal incidence.
pub fn interface_reflectance(er1: Complex64, er2: Complex64) -> f64 {
    let (n1, n2) = (er1.sqrt(), er2.sqrt());
    ((n1 - n2) / (n1 + n2)).norm_sqr()
}
