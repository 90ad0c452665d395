//! Eigenmodes of a single patterned layer.
//!
//! Inside a layer the transverse fields obey
//! $\partial_z^2 \mathbf{e} = \Omega^2 \mathbf{e}$ with $\Omega^2 = PQ$,
//! where (all blocks $n \times n$, $K_x, K_y$ diagonal)
//!
//! $$P = \begin{bmatrix} K_x E^{-1} K_y & I - K_x E^{-1} K_x \\ K_y E^{-1} K_y - I & -K_y E^{-1} K_x \end{bmatrix},\qquad
//!   Q = \begin{bmatrix} K_x K_y & E - K_x^2 \\ K_y^2 - E & -K_y K_x \end{bmatrix}$$
//!
//! and $E = [\![\epsilon]\!]$. With $\Omega^2 W = W \Lambda^2$ the layer is
//! summarised by $X = e^{-\Lambda k_0 L}$ and $F = [[W, W], [-V, V]]$ with
//! $V = Q W \Lambda^{-1}$.

use ndarray::{Array1, Array2};
use num_complex::Complex;
use num_traits::Zero;

use super::blocks::{diag, quadrants, scale_cols, scale_rows};
use super::convolution::LayerConvolution;
use super::harmonics::HarmonicBasis;
use super::linalg;
use crate::precision::Precision;
use crate::solver::RcwaError;

type C<P> = Complex<<P as Precision>::Real>;

/// Field matrix and propagator of one layer.
#[derive(Debug, Clone)]
pub struct LayerModes<P: Precision> {
    /// $F$, `4n x 4n`.
    pub f: Array2<C<P>>,
    /// Diagonal of $X$, length `2n`.
    pub x: Array1<C<P>>,
}

/// Build the `2n x 2n` $P$ and $Q$ matrices of a layer.
fn pq_matrices<P: Precision>(
    conv: &LayerConvolution<P>,
    basis: &HarmonicBasis<P>,
    layer: usize,
) -> Result<(Array2<C<P>>, Array2<C<P>>), RcwaError> {
    let n = basis.len();
    let (kx, ky) = (basis.kx(), basis.ky());
    let identity = Array2::<C<P>>::eye(n);

    let er_inv = linalg::inverse::<P>(&conv.direct, &format!("layer {layer} permittivity inverse"))?;
    let er_inv_ky = scale_cols(&er_inv, ky);
    let er_inv_kx = scale_cols(&er_inv, kx);

    let p = quadrants(
        &scale_rows(kx, &er_inv_ky),
        &(&identity - &scale_rows(kx, &er_inv_kx)),
        &(&scale_rows(ky, &er_inv_ky) - &identity),
        &scale_rows(ky, &er_inv_kx).mapv(|z| -z),
    );

    let kxky = kx * ky;
    let q = quadrants(
        &diag(&kxky),
        &(&conv.direct - &diag(&(kx * kx))),
        &(&diag(&(ky * ky)) - &conv.direct),
        &diag(&kxky.mapv(|z| -z)),
    );

    Ok((p, q))
}

impl<P: Precision> LayerModes<P> {
    /// Solve the layer eigenproblem and build $F$ and $X$.
    ///
    /// # Arguments
    /// * `conv` - Convolution matrices of the layer permittivity.
    /// * `basis` - Harmonic basis providing $K_x$ and $K_y$.
    /// * `k0` - Free-space wavenumber.
    /// * `thickness` - Layer thickness, same length unit as $1/k_0$.
    /// * `layer` - Layer index, for diagnostics.
    pub fn solve(
        conv: &LayerConvolution<P>,
        basis: &HarmonicBasis<P>,
        k0: P::Real,
        thickness: P::Real,
        layer: usize,
    ) -> Result<Self, RcwaError> {
        let (p, q) = pq_matrices(conv, basis, layer)?;
        let omega2 = p.dot(&q);

        let (lambda2, w) = linalg::eig::<P>(&omega2, &format!("layer {layer} eigenmodes"))?;
        // Principal root: Re(λ) >= 0, so X decays with depth.
        let lambda = lambda2.mapv(|l| l.sqrt());
        if lambda.iter().any(|l| l.is_zero()) {
            return Err(RcwaError::LinAlgError(format!(
                "layer {layer}: zero eigenvalue, mode is exactly at cutoff"
            )));
        }

        let depth = k0 * thickness;
        let x = lambda.mapv(|l| (-l * depth).exp());
        let v = scale_cols(&q.dot(&w), &lambda.mapv(|l| l.inv()));
        let f = quadrants(&w, &w, &v.mapv(|z| -z), &v);

        log::debug!(
            "layer {layer}: {}x{} field matrix, min |X| = {:.3e}",
            f.nrows(),
            f.ncols(),
            x.iter()
                .map(|z| P::to_f64(z.norm()))
                .fold(f64::INFINITY, f64::min)
        );

        Ok(Self { f, x })
    }

    /// Base block size `n` (harmonic count).
    pub fn harmonics(&self) -> usize {
        self.x.len() / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precision::Double;
    use crate::solver::rcwa::harmonics::{HalfSpaces, IncidentWave};
    use approx::assert_abs_diff_eq;
    use num_complex::Complex64;

    fn setup(p: usize, theta: f64) -> (HarmonicBasis<Double>, IncidentWave<Double>) {
        let er1 = Complex64::new(1.0, 0.0);
        let wave = IncidentWave::<Double> {
            k_inc: [
                Complex64::new(theta.sin(), 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(theta.cos(), 0.0),
            ],
            k0: 2.0 * std::f64::consts::PI / 600.0,
        };
        let media = HalfSpaces::<Double> {
            er1,
            ur1: er1,
            er2: er1,
            ur2: er1,
        };
        let basis = HarmonicBasis::new(p, p, 1.0, (400.0, 400.0), &wave, &media).unwrap();
        (basis, wave)
    }

    #[test]
    fn test_homogeneous_layer_eigenvalues_are_kz() {
        // In a uniform medium λ² = kx² + ky² - ε for every order, twice.
        let eps = Complex64::new(2.25, 0.0);
        let (basis, wave) = setup(1, 0.3);
        let grid = Array2::from_elem((1, 1), eps);
        let conv = LayerConvolution::build(&grid, &basis, 0).unwrap();
        let modes = LayerModes::solve(&conv, &basis, wave.k0, 50.0, 0).unwrap();

        let n = basis.len();
        assert_eq!(modes.harmonics(), n);
        assert_eq!(modes.f.dim(), (4 * n, 4 * n));

        let mut expected: Vec<f64> = (0..n)
            .flat_map(|i| {
                let kt = basis.kx()[i] * basis.kx()[i] + basis.ky()[i] * basis.ky()[i];
                let l = (kt - eps).sqrt();
                let mag = (-l * wave.k0 * 50.0).exp().norm();
                [mag, mag]
            })
            .collect();
        let mut actual: Vec<f64> = modes.x.iter().map(|z| z.norm()).collect();
        expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
        actual.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(a, e, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_propagating_modes_have_unit_magnitude_propagator() {
        let (basis, wave) = setup(0, 0.0);
        let grid = Array2::from_elem((1, 1), Complex64::new(4.0, 0.0));
        let conv = LayerConvolution::build(&grid, &basis, 0).unwrap();
        let modes = LayerModes::solve(&conv, &basis, wave.k0, 123.0, 0).unwrap();
        for z in modes.x.iter() {
            assert_abs_diff_eq!(z.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_lossy_layer_propagator_decays() {
        let (basis, wave) = setup(1, 0.0);
        let grid = Array2::from_elem((2, 2), Complex64::new(-10.0, 1.5));
        let conv = LayerConvolution::build(&grid, &basis, 0).unwrap();
        let modes = LayerModes::solve(&conv, &basis, wave.k0, 30.0, 0).unwrap();
        for z in modes.x.iter() {
            assert!(z.norm() < 1.0);
        }
    }
}
