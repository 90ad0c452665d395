//! Fourier convolution matrices of real-space material grids.
//!
//! For a periodic function $f$ sampled on the layer grid, multiplication
//! by $f$ acts on Fourier amplitudes as the convolution matrix
//!
//! $$[\![f]\!]_{ij} = \hat{f}(m_i - m_j,\; n_i - n_j)$$
//!
//! where $\hat{f}$ are the Fourier-series coefficients obtained from a 2D FFT
//! divided by the pixel count. Grid rows pair with `n`, columns with `m`.
//! Harmonic differences the grid cannot resolve (outside the shifted FFT
//! range $[-\lfloor N/2 \rfloor, \lfloor (N-1)/2 \rfloor]$ along an axis) have
//! no sampled content and are taken as zero.
//!
//! Each layer needs two matrices: $[\![\epsilon]\!]$ and
//! $[\![1/\epsilon]\!]^{-1}$ (the inverse rule). Their difference
//! $\Delta = [\![\epsilon]\!] - [\![1/\epsilon]\!]^{-1}$ is the coupling term
//! consumed by the normal-vector formulation.

use ndarray::Array2;
use num_complex::{Complex, Complex64};
use num_traits::{Float, One, Zero};

use super::harmonics::HarmonicBasis;
use super::linalg;
use crate::fft::fft2;
use crate::precision::Precision;
use crate::solver::RcwaError;

type C<P> = Complex<<P as Precision>::Real>;

/// Fourier-series coefficients of a grid, addressable by harmonic difference.
struct FourierCoefficients<P: Precision> {
    spectrum: Array2<C<P>>,
}

impl<P: Precision> FourierCoefficients<P> {
    fn of(grid: &Array2<C<P>>) -> Self {
        let scale = P::real(grid.len() as f64);
        let spectrum = fft2(grid).mapv(|z| z / scale);
        Self { spectrum }
    }

    /// Coefficient at harmonic difference `(dm, dn)`.
    fn at(&self, dm: i64, dn: i64) -> C<P> {
        let (rows, cols) = self.spectrum.dim();
        match (wrap(dn, rows), wrap(dm, cols)) {
            (Some(r), Some(c)) => self.spectrum[[r, c]],
            _ => C::<P>::zero(),
        }
    }
}

/// Map a signed frequency onto an FFT bin, if the axis resolves it.
fn wrap(freq: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let lo = -(len / 2);
    let hi = (len - 1) / 2;
    (lo..=hi)
        .contains(&freq)
        .then(|| freq.rem_euclid(len) as usize)
}

/// Convolution matrix of `grid` restricted to the harmonics of `basis`.
pub fn convolution_matrix<P: Precision>(
    grid: &Array2<C<P>>,
    basis: &HarmonicBasis<P>,
) -> Array2<C<P>> {
    let coefficients = FourierCoefficients::<P>::of(grid);
    let orders: Vec<(i64, i64)> = basis
        .orders()
        .iter()
        .map(|&(m, n)| (P::index_to_i64(m), P::index_to_i64(n)))
        .collect();

    let dim = orders.len();
    Array2::from_shape_fn((dim, dim), |(i, j)| {
        let (mi, ni) = orders[i];
        let (mj, nj) = orders[j];
        coefficients.at(mi - mj, ni - nj)
    })
}

/// The pair of convolution matrices one layer needs.
#[derive(Debug, Clone)]
pub struct LayerConvolution<P: Precision> {
    /// $[\![\epsilon]\!]$.
    pub direct: Array2<C<P>>,
    /// $[\![1/\epsilon]\!]^{-1}$.
    pub inverse_rule: Array2<C<P>>,
}

impl<P: Precision> LayerConvolution<P> {
    /// Build both matrices for a layer's permittivity grid.
    pub fn build(
        permittivity: &Array2<Complex64>,
        basis: &HarmonicBasis<P>,
        layer: usize,
    ) -> Result<Self, RcwaError> {
        if permittivity.iter().any(|e| e.norm_sqr() == 0.0) {
            return Err(RcwaError::InvalidConfiguration(format!(
                "layer {layer}: permittivity grid contains zeros, reciprocal is undefined"
            )));
        }

        let grid = permittivity.mapv(P::complex);
        let one = C::<P>::from(P::Real::one());
        let reciprocal = grid.mapv(|e| one / e);

        let direct = convolution_matrix(&grid, basis);
        let inverse_rule = linalg::inverse::<P>(
            &convolution_matrix(&reciprocal, basis),
            &format!("layer {layer} reciprocal convolution inverse"),
        )?;

        Ok(Self {
            direct,
            inverse_rule,
        })
    }

    /// $\Delta = [\![\epsilon]\!] - [\![1/\epsilon]\!]^{-1}$.
    pub fn delta(&self) -> Array2<C<P>> {
        &self.direct - &self.inverse_rule
    }

    /// Frobenius norm of $\Delta$; zero for laterally homogeneous layers.
    pub fn discontinuity(&self) -> P::Real {
        self.delta()
            .iter()
            .fold(P::Real::zero(), |acc, z| acc + z.norm_sqr())
            .sqrt()
    }
}
