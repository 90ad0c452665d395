//! Harmonic truncation and wavevector bookkeeping.
//!
//! The full harmonic set is the $(2q+1) \times (2p+1)$ lattice of integer
//! pairs $(m, n)$, laid out like the permittivity grid: rows follow `n`
//! (the y axis), columns follow `m` (the x axis). Truncation keeps the
//! pairs satisfying
//!
//! $$\left|\frac{m}{p}\right|^{2\gamma} + \left|\frac{n}{q}\right|^{2\gamma} \le 1$$
//!
//! so $\gamma = 1$ gives an elliptical set and smaller $\gamma$ a diamond-like
//! one. An axis with order 0 contributes nothing to the sum.
//!
//! All wavevector components are normalised by $k_0$.

use ndarray::Array1;
use num_complex::Complex;
use num_traits::{Float, FloatConst};

use crate::precision::Precision;
use crate::solver::RcwaError;

type C<P> = Complex<<P as Precision>::Real>;

/// Incidence data the basis is derived from, normalised by $k_0$.
#[derive(Debug, Clone, Copy)]
pub struct IncidentWave<P: Precision> {
    /// Incident wavevector $\mathbf{k}_{inc}/k_0 = n_1 \hat{k}$.
    pub k_inc: [C<P>; 3],
    /// Free-space wavenumber $k_0 = 2\pi/\lambda_0$.
    pub k0: P::Real,
}

/// Medium constants needed to evaluate $k_z$ in both half-spaces.
#[derive(Debug, Clone, Copy)]
pub struct HalfSpaces<P: Precision> {
    pub er1: C<P>,
    pub ur1: C<P>,
    pub er2: C<P>,
    pub ur2: C<P>,
}

/// The truncated harmonic set and its diagonal wavevector matrices.
///
/// Diagonal matrices are stored as their diagonals; entry `i` of every
/// vector belongs to `orders()[i]`.
#[derive(Debug, Clone)]
pub struct HarmonicBasis<P: Precision> {
    p: usize,
    q: usize,
    orders: Vec<(P::Index, P::Index)>,
    flat: Vec<usize>,
    kx: Array1<C<P>>,
    ky: Array1<C<P>>,
    kz_ref: Array1<C<P>>,
    kz_trn: Array1<C<P>>,
}

/// $k_z = \overline{\sqrt{\mu\epsilon - k_x^2 - k_y^2}}$ with the principal
/// square root.
pub fn longitudinal_wavenumber<T: Float>(
    ur: Complex<T>,
    er: Complex<T>,
    kx: Complex<T>,
    ky: Complex<T>,
) -> Complex<T> {
    (ur * er - kx * kx - ky * ky).sqrt().conj()
}

/// Truncation test for one harmonic pair.
fn survives(m: i64, n: i64, p: usize, q: usize, gamma: f64) -> bool {
    let term = |index: i64, order: usize| {
        if order == 0 {
            0.0
        } else {
            (index as f64 / order as f64).abs().powf(2.0 * gamma)
        }
    };
    term(m, p) + term(n, q) <= 1.0
}

impl<P: Precision> HarmonicBasis<P> {
    /// Enumerate surviving harmonics and evaluate their wavevectors.
    ///
    /// # Arguments
    /// * `p`, `q` - Truncation orders along x and y.
    /// * `gamma` - Truncation shape exponent $\gamma > 0$.
    /// * `periods` - $(\Lambda_x, \Lambda_y)$.
    /// * `wave` - Incident wavevector and $k_0$.
    /// * `media` - Half-space constants.
    pub fn new(
        p: usize,
        q: usize,
        gamma: f64,
        periods: (f64, f64),
        wave: &IncidentWave<P>,
        media: &HalfSpaces<P>,
    ) -> Result<Self, RcwaError> {
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(RcwaError::InvalidConfiguration(format!(
                "truncation shape exponent must be positive, got {gamma}"
            )));
        }

        let num_m = 2 * p + 1;
        let two_pi = P::Real::PI() + P::Real::PI();
        let gx = two_pi / (wave.k0 * P::real(periods.0));
        let gy = two_pi / (wave.k0 * P::real(periods.1));

        let mut orders = Vec::new();
        let mut flat = Vec::new();
        let mut kx = Vec::new();
        let mut ky = Vec::new();
        let mut kz_ref = Vec::new();
        let mut kz_trn = Vec::new();

        let (p_i, q_i) = (p as i64, q as i64);
        for n in -q_i..=q_i {
            for m in -p_i..=p_i {
                if !survives(m, n, p, q, gamma) {
                    continue;
                }
                let (mi, ni) = (P::index(m), P::index(n));
                let kx_mn = wave.k_inc[0] - C::<P>::from(gx * P::index_to_real(mi));
                let ky_mn = wave.k_inc[1] - C::<P>::from(gy * P::index_to_real(ni));

                orders.push((mi, ni));
                flat.push((n + q_i) as usize * num_m + (m + p_i) as usize);
                kx.push(kx_mn);
                ky.push(ky_mn);
                kz_ref.push(longitudinal_wavenumber(media.ur1, media.er1, kx_mn, ky_mn));
                kz_trn.push(longitudinal_wavenumber(media.ur2, media.er2, kx_mn, ky_mn));
            }
        }

        if orders.is_empty() {
            return Err(RcwaError::InvalidConfiguration(format!(
                "no harmonic survives truncation with p={p}, q={q}, gamma={gamma}"
            )));
        }
        log::debug!(
            "harmonic basis: {} of {} orders kept (p={p}, q={q}, gamma={gamma})",
            orders.len(),
            num_m * (2 * q + 1)
        );

        Ok(Self {
            p,
            q,
            orders,
            flat,
            kx: Array1::from_vec(kx),
            ky: Array1::from_vec(ky),
            kz_ref: Array1::from_vec(kz_ref),
            kz_trn: Array1::from_vec(kz_trn),
        })
    }

    /// Number of retained harmonics (the base block size `n`).
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn p(&self) -> usize {
        self.p
    }

    pub fn q(&self) -> usize {
        self.q
    }

    /// Surviving `(m, n)` pairs in iteration order.
    pub fn orders(&self) -> &[(P::Index, P::Index)] {
        &self.orders
    }

    /// Row-major indices of the surviving pairs within the full
    /// $(2q+1) \times (2p+1)$ harmonic lattice.
    pub fn flat_indices(&self) -> &[usize] {
        &self.flat
    }

    /// Position of the specular `(0, 0)` order.
    pub fn zeroth_order(&self) -> Option<usize> {
        let zero = P::index(0);
        self.orders.iter().position(|&(m, n)| m == zero && n == zero)
    }

    pub fn kx(&self) -> &Array1<C<P>> {
        &self.kx
    }

    pub fn ky(&self) -> &Array1<C<P>> {
        &self.ky
    }

    pub fn kz_ref(&self) -> &Array1<C<P>> {
        &self.kz_ref
    }

    pub fn kz_trn(&self) -> &Array1<C<P>> {
        &self.kz_trn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precision::Double;
    use approx::assert_abs_diff_eq;
    use num_complex::Complex64;

    fn normal_incidence(er1: f64) -> (IncidentWave<Double>, HalfSpaces<Double>) {
        let wave = IncidentWave::<Double> {
            k_inc: [
                Complex64::new(0.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(er1.sqrt(), 0.0),
            ],
            k0: 2.0 * std::f64::consts::PI / 700.0,
        };
        let media = HalfSpaces::<Double> {
            er1: Complex64::new(er1, 0.0),
            ur1: Complex64::new(1.0, 0.0),
            er2: Complex64::new(1.0, 0.0),
            ur2: Complex64::new(1.0, 0.0),
        };
        (wave, media)
    }

    #[test]
    fn test_elliptical_truncation_counts() {
        let (wave, media) = normal_incidence(1.0);
        let basis = HarmonicBasis::<Double>::new(2, 2, 1.0, (900.0, 900.0), &wave, &media).unwrap();
        // Pairs with m² + n² <= 4 on a 5x5 lattice.
        assert_eq!(basis.len(), 13);
        assert!(basis.len() <= 25);
    }

    #[test]
    fn test_orders_are_n_major_and_symmetric() {
        let (wave, media) = normal_incidence(1.0);
        let basis = HarmonicBasis::<Double>::new(1, 1, 1.0, (900.0, 900.0), &wave, &media).unwrap();
        let orders = basis.orders();
        assert_eq!(orders, &[(0, -1), (-1, 0), (0, 0), (1, 0), (0, 1)]);
        assert_eq!(basis.flat_indices(), &[1, 3, 4, 5, 7]);
        assert_eq!(basis.zeroth_order(), Some(orders.len() / 2));
    }

    #[test]
    fn test_zero_order_axis_keeps_single_harmonic() {
        let (wave, media) = normal_incidence(1.0);
        let basis = HarmonicBasis::<Double>::new(0, 0, 1.0, (900.0, 900.0), &wave, &media).unwrap();
        assert_eq!(basis.orders(), &[(0, 0)]);

        let line = HarmonicBasis::<Double>::new(3, 0, 1.0, (900.0, 900.0), &wave, &media).unwrap();
        assert_eq!(line.len(), 7);
    }

    #[test]
    fn test_grating_equation_and_kz_branch() {
        let er1 = 1.445_f64 * 1.445;
        let (wave, media) = normal_incidence(er1);
        let basis = HarmonicBasis::<Double>::new(2, 0, 1.0, (900.0, 900.0), &wave, &media).unwrap();

        // kx(m) = -m λ / Λ at normal incidence.
        for (i, &(m, _)) in basis.orders().iter().enumerate() {
            assert_abs_diff_eq!(basis.kx()[i].re, -(m as f64) * 700.0 / 900.0, epsilon = 1e-12);
        }

        let zeroth = basis.zeroth_order().unwrap();
        assert_abs_diff_eq!(basis.kz_ref()[zeroth].re, 1.445, epsilon = 1e-12);
        assert_abs_diff_eq!(basis.kz_trn()[zeroth].re, 1.0, epsilon = 1e-12);

        // |m| = 2 is evanescent in both media: purely imaginary, non-positive branch.
        let outer = basis.orders().iter().position(|&(m, _)| m == 2).unwrap();
        assert_abs_diff_eq!(basis.kz_trn()[outer].re, 0.0, epsilon = 1e-12);
        assert!(basis.kz_trn()[outer].im < 0.0);
    }

    #[test]
    fn test_non_positive_gamma_rejected() {
        let (wave, media) = normal_incidence(1.0);
        let err = HarmonicBasis::<Double>::new(2, 2, 0.0, (900.0, 900.0), &wave, &media).unwrap_err();
        assert!(matches!(err, RcwaError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_longitudinal_wavenumber_lossy_medium() {
        let kz = longitudinal_wavenumber(
            Complex64::new(1.0, 0.0),
            Complex64::new(2.0, 0.5),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
        );
        let expected = Complex64::new(2.0, 0.5).sqrt().conj();
        assert_abs_diff_eq!(kz.re, expected.re, epsilon = 1e-14);
        assert_abs_diff_eq!(kz.im, expected.im, epsilon = 1e-14);
    }
}
