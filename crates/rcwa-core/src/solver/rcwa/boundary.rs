//! Half-space matrices, the incident source vector and the global
//! boundary solve.
//!
//! In each half-space the tangential magnetic field follows from the
//! tangential electric field through the diagonal wavevectors. With
//! $D_1 = \mu_1 K_{z,ref}$ and $D_2 = \mu_2 K_{z,trn}$ (`n x n` diagonal):
//!
//! $$\mathcal{A} = \begin{bmatrix} I & 0 \\ 0 & I \\ -i K_x K_y D_1^{-1} & -i (K_y^2 + K_{z,ref}^2) D_1^{-1} \\ i (K_x^2 + K_{z,ref}^2) D_1^{-1} & i K_x K_y D_1^{-1} \end{bmatrix}$$
//!
//! and $\mathcal{B}$ the same with $D_2$, $K_{z,trn}$ and the lower blocks
//! negated. The global system $[-\mathcal{A}, B'] [r; t_1] = s$ gives the
//! reflected amplitudes directly and the transmitted ones after
//! back-propagation through every layer.

use ndarray::{Array1, Array2};
use num_complex::Complex;
use num_traits::{One, Zero};

use super::blocks::{diag, quadrants, split_vector, stack_cols, stack_rows};
use super::harmonics::{HalfSpaces, HarmonicBasis};
use super::linalg;
use super::recursion::CouplingChain;
use crate::precision::Precision;
use crate::solver::RcwaError;

type C<P> = Complex<<P as Precision>::Real>;

/// Which half-space a matrix belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Reflection,
    Transmission,
}

/// The `4n x 2n` half-space matrix $\mathcal{A}$ (reflection) or
/// $\mathcal{B}$ (transmission).
pub fn half_space_matrix<P: Precision>(
    basis: &HarmonicBasis<P>,
    media: &HalfSpaces<P>,
    side: Side,
) -> Result<Array2<C<P>>, RcwaError> {
    let (kx, ky) = (basis.kx(), basis.ky());
    let (kz, ur, sign) = match side {
        Side::Reflection => (basis.kz_ref(), media.ur1, P::Real::one()),
        Side::Transmission => (basis.kz_trn(), media.ur2, -P::Real::one()),
    };

    let d = kz.mapv(|k| ur * k);
    if let Some(i) = d.iter().position(|v| v.is_zero()) {
        let (m, n) = basis.orders()[i];
        return Err(RcwaError::LinAlgError(format!(
            "{side:?} half-space: kz vanishes for order ({m}, {n}) (Rayleigh anomaly)"
        )));
    }

    let i_unit = C::<P>::i() * sign;
    let kxky = kx * ky;
    let kz2 = kz * kz;
    let scaled = |num: Array1<C<P>>, factor: C<P>| diag(&(num / &d).mapv(|z| z * factor));

    let n = basis.len();
    let identity = Array2::<C<P>>::eye(2 * n);
    let lower = quadrants(
        &scaled(kxky.clone(), -i_unit),
        &scaled(ky * ky + &kz2, -i_unit),
        &scaled(kx * kx + &kz2, i_unit),
        &scaled(kxky, i_unit),
    );
    Ok(stack_rows(&identity, &lower))
}

/// Incident source vector $s$ of length `4n`.
///
/// Only the zeroth harmonic is excited:
/// $s = [P_x \delta,\; P_y \delta,\; i(k_z P_y - k_y P_z)\delta/\mu_1,\; i(k_x P_z - k_z P_x)\delta/\mu_1]$.
pub fn source_vector<P: Precision>(
    polarization: &[C<P>; 3],
    k_inc: &[C<P>; 3],
    ur1: C<P>,
    zeroth: usize,
    n: usize,
) -> Array1<C<P>> {
    let [px, py, pz] = *polarization;
    let [kx, ky, kz] = *k_inc;
    let i = C::<P>::i();

    let mut s = Array1::from_elem(4 * n, C::<P>::zero());
    s[zeroth] = px;
    s[n + zeroth] = py;
    s[2 * n + zeroth] = i * (kz * py - ky * pz) / ur1;
    s[3 * n + zeroth] = i * (kx * pz - kz * px) / ur1;
    s
}

/// Reflected and transmitted field amplitudes, one row per harmonic,
/// columns `(x, y, z)`.
#[derive(Debug, Clone)]
pub struct FieldAmplitudes<P: Precision> {
    pub reflected: Array2<C<P>>,
    pub transmitted: Array2<C<P>>,
}

/// $E_z = -(K_x E_x + K_y E_y)/K_z$ from $\nabla \cdot \mathbf{E} = 0$.
fn with_longitudinal<P: Precision>(
    ex: Array1<C<P>>,
    ey: Array1<C<P>>,
    basis: &HarmonicBasis<P>,
    kz: &Array1<C<P>>,
) -> Array2<C<P>> {
    let ez = (basis.kx() * &ex + basis.ky() * &ey).mapv(|z| -z) / kz;
    let n = ex.len();
    let mut out = Array2::zeros((n, 3));
    out.column_mut(0).assign(&ex);
    out.column_mut(1).assign(&ey);
    out.column_mut(2).assign(&ez);
    out
}

/// Solve the global boundary system and recover full 3-component fields.
///
/// # Arguments
/// * `basis` - Harmonic basis (provides $K_x$, $K_y$, both $K_z$).
/// * `a_mat` - Reflection half-space matrix $\mathcal{A}$.
/// * `chain` - Output of the backward pass (supplies $B'$ and $A_i^{-1}X_i$).
/// * `source` - Incident source vector.
pub fn solve_fields<P: Precision>(
    basis: &HarmonicBasis<P>,
    a_mat: &Array2<C<P>>,
    chain: &CouplingChain<P>,
    source: &Array1<C<P>>,
) -> Result<FieldAmplitudes<P>, RcwaError> {
    let n = basis.len();
    let half = 2 * n;

    let system = stack_cols(&a_mat.mapv(|z| -z), &chain.b_prime);
    let solution = linalg::solve_vector::<P>(&system, source, "global boundary system")?;
    let (r_xy, t1) = split_vector(&solution, half);

    let t_xy = chain
        .couplings
        .iter()
        .fold(t1, |t, coupling| coupling.a_inv_x.dot(&t));

    let (rx, ry) = split_vector(&r_xy, n);
    let (tx, ty) = split_vector(&t_xy, n);

    Ok(FieldAmplitudes {
        reflected: with_longitudinal(rx, ry, basis, basis.kz_ref()),
        transmitted: with_longitudinal(tx, ty, basis, basis.kz_trn()),
    })
}
