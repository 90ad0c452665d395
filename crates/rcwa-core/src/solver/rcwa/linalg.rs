//! Dense linear algebra on ndarray matrices, delegated to `faer`.
//!
//! Matrices are copied into `faer` at each call, decomposed there, and the
//! results copied back into ndarray. `faer` reports singular systems
//! through non-finite entries rather than an error, so every result is
//! checked before it is handed back.

use faer::linalg::solvers::SpSolver;
use faer::Mat;
use ndarray::{Array1, Array2};
use num_complex::Complex;
use num_traits::Float;

use crate::precision::Precision;
use crate::solver::RcwaError;

type C<P> = Complex<<P as Precision>::Real>;

fn to_faer<P: Precision>(matrix: &Array2<C<P>>) -> Mat<P::Native> {
    Mat::from_fn(matrix.nrows(), matrix.ncols(), |i, j| {
        P::to_native(matrix[[i, j]])
    })
}

fn from_faer<P: Precision>(matrix: &Mat<P::Native>) -> Array2<C<P>> {
    Array2::from_shape_fn((matrix.nrows(), matrix.ncols()), |(i, j)| {
        P::from_native(matrix.read(i, j))
    })
}

fn all_finite<'a, T: Float + 'a>(values: impl IntoIterator<Item = &'a Complex<T>>) -> bool {
    values
        .into_iter()
        .all(|z| z.re.is_finite() && z.im.is_finite())
}

/// Solve $\mathbf{A}\mathbf{X} = \mathbf{B}$ by LU with partial pivoting.
///
/// # Arguments
/// * `matrix` - Square system matrix $\mathbf{A}$.
/// * `rhs` - Right-hand sides $\mathbf{B}$, one per column.
/// * `stage` - Pipeline stage name used in the error message.
pub fn solve<P: Precision>(
    matrix: &Array2<C<P>>,
    rhs: &Array2<C<P>>,
    stage: &str,
) -> Result<Array2<C<P>>, RcwaError> {
    let dim = matrix.nrows();
    if dim != matrix.ncols() || dim != rhs.nrows() {
        return Err(RcwaError::LinAlgError(format!(
            "{stage}: shape mismatch, matrix {:?} vs rhs {:?}",
            matrix.dim(),
            rhs.dim()
        )));
    }

    let lu = to_faer::<P>(matrix).partial_piv_lu();
    let solution = from_faer::<P>(&lu.solve(&to_faer::<P>(rhs)));

    if !all_finite(solution.iter()) {
        return Err(RcwaError::LinAlgError(format!(
            "{stage}: singular or ill-conditioned {dim}x{dim} system"
        )));
    }
    Ok(solution)
}

/// Solve against a single right-hand side vector.
pub fn solve_vector<P: Precision>(
    matrix: &Array2<C<P>>,
    rhs: &Array1<C<P>>,
    stage: &str,
) -> Result<Array1<C<P>>, RcwaError> {
    let column = rhs.view().insert_axis(ndarray::Axis(1)).to_owned();
    let solution = solve::<P>(matrix, &column, stage)?;
    Ok(solution.column(0).to_owned())
}

/// Matrix inverse via LU against the identity.
pub fn inverse<P: Precision>(matrix: &Array2<C<P>>, stage: &str) -> Result<Array2<C<P>>, RcwaError> {
    let identity = Array2::<C<P>>::eye(matrix.nrows());
    solve::<P>(matrix, &identity, stage)
}

/// General complex eigendecomposition $\mathbf{A}\mathbf{W} = \mathbf{W}\Lambda$.
///
/// Returns the eigenvalues and the matrix whose columns are the matching
/// eigenvectors. Eigenvalue order is whatever the decomposition produces;
/// with degenerate eigenvalues the eigenvector basis is not unique.
pub fn eig<P: Precision>(
    matrix: &Array2<C<P>>,
    stage: &str,
) -> Result<(Array1<C<P>>, Array2<C<P>>), RcwaError> {
    let dim = matrix.nrows();
    if dim != matrix.ncols() {
        return Err(RcwaError::LinAlgError(format!(
            "{stage}: eigendecomposition of non-square matrix {:?}",
            matrix.dim()
        )));
    }

    let evd = to_faer::<P>(matrix).complex_eigendecomposition();
    let values = evd.s().column_vector();
    let vectors = evd.u();

    let eigenvalues = Array1::from_shape_fn(dim, |i| P::from_native(values.read(i)));
    let eigenvectors = Array2::from_shape_fn((dim, dim), |(i, j)| P::from_native(vectors.read(i, j)));

    if !all_finite(eigenvalues.iter()) || !all_finite(eigenvectors.iter()) {
        return Err(RcwaError::LinAlgError(format!(
            "{stage}: eigendecomposition of {dim}x{dim} matrix did not converge"
        )));
    }
    Ok((eigenvalues, eigenvectors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precision::{Double, Single};
    use num_complex::{Complex32, Complex64};

    #[test]
    fn test_solve_identity_system() {
        let dim = 6;
        let matrix = Array2::<Complex64>::eye(dim);
        let rhs = Array2::from_shape_fn((dim, 2), |(i, j)| Complex64::new(i as f64, j as f64));

        let sol = solve::<Double>(&matrix, &rhs, "test").unwrap();
        for (a, b) in sol.iter().zip(rhs.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn test_solve_complex_system() {
        let matrix = Array2::from_shape_vec(
            (2, 2),
            vec![
                Complex64::new(1.0, 1.0),
                Complex64::new(2.0, 0.0),
                Complex64::new(0.0, 1.0),
                Complex64::new(3.0, -1.0),
            ],
        )
        .unwrap();
        let rhs = Array1::from_vec(vec![Complex64::new(5.0, 1.0), Complex64::new(4.0, 2.0)]);

        let sol = solve_vector::<Double>(&matrix, &rhs, "test").unwrap();
        let check = matrix.dot(&sol);
        for i in 0..2 {
            assert!(
                (check[i] - rhs[i]).norm() < 1e-10,
                "Mismatch at {}: got {:?}, expected {:?}",
                i,
                check[i],
                rhs[i]
            );
        }
    }

    #[test]
    fn test_singular_system_is_reported() {
        let matrix = Array2::<Complex64>::zeros((3, 3));
        let err = inverse::<Double>(&matrix, "singular").unwrap_err();
        assert!(matches!(err, RcwaError::LinAlgError(_)));
    }

    #[test]
    fn test_eig_reconstructs_matrix_action() {
        let matrix = Array2::from_shape_vec(
            (3, 3),
            vec![
                Complex64::new(2.0, 0.0),
                Complex64::new(1.0, 0.5),
                Complex64::new(0.0, 0.0),
                Complex64::new(0.0, -1.0),
                Complex64::new(3.0, 0.0),
                Complex64::new(1.0, 0.0),
                Complex64::new(0.5, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(-1.0, 2.0),
            ],
        )
        .unwrap();

        let (values, vectors) = eig::<Double>(&matrix, "test").unwrap();
        let lhs = matrix.dot(&vectors);
        for j in 0..3 {
            for i in 0..3 {
                let rhs = vectors[[i, j]] * values[j];
                assert!((lhs[[i, j]] - rhs).norm() < 1e-9);
            }
        }
    }

    #[test]
    fn test_single_precision_inverse() {
        let matrix = Array2::from_shape_vec(
            (2, 2),
            vec![
                Complex32::new(4.0, 0.0),
                Complex32::new(1.0, 1.0),
                Complex32::new(0.0, -2.0),
                Complex32::new(3.0, 0.0),
            ],
        )
        .unwrap();
        let inv = inverse::<Single>(&matrix, "test").unwrap();
        let product = matrix.dot(&inv);
        for ((i, j), value) in product.indexed_iter() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert!((value - Complex32::new(expected, 0.0)).norm() < 1e-5);
        }
    }
}
