//! Fixed-layout block matrices.
//!
//! Every block matrix in the pipeline is one of three shapes:
//!
//! ```text
//!   quadrants(a, b, c, d)      stack_rows(top, bottom)    stack_cols(l, r)
//!   ┌─────┬─────┐              ┌─────┐                    ┌─────┬─────┐
//!   │  a  │  b  │  r1 rows     │ top │  r1 rows           │  l  │  r  │
//!   ├─────┼─────┤              ├─────┤                    └─────┴─────┘
//!   │  c  │  d  │  r2 rows     │ bot │  r2 rows             c1    c2
//!   └─────┴─────┘              └─────┘
//!    c1     c2                   c
//! ```
//!
//! Block sizes are checked on entry and the output is allocated once.
//! Diagonal matrices are carried as their diagonals and applied with
//! [`scale_rows`] / [`scale_cols`].

use ndarray::{s, Array1, Array2};
use num_complex::Complex;
use num_traits::Float;

/// Assemble `[[a, b], [c, d]]`.
///
/// `a`/`b` and `c`/`d` must share row counts, `a`/`c` and `b`/`d` column
/// counts.
pub fn quadrants<T: Float>(
    a: &Array2<Complex<T>>,
    b: &Array2<Complex<T>>,
    c: &Array2<Complex<T>>,
    d: &Array2<Complex<T>>,
) -> Array2<Complex<T>> {
    let (r1, c1) = a.dim();
    let (r2, c2) = d.dim();
    debug_assert_eq!(b.dim(), (r1, c2));
    debug_assert_eq!(c.dim(), (r2, c1));

    let mut out = Array2::zeros((r1 + r2, c1 + c2));
    out.slice_mut(s![..r1, ..c1]).assign(a);
    out.slice_mut(s![..r1, c1..]).assign(b);
    out.slice_mut(s![r1.., ..c1]).assign(c);
    out.slice_mut(s![r1.., c1..]).assign(d);
    out
}

/// Assemble `[top; bottom]`.
pub fn stack_rows<T: Float>(top: &Array2<Complex<T>>, bottom: &Array2<Complex<T>>) -> Array2<Complex<T>> {
    let (r1, cols) = top.dim();
    debug_assert_eq!(bottom.ncols(), cols);

    let mut out = Array2::zeros((r1 + bottom.nrows(), cols));
    out.slice_mut(s![..r1, ..]).assign(top);
    out.slice_mut(s![r1.., ..]).assign(bottom);
    out
}

/// Assemble `[left, right]`.
pub fn stack_cols<T: Float>(left: &Array2<Complex<T>>, right: &Array2<Complex<T>>) -> Array2<Complex<T>> {
    let (rows, c1) = left.dim();
    debug_assert_eq!(right.nrows(), rows);

    let mut out = Array2::zeros((rows, c1 + right.ncols()));
    out.slice_mut(s![.., ..c1]).assign(left);
    out.slice_mut(s![.., c1..]).assign(right);
    out
}

/// Split a matrix into its first `at` rows and the remainder.
pub fn split_rows<T: Float>(matrix: &Array2<Complex<T>>, at: usize) -> (Array2<Complex<T>>, Array2<Complex<T>>) {
    (
        matrix.slice(s![..at, ..]).to_owned(),
        matrix.slice(s![at.., ..]).to_owned(),
    )
}

/// Split a vector into its first `at` entries and the remainder.
pub fn split_vector<T: Float>(vector: &Array1<Complex<T>>, at: usize) -> (Array1<Complex<T>>, Array1<Complex<T>>) {
    (
        vector.slice(s![..at]).to_owned(),
        vector.slice(s![at..]).to_owned(),
    )
}

/// Dense matrix with `diagonal` on its main diagonal.
pub fn diag<T: Float>(diagonal: &Array1<Complex<T>>) -> Array2<Complex<T>> {
    let n = diagonal.len();
    let mut out = Array2::zeros((n, n));
    for (i, &v) in diagonal.iter().enumerate() {
        out[[i, i]] = v;
    }
    out
}

/// $\mathrm{diag}(d) \cdot M$: row `i` of `matrix` times `d[i]`.
pub fn scale_rows<T: Float>(diagonal: &Array1<Complex<T>>, matrix: &Array2<Complex<T>>) -> Array2<Complex<T>> {
    let mut out = matrix.clone();
    for (mut row, &d) in out.rows_mut().into_iter().zip(diagonal.iter()) {
        row.mapv_inplace(|v| v * d);
    }
    out
}

/// $M \cdot \mathrm{diag}(d)$: column `j` of `matrix` times `d[j]`.
pub fn scale_cols<T: Float>(matrix: &Array2<Complex<T>>, diagonal: &Array1<Complex<T>>) -> Array2<Complex<T>> {
    let mut out = matrix.clone();
    for (mut col, &d) in out.columns_mut().into_iter().zip(diagonal.iter()) {
        col.mapv_inplace(|v| v * d);
    }
    out
}
