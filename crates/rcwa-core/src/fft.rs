//! 2D FFT over complex grids, built on `rustfft`.
//!
//! The forward transform uses the kernel $e^{-2\pi i k n / N}$ and is
//! unnormalised. Callers that want Fourier-series coefficients divide by
//! the number of samples.

use ndarray::{Array2, ArrayView1, Axis};
use num_complex::Complex;
use rustfft::{FftNum, FftPlanner};

/// Forward 2D FFT (rows, then columns).
pub fn fft2<T: FftNum>(input: &Array2<Complex<T>>) -> Array2<Complex<T>> {
    let (nrows, ncols) = input.dim();
    let mut data = input.clone();
    if nrows == 0 || ncols == 0 {
        return data;
    }

    let mut planner = FftPlanner::<T>::new();

    let fft_row = planner.plan_fft_forward(ncols);
    let mut buffer = Vec::with_capacity(ncols.max(nrows));
    for mut row in data.axis_iter_mut(Axis(0)) {
        buffer.clear();
        buffer.extend(row.iter().copied());
        fft_row.process(&mut buffer);
        row.assign(&ArrayView1::from(&buffer[..]));
    }

    let fft_col = planner.plan_fft_forward(nrows);
    for mut col in data.axis_iter_mut(Axis(1)) {
        buffer.clear();
        buffer.extend(col.iter().copied());
        fft_col.process(&mut buffer);
        col.assign(&ArrayView1::from(&buffer[..]));
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn test_fft2_dc_component() {
        // For a constant field, the DC component (0,0) should be N*M*value
        let val = Complex64::new(3.0, -1.0);
        let input = Array2::from_elem((8, 6), val);
        let spectrum = fft2(&input);

        let expected_dc = val * 48.0;
        assert!(
            (spectrum[[0, 0]] - expected_dc).norm() < 1e-10,
            "DC component: {} vs {expected_dc}",
            spectrum[[0, 0]]
        );
        for ((i, j), v) in spectrum.indexed_iter() {
            if (i, j) != (0, 0) {
                assert!(v.norm() < 1e-10, "non-DC bin ({i}, {j}) = {v}");
            }
        }
    }

    #[test]
    fn test_fft2_single_harmonic_lands_in_its_bin() {
        // f(r, c) = exp(-2πi (r/nr + 2c/nc)) has all its energy in bin (nr-1, nc-2).
        let (nr, nc) = (5, 7);
        let input = Array2::from_shape_fn((nr, nc), |(r, c)| {
            let phase = -2.0
                * std::f64::consts::PI
                * (r as f64 / nr as f64 + 2.0 * c as f64 / nc as f64);
            Complex64::from_polar(1.0, phase)
        });
        let spectrum = fft2(&input);
        assert!((spectrum[[nr - 1, nc - 2]].re - (nr * nc) as f64).abs() < 1e-9);
        assert!(spectrum[[0, 0]].norm() < 1e-9);
    }

    #[test]
    fn test_fft2_zeros() {
        let input = Array2::<Complex64>::zeros((4, 4));
        let spectrum = fft2(&input);
        for &v in spectrum.iter() {
            assert!(v.norm() < 1e-15, "FFT of zeros should be zero");
        }
    }
}
