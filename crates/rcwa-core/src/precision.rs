//! Precision profiles.
//!
//! A solve runs entirely in one profile: every matrix, eigenvalue, FFT
//! buffer and efficiency is stored with the profile's real/complex types,
//! and harmonic indices use the profile's integer type. The profile is the
//! type parameter `P: Precision` of [`RcwaSolver::solve`], so mixing
//! profiles inside a single solve cannot be expressed.
//!
//! | Profile | Real | Complex | Index | faer scalar |
//! |---------|------|---------|-------|-------------|
//! | [`Single`] | `f32` | `Complex32` | `i32` | `c32` |
//! | [`Double`] | `f64` | `Complex64` | `i64` | `c64` |
//!
//! [`RcwaSolver::solve`]: crate::solver::rcwa::RcwaSolver::solve

use std::fmt::{Debug, Display};

use faer::complex_native::{c32, c64};
use num_complex::{Complex, Complex32, Complex64};
use num_traits::{Float, FloatConst, PrimInt, Signed};
use serde::{Deserialize, Serialize};

/// Runtime selector for a precision profile, as it appears in job files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecisionProfile {
    /// 32-bit reals, 64-bit complex, 32-bit indices.
    #[default]
    Low,
    /// 64-bit reals, 128-bit complex, 64-bit indices.
    High,
}

/// A paired real/complex/index type bundle used throughout one solve.
pub trait Precision: Copy + Debug + Send + Sync + 'static {
    /// Real scalar type.
    type Real: Float + FloatConst + rustfft::FftNum + Default + Debug + Display + Send + Sync;
    /// Signed integer type for harmonic indices.
    type Index: PrimInt + Signed + Debug + Display + Send + Sync + 'static;
    /// Matching complex scalar on the `faer` side of the linear-algebra bridge.
    type Native: faer::ComplexField;

    /// The runtime selector this bundle corresponds to.
    const PROFILE: PrecisionProfile;

    /// Narrow (or pass through) a double-precision real into this profile.
    fn real(x: f64) -> Self::Real;

    /// Narrow (or pass through) a double-precision complex into this profile.
    fn complex(z: Complex64) -> Complex<Self::Real>;

    /// Convert a harmonic index into the profile's real type.
    fn index_to_real(i: Self::Index) -> Self::Real;

    /// Build a harmonic index from a machine integer.
    fn index(i: i64) -> Self::Index;

    /// Widen a real for reporting.
    fn to_f64(x: Self::Real) -> f64;

    /// Widen a harmonic index for reporting.
    fn index_to_i64(i: Self::Index) -> i64;

    fn to_native(z: Complex<Self::Real>) -> Self::Native;

    fn from_native(z: Self::Native) -> Complex<Self::Real>;
}

/// Low-precision profile: `f32` / `Complex32` / `i32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Single;

/// High-precision profile: `f64` / `Complex64` / `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Double;

impl Precision for Single {
    type Real = f32;
    type Index = i32;
    type Native = c32;

    const PROFILE: PrecisionProfile = PrecisionProfile::Low;

    fn real(x: f64) -> f32 {
        x as f32
    }

    fn complex(z: Complex64) -> Complex32 {
        Complex32::new(z.re as f32, z.im as f32)
    }

    fn index_to_real(i: i32) -> f32 {
        i as f32
    }

    fn index(i: i64) -> i32 {
        i as i32
    }

    fn to_f64(x: f32) -> f64 {
        x as f64
    }

    fn index_to_i64(i: i32) -> i64 {
        i as i64
    }

    fn to_native(z: Complex32) -> c32 {
        c32::new(z.re, z.im)
    }

    fn from_native(z: c32) -> Complex32 {
        Complex32::new(z.re, z.im)
    }
}

impl Precision for Double {
    type Real = f64;
    type Index = i64;
    type Native = c64;

    const PROFILE: PrecisionProfile = PrecisionProfile::High;

    fn real(x: f64) -> f64 {
        x
    }

    fn complex(z: Complex64) -> Complex64 {
        z
    }

    fn index_to_real(i: i64) -> f64 {
        i as f64
    }

    fn index(i: i64) -> i64 {
        i
    }

    fn to_f64(x: f64) -> f64 {
        x
    }

    fn index_to_i64(i: i64) -> i64 {
        i
    }

    fn to_native(z: Complex64) -> c64 {
        c64::new(z.re, z.im)
    }

    fn from_native(z: c64) -> Complex64 {
        Complex64::new(z.re, z.im)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_match_selectors() {
        assert_eq!(Single::PROFILE, PrecisionProfile::Low);
        assert_eq!(Double::PROFILE, PrecisionProfile::High);
        assert_eq!(PrecisionProfile::default(), PrecisionProfile::Low);
    }

    #[test]
    fn test_native_round_trip_preserves_value() {
        let z = Complex64::new(1.25, -3.5);
        assert_eq!(Double::from_native(Double::to_native(z)), z);
        let z32 = Single::complex(z);
        assert_eq!(Single::from_native(Single::to_native(z32)), z32);
    }

    #[test]
    fn test_profile_deserialises_lowercase() {
        let high: PrecisionProfile = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(high, PrecisionProfile::High);
    }
}
