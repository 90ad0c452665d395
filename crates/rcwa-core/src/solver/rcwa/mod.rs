//! Rigorous Coupled-Wave Analysis (RCWA) solver.
//!
//! Fields in every layer are expanded in the spatial Fourier harmonics of
//! the lattice. Each layer then reduces to a matrix eigenproblem, and the
//! layers are chained through boundary-matching relations into one global
//! linear system for the reflected and transmitted amplitudes.
//!
//! # Pipeline
//!
//! 1. [`harmonics`]: truncated harmonic set and diagonal $K_x, K_y, K_z$.
//! 2. [`convolution`]: per-layer Fourier convolution matrices.
//! 3. [`modes`]: per-layer eigenmodes, giving $F$ and $X$.
//! 4. [`recursion`]: backward coupling pass producing $(A_i, B_i)$ and $B'$.
//! 5. [`boundary`]: global solve and field recovery.
//! 6. [`efficiency`]: per-order reflectance and transmittance.
//!
//! Steps 2 and 3 run as one forward pass over the stack and step 4 as one
//! backward pass. Nothing is cached between solves.

pub mod blocks;
pub mod boundary;
pub mod convolution;
pub mod efficiency;
pub mod harmonics;
pub mod linalg;
pub mod modes;
pub mod recursion;

use num_complex::{Complex, Complex64};
use serde::{Deserialize, Serialize};

use self::boundary::Side;
use self::convolution::LayerConvolution;
use self::efficiency::Efficiencies;
use self::harmonics::{HalfSpaces, HarmonicBasis, IncidentWave};
use self::modes::LayerModes;
use super::{DiffractionSolver, RcwaError};
use crate::precision::Precision;
use crate::types::{Device, SolveResult, Source};

/// Numerical options of an RCWA solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Truncation shape exponent $\gamma > 0$.
    pub gamma: f64,
    /// Request the normal-vector correction. Not implemented; any solve
    /// with this set fails with [`RcwaError::UnsupportedFeature`].
    pub apply_nv: bool,
    /// Rescale efficiencies so that total reflectance plus transmittance is 1.
    pub renormalize: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            apply_nv: false,
            renormalize: true,
        }
    }
}

/// The RCWA solver, holding its validated options.
#[derive(Debug, Clone)]
pub struct RcwaSolver {
    options: SolverOptions,
}

fn check_normal_vectors(apply_nv: bool) -> Result<(), RcwaError> {
    if apply_nv {
        return Err(RcwaError::UnsupportedFeature(
            "normal-vector correction is not implemented".into(),
        ));
    }
    Ok(())
}

impl RcwaSolver {
    /// Validate `options` and build a solver.
    pub fn new(options: SolverOptions) -> Result<Self, RcwaError> {
        check_normal_vectors(options.apply_nv)?;
        if !(options.gamma.is_finite() && options.gamma > 0.0) {
            return Err(RcwaError::InvalidConfiguration(format!(
                "truncation shape exponent must be positive, got {}",
                options.gamma
            )));
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Solve with the options given at construction.
    pub fn solve<P: Precision>(&self, device: &Device, source: &Source) -> Result<SolveResult<P>, RcwaError> {
        self.solve_with_override(device, source, None)
    }

    /// Solve, optionally overriding the normal-vector flag for this call.
    ///
    /// The effective flag is checked before any computation, so an override
    /// cannot reach the unimplemented path.
    pub fn solve_with_override<P: Precision>(
        &self,
        device: &Device,
        source: &Source,
        apply_nv: Option<bool>,
    ) -> Result<SolveResult<P>, RcwaError> {
        check_normal_vectors(apply_nv.unwrap_or(self.options.apply_nv))?;
        if device.has_normal_vectors() {
            log::debug!("normal-vector grids present but unused");
        }
        run_pipeline::<P>(&self.options, device, source)
    }
}

impl DiffractionSolver for RcwaSolver {
    fn solve<P: Precision>(&self, device: &Device, source: &Source) -> Result<SolveResult<P>, RcwaError> {
        RcwaSolver::solve(self, device, source)
    }

    fn method_name(&self) -> &str {
        "RCWA"
    }
}

/// Convert a public complex input into the pipeline's convention.
///
/// Public permittivities absorb for Im ε > 0 ($e^{-i\omega t}$). The
/// pipeline's kz branch and $X = e^{-\lambda k_0 L}$ absorb for Im ε < 0,
/// so media, layer grids and polarization amplitudes are conjugated here
/// once. Efficiencies do not depend on the convention.
fn internal<P: Precision>(z: Complex64) -> Complex<P::Real> {
    P::complex(z.conj())
}

fn run_pipeline<P: Precision>(
    options: &SolverOptions,
    device: &Device,
    source: &Source,
) -> Result<SolveResult<P>, RcwaError> {
    let (reflection, transmission) = (device.reflection(), device.transmission());
    if !options.renormalize && (reflection.is_lossy() || transmission.is_lossy()) {
        log::warn!("lossy half-space without renormalisation: efficiencies are not power fractions");
    }

    let media = HalfSpaces::<P> {
        er1: internal::<P>(reflection.permittivity),
        ur1: internal::<P>(reflection.permeability),
        er2: internal::<P>(transmission.permittivity),
        ur2: internal::<P>(transmission.permeability),
    };
    let k0 = P::real(source.wavenumber());
    let n1 = (media.er1 * media.ur1).sqrt();
    let wave = IncidentWave::<P> {
        k_inc: source.direction().map(|d| n1 * P::real(d)),
        k0,
    };
    let polarization: [Complex<P::Real>; 3] = source.polarization().map(internal::<P>);

    let basis = HarmonicBasis::<P>::new(
        device.p(),
        device.q(),
        options.gamma,
        (device.period_x(), device.period_y()),
        &wave,
        &media,
    )?;
    let n = basis.len();
    let zeroth = basis.zeroth_order().ok_or_else(|| {
        RcwaError::InvalidConfiguration("zeroth harmonic was truncated away".into())
    })?;

    let mut layer_modes = Vec::with_capacity(device.layers().len());
    for (index, layer) in device.layers().iter().enumerate() {
        let grid = layer.permittivity().mapv(|e| e.conj());
        let conv = LayerConvolution::<P>::build(&grid, &basis, index)?;
        log::debug!(
            "layer {index}: {:?} grid, |eps - inv(conv(1/eps))| = {:.3e}",
            layer.permittivity().dim(),
            P::to_f64(conv.discontinuity())
        );
        layer_modes.push(LayerModes::solve(&conv, &basis, k0, P::real(layer.thickness()), index)?);
    }

    let a_mat = boundary::half_space_matrix(&basis, &media, Side::Reflection)?;
    let b_mat = boundary::half_space_matrix(&basis, &media, Side::Transmission)?;
    let chain = recursion::couple_layers(&layer_modes, &b_mat)?;

    let s = boundary::source_vector::<P>(&polarization, &wave.k_inc, media.ur1, zeroth, n);
    let fields = boundary::solve_fields(&basis, &a_mat, &chain, &s)?;

    let mut efficiencies = Efficiencies::from_fields(&fields, &basis, &media, wave.k_inc[2])?;
    let raw_total = efficiencies.total();
    if options.renormalize {
        efficiencies.renormalize()?;
    }

    let result = SolveResult {
        orders: basis.orders().to_vec(),
        total_reflectance: efficiencies.total_reflectance(),
        total_transmittance: efficiencies.total_transmittance(),
        reflectance: efficiencies.reflectance.to_vec(),
        transmittance: efficiencies.transmittance.to_vec(),
        renormalized: options.renormalize,
    };

    log::info!(
        "RCWA ({:?}): {} layers, {} harmonics, R = {:.6}, T = {:.6}, raw R+T = {:.6}",
        P::PROFILE,
        device.layers().len(),
        n,
        P::to_f64(result.total_reflectance),
        P::to_f64(result.total_transmittance),
        P::to_f64(raw_total),
    );

    Ok(result)
}

/// Convenience wrapper: solve once with default options in precision `P`.
pub fn solve_default<P: Precision>(device: &Device, source: &Source) -> Result<SolveResult<P>, RcwaError> {
    RcwaSolver::new(SolverOptions::default())?.solve(device, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precision::Double;
    use crate::types::{HalfSpace, Layer};
    use approx::assert_abs_diff_eq;

    fn glass_air(layers: Vec<Layer>) -> Device {
        Device::new(
            900.0,
            900.0,
            HalfSpace::dielectric(1.445 * 1.445),
            HalfSpace::dielectric(1.0),
            0,
            0,
            layers,
        )
        .unwrap()
    }

    #[test]
    fn test_default_options() {
        let options = SolverOptions::default();
        assert_eq!(options.gamma, 1.0);
        assert!(!options.apply_nv);
        assert!(options.renormalize);
    }

    #[test]
    fn test_nv_rejected_at_construction() {
        let options = SolverOptions {
            apply_nv: true,
            ..SolverOptions::default()
        };
        let err = RcwaSolver::new(options).unwrap_err();
        assert!(matches!(err, RcwaError::UnsupportedFeature(_)));
    }

    #[test]
    fn test_nv_override_rejected_at_call() {
        let solver = RcwaSolver::new(SolverOptions::default()).unwrap();
        let device = glass_air(vec![]);
        let source = Source::new(0.0, 0.0, 700.0, 1.0, 0.0).unwrap();
        let err = solver
            .solve_with_override::<Double>(&device, &source, Some(true))
            .unwrap_err();
        assert!(matches!(err, RcwaError::UnsupportedFeature(_)));

        assert!(solver
            .solve_with_override::<Double>(&device, &source, Some(false))
            .is_ok());
    }

    #[test]
    fn test_bare_interface_matches_fresnel() {
        let options = SolverOptions {
            renormalize: false,
            ..SolverOptions::default()
        };
        let solver = RcwaSolver::new(options).unwrap();
        let device = glass_air(vec![]);
        let source = Source::new(0.0, 0.0, 700.0, 1.0, 0.0).unwrap();
        let result = solver.solve::<Double>(&device, &source).unwrap();

        let r = ((1.445 - 1.0) / (1.445 + 1.0_f64)).powi(2);
        assert_abs_diff_eq!(result.total_reflectance, r, epsilon = 1e-12);
        assert_abs_diff_eq!(result.total(), 1.0, epsilon = 1e-12);
        assert!(!result.renormalized);
    }

    #[test]
    fn test_method_name() {
        let solver = RcwaSolver::new(SolverOptions::default()).unwrap();
        assert_eq!(DiffractionSolver::method_name(&solver), "RCWA");
    }

    #[test]
    fn test_options_deserialise_with_defaults() {
        let options: SolverOptions = serde_json::from_str(r#"{"gamma": 0.7}"#).unwrap();
        assert_eq!(options.gamma, 0.7);
        assert!(options.renormalize);
    }
}
