//! Power-normalised diffraction efficiencies.
//!
//! $$R_j = \frac{\mathrm{Re}(k_{z,ref,j}/\mu_1)}{\mathrm{Re}(k_{z,inc}/\mu_1)} |\mathbf{r}_j|^2,\qquad
//!   T_j = \frac{\mathrm{Re}(k_{z,trn,j}/\mu_2)}{\mathrm{Re}(k_{z,inc}/\mu_1)} |\mathbf{t}_j|^2$$
//!
//! Evanescent orders have $\mathrm{Re}(k_z) = 0$ and carry no power.

use ndarray::{Array1, Array2, Axis};
use num_complex::Complex;
use num_traits::{Float, Zero};

use super::boundary::FieldAmplitudes;
use super::harmonics::{HalfSpaces, HarmonicBasis};
use crate::precision::Precision;
use crate::solver::RcwaError;

type C<P> = Complex<<P as Precision>::Real>;

/// Per-order efficiencies and their sums.
#[derive(Debug, Clone)]
pub struct Efficiencies<P: Precision> {
    pub reflectance: Array1<P::Real>,
    pub transmittance: Array1<P::Real>,
}

fn power_per_order<P: Precision>(field: &Array2<C<P>>) -> Array1<P::Real> {
    field.map(|z| z.norm_sqr()).sum_axis(Axis(1))
}

impl<P: Precision> Efficiencies<P> {
    /// Weight squared field magnitudes by the longitudinal wavenumbers.
    pub fn from_fields(
        fields: &FieldAmplitudes<P>,
        basis: &HarmonicBasis<P>,
        media: &HalfSpaces<P>,
        k_inc_z: C<P>,
    ) -> Result<Self, RcwaError> {
        let incident = (k_inc_z / media.ur1).re;
        if !(incident > P::Real::zero()) {
            return Err(RcwaError::InvalidConfiguration(format!(
                "incident wave carries no power into the device (Re(kz/ur1) = {incident})"
            )));
        }

        let weight = |kz: &Array1<C<P>>, ur: C<P>| kz.mapv(|k| (k / ur).re / incident);
        let reflectance = weight(basis.kz_ref(), media.ur1) * power_per_order::<P>(&fields.reflected);
        let transmittance = weight(basis.kz_trn(), media.ur2) * power_per_order::<P>(&fields.transmitted);

        Ok(Self {
            reflectance,
            transmittance,
        })
    }

    pub fn total_reflectance(&self) -> P::Real {
        self.reflectance.sum()
    }

    pub fn total_transmittance(&self) -> P::Real {
        self.transmittance.sum()
    }

    pub fn total(&self) -> P::Real {
        self.total_reflectance() + self.total_transmittance()
    }

    /// Scale both sequences so that their totals add to one.
    pub fn renormalize(&mut self) -> Result<(), RcwaError> {
        let total = self.total();
        if !(total.is_finite() && Float::abs(total) > P::Real::epsilon()) {
            return Err(RcwaError::DivergentResult {
                total: P::to_f64(total),
            });
        }
        self.reflectance.mapv_inplace(|v| v / total);
        self.transmittance.mapv_inplace(|v| v / total);
        Ok(())
    }
}
