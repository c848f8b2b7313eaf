//! Convective precipitation by relaxation of supersaturation.
//!
//! The moisture surplus over the condensation threshold is
//!
//! ```text
//! S = M − CC·(ψ0 − ψ1)
//! ```
//!
//! evaluated in physical space and relaxed at rate `1/τ` where positive:
//! `P = max(S, 0)/τ`. The domain-mean part of `P` is a moisture sink
//! balanced by evaporation and is returned separately from the eddy
//! spectrum that drives the PV tendencies.

use ndarray::s;
use rustfft::num_complex::Complex64;

use crate::physics::MoistParameters;
use crate::spectral::{LayeredField, PhysicalField, SpectralField, SpectralOperators};

/// Precipitation in physical and spectral space.
#[derive(Clone, Debug, PartialEq)]
pub struct Precipitation {
    /// Precipitation rate on the native physical grid
    pub field: PhysicalField,
    /// Spectrum of `field` with the (0,0) entry removed
    pub spectrum: SpectralField,
    /// (0,0) coefficient of the spectrum before removal
    pub mean: f64,
}

/// Moisture surplus spectrum over the condensation threshold.
///
/// The (0,0) entry additionally carries `CC·M(0,0)`, which raises the mean
/// surplus above the eddy threshold.
pub fn moisture_surplus(
    moisture: &SpectralField,
    psi: &LayeredField,
    condensation: f64,
) -> SpectralField {
    let baroclinic = &psi.slice(s![0, .., ..]) - &psi.slice(s![1, .., ..]);
    let mut surplus = moisture - &baroclinic.mapv(|c| c * condensation);
    surplus[[0, 0]] += moisture[[0, 0]] * condensation;
    surplus
}

/// Relax the moisture surplus of the first moist layer into precipitation.
///
/// With zero latent heating the precipitation is identically zero.
pub fn precipitation_relaxation(
    moisture: &SpectralField,
    psi: &LayeredField,
    moist: &MoistParameters,
    ops: &SpectralOperators,
) -> Precipitation {
    let surplus = ops.to_physical(&moisture_surplus(moisture, psi, moist.condensation));

    let field = if moist.latent_heating == 0.0 {
        PhysicalField::zeros(surplus.dim())
    } else {
        let rate = 1.0 / moist.relaxation_time;
        surplus.mapv(|v| v.max(0.0) * rate)
    };

    let mut spectrum = ops.to_spectral(&field);
    let mean = spectrum[[0, 0]].re;
    spectrum[[0, 0]] = Complex64::new(0.0, 0.0);

    Precipitation {
        field,
        spectrum,
        mean,
    }
}
