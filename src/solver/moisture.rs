//! Diagnostic moisture update.
//!
//! Moisture is not integrated on its own. Its eddy part is recovered from
//! the moist and dry PV of the lower layer,
//!
//! ```text
//! M = (1 − L)(q_m − q_1) − L·F1·(ψ0 − ψ1)
//! ```
//!
//! while its mean follows `dM/dt = E − P̄`.

use ndarray::s;
use rustfft::num_complex::Complex64;

use super::state::ModelState;
use crate::physics::PhysicalParameters;

/// Re-derive moisture from PV and advance its mean by one step.
///
/// Does nothing for a dry model. Uses `state.mean_precip` from the most
/// recent tendency evaluation.
pub fn update_moisture(state: &mut ModelState, params: &PhysicalParameters, dt: f64) {
    let (Some(moist), Some(moisture)) = (&params.moist, state.moisture.as_mut()) else {
        return;
    };
    let latent = moist.latent_heating;

    for (layer, n, slot) in params.layout.moist_pairs() {
        let mean = moisture[[n, 0, 0]] + (moist.evaporation - state.mean_precip) * dt;
        let baroclinic = &state.psi.slice(s![0, .., ..]) - &state.psi.slice(s![1, .., ..]);
        let anomaly = &state.pv.slice(s![slot, .., ..]) - &state.pv.slice(s![layer, .., ..]);
        let coupling = latent * params.dry.f(layer);

        let mut field = moisture.slice_mut(s![n, .., ..]);
        field.assign(&(anomaly.mapv(|q| q * (1.0 - latent)) - baroclinic.mapv(|p| p * coupling)));
        field[[0, 0]] = Complex64::new(mean.re, 0.0);
    }
}
