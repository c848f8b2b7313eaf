//! Nonlinear right-hand side of the PV equations.
//!
//! Two tendency kinds exist, chosen once when the engine is built:
//! - [`TendencyKind::NonstiffPv`]: advection of PV by the layer flow only
//! - [`TendencyKind::PrecipitationRelaxation`]: advection plus latent heat
//!   release from convective precipitation
//!
//! Dry layers are advected with a single dealiased Jacobian. A moist layer
//! advects both its dry and moist PV with the same streamfunction, so the
//! padded velocity is shared through the double Jacobian.

use ndarray::s;
use tracing::info;

use super::precipitation::{Precipitation, precipitation_relaxation};
use super::state::ModelState;
use crate::physics::PhysicalParameters;
use crate::spectral::{LayeredField, SpectralOperators};

/// Which right-hand side the engine evaluates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TendencyKind {
    /// Jacobian advection only
    NonstiffPv,
    /// Jacobian advection with precipitation heating
    PrecipitationRelaxation,
}

impl TendencyKind {
    /// Precipitation relaxation when rain is enabled, plain advection otherwise.
    pub fn select(params: &PhysicalParameters) -> Self {
        if params.rain && params.moist.is_some() {
            Self::PrecipitationRelaxation
        } else {
            Self::NonstiffPv
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NonstiffPv => "nonstiff-pv",
            Self::PrecipitationRelaxation => "precipitation-relaxation",
        }
    }
}

/// Result of one tendency evaluation.
#[derive(Clone, Debug)]
pub struct TendencyOutput {
    /// Tendency per PV slot
    pub tendency: LayeredField,
    /// Precipitation, when the kind computes it
    pub precipitation: Option<Precipitation>,
}

/// Evaluates PV tendencies for a fixed parameter set and grid.
#[derive(Clone, Debug)]
pub struct TendencyEngine {
    params: PhysicalParameters,
    ops: SpectralOperators,
    kind: TendencyKind,
}

impl TendencyEngine {
    pub fn new(params: PhysicalParameters, ops: SpectralOperators) -> Self {
        let kind = TendencyKind::select(&params);
        info!(kind = kind.name(), "tendency selected");
        Self { params, ops, kind }
    }

    pub fn kind(&self) -> TendencyKind {
        self.kind
    }

    pub fn params(&self) -> &PhysicalParameters {
        &self.params
    }

    pub fn operators(&self) -> &SpectralOperators {
        &self.ops
    }

    /// Tendency of every PV slot for the given state.
    pub fn compute(&self, state: &ModelState) -> TendencyOutput {
        let mut tendency = nonstiff_pv_tendency(state, &self.params, &self.ops);

        let precipitation = match (self.kind, &self.params.moist, &state.moisture) {
            (TendencyKind::PrecipitationRelaxation, Some(moist), Some(moisture)) => {
                let moisture = moisture.slice(s![0, .., ..]).to_owned();
                let precip = precipitation_relaxation(&moisture, &state.psi, moist, &self.ops);
                // Only the single moist layer paired with two dry layers is handled.
                let mut upper = tendency.slice_mut(s![0, .., ..]);
                upper -= &precip.spectrum;
                let mut lower = tendency.slice_mut(s![1, .., ..]);
                lower += &precip.spectrum;
                Some(precip)
            }
            _ => None,
        };

        TendencyOutput {
            tendency,
            precipitation,
        }
    }
}

/// Negative dealiased Jacobian advection of every PV slot.
pub fn nonstiff_pv_tendency(
    state: &ModelState,
    params: &PhysicalParameters,
    ops: &SpectralOperators,
) -> LayeredField {
    let layout = &params.layout;
    let mut tendency = LayeredField::zeros(state.pv.dim());

    for (layer, _, slot) in layout.moist_pairs() {
        let psi = state.psi.slice(s![layer, .., ..]).to_owned();
        let dry_pv = state.pv.slice(s![layer, .., ..]).to_owned();
        let moist_pv = state.pv.slice(s![slot, .., ..]).to_owned();
        let (dry, moist) = ops.double_jacobian(&psi, &dry_pv, &moist_pv);
        tendency.slice_mut(s![layer, .., ..]).assign(&dry.mapv(|c| -c));
        tendency.slice_mut(s![slot, .., ..]).assign(&moist.mapv(|c| -c));
    }

    for &layer in &layout.dry_indices {
        let psi = state.psi.slice(s![layer, .., ..]).to_owned();
        let pv = state.pv.slice(s![layer, .., ..]).to_owned();
        let advection = ops.jacobian(&psi, &pv);
        tendency.slice_mut(s![layer, .., ..]).assign(&advection.mapv(|c| -c));
    }

    tendency
}
