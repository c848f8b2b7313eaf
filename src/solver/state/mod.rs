//! Evolving model state.
//!
//! - [`ModelState`]: streamfunction, PV, moisture, precipitation and the
//!   tendency history
//! - [`TendencyHistory`]: the three-level multistep history
//!
//! PV of the two dry layers and of the moist slot is built from
//! streamfunction `ψ` and moisture `M`:
//!
//! ```text
//! q0 = ∇²ψ0 − F0(ψ0 − ψ1)
//! q1 = ∇²ψ1 + F1(ψ0 − ψ1)
//! qm = ∇²ψ1 + (F1(ψ0 − ψ1) + M)/(1 − L)
//! ```

mod history;

pub use history::TendencyHistory;

use ndarray::{Zip, s};

use crate::grid::GridSpec;
use crate::physics::PhysicalParameters;
use crate::spectral::{
    LayeredField, PhysicalField, SpectralField, SpectralOperators, laplacian, x_derivative,
    y_derivative,
};

/// Streamfunction, PV, moisture and tendency history of one model run.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelState {
    /// Streamfunction per dry layer, `(layers, nl, nk)`
    pub psi: LayeredField,
    /// PV per slot, `(total_layers, nl, nk)`
    pub pv: LayeredField,
    /// Moisture per moist layer; `None` when no layer is moist
    pub moisture: Option<LayeredField>,
    /// Precipitation on the physical grid; `None` until computed or without rain
    pub precip: Option<PhysicalField>,
    /// (0,0) coefficient of the precipitation field
    pub mean_precip: f64,
    /// Multistep tendency history
    pub history: TendencyHistory,
}

impl ModelState {
    /// Quiescent state: every field zero.
    pub fn zeros(params: &PhysicalParameters, grid: &GridSpec) -> Self {
        let (nl, nk) = grid.spectral_shape();
        let layout = &params.layout;
        Self {
            psi: LayeredField::zeros((layout.layers, nl, nk)),
            pv: LayeredField::zeros((layout.total_layers(), nl, nk)),
            moisture: layout
                .has_moisture()
                .then(|| LayeredField::zeros((layout.moist_count(), nl, nk))),
            precip: None,
            mean_precip: 0.0,
            history: TendencyHistory::zeros((layout.total_layers(), nl, nk)),
        }
    }

    /// State with the given streamfunction and moisture, PV derived from them.
    pub fn from_streamfunction(
        psi: LayeredField,
        moisture: Option<LayeredField>,
        params: &PhysicalParameters,
        grid: &GridSpec,
    ) -> Self {
        let pv = potential_vorticity(&psi, moisture.as_ref(), params, grid);
        let mut state = Self::zeros(params, grid);
        state.psi = psi;
        state.pv = pv;
        if state.moisture.is_some() {
            state.moisture = moisture;
        }
        state
    }

    /// Zonal velocity `u = −∂yψ` and meridional velocity `v = ∂xψ` per dry layer.
    pub fn velocity(&self, grid: &GridSpec) -> (LayeredField, LayeredField) {
        let mut u = LayeredField::zeros(self.psi.dim());
        let mut v = LayeredField::zeros(self.psi.dim());
        for (layer, psi) in self.psi.outer_iter().enumerate() {
            let psi = psi.to_owned();
            u.slice_mut(s![layer, .., ..])
                .assign(&y_derivative(&psi, grid).mapv(|c| -c));
            v.slice_mut(s![layer, .., ..]).assign(&x_derivative(&psi, grid));
        }
        (u, v)
    }

    /// Maximum `sqrt(u² + v²)` over layers and physical grid points.
    pub fn peak_velocity(&self, ops: &SpectralOperators) -> f64 {
        let (u, v) = self.velocity(&ops.grid);
        let mut peak: f64 = 0.0;
        for (u_layer, v_layer) in u.outer_iter().zip(v.outer_iter()) {
            let u_phys = ops.to_physical(&u_layer.to_owned());
            let v_phys = ops.to_physical(&v_layer.to_owned());
            Zip::from(&u_phys).and(&v_phys).for_each(|&a, &b| {
                peak = peak.max(a.hypot(b));
            });
        }
        peak
    }

    /// (0,0) coefficient of the first moisture field.
    pub fn mean_moisture(&self) -> Option<f64> {
        self.moisture.as_ref().map(|m| m[[0, 0, 0]].re)
    }

    /// Baroclinic streamfunction `ψ0 − ψ1`.
    pub fn baroclinic_streamfunction(&self) -> SpectralField {
        &self.psi.slice(s![0, .., ..]) - &self.psi.slice(s![1, .., ..])
    }
}

/// PV of every slot from two-layer streamfunction and moisture.
///
/// Moist slots read the moisture field of their layer; with no moisture
/// provided they are built as if `M = 0`.
pub fn potential_vorticity(
    psi: &LayeredField,
    moisture: Option<&LayeredField>,
    params: &PhysicalParameters,
    grid: &GridSpec,
) -> LayeredField {
    let (_, nl, nk) = psi.dim();
    let layout = &params.layout;
    let dry = &params.dry;
    let latent = params.latent_heating();

    let psi0 = psi.slice(s![0, .., ..]).to_owned();
    let psi1 = psi.slice(s![1, .., ..]).to_owned();
    let baroclinic = &psi0 - &psi1;
    let laplace0 = laplacian(&psi0, grid);
    let laplace1 = laplacian(&psi1, grid);

    let mut pv = LayeredField::zeros((layout.total_layers(), nl, nk));
    pv.slice_mut(s![0, .., ..])
        .assign(&(&laplace0 - &baroclinic.mapv(|c| c * dry.f(0))));
    pv.slice_mut(s![1, .., ..])
        .assign(&(&laplace1 + &baroclinic.mapv(|c| c * dry.f(1))));

    for (layer, n, slot) in layout.moist_pairs() {
        let mut coupling = baroclinic.mapv(|c| c * dry.f(layer));
        if let Some(m) = moisture {
            coupling += &m.slice(s![n, .., ..]);
        }
        let moist_pv = &laplace1 + &coupling.mapv(|c| c / (1.0 - latent));
        pv.slice_mut(s![slot, .., ..]).assign(&moist_pv);
    }

    pv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use rustfft::num_complex::Complex64;

    fn setup(moisture: Vec<bool>) -> (PhysicalParameters, SpectralOperators) {
        let config = ModelConfig::default().with_grid(8, 8).with_moisture(moisture);
        let grid = GridSpec::from_config(&config.grid).unwrap();
        let params = PhysicalParameters::from_config(&config, &grid).unwrap();
        (params, SpectralOperators::new(grid))
    }

    #[test]
    fn test_zero_state_shapes() {
        let (params, ops) = setup(vec![false, true]);
        let state = ModelState::zeros(&params, &ops.grid);
        assert_eq!(state.psi.dim(), (2, 8, 5));
        assert_eq!(state.pv.dim(), (3, 8, 5));
        assert_eq!(state.moisture.as_ref().unwrap().dim(), (1, 8, 5));
        assert_eq!(state.history.current.dim(), (3, 8, 5));
    }

    #[test]
    fn test_dry_state_has_no_moisture() {
        let (params, ops) = setup(vec![false, false]);
        let state = ModelState::zeros(&params, &ops.grid);
        assert!(state.moisture.is_none());
        assert_eq!(state.pv.dim(), (2, 8, 5));
        assert_eq!(state.mean_moisture(), None);
    }

    #[test]
    fn test_pv_matches_inversion_matrix() {
        let (params, ops) = setup(vec![false, false]);
        let grid = &ops.grid;
        let mut psi = LayeredField::zeros((2, 8, 5));
        psi[[0, 2, 1]] = Complex64::new(1.0, 0.5);
        psi[[1, 2, 1]] = Complex64::new(-0.25, 0.0);
        let pv = potential_vorticity(&psi, None, &params, grid);

        let a = crate::operators::pv_matrix(grid.k_squared(2, 1), params.dry.f(0), params.dry.f(1));
        for r in 0..2 {
            let expected = psi[[0, 2, 1]] * a[(r, 0)] + psi[[1, 2, 1]] * a[(r, 1)];
            assert!((pv[[r, 2, 1]] - expected).norm() < 1e-9);
        }
    }

    #[test]
    fn test_moist_pv_without_latent_heating_tracks_moisture() {
        let config = ModelConfig::default().with_grid(8, 8);
        let mut config = config;
        config.moist.latent_heating = 0.0;
        let grid = GridSpec::from_config(&config.grid).unwrap();
        let params = PhysicalParameters::from_config(&config, &grid).unwrap();

        let mut psi = LayeredField::zeros((2, 8, 5));
        psi[[0, 1, 2]] = Complex64::new(0.3, 0.1);
        let mut moisture = LayeredField::zeros((1, 8, 5));
        moisture[[0, 1, 2]] = Complex64::new(2.0, 0.0);
        let pv = potential_vorticity(&psi, Some(&moisture), &params, &grid);
        // With L = 0 the moist PV is the lower-layer PV plus moisture.
        assert!((pv[[2, 1, 2]] - pv[[1, 1, 2]] - Complex64::new(2.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_velocity_of_zonal_jet() {
        // ψ = −sin(y) ⇒ u = cos(y), v = 0
        let (params, ops) = setup(vec![false, false]);
        let grid = &ops.grid;
        let field = ndarray::Array2::from_shape_fn((grid.ny, grid.nx), |(iy, _)| {
            -(iy as f64 * grid.length[1] / grid.ny as f64).sin()
        });
        let mut psi = LayeredField::zeros((2, 8, 5));
        psi.slice_mut(s![0, .., ..]).assign(&ops.to_spectral(&field));
        let state = ModelState::from_streamfunction(psi, None, &params, grid);
        assert!((state.peak_velocity(&ops) - 1.0).abs() < 1e-10);
    }
}
