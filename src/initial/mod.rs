//! Seeded random initial conditions.
//!
//! Streamfunction and moisture start as complex Gaussian noise on the
//! largest scales: the first and last `k_range` rows (positive and negative
//! y-wavenumbers) and the first `l_range` columns. The (0,0) entry of the
//! streamfunction is zero; that of moisture is `moisture·nx·ny`, so the
//! initial mean moisture per grid point equals the configured value.
//! Moisture is then scaled by the latent heating efficiency.
//!
//! The same seed always produces the same state.

use ndarray::{ArrayViewMut2, s};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use rustfft::num_complex::Complex64;
use tracing::debug;

use crate::config::InitialConfig;
use crate::grid::GridSpec;
use crate::physics::PhysicalParameters;
use crate::solver::ModelState;
use crate::spectral::LayeredField;

/// Build a seeded initial state with PV consistent with its streamfunction.
pub fn initial_state(
    config: &InitialConfig,
    params: &PhysicalParameters,
    grid: &GridSpec,
) -> ModelState {
    let (nl, nk) = grid.spectral_shape();
    let rows = config.k_range.min(nl / 2);
    let cols = config.l_range.min(nk);
    debug!(seed = config.seed, noise = config.noise, rows, cols, "seeding initial state");

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut psi = LayeredField::zeros((params.layers(), nl, nk));
    for layer in psi.outer_iter_mut() {
        seed_noise(layer, &mut rng, config.noise, rows, cols);
    }

    let moisture = params.layout.has_moisture().then(|| {
        let latent = params.latent_heating();
        let mut moisture = LayeredField::zeros((params.layout.moist_count(), nl, nk));
        for mut field in moisture.outer_iter_mut() {
            seed_noise(field.view_mut(), &mut rng, config.noise, rows, cols);
            field[[0, 0]] = Complex64::new(config.moisture * grid.sample_count(), 0.0);
            field.mapv_inplace(|c| c * latent);
        }
        moisture
    });

    ModelState::from_streamfunction(psi, moisture, params, grid)
}

/// Fill the low-wavenumber corners of `field` with complex Gaussian noise
/// and zero its (0,0) entry.
fn seed_noise(
    mut field: ArrayViewMut2<'_, Complex64>,
    rng: &mut ChaCha8Rng,
    noise: f64,
    rows: usize,
    cols: usize,
) {
    if noise == 0.0 {
        return;
    }
    let nl = field.nrows();
    let mut fill = |mut block: ArrayViewMut2<'_, Complex64>| {
        for value in block.iter_mut() {
            let re: f64 = rng.sample(StandardNormal);
            let im: f64 = rng.sample(StandardNormal);
            *value = Complex64::new(re * noise, im * noise);
        }
    };
    fill(field.slice_mut(s![..rows, ..cols]));
    fill(field.slice_mut(s![nl - rows.., ..cols]));
    field[[0, 0]] = Complex64::new(0.0, 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;

    fn build(config: &ModelConfig) -> (PhysicalParameters, GridSpec) {
        let grid = GridSpec::from_config(&config.grid).unwrap();
        let params = PhysicalParameters::from_config(config, &grid).unwrap();
        (params, grid)
    }

    #[test]
    fn test_same_seed_same_state() {
        let config = ModelConfig::default().with_grid(16, 16).with_noise(0.01, 7);
        let (params, grid) = build(&config);
        let a = initial_state(&config.initial, &params, &grid);
        let b = initial_state(&config.initial, &params, &grid);
        assert_eq!(a, b);

        let other = ModelConfig::default().with_grid(16, 16).with_noise(0.01, 8);
        let c = initial_state(&other.initial, &params, &grid);
        assert_ne!(a.psi, c.psi);
    }

    #[test]
    fn test_noise_confined_to_low_wavenumbers() {
        let mut config = ModelConfig::default().with_grid(16, 16);
        config.initial.k_range = 2;
        config.initial.l_range = 3;
        let (params, grid) = build(&config);
        let state = initial_state(&config.initial, &params, &grid);
        let (_, nl, nk) = state.psi.dim();
        for layer in 0..2 {
            assert_eq!(state.psi[[layer, 0, 0]], Complex64::new(0.0, 0.0));
            for i in 0..nl {
                for j in 0..nk {
                    let seeded = (i < 2 || i >= nl - 2) && j < 3;
                    if !seeded {
                        assert_eq!(state.psi[[layer, i, j]], Complex64::new(0.0, 0.0));
                    }
                }
            }
            assert!(state.psi[[layer, 1, 1]].norm() > 0.0);
            assert!(state.psi[[layer, nl - 1, 2]].norm() > 0.0);
        }
    }

    #[test]
    fn test_moisture_mean_scaled_by_latent_heating() {
        let mut config = ModelConfig::default().with_grid(8, 8);
        config.initial.moisture = 0.5;
        let (params, grid) = build(&config);
        let state = initial_state(&config.initial, &params, &grid);
        let expected = 0.5 * 64.0 * params.latent_heating();
        assert!((state.mean_moisture().unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_zero_noise_is_quiescent() {
        let config = ModelConfig::default()
            .with_grid(32, 32)
            .with_moisture(vec![false, false])
            .with_noise(0.0, 1);
        let (params, grid) = build(&config);
        let state = initial_state(&config.initial, &params, &grid);
        assert!(state.psi.iter().all(|c| *c == Complex64::new(0.0, 0.0)));
        assert!(state.pv.iter().all(|c| *c == Complex64::new(0.0, 0.0)));
        assert!(state.moisture.is_none());
    }

    #[test]
    fn test_ranges_clamped_to_grid() {
        let config = ModelConfig::default().with_grid(8, 8);
        let (params, grid) = build(&config);
        // Default 16x16 ranges exceed an 8x8 grid.
        let state = initial_state(&config.initial, &params, &grid);
        assert_eq!(state.psi.dim(), (2, 8, 5));
    }
}
