//! Property tests for the spectral operators and precipitation.

use std::f64::consts::PI;

use mqg_rs::config::ModelConfig;
use mqg_rs::grid::GridSpec;
use mqg_rs::physics::PhysicalParameters;
use mqg_rs::solver::precipitation_relaxation;
use mqg_rs::spectral::{
    LayeredField, PhysicalField, RealFft2d, SpectralField, SpectralOperators, SpectralTransform,
    laplacian, x_derivative, y_derivative,
};
use ndarray::Array2;
use proptest::prelude::*;
use rustfft::num_complex::Complex64;

const N: usize = 8;
const NK: usize = N / 2 + 1;

fn grid() -> GridSpec {
    GridSpec::new(N, N, [2.0 * PI, 2.0 * PI]).unwrap()
}

fn arb_spectrum() -> impl Strategy<Value = SpectralField> {
    prop::collection::vec((-1.0f64..1.0, -1.0f64..1.0), N * NK).prop_map(|v| {
        Array2::from_shape_vec((N, NK), v.into_iter().map(|(re, im)| Complex64::new(re, im)).collect())
            .unwrap()
    })
}

fn arb_physical(nx: usize, ny: usize) -> impl Strategy<Value = PhysicalField> {
    prop::collection::vec(-10.0f64..10.0, nx * ny)
        .prop_map(move |v| Array2::from_shape_vec((ny, nx), v).unwrap())
}

fn max_diff(a: &SpectralField, b: &SpectralField) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).norm()).fold(0.0, f64::max)
}

proptest! {
    #[test]
    fn derivatives_are_linear(
        f in arb_spectrum(),
        g in arb_spectrum(),
        a in -5.0f64..5.0,
        b in -5.0f64..5.0,
    ) {
        let grid = grid();
        let combo = &f.mapv(|c| c * a) + &g.mapv(|c| c * b);
        for op in [x_derivative, y_derivative, laplacian] {
            let lhs = op(&combo, &grid);
            let rhs = &op(&f, &grid).mapv(|c| c * a) + &op(&g, &grid).mapv(|c| c * b);
            prop_assert!(max_diff(&lhs, &rhs) < 1e-10);
        }
    }

    #[test]
    fn self_bracket_vanishes(f in arb_spectrum()) {
        let ops = SpectralOperators::new(grid());
        let j = ops.jacobian(&f, &f);
        prop_assert!(j.iter().all(|c| c.norm() < 1e-12));
    }

    #[test]
    fn zero_wavenumber_is_real_after_operators(f in arb_spectrum(), g in arb_spectrum()) {
        let grid = grid();
        prop_assert_eq!(x_derivative(&f, &grid)[[0, 0]].im, 0.0);
        prop_assert_eq!(y_derivative(&f, &grid)[[0, 0]].im, 0.0);
        prop_assert_eq!(laplacian(&f, &grid)[[0, 0]].im, 0.0);

        let ops = SpectralOperators::new(grid);
        prop_assert_eq!(ops.jacobian(&f, &g)[[0, 0]].im, 0.0);
        let (a, b) = ops.double_jacobian(&f, &g, &f);
        prop_assert_eq!(a[[0, 0]].im, 0.0);
        prop_assert_eq!(b[[0, 0]].im, 0.0);
    }

    #[test]
    fn transform_roundtrip_native_and_padded(
        native in arb_physical(N, N),
        padded in arb_physical(3 * N / 2, 3 * N / 2),
    ) {
        for field in [native, padded] {
            let (ny, nx) = field.dim();
            let fft = RealFft2d::new(nx, ny);
            let back = fft.inverse(&fft.forward(&field));
            for (a, b) in field.iter().zip(back.iter()) {
                prop_assert!((a - b).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn precipitation_is_nonnegative(
        moisture in arb_spectrum(),
        upper in arb_spectrum(),
        lower in arb_spectrum(),
        latent in 0.0f64..0.9,
        condensation in 0.0f64..5.0,
        tau in 0.01f64..2.0,
        mean in -2.0f64..2.0,
    ) {
        let mut config = ModelConfig::default().with_grid(N, N);
        config.moist.latent_heating = latent;
        config.moist.condensation = condensation;
        config.moist.relaxation_time = tau;
        let grid = grid();
        let params = PhysicalParameters::from_config(&config, &grid).unwrap();
        let moist = params.moist.unwrap();
        let ops = SpectralOperators::new(grid);

        let mut moisture = moisture;
        moisture[[0, 0]] = Complex64::new(mean * (N * N) as f64, 0.0);
        let mut psi = LayeredField::zeros((2, N, NK));
        psi.index_axis_mut(ndarray::Axis(0), 0).assign(&upper);
        psi.index_axis_mut(ndarray::Axis(0), 1).assign(&lower);

        let precip = precipitation_relaxation(&moisture, &psi, &moist, &ops);
        prop_assert!(precip.field.iter().all(|&p| p >= 0.0));
        prop_assert!(precip.mean >= -1e-9);
        prop_assert_eq!(precip.spectrum[[0, 0]], Complex64::new(0.0, 0.0));
    }
}
