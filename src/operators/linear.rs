//! Per-wavenumber linear operator, propagator and dry inversion tables.
//!
//! For each wavenumber pair the linear part of the PV equations is a
//! `total_layers × total_layers` matrix `L` acting on `(q_0, q_1, q_moist)`.
//! With `ψ = P·(q_0, q_1)` the dry inversion:
//!
//! ```text
//! L[j, ·] = −i·kx·U_j·e_j + (r_j·K² − i·kx·Qy_j)·P[j, ·] − ν·K⁸·e_j
//! L[m, ·] = −i·kx·U_1·e_m + (r_1·K² − i·kx·γ)  ·P[1, ·] − ν·K⁸·e_m
//! ```
//!
//! where `Qy_j` is the background PV gradient of dry layer `j` and `m` is the
//! moist slot of the lower layer. The propagator is `exp(dt·L)`, the exact
//! one-step solution of the linear system.
//!
//! Wavenumber (0,0) is excluded: its propagator is the identity and its
//! inversion is zero. Mean values are held fixed by the integrator instead.

use std::ops::Range;
use std::time::Instant;

use nalgebra::DMatrix;
use ndarray::{Array2, Array4, Zip, s};
use rustfft::num_complex::Complex64;
use tracing::debug;

use super::inversion::inversion_matrix;
use crate::grid::GridSpec;
use crate::physics::PhysicalParameters;
use crate::spectral::LayeredField;

/// Assembles [`LinearOperatorTable`]s.
#[derive(Clone, Debug)]
pub struct LinearOperatorBuilder<'a> {
    params: &'a PhysicalParameters,
    grid: &'a GridSpec,
    dt: f64,
}

impl<'a> LinearOperatorBuilder<'a> {
    /// Create a builder for timestep `dt`.
    pub fn new(params: &'a PhysicalParameters, grid: &'a GridSpec, dt: f64) -> Self {
        Self { params, grid, dt }
    }

    /// Linear operator matrix `L` at spectral index `(i, j)`.
    ///
    /// Returns the zero matrix at (0,0).
    pub fn operator_at(&self, i: usize, j: usize) -> DMatrix<Complex64> {
        let total = self.params.total_layers();
        let layers = self.params.layers();
        let mut l = DMatrix::<Complex64>::zeros(total, total);
        if i == 0 && j == 0 {
            return l;
        }

        let dry = &self.params.dry;
        let kx = self.grid.kx[j];
        let k2 = self.grid.k_squared(i, j);
        let hyper = -dry.nu * k2.powi(4);
        let inv = inversion_matrix(k2, dry.f(0), dry.f(1));

        for layer in 0..layers {
            let drive = Complex64::new(
                dry.damping[layer] * k2,
                -kx * dry.background_pv_gradient(layer),
            );
            for c in 0..layers {
                l[(layer, c)] += drive * inv[(layer, c)];
            }
            l[(layer, layer)] += Complex64::new(hyper, -kx * dry.mean_velocity[layer]);
        }

        if let Some(moist) = &self.params.moist {
            for (layer, _, slot) in self.params.layout.moist_pairs() {
                let drive = Complex64::new(dry.damping[layer] * k2, -kx * moist.gamma);
                for c in 0..layers {
                    l[(slot, c)] += drive * inv[(layer, c)];
                }
                l[(slot, slot)] += Complex64::new(hyper, -kx * dry.mean_velocity[layer]);
            }
        }

        l
    }

    /// Build the operator, propagator and inversion tables for every wavenumber.
    pub fn build(&self) -> LinearOperatorTable {
        let start = Instant::now();
        let total = self.params.total_layers();
        let layers = self.params.layers();
        let (nl, nk) = self.grid.spectral_shape();
        let dry = &self.params.dry;

        let mut operator = Array4::zeros((total, total, nl, nk));
        let mut propagator = Array4::zeros((total, total, nl, nk));
        let mut inversion = Array4::zeros((layers, layers, nl, nk));

        for i in 0..nl {
            for j in 0..nk {
                let l = self.operator_at(i, j);
                let e = if i == 0 && j == 0 {
                    DMatrix::<Complex64>::identity(total, total)
                } else {
                    l.map(|v| v * self.dt).exp()
                };
                for r in 0..total {
                    for c in 0..total {
                        operator[[r, c, i, j]] = l[(r, c)];
                        propagator[[r, c, i, j]] = e[(r, c)];
                    }
                }

                if i == 0 && j == 0 {
                    continue;
                }
                let inv = inversion_matrix(self.grid.k_squared(i, j), dry.f(0), dry.f(1));
                for r in 0..layers {
                    for c in 0..layers {
                        inversion[[r, c, i, j]] = inv[(r, c)];
                    }
                }
            }
        }

        debug!(
            total_layers = total,
            wavenumbers = nl * nk,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built linear operator tables"
        );

        LinearOperatorTable {
            layers,
            total_layers: total,
            dt: self.dt,
            operator,
            propagator,
            inversion,
        }
    }
}

/// Read-only per-wavenumber operator tables, indexed `[row, col, ky, kx]`.
#[derive(Clone, Debug)]
pub struct LinearOperatorTable {
    /// Number of dry layers.
    pub layers: usize,
    /// Length of the PV state vector.
    pub total_layers: usize,
    /// Timestep the propagator was built for.
    pub dt: f64,
    /// Linear operator `L`.
    pub operator: Array4<Complex64>,
    /// One-step propagator `exp(dt·L)`.
    pub propagator: Array4<Complex64>,
    /// Dry PV → streamfunction inversion.
    pub inversion: Array4<f64>,
}

/// `out[r] = Σ_c m[r, c] · v[c]` over the given row/column slot ranges.
fn multiply_block(
    matrix: &Array4<Complex64>,
    rows: Range<usize>,
    cols: Range<usize>,
    input: &LayeredField,
    output: &mut LayeredField,
) {
    let (_, nl, nk) = input.dim();
    for r in rows {
        let mut acc = Array2::<Complex64>::zeros((nl, nk));
        for c in cols.clone() {
            Zip::from(&mut acc)
                .and(matrix.slice(s![r, c, .., ..]))
                .and(input.slice(s![c, .., ..]))
                .for_each(|a, &m, &v| *a += m * v);
        }
        output.slice_mut(s![r, .., ..]).assign(&acc);
    }
}

impl LinearOperatorTable {
    /// Apply the full propagator to a PV-shaped field.
    pub fn propagate(&self, field: &LayeredField) -> LayeredField {
        let mut out = LayeredField::zeros(field.dim());
        multiply_block(
            &self.propagator,
            0..self.total_layers,
            0..self.total_layers,
            field,
            &mut out,
        );
        out
    }

    /// Propagate a tendency vector: dry rows through the dry-only
    /// submatrix, moist rows through the full matrix.
    ///
    /// Dry rows of the linear operator have no moist columns, so this equals
    /// [`propagate`](Self::propagate).
    pub fn propagate_tendency(&self, field: &LayeredField) -> LayeredField {
        let mut out = LayeredField::zeros(field.dim());
        multiply_block(
            &self.propagator,
            0..self.layers,
            0..self.layers,
            field,
            &mut out,
        );
        multiply_block(
            &self.propagator,
            self.layers..self.total_layers,
            0..self.total_layers,
            field,
            &mut out,
        );
        out
    }

    /// Apply the linear operator `L` (no time integration).
    pub fn apply_operator(&self, field: &LayeredField) -> LayeredField {
        let mut out = LayeredField::zeros(field.dim());
        multiply_block(
            &self.operator,
            0..self.total_layers,
            0..self.total_layers,
            field,
            &mut out,
        );
        out
    }

    /// Invert dry-layer PV to streamfunction. The (0,0) entry is left zero.
    pub fn invert(&self, pv: &LayeredField) -> LayeredField {
        let (_, nl, nk) = pv.dim();
        let mut psi = LayeredField::zeros((self.layers, nl, nk));
        for r in 0..self.layers {
            let mut acc = Array2::<Complex64>::zeros((nl, nk));
            for c in 0..self.layers {
                Zip::from(&mut acc)
                    .and(self.inversion.slice(s![r, c, .., ..]))
                    .and(pv.slice(s![c, .., ..]))
                    .for_each(|a, &m, &v| *a += v * m);
            }
            psi.slice_mut(s![r, .., ..]).assign(&acc);
        }
        psi
    }

    /// Propagator matrix at spectral index `(i, j)`.
    pub fn propagator_at(&self, i: usize, j: usize) -> DMatrix<Complex64> {
        DMatrix::from_fn(self.total_layers, self.total_layers, |r, c| {
            self.propagator[[r, c, i, j]]
        })
    }

    /// Linear operator matrix at spectral index `(i, j)`.
    pub fn operator_at(&self, i: usize, j: usize) -> DMatrix<Complex64> {
        DMatrix::from_fn(self.total_layers, self.total_layers, |r, c| {
            self.operator[[r, c, i, j]]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;

    fn setup(moisture: Vec<bool>) -> (PhysicalParameters, GridSpec) {
        let config = ModelConfig::default().with_grid(8, 8).with_moisture(moisture);
        let grid = GridSpec::from_config(&config.grid).unwrap();
        let params = PhysicalParameters::from_config(&config, &grid).unwrap();
        (params, grid)
    }

    #[test]
    fn test_table_shapes() {
        let (params, grid) = setup(vec![false, true]);
        let table = LinearOperatorBuilder::new(&params, &grid, 0.01).build();
        assert_eq!(table.propagator.dim(), (3, 3, 8, 5));
        assert_eq!(table.inversion.dim(), (2, 2, 8, 5));
    }

    #[test]
    fn test_zero_mode_excluded() {
        let (params, grid) = setup(vec![false, true]);
        let table = LinearOperatorBuilder::new(&params, &grid, 0.01).build();
        let e = table.propagator_at(0, 0);
        for r in 0..3 {
            for c in 0..3 {
                let expected = if r == c { 1.0 } else { 0.0 };
                assert_eq!(e[(r, c)], Complex64::new(expected, 0.0));
            }
        }
        assert!(table.inversion.slice(s![.., .., 0, 0]).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_dry_rows_have_no_moist_columns() {
        let (params, grid) = setup(vec![false, true]);
        let builder = LinearOperatorBuilder::new(&params, &grid, 0.01);
        let l = builder.operator_at(2, 3);
        assert_eq!(l[(0, 2)], Complex64::new(0.0, 0.0));
        assert_eq!(l[(1, 2)], Complex64::new(0.0, 0.0));
        assert_ne!(l[(2, 1)], Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_zero_timestep_is_identity() {
        let (params, grid) = setup(vec![false, false]);
        let table = LinearOperatorBuilder::new(&params, &grid, 0.0).build();
        let e = table.propagator_at(3, 2);
        assert!((e[(0, 0)] - Complex64::new(1.0, 0.0)).norm() < 1e-14);
        assert!(e[(0, 1)].norm() < 1e-14);
    }

    #[test]
    fn test_propagate_tendency_matches_full() {
        let (params, grid) = setup(vec![false, true]);
        let table = LinearOperatorBuilder::new(&params, &grid, 0.01).build();
        let field = LayeredField::from_shape_fn((3, 8, 5), |(l, i, j)| {
            Complex64::new((l + i) as f64 * 0.1, j as f64 * 0.2 - 0.3)
        });
        let a = table.propagate(&field);
        let b = table.propagate_tendency(&field);
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).norm() < 1e-12);
        }
    }
}
