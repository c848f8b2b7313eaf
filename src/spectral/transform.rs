//! Real-to-half-complex 2D Fourier transform.
//!
//! Forward transforms are unnormalized and inverse transforms divide by the
//! sample count, so the (0,0) coefficient equals the domain mean times
//! `nx·ny`. The 2D transform is separable: a complex FFT along x on each row
//! (keeping the `nx/2 + 1` non-negative frequencies), then a complex FFT along
//! y on each retained column.

use std::sync::Arc;

use ndarray::Array2;
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use super::{PhysicalField, SpectralField};

/// Forward/inverse real↔half-complex transform at a fixed grid size.
pub trait SpectralTransform {
    /// Physical shape `(ny, nx)`.
    fn physical_shape(&self) -> (usize, usize);

    /// Spectral shape `(ny, nx/2 + 1)`.
    fn spectral_shape(&self) -> (usize, usize) {
        let (ny, nx) = self.physical_shape();
        (ny, nx / 2 + 1)
    }

    /// Real physical field to half spectrum.
    fn forward(&self, physical: &PhysicalField) -> SpectralField;

    /// Half spectrum to real physical field; exact inverse of [`forward`](Self::forward).
    fn inverse(&self, spectral: &SpectralField) -> PhysicalField;
}

/// [`SpectralTransform`] backed by `rustfft` plans.
#[derive(Clone)]
pub struct RealFft2d {
    nx: usize,
    ny: usize,
    x_forward: Arc<dyn Fft<f64>>,
    x_inverse: Arc<dyn Fft<f64>>,
    y_forward: Arc<dyn Fft<f64>>,
    y_inverse: Arc<dyn Fft<f64>>,
}

impl RealFft2d {
    /// Plan transforms for an `ny × nx` physical grid.
    pub fn new(nx: usize, ny: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            nx,
            ny,
            x_forward: planner.plan_fft_forward(nx),
            x_inverse: planner.plan_fft_inverse(nx),
            y_forward: planner.plan_fft_forward(ny),
            y_inverse: planner.plan_fft_inverse(ny),
        }
    }

    fn nk(&self) -> usize {
        self.nx / 2 + 1
    }
}

impl std::fmt::Debug for RealFft2d {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealFft2d")
            .field("nx", &self.nx)
            .field("ny", &self.ny)
            .finish()
    }
}

impl SpectralTransform for RealFft2d {
    fn physical_shape(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    fn forward(&self, physical: &PhysicalField) -> SpectralField {
        debug_assert_eq!(physical.dim(), (self.ny, self.nx));
        let nk = self.nk();
        let mut out = Array2::zeros((self.ny, nk));

        let mut row = vec![Complex64::new(0.0, 0.0); self.nx];
        for (iy, values) in physical.rows().into_iter().enumerate() {
            for (c, &v) in row.iter_mut().zip(values.iter()) {
                *c = Complex64::new(v, 0.0);
            }
            self.x_forward.process(&mut row);
            for (j, &c) in row.iter().take(nk).enumerate() {
                out[[iy, j]] = c;
            }
        }

        let mut col = vec![Complex64::new(0.0, 0.0); self.ny];
        for j in 0..nk {
            for (iy, c) in col.iter_mut().enumerate() {
                *c = out[[iy, j]];
            }
            self.y_forward.process(&mut col);
            for (iy, &c) in col.iter().enumerate() {
                out[[iy, j]] = c;
            }
        }

        out
    }

    fn inverse(&self, spectral: &SpectralField) -> PhysicalField {
        debug_assert_eq!(spectral.dim(), (self.ny, self.nk()));
        let nk = self.nk();
        let mut work = spectral.clone();

        let mut col = vec![Complex64::new(0.0, 0.0); self.ny];
        for j in 0..nk {
            for (iy, c) in col.iter_mut().enumerate() {
                *c = work[[iy, j]];
            }
            self.y_inverse.process(&mut col);
            for (iy, &c) in col.iter().enumerate() {
                work[[iy, j]] = c;
            }
        }

        // Each row is now the x-spectrum of a real row: rebuild the negative
        // frequencies by Hermitian symmetry and keep the real part.
        let scale = 1.0 / (self.nx * self.ny) as f64;
        let mut out = Array2::zeros((self.ny, self.nx));
        let mut row = vec![Complex64::new(0.0, 0.0); self.nx];
        for iy in 0..self.ny {
            for j in 0..nk {
                row[j] = work[[iy, j]];
            }
            for j in nk..self.nx {
                row[j] = work[[iy, self.nx - j]].conj();
            }
            self.x_inverse.process(&mut row);
            for (ix, c) in row.iter().enumerate() {
                out[[iy, ix]] = c.re * scale;
            }
        }

        out
    }
}
