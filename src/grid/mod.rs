//! Half-spectrum wavenumber grid and 3/2-rule padding.
//!
//! Spectral fields are stored as `(rows, cols) = (ny, nx/2 + 1)`:
//! - rows hold every y-wavenumber in FFT order, negative frequencies wrapped
//!   to the tail (`0, 1, ..., ny/2 - 1, -ny/2, ..., -1`)
//! - columns hold the non-negative x-wavenumbers `0, ..., nx/2` produced by a
//!   real-to-complex transform
//!
//! Quadratic products are evaluated on a grid padded to `3/2` of the native
//! size, which removes the aliased modes of the product.

use ndarray::{Array2, s};
use rustfft::num_complex::Complex64;

use crate::config::{ConfigError, GridConfig};

/// Grid sizes, padded sizes and wavenumber arrays.
#[derive(Clone, Debug, PartialEq)]
pub struct GridSpec {
    /// Physical points in x.
    pub nx: usize,
    /// Physical points in y.
    pub ny: usize,
    /// Spectral rows (= ny).
    pub nl: usize,
    /// Spectral columns (= nx/2 + 1).
    pub nk: usize,
    /// Padded physical points in x.
    pub nx2: usize,
    /// Padded physical points in y.
    pub ny2: usize,
    /// Padded spectral rows (= ny2).
    pub nl2: usize,
    /// Padded spectral columns (= nx2/2 + 1).
    pub nk2: usize,
    /// Domain length `[Lx, Ly]`.
    pub length: [f64; 2],
    /// Number of leading (non-negative frequency) rows.
    pub mid: usize,
    /// Number of trailing (negative frequency) rows.
    pub mid2: usize,
    /// Padding rescale factor `(nx2/nx)·(ny2/ny)`.
    pub renorm: f64,
    /// x-wavenumber per column.
    pub kx: Vec<f64>,
    /// y-wavenumber per row.
    pub ky: Vec<f64>,
}

impl GridSpec {
    /// Build the grid for `nx × ny` physical points on a domain of size `length`.
    ///
    /// Both sizes must be even and at least 4.
    pub fn new(nx: usize, ny: usize, length: [f64; 2]) -> Result<Self, ConfigError> {
        if nx < 4 || ny < 4 || nx % 2 != 0 || ny % 2 != 0 {
            return Err(ConfigError::InvalidGrid(format!(
                "grid {nx}x{ny} must be even and at least 4x4"
            )));
        }

        let nl = ny;
        let nk = nx / 2 + 1;
        let nx2 = 3 * nx / 2;
        let ny2 = 3 * ny / 2;
        let nl2 = ny2;
        let nk2 = nx2 / 2 + 1;
        let mid = nl / 2;
        let mid2 = nl - mid;
        let renorm = (nx2 as f64 / nx as f64) * (ny2 as f64 / ny as f64);

        let dkx = 2.0 * std::f64::consts::PI / length[0];
        let dky = 2.0 * std::f64::consts::PI / length[1];
        let kx = (0..nk).map(|j| j as f64 * dkx).collect();
        let ky = (0..nl).map(|i| fft_frequency(i, ny) * dky).collect();

        Ok(Self {
            nx,
            ny,
            nl,
            nk,
            nx2,
            ny2,
            nl2,
            nk2,
            length,
            mid,
            mid2,
            renorm,
            kx,
            ky,
        })
    }

    /// Build the grid described by a configuration section.
    pub fn from_config(config: &GridConfig) -> Result<Self, ConfigError> {
        Self::new(config.nx, config.ny, config.length)
    }

    /// Shape of a native spectral field.
    pub fn spectral_shape(&self) -> (usize, usize) {
        (self.nl, self.nk)
    }

    /// Shape of a padded spectral field.
    pub fn padded_shape(&self) -> (usize, usize) {
        (self.nl2, self.nk2)
    }

    /// Number of physical samples (`nx·ny`), the scale of the (0,0) coefficient.
    pub fn sample_count(&self) -> f64 {
        (self.nx * self.ny) as f64
    }

    /// x-wavenumber used by derivatives; the Nyquist column is zeroed.
    #[inline]
    pub fn kx_deriv(&self, j: usize) -> f64 {
        if j == self.nx / 2 { 0.0 } else { self.kx[j] }
    }

    /// y-wavenumber used by derivatives; the Nyquist row is zeroed.
    #[inline]
    pub fn ky_deriv(&self, i: usize) -> f64 {
        if i == self.ny / 2 { 0.0 } else { self.ky[i] }
    }

    /// Squared wavenumber magnitude `kx² + ky²` at `(row, col)`.
    #[inline]
    pub fn k_squared(&self, i: usize, j: usize) -> f64 {
        self.kx[j] * self.kx[j] + self.ky[i] * self.ky[i]
    }

    /// Zero-pad a native spectral field to the padded wavenumber range.
    ///
    /// The native Nyquist row and column each stand for a `±k` pair that the
    /// padded spectrum resolves separately, so their content is split with
    /// half amplitude: the Nyquist row is copied to `+ny/2` and `-ny/2`, and
    /// the Nyquist column (interior once padded, hence mirrored by the real
    /// inverse) is halved.
    pub fn pad(&self, field: &Array2<Complex64>) -> Array2<Complex64> {
        let mut padded = Array2::zeros(self.padded_shape());
        padded
            .slice_mut(s![..self.mid, ..self.nk])
            .assign(&field.slice(s![..self.mid, ..]));
        padded
            .slice_mut(s![self.nl2 - self.mid2.., ..self.nk])
            .assign(&field.slice(s![self.mid.., ..]));

        let nyquist_row = self.nl2 - self.mid2;
        let half_row = field.slice(s![self.mid, ..]).mapv(|v| v * 0.5);
        padded.slice_mut(s![nyquist_row, ..self.nk]).assign(&half_row);
        padded.slice_mut(s![self.mid, ..self.nk]).assign(&half_row);
        padded
            .slice_mut(s![.., self.nx / 2])
            .mapv_inplace(|v| v * 0.5);
        padded
    }

    /// Truncate a padded spectral field back to the native range.
    ///
    /// The native Nyquist row and column are left zero.
    pub fn truncate(&self, padded: &Array2<Complex64>) -> Array2<Complex64> {
        let mut field = Array2::zeros(self.spectral_shape());
        field
            .slice_mut(s![..self.mid, ..self.nk - 1])
            .assign(&padded.slice(s![..self.mid, ..self.nk - 1]));
        field
            .slice_mut(s![self.mid + 1.., ..self.nk - 1])
            .assign(&padded.slice(s![self.nl2 - self.mid2 + 1.., ..self.nk - 1]));
        field
    }
}

/// Integer FFT frequency of index `i` on an axis of length `n`.
fn fft_frequency(i: usize, n: usize) -> f64 {
    if i < n.div_ceil(2) {
        i as f64
    } else {
        i as f64 - n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_sizes() {
        let grid = GridSpec::new(32, 16, [2.0 * PI, 2.0 * PI]).unwrap();
        assert_eq!(grid.spectral_shape(), (16, 17));
        assert_eq!(grid.nx2, 48);
        assert_eq!(grid.ny2, 24);
        assert_eq!(grid.padded_shape(), (24, 25));
        assert_eq!(grid.mid + grid.mid2, grid.nl);
        assert!((grid.renorm - 2.25).abs() < 1e-15);
    }

    #[test]
    fn test_wavenumber_ordering() {
        let grid = GridSpec::new(8, 8, [2.0 * PI, 2.0 * PI]).unwrap();
        assert_eq!(grid.ky, vec![0.0, 1.0, 2.0, 3.0, -4.0, -3.0, -2.0, -1.0]);
        assert_eq!(grid.kx, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(grid.kx_deriv(4), 0.0);
        assert_eq!(grid.ky_deriv(4), 0.0);
        assert_eq!(grid.ky_deriv(5), -3.0);
    }

    #[test]
    fn test_domain_length_scales_wavenumbers() {
        let grid = GridSpec::new(8, 8, [PI, 4.0 * PI]).unwrap();
        assert!((grid.kx[1] - 2.0).abs() < 1e-14);
        assert!((grid.ky[1] - 0.5).abs() < 1e-14);
    }

    #[test]
    fn test_pad_truncate_roundtrip() {
        let grid = GridSpec::new(8, 8, [2.0 * PI, 2.0 * PI]).unwrap();
        let field = Array2::from_shape_fn(grid.spectral_shape(), |(i, j)| {
            Complex64::new(i as f64 + 1.0, j as f64 - 2.0)
        });
        let padded = grid.pad(&field);
        // Negative frequencies keep their frequency after padding.
        assert_eq!(padded[[grid.nl2 - 1, 0]], field[[grid.nl - 1, 0]]);
        assert_eq!(padded[[grid.mid + 1, 0]], Complex64::new(0.0, 0.0));

        let back = grid.truncate(&padded);
        for ((i, j), v) in back.indexed_iter() {
            if i == grid.ny / 2 || j == grid.nx / 2 {
                assert_eq!(*v, Complex64::new(0.0, 0.0));
            } else {
                assert_eq!(*v, field[[i, j]]);
            }
        }
    }

    #[test]
    fn test_pad_splits_nyquist() {
        let grid = GridSpec::new(8, 8, [2.0 * PI, 2.0 * PI]).unwrap();
        let field = Array2::from_elem(grid.spectral_shape(), Complex64::new(4.0, 0.0));
        let padded = grid.pad(&field);
        let minus = grid.nl2 - grid.mid2;
        // ky = -ny/2 and +ny/2 share the native Nyquist row.
        assert_eq!(padded[[minus, 1]], Complex64::new(2.0, 0.0));
        assert_eq!(padded[[grid.mid, 1]], Complex64::new(2.0, 0.0));
        // kx = nx/2 is halved; the corner is quartered.
        assert_eq!(padded[[1, grid.nx / 2]], Complex64::new(2.0, 0.0));
        assert_eq!(padded[[minus, grid.nx / 2]], Complex64::new(1.0, 0.0));
        assert_eq!(padded[[1, 1]], Complex64::new(4.0, 0.0));
    }

    #[test]
    fn test_invalid_grid() {
        assert!(GridSpec::new(7, 8, [1.0, 1.0]).is_err());
        assert!(GridSpec::new(2, 2, [1.0, 1.0]).is_err());
    }
}
