//! Spectral derivative and Laplacian evaluators.
//!
//! All operators are diagonal in wavenumber space:
//! - ∂x: multiply by `i·kx` (columns, non-negative only)
//! - ∂y: multiply by `i·ky` (rows, negative frequencies wrapped to the tail)
//! - ∇²: multiply by `−(kx² + ky²)`
//!
//! The (0,0) bin of a derivative is exactly zero, and the Nyquist row/column
//! is dropped from first derivatives so they stay representable as real fields.

use ndarray::Zip;
use rustfft::num_complex::Complex64;

use super::SpectralField;
use crate::grid::GridSpec;

/// Multiply by `i·k`.
#[inline]
fn times_ik(k: f64, v: Complex64) -> Complex64 {
    Complex64::new(-k * v.im, k * v.re)
}

/// Spectral x-derivative.
pub fn x_derivative(field: &SpectralField, grid: &GridSpec) -> SpectralField {
    let mut out = field.clone();
    Zip::indexed(&mut out).for_each(|(_, j), v| *v = times_ik(grid.kx_deriv(j), *v));
    out
}

/// Spectral y-derivative.
pub fn y_derivative(field: &SpectralField, grid: &GridSpec) -> SpectralField {
    let mut out = field.clone();
    Zip::indexed(&mut out).for_each(|(i, _), v| *v = times_ik(grid.ky_deriv(i), *v));
    out
}

/// Spectral Laplacian.
pub fn laplacian(field: &SpectralField, grid: &GridSpec) -> SpectralField {
    let mut out = field.clone();
    Zip::indexed(&mut out).for_each(|(i, j), v| *v *= -grid.k_squared(i, j));
    out
}
