//! Spectral fields, transforms and differential operators.
//!
//! This module provides:
//! - Field aliases for half-spectrum storage (`SpectralField`, `LayeredField`)
//! - The real↔half-complex 2D transform (`SpectralTransform`, `RealFft2d`)
//! - Derivative and Laplacian evaluators (`x_derivative`, `y_derivative`, `laplacian`)
//! - Dealiased Jacobians bundled with their transforms (`SpectralOperators`)

mod jacobian;
mod ops;
mod transform;

pub use jacobian::SpectralOperators;
pub use ops::{laplacian, x_derivative, y_derivative};
pub use transform::{RealFft2d, SpectralTransform};

use ndarray::{Array2, Array3};
use rustfft::num_complex::Complex64;

/// Complex half-spectrum of a real 2D field, shape `(nl, nk)`.
pub type SpectralField = Array2<Complex64>;

/// Stack of spectral fields indexed by layer, shape `(layers, nl, nk)`.
pub type LayeredField = Array3<Complex64>;

/// Real field sampled on the physical grid, shape `(ny, nx)`.
pub type PhysicalField = Array2<f64>;

/// Drop any imaginary part of the (0,0) coefficient.
///
/// The (0,0) coefficient of a real field is the domain sum and must be real.
#[inline]
pub fn enforce_real_mean(field: &mut SpectralField) {
    field[[0, 0]].im = 0.0;
}
