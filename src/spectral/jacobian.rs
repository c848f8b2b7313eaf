//! Dealiased Jacobian evaluation.
//!
//! `J(ψ, q) = ∂xψ·∂yq − ∂yψ·∂xq` is evaluated pseudo-spectrally on the 3/2
//! padded grid:
//!
//! ```text
//! pad → inverse FFT (padded) → pointwise product → forward FFT (padded)
//!     → truncate → × renorm
//! ```
//!
//! Padding to 3/2 of the native wavenumber range is enough to keep the
//! aliased part of a quadratic product outside the retained modes.

use ndarray::Zip;

use super::ops::{x_derivative, y_derivative};
use super::{PhysicalField, RealFft2d, SpectralField, SpectralTransform, enforce_real_mean};
use crate::grid::GridSpec;

/// Grid plus native and padded transforms, bundled for nonlinear products.
#[derive(Clone, Debug)]
pub struct SpectralOperators {
    /// Wavenumber grid
    pub grid: GridSpec,
    /// Transform at the native size
    pub native: RealFft2d,
    /// Transform at the 3/2-padded size
    pub padded: RealFft2d,
}

impl SpectralOperators {
    /// Plan transforms for the given grid.
    pub fn new(grid: GridSpec) -> Self {
        let native = RealFft2d::new(grid.nx, grid.ny);
        let padded = RealFft2d::new(grid.nx2, grid.ny2);
        Self {
            grid,
            native,
            padded,
        }
    }

    /// Spectral field to physical space at the native size.
    pub fn to_physical(&self, field: &SpectralField) -> PhysicalField {
        self.native.inverse(field)
    }

    /// Physical field to spectral space at the native size.
    pub fn to_spectral(&self, field: &PhysicalField) -> SpectralField {
        self.native.forward(field)
    }

    /// Spectral x and y derivatives of `field` on the padded physical grid.
    fn padded_gradient(&self, field: &SpectralField) -> (PhysicalField, PhysicalField) {
        let dx = self.padded.inverse(&self.grid.pad(&x_derivative(field, &self.grid)));
        let dy = self.padded.inverse(&self.grid.pad(&y_derivative(field, &self.grid)));
        (dx, dy)
    }

    /// Bring a padded physical product back to the native spectrum.
    fn dealiased_spectrum(&self, product: &PhysicalField) -> SpectralField {
        let mut out = self.grid.truncate(&self.padded.forward(product));
        out.mapv_inplace(|v| v * self.grid.renorm);
        enforce_real_mean(&mut out);
        out
    }

    fn bracket(
        psi_x: &PhysicalField,
        psi_y: &PhysicalField,
        q_x: &PhysicalField,
        q_y: &PhysicalField,
    ) -> PhysicalField {
        let mut product = PhysicalField::zeros(psi_x.dim());
        Zip::from(&mut product)
            .and(psi_x)
            .and(psi_y)
            .and(q_x)
            .and(q_y)
            .for_each(|p, &px, &py, &qx, &qy| *p = px * qy - py * qx);
        product
    }

    /// Dealiased Jacobian `J(ψ, q)`.
    pub fn jacobian(&self, psi: &SpectralField, q: &SpectralField) -> SpectralField {
        let (psi_x, psi_y) = self.padded_gradient(psi);
        let (q_x, q_y) = self.padded_gradient(q);
        self.dealiased_spectrum(&Self::bracket(&psi_x, &psi_y, &q_x, &q_y))
    }

    /// Dealiased `(J(ψ, q_a), J(ψ, q_b))`, sharing the padded velocity of `ψ`.
    pub fn double_jacobian(
        &self,
        psi: &SpectralField,
        q_a: &SpectralField,
        q_b: &SpectralField,
    ) -> (SpectralField, SpectralField) {
        let (psi_x, psi_y) = self.padded_gradient(psi);
        let (a_x, a_y) = self.padded_gradient(q_a);
        let (b_x, b_y) = self.padded_gradient(q_b);
        (
            self.dealiased_spectrum(&Self::bracket(&psi_x, &psi_y, &a_x, &a_y)),
            self.dealiased_spectrum(&Self::bracket(&psi_x, &psi_y, &b_x, &b_y)),
        )
    }
}
