//! Linear operators: dry PV inversion and the per-wavenumber propagator.
//!
//! This module provides:
//! - The two-layer PV matrix and its inverse (`pv_matrix`, `inversion_matrix`)
//! - The coupled linear operator and its exact one-step propagator
//!   (`LinearOperatorBuilder`, `LinearOperatorTable`)

mod inversion;
mod linear;

pub use inversion::{inversion_matrix, pv_matrix};
pub use linear::{LinearOperatorBuilder, LinearOperatorTable};
