//! Dry-layer PV → streamfunction inversion.
//!
//! For two layers the PV at wavenumber magnitude `K²` is
//!
//! ```text
//! q0 = −K²ψ0 − F0(ψ0 − ψ1)
//! q1 = −K²ψ1 + F1(ψ0 − ψ1)
//! ```
//!
//! i.e. `q = A·ψ` with a real 2×2 matrix `A`. The inversion matrix is `A⁻¹`,
//! singular only at `K² = 0`.

use faer::{Mat, linalg::solvers::Solve};

/// PV operator `A` for the two dry layers at wavenumber magnitude `k2`.
pub fn pv_matrix(k2: f64, f0: f64, f1: f64) -> Mat<f64> {
    let mut a = Mat::zeros(2, 2);
    a[(0, 0)] = -k2 - f0;
    a[(0, 1)] = f0;
    a[(1, 0)] = f1;
    a[(1, 1)] = -k2 - f1;
    a
}

/// Inversion matrix `A⁻¹` mapping dry PV to streamfunction.
///
/// Must not be called at `k2 = 0`.
pub fn inversion_matrix(k2: f64, f0: f64, f1: f64) -> Mat<f64> {
    let a = pv_matrix(k2, f0, f1);
    let n = a.nrows();

    // Solve A * A_inv = I column by column
    let lu = a.as_ref().full_piv_lu();
    let mut a_inv = Mat::zeros(n, n);
    for j in 0..n {
        let mut rhs = Mat::zeros(n, 1);
        rhs[(j, 0)] = 1.0;
        let col = lu.solve(&rhs);
        for i in 0..n {
            a_inv[(i, j)] = col[(i, 0)];
        }
    }
    a_inv
}
