//! Runtime diagnostics.
//!
//! - [`DiagnosticSummary`]: per-output scalar summary
//! - [`DiagnosticsTracker`]: running extrema and stability check

mod diagnostics;

pub use diagnostics::{DiagnosticSummary, DiagnosticsTracker};
