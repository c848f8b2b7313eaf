//! Model state and right-hand side.
//!
//! # Submodules
//!
//! - [`state`]: evolving fields and tendency history
//! - [`tendency`]: nonlinear PV tendencies ([`TendencyEngine`])
//! - [`precipitation`]: convective precipitation relaxation
//! - [`moisture`]: diagnostic moisture update
//! - [`diagnostics`]: scalar run summaries

pub mod diagnostics;
pub mod moisture;
pub mod precipitation;
pub mod state;
pub mod tendency;

pub use diagnostics::{DiagnosticSummary, DiagnosticsTracker};
pub use moisture::update_moisture;
pub use precipitation::{Precipitation, moisture_surplus, precipitation_relaxation};
pub use state::{ModelState, TendencyHistory, potential_vorticity};
pub use tendency::{TendencyEngine, TendencyKind, TendencyOutput, nonstiff_pv_tendency};
