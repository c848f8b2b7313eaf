//! Scalar run diagnostics.
//!
//! Mean precipitation and mean moisture are reported per grid point, i.e.
//! the (0,0) spectral coefficient divided by `nx·ny`.
//!
//! # Example
//!
//! ```ignore
//! let diag = DiagnosticSummary::compute(step, time, &state, &ops, &params);
//! println!("{}", diag.summary_line());
//!
//! let mut tracker = DiagnosticsTracker::new(diag);
//! // ... simulation loop ...
//! tracker.update(next);
//! ```

use crate::physics::PhysicalParameters;
use crate::solver::ModelState;
use crate::spectral::SpectralOperators;

/// Scalar summary emitted once per output interval.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagnosticSummary {
    /// Completed step count
    pub step: usize,
    /// Model time
    pub time: f64,
    /// Maximum horizontal speed over layers and grid points
    pub peak_velocity: f64,
    /// Domain-mean precipitation rate, when rain is enabled
    pub mean_precip: Option<f64>,
    /// Domain-mean moisture, when a layer is moist
    pub mean_moisture: Option<f64>,
}

impl DiagnosticSummary {
    pub fn compute(
        step: usize,
        time: f64,
        state: &ModelState,
        ops: &SpectralOperators,
        params: &PhysicalParameters,
    ) -> Self {
        let samples = ops.grid.sample_count();
        Self {
            step,
            time,
            peak_velocity: state.peak_velocity(ops),
            mean_precip: params.rain.then(|| state.mean_precip / samples),
            mean_moisture: state.mean_moisture().map(|m| m / samples),
        }
    }

    /// Format as a single line, `-` for absent quantities.
    pub fn summary_line(&self) -> String {
        let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.6e}"));
        format!(
            "step={} t={:.4} |u|_max={:.6e} P0={} m0={}",
            self.step,
            self.time,
            self.peak_velocity,
            fmt(self.mean_precip),
            fmt(self.mean_moisture)
        )
    }

    /// True if every reported quantity is finite.
    pub fn is_finite(&self) -> bool {
        self.peak_velocity.is_finite()
            && self.mean_precip.is_none_or(f64::is_finite)
            && self.mean_moisture.is_none_or(f64::is_finite)
    }
}

/// Running extrema over a sequence of summaries.
#[derive(Clone, Debug)]
pub struct DiagnosticsTracker {
    initial: DiagnosticSummary,
    current: DiagnosticSummary,
    n_updates: usize,
    max_velocity_seen: f64,
}

impl DiagnosticsTracker {
    pub fn new(initial: DiagnosticSummary) -> Self {
        Self {
            max_velocity_seen: initial.peak_velocity,
            current: initial.clone(),
            initial,
            n_updates: 0,
        }
    }

    pub fn update(&mut self, diag: DiagnosticSummary) {
        self.n_updates += 1;
        if diag.peak_velocity > self.max_velocity_seen {
            self.max_velocity_seen = diag.peak_velocity;
        }
        self.current = diag;
    }

    pub fn initial(&self) -> &DiagnosticSummary {
        &self.initial
    }

    pub fn current(&self) -> &DiagnosticSummary {
        &self.current
    }

    pub fn n_updates(&self) -> usize {
        self.n_updates
    }

    /// Largest peak velocity seen so far.
    pub fn max_velocity_seen(&self) -> f64 {
        self.max_velocity_seen
    }

    /// Change in mean moisture since the first summary.
    pub fn moisture_drift(&self) -> Option<f64> {
        Some(self.current.mean_moisture? - self.initial.mean_moisture?)
    }

    /// No blow-up indicators in the latest summary.
    pub fn is_stable(&self) -> bool {
        self.current.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::grid::GridSpec;
    use rustfft::num_complex::Complex64;

    fn summary(peak: f64, moisture: Option<f64>) -> DiagnosticSummary {
        DiagnosticSummary {
            step: 0,
            time: 0.0,
            peak_velocity: peak,
            mean_precip: None,
            mean_moisture: moisture,
        }
    }

    #[test]
    fn test_compute_normalizes_means() {
        let config = ModelConfig::default().with_grid(8, 8);
        let grid = GridSpec::from_config(&config.grid).unwrap();
        let params = PhysicalParameters::from_config(&config, &grid).unwrap();
        let ops = SpectralOperators::new(grid);
        let mut state = ModelState::zeros(&params, &ops.grid);
        state.mean_precip = 32.0;
        state.moisture.as_mut().unwrap()[[0, 0, 0]] = Complex64::new(128.0, 0.0);

        let diag = DiagnosticSummary::compute(3, 0.03, &state, &ops, &params);
        assert_eq!(diag.step, 3);
        assert_eq!(diag.peak_velocity, 0.0);
        assert_eq!(diag.mean_precip, Some(0.5));
        assert_eq!(diag.mean_moisture, Some(2.0));
    }

    #[test]
    fn test_summary_line_marks_absent_values() {
        let line = summary(1.5, None).summary_line();
        assert!(line.contains("P0=-"));
        assert!(line.contains("m0=-"));
        assert!(line.starts_with("step=0"));
    }

    #[test]
    fn test_tracker_extrema() {
        let mut tracker = DiagnosticsTracker::new(summary(1.0, Some(0.5)));
        tracker.update(summary(3.0, Some(0.75)));
        tracker.update(summary(2.0, Some(1.0)));
        assert_eq!(tracker.n_updates(), 2);
        assert_eq!(tracker.max_velocity_seen(), 3.0);
        assert_eq!(tracker.moisture_drift(), Some(0.5));
        assert!(tracker.is_stable());

        tracker.update(summary(f64::NAN, None));
        assert!(!tracker.is_stable());
        assert_eq!(tracker.moisture_drift(), None);
    }
}
