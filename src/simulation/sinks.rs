//! Output sinks for snapshots and diagnostics.
//!
//! The driver hands each sink a borrowed view of the state at every output
//! step. Storage format is up to the sink:
//! - [`SnapshotStore`]: owned in-memory copies, in emission order
//! - [`TracingDiagnostics`]: one `info!` event per summary
//! - [`WriterDiagnostics`]: one text line per summary on any `Write`
//! - `Vec<DiagnosticSummary>`: collected summaries

use std::io::Write;

use thiserror::Error;
use tracing::info;

use crate::solver::{DiagnosticSummary, ModelState};
use crate::spectral::{LayeredField, PhysicalField};

/// Failure of an output sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// I/O error while writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Borrowed view of the state at an output step.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub step: usize,
    pub time: f64,
    pub pv: &'a LayeredField,
    pub psi: &'a LayeredField,
    pub moisture: Option<&'a LayeredField>,
    /// Present only when precipitation is computed
    pub precip: Option<&'a PhysicalField>,
}

impl<'a> Snapshot<'a> {
    pub fn from_state(step: usize, time: f64, state: &'a ModelState) -> Self {
        Self {
            step,
            time,
            pv: &state.pv,
            psi: &state.psi,
            moisture: state.moisture.as_ref(),
            precip: state.precip.as_ref(),
        }
    }

    pub fn owned(&self) -> OwnedSnapshot {
        OwnedSnapshot {
            step: self.step,
            time: self.time,
            pv: self.pv.clone(),
            psi: self.psi.clone(),
            moisture: self.moisture.cloned(),
            precip: self.precip.cloned(),
        }
    }
}

/// Owned copy of a [`Snapshot`].
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedSnapshot {
    pub step: usize,
    pub time: f64,
    pub pv: LayeredField,
    pub psi: LayeredField,
    pub moisture: Option<LayeredField>,
    pub precip: Option<PhysicalField>,
}

/// Receives snapshots in order.
pub trait SaveSink {
    fn save(&mut self, snapshot: &Snapshot<'_>) -> Result<(), SinkError>;
}

/// Receives one diagnostic summary per output step.
pub trait DiagnosticsSink {
    fn record(&mut self, summary: &DiagnosticSummary) -> Result<(), SinkError>;
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl SaveSink for NullSink {
    fn save(&mut self, _snapshot: &Snapshot<'_>) -> Result<(), SinkError> {
        Ok(())
    }
}

impl DiagnosticsSink for NullSink {
    fn record(&mut self, _summary: &DiagnosticSummary) -> Result<(), SinkError> {
        Ok(())
    }
}

/// In-memory snapshot history.
#[derive(Clone, Debug, Default)]
pub struct SnapshotStore {
    snapshots: Vec<OwnedSnapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&OwnedSnapshot> {
        self.snapshots.get(index)
    }

    pub fn last(&self) -> Option<&OwnedSnapshot> {
        self.snapshots.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OwnedSnapshot> {
        self.snapshots.iter()
    }

    /// Model times of the stored snapshots.
    pub fn times(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.time).collect()
    }

    pub fn into_inner(self) -> Vec<OwnedSnapshot> {
        self.snapshots
    }
}

impl SaveSink for SnapshotStore {
    fn save(&mut self, snapshot: &Snapshot<'_>) -> Result<(), SinkError> {
        self.snapshots.push(snapshot.owned());
        Ok(())
    }
}

/// Logs each summary as a structured `info!` event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn record(&mut self, summary: &DiagnosticSummary) -> Result<(), SinkError> {
        info!(
            step = summary.step,
            time = summary.time,
            peak_velocity = summary.peak_velocity,
            mean_precip = summary.mean_precip,
            mean_moisture = summary.mean_moisture,
            "diagnostics"
        );
        Ok(())
    }
}

/// Writes [`DiagnosticSummary::summary_line`] per summary.
#[derive(Debug)]
pub struct WriterDiagnostics<W: Write> {
    writer: W,
}

impl<W: Write> WriterDiagnostics<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DiagnosticsSink for WriterDiagnostics<W> {
    fn record(&mut self, summary: &DiagnosticSummary) -> Result<(), SinkError> {
        writeln!(self.writer, "{}", summary.summary_line())?;
        self.writer.flush()?;
        Ok(())
    }
}

impl DiagnosticsSink for Vec<DiagnosticSummary> {
    fn record(&mut self, summary: &DiagnosticSummary) -> Result<(), SinkError> {
        self.push(summary.clone());
        Ok(())
    }
}
