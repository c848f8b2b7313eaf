//! Multistep tendency history.

use ndarray::Zip;

use crate::operators::LinearOperatorTable;
use crate::spectral::LayeredField;

/// Current and two previous tendencies, one field per PV slot.
///
/// Previous tendencies are stored already propagated to the current time
/// level, as required by the integrating-factor form of Adams–Bashforth 3.
#[derive(Clone, Debug, PartialEq)]
pub struct TendencyHistory {
    /// Tendency at the current time level
    pub current: LayeredField,
    /// Tendency one step back (propagated once)
    pub previous: LayeredField,
    /// Tendency two steps back (propagated twice)
    pub previous2: LayeredField,
}

impl TendencyHistory {
    /// Zero history for fields of shape `(total_layers, nl, nk)`.
    pub fn zeros(shape: (usize, usize, usize)) -> Self {
        Self {
            current: LayeredField::zeros(shape),
            previous: LayeredField::zeros(shape),
            previous2: LayeredField::zeros(shape),
        }
    }

    /// Seed all three slots with the same tendency.
    ///
    /// This first-order bootstrap gives a small transient on the first step.
    pub fn seed(&mut self, tendency: LayeredField) {
        self.previous = tendency.clone();
        self.previous2 = tendency.clone();
        self.current = tendency;
    }

    /// Shift the history one slot back, propagating both shifted entries
    /// through one step of the linear solution operator.
    ///
    /// `current` keeps its value until the caller stores a new tendency.
    pub fn rotate(&mut self, table: &LinearOperatorTable) {
        self.previous2 = table.propagate_tendency(&self.previous);
        self.previous = table.propagate_tendency(&self.current);
    }

    /// Adams–Bashforth 3 increment `dt·(23·c − 16·p + 5·pp)/12`.
    pub fn ab3_increment(&self, dt: f64) -> LayeredField {
        let mut out = LayeredField::zeros(self.current.dim());
        Zip::from(&mut out)
            .and(&self.current)
            .and(&self.previous)
            .and(&self.previous2)
            .for_each(|o, &c, &p, &pp| {
                *o = (c * 23.0 - p * 16.0 + pp * 5.0) * (dt / 12.0);
            });
        out
    }
}
