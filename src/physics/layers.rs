//! Layer index space.
//!
//! Dry dynamical layers occupy slots `0..layers`; each moisture-carrying
//! layer appends one moist PV slot after them:
//!
//! ```text
//! [ q_0, q_1, ..., q_{layers-1}, q_moist(first moist layer), ... ]
//! ```

/// Arrangement of dry and moist slots in the PV state vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerLayout {
    /// Number of dry dynamical layers.
    pub layers: usize,
    /// Dry layers that carry moisture.
    pub moist_indices: Vec<usize>,
    /// Dry layers without moisture.
    pub dry_indices: Vec<usize>,
}

impl LayerLayout {
    /// Build from a per-layer moisture mask.
    pub fn from_mask(mask: &[bool]) -> Self {
        let moist_indices = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| m.then_some(i))
            .collect();
        let dry_indices = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| (!m).then_some(i))
            .collect();
        Self {
            layers: mask.len(),
            moist_indices,
            dry_indices,
        }
    }

    /// Number of moisture-carrying layers.
    pub fn moist_count(&self) -> usize {
        self.moist_indices.len()
    }

    /// Length of the PV state vector.
    pub fn total_layers(&self) -> usize {
        self.layers + self.moist_count()
    }

    /// Whether any layer carries moisture.
    pub fn has_moisture(&self) -> bool {
        !self.moist_indices.is_empty()
    }

    /// `(dry layer, moisture index, moist PV slot)` for each moist layer.
    pub fn moist_pairs(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.moist_indices
            .iter()
            .enumerate()
            .map(move |(n, &i)| (i, n, self.layers + n))
    }
}
