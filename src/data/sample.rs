/// One simulation tick: the simulation time plus one value per channel.
///
/// On the wire this is a flat row where element 0 is the time; in memory the
/// time is kept apart so channel `c` is always `values[c]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub values: Vec<f64>,
}

impl Sample {
    pub fn new(time: f64, values: Vec<f64>) -> Self {
        Self { time, values }
    }

    /// Build a sample from a flat `[time, v0, v1, ...]` row.
    /// Returns `None` for an empty row.
    pub fn from_row(row: &[f64]) -> Option<Self> {
        let (&time, values) = row.split_first()?;
        Some(Self {
            time,
            values: values.to_vec(),
        })
    }

    /// Flatten back into `[time, v0, v1, ...]`.
    pub fn to_row(&self) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.values.len() + 1);
        row.push(self.time);
        row.extend_from_slice(&self.values);
        row
    }

    pub fn n_channels(&self) -> usize {
        self.values.len()
    }
}
