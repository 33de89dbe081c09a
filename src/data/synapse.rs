//! Exponential low-pass filter applied to inbound samples before they are
//! reconciled and buffered.

use crate::data::sample::Sample;

#[derive(Debug, Clone, Default)]
pub struct SynapseFilter {
    /// Time constant in seconds. `None` or a non-positive value disables filtering.
    tau: Option<f64>,
    last: Option<Sample>,
}

impl SynapseFilter {
    pub fn new(tau: Option<f64>) -> Self {
        Self {
            tau: tau.filter(|t| *t > 0.0),
            last: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.tau.is_some()
    }

    /// Filter `sample` in place against the previous filtered sample.
    ///
    /// `out = prev * decay + new * (1 - decay)`, `decay = exp(-dt / tau)`.
    /// The first sample after construction or [`reset`](Self::reset) passes through.
    pub fn apply(&mut self, sample: &mut Sample) {
        let Some(tau) = self.tau else {
            return;
        };
        if let Some(prev) = &self.last {
            if prev.values.len() == sample.values.len() {
                let dt = (sample.time - prev.time).max(0.0);
                let decay = (-dt / tau).exp();
                for (v, p) in sample.values.iter_mut().zip(prev.values.iter()) {
                    *v = p * decay + *v * (1.0 - decay);
                }
            }
        }
        self.last = Some(sample.clone());
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_filter_passes_through() {
        let mut f = SynapseFilter::new(Some(0.0));
        assert!(!f.is_enabled());
        let mut s = Sample::new(0.1, vec![3.0]);
        f.apply(&mut s);
        assert_eq!(s.values, vec![3.0]);
    }

    #[test]
    fn step_input_moves_towards_target() {
        let mut f = SynapseFilter::new(Some(0.01));
        let mut first = Sample::new(0.0, vec![0.0]);
        f.apply(&mut first);
        let mut step = Sample::new(0.01, vec![1.0]);
        f.apply(&mut step);
        let expected = 1.0 - (-1.0f64).exp();
        assert!((step.values[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn reset_forgets_history() {
        let mut f = SynapseFilter::new(Some(1.0));
        f.apply(&mut Sample::new(0.0, vec![10.0]));
        f.reset();
        let mut s = Sample::new(0.0, vec![2.0]);
        f.apply(&mut s);
        assert_eq!(s.values, vec![2.0]);
    }
}
