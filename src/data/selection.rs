//! Channel selection for multi-dimensional consumers.
//!
//! Selected indices come from user input or saved layouts and cannot be
//! trusted. A bad index never reaches a sample read: the consumer switches to
//! [`SelectionState::Invalid`] and shows a placeholder until it is fixed.

use crate::data::buffer::SampleBuffer;
use crate::error::{Result, SimscopeError};

/// Check one index against the channel count.
pub fn validate_index(index: usize, n_channels: usize) -> Result<usize> {
    if index < n_channels {
        Ok(index)
    } else {
        Err(SimscopeError::DimensionMismatch {
            index,
            channels: n_channels,
        })
    }
}

/// Check every index; the first offender is reported.
pub fn validate_indices(indices: &[usize], n_channels: usize) -> Result<()> {
    indices
        .iter()
        .try_for_each(|&i| validate_index(i, n_channels).map(|_| ()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Valid,
    /// `index` is not below `channels`.
    Invalid { index: usize, channels: usize },
}

impl SelectionState {
    fn from_check(check: Result<()>) -> Self {
        match check {
            Ok(()) => SelectionState::Valid,
            Err(SimscopeError::DimensionMismatch { index, channels }) => {
                SelectionState::Invalid { index, channels }
            }
            Err(_) => SelectionState::Invalid {
                index: usize::MAX,
                channels: 0,
            },
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, SelectionState::Valid)
    }
}

/// One channel plotted against another.
#[derive(Debug, Clone)]
pub struct XyTrace {
    x: usize,
    y: usize,
    n_channels: usize,
    state: SelectionState,
}

impl XyTrace {
    pub fn new(x: usize, y: usize, n_channels: usize) -> Self {
        let mut trace = Self {
            x,
            y,
            n_channels,
            state: SelectionState::Valid,
        };
        trace.revalidate();
        trace
    }

    /// Build from a configured index list; missing entries default to 0 and 1.
    pub fn from_indices(indices: &[usize], n_channels: usize) -> Self {
        let x = indices.first().copied().unwrap_or(0);
        let y = indices.get(1).copied().unwrap_or(1);
        Self::new(x, y, n_channels)
    }

    fn revalidate(&mut self) {
        let was = self.state;
        self.state = SelectionState::from_check(validate_indices(&[self.x, self.y], self.n_channels));
        if was != self.state {
            match self.state {
                SelectionState::Valid => log::debug!("xy selection ({}, {}) valid", self.x, self.y),
                SelectionState::Invalid { index, channels } => log::warn!(
                    "xy selection ({}, {}) invalid: index {index} with {channels} channels",
                    self.x,
                    self.y
                ),
            }
        }
    }

    /// Change the plotted pair; validity is re-evaluated immediately.
    pub fn set_indices(&mut self, x: usize, y: usize) -> SelectionState {
        self.x = x;
        self.y = y;
        self.revalidate();
        self.state
    }

    pub fn indices(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// `[x, y]` points for the visible slice of `buffer`.
    /// Errors with `DimensionMismatch` instead of touching an invalid channel.
    pub fn points(&self, buffer: &SampleBuffer) -> Result<Vec<[f64; 2]>> {
        validate_indices(&[self.x, self.y], buffer.n_channels())?;
        let shown = buffer.get_shown_data();
        let xs = &shown.channels[self.x];
        let ys = &shown.channels[self.y];
        Ok(xs.iter().zip(ys.iter()).map(|(&x, &y)| [x, y]).collect())
    }

    /// The newest `[x, y]` point, if any data has arrived.
    pub fn last_point(&self, buffer: &SampleBuffer) -> Result<Option<[f64; 2]>> {
        validate_indices(&[self.x, self.y], buffer.n_channels())?;
        Ok(buffer.get_last_data().map(|v| [v[self.x], v[self.y]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_bad_index_is_reported() {
        let err = validate_indices(&[0, 5, 7], 3).unwrap_err();
        assert!(matches!(
            err,
            SimscopeError::DimensionMismatch { index: 5, channels: 3 }
        ));
    }

    #[test]
    fn correcting_indices_leaves_degraded_state() {
        let mut xy = XyTrace::new(4, 1, 3);
        assert!(!xy.state().is_valid());
        assert_eq!(xy.set_indices(2, 1), SelectionState::Valid);
        assert_eq!(xy.indices(), (2, 1));
    }

    #[test]
    fn from_indices_fills_missing_entries() {
        let xy = XyTrace::from_indices(&[], 2);
        assert_eq!(xy.indices(), (0, 1));
        assert!(xy.state().is_valid());
    }
}
