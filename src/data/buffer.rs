//! Rolling, time-ordered store of multi-channel samples.
//!
//! Samples are kept column-wise (one `VecDeque` of times plus one per
//! channel) so the visible slice can be handed to renderers channel by
//! channel without reshuffling. Trimming only ever pops from the front.

use std::collections::VecDeque;

use crate::data::sample::Sample;
use crate::error::{Result, SimscopeError};

/// Absolute floor for the "caught up" comparison in [`SampleBuffer::is_at_end`].
pub const AT_END_TOLERANCE: f64 = 1e-9;

/// The visible slice of a buffer, aligned index-for-index across channels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShownData {
    pub times: Vec<f64>,
    /// `channels[c][i]` is channel `c` at `times[i]`.
    pub channels: Vec<Vec<f64>>,
}

impl ShownData {
    fn empty(n_channels: usize) -> Self {
        Self {
            times: Vec::new(),
            channels: vec![Vec::new(); n_channels],
        }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// `[time, value]` pairs for one channel, ready for a line plot.
    pub fn points(&self, channel: usize) -> Option<Vec<[f64; 2]>> {
        let values = self.channels.get(channel)?;
        Some(
            self.times
                .iter()
                .zip(values.iter())
                .map(|(&t, &v)| [t, v])
                .collect(),
        )
    }
}

pub struct SampleBuffer {
    n_channels: usize,
    times: VecDeque<f64>,
    data: Vec<VecDeque<f64>>,
    /// `(start, end)` of the window set by the last `update`. `None` shows everything.
    window: Option<(f64, f64)>,
}

impl SampleBuffer {
    pub fn new(n_channels: usize) -> Self {
        Self {
            n_channels,
            times: VecDeque::new(),
            data: vec![VecDeque::new(); n_channels],
            window: None,
        }
    }

    pub fn n_channels(&self) -> usize {
        self.n_channels
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Timestamp of the newest sample.
    pub fn last_time(&self) -> Option<f64> {
        self.times.back().copied()
    }

    /// Timestamp of the oldest retained sample.
    pub fn first_time(&self) -> Option<f64> {
        self.times.front().copied()
    }

    pub fn window(&self) -> Option<(f64, f64)> {
        self.window
    }

    /// Would a sample at `time` be accepted as the new tail?
    ///
    /// Non-finite times are never accepted; they would break the ordering
    /// every later comparison relies on.
    pub fn check_order(&self, time: f64) -> Result<()> {
        let tail = self.last_time();
        let ordered = match tail {
            Some(tail) => time >= tail,
            None => true,
        };
        if time.is_finite() && ordered {
            Ok(())
        } else {
            Err(SimscopeError::OutOfOrderSample {
                time,
                tail: tail.unwrap_or(f64::NEG_INFINITY),
            })
        }
    }

    /// Would `sample` be accepted by [`push`](Self::push)? Width first, then order.
    pub fn check(&self, sample: &Sample) -> Result<()> {
        if sample.values.len() != self.n_channels {
            return Err(SimscopeError::MalformedMessage {
                expected: self.n_channels,
                actual: sample.values.len(),
            });
        }
        self.check_order(sample.time)
    }

    /// Append a sample at the tail.
    ///
    /// A sample older than the current tail, with a non-finite time, or with
    /// the wrong number of channels, is rejected and the buffer is left
    /// exactly as it was.
    pub fn push(&mut self, sample: Sample) -> Result<()> {
        self.check(&sample)?;
        self.times.push_back(sample.time);
        for (column, value) in self.data.iter_mut().zip(sample.values) {
            column.push_back(value);
        }
        Ok(())
    }

    /// Is `time` strictly older than the tail? Only finite times count, so
    /// a garbage timestamp is never mistaken for the start of a new run.
    pub fn is_stale(&self, time: f64) -> bool {
        time.is_finite() && self.last_time().is_some_and(|tail| time < tail)
    }

    /// Move the window to `[current_time - window_length, current_time]` and
    /// drop everything from the head that the window no longer needs.
    ///
    /// Kept: every sample inside the window, the newest sample before it (the
    /// leading line segment), and the newest sample overall. Each pass pops
    /// only what it removes, so repeated calls with the same arguments are free.
    pub fn update(&mut self, current_time: f64, window_length: f64) {
        let start = current_time - window_length;
        self.window = Some((start, current_time));

        let mut removed = 0usize;
        while self.times.len() > 1 && self.times[1] < start {
            self.times.pop_front();
            for column in self.data.iter_mut() {
                column.pop_front();
            }
            removed += 1;
        }
        if removed > 0 {
            log::trace!("trimmed {removed} samples before t={start}");
        }
    }

    /// Drop everything but the newest sample. Used by widgets without a window.
    pub fn keep_latest(&mut self) {
        while self.times.len() > 1 {
            self.times.pop_front();
            for column in self.data.iter_mut() {
                column.pop_front();
            }
        }
    }

    /// Index range `[first, last)` of the visible slice, continuity sample included.
    fn shown_range(&self) -> Option<(usize, usize)> {
        let Some((start, end)) = self.window else {
            return if self.times.is_empty() {
                None
            } else {
                Some((0, self.times.len()))
            };
        };
        let lo = self.times.partition_point(|&t| t < start);
        let hi = self.times.partition_point(|&t| t <= end);
        if lo >= hi {
            return None;
        }
        Some((lo.saturating_sub(1), hi))
    }

    /// Per-channel values inside the window plus the one leading sample.
    /// Empty sequences when nothing falls inside the window.
    pub fn get_shown_data(&self) -> ShownData {
        let Some((first, last)) = self.shown_range() else {
            return ShownData::empty(self.n_channels);
        };
        ShownData {
            times: self.times.range(first..last).copied().collect(),
            channels: self
                .data
                .iter()
                .map(|column| column.range(first..last).copied().collect())
                .collect(),
        }
    }

    /// Channel values of the newest sample, regardless of the window.
    pub fn get_last_data(&self) -> Option<Vec<f64>> {
        if self.times.is_empty() {
            return None;
        }
        Some(
            self.data
                .iter()
                .filter_map(|column| column.back().copied())
                .collect(),
        )
    }

    /// Has the stream caught up with the simulation clock?
    ///
    /// Timestamps travel as `f32`, so the tolerance grows with `current_time`
    /// to cover single-precision rounding.
    pub fn is_at_end(&self, current_time: f64) -> bool {
        let tolerance = AT_END_TOLERANCE.max(current_time.abs() * f64::from(f32::EPSILON));
        match self.last_time() {
            Some(last) => last >= current_time - tolerance,
            None => false,
        }
    }

    /// Drop all samples. The window is forgotten too.
    pub fn reset(&mut self) {
        self.times.clear();
        for column in self.data.iter_mut() {
            column.clear();
        }
        self.window = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(times: &[f64]) -> SampleBuffer {
        let mut buf = SampleBuffer::new(2);
        for &t in times {
            buf.push(Sample::new(t, vec![t, -t])).unwrap();
        }
        buf
    }

    #[test]
    fn equal_timestamps_are_accepted() {
        let buf = filled(&[0.0, 0.1, 0.1]);
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn wrong_channel_count_is_rejected() {
        let mut buf = SampleBuffer::new(2);
        let err = buf.push(Sample::new(0.0, vec![1.0])).unwrap_err();
        assert!(matches!(
            err,
            SimscopeError::MalformedMessage { expected: 2, actual: 1 }
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn update_keeps_newest_sample_even_when_window_is_ahead() {
        let mut buf = filled(&[0.0, 0.1, 0.2]);
        buf.update(10.0, 1.0);
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.get_last_data(), Some(vec![0.2, -0.2]));
        assert!(buf.get_shown_data().is_empty());
    }

    #[test]
    fn samples_after_window_end_are_kept_but_hidden() {
        let mut buf = filled(&[0.0, 0.5, 1.0, 1.5, 2.0]);
        buf.update(1.0, 0.5);
        let shown = buf.get_shown_data();
        assert_eq!(shown.times, vec![0.0, 0.5, 1.0]);
        assert_eq!(buf.last_time(), Some(2.0));
    }

    #[test]
    fn nan_time_never_becomes_the_tail() {
        let mut buf = filled(&[5.0]);
        assert!(buf.push(Sample::new(f64::NAN, vec![0.0, 0.0])).is_err());
        assert!(buf.push(Sample::new(1.0, vec![0.0, 0.0])).is_err());
        assert_eq!(buf.last_time(), Some(5.0));

        let mut empty = SampleBuffer::new(2);
        assert!(empty.push(Sample::new(f64::INFINITY, vec![0.0, 0.0])).is_err());
        assert!(empty.is_empty());
    }

    #[test]
    fn without_window_everything_is_shown() {
        let buf = filled(&[0.0, 0.1]);
        assert_eq!(buf.get_shown_data().len(), 2);
    }

    #[test]
    fn points_pairs_time_and_value() {
        let buf = filled(&[0.0, 0.1]);
        let shown = buf.get_shown_data();
        assert_eq!(shown.points(1), Some(vec![[0.0, -0.0], [0.1, -0.1]]));
        assert_eq!(shown.points(5), None);
    }
}
