//! Per-channel pinned values that take precedence over the live stream.
//!
//! A pinned ("fixed") channel keeps showing and sending the user's value
//! while the simulation keeps streaming. The streamed value is not thrown
//! away: it is remembered as the channel's reset value, so unpinning falls
//! back to what the simulation produced most recently.

use std::time::Instant;

use crate::error::{Result, SimscopeError};
use crate::notifier::Notify;
use crate::sink::OutboundMessage;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverrideState {
    pub fixed: bool,
    /// The value currently displayed for this channel.
    pub value: f64,
    /// Latest un-overridden value from the stream.
    pub reset_value: f64,
}

impl OverrideState {
    fn new(start: f64) -> Self {
        Self {
            fixed: false,
            value: start,
            reset_value: start,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OverrideReconciler {
    channels: Vec<OverrideState>,
}

impl OverrideReconciler {
    pub fn new(start_values: &[f64]) -> Self {
        Self {
            channels: start_values.iter().map(|&v| OverrideState::new(v)).collect(),
        }
    }

    pub fn n_channels(&self) -> usize {
        self.channels.len()
    }

    fn check(&self, channel: usize) -> Result<()> {
        if channel < self.channels.len() {
            Ok(())
        } else {
            Err(SimscopeError::DimensionMismatch {
                index: channel,
                channels: self.channels.len(),
            })
        }
    }

    pub fn state(&self, channel: usize) -> Result<&OverrideState> {
        self.check(channel)?;
        Ok(&self.channels[channel])
    }

    pub fn is_fixed(&self, channel: usize) -> bool {
        self.channels.get(channel).is_some_and(|s| s.fixed)
    }

    pub fn any_fixed(&self) -> bool {
        self.channels.iter().any(|s| s.fixed)
    }

    /// Displayed value for `channel`.
    pub fn value(&self, channel: usize) -> Result<f64> {
        Ok(self.state(channel)?.value)
    }

    /// Displayed values for all channels.
    pub fn values(&self) -> Vec<f64> {
        self.channels.iter().map(|s| s.value).collect()
    }

    /// Mark `channel` fixed at `value` and return the message announcing it,
    /// leaving delivery to the caller.
    pub fn fix(&mut self, channel: usize, value: f64) -> Result<OutboundMessage> {
        self.check(channel)?;
        let state = &mut self.channels[channel];
        state.fixed = true;
        state.value = value;
        log::debug!("channel {channel} pinned to {value}");
        Ok(OutboundMessage::Value { channel, value })
    }

    /// Pin `channel` to `value` and queue the edit for the simulation.
    pub fn pin<N: Notify + ?Sized>(
        &mut self,
        channel: usize,
        value: f64,
        notifier: &mut N,
        now: Instant,
    ) -> Result<()> {
        let message = self.fix(channel, value)?;
        notifier.notify(message, now);
        Ok(())
    }

    /// Release one channel back to the stream, showing its latest streamed value.
    pub fn unpin<N: Notify + ?Sized>(
        &mut self,
        channel: usize,
        notifier: &mut N,
        now: Instant,
    ) -> Result<()> {
        self.check(channel)?;
        let state = &mut self.channels[channel];
        state.fixed = false;
        state.value = state.reset_value;
        log::debug!("channel {channel} released at {}", state.value);
        notifier.notify(OutboundMessage::Reset { channel }, now);
        Ok(())
    }

    /// Simulation reset: release every channel, show the start values again,
    /// and send one reset per channel.
    ///
    /// Channels without an entry in `start_values` keep their current value.
    pub fn unpin_all_and_reset<N: Notify + ?Sized>(
        &mut self,
        start_values: &[f64],
        notifier: &mut N,
        now: Instant,
    ) {
        for (channel, state) in self.channels.iter_mut().enumerate() {
            state.fixed = false;
            if let Some(&start) = start_values.get(channel) {
                state.value = start;
                state.reset_value = start;
            }
            notifier.notify(OutboundMessage::Reset { channel }, now);
        }
        log::debug!("all {} channels released", self.channels.len());
    }

    /// Reconcile one incoming row of channel values in place.
    ///
    /// Fixed channels get their pinned value written over the streamed one
    /// (which becomes the new reset value); free channels just track the stream.
    /// Extra or missing entries in `values` are left alone.
    pub fn apply(&mut self, values: &mut [f64]) {
        for (state, v) in self.channels.iter_mut().zip(values.iter_mut()) {
            state.reset_value = *v;
            if state.fixed {
                *v = state.value;
            } else {
                state.value = *v;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::OutboundNotifier;

    #[test]
    fn pin_out_of_range_is_dimension_mismatch() {
        let mut r = OverrideReconciler::new(&[0.0, 0.0]);
        let mut n = OutboundNotifier::default();
        let err = r.pin(2, 1.0, &mut n, Instant::now()).unwrap_err();
        assert!(matches!(
            err,
            SimscopeError::DimensionMismatch { index: 2, channels: 2 }
        ));
        assert_eq!(n.pending(), 0);
    }

    #[test]
    fn free_channels_track_the_stream() {
        let mut r = OverrideReconciler::new(&[0.0, 0.0]);
        let mut row = [0.3, 0.4];
        r.apply(&mut row);
        assert_eq!(row, [0.3, 0.4]);
        assert_eq!(r.values(), vec![0.3, 0.4]);
    }

    #[test]
    fn unpin_reverts_to_latest_streamed_value() {
        let t = Instant::now();
        let mut r = OverrideReconciler::new(&[0.0]);
        let mut n = OutboundNotifier::default();
        r.pin(0, 9.0, &mut n, t).unwrap();
        r.apply(&mut [1.0]);
        r.apply(&mut [2.0]);
        assert_eq!(r.value(0).unwrap(), 9.0);
        r.unpin(0, &mut n, t).unwrap();
        assert!(!r.is_fixed(0));
        assert_eq!(r.value(0).unwrap(), 2.0);
        let queued: Vec<_> = n.queued().copied().collect();
        assert_eq!(
            queued,
            vec![
                OutboundMessage::Value { channel: 0, value: 9.0 },
                OutboundMessage::Reset { channel: 0 },
            ]
        );
    }
}
