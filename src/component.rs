//! One widget's private streaming state and the redraw sequence.
//!
//! A [`StreamComponent`] owns its buffer, override state, outbound notifier
//! and axes; nothing is shared between widgets. Inbound data goes
//! decode → order check → synapse filter → override reconcile → buffer.
//! User edits go override state → notifier → transport.

use std::time::Instant;

use crate::axes::{TimeAxes, TimeSync};
use crate::config::{ComponentConfig, NotifierConfig};
use crate::controllers::TimeEvent;
use crate::data::buffer::{SampleBuffer, ShownData};
use crate::data::overrides::OverrideReconciler;
use crate::data::sample::Sample;
use crate::data::synapse::SynapseFilter;
use crate::error::Result;
use crate::events::{EventController, EventKind, ScopeEvent};
use crate::notifier::OutboundNotifier;
use crate::sink::{decode_sample, OutboundMessage, Transport};

pub struct StreamComponent {
    name: String,
    config: ComponentConfig,
    immediate: bool,
    buffer: SampleBuffer,
    synapse: SynapseFilter,
    overrides: OverrideReconciler,
    notifier: OutboundNotifier,
    sync: TimeSync,
    axes: TimeAxes,
    events: Option<EventController>,
}

impl StreamComponent {
    /// Build a windowed component (line charts, XY traces).
    pub fn new(
        name: impl Into<String>,
        config: ComponentConfig,
        notifier: &NotifierConfig,
    ) -> Result<Self> {
        let window = Some(config.window_length);
        Self::build(name.into(), config, notifier, window)
    }

    /// Build a component that only cares about the latest value (sliders).
    pub fn latest_only(
        name: impl Into<String>,
        config: ComponentConfig,
        notifier: &NotifierConfig,
    ) -> Result<Self> {
        Self::build(name.into(), config, notifier, None)
    }

    fn build(
        name: String,
        config: ComponentConfig,
        notifier: &NotifierConfig,
        window: Option<f64>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            buffer: SampleBuffer::new(config.n_channels),
            synapse: SynapseFilter::new(config.synapse),
            overrides: OverrideReconciler::new(&config.start_values),
            notifier: OutboundNotifier::from_config(notifier),
            immediate: notifier.immediate,
            sync: TimeSync::new(window),
            axes: TimeAxes::new(config.min_value, config.max_value, config.display_time),
            events: None,
            name,
            config,
        })
    }

    /// Report diagnostics to `events`.
    pub fn with_events(mut self, events: EventController) -> Self {
        self.events = Some(events);
        self
    }

    pub(crate) fn emit(&self, event: ScopeEvent) {
        if let Some(ctrl) = &self.events {
            ctrl.emit(event);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ComponentConfig {
        &self.config
    }

    pub fn n_channels(&self) -> usize {
        self.config.n_channels
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn overrides(&self) -> &OverrideReconciler {
        &self.overrides
    }

    pub fn notifier(&self) -> &OutboundNotifier {
        &self.notifier
    }

    pub fn axes(&self) -> &TimeAxes {
        &self.axes
    }

    pub fn axes_mut(&mut self) -> &mut TimeAxes {
        &mut self.axes
    }

    pub fn sync(&self) -> &TimeSync {
        &self.sync
    }

    pub fn is_immediate(&self) -> bool {
        self.immediate
    }

    // ── Inbound ─────────────────────────────────────────────────────────

    /// Handle one binary message from the simulation.
    ///
    /// Malformed or out-of-order messages are logged, reported as
    /// `DATA_REJECTED`, and returned as errors; the buffer is unchanged.
    pub fn on_message(&mut self, bytes: &[u8]) -> Result<()> {
        let result = decode_sample(bytes, self.config.n_channels).and_then(|s| self.ingest(s));
        if let Err(e) = &result {
            log::warn!("[{}] dropped inbound message: {e}", self.name);
            self.emit(ScopeEvent::new(EventKind::DATA_REJECTED, &self.name).with_detail(e.to_string()));
        }
        result
    }

    /// Would `bytes` decode to a sample older than the buffer tail?
    /// Hosts use this to spot the first message of a restarted run.
    pub fn is_stale_message(&self, bytes: &[u8]) -> bool {
        decode_sample(bytes, self.config.n_channels)
            .map(|s| self.buffer.is_stale(s.time))
            .unwrap_or(false)
    }

    /// Push an already decoded sample through filter, overrides and buffer.
    /// A rejected sample leaves every piece of state untouched.
    pub fn ingest(&mut self, mut sample: Sample) -> Result<()> {
        self.buffer.check(&sample)?;
        self.synapse.apply(&mut sample);
        self.overrides.apply(&mut sample.values);
        let time = sample.time;
        self.buffer.push(sample)?;
        self.emit(ScopeEvent::new(EventKind::DATA_UPDATED, &self.name).at(time));
        Ok(())
    }

    /// React to a clock signal from the simulation controller.
    pub fn handle_time_event(&mut self, event: TimeEvent, now: Instant) {
        match event {
            TimeEvent::Adjusted(t) => self.set_current_time(t),
            TimeEvent::Reset => self.on_reset(now),
        }
    }

    pub fn set_current_time(&mut self, t: f64) {
        self.sync.set_current_time(t);
        self.emit(ScopeEvent::new(EventKind::TIME_CHANGED, &self.name).at(t));
    }

    /// Simulation restarted: clear history, release every pin, queue resets.
    pub fn on_reset(&mut self, now: Instant) {
        self.buffer.reset();
        self.synapse.reset();
        self.sync.reset();
        self.overrides
            .unpin_all_and_reset(&self.config.start_values, &mut self.notifier, now);
        log::debug!("[{}] reset", self.name);
        self.emit(ScopeEvent::new(EventKind::RESET, &self.name).at(0.0));
    }

    // ── Redraw ──────────────────────────────────────────────────────────

    /// One redraw tick: derive the window from the clock, trim the buffer,
    /// and point the axes at the window. Latest-only components skip trimming
    /// and keep just the newest sample.
    pub fn tick(&mut self) {
        let now = self.sync.current_time();
        match self.sync.window_length() {
            Some(len) => {
                self.buffer.update(now, len);
                self.axes.set_time_range(now - len, now);
            }
            None => self.buffer.keep_latest(),
        }
    }

    pub fn get_shown_data(&self) -> ShownData {
        self.buffer.get_shown_data()
    }

    pub fn get_last_data(&self) -> Option<Vec<f64>> {
        self.buffer.get_last_data()
    }

    /// Has the stream caught up with the clock?
    pub fn is_at_end(&self) -> bool {
        self.buffer.is_at_end(self.sync.current_time())
    }

    /// Value to show for `channel`: the pinned value when fixed, the newest
    /// sample otherwise, the start value before any data.
    pub fn display_value(&self, channel: usize) -> Result<f64> {
        self.overrides.value(channel)
    }

    // ── Outbound ────────────────────────────────────────────────────────

    /// Pin `channel` to `value` and queue the edit.
    pub fn pin(&mut self, channel: usize, value: f64, now: Instant) -> Result<()> {
        self.overrides.pin(channel, value, &mut self.notifier, now)?;
        self.emit(ScopeEvent::new(EventKind::PINNED, &self.name).on_channel(channel));
        Ok(())
    }

    /// Interactive drag: pin `channel` and, in immediate mode, send the value
    /// straight away instead of queueing it.
    pub fn drag<T: Transport + ?Sized>(
        &mut self,
        channel: usize,
        value: f64,
        now: Instant,
        transport: &mut T,
    ) -> Result<()> {
        if !self.immediate {
            return self.pin(channel, value, now);
        }
        self.overrides.fix(channel, value)?;
        self.emit(ScopeEvent::new(EventKind::PINNED, &self.name).on_channel(channel));
        self.send_immediate(channel, value, transport)
    }

    fn send_immediate<T: Transport + ?Sized>(
        &mut self,
        channel: usize,
        value: f64,
        transport: &mut T,
    ) -> Result<()> {
        let result = self.notifier.send_value_immediate(channel, value, transport);
        if let Err(e) = &result {
            log::warn!("[{}] immediate send failed: {e}", self.name);
            self.emit(ScopeEvent::new(EventKind::SEND_FAILED, &self.name).on_channel(channel));
        }
        result
    }

    /// Hand `channel` back to the simulation.
    pub fn unpin(&mut self, channel: usize, now: Instant) -> Result<()> {
        self.overrides.unpin(channel, &mut self.notifier, now)?;
        self.emit(ScopeEvent::new(EventKind::UNPINNED, &self.name).on_channel(channel));
        Ok(())
    }

    /// Release every channel and restore the start values, as on a reset,
    /// without clearing the data.
    pub fn unpin_all(&mut self, now: Instant) {
        self.overrides
            .unpin_all_and_reset(&self.config.start_values, &mut self.notifier, now);
        self.emit(ScopeEvent::new(EventKind::UNPINNED, &self.name));
    }

    /// Give the notifier a chance to flush. Call every frame.
    pub fn poll_outbound<T: Transport + ?Sized>(
        &mut self,
        now: Instant,
        transport: &mut T,
    ) -> Result<Option<OutboundMessage>> {
        let result = self.notifier.poll(now, transport);
        if let Err(e) = &result {
            self.emit(ScopeEvent::new(EventKind::SEND_FAILED, &self.name).with_detail(e.to_string()));
        }
        result
    }
}
