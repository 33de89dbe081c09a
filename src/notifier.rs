//! Single-flight, delay-paced delivery of user edits back to the simulation.
//!
//! Messages are queued in call order and sent one at a time, at least
//! `delay` apart. The first message into an empty queue waits `delay` too.
//! Nothing is merged or dropped: two edits of the same channel are both sent.
//!
//! The notifier does not own a timer. The host calls [`OutboundNotifier::poll`]
//! from its frame loop (or a timer) and the notifier flushes when the
//! scheduled instant has passed.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::NotifierConfig;
use crate::error::Result;
use crate::sink::{OutboundMessage, Transport};

/// Gap between queued transmissions unless configured otherwise.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(50);

/// Anything that accepts outbound messages for later delivery.
pub trait Notify {
    fn notify(&mut self, message: OutboundMessage, now: Instant);
}

pub struct OutboundNotifier {
    queue: VecDeque<OutboundMessage>,
    delay: Duration,
    next_flush: Option<Instant>,
    sent: u64,
}

impl Default for OutboundNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl OutboundNotifier {
    pub fn new(delay: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            delay,
            next_flush: None,
            sent: 0,
        }
    }

    pub fn from_config(cfg: &NotifierConfig) -> Self {
        Self::new(cfg.delay())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Messages waiting to be sent.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn queued(&self) -> impl Iterator<Item = &OutboundMessage> {
        self.queue.iter()
    }

    /// When the next flush is due, if anything is queued.
    pub fn next_flush(&self) -> Option<Instant> {
        self.next_flush
    }

    /// Total messages handed to a transport, immediate sends included.
    pub fn sent_count(&self) -> u64 {
        self.sent
    }

    /// Queue `message`. Arming the timer only happens on the empty → one
    /// transition; later messages ride on the already scheduled flush.
    pub fn notify(&mut self, message: OutboundMessage, now: Instant) {
        self.queue.push_back(message);
        if self.queue.len() == 1 {
            self.next_flush = Some(now + self.delay);
        }
    }

    /// Send the head of the queue now and, if more is waiting, schedule the
    /// next flush `delay` after `now`.
    ///
    /// On a transport error the message stays at the head and is retried on
    /// the next scheduled flush.
    pub fn flush<T: Transport + ?Sized>(
        &mut self,
        now: Instant,
        transport: &mut T,
    ) -> Result<Option<OutboundMessage>> {
        let Some(message) = self.queue.front().copied() else {
            self.next_flush = None;
            return Ok(None);
        };
        if let Err(e) = transport.send_text(&message.to_string()) {
            log::warn!("outbound send of {message} failed, will retry: {e}");
            self.next_flush = Some(now + self.delay);
            return Err(e);
        }
        self.queue.pop_front();
        self.sent += 1;
        self.next_flush = if self.queue.is_empty() {
            None
        } else {
            Some(now + self.delay)
        };
        Ok(Some(message))
    }

    /// Flush if the scheduled instant has been reached. Sends at most one
    /// message per call, so a late poll never bunches transmissions together.
    pub fn poll<T: Transport + ?Sized>(
        &mut self,
        now: Instant,
        transport: &mut T,
    ) -> Result<Option<OutboundMessage>> {
        match self.next_flush {
            Some(due) if now >= due => self.flush(now, transport),
            _ => Ok(None),
        }
    }

    /// Bypass the queue: send `channel,value` right away.
    pub fn send_value_immediate<T: Transport + ?Sized>(
        &mut self,
        channel: usize,
        value: f64,
        transport: &mut T,
    ) -> Result<()> {
        let message = OutboundMessage::Value { channel, value };
        transport.send_text(&message.to_string())?;
        self.sent += 1;
        Ok(())
    }
}

impl Notify for OutboundNotifier {
    fn notify(&mut self, message: OutboundMessage, now: Instant) {
        OutboundNotifier::notify(self, message, now);
    }
}
