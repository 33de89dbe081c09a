//! Diagnostics bus for the widget layer.
//!
//! Components report what happened to their data (samples accepted or
//! rejected, resets, pins, selection problems, failed sends) through an
//! [`EventController`]. Each event carries a set of [`EventKind`] flags and
//! subscribers pick what they want with an [`EventFilter`]; an event is
//! delivered when `(event.kinds & filter) != 0`.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// ─────────────────────────────────────────────────────────────────────────────
// EventKind – bitflags
// ─────────────────────────────────────────────────────────────────────────────

/// Bitflags describing the categories an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind(pub u64);

impl EventKind {
    // ── Data ────────────────────────────────────────────────────────────
    /// A sample was accepted into a buffer.
    pub const DATA_UPDATED: Self = Self(1 << 0);
    /// An inbound message was dropped (out of order or malformed).
    pub const DATA_REJECTED: Self = Self(1 << 1);

    // ── Clock ───────────────────────────────────────────────────────────
    /// The simulation was reset; buffers were cleared.
    pub const RESET: Self = Self(1 << 2);
    /// The simulation time moved.
    pub const TIME_CHANGED: Self = Self(1 << 3);

    // ── Overrides ───────────────────────────────────────────────────────
    /// A channel was pinned to a user value.
    pub const PINNED: Self = Self(1 << 4);
    /// A channel was released back to the stream.
    pub const UNPINNED: Self = Self(1 << 5);

    // ── Selection ───────────────────────────────────────────────────────
    /// A consumer's channel selection became invalid.
    pub const SELECTION_INVALID: Self = Self(1 << 6);
    /// A consumer's channel selection became valid again.
    pub const SELECTION_VALID: Self = Self(1 << 7);

    // ── Outbound ────────────────────────────────────────────────────────
    /// An outbound message could not be handed to the transport.
    pub const SEND_FAILED: Self = Self(1 << 8);

    /// Wildcard: matches every event kind.
    pub const ALL: Self = Self(u64::MAX);

    /// Check whether `self` contains all bits in `other`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check whether `self` shares at least one bit with `other`.
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for EventKind {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "EMPTY");
        }
        if *self == EventKind::ALL {
            return write!(f, "ALL");
        }

        let pairs: &[(EventKind, &str)] = &[
            (EventKind::DATA_UPDATED, "DATA_UPDATED"),
            (EventKind::DATA_REJECTED, "DATA_REJECTED"),
            (EventKind::RESET, "RESET"),
            (EventKind::TIME_CHANGED, "TIME_CHANGED"),
            (EventKind::PINNED, "PINNED"),
            (EventKind::UNPINNED, "UNPINNED"),
            (EventKind::SELECTION_INVALID, "SELECTION_INVALID"),
            (EventKind::SELECTION_VALID, "SELECTION_VALID"),
            (EventKind::SEND_FAILED, "SEND_FAILED"),
        ];

        let mut names = Vec::new();
        let mut known_bits: u64 = 0;
        for (kind, name) in pairs {
            known_bits |= kind.0;
            if self.contains(*kind) {
                names.push((*name).to_string());
            }
        }
        let extra = self.0 & !known_bits;
        if extra != 0 {
            names.push(format!("0x{:x}", extra));
        }
        write!(f, "{}", names.join("|"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ScopeEvent
// ─────────────────────────────────────────────────────────────────────────────

/// One diagnostic occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeEvent {
    pub kinds: EventKind,
    /// Seconds since the controller was created (wall clock).
    pub timestamp: f64,
    /// Name of the component that raised the event.
    pub component: String,
    /// Simulation time the event refers to, where there is one.
    pub sim_time: Option<f64>,
    /// Channel the event refers to, where there is one.
    pub channel: Option<usize>,
    /// Human-readable detail, e.g. the rejection reason.
    pub detail: Option<String>,
}

impl ScopeEvent {
    pub fn new(kinds: EventKind, component: impl Into<String>) -> Self {
        Self {
            kinds,
            timestamp: 0.0, // set by the controller
            component: component.into(),
            sim_time: None,
            channel: None,
            detail: None,
        }
    }

    pub fn at(mut self, sim_time: f64) -> Self {
        self.sim_time = Some(sim_time);
        self
    }

    pub fn on_channel(mut self, channel: usize) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventFilter
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct EventFilter {
    pub mask: EventKind,
}

impl EventFilter {
    pub const fn all() -> Self {
        Self {
            mask: EventKind::ALL,
        }
    }

    pub const fn only(mask: EventKind) -> Self {
        Self { mask }
    }

    #[inline]
    pub fn matches(&self, event: &ScopeEvent) -> bool {
        event.kinds.intersects(self.mask)
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::all()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventController
// ─────────────────────────────────────────────────────────────────────────────

struct Subscriber {
    filter: EventFilter,
    sender: Sender<ScopeEvent>,
}

/// Fan-out point for [`ScopeEvent`]s. Cheap to clone; clones share subscribers.
#[derive(Clone)]
pub struct EventController {
    inner: Arc<Mutex<EventCtrlInner>>,
}

struct EventCtrlInner {
    subscribers: Vec<Subscriber>,
    start_instant: std::time::Instant,
}

impl EventController {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventCtrlInner {
                subscribers: Vec::new(),
                start_instant: std::time::Instant::now(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EventCtrlInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self, filter: EventFilter) -> Receiver<ScopeEvent> {
        let (tx, rx) = std::sync::mpsc::channel();
        self.lock().subscribers.push(Subscriber { filter, sender: tx });
        rx
    }

    pub fn subscribe_all(&self) -> Receiver<ScopeEvent> {
        self.subscribe(EventFilter::all())
    }

    /// Deliver `event` to every matching subscriber. Subscribers whose
    /// receiver is gone are dropped when a delivery to them fails.
    pub fn emit(&self, mut event: ScopeEvent) {
        let mut inner = self.lock();
        event.timestamp = inner.start_instant.elapsed().as_secs_f64();
        inner.subscribers.retain(|sub| {
            if sub.filter.matches(&event) {
                sub.sender.send(event.clone()).is_ok()
            } else {
                true
            }
        });
    }
}

impl Default for EventController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_combine_and_intersect() {
        let combined = EventKind::PINNED | EventKind::UNPINNED;
        assert!(combined.contains(EventKind::PINNED));
        assert!(combined.intersects(EventKind::UNPINNED));
        assert!(!EventKind::RESET.intersects(combined));
    }

    #[test]
    fn event_kind_display() {
        assert_eq!(EventKind(0).to_string(), "EMPTY");
        assert_eq!(EventKind::ALL.to_string(), "ALL");
        assert_eq!(
            (EventKind::DATA_REJECTED | EventKind::RESET).to_string(),
            "DATA_REJECTED|RESET"
        );
        assert_eq!(EventKind(1 << 40).to_string(), "0x10000000000");
    }

    #[test]
    fn controller_routes_by_filter() {
        let ctrl = EventController::new();
        let rx_all = ctrl.subscribe_all();
        let rx_rejects = ctrl.subscribe(EventFilter::only(EventKind::DATA_REJECTED));

        ctrl.emit(ScopeEvent::new(EventKind::PINNED, "slider").on_channel(1));
        ctrl.emit(ScopeEvent::new(EventKind::DATA_REJECTED, "value").with_detail("late"));

        assert_eq!(rx_all.try_iter().count(), 2);
        let got: Vec<_> = rx_rejects.try_iter().collect();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].detail.as_deref(), Some("late"));
        assert_eq!(got[0].component, "value");
    }

    #[test]
    fn dropped_subscriber_is_removed() {
        let ctrl = EventController::new();
        drop(ctrl.subscribe_all());
        ctrl.emit(ScopeEvent::new(EventKind::RESET, "value"));
        assert!(ctrl.lock().subscribers.is_empty());
    }
}
