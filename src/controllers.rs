//! Simulation clock shared between the data source and the widgets.
//!
//! The controller keeps the current simulation time and broadcasts the two
//! out-of-band signals every widget reacts to: a time adjustment and a reset.
//! Each widget subscribes and drains its receiver on its own redraw tick.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Out-of-band clock signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeEvent {
    /// The simulation clock moved to this time.
    Adjusted(f64),
    /// The simulation restarted at t = 0.
    Reset,
}

/// Controller to get/set the simulation time and subscribe to changes.
#[derive(Clone)]
pub struct SimController {
    pub(crate) inner: Arc<Mutex<SimCtrlInner>>,
}

pub(crate) struct SimCtrlInner {
    pub(crate) current_time: f64,
    pub(crate) listeners: Vec<Sender<TimeEvent>>,
}

impl SimCtrlInner {
    fn broadcast(&mut self, event: TimeEvent) {
        self.listeners.retain(|s| s.send(event).is_ok());
    }
}

impl Default for SimController {
    fn default() -> Self {
        Self::new()
    }
}

impl SimController {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SimCtrlInner {
                current_time: 0.0,
                listeners: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimCtrlInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Last time published by the simulation.
    pub fn current_time(&self) -> f64 {
        self.lock().current_time
    }

    /// Publish a new simulation time to all subscribers.
    pub fn set_time(&self, t: f64) {
        let mut inner = self.lock();
        inner.current_time = t;
        inner.broadcast(TimeEvent::Adjusted(t));
    }

    /// Signal a simulation restart: time goes back to 0 and subscribers get `Reset`.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.current_time = 0.0;
        inner.broadcast(TimeEvent::Reset);
        log::info!("simulation reset");
    }

    /// Subscribe to clock signals. Dropped receivers are pruned on the next broadcast.
    pub fn subscribe(&self) -> Receiver<TimeEvent> {
        let (tx, rx) = std::sync::mpsc::channel();
        self.lock().listeners.push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_see_adjust_and_reset_in_order() {
        let ctrl = SimController::new();
        let rx = ctrl.subscribe();
        ctrl.set_time(1.25);
        ctrl.reset();
        assert_eq!(rx.try_recv().unwrap(), TimeEvent::Adjusted(1.25));
        assert_eq!(rx.try_recv().unwrap(), TimeEvent::Reset);
        assert_eq!(ctrl.current_time(), 0.0);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let ctrl = SimController::new();
        let rx = ctrl.subscribe();
        let _keep = ctrl.subscribe();
        drop(rx);
        ctrl.set_time(0.1);
        assert_eq!(ctrl.subscriber_count(), 1);
    }
}
