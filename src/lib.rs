//! Simscope crate root: re-exports and module wiring.
//!
//! Live visualization and control widgets for a running simulation. Each
//! widget owns a [`StreamComponent`]:
//! - `sink`: binary inbound wire format, text outbound messages, channels
//! - `data`: sample buffer, override reconciler, XY selection, synapse filter
//! - `notifier`: delay-paced outbound queue (`notifier_async` for tokio hosts)
//! - `axes`: clock-driven time window and axis labels
//! - `controllers`: the shared simulation clock
//! - `events`: diagnostics bus
//! - `panels` / `app`: egui widgets and the native window

pub mod app;
pub mod axes;
pub mod component;
pub mod config;
pub mod controllers;
pub mod data;
pub mod error;
pub mod events;
pub mod notifier;
#[cfg(feature = "tokio")]
pub mod notifier_async;
pub mod panels;
pub mod sink;

pub use app::{run_scope, ScopeApp};
pub use component::StreamComponent;
pub use config::{ComponentConfig, ComponentKind, LayoutFile, NamedComponent, NotifierConfig};
pub use controllers::{SimController, TimeEvent};
pub use data::buffer::{SampleBuffer, ShownData};
pub use data::overrides::{OverrideReconciler, OverrideState};
pub use data::sample::Sample;
pub use error::{Result, SimscopeError};
pub use events::{EventController, EventFilter, EventKind, ScopeEvent};
pub use notifier::{Notify, OutboundNotifier};
#[cfg(feature = "tokio")]
pub use notifier_async::AsyncNotifier;
pub use sink::{channel_stream, channel_transport, OutboundMessage, StreamSink, Transport};
