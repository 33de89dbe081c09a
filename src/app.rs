//! Native window hosting a column of widgets.
//!
//! Every frame runs [`ScopeApp::step`] first (the data-only pass) and then
//! draws. Data and clock signals travel on separate channels, so the data
//! pass holds clock signals back while it drains the inbound stream: samples
//! from before a reset are ingested first and then cleared by it, and the
//! first sample older than the tail releases every signal up to the pending
//! reset so the restarted run is accepted.

use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::controllers::TimeEvent;
use crate::panels::Panel;
use crate::sink::Transport;

/// Repaint cadence while data is streaming.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

struct PanelSlot {
    panel: Box<dyn Panel>,
    inbound: Receiver<Vec<u8>>,
    clock: Receiver<TimeEvent>,
    transport: Box<dyn Transport>,
}

impl PanelSlot {
    fn step(&mut self, now: Instant) {
        let comp = self.panel.component_mut();
        let mut pending: VecDeque<TimeEvent> = self.clock.try_iter().collect();
        while let Ok(bytes) = self.inbound.try_recv() {
            if comp.is_stale_message(&bytes) {
                // The reset was broadcast before this sample was sent.
                pending.extend(self.clock.try_iter());
                if let Some(pos) = pending.iter().position(|e| *e == TimeEvent::Reset) {
                    for event in pending.drain(..=pos) {
                        comp.handle_time_event(event, now);
                    }
                }
            }
            // Rejected messages are logged and reported by the component.
            comp.on_message(&bytes).ok();
        }
        pending.extend(self.clock.try_iter());
        for event in pending {
            comp.handle_time_event(event, now);
        }
        comp.tick();
        if let Ok(Some(message)) = comp.poll_outbound(now, self.transport.as_mut()) {
            log::debug!("[{}] sent {message}", comp.name());
        }
    }
}

pub struct ScopeApp {
    title: String,
    slots: Vec<PanelSlot>,
}

impl ScopeApp {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slots: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Add a widget fed by `inbound`, clocked by `clock`, and talking back
    /// through `transport`.
    pub fn add_panel(
        &mut self,
        panel: Box<dyn Panel>,
        inbound: Receiver<Vec<u8>>,
        clock: Receiver<TimeEvent>,
        transport: Box<dyn Transport>,
    ) {
        log::info!("adding panel {}", panel.title());
        self.slots.push(PanelSlot {
            panel,
            inbound,
            clock,
            transport,
        });
    }

    pub fn panels(&self) -> impl Iterator<Item = &dyn Panel> {
        self.slots.iter().map(|s| s.panel.as_ref())
    }

    pub fn panel_mut(&mut self, index: usize) -> Option<&mut (dyn Panel + 'static)> {
        self.slots.get_mut(index).map(|s| s.panel.as_mut())
    }

    /// Data-only pass: ingest, apply clock signals, trim, flush outbound.
    pub fn step(&mut self, now: Instant) {
        for slot in self.slots.iter_mut() {
            slot.step(now);
        }
    }
}

impl eframe::App for ScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.step(now);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                for slot in self.slots.iter_mut() {
                    ui.group(|ui| {
                        ui.heading(slot.panel.title().to_string());
                        slot.panel.render_panel(ui, slot.transport.as_mut(), now);
                    });
                    ui.add_space(6.0);
                }
            });
        });

        ctx.request_repaint_after(FRAME_INTERVAL);
    }
}

/// Open a native window for `app`. Blocks until the window is closed.
pub fn run_scope(app: ScopeApp) -> eframe::Result<()> {
    let title = app.title.clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size(egui::vec2(900.0, 700.0)),
        ..Default::default()
    };
    eframe::run_native(&title, options, Box::new(|_cc| Ok(Box::new(app))))
}
