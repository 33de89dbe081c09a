use std::time::Instant;

use egui::{Color32, Ui};
use egui_plot::{Line, Plot, Points};

use super::panel_trait::Panel;
use crate::component::StreamComponent;
use crate::data::selection::{SelectionState, XyTrace};
use crate::events::{EventKind, ScopeEvent};
use crate::sink::Transport;

/// One channel plotted against another over the visible window.
///
/// An out-of-range channel pick puts the panel into a placeholder state
/// instead of plotting; editing the indices back into range recovers it.
pub struct XyPanel {
    component: StreamComponent,
    trace: XyTrace,
    reported: SelectionState,
}

impl XyPanel {
    pub fn new(component: StreamComponent) -> Self {
        let trace = XyTrace::from_indices(&component.config().indices, component.n_channels());
        let mut panel = Self {
            reported: SelectionState::Valid,
            trace,
            component,
        };
        panel.report_state();
        panel
    }

    pub fn trace(&self) -> &XyTrace {
        &self.trace
    }

    /// Pick the plotted channel pair.
    pub fn set_indices(&mut self, x: usize, y: usize) -> SelectionState {
        self.trace.set_indices(x, y);
        self.report_state();
        self.trace.state()
    }

    fn report_state(&mut self) {
        let state = self.trace.state();
        if state == self.reported {
            return;
        }
        self.reported = state;
        let event = match state {
            SelectionState::Valid => ScopeEvent::new(EventKind::SELECTION_VALID, self.component.name()),
            SelectionState::Invalid { index, channels } => {
                ScopeEvent::new(EventKind::SELECTION_INVALID, self.component.name())
                    .on_channel(index)
                    .with_detail(format!("{channels} channels available"))
            }
        };
        self.component.emit(event);
    }

    fn render_selector(&mut self, ui: &mut Ui) {
        let (mut x, mut y) = self.trace.indices();
        let mut changed = false;
        ui.horizontal(|ui| {
            ui.label("x:");
            changed |= ui.add(egui::DragValue::new(&mut x).speed(0.1)).changed();
            ui.label("y:");
            changed |= ui.add(egui::DragValue::new(&mut y).speed(0.1)).changed();
        });
        if changed {
            self.set_indices(x, y);
        }
    }

    fn render_plot(&mut self, ui: &mut Ui) {
        let (lo, hi) = (self.component.config().min_value, self.component.config().max_value);
        let points = match self.trace.points(self.component.buffer()) {
            Ok(points) => points,
            Err(e) => {
                ui.colored_label(Color32::from_rgb(220, 60, 60), format!("Invalid dimensions selected ({e})"));
                return;
            }
        };
        let last = self.trace.last_point(self.component.buffer()).ok().flatten();

        Plot::new(self.component.name())
            .height(200.0)
            .data_aspect(1.0)
            .allow_scroll(false)
            .allow_zoom(false)
            .allow_drag(false)
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds_x(lo..=hi);
                plot_ui.set_plot_bounds_y(lo..=hi);
                plot_ui.line(Line::new("xy", points));
                if let Some(p) = last {
                    plot_ui.points(Points::new("latest", vec![p]).radius(3.0));
                }
            });
    }
}

impl Panel for XyPanel {
    fn title(&self) -> &str {
        self.component.name()
    }

    fn component(&self) -> &StreamComponent {
        &self.component
    }

    fn component_mut(&mut self) -> &mut StreamComponent {
        &mut self.component
    }

    fn render_panel(&mut self, ui: &mut Ui, _transport: &mut dyn Transport, _now: Instant) {
        self.render_selector(ui);
        self.render_plot(ui);
    }
}
