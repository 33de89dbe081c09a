use std::time::Instant;

use egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot};

use super::panel_trait::Panel;
use crate::component::StreamComponent;
use crate::sink::Transport;

/// Rolling line chart: every channel against simulation time over the window.
pub struct ValuePanel {
    component: StreamComponent,
    plot_height: f32,
}

impl ValuePanel {
    pub fn new(component: StreamComponent) -> Self {
        Self {
            component,
            plot_height: 180.0,
        }
    }

    pub fn with_height(mut self, height: f32) -> Self {
        self.plot_height = height;
        self
    }

    fn render_plot(&mut self, ui: &mut Ui) {
        let comp = &self.component;
        let shown = comp.get_shown_data();
        let (t0, t1) = comp.axes().time_range();
        let (y0, y1) = (comp.config().min_value, comp.config().max_value);
        let lagging = !comp.is_at_end() && !comp.buffer().is_empty();

        let plot = Plot::new(comp.name())
            .height(self.plot_height)
            .allow_scroll(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_boxed_zoom(false)
            .show_axes([false, true])
            .legend(Legend::default());

        let resp = plot.show(ui, |plot_ui| {
            plot_ui.set_plot_bounds_x(t0..=t1);
            plot_ui.set_plot_bounds_y(y0..=y1);
            for c in 0..shown.channels.len() {
                if let Some(points) = shown.points(c) {
                    plot_ui.line(Line::new(format!("ch {c}"), points).width(1.5));
                }
            }
        });

        let rect = resp.response.rect;
        self.component.axes_mut().set_size(rect.width(), rect.height());

        ui.horizontal(|ui| {
            if let Some((start, end)) = self.component.axes().labels() {
                ui.monospace(start);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.monospace(end);
                });
            }
        });
        if lagging {
            ui.colored_label(Color32::from_rgb(200, 140, 0), "stream is behind the simulation clock");
        }
    }
}

impl Panel for ValuePanel {
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
        self.render_plot(ui);
    }
}
