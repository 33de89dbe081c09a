use std::time::Instant;

use egui::{Color32, Ui};

use super::panel_trait::Panel;
use crate::component::StreamComponent;
use crate::sink::Transport;

/// One vertical slider per channel.
///
/// Sliders follow the stream until the user drags one; the dragged channel
/// is then pinned and its value sent to the simulation. "Reset" hands a
/// channel back.
pub struct SliderPanel {
    component: StreamComponent,
}

impl SliderPanel {
    pub fn new(component: StreamComponent) -> Self {
        Self { component }
    }

    fn render_sliders(&mut self, ui: &mut Ui, transport: &mut dyn Transport, now: Instant) {
        let (lo, hi) = (self.component.config().min_value, self.component.config().max_value);
        let n = self.component.n_channels();

        ui.horizontal(|ui| {
            for c in 0..n {
                let Ok(mut value) = self.component.display_value(c) else {
                    continue;
                };
                let pinned = self.component.overrides().is_fixed(c);
                ui.vertical(|ui| {
                    let resp = ui.add(
                        egui::Slider::new(&mut value, lo..=hi)
                            .vertical()
                            .show_value(true),
                    );
                    if resp.changed() {
                        if let Err(e) = self.component.drag(c, value, now, &mut *transport) {
                            log::warn!("[{}] slider {c}: {e}", self.component.name());
                        }
                    }
                    if pinned {
                        ui.colored_label(Color32::from_rgb(80, 160, 255), "pinned");
                        if ui.small_button("Reset").clicked() {
                            if let Err(e) = self.component.unpin(c, now) {
                                log::warn!("[{}] unpin {c}: {e}", self.component.name());
                            }
                        }
                    } else {
                        ui.weak(format!("ch {c}"));
                    }
                });
            }
        });

        ui.horizontal(|ui| {
            let any = self.component.overrides().any_fixed();
            if ui.add_enabled(any, egui::Button::new("Reset all")).clicked() {
                self.component.unpin_all(now);
            }
            let pending = self.component.notifier().pending();
            if pending > 0 {
                ui.weak(format!("{pending} queued"));
            }
        });
    }
}

impl Panel for SliderPanel {
    fn title(&self) -> &str {
        self.component.name()
    }

    fn component(&self) -> &StreamComponent {
        &self.component
    }

    fn component_mut(&mut self) -> &mut StreamComponent {
        &mut self.component
    }

    fn render_panel(&mut self, ui: &mut Ui, transport: &mut dyn Transport, now: Instant) {
        self.render_sliders(ui, transport, now);
    }
}
