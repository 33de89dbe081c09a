use std::time::Instant;

use egui::Ui;

use crate::component::StreamComponent;
use crate::sink::Transport;

/// A widget drawn from one [`StreamComponent`].
///
/// Panels read the component's visible slice while rendering and route user
/// edits back through it; they never touch the buffer directly.
pub trait Panel {
    fn title(&self) -> &str;
    fn component(&self) -> &StreamComponent;
    fn component_mut(&mut self) -> &mut StreamComponent;

    fn render_panel(&mut self, ui: &mut Ui, transport: &mut dyn Transport, now: Instant);
}
