pub mod panel_trait;
pub mod slider_ui;
pub mod value_ui;
pub mod xy_ui;

pub use panel_trait::Panel;
pub use slider_ui::SliderPanel;
pub use value_ui::ValuePanel;
pub use xy_ui::XyPanel;
