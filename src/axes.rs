//! Time axes: window bookkeeping, value→pixel scales and the start/end time
//! labels shown under a plot.

/// Below this plot width (in points) the start/end time labels overlap and are hidden.
pub const MIN_LABEL_WIDTH: f32 = 150.0;

/// Linear map from a data domain to a pixel range.
///
/// Consumers rely on three things: `map(domain.0) == range.0`,
/// `map(domain.1) == range.1`, and linear interpolation in between (values
/// outside the domain extrapolate). A zero-width domain maps everything to
/// `range.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, v: f64) -> f64 {
        let span = self.domain.1 - self.domain.0;
        if span == 0.0 {
            return self.range.0;
        }
        let f = (v - self.domain.0) / span;
        self.range.0 + f * (self.range.1 - self.range.0)
    }

    pub fn invert(&self, px: f64) -> f64 {
        let span = self.range.1 - self.range.0;
        if span == 0.0 {
            return self.domain.0;
        }
        let f = (px - self.range.0) / span;
        self.domain.0 + f * (self.domain.1 - self.domain.0)
    }
}

/// Tracks the simulation clock for one widget and derives its window.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSync {
    current_time: f64,
    /// `None` for widgets that only show the latest value.
    window_length: Option<f64>,
}

impl TimeSync {
    pub fn new(window_length: Option<f64>) -> Self {
        Self {
            current_time: 0.0,
            window_length,
        }
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn set_current_time(&mut self, t: f64) {
        self.current_time = t;
    }

    pub fn window_length(&self) -> Option<f64> {
        self.window_length
    }

    pub fn set_window_length(&mut self, len: Option<f64>) {
        self.window_length = len.filter(|l| *l > 0.0);
    }

    /// `(start, end)` of the visible interval, if this widget has one.
    pub fn window(&self) -> Option<(f64, f64)> {
        self.window_length
            .map(|len| (self.current_time - len, self.current_time))
    }

    pub fn reset(&mut self) {
        self.current_time = 0.0;
    }
}

/// Scales plus the textual time labels for one plot.
#[derive(Debug, Clone)]
pub struct TimeAxes {
    pub scale_x: LinearScale,
    pub scale_y: LinearScale,
    display_time: bool,
    width: f32,
    height: f32,
    start_label: String,
    end_label: String,
}

impl TimeAxes {
    pub fn new(min_value: f64, max_value: f64, display_time: bool) -> Self {
        Self {
            scale_x: LinearScale::new((0.0, 1.0), (0.0, 0.0)),
            scale_y: LinearScale::new((min_value, max_value), (0.0, 0.0)),
            display_time,
            width: 0.0,
            height: 0.0,
            start_label: String::new(),
            end_label: String::new(),
        }
    }

    /// New plot area size. Screen y grows downwards, so `min_value` maps to the bottom.
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.scale_x.range = (0.0, f64::from(width));
        self.scale_y.range = (f64::from(height), 0.0);
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn set_value_range(&mut self, min_value: f64, max_value: f64) {
        self.scale_y.domain = (min_value, max_value);
    }

    pub fn set_display_time(&mut self, on: bool) {
        self.display_time = on;
    }

    /// Point the x scale at `[start, end]` and refresh the labels.
    pub fn set_time_range(&mut self, start: f64, end: f64) {
        self.scale_x.domain = (start, end);
        self.start_label = format!("{start:.3}");
        self.end_label = format!("{end:.3}");
    }

    pub fn time_range(&self) -> (f64, f64) {
        self.scale_x.domain
    }

    pub fn labels_visible(&self) -> bool {
        self.display_time && self.width >= MIN_LABEL_WIDTH
    }

    /// `(start, end)` label text, or `None` while labels are hidden.
    pub fn labels(&self) -> Option<(&str, &str)> {
        self.labels_visible()
            .then(|| (self.start_label.as_str(), self.end_label.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_maps_endpoints_and_inverts() {
        let s = LinearScale::new((1.0, 2.0), (0.0, 200.0));
        assert_eq!(s.map(1.0), 0.0);
        assert_eq!(s.map(2.0), 200.0);
        assert_eq!(s.map(1.5), 100.0);
        assert_eq!(s.invert(100.0), 1.5);
    }

    #[test]
    fn degenerate_domain_maps_to_range_start() {
        let s = LinearScale::new((1.0, 1.0), (5.0, 10.0));
        assert_eq!(s.map(3.0), 5.0);
    }

    #[test]
    fn y_axis_is_flipped() {
        let mut axes = TimeAxes::new(-1.0, 1.0, true);
        axes.set_size(300.0, 100.0);
        assert_eq!(axes.scale_y.map(-1.0), 100.0);
        assert_eq!(axes.scale_y.map(1.0), 0.0);
    }

    #[test]
    fn labels_use_three_decimals() {
        let mut axes = TimeAxes::new(-1.0, 1.0, true);
        axes.set_size(300.0, 100.0);
        axes.set_time_range(1.5, 2.0);
        assert_eq!(axes.labels(), Some(("1.500", "2.000")));
    }

    #[test]
    fn narrow_plot_hides_labels() {
        let mut axes = TimeAxes::new(-1.0, 1.0, true);
        axes.set_time_range(0.0, 1.0);
        axes.set_size(MIN_LABEL_WIDTH - 1.0, 100.0);
        assert_eq!(axes.labels(), None);
        axes.set_size(MIN_LABEL_WIDTH, 100.0);
        assert!(axes.labels().is_some());
    }

    #[test]
    fn display_time_off_hides_labels() {
        let mut axes = TimeAxes::new(-1.0, 1.0, false);
        axes.set_size(800.0, 100.0);
        assert!(!axes.labels_visible());
    }

    #[test]
    fn window_follows_clock() {
        let mut sync = TimeSync::new(Some(1.0));
        sync.set_current_time(2.5);
        assert_eq!(sync.window(), Some((1.5, 2.5)));
        assert_eq!(TimeSync::new(None).window(), None);
    }
}
