//! Configuration consumed by the streaming components, and a small layout
//! file format (JSON or YAML, picked by extension) to describe a set of them.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimscopeError};

// ─────────────────────────────────────────────────────────────────────────────
// ComponentConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Per-widget settings read once at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentConfig {
    /// Number of channels in every sample (not counting the timestamp).
    pub n_channels: usize,
    /// Lower end of the displayed value range.
    pub min_value: f64,
    /// Upper end of the displayed value range.
    pub max_value: f64,
    /// Value shown for each channel before data arrives and after a reset.
    pub start_values: Vec<f64>,
    /// Channels picked for display (XY traces use the first two).
    pub indices: Vec<usize>,
    /// Length of the visible history in seconds.
    pub window_length: f64,
    /// Show the start/end time labels under the plot.
    pub display_time: bool,
    /// Low-pass time constant in seconds applied to inbound samples.
    pub synapse: Option<f64>,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self::with_channels(1)
    }
}

impl ComponentConfig {
    /// Defaults for an `n`-channel widget.
    pub fn with_channels(n: usize) -> Self {
        Self {
            n_channels: n,
            min_value: -1.0,
            max_value: 1.0,
            start_values: vec![0.0; n],
            indices: (0..n.min(2)).collect(),
            window_length: 0.5,
            display_time: true,
            synapse: None,
        }
    }

    /// Reject settings no widget can work with.
    ///
    /// Out-of-range `indices` are deliberately accepted here: they put the
    /// consuming widget into its invalid-selection state at runtime instead.
    pub fn validate(&self) -> Result<()> {
        if self.n_channels == 0 {
            return Err(SimscopeError::Config("n_channels must be at least 1".into()));
        }
        if !(self.min_value < self.max_value) {
            return Err(SimscopeError::Config(format!(
                "min_value ({}) must be below max_value ({})",
                self.min_value, self.max_value
            )));
        }
        if !(self.window_length > 0.0) {
            return Err(SimscopeError::Config(format!(
                "window_length must be positive, got {}",
                self.window_length
            )));
        }
        if self.start_values.len() != self.n_channels {
            return Err(SimscopeError::Config(format!(
                "expected {} start values, got {}",
                self.n_channels,
                self.start_values.len()
            )));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NotifierConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Outbound pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Gap between queued transmissions, in milliseconds.
    pub delay_ms: u64,
    /// Send drag updates straight away instead of through the queue.
    pub immediate: bool,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            delay_ms: 50,
            immediate: false,
        }
    }
}

impl NotifierConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Layout file
// ─────────────────────────────────────────────────────────────────────────────

/// Which widget renders a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Value,
    Xy,
    Slider,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedComponent {
    pub name: String,
    pub kind: ComponentKind,
    #[serde(default)]
    pub config: ComponentConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

/// A saved set of components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutFile {
    pub components: Vec<NamedComponent>,
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

impl LayoutFile {
    /// Load from `path`; `.yaml`/`.yml` is read as YAML, anything else as JSON.
    /// Every component config is validated.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let layout: LayoutFile = if is_yaml(path) {
            serde_yaml::from_str(&text)?
        } else {
            serde_json::from_str(&text)?
        };
        for c in &layout.components {
            c.config.validate().map_err(|e| {
                SimscopeError::Config(format!("component {:?}: {e}", c.name))
            })?;
        }
        log::debug!("loaded {} components from {:?}", layout.components.len(), path);
        Ok(layout)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = if is_yaml(path) {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        std::fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        ComponentConfig::default().validate().unwrap();
        ComponentConfig::with_channels(3).validate().unwrap();
    }

    #[test]
    fn default_indices_clip_to_channel_count() {
        assert_eq!(ComponentConfig::with_channels(1).indices, vec![0]);
        assert_eq!(ComponentConfig::with_channels(5).indices, vec![0, 1]);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut cfg = ComponentConfig::with_channels(2);
        cfg.min_value = 2.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn start_value_count_must_match() {
        let mut cfg = ComponentConfig::with_channels(2);
        cfg.start_values.pop();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn out_of_range_indices_pass_validation() {
        let mut cfg = ComponentConfig::with_channels(3);
        cfg.indices = vec![4, 1];
        cfg.validate().unwrap();
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: ComponentConfig = serde_json::from_str(r#"{"window_length": 2.0}"#).unwrap();
        assert_eq!(cfg.window_length, 2.0);
        assert_eq!(cfg.n_channels, 1);
        assert!(cfg.display_time);
    }
}
