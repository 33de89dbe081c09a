//! Demo binary: a simulated multi-channel source feeding a line chart, an XY
//! trace and a slider group. Dragging a slider pins that input in the
//! simulation until it is reset.

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use simscope::panels::{Panel, SliderPanel, ValuePanel, XyPanel};
use simscope::{
    channel_stream, channel_transport, run_scope, ComponentConfig, ComponentKind, EventController,
    EventFilter, EventKind, LayoutFile, NamedComponent, NotifierConfig, OutboundMessage, ScopeApp,
    SimController, StreamComponent, StreamSink,
};

#[derive(Parser, Debug)]
#[command(name = "simscope", version, about = "Live plots and controls for a running simulation")]
struct Args {
    /// Number of simulated channels.
    #[arg(long, default_value_t = 3)]
    channels: usize,

    /// Visible history in seconds.
    #[arg(long, default_value_t = 2.0)]
    window: f64,

    /// Simulation ticks per second.
    #[arg(long, default_value_t = 200.0)]
    rate_hz: f64,

    /// Gap between queued outbound messages, in milliseconds.
    #[arg(long, default_value_t = 50)]
    delay_ms: u64,

    /// Send slider drags straight away instead of through the queue.
    #[arg(long)]
    immediate: bool,

    /// Load the widget layout from a JSON or YAML file.
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Write the effective layout to this file before opening the window.
    #[arg(long)]
    save_layout: Option<PathBuf>,

    /// Restart the simulation every this many seconds.
    #[arg(long)]
    reset_after: Option<f64>,
}

fn default_layout(args: &Args) -> LayoutFile {
    let mut cfg = ComponentConfig::with_channels(args.channels);
    cfg.window_length = args.window;
    let notifier = NotifierConfig {
        delay_ms: args.delay_ms,
        immediate: args.immediate,
    };
    let component = |name: &str, kind| NamedComponent {
        name: name.to_string(),
        kind,
        config: cfg.clone(),
        notifier: notifier.clone(),
    };
    LayoutFile {
        components: vec![
            component("signals", ComponentKind::Value),
            component("phase", ComponentKind::Xy),
            component("inputs", ComponentKind::Slider),
        ],
    }
}

fn build_panel(entry: &NamedComponent, events: &EventController) -> Result<Box<dyn Panel>> {
    let comp = match entry.kind {
        ComponentKind::Slider => {
            StreamComponent::latest_only(&entry.name, entry.config.clone(), &entry.notifier)
        }
        ComponentKind::Value | ComponentKind::Xy => {
            StreamComponent::new(&entry.name, entry.config.clone(), &entry.notifier)
        }
    }
    .with_context(|| format!("building component {:?}", entry.name))?
    .with_events(events.clone());

    let panel: Box<dyn Panel> = match entry.kind {
        ComponentKind::Value => Box::new(ValuePanel::new(comp)),
        ComponentKind::Xy => Box::new(XyPanel::new(comp)),
        ComponentKind::Slider => Box::new(SliderPanel::new(comp)),
    };
    Ok(panel)
}

/// A stream target inside the simulated source.
struct Feed {
    sink: StreamSink,
    n_channels: usize,
    commands: Receiver<String>,
}

/// Sine sources whose values can be overridden through outbound messages.
struct SimulatedSource {
    feeds: Vec<Feed>,
    clock: SimController,
    overrides: Vec<Option<f64>>,
    dt: f64,
    reset_after: Option<f64>,
}

impl SimulatedSource {
    fn channel_value(&self, c: usize, t: f64) -> f64 {
        if let Some(Some(v)) = self.overrides.get(c) {
            return *v;
        }
        let freq = 0.5 + 0.25 * c as f64;
        0.8 * (2.0 * std::f64::consts::PI * freq * t).sin()
    }

    fn apply_commands(&mut self) {
        for feed in &self.feeds {
            while let Ok(text) = feed.commands.try_recv() {
                match text.parse::<OutboundMessage>() {
                    Ok(OutboundMessage::Value { channel, value }) => {
                        if let Some(slot) = self.overrides.get_mut(channel) {
                            *slot = Some(value);
                        }
                    }
                    Ok(OutboundMessage::Reset { channel }) => {
                        if let Some(slot) = self.overrides.get_mut(channel) {
                            *slot = None;
                        }
                    }
                    Err(e) => log::warn!("simulation ignored {text:?}: {e}"),
                }
            }
        }
    }

    fn run(mut self) {
        let mut t = 0.0f64;
        loop {
            self.apply_commands();

            let n = self.feeds.iter().map(|f| f.n_channels).max().unwrap_or(0);
            let row: Vec<f32> = (0..n).map(|c| self.channel_value(c, t) as f32).collect();
            self.feeds
                .retain(|f| f.sink.send_sample(t as f32, &row[..f.n_channels]).is_ok());
            if self.feeds.is_empty() {
                log::info!("all widgets closed, stopping simulation");
                return;
            }
            self.clock.set_time(t);

            thread::sleep(Duration::from_secs_f64(self.dt));
            t += self.dt;
            if self.reset_after.is_some_and(|period| t >= period) {
                t = 0.0;
                self.overrides.iter_mut().for_each(|o| *o = None);
                self.clock.reset();
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let layout = match &args.layout {
        Some(path) => LayoutFile::load(path)
            .with_context(|| format!("loading layout {}", path.display()))?,
        None => default_layout(&args),
    };
    if let Some(path) = &args.save_layout {
        layout
            .save(path)
            .with_context(|| format!("saving layout {}", path.display()))?;
        log::info!("layout written to {}", path.display());
    }
    anyhow::ensure!(args.rate_hz > 0.0, "--rate-hz must be positive");

    let clock = SimController::new();
    let events = EventController::new();
    let diagnostics = events.subscribe(EventFilter::only(
        EventKind::SELECTION_INVALID | EventKind::SELECTION_VALID | EventKind::SEND_FAILED,
    ));
    thread::spawn(move || {
        for event in diagnostics {
            log::info!("{} [{}] {:?}", event.kinds, event.component, event.detail);
        }
    });

    let mut app = ScopeApp::new("simscope");
    let mut feeds = Vec::new();
    for entry in &layout.components {
        let panel = build_panel(entry, &events)?;
        let (sink, inbound) = channel_stream();
        let (transport, commands) = channel_transport();
        app.add_panel(panel, inbound, clock.subscribe(), Box::new(transport));
        feeds.push(Feed {
            sink,
            n_channels: entry.config.n_channels,
            commands,
        });
    }

    let max_channels = feeds.iter().map(|f| f.n_channels).max().unwrap_or(0);
    let source = SimulatedSource {
        feeds,
        clock,
        overrides: vec![None; max_channels],
        dt: 1.0 / args.rate_hz,
        reset_after: args.reset_after,
    };
    log::info!(
        "starting simulation: {} widgets, {max_channels} channels, {} Hz",
        layout.components.len(),
        args.rate_hz
    );
    thread::spawn(move || source.run());

    run_scope(app).map_err(|e| anyhow::anyhow!("window failed: {e}"))
}
