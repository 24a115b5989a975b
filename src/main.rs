use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tokio::runtime::Handle;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use co2watch::data::clock;
use co2watch::ui::{self, Theme};
use co2watch::{
    events, App, HistoryLoader, HttpSource, LiveDisplay, LivePoller, Overrides, PollerConfig,
    ReadingSource, Settings, View,
};

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "co2watch=info";

#[derive(Parser, Debug)]
#[command(name = "co2watch")]
#[command(about = "Terminal dashboard for a networked CO2 sensor")]
struct Args {
    /// Gateway endpoint serving the readings array
    #[arg(short, long)]
    gateway: Option<String>,

    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds between live fetches
    #[arg(short, long)]
    interval: Option<u64>,

    /// Request timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// History record count (2, 5, 10, 20, 30, 50, 75 or 100)
    #[arg(short = 'n', long)]
    records: Option<usize>,

    /// Append logs to this file (the TUI logs nothing otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log live readings to stderr instead of starting the TUI
    #[arg(long)]
    headless: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            gateway_url: self.gateway.clone(),
            poll_interval_secs: self.interval,
            request_timeout_secs: self.timeout,
            history_records: self.records,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    // Must run before the runtime spawns worker threads.
    let offset = clock::local_offset();

    let settings = Settings::load(args.config.as_deref(), &args.overrides())?;
    info!("Using {}", settings.gateway_url);

    let source: Arc<dyn ReadingSource> = Arc::new(
        HttpSource::builder()
            .gateway(settings.gateway()?)
            .timeout(settings.request_timeout())
            .epoch(settings.sensor_epoch)
            .build()?,
    );

    let rt = tokio::runtime::Runtime::new()?;

    if args.headless {
        return rt.block_on(run_headless(source, settings.poller_config()));
    }

    let history = Arc::new(HistoryLoader::new(
        Arc::clone(&source),
        settings.series_options(offset),
        settings.record_count(),
    ));

    run_tui(source, settings.poller_config(), history, rt.handle().clone())
}

/// Headless mode logs to stderr; the TUI logs only when given a file.
fn init_logging(args: &Args) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if let Some(ref path) = args.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if args.headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }

    Ok(())
}

/// Run the live poller without a UI until Ctrl+C, logging every reading.
async fn run_headless(source: Arc<dyn ReadingSource>, config: PollerConfig) -> Result<()> {
    let poller = LivePoller::spawn(source, config);
    let mut updates = poller.subscribe();
    let mut last_seen: Option<(Option<time::OffsetDateTime>, Option<String>, u32)> = None;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    warn!("Poller exited");
                    break;
                }
                let state = updates.borrow_and_update().clone();
                let key = (
                    state.last_updated_at,
                    state.last_fetch_error.clone(),
                    state.consecutive_failures,
                );
                if last_seen.as_ref() == Some(&key) {
                    continue;
                }
                last_seen = Some(key);

                match state.display() {
                    LiveDisplay::Error(message) => error!("{}", message),
                    LiveDisplay::Loading => {}
                    LiveDisplay::Reading { reading, status } => {
                        info!("CO2 {} ppm: {}", reading.ppm(), status.label())
                    }
                }
            }
        }
    }

    poller.shutdown().await;
    Ok(())
}

/// Run the TUI
fn run_tui(
    source: Arc<dyn ReadingSource>,
    poller_config: PollerConfig,
    history: Arc<HistoryLoader>,
    runtime: Handle,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let mut app = App::new(source, poller_config, history, runtime, Theme::auto_detect());

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 50;
    const MIN_HEIGHT: u16 = 16;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let top = (area.height / 2).saturating_sub(2);
                let centered = ratatui::layout::Rect::new(0, top, area.width, 5.min(area.height));
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(12),   // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Live => ui::live::render(frame, app, chunks[2]),
                View::History => ui::history::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Short timeout so poller and loader updates show up promptly
        if let Some(Event::Key(key)) = events::poll_event(Duration::from_millis(100))? {
            events::handle_key_event(app, key);
        }
    }

    Ok(())
}
