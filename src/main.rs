use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use token_dash::app::{App, InputMode};
use token_dash::config::Config;
use token_dash::ui::chart::ensure_chart_engine_initialized;
use token_dash::{logging, ui};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "token-dash")]
#[command(about = "Terminal dashboard for crypto token prices", long_about = None)]
struct Cli {
    /// Refresh interval in seconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Character budget for the displayed price
    #[arg(short = 'm', long)]
    max_length: Option<usize>,

    /// Live price endpoint returning partial ticker JSON
    #[arg(long)]
    feed_url: Option<String>,

    /// OHLCV endpoint returning an array of candles
    #[arg(long)]
    chart_url: Option<String>,

    /// Ignore any configured feed and use the simulated one
    #[arg(long)]
    simulate: bool,

    /// Directory for log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(interval) = self.interval.filter(|&i| i > 0) {
            config.refresh_interval_secs = interval;
        }
        if let Some(max_length) = self.max_length {
            config.max_price_length = max_length;
        }
        if let Some(url) = &self.feed_url {
            config.feed_url = Some(url.clone());
        }
        if let Some(url) = &self.chart_url {
            config.chart_url = Some(url.clone());
        }
        if self.simulate {
            config.feed_url = None;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_dir = match &cli.log_dir {
        Some(dir) => dir.clone(),
        None => logging::log_dir()?,
    };
    let _log_guard = logging::init_logging(&log_dir)?;

    let mut config = Config::load()?;
    cli.apply(&mut config);
    config.sanitize();
    info!(
        interval = config.refresh_interval_secs,
        feed = config.feed_url.as_deref().unwrap_or("simulated"),
        "starting token-dash"
    );

    ensure_chart_engine_initialized();
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        error!(error = %e, "exited with error");
        eprintln!("Error: {}", e);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let refresh_interval = Duration::from_secs(app.config.refresh_interval_secs);
    let mut last_refresh = Instant::now();

    app.reload_chart().await;
    app.refresh_ticker().await;

    loop {
        if last_refresh.elapsed() >= refresh_interval {
            app.refresh_ticker().await;
            last_refresh = Instant::now();
        }

        app.tick(Instant::now());
        terminal.draw(|frame| ui::draw(frame, app))?;

        // 100ms keeps the flash decay close to its deadline
        let timeout = Duration::from_millis(100);

        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match app.input_mode {
                InputMode::Normal => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Char('?') => app.show_help(),
                    KeyCode::Char('r') => {
                        app.refresh_ticker().await;
                        app.reload_chart().await;
                        last_refresh = Instant::now();
                    }
                    KeyCode::Char('c') => app.cycle_chart_type(),
                    KeyCode::Char('v') => app.toggle_volume(),
                    KeyCode::Char('n') => app.toggle_navigator(),
                    KeyCode::Left | KeyCode::Char('h') => app.pan_left(),
                    KeyCode::Right | KeyCode::Char('l') => app.pan_right(),
                    KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                    KeyCode::Char('-') => app.zoom_out(),
                    _ => {}
                },
                InputMode::Help => match key.code {
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') => app.close_help(),
                    _ => {}
                },
            }
        }
    }
}
