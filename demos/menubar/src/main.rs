//! Menu bar - the xwidget four-button demo
//!
//! Opens a window with File / Edit / Help / About buttons. Hovering a
//! button highlights it, presses and releases are logged.
//!
//! Backends:
//! - `x11` (default): a real window on `$DISPLAY` or `--display`
//! - `terminal`: the same buttons drawn in character cells, mouse driven
//!
//! Quit: close the window (X11), or q / Esc / Ctrl-C (terminal)

use std::error::Error;
use std::fs::File;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{Parser, ValueEnum};
use crossterm::{
    cursor::Show,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use xwidget::backend::terminal::{Screen, TerminalEvents, TerminalSurface};
use xwidget::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendKind {
    /// Draw into an X11 window
    X11,
    /// Draw into the current terminal
    Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HitRegionArg {
    /// Hit-test the rectangle each button was built with
    Nominal,
    /// Hit-test the box actually painted around each label
    Rendered,
}

impl From<HitRegionArg> for HitRegion {
    fn from(arg: HitRegionArg) -> Self {
        match arg {
            HitRegionArg::Nominal => HitRegion::Nominal,
            HitRegionArg::Rendered => HitRegion::Rendered,
        }
    }
}

/// Menu bar - xwidget demo
#[derive(Parser, Debug)]
#[command(name = "menubar")]
#[command(about = "A four-button menu bar on X11 or in a terminal")]
struct Args {
    /// Drawing backend
    #[arg(long, short, value_enum, default_value_t = BackendKind::X11)]
    backend: BackendKind,

    /// X11 display to connect to (defaults to $DISPLAY)
    #[arg(long)]
    display: Option<String>,

    /// JSON configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Window title (overrides the config file)
    #[arg(long)]
    title: Option<String>,

    /// Hit-test region (overrides the config file)
    #[arg(long, value_enum)]
    hit_region: Option<HitRegionArg>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write logs to this file (terminal mode discards logs otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = init_logging(&args) {
        eprintln!("menubar: cannot open log file: {err}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Startup failed");
            eprintln!("menubar: {}", error_chain(&err));
            ExitCode::FAILURE
        }
    }
}

fn init_logging(args: &Args) -> io::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match (&args.log_file, args.backend) {
        (Some(path), _) => fmt
            .with_ansi(false)
            .with_writer(Mutex::new(File::create(path)?))
            .init(),
        // Anything on stdout or stderr would corrupt the screen
        (None, BackendKind::Terminal) => fmt.with_writer(io::sink).init(),
        (None, BackendKind::X11) => fmt.with_writer(io::stderr).init(),
    }
    Ok(())
}

/// Built-in demo setup: the stock bar, hit-tested on the painted boxes
fn demo_config() -> ToolkitConfig {
    let mut config = ToolkitConfig::default();
    config.buttons.hit_region = HitRegion::Rendered;
    config
}

fn load_config(args: &Args) -> Result<ToolkitConfig, StartupError> {
    let mut config = match &args.config {
        Some(path) => ToolkitConfig::load(path)?,
        None => demo_config(),
    };
    if let Some(title) = &args.title {
        config.window.title = title.clone();
    }
    if let Some(hit_region) = args.hit_region {
        config.buttons.hit_region = hit_region.into();
    }
    config.validate()?;
    Ok(config)
}

async fn run(args: Args) -> Result<(), StartupError> {
    let config = load_config(&args)?;
    info!(
        backend = ?args.backend,
        labels = ?config.buttons.labels,
        hit_region = ?config.buttons.hit_region,
        "Starting menu bar"
    );

    match args.backend {
        BackendKind::X11 => run_x11(config, args.display.as_deref()).await,
        BackendKind::Terminal => run_terminal(config).await,
    }
}

#[cfg(feature = "x11")]
async fn run_x11(config: ToolkitConfig, display: Option<&str>) -> Result<(), StartupError> {
    use xwidget::backend::x11::open_window;

    let (surface, window, events) = open_window(display, &config.window)?;
    let runtime = Runtime::new(button_bar(&config.buttons), surface, window.id);
    let _surface = runtime.run(events).await;
    Ok(())
}

#[cfg(not(feature = "x11"))]
async fn run_x11(_config: ToolkitConfig, _display: Option<&str>) -> Result<(), StartupError> {
    Err(StartupError::Display(
        "built without X11 support, use --backend terminal".to_string(),
    ))
}

async fn run_terminal(config: ToolkitConfig) -> Result<(), StartupError> {
    enable_raw_mode()?;
    bracketed(
        || {
            execute!(
                io::stdout(),
                EnterAlternateScreen,
                EnableMouseCapture,
                SetTitle(&config.window.title)
            )
        },
        drive_terminal(&config),
        restore_terminal,
    )
    .await
}

/// Run `body` after `setup`, then `cleanup` no matter which of them failed
///
/// The first error wins: setup, then body, then cleanup.
async fn bracketed(
    setup: impl FnOnce() -> io::Result<()>,
    body: impl Future<Output = Result<(), StartupError>>,
    cleanup: impl FnOnce() -> io::Result<()>,
) -> Result<(), StartupError> {
    let result = match setup() {
        Ok(()) => body.await,
        Err(err) => Err(err.into()),
    };
    let restored = cleanup();
    result?;
    restored?;
    Ok(())
}

fn restore_terminal() -> io::Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show);
    raw.and(screen)
}

async fn drive_terminal(config: &ToolkitConfig) -> Result<(), StartupError> {
    let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let surface = TerminalSurface::new(terminal).map_err(StartupError::Window)?;
    let runtime = Runtime::new(button_bar(&config.buttons), surface, Screen);
    let _surface = runtime.run(TerminalEvents::new()).await;
    Ok(())
}

/// `outer: inner: root` message for the whole source chain
fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
