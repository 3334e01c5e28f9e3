use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use term_widgets::app::App;
use term_widgets::config::{AppConfig, GeneralConfig, LoggingConfig, WatcherConfig};
use term_widgets::error::{AppError, Result};
use term_widgets::event::{Event, EventHandler};
use term_widgets::tui::{install_panic_hook, Tui};
use term_widgets::{handler, logging};

/// Demo host for the file selector, file list and menu widgets.
#[derive(Parser, Debug)]
#[command(name = "twdemo", version, about)]
struct Cli {
    /// Directory the selectors start in
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Explicit config file path
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write trace logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Disable mouse capture
    #[arg(long)]
    no_mouse: bool,

    /// Do not watch the shown directory for changes
    #[arg(long)]
    no_watcher: bool,
}

impl Cli {
    /// Flags as a partial config that wins over the config files.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                mouse: self.no_mouse.then_some(false),
                ..Default::default()
            },
            watcher: WatcherConfig {
                enabled: self.no_watcher.then_some(false),
                ..Default::default()
            },
            logging: LoggingConfig {
                file: self.log_file.as_ref().map(|p| p.display().to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let path = cli.path.canonicalize().map_err(|_| {
        AppError::InvalidPath(format!("{} does not exist", cli.path.display()))
    })?;
    if !path.is_dir() {
        return Err(AppError::InvalidPath(format!("{} is not a directory", path.display())));
    }
    if let Some(config_path) = cli.config.as_deref() {
        if !config_path.is_file() {
            return Err(AppError::Config(format!("{} not found", config_path.display())));
        }
    }

    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));
    let _log_guard = match config.log_file() {
        Some(file) => Some(logging::init(&file, config.log_level())?),
        None => None,
    };
    tracing::info!(dir = %path.display(), mouse = config.mouse_enabled(), "starting");

    install_panic_hook();

    let mut tui = Tui::new(config.mouse_enabled())?;
    let mut events = EventHandler::new(Duration::from_millis(16));
    let mut app = App::new(config, &path, tui.area()?, events.sender());

    loop {
        tui.draw(&app)?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            Event::Mouse(mouse) => handler::handle_mouse_event(&mut app, mouse),
            Event::Resize(width, height) => app.resize(width, height),
            Event::ScanComplete(outcome) => app.handle_scan(outcome),
            Event::DirChanged(paths) => app.handle_dir_changed(&paths),
            Event::Tick => {}
        }

        if app.should_quit {
            break;
        }
    }

    tui.restore()?;
    tracing::info!("stopped");
    Ok(())
}
