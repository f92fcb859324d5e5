use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::KeyEventKind,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use exofinder::{
    app::{Action, App},
    app_dirs::AppDirs,
    client::{ClassificationService, HttpClassifier},
    config::{Config, ConfigStore, FileConfigStore},
    controller::SubmissionState,
    logging::{self, LogTarget},
    runtime::{AppEvent, CrosstermEventSource, Dispatcher, EventSource, FixedTicker, Runner},
    ui,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;

/// submit light-curve samples to a classification service and chart the result
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Select a light-curve CSV, send it to a remote exoplanet classifier and inspect the verdict alongside the flux series it was computed from."
)]
pub struct Cli {
    /// base address of the classification service
    #[clap(short = 'e', long)]
    endpoint: Option<String>,

    /// route of the prediction endpoint on the service
    #[clap(long)]
    path: Option<String>,

    /// request timeout in seconds (default: wait for the transport)
    #[clap(short = 't', long)]
    timeout: Option<u64>,

    /// light-curve file to select at start-up
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// read and write settings from this file instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,

    /// persist the effective settings to the config file
    #[clap(long)]
    save_config: bool,

    /// submit --file once, print the verdict and exit without starting the TUI
    #[clap(long, requires = "file")]
    once: bool,
}

impl Cli {
    /// Layer command line overrides on top of the stored configuration
    fn apply(&self, cfg: &mut Config) {
        if let Some(endpoint) = &self.endpoint {
            cfg.endpoint = endpoint.clone();
        }
        if let Some(path) = &self.path {
            cfg.predict_path = path.clone();
        }
        if let Some(timeout) = self.timeout {
            cfg.request_timeout_secs = Some(timeout);
        }
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let store = cli.config_store();
    let mut config = store.load();
    cli.apply(&mut config);

    let target = if cli.once {
        LogTarget::Stderr
    } else {
        LogTarget::File(AppDirs::log_path())
    };
    if let Err(err) = logging::init(&config.log_level, target) {
        eprintln!("logging disabled: {err}");
    }

    if cli.save_config {
        store.save(&config)?;
        tracing::info!(path = %store.path().display(), "saved configuration");
    }

    let classifier = match HttpClassifier::from_config(&config) {
        Ok(classifier) => classifier,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, err.to_string()).exit();
        }
    };
    tracing::info!(url = %classifier.url(), "using classification endpoint");

    if cli.once {
        let Some(file) = cli.file.as_ref() else {
            return Ok(());
        };
        return run_once(&config, classifier, &file.display().to_string());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let events = CrosstermEventSource::new();
    let dispatcher = Dispatcher::new(classifier, events.sender())?;
    let runner = Runner::new(events, FixedTicker::new(Duration::from_millis(TICK_RATE_MS)));

    let mut app = App::new(config.endpoint.clone());
    if let Some(file) = &cli.file {
        app.select_path(&file.display().to_string());
    }

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    enable_raw_mode()?;
    let result = execute!(terminal.backend_mut(), EnterAlternateScreen)
        .map_err(Box::<dyn Error>::from)
        .and_then(|()| start_tui(&mut terminal, &mut app, &runner, &dispatcher));

    restore_terminal(&mut terminal)?;

    result
}

/// Undo raw mode and the alternate screen, whatever state setup reached
fn restore_terminal<W: io::Write>(
    terminal: &mut Terminal<CrosstermBackend<W>>,
) -> Result<(), Box<dyn Error>> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Ticks only repaint while a request is outstanding
fn redraw_on_tick(app: &App) -> bool {
    app.controller.state().is_loading()
}

fn start_tui<B: Backend, E: EventSource, S: ClassificationService>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, FixedTicker>,
    dispatcher: &Dispatcher<S>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                if redraw_on_tick(app) {
                    terminal.draw(|f| ui::draw(app, f))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui::draw(app, f))?;
            }
            AppEvent::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.on_key(key) {
                    Action::Quit => break,
                    Action::Dispatch(dispatch) => dispatcher.dispatch(dispatch),
                    Action::None => {}
                }
                terminal.draw(|f| ui::draw(app, f))?;
            }
            AppEvent::Classified {
                generation,
                outcome,
            } => {
                if app.on_classified(generation, outcome) {
                    terminal.draw(|f| ui::draw(app, f))?;
                }
            }
        }
    }

    Ok(())
}

/// Headless submission: one request, verdict on stdout, failure as exit status 1
fn run_once(config: &Config, classifier: HttpClassifier, path: &str) -> Result<(), Box<dyn Error>> {
    let mut app = App::new(config.endpoint.clone());
    if !app.select_path(path) {
        eprintln!("{}", app.notice.unwrap_or_default());
        std::process::exit(1);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    if let Action::Dispatch(dispatch) = app.trigger() {
        let outcome = runtime.block_on(classifier.classify(dispatch.file));
        app.on_classified(dispatch.generation, outcome);
    }

    match app.controller.state() {
        SubmissionState::Succeeded { classification } => {
            println!("{}", classification.label);
            println!("Confidence: {}%", classification.confidence_percent());
            println!("Samples: {}", classification.series.len());
            Ok(())
        }
        SubmissionState::Failed { message } => {
            eprintln!("{message}");
            std::process::exit(1);
        }
        SubmissionState::Idle | SubmissionState::Loading => Ok(()),
    }
}
