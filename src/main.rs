mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    tty::IsTty,
};
use hotkey_drill::{
    catalog::Catalog,
    challenge::Challenge,
    clock::IntervalClock,
    config::{Config, ConfigStore, FileConfigStore},
    events::{GameEvent, PresentationSink},
    runtime::{spawn_terminal_reader, Runner, Step, TerminalEvents},
    session::{Session, SessionConfig},
};
use rand::seq::SliceRandom;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// drill keyboard shortcuts until they stick
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal trainer for keyboard shortcuts. Each challenge describes an action; press the shortcut (or type the text) that performs it. Failed challenges come back until every one is answered correctly."
)]
pub struct Cli {
    /// challenge catalog file (json) to play instead of a built-in one
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// built-in catalog to play
    #[clap(short = 'b', long, value_enum)]
    builtin: Option<BuiltinCatalog>,

    /// only play these categories (repeatable)
    #[clap(short = 'c', long = "category")]
    categories: Vec<String>,

    /// play challenges in random order
    #[clap(short = 's', long)]
    shuffle: bool,

    /// seconds to show the result before moving on
    #[clap(short = 'p', long)]
    pause_ticks: Option<u32>,

    /// print the selected challenges and exit
    #[clap(short = 'l', long)]
    list: bool,

    /// write logs to this file
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// debug logging (needs --log-file)
    #[clap(short = 'v', long)]
    verbose: bool,

    /// remember catalog, categories, shuffle and pause as defaults
    #[clap(long, conflicts_with = "file")]
    save_config: bool,

    /// config file to use instead of the per-user one
    #[clap(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum BuiltinCatalog {
    Vscode,
    Shell,
}

impl Cli {
    /// Stored defaults with the flags given on the command line applied on top
    ///
    /// Stored categories belong to the stored catalog and are dropped when
    /// another catalog is played.
    fn merge_into(&self, mut cfg: Config) -> Config {
        let mut other_catalog = self.file.is_some();
        if let Some(builtin) = self.builtin {
            let name = builtin.to_string().to_lowercase();
            other_catalog |= name != cfg.catalog;
            cfg.catalog = name;
        }
        if !self.categories.is_empty() {
            cfg.categories = self.categories.clone();
        } else if other_catalog {
            cfg.categories.clear();
        }
        if self.shuffle {
            cfg.shuffle = true;
        }
        if let Some(ticks) = self.pause_ticks {
            cfg.pause_ticks = ticks;
        }
        cfg
    }

    fn load_catalog(&self, cfg: &Config) -> Result<Catalog, Box<dyn Error>> {
        let catalog = match &self.file {
            Some(path) => Catalog::from_path(path)?,
            None => Catalog::builtin(&cfg.catalog)?,
        };
        Ok(catalog)
    }
}

/// What the screen shows, kept up to date from session notifications
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ViewState {
    pub index: usize,
    pub count: usize,
    pub attempt: Option<u32>,
    pub category: String,
    pub description: String,
    pub input: String,
    pub verdict: Option<Verdict>,
    pub seconds: u32,
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Correct,
    Failed { solution: String },
}

impl PresentationSink for ViewState {
    fn notify(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Playing {
                index,
                count,
                attempt,
                category,
                description,
                user_input_steps,
            } => {
                self.index = *index;
                self.count = *count;
                self.attempt = *attempt;
                self.category = category.clone();
                self.description = description.clone();
                self.input = user_input_steps.clone();
                self.verdict = None;
                self.finished = false;
            }
            GameEvent::UserInputSteps { user_input_steps } => {
                self.input = user_input_steps.clone();
            }
            GameEvent::Correct { user_input_steps } => {
                self.input = user_input_steps.clone();
                self.verdict = Some(Verdict::Correct);
            }
            GameEvent::Failed {
                solution,
                user_input_steps,
            } => {
                self.input = user_input_steps.clone();
                self.verdict = Some(Verdict::Failed {
                    solution: solution.clone(),
                });
            }
            GameEvent::Finished => {
                self.finished = true;
                self.verdict = None;
            }
            GameEvent::Tick { seconds, .. } => {
                self.seconds = *seconds;
            }
        }
    }
}

pub struct App {
    pub session: Session<IntervalClock, ViewState>,
    pub catalog_name: String,
    /// Terminal reports key releases
    pub enhanced: bool,
}

impl App {
    pub fn new(challenges: Vec<Challenge>, cfg: &Config, catalog_name: String, enhanced: bool) -> Self {
        Self {
            session: Session::new(
                challenges,
                SessionConfig::from(cfg),
                IntervalClock::every_second(),
                ViewState::default(),
            ),
            catalog_name,
            enhanced,
        }
    }

    pub fn view(&self) -> &ViewState {
        self.session.sink()
    }

}

fn init_logging(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let Some(path) = &cli.log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    let default = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn print_listing(catalog: &Catalog, challenges: &[Challenge]) {
    println!("{} ({} challenges)", catalog.name, challenges.len());
    for category in catalog.categories() {
        let in_category: Vec<&Challenge> = challenges
            .iter()
            .filter(|c| c.category == category)
            .collect();
        if in_category.is_empty() {
            continue;
        }
        println!();
        println!("{category}");
        for c in in_category {
            println!("  {:<40} {}", c.description, c.solutions);
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let cfg = cli.merge_into(store.load());
    if cli.save_config {
        store.save(&cfg)?;
        info!(path = %store.path().display(), "saved config");
    }

    let catalog = cli.load_catalog(&cfg)?;
    let mut challenges = catalog.select(&cfg.categories)?;
    if cfg.shuffle {
        challenges.shuffle(&mut rand::thread_rng());
    }

    if cli.list {
        print_listing(&catalog, &challenges);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
            )
        )?;
    } else {
        warn!("terminal does not report key releases; synthesising them");
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(challenges, &cfg, catalog.name.clone(), enhanced);
    let runner = Runner::new(
        spawn_terminal_reader(),
        Duration::from_millis(cfg.tick_rate_ms),
        enhanced,
    );
    let result = start_tui(&mut terminal, &mut app, &runner);

    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: TerminalEvents>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    app.session.start();

    loop {
        terminal.draw(|f| ui(app, f))?;

        if runner.step(&mut app.session) == Step::Quit {
            break;
        }
    }

    if app.session.is_running() {
        app.session.stop(true);
    }
    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
