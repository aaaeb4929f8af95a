pub mod config;
pub mod runtime;
pub mod session;
pub mod text_source;
pub mod ui;
pub mod util;

use crate::{
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{AppEvent, CrosstermEventSource, EventSource},
    session::Session,
    text_source::{ApiTextSource, BuiltinTextSource, TextSource},
};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

const TICK_RATE_MS: u64 = 1000;

/// minimal typing-speed trainer tui
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A minimal typing-speed trainer: fetches a paragraph of random words, scores every keystroke against it, and shows live wpm, accuracy and mistakes over a countdown."
)]
pub struct Cli {
    /// number of words in the fetched paragraph
    #[clap(short = 'w', long)]
    number_of_words: Option<usize>,

    /// seconds on the countdown clock
    #[clap(short = 's', long)]
    number_of_secs: Option<u64>,

    /// custom paragraph to type instead of fetching one
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// where paragraphs come from
    #[clap(short = 'o', long, value_enum)]
    word_source: Option<WordSource>,
}

#[derive(Debug, Copy, Clone, PartialEq, ValueEnum, strum_macros::Display)]
pub enum WordSource {
    /// fetch pseudo-random words from the word api
    Api,
    /// pick words from the embedded list, no network
    Builtin,
}

impl WordSource {
    fn from_name(name: &str) -> Self {
        match name {
            "builtin" => WordSource::Builtin,
            _ => WordSource::Api,
        }
    }

    fn as_text_source(&self, number_of_words: usize) -> Box<dyn TextSource> {
        match self {
            WordSource::Api => Box::new(ApiTextSource::new(number_of_words)),
            WordSource::Builtin => Box::new(BuiltinTextSource::new(number_of_words)),
        }
    }
}

/// Effective settings: persisted config overridden by CLI flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub number_of_words: usize,
    pub number_of_secs: u64,
    pub word_source: WordSource,
}

impl Settings {
    fn resolve(cfg: &Config, cli: &Cli) -> Self {
        Self {
            number_of_words: cli.number_of_words.unwrap_or(cfg.number_of_words),
            number_of_secs: cli.number_of_secs.unwrap_or(cfg.number_of_secs),
            word_source: cli
                .word_source
                .unwrap_or_else(|| WordSource::from_name(&cfg.word_source)),
        }
    }

    fn to_config(self) -> Config {
        Config {
            number_of_words: self.number_of_words,
            number_of_secs: self.number_of_secs,
            word_source: self.word_source.to_string().to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Typing,
    Results,
}

#[derive(Debug)]
pub struct App {
    pub settings: Settings,
    pub session: Session,
    pub state: AppState,
}

impl App {
    pub fn new(settings: Settings, custom_prompt: Option<String>) -> Self {
        let prompt = custom_prompt.unwrap_or_else(|| acquire_prompt(&settings));
        Self {
            session: Session::new(prompt, settings.number_of_secs),
            settings,
            state: AppState::Typing,
        }
    }

    /// Discard the current session and start over, either with the same
    /// paragraph or a freshly acquired one.
    pub fn reset(&mut self, prompt_override: Option<String>) {
        let prompt = prompt_override.unwrap_or_else(|| acquire_prompt(&self.settings));
        self.session = Session::new(prompt, self.settings.number_of_secs);
        self.state = AppState::Typing;
    }
}

/// Never fails: any fetch problem degrades to the fallback sentence inside
/// the text source.
fn acquire_prompt(settings: &Settings) -> String {
    settings
        .word_source
        .as_text_source(settings.number_of_words)
        .fetch_text()
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let settings = Settings::resolve(&store.load(), &cli);
    let _ = store.save(&settings.to_config());

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // The initial fetch blocks; show the loading screen first and throw
    // away anything typed at the tty while it ran.
    terminal.draw(|f| ui::render_loading(f))?;
    let mut app = App::new(settings, cli.prompt.clone());
    drain_pending_terminal_input()?;
    start_tui(&mut terminal, &mut app)?;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    Ok(())
}

/// Swallow input buffered at the tty itself. Runs before the input thread
/// exists, so keys typed during the initial blocking fetch never reach the
/// event channel at all.
fn drain_pending_terminal_input() -> io::Result<()> {
    while crossterm::event::poll(Duration::from_millis(0))? {
        let _ = crossterm::event::read()?;
    }
    Ok(())
}

#[derive(Debug)]
enum ExitType {
    Restart,
    New,
    Quit,
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let events = CrosstermEventSource::new(Duration::from_millis(TICK_RATE_MS));
    run_app(terminal, app, &events)
}

fn run_app<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &E,
) -> Result<(), Box<dyn Error>> {
    loop {
        let mut exit_type: ExitType = ExitType::Quit;
        terminal.draw(|f| ui(app, f))?;

        loop {
            match events.next()? {
                AppEvent::Tick => {
                    // Gate on the live session: ticks aimed at a finished
                    // or replaced session must not touch it.
                    if app.session.is_running() {
                        app.session.on_tick();
                        if app.session.has_finished() {
                            app.state = AppState::Results;
                        }
                        terminal.draw(|f| ui(app, f))?;
                    }
                }
                AppEvent::Resize => {
                    terminal.draw(|f| ui(app, f))?;
                }
                AppEvent::Key(key) => {
                    match key.code {
                        KeyCode::Esc => {
                            break;
                        }
                        KeyCode::Backspace => {
                            if app.state == AppState::Typing {
                                app.session.backspace();
                            }
                        }
                        KeyCode::Left => {
                            exit_type = ExitType::Restart;
                            break;
                        }
                        KeyCode::Right => {
                            exit_type = ExitType::New;
                            break;
                        }
                        KeyCode::Char(c) => {
                            if key.modifiers.contains(KeyModifiers::CONTROL) && c == 'c' {
                                break;
                            }

                            match app.state {
                                AppState::Typing => {
                                    app.session.write(c);
                                    if app.session.has_finished() {
                                        app.state = AppState::Results;
                                    }
                                }
                                AppState::Results => match c {
                                    'r' => {
                                        exit_type = ExitType::Restart;
                                        break;
                                    }
                                    'n' => {
                                        exit_type = ExitType::New;
                                        break;
                                    }
                                    _ => {}
                                },
                            }
                        }
                        _ => {}
                    }
                    terminal.draw(|f| ui(app, f))?;
                }
            }
        }

        match exit_type {
            ExitType::Restart => {
                let prompt = app.session.prompt.clone();
                app.reset(Some(prompt));
            }
            ExitType::New => {
                terminal.draw(|f| ui::render_loading(f))?;
                app.reset(None);
                // The fetch inside reset() blocks this thread while the
                // input thread keeps queueing keystrokes; none of them were
                // aimed at the fresh session.
                events.drain();
            }
            ExitType::Quit => {
                break;
            }
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
