mod app;
mod ui;

pub use app::App;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::catalog::{CatalogClient, MediaKind};
use crate::config::Config;
use crate::debounce::{Debouncer, SEARCH_DEBOUNCE};
use crate::session::{Command, Event, Screen};
use crate::streams::StreamClient;

struct Clients {
    catalog: Arc<CatalogClient>,
    streams: Arc<StreamClient>,
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Run the launcher until the user quits or picks a source.
///
/// Returns the chosen source URL; the terminal is restored before returning.
pub async fn run(config: &Config, kind: MediaKind) -> io::Result<Option<String>> {
    // Set up panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let clients = Clients {
        catalog: Arc::new(CatalogClient::new(&config.catalog)),
        streams: Arc::new(StreamClient::new(&config.streams)),
    };
    let mut app = App::new(kind);
    let (tx, mut rx) = mpsc::channel::<Event>(32);

    let result = run_app(&mut terminal, &mut app, &clients, tx, &mut rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.map(|_| app.dispatch_url.take())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    clients: &Clients,
    tx: mpsc::Sender<Event>,
    rx: &mut mpsc::Receiver<Event>,
) -> io::Result<()> {
    let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);

    // Trending titles on entry
    let commands = app.apply(Event::Started);
    execute_all(app, commands, clients, &tx);

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        // Results from background fetches and the debouncer
        while let Ok(event) = rx.try_recv() {
            let commands = app.apply(event);
            execute_all(app, commands, clients, &tx);
        }

        if event::poll(Duration::from_millis(100))?
            && let TermEvent::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            handle_key(app, key, clients, &tx, &mut debouncer);
        }

        if app.should_quit {
            debouncer.cancel();
            break;
        }
    }

    Ok(())
}

fn handle_key(
    app: &mut App,
    key: KeyEvent,
    clients: &Clients,
    tx: &mpsc::Sender<Event>,
    debouncer: &mut Debouncer,
) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global quit
    if ctrl && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if matches!(app.session.screen(), Screen::Dispatched { .. }) {
        return;
    }

    if app.session.is_at_root() {
        match key.code {
            KeyCode::Esc if app.search_input.is_empty() => {
                app.should_quit = true;
            }
            KeyCode::Esc => {
                app.search_input.clear();
                schedule_search(app, tx, debouncer);
            }
            KeyCode::Char('o') if ctrl => {
                if let Some(title) = app.selected_title() {
                    let url = title.imdb_url();
                    info!(url = %url, "opening in browser");
                    if let Err(e) = webbrowser::open(&url) {
                        error!(error = %e, url = %url, "failed to open browser");
                    }
                }
            }
            KeyCode::Char(c) if !ctrl => {
                app.search_input.push(c);
                schedule_search(app, tx, debouncer);
            }
            KeyCode::Backspace => {
                if app.search_input.pop().is_some() {
                    schedule_search(app, tx, debouncer);
                }
            }
            KeyCode::Up => app.select_previous(),
            KeyCode::Down => app.select_next(),
            KeyCode::Enter => {
                debouncer.cancel();
                select(app, clients, tx);
            }
            _ => {}
        }
        return;
    }

    // Episodes and sources
    match key.code {
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => {
            let commands = app.apply(Event::Back);
            execute_all(app, commands, clients, tx);
        }
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Enter => select(app, clients, tx),
        _ => {}
    }
}

/// Send the current input to the session once typing pauses
fn schedule_search(app: &App, tx: &mpsc::Sender<Event>, debouncer: &mut Debouncer) {
    let text = app.search_input.clone();
    let tx = tx.clone();
    debouncer.call(async move {
        let _ = tx.send(Event::SearchSettled(text)).await;
    });
}

fn select(app: &mut App, clients: &Clients, tx: &mpsc::Sender<Event>) {
    if let Some(event) = app.select_event() {
        let commands = app.apply(event);
        execute_all(app, commands, clients, tx);
    }
}

fn execute_all(app: &mut App, commands: Vec<Command>, clients: &Clients, tx: &mpsc::Sender<Event>) {
    for command in commands {
        execute(app, command, clients, tx);
    }
}

/// Carry out a session command. Fetch failures are logged and arrive as empty results.
fn execute(app: &mut App, command: Command, clients: &Clients, tx: &mpsc::Sender<Event>) {
    let tx = tx.clone();
    match command {
        Command::FetchTrending { request, kind } => {
            let catalog = clients.catalog.clone();
            tokio::spawn(async move {
                let titles = catalog.trending_titles(kind).await.unwrap_or_else(|e| {
                    error!(error = %e, url = e.url(), "failed to fetch trending titles");
                    Vec::new()
                });
                let _ = tx.send(Event::TitlesLoaded { request, titles }).await;
            });
        }
        Command::SearchTitles { request, kind, query } => {
            let catalog = clients.catalog.clone();
            tokio::spawn(async move {
                let titles = catalog.search_titles(kind, &query).await.unwrap_or_else(|e| {
                    error!(error = %e, url = e.url(), "failed to search titles");
                    Vec::new()
                });
                let _ = tx.send(Event::TitlesLoaded { request, titles }).await;
            });
        }
        Command::FetchEpisodes { request, series_id } => {
            let catalog = clients.catalog.clone();
            tokio::spawn(async move {
                let episodes = catalog.series_episodes(&series_id).await.unwrap_or_else(|e| {
                    error!(error = %e, url = e.url(), "failed to fetch episodes");
                    Vec::new()
                });
                let _ = tx.send(Event::EpisodesLoaded { request, episodes }).await;
            });
        }
        Command::ResolveStreams { request, kind, id } => {
            let streams = clients.streams.clone();
            tokio::spawn(async move {
                let sources = streams.resolve_streams(kind, &id).await.unwrap_or_else(|e| {
                    error!(error = %e, url = e.url(), "failed to resolve streams");
                    Vec::new()
                });
                let _ = tx.send(Event::SourcesLoaded { request, sources }).await;
            });
        }
        Command::Dispatch { url } => {
            if app.dispatch_url.is_some() {
                warn!("source already chosen, ignoring");
                return;
            }
            // Close first, the caller dispatches once the terminal is back
            app.dispatch_url = Some(url);
            app.should_quit = true;
        }
    }
}
