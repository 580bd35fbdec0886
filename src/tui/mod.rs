mod app;
mod ui;

pub use app::{App, Command, LoadState, Popup, View};
pub use ui::{NO_EPISODES, NO_SHOWS, draw};

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cache::FetchResult;
use crate::catalog::{Catalog, Episode, Show};
use crate::config::Config;

/// Messages sent from background tasks to the UI
pub enum UiMessage {
    ShowsLoaded(FetchResult<Show>),
    EpisodesLoaded {
        show_id: u64,
        result: FetchResult<Episode>,
    },
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

pub async fn run(config: Config) -> io::Result<()> {
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

    let catalog = Catalog::with_base_url(&config.catalog.base_url);
    let mut app = App::new();
    let (tx, mut rx) = mpsc::channel::<UiMessage>(32);

    let result = run_app(&mut terminal, &mut app, &config, &catalog, tx, &mut rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Await the cached show list off the UI loop and report back
pub fn spawn_show_fetch(catalog: &Catalog, tx: &mpsc::Sender<UiMessage>) {
    let pending = catalog.shows();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = pending.await;
        let _ = tx.send(UiMessage::ShowsLoaded(result)).await;
    });
}

pub fn spawn_episode_fetch(catalog: &Catalog, show_id: u64, tx: &mpsc::Sender<UiMessage>) {
    let pending = catalog.episodes(show_id);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = pending.await;
        let _ = tx.send(UiMessage::EpisodesLoaded { show_id, result }).await;
    });
}

/// Apply a background result to the controller
pub fn handle_message(app: &mut App, msg: UiMessage) {
    match msg {
        UiMessage::ShowsLoaded(result) => app.apply_shows(result),
        UiMessage::EpisodesLoaded { show_id, result } => {
            app.apply_episodes(show_id, result);
        }
    }
}

/// Carry out the side effects a key press asked for
pub fn execute_command(
    command: Command,
    catalog: &Catalog,
    tx: &mpsc::Sender<UiMessage>,
) {
    match command {
        Command::None => {}
        Command::LoadEpisodes(show_id) => spawn_episode_fetch(catalog, show_id, tx),
        Command::RetryShows => {
            catalog.invalidate_shows();
            info!("retrying show list");
            spawn_show_fetch(catalog, tx);
        }
        Command::RetryEpisodes(show_id) => {
            catalog.invalidate_episodes(show_id);
            info!(show_id, "retrying episode list");
            spawn_episode_fetch(catalog, show_id, tx);
        }
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    config: &Config,
    catalog: &Catalog,
    tx: mpsc::Sender<UiMessage>,
    rx: &mut mpsc::Receiver<UiMessage>,
) -> io::Result<()> {
    info!(base_url = %catalog.client().base_url(), "loading catalog");
    spawn_show_fetch(catalog, &tx);

    if let Some(show_id) = config.startup_show_id {
        // Only the id is known until the show list arrives
        let placeholder = Show {
            id: show_id,
            name: format!("Show #{}", show_id),
            genres: Vec::new(),
            status: None,
            rating: None,
            runtime: None,
            summary: None,
            image: None,
        };
        app.select_show(placeholder);
        spawn_episode_fetch(catalog, show_id, &tx);
    }

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        // Handle messages from background tasks
        while let Ok(msg) = rx.try_recv() {
            if let UiMessage::ShowsLoaded(Ok(shows)) = &msg
                && let View::EpisodeList(current) = &app.view
                && let Some(full) = shows.iter().find(|s| s.id == current.id)
            {
                app.view = View::EpisodeList(full.clone());
            }
            handle_message(app, msg);
        }

        // Handle input with timeout
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let command = app.handle_key(key);
            if command != Command::None {
                debug!(?command, "executing command");
            }
            execute_command(command, catalog, &tx);
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
