use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info, warn};

use crate::catalog::{Episode, FetchError, Show};
use crate::filter::filter;
use crate::format::count_label;

const PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Every show in the catalog
    ShowList,
    /// Episodes of one show
    EpisodeList(Show),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Popup {
    #[default]
    None,
    /// Alphabetical show picker
    ShowSelector,
    /// "Show all" plus one entry per episode
    EpisodeJump,
}

/// Work the event loop has to carry out on behalf of the controller
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    None,
    LoadEpisodes(u64),
    RetryShows,
    RetryEpisodes(u64),
}

pub struct App {
    pub view: View,
    pub should_quit: bool,

    pub search_input: String,

    pub shows: Vec<Show>,
    pub shows_state: LoadState,
    pub episodes: Vec<Episode>,
    pub episodes_state: LoadState,

    /// Index into the filtered list of the active view
    pub selected_index: usize,
    /// Episode picked from the jump list
    pub highlighted_episode: Option<u64>,

    pub popup: Popup,
    pub popup_index: usize,
}

impl App {
    pub fn new() -> Self {
        Self {
            view: View::ShowList,
            should_quit: false,
            search_input: String::new(),
            shows: Vec::new(),
            shows_state: LoadState::Loading,
            episodes: Vec::new(),
            episodes_state: LoadState::Loading,
            selected_index: 0,
            highlighted_episode: None,
            popup: Popup::None,
            popup_index: 0,
        }
    }

    pub fn current_show(&self) -> Option<&Show> {
        match &self.view {
            View::ShowList => None,
            View::EpisodeList(show) => Some(show),
        }
    }

    pub fn visible_shows(&self) -> Vec<&Show> {
        filter(&self.shows, &self.search_input)
    }

    pub fn visible_episodes(&self) -> Vec<&Episode> {
        filter(&self.episodes, &self.search_input)
    }

    pub fn visible_len(&self) -> usize {
        match self.view {
            View::ShowList => self.visible_shows().len(),
            View::EpisodeList(_) => self.visible_episodes().len(),
        }
    }

    pub fn total_len(&self) -> usize {
        match self.view {
            View::ShowList => self.shows.len(),
            View::EpisodeList(_) => self.episodes.len(),
        }
    }

    pub fn load_state(&self) -> &LoadState {
        match self.view {
            View::ShowList => &self.shows_state,
            View::EpisodeList(_) => &self.episodes_state,
        }
    }

    pub fn count_label(&self) -> String {
        let noun = match self.view {
            View::ShowList => "shows",
            View::EpisodeList(_) => "episodes",
        };
        count_label(self.visible_len(), self.total_len(), noun)
    }

    // Results from the fetch cache

    pub fn apply_shows(&mut self, result: Result<Arc<Vec<Show>>, FetchError>) {
        match result {
            Ok(shows) => {
                let mut shows = shows.as_ref().clone();
                shows.sort_by_cached_key(|s| s.name.to_lowercase());
                info!(count = shows.len(), "shows loaded");
                self.shows = shows;
                self.shows_state = LoadState::Loaded;
            }
            Err(e) => {
                warn!(error = %e, "show list unavailable");
                self.shows.clear();
                self.shows_state = LoadState::Failed(e.to_string());
            }
        }
        if self.view == View::ShowList {
            self.clamp_selection();
        }
    }

    /// Apply an episode list if it belongs to the show currently on screen.
    /// Returns false for stale results, which are dropped.
    pub fn apply_episodes(
        &mut self,
        show_id: u64,
        result: Result<Arc<Vec<Episode>>, FetchError>,
    ) -> bool {
        if self.current_show().map(|s| s.id) != Some(show_id) {
            debug!(show_id, "ignoring episodes for a show no longer selected");
            return false;
        }

        match result {
            Ok(episodes) => {
                info!(show_id, count = episodes.len(), "episodes loaded");
                self.episodes = episodes.as_ref().clone();
                self.episodes_state = LoadState::Loaded;
            }
            Err(e) => {
                warn!(show_id, error = %e, "episode list unavailable");
                self.episodes.clear();
                self.episodes_state = LoadState::Failed(e.to_string());
            }
        }
        self.clamp_selection();
        true
    }

    // Navigation

    /// Enter the episode list for `show`. Returns the id whose episodes must
    /// be looked up in the cache.
    pub fn select_show(&mut self, show: Show) -> u64 {
        let id = show.id;
        info!(show_id = id, name = %show.name, "opening show");
        self.view = View::EpisodeList(show);
        self.episodes.clear();
        self.episodes_state = LoadState::Loading;
        self.reset_context();
        id
    }

    /// Return to the show list. Nothing is refetched.
    pub fn back_to_shows(&mut self) {
        self.view = View::ShowList;
        self.reset_context();
    }

    fn reset_context(&mut self) {
        self.search_input.clear();
        self.selected_index = 0;
        self.highlighted_episode = None;
        self.popup = Popup::None;
        self.popup_index = 0;
    }

    /// Scroll to and highlight an episode without leaving the view. Clears
    /// the search if it currently hides the episode.
    pub fn jump_to_episode(&mut self, episode_id: u64) -> bool {
        let position = |app: &App| {
            app.visible_episodes()
                .iter()
                .position(|e| e.id == episode_id)
        };

        let index = match position(self) {
            Some(i) => Some(i),
            None => {
                self.search_input.clear();
                position(self)
            }
        };

        match index {
            Some(i) => {
                self.selected_index = i;
                self.highlighted_episode = Some(episode_id);
                true
            }
            None => false,
        }
    }

    pub fn selected_show(&self) -> Option<&Show> {
        self.visible_shows().get(self.selected_index).copied()
    }

    pub fn selected_episode(&self) -> Option<&Episode> {
        self.visible_episodes().get(self.selected_index).copied()
    }

    // Search

    pub fn push_search_char(&mut self, c: char) {
        self.search_input.push(c);
        self.search_changed();
    }

    pub fn pop_search_char(&mut self) {
        self.search_input.pop();
        self.search_changed();
    }

    pub fn clear_search(&mut self) {
        self.search_input.clear();
        self.search_changed();
    }

    fn search_changed(&mut self) {
        self.selected_index = 0;
        self.highlighted_episode = None;
    }

    // Selection movement

    pub fn select_next(&mut self) {
        let len = self.visible_len();
        if len > 0 {
            self.selected_index = (self.selected_index + 1).min(len - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn page_down(&mut self) {
        let len = self.visible_len();
        if len > 0 {
            self.selected_index = (self.selected_index + PAGE_SIZE).min(len - 1);
        }
    }

    pub fn page_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(PAGE_SIZE);
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.visible_len().saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_len();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
    }

    // Popups

    pub fn popup_len(&self) -> usize {
        match self.popup {
            Popup::None => 0,
            Popup::ShowSelector => self.shows.len(),
            Popup::EpisodeJump => self.episodes.len() + 1,
        }
    }

    pub fn open_popup(&mut self) {
        self.popup = match self.view {
            View::ShowList if !self.shows.is_empty() => Popup::ShowSelector,
            View::EpisodeList(_) if self.episodes_state == LoadState::Loaded => {
                Popup::EpisodeJump
            }
            _ => Popup::None,
        };
        self.popup_index = 0;
    }

    pub fn close_popup(&mut self) {
        self.popup = Popup::None;
        self.popup_index = 0;
    }

    pub fn popup_next(&mut self) {
        let len = self.popup_len();
        if len > 0 {
            self.popup_index = (self.popup_index + 1).min(len - 1);
        }
    }

    pub fn popup_previous(&mut self) {
        self.popup_index = self.popup_index.saturating_sub(1);
    }

    pub fn confirm_popup(&mut self) -> Command {
        let popup = self.popup;
        let index = self.popup_index;
        self.close_popup();

        match popup {
            Popup::None => Command::None,
            Popup::ShowSelector => match self.shows.get(index).cloned() {
                Some(show) => Command::LoadEpisodes(self.select_show(show)),
                None => Command::None,
            },
            Popup::EpisodeJump => {
                if index == 0 {
                    self.clear_search();
                } else if let Some(id) = self.episodes.get(index - 1).map(|e| e.id) {
                    self.jump_to_episode(id);
                }
                Command::None
            }
        }
    }

    /// Mark the active list as loading again before a retry
    pub fn retry(&mut self) -> Command {
        match &self.view {
            View::ShowList if matches!(self.shows_state, LoadState::Failed(_)) => {
                self.shows_state = LoadState::Loading;
                Command::RetryShows
            }
            View::EpisodeList(show) if matches!(self.episodes_state, LoadState::Failed(_)) => {
                let id = show.id;
                self.episodes_state = LoadState::Loading;
                Command::RetryEpisodes(id)
            }
            _ => Command::None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Command {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Command::None;
        }
        if ctrl && key.code == KeyCode::Char('r') {
            return self.retry();
        }

        if self.popup != Popup::None {
            match key.code {
                KeyCode::Esc | KeyCode::Tab => self.close_popup(),
                KeyCode::Up => self.popup_previous(),
                KeyCode::Down => self.popup_next(),
                KeyCode::Enter => return self.confirm_popup(),
                _ => {}
            }
            return Command::None;
        }

        match key.code {
            KeyCode::Esc if !self.search_input.is_empty() => self.clear_search(),
            KeyCode::Esc => match self.view {
                View::ShowList => self.should_quit = true,
                View::EpisodeList(_) => self.back_to_shows(),
            },
            KeyCode::Tab => self.open_popup(),
            KeyCode::Up => self.select_previous(),
            KeyCode::Down => self.select_next(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::Home => self.select_first(),
            KeyCode::End => self.select_last(),
            KeyCode::Enter => {
                if let View::ShowList = self.view
                    && let Some(show) = self.selected_show().cloned()
                {
                    return Command::LoadEpisodes(self.select_show(show));
                }
            }
            KeyCode::Backspace => self.pop_search_char(),
            KeyCode::Char(c) if !ctrl => self.push_search_char(c),
            _ => {}
        }
        Command::None
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
