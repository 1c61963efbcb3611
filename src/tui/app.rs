use crate::catalog::{MediaKind, Title};
use crate::session::{Command, Event, Screen, Session};

/// UI-side state around a [`Session`]: live search input and list cursors
pub struct App {
    pub session: Session,
    pub should_quit: bool,

    /// What the user is typing; the session only sees it once settled
    pub search_input: String,

    // Cursor per level, so going back lands where the user left
    pub title_index: usize,
    pub episode_index: usize,
    pub source_index: usize,

    /// Set once a source is chosen; the caller dispatches after the UI closes
    pub dispatch_url: Option<String>,
}

impl App {
    pub fn new(kind: MediaKind) -> Self {
        Self {
            session: Session::new(kind),
            should_quit: false,
            search_input: String::new(),
            title_index: 0,
            episode_index: 0,
            source_index: 0,
            dispatch_url: None,
        }
    }

    pub fn navigation_title(&self) -> &'static str {
        match self.session.kind() {
            MediaKind::Movie => "Search Movies",
            MediaKind::Series => "Search TV Series",
        }
    }

    pub fn search_placeholder(&self) -> &'static str {
        match self.session.kind() {
            MediaKind::Movie => "Search for a movie",
            MediaKind::Series => "Search for a TV series",
        }
    }

    /// Feed an event to the session, resetting cursors on navigation
    pub fn apply(&mut self, event: Event) -> Vec<Command> {
        let navigating = matches!(
            event,
            Event::SelectTitle(_) | Event::SelectEpisode(_) | Event::SelectSource(_)
        );
        let commands = self.session.apply(event);

        if navigating && !commands.is_empty() {
            match self.session.screen() {
                Screen::BrowsingEpisodes { .. } => self.episode_index = 0,
                Screen::BrowsingSources { .. } => self.source_index = 0,
                _ => {}
            }
        }

        self.clamp_selection();
        commands
    }

    fn list_len(&self) -> usize {
        match self.session.screen() {
            Screen::BrowsingTitles => self.session.titles().len(),
            Screen::BrowsingEpisodes { .. } => self.session.episode_count(),
            Screen::BrowsingSources { .. } => self.session.sources().len(),
            Screen::Dispatched { .. } => 0,
        }
    }

    fn cursor(&mut self) -> Option<&mut usize> {
        match self.session.screen() {
            Screen::BrowsingTitles => Some(&mut self.title_index),
            Screen::BrowsingEpisodes { .. } => Some(&mut self.episode_index),
            Screen::BrowsingSources { .. } => Some(&mut self.source_index),
            Screen::Dispatched { .. } => None,
        }
    }

    pub fn selected_index(&self) -> usize {
        match self.session.screen() {
            Screen::BrowsingTitles => self.title_index,
            Screen::BrowsingEpisodes { .. } => self.episode_index,
            Screen::BrowsingSources { .. } => self.source_index,
            Screen::Dispatched { .. } => 0,
        }
    }

    pub fn select_next(&mut self) {
        let len = self.list_len();
        if let Some(cursor) = self.cursor()
            && len > 0
        {
            *cursor = (*cursor + 1).min(len - 1);
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(cursor) = self.cursor() {
            *cursor = cursor.saturating_sub(1);
        }
    }

    /// Keep the cursor inside the list after it was replaced
    pub fn clamp_selection(&mut self) {
        let len = self.list_len();
        if let Some(cursor) = self.cursor()
            && *cursor >= len
        {
            *cursor = len.saturating_sub(1);
        }
    }

    pub fn selected_title(&self) -> Option<&Title> {
        match self.session.screen() {
            Screen::BrowsingTitles => self.session.titles().get(self.title_index),
            Screen::BrowsingEpisodes { series } => Some(series),
            Screen::BrowsingSources { title, .. } => Some(title),
            Screen::Dispatched { .. } => None,
        }
    }

    /// Event for pressing Enter on the current row
    pub fn select_event(&self) -> Option<Event> {
        let index = self.selected_index();
        match self.session.screen() {
            Screen::BrowsingTitles => Some(Event::SelectTitle(index)),
            Screen::BrowsingEpisodes { .. } => Some(Event::SelectEpisode(index)),
            Screen::BrowsingSources { .. } => Some(Event::SelectSource(index)),
            Screen::Dispatched { .. } => None,
        }
    }
}
