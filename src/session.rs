//! Navigation state for one browse session.
//!
//! Titles -> (Episodes, series only) -> Sources -> Dispatched.
//!
//! Transitions are pure: [`Session::apply`] updates the state and returns the
//! [`Command`]s the runtime must carry out. Fetch results come back as events
//! tagged with the [`RequestId`] they were issued under; only the latest
//! request of a view is accepted, anything older is dropped.

use tracing::{debug, info};

use crate::catalog::{Episode, MediaKind, Title};
use crate::descriptor::StreamDescriptor;
use crate::episodes::{self, SeasonGroups};
use crate::streams::Source;

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    BrowsingTitles,
    BrowsingEpisodes {
        series: Title,
    },
    BrowsingSources {
        title: Title,
        /// Set when the sources belong to an episode of `title`
        episode: Option<Episode>,
    },
    Dispatched {
        url: String,
    },
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchTrending {
        request: RequestId,
        kind: MediaKind,
    },
    SearchTitles {
        request: RequestId,
        kind: MediaKind,
        query: String,
    },
    FetchEpisodes {
        request: RequestId,
        series_id: String,
    },
    ResolveStreams {
        request: RequestId,
        kind: MediaKind,
        id: String,
    },
    Dispatch {
        url: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Session opened with empty search text
    Started,
    /// Search text after the debounce quiet period
    SearchSettled(String),
    SelectTitle(usize),
    /// Index into the flattened season/episode display order
    SelectEpisode(usize),
    SelectSource(usize),
    Back,
    TitlesLoaded {
        request: RequestId,
        titles: Vec<Title>,
    },
    EpisodesLoaded {
        request: RequestId,
        episodes: Vec<Episode>,
    },
    SourcesLoaded {
        request: RequestId,
        sources: Vec<Source>,
    },
}

/// A resolved source with its parsed descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedSource {
    pub source: Source,
    pub descriptor: StreamDescriptor,
}

impl From<Source> for AnnotatedSource {
    fn from(source: Source) -> Self {
        let descriptor = StreamDescriptor::parse(&source);
        Self { source, descriptor }
    }
}

pub struct Session {
    kind: MediaKind,
    screen: Screen,
    search_text: String,

    titles: Vec<Title>,
    seasons: SeasonGroups,
    sources: Vec<AnnotatedSource>,

    next_request: RequestId,
    // Latest outstanding request per view
    titles_request: Option<RequestId>,
    episodes_request: Option<RequestId>,
    sources_request: Option<RequestId>,
    // A title fetch was abandoned, so `titles` may not answer `search_text`
    titles_stale: bool,
}

impl Session {
    pub fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            screen: Screen::BrowsingTitles,
            search_text: String::new(),
            titles: Vec::new(),
            seasons: SeasonGroups::new(),
            sources: Vec::new(),
            next_request: 0,
            titles_request: None,
            episodes_request: None,
            sources_request: None,
            titles_stale: false,
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn titles(&self) -> &[Title] {
        &self.titles
    }

    pub fn seasons(&self) -> &SeasonGroups {
        &self.seasons
    }

    pub fn sources(&self) -> &[AnnotatedSource] {
        &self.sources
    }

    pub fn episode_count(&self) -> usize {
        self.seasons.values().map(Vec::len).sum()
    }

    pub fn episode_at(&self, index: usize) -> Option<&Episode> {
        episodes::flatten(&self.seasons).nth(index)
    }

    pub fn is_at_root(&self) -> bool {
        self.screen == Screen::BrowsingTitles
    }

    /// Whether the view currently on screen waits on a fetch
    pub fn is_loading(&self) -> bool {
        match self.screen {
            Screen::BrowsingTitles => self.titles_request.is_some(),
            Screen::BrowsingEpisodes { .. } => self.episodes_request.is_some(),
            Screen::BrowsingSources { .. } => self.sources_request.is_some(),
            Screen::Dispatched { .. } => false,
        }
    }

    pub fn apply(&mut self, event: Event) -> Vec<Command> {
        match event {
            Event::Started => self.search_settled(String::new()),
            Event::SearchSettled(text) => self.search_settled(text),
            Event::SelectTitle(index) => self.select_title(index),
            Event::SelectEpisode(index) => self.select_episode(index),
            Event::SelectSource(index) => self.select_source(index),
            Event::Back => self.back(),
            Event::TitlesLoaded { request, titles } => {
                if accept(&mut self.titles_request, request) {
                    self.titles = titles;
                }
                Vec::new()
            }
            Event::EpisodesLoaded { request, episodes } => {
                if accept(&mut self.episodes_request, request) {
                    self.seasons = episodes::group_by_season(episodes);
                }
                Vec::new()
            }
            Event::SourcesLoaded { request, sources } => {
                if accept(&mut self.sources_request, request) {
                    self.sources = sources.into_iter().map(AnnotatedSource::from).collect();
                }
                Vec::new()
            }
        }
    }

    fn issue(&mut self) -> RequestId {
        self.next_request += 1;
        self.next_request
    }

    fn search_settled(&mut self, text: String) -> Vec<Command> {
        if !self.is_at_root() {
            return Vec::new();
        }

        let request = self.issue();
        self.titles_request = Some(request);
        self.titles_stale = false;
        let query = text.trim().to_string();
        self.search_text = text;

        // Empty text means trending, never an empty search upstream
        if query.is_empty() {
            info!(kind = %self.kind, "loading trending titles");
            vec![Command::FetchTrending {
                request,
                kind: self.kind,
            }]
        } else {
            info!(kind = %self.kind, query = %query, "searching titles");
            vec![Command::SearchTitles {
                request,
                kind: self.kind,
                query,
            }]
        }
    }

    fn select_title(&mut self, index: usize) -> Vec<Command> {
        if !self.is_at_root() {
            return Vec::new();
        }
        let Some(title) = self.titles.get(index).cloned() else {
            return Vec::new();
        };

        // Leaving the root abandons any title fetch still in flight
        if self.titles_request.take().is_some() {
            debug!("abandoning pending title fetch");
            self.titles_stale = true;
        }

        let request = self.issue();
        match self.kind {
            MediaKind::Movie => {
                info!(id = %title.id, "resolving movie sources");
                self.enter_sources(request);
                let id = title.id.clone();
                self.screen = Screen::BrowsingSources {
                    title,
                    episode: None,
                };
                vec![Command::ResolveStreams {
                    request,
                    kind: MediaKind::Movie,
                    id,
                }]
            }
            MediaKind::Series => {
                info!(id = %title.id, "loading episodes");
                self.seasons.clear();
                self.episodes_request = Some(request);
                let series_id = title.id.clone();
                self.screen = Screen::BrowsingEpisodes { series: title };
                vec![Command::FetchEpisodes { request, series_id }]
            }
        }
    }

    fn select_episode(&mut self, index: usize) -> Vec<Command> {
        let Screen::BrowsingEpisodes { series } = &self.screen else {
            return Vec::new();
        };
        let Some(episode) = self.episode_at(index).cloned() else {
            return Vec::new();
        };
        let series = series.clone();

        info!(id = %episode.id, "resolving episode sources");
        let request = self.issue();
        self.enter_sources(request);
        let id = episode.id.clone();
        self.screen = Screen::BrowsingSources {
            title: series,
            episode: Some(episode),
        };
        vec![Command::ResolveStreams {
            request,
            kind: MediaKind::Series,
            id,
        }]
    }

    fn select_source(&mut self, index: usize) -> Vec<Command> {
        if !matches!(self.screen, Screen::BrowsingSources { .. }) {
            return Vec::new();
        }
        let Some(url) = self
            .sources
            .get(index)
            .and_then(|s| s.source.playable_url())
        else {
            debug!(index, "source has nothing to play");
            return Vec::new();
        };

        self.screen = Screen::Dispatched { url: url.clone() };
        vec![Command::Dispatch { url }]
    }

    fn enter_sources(&mut self, request: RequestId) {
        self.sources.clear();
        self.sources_request = Some(request);
    }

    /// Unwind one level, dropping whatever the level being left owned.
    ///
    /// Returning to a title list whose fetch was abandoned fetches it again.
    fn back(&mut self) -> Vec<Command> {
        let screen = std::mem::replace(&mut self.screen, Screen::BrowsingTitles);
        self.screen = match screen {
            Screen::BrowsingSources {
                title,
                episode: Some(_),
            } => {
                self.sources.clear();
                self.sources_request = None;
                Screen::BrowsingEpisodes { series: title }
            }
            Screen::BrowsingSources { episode: None, .. } => {
                self.sources.clear();
                self.sources_request = None;
                Screen::BrowsingTitles
            }
            Screen::BrowsingEpisodes { .. } => {
                self.seasons.clear();
                self.episodes_request = None;
                Screen::BrowsingTitles
            }
            other => other,
        };

        if self.is_at_root() && std::mem::take(&mut self.titles_stale) {
            return self.search_settled(self.search_text.clone());
        }
        Vec::new()
    }
}

/// Accept a result only if it answers the latest request of its view
fn accept(slot: &mut Option<RequestId>, request: RequestId) -> bool {
    if *slot == Some(request) {
        *slot = None;
        true
    } else {
        debug!(request, "dropping stale result");
        false
    }
}
