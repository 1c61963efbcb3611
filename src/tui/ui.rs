use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_truncate::UnicodeTruncateStr;

use crate::catalog::{Episode, Title};
use crate::descriptor::SourceClass;
use crate::session::Screen;

use super::app::App;

pub fn draw(frame: &mut Frame, app: &App) {
    match app.session.screen() {
        Screen::BrowsingTitles => draw_titles(frame, app),
        Screen::BrowsingEpisodes { series } => draw_episodes(frame, app, series),
        Screen::BrowsingSources { title, episode } => {
            draw_sources(frame, app, title, episode.as_ref())
        }
        Screen::Dispatched { .. } => draw_dispatched(frame),
    }
}

fn selected_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

fn header(text: String, loading: bool) -> Paragraph<'static> {
    let mut spans = vec![Span::styled(
        text,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    if loading {
        spans.push(Span::styled("  Loading...", Style::default().fg(Color::Yellow)));
    }
    Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM))
}

fn draw_empty(frame: &mut Frame, area: Rect, loading: bool, title: &str) {
    let text = if loading { "" } else { "No results" };
    let empty = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    frame.render_widget(empty, area);
}

fn draw_titles(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(3), // Input
            Constraint::Min(0),    // Results
            Constraint::Length(1), // Help
        ])
        .split(frame.area());

    let loading = app.session.is_loading();
    frame.render_widget(header(app.navigation_title().to_string(), loading), chunks[0]);

    // Search input, with placeholder when empty
    let input = if app.search_input.is_empty() {
        Paragraph::new(app.search_placeholder()).style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(app.search_input.as_str()).style(Style::default().fg(Color::White))
    };
    frame.render_widget(input.block(Block::default().borders(Borders::ALL).title("Search")), chunks[1]);
    frame.set_cursor_position((
        chunks[1].x + app.search_input.chars().count() as u16 + 1,
        chunks[1].y + 1,
    ));

    let titles = app.session.titles();
    let list_title = if app.session.search_text().trim().is_empty() {
        "Trending".to_string()
    } else {
        format!("Results [{}]", titles.len())
    };

    if titles.is_empty() {
        draw_empty(frame, chunks[2], loading, &list_title);
    } else {
        let items: Vec<ListItem> = titles
            .iter()
            .map(|t| ListItem::new(t.display_title()))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(list_title))
            .highlight_style(selected_style());
        let mut state = ListState::default().with_selected(Some(app.title_index));
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    let help = Paragraph::new("type: search | ↑/↓: navigate | Enter: details | Ctrl-O: open on IMDb | Esc: clear/quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);
}

fn episode_item(episode: &Episode, width: usize, selected: bool) -> ListItem<'static> {
    let (overview, _) = episode.overview.unicode_truncate(width.saturating_sub(4));
    let mut lines = vec![Line::from(format!("  {}", episode.display_title()))];
    if !overview.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("    {}", overview),
            Style::default().fg(if selected { Color::Black } else { Color::DarkGray }),
        )));
    }

    let item = ListItem::new(lines);
    if selected {
        item.style(selected_style())
    } else {
        item
    }
}

fn draw_episodes(frame: &mut Frame, app: &App, series: &Title) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Min(0),    // Episode list
            Constraint::Length(1), // Help
        ])
        .split(frame.area());

    let loading = app.session.is_loading();
    frame.render_widget(header(series.display_title(), loading), chunks[0]);

    let seasons = app.session.seasons();
    if seasons.is_empty() {
        draw_empty(frame, chunks[1], loading, "Episodes");
    } else {
        let width = chunks[1].width as usize;
        let mut items = Vec::new();
        let mut selected_row = None;
        let mut index = 0;

        // One header row per season, then its episodes
        for (season, episodes) in seasons {
            items.push(ListItem::new(Line::from(Span::styled(
                format!("Season {}", season),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ))));
            for episode in episodes {
                let selected = index == app.episode_index;
                if selected {
                    selected_row = Some(items.len());
                }
                items.push(episode_item(episode, width, selected));
                index += 1;
            }
        }

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Episodes [{}]", app.session.episode_count())),
        );
        let mut state = ListState::default().with_selected(selected_row);
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    let help = Paragraph::new("↑/↓: navigate | Enter: find sources | Esc: back")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[2]);
}

fn draw_sources(frame: &mut Frame, app: &App, title: &Title, episode: Option<&Episode>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Min(0),    // Source list
            Constraint::Length(1), // Help
        ])
        .split(frame.area());

    let heading = match episode {
        Some(ep) => format!("{} - {}", title.name, ep.display_title()),
        None => title.display_title(),
    };
    let loading = app.session.is_loading();
    frame.render_widget(header(heading, loading), chunks[0]);

    let sources = app.session.sources();
    if sources.is_empty() {
        draw_empty(frame, chunks[1], loading, "Sources");
    } else {
        let width = chunks[1].width.saturating_sub(6) as usize;
        let items: Vec<ListItem> = sources
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let d = &s.descriptor;
                let (icon, color) = match d.class {
                    SourceClass::Download => ("▼", Color::Red),
                    SourceClass::Debrid => ("■", Color::Green),
                };
                let selected = i == app.source_index;

                let (detail, _) = d.detail.unicode_truncate(width);
                let (subtitle, _) = d.subtitle.unicode_truncate(width);
                let mut first = vec![
                    Span::styled(format!("{} ", icon), Style::default().fg(color)),
                    Span::raw(detail.to_string()),
                ];
                if let Some(ref quality) = d.quality {
                    first.push(Span::styled(
                        format!("  [{}]", quality),
                        Style::default().add_modifier(Modifier::BOLD),
                    ));
                }

                ListItem::new(vec![
                    Line::from(first),
                    Line::from(Span::styled(
                        format!("  {}", subtitle),
                        Style::default().fg(if selected { Color::Black } else { Color::DarkGray }),
                    )),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Sources [{}]", sources.len())),
            )
            .highlight_style(selected_style());
        let mut state = ListState::default().with_selected(Some(app.source_index));
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    let help = Paragraph::new("↑/↓: navigate | Enter: open in player | Esc: back")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[2]);
}

fn draw_dispatched(frame: &mut Frame) {
    let launching = Paragraph::new("Opening in player...")
        .style(Style::default().fg(Color::Green))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(launching, frame.area());
}
