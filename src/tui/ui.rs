use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use unicode_truncate::UnicodeTruncateStr;

use crate::render::{Card, episode_card, show_card};

use super::app::{App, LoadState, Popup, View};

pub const NO_EPISODES: &str = "No episodes to display.";
pub const NO_SHOWS: &str = "No shows to display.";
const CREDIT: &str = "Data from TVMaze.com";

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(3), // Search input
            Constraint::Length(1), // Count / status
            Constraint::Min(0),    // Cards
            Constraint::Length(1), // Credit
            Constraint::Length(1), // Help
        ])
        .split(frame.area());

    draw_title(frame, app, chunks[0]);
    draw_search(frame, app, chunks[1]);

    let count = Paragraph::new(app.count_label()).style(Style::default().fg(Color::Cyan));
    frame.render_widget(count, chunks[2]);

    draw_cards(frame, app, chunks[3]);

    let credit = Paragraph::new(CREDIT).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(credit, chunks[4]);

    let help = Paragraph::new(help_text(app)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[5]);

    match app.popup {
        Popup::None => {}
        Popup::ShowSelector => draw_show_selector(frame, app),
        Popup::EpisodeJump => draw_episode_jump(frame, app),
    }
}

fn draw_title(frame: &mut Frame, app: &App, area: Rect) {
    let text = match &app.view {
        View::ShowList => "showdeck".to_string(),
        View::EpisodeList(show) => format!("showdeck › {}", show.name),
    };
    let title = Paragraph::new(text).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(title, area);
}

fn draw_search(frame: &mut Frame, app: &App, area: Rect) {
    let label = match app.view {
        View::ShowList => "Search shows",
        View::EpisodeList(_) => "Search episodes",
    };
    let input = Paragraph::new(app.search_input.as_str())
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL).title(label));
    frame.render_widget(input, area);

    if app.popup == Popup::None {
        frame.set_cursor_position(search_cursor(area, &app.search_input));
    }
}

/// Cursor just after the typed text, kept inside the input's borders
fn search_cursor(area: Rect, input: &str) -> (u16, u16) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let offset = input.chars().count().min(inner_width.saturating_sub(1)) as u16;
    (area.x + 1 + offset, area.y + 1)
}

fn draw_cards(frame: &mut Frame, app: &App, area: Rect) {
    let (cards, empty_message, noun) = match app.view {
        View::ShowList => (
            app.visible_shows().into_iter().map(show_card).collect::<Vec<_>>(),
            NO_SHOWS,
            "shows",
        ),
        View::EpisodeList(_) => (
            app.visible_episodes()
                .into_iter()
                .map(episode_card)
                .collect::<Vec<_>>(),
            NO_EPISODES,
            "episodes",
        ),
    };

    let block = Block::default().borders(Borders::ALL);

    match app.load_state() {
        LoadState::Loading => {
            let loading = Paragraph::new("Loading...")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(loading, area);
            return;
        }
        LoadState::Failed(_) => {
            let failed = Paragraph::new(vec![
                Line::from(Span::styled(
                    format!("Failed to load {}.", noun),
                    Style::default().fg(Color::Red),
                )),
                Line::from(Span::styled(
                    "Press Ctrl-R to retry.",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .block(block);
            frame.render_widget(failed, area);
            return;
        }
        LoadState::Loaded => {}
    }

    if cards.is_empty() {
        let empty = Paragraph::new(empty_message)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = cards
        .iter()
        .map(|card| card_item(card, width, app.highlighted_episode == Some(card.id)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("▌");

    let mut state = ListState::default();
    state.select(Some(app.selected_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn card_item(card: &Card, width: usize, highlighted: bool) -> ListItem<'static> {
    let title_style = if highlighted {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    };

    let mut lines = vec![Line::from(Span::styled(card.title.clone(), title_style))];
    lines.extend(
        card.meta
            .iter()
            .map(|m| Line::from(Span::styled(m.clone(), Style::default().fg(Color::Gray)))),
    );
    if let Some(url) = &card.image_url {
        lines.push(Line::from(Span::styled(
            format!("Image: {}", url),
            Style::default().fg(Color::DarkGray),
        )));
    }
    for paragraph in &card.summary {
        lines.extend(wrap(paragraph, width).into_iter().map(Line::from));
    }
    lines.push(Line::from(""));

    ListItem::new(lines)
}

/// Greedy word wrap; words longer than `width` get a line of their own
fn wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn help_text(app: &App) -> &'static str {
    match (app.popup, &app.view) {
        (Popup::None, View::ShowList) => {
            "Type: search | ↑/↓: select | Enter: episodes | Tab: pick show | Esc: quit"
        }
        (Popup::None, View::EpisodeList(_)) => {
            "Type: search | ↑/↓: scroll | Tab: jump to episode | Esc: back"
        }
        _ => "↑/↓: select | Enter: confirm | Esc: close",
    }
}

/// Centered rectangle taking the given percentage of `area`
fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn draw_popup(frame: &mut Frame, title: &str, labels: Vec<String>, selected: usize) {
    let area = centered(frame.area(), 60, 70);
    let width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = labels
        .iter()
        .map(|label| ListItem::new(label.unicode_truncate(width).0.to_string()))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .style(Style::default().fg(Color::White)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    state.select(Some(selected));

    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_show_selector(frame: &mut Frame, app: &App) {
    let labels = app.shows.iter().map(|s| s.name.clone()).collect();
    draw_popup(frame, "Select a show", labels, app.popup_index);
}

fn draw_episode_jump(frame: &mut Frame, app: &App) {
    let mut labels = vec!["Show all episodes".to_string()];
    labels.extend(app.episodes.iter().map(|e| e.display_title()));
    draw_popup(frame, "Jump to episode", labels, app.popup_index);
}
