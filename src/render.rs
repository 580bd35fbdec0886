//! Pure conversion of catalog entities into display cards.
//!
//! Cards carry plain text only; the TUI decides how to style and lay them out.

use itertools::Itertools;

use crate::catalog::{Episode, Show};
use crate::format::markup_to_text;

pub const NO_EPISODE_SUMMARY: &str = "No summary for this episode.";
pub const NO_SHOW_SUMMARY: &str = "No summary for this show.";

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: u64,
    pub title: String,
    pub meta: Vec<String>,
    pub image_url: Option<String>,
    pub summary: Vec<String>,
}

fn summary_lines(summary: Option<&str>, placeholder: &str) -> Vec<String> {
    let lines = summary.map(markup_to_text).unwrap_or_default();
    if lines.is_empty() {
        vec![placeholder.to_string()]
    } else {
        lines
    }
}

pub fn show_card(show: &Show) -> Card {
    let genres = if show.genres.is_empty() {
        "-".to_string()
    } else {
        show.genres.iter().join(", ")
    };
    let rating = show
        .rating()
        .map(|r| format!("★ {:.1}", r))
        .unwrap_or_else(|| "★ n/a".to_string());
    let runtime = show
        .runtime
        .map(|m| format!("{} min", m))
        .unwrap_or_else(|| "? min".to_string());

    Card {
        id: show.id,
        title: show.name.clone(),
        meta: vec![
            format!("Genres: {}", genres),
            format!(
                "Status: {} | Rating: {} | Runtime: {}",
                show.status.as_deref().unwrap_or("Unknown"),
                rating,
                runtime
            ),
        ],
        image_url: show.image_url().map(String::from),
        summary: summary_lines(show.summary.as_deref(), NO_SHOW_SUMMARY),
    }
}

pub fn episode_card(episode: &Episode) -> Card {
    let mut info = format!(
        "Season {} Episode {}",
        episode.season,
        episode.number.unwrap_or(0)
    );
    if let Some(airdate) = episode.airdate.as_deref().filter(|d| !d.is_empty()) {
        info.push_str(&format!(" | Aired {}", airdate));
    }

    Card {
        id: episode.id,
        title: format!("{} - {}", episode.name, episode.code()),
        meta: vec![info],
        image_url: episode.image_url().map(String::from),
        summary: summary_lines(episode.summary.as_deref(), NO_EPISODE_SUMMARY),
    }
}
