//! View module - UI rendering
//!
//! Renders the now-playing snapshot with ratatui. Nothing here mutates
//! playback state.
//!
//! - `utils`: formatting helpers
//! - `progress`: progress bar
//! - `overlays`: error notification and help popup

mod utils;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use crate::model::{NowPlaying, UiState};

pub use utils::{format_duration, format_rate};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, now_playing: &NowPlaying, ui_state: &UiState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Catalog header
                Constraint::Min(0),    // Track details
                Constraint::Length(3), // Progress bar
            ])
            .split(frame.area());

        render_header(frame, chunks[0], now_playing);
        render_track_panel(frame, chunks[1], now_playing);
        progress::render_progress_bar(frame, chunks[2], now_playing);

        if let Some(error_msg) = &now_playing.error_message {
            overlays::render_error_notification(frame, error_msg);
        }

        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}

fn render_header(frame: &mut Frame, area: Rect, now_playing: &NowPlaying) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(25)])
        .split(area);

    let title = now_playing
        .catalog_title
        .as_deref()
        .unwrap_or("Loading catalog...");
    let catalog = Paragraph::new(title)
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Book ")
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(catalog, chunks[0]);

    let cover = now_playing
        .cover_art
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "none".to_string());
    let cover = Paragraph::new(format!("🖼 {}", cover))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Cover "));
    frame.render_widget(cover, chunks[1]);
}

fn render_track_panel(frame: &mut Frame, area: Rect, now_playing: &NowPlaying) {
    let label = Style::default().fg(Color::DarkGray);
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Title   ", label),
            Span::styled(
                now_playing.display_title(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("  Track   ", label),
            Span::raw(format!("{} of {}", now_playing.track_number, now_playing.track_count)),
        ]),
        Line::from(vec![
            Span::styled("  Speed   ", label),
            Span::raw(format_rate(now_playing.rate)),
        ]),
        Line::from(""),
        Line::from(Span::styled("  Press H for help", label)),
    ];

    let panel = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Now Playing "));
    frame.render_widget(panel, area);
}
