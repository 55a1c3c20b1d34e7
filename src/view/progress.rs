//! Progress bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::NowPlaying;
use super::utils::{format_duration, format_rate, truncate_string};

pub fn render_progress_bar(frame: &mut Frame, area: Rect, now_playing: &NowPlaying) {
    let title_width = area.width.saturating_sub(8) as usize;
    let status_text = if !now_playing.is_catalog_loaded {
        " Nothing loaded".to_string()
    } else if now_playing.is_playing {
        format!(" ▶ {}", truncate_string(&now_playing.display_title(), title_width))
    } else {
        format!("⏸  {}", truncate_string(&now_playing.display_title(), title_width))
    };

    let time_str = format!(
        "{} / {}",
        format_duration(now_playing.current_time),
        format_duration(now_playing.duration)
    );

    let controls_info = format!(
        " Track {}/{} | Speed: {} ",
        now_playing.track_number,
        now_playing.track_count,
        format_rate(now_playing.rate)
    );

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", status_text))
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(now_playing.progress_ratio())
        .label(time_str);

    frame.render_widget(gauge, area);
}
