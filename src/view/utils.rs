//! Utility functions for rendering UI components

use std::time::Duration;

use ratatui::layout::Rect;

/// `m:ss`, or `h:mm:ss` for anything an hour or longer
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = total_seconds / 60 % 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Playback rate without trailing zeros, e.g. `1×`, `1.25×`
pub fn format_rate(rate: f32) -> String {
    let text = format!("{:.2}", rate);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{}×", text)
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
