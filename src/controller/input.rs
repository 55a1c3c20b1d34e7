//! Key event handling

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::model::{Intent, NowPlaying, UiState};
use super::AppController;

impl AppController {
    pub fn handle_key_event(&self, key: KeyEvent, ui_state: &mut UiState) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        let now_playing = self.now_playing();
        if let Some(intent) = key_to_intent(key.code, &now_playing, ui_state) {
            tracing::debug!(?intent, "Key mapped to intent");
            self.send(intent);
        }
    }
}

/// Translate a key press into an intent, updating terminal-only state on the
/// way. Returns `None` for keys that do not drive playback.
pub fn key_to_intent(code: KeyCode, now_playing: &NowPlaying, ui_state: &mut UiState) -> Option<Intent> {
    if matches!(code, KeyCode::Char('q') | KeyCode::Char('Q')) {
        ui_state.should_quit = true;
        return None;
    }

    // Error message blocks everything else until dismissed
    if now_playing.error_message.is_some() {
        return match code {
            KeyCode::Esc | KeyCode::Enter => Some(Intent::DismissError),
            _ => None,
        };
    }

    if ui_state.show_help_popup {
        if matches!(code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
            ui_state.show_help_popup = false;
        }
        return None;
    }

    match code {
        KeyCode::Char(' ') => Some(Intent::TogglePlayPause),
        KeyCode::Left => Some(Intent::SkipBack),
        KeyCode::Right => Some(Intent::SkipForward),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(Intent::NextTrack),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Intent::PreviousTrack),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Intent::SetSpeed),
        // Jump to a tenth of the track
        KeyCode::Char(c @ '0'..='9') => {
            let tenth = c.to_digit(10).unwrap_or(0);
            Some(Intent::Seek(now_playing.duration * tenth / 10))
        }
        KeyCode::Char('h') | KeyCode::Char('H') => {
            ui_state.show_help_popup = true;
            None
        }
        _ => None,
    }
}
