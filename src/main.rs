use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use audiobook_rs::audio::RodioEngine;
use audiobook_rs::config::Config;
use audiobook_rs::controller::{AppController, Services};
use audiobook_rs::logging;
use audiobook_rs::model::{DirectoryCatalog, Intent, TagMetadata, UiState};
use audiobook_rs::view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let _log_guard = match logging::init_logging(&config.log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!(catalog = %config.catalog, library = %config.library.display(), "=== Audiobook-RS Starting ===");

    // The output stream is not Send and must outlive every sink
    let (_stream, engine) = RodioEngine::new()?;

    let (app, intent_loop) = AppController::spawn(Services {
        engine: Arc::new(engine),
        catalogs: Arc::new(DirectoryCatalog::new(config.library.clone())),
        metadata: Arc::new(TagMetadata),
        tick_interval: config.tick_interval(),
    });

    app.send(Intent::LoadCatalog {
        name: config.catalog.clone(),
    });

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    app.shutdown();
    if let Err(e) = intent_loop.await {
        tracing::warn!(error = %e, "Intent loop ended abnormally");
    }

    tracing::info!("Audiobook-RS shutting down");
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &AppController) -> io::Result<()> {
    let mut ui_state = UiState::default();

    loop {
        let now_playing = app.now_playing();

        terminal.draw(|f| {
            AppView::render(f, &now_playing, &ui_state);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key_event(key, &mut ui_state);
            }
        }

        if ui_state.should_quit {
            break;
        }
    }

    Ok(())
}
