//! Controller module - the intent loop and everything that talks to the engine
//!
//! All intents go through one queue and are reduced one at a time, so state
//! never races even though effects run concurrently.
//!
//! - `playback`: engine adapter owning the single live track handle
//! - `effects`: effect execution and identity-keyed subscriptions
//! - `player_events`: position sampling stream
//! - `input`: key event handling

mod input;
mod playback;
mod effects;
mod player_events;

pub use effects::EffectScheduler;
pub use playback::{PlaybackController, PositionSample};
pub use player_events::tick_stream;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex, Notify};
use tokio::task::JoinHandle;

use crate::audio::AudioEngine;
use crate::model::{reduce, CatalogSource, Intent, MetadataResolver, NowPlaying, PlaybackState};

/// Collaborators injected into the intent loop
pub struct Services {
    pub engine: Arc<dyn AudioEngine>,
    pub catalogs: Arc<dyn CatalogSource>,
    pub metadata: Arc<dyn MetadataResolver>,
    pub tick_interval: Duration,
}

/// Handle for sending intents and reading the now-playing snapshot
#[derive(Clone)]
pub struct AppController {
    intents: mpsc::UnboundedSender<Intent>,
    now_playing: watch::Receiver<NowPlaying>,
    shutdown: Arc<Notify>,
}

impl AppController {
    /// Start the intent loop on the current runtime.
    pub fn spawn(services: Services) -> (Self, JoinHandle<()>) {
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(NowPlaying::default());
        let shutdown = Arc::new(Notify::new());

        let controller = Arc::new(Mutex::new(PlaybackController::new(services.engine)));
        let scheduler = EffectScheduler::new(
            controller,
            services.catalogs,
            services.metadata,
            intent_tx.clone(),
            services.tick_interval,
        );

        let task = tokio::spawn(run_intent_loop(
            intent_rx,
            scheduler,
            snapshot_tx,
            shutdown.clone(),
        ));

        (
            Self {
                intents: intent_tx,
                now_playing: snapshot_rx,
                shutdown,
            },
            task,
        )
    }

    pub fn send(&self, intent: Intent) {
        if self.intents.send(intent).is_err() {
            tracing::warn!("Intent loop has stopped, intent dropped");
        }
    }

    pub fn now_playing(&self) -> NowPlaying {
        self.now_playing.borrow().clone()
    }

    /// Receiver that is notified whenever the snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<NowPlaying> {
        self.now_playing.clone()
    }

    /// Stop the loop and cancel the ticker
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}

async fn run_intent_loop(
    mut intents: mpsc::UnboundedReceiver<Intent>,
    mut scheduler: EffectScheduler,
    snapshot: watch::Sender<NowPlaying>,
    shutdown: Arc<Notify>,
) {
    tracing::info!("Intent loop started");
    let mut state = PlaybackState::default();

    loop {
        let intent = tokio::select! {
            biased;
            _ = shutdown.notified() => break,
            intent = intents.recv() => match intent {
                Some(intent) => intent,
                None => break,
            },
        };

        tracing::trace!(?intent, "Reducing intent");
        let effects = reduce(&mut state, intent);

        let next = state.now_playing();
        snapshot.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });

        for effect in effects {
            scheduler.run(effect).await;
        }
    }

    scheduler.shutdown();
    tracing::info!("Intent loop stopped");
}
