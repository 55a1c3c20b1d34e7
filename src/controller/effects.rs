//! Effect execution
//!
//! Transport effects (play, pause, seek, rate) run inline so they keep the
//! order the reducer issued them in. Loads and lookups run as spawned tasks
//! whose results come back as intents. Track loads take the controller lock
//! before spawning, so a transport effect issued after a load waits for it. The tick stream is a subscription
//! keyed by [`SubscriptionId`]; at most one task is registered per identity.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::{mpsc, Mutex};
use tokio::task::AbortHandle;

use crate::error::{CatalogError, ErrorInfo};
use crate::model::{CatalogSource, Effect, Intent, MetadataResolver, SubscriptionId};

use super::playback::PlaybackController;
use super::player_events::tick_stream;

pub struct EffectScheduler {
    controller: Arc<Mutex<PlaybackController>>,
    catalogs: Arc<dyn CatalogSource>,
    metadata: Arc<dyn MetadataResolver>,
    intents: mpsc::UnboundedSender<Intent>,
    subscriptions: HashMap<SubscriptionId, AbortHandle>,
    tick_interval: Duration,
}

impl EffectScheduler {
    pub fn new(
        controller: Arc<Mutex<PlaybackController>>,
        catalogs: Arc<dyn CatalogSource>,
        metadata: Arc<dyn MetadataResolver>,
        intents: mpsc::UnboundedSender<Intent>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            controller,
            catalogs,
            metadata,
            intents,
            subscriptions: HashMap::new(),
            tick_interval,
        }
    }

    pub async fn run(&mut self, effect: Effect) {
        tracing::debug!(?effect, "Running effect");
        match effect {
            Effect::ResolveCatalog { name } => self.resolve_catalog(name),
            Effect::LoadTrack => self.load_track().await,
            Effect::Navigate(direction) => {
                // Held from here so later transport effects queue behind the load.
                let mut controller = self.controller.clone().lock_owned().await;
                let intents = self.intents.clone();
                tokio::spawn(async move {
                    let result = controller.advance(direction);
                    let released = !controller.is_loaded();
                    drop(controller);
                    match result {
                        Ok((duration, index)) => {
                            let _ = intents.send(Intent::TrackLoaded { duration, index });
                            let _ = intents.send(Intent::Play);
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, ?direction, "Track change failed");
                            let _ = intents.send(Intent::Error(e.into()));
                            // The old track is gone, so stop claiming playback.
                            if released {
                                let _ = intents.send(Intent::Pause);
                            }
                        }
                    }
                });
            }
            Effect::ResolveMetadata { generation } => {
                let controller = self.controller.clone();
                let metadata = self.metadata.clone();
                let intents = self.intents.clone();
                tokio::spawn(async move {
                    let track = controller.lock().await.current_track();
                    let title = match track {
                        Some(track) => metadata.title(track).await,
                        None => None,
                    };
                    let _ = intents.send(Intent::MetadataResolved { title, generation });
                });
            }
            Effect::Play => {
                let result = self.controller.lock().await.play();
                crate::log_engine_result!("play", result);
                if let Err(e) = result {
                    self.dispatch(Intent::Error(e.into()));
                }
            }
            Effect::Pause => self.controller.lock().await.pause(),
            Effect::Seek(to) => self.controller.lock().await.seek(to),
            Effect::SetRate(rate) => self.controller.lock().await.set_rate(rate),
            Effect::Subscribe { id, cancel_in_flight } => self.subscribe(id, cancel_in_flight),
            Effect::Cancel(id) => self.cancel(id),
            Effect::Dispatch(intent) => self.dispatch(intent),
        }
    }

    /// Number of registered subscriptions whose task is still running
    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Cancel every subscription
    pub fn shutdown(&mut self) {
        for (id, handle) in self.subscriptions.drain() {
            tracing::debug!(?id, "Cancelling subscription on shutdown");
            handle.abort();
        }
    }

    fn dispatch(&self, intent: Intent) {
        if self.intents.send(intent).is_err() {
            tracing::debug!("Intent loop closed, dropping intent");
        }
    }

    fn resolve_catalog(&self, name: String) {
        let catalogs = self.catalogs.clone();
        let controller = self.controller.clone();
        let intents = self.intents.clone();
        tokio::spawn(async move {
            let lookup = name.clone();
            let result = tokio::task::spawn_blocking(move || catalogs.resolve(&lookup))
                .await
                .unwrap_or_else(|e| Err(CatalogError::Io(e.to_string())));

            let intent = match result {
                Ok(catalog) => {
                    let title = catalog.title.clone();
                    let cover = catalog.cover_art.clone();
                    let count = catalog.len();
                    controller.lock().await.set_catalog(catalog);
                    Intent::CatalogLoaded { title, cover, count }
                }
                Err(e) => {
                    tracing::error!(catalog = %name, error = %e, "Catalog load failed");
                    Intent::Error(ErrorInfo::from(e))
                }
            };
            let _ = intents.send(intent);
        });
    }

    async fn load_track(&self) {
        let mut controller = self.controller.clone().lock_owned().await;
        let intents = self.intents.clone();
        tokio::spawn(async move {
            let result = controller.load_current();
            drop(controller);
            let intent = match result {
                Ok((duration, index)) => Intent::TrackLoaded { duration, index },
                Err(e) => {
                    tracing::warn!(error = %e, "Track load failed");
                    Intent::Error(e.into())
                }
            };
            let _ = intents.send(intent);
        });
    }

    fn subscribe(&mut self, id: SubscriptionId, cancel_in_flight: bool) {
        if let Some(existing) = self.subscriptions.get(&id) {
            if !cancel_in_flight && !existing.is_finished() {
                tracing::debug!(?id, "Subscription already running");
                return;
            }
        }
        self.cancel(id);

        let ticks = tick_stream(self.controller.clone(), self.tick_interval);
        let intents = self.intents.clone();
        let task = tokio::spawn(async move {
            let mut ticks = std::pin::pin!(ticks);
            while let Some(time) = ticks.next().await {
                if intents.send(Intent::Tick(time)).is_err() {
                    break;
                }
            }
        });

        tracing::debug!(?id, "Subscription started");
        self.subscriptions.insert(id, task.abort_handle());
    }

    fn cancel(&mut self, id: SubscriptionId) {
        if let Some(handle) = self.subscriptions.remove(&id) {
            tracing::debug!(?id, "Subscription cancelled");
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Direction;
    use crate::testing::{catalog, EngineCall, FakeCatalogs, FakeEngine, FakeMetadata};
    use std::path::PathBuf;

    const TICK: Duration = Duration::from_millis(10);

    struct Harness {
        engine: FakeEngine,
        scheduler: EffectScheduler,
        intents: mpsc::UnboundedReceiver<Intent>,
    }

    fn harness() -> Harness {
        harness_with(
            FakeEngine::new()
                .with_track("Fables/01.mp3", Duration::from_secs(180))
                .with_track("Fables/02.mp3", Duration::from_secs(200)),
        )
    }

    fn harness_with(engine: FakeEngine) -> Harness {
        let controller = Arc::new(Mutex::new(PlaybackController::new(Arc::new(engine.clone()))));
        let catalogs = FakeCatalogs::default().with(catalog("Fables", 2));
        let metadata = FakeMetadata::default().with_title("Fables/02.mp3", "The Crow and the Pitcher");
        let (tx, rx) = mpsc::unbounded_channel();
        Harness {
            engine,
            scheduler: EffectScheduler::new(controller, Arc::new(catalogs), Arc::new(metadata), tx, TICK),
            intents: rx,
        }
    }

    async fn load_catalog(h: &mut Harness) {
        h.scheduler
            .run(Effect::ResolveCatalog { name: "Fables".to_string() })
            .await;
        h.intents.recv().await.unwrap();
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Intent>) -> Vec<Intent> {
        let mut out = Vec::new();
        while let Ok(intent) = rx.try_recv() {
            out.push(intent);
        }
        out
    }

    #[tokio::test]
    async fn resolve_catalog_reports_title_cover_and_count() {
        let mut h = harness();
        h.scheduler
            .run(Effect::ResolveCatalog { name: "Fables".to_string() })
            .await;
        assert_eq!(
            h.intents.recv().await,
            Some(Intent::CatalogLoaded {
                title: "Fables".to_string(),
                cover: Some(PathBuf::from("Fables/cover.jpg")),
                count: 2,
            })
        );
    }

    #[tokio::test]
    async fn unknown_catalog_becomes_catalog_error() {
        let mut h = harness();
        h.scheduler
            .run(Effect::ResolveCatalog { name: "Missing".to_string() })
            .await;
        match h.intents.recv().await {
            Some(Intent::Error(info)) => assert!(info.is_catalog()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn navigate_loads_then_forces_play() {
        let mut h = harness();
        load_catalog(&mut h).await;
        h.scheduler.run(Effect::LoadTrack).await;
        h.intents.recv().await.unwrap();

        h.scheduler.run(Effect::Navigate(Direction::Next)).await;
        assert_eq!(
            h.intents.recv().await,
            Some(Intent::TrackLoaded {
                duration: Duration::from_secs(200),
                index: 1
            })
        );
        assert_eq!(h.intents.recv().await, Some(Intent::Play));
    }

    #[tokio::test]
    async fn play_issued_after_load_plays_the_loaded_track() {
        let mut h = harness();
        load_catalog(&mut h).await;
        h.engine.clear_calls();

        h.scheduler.run(Effect::LoadTrack).await;
        h.scheduler.run(Effect::Play).await;
        assert_eq!(
            h.intents.recv().await,
            Some(Intent::TrackLoaded {
                duration: Duration::from_secs(180),
                index: 0
            })
        );
        assert_eq!(
            h.engine.calls(),
            vec![
                EngineCall::Open(PathBuf::from("Fables/01.mp3")),
                EngineCall::SetRate(1.0),
                EngineCall::Play,
            ]
        );
        assert_eq!(h.engine.open_handles(), 1);
    }

    #[tokio::test]
    async fn seek_issued_after_navigate_lands_on_the_new_track() {
        let mut h = harness();
        load_catalog(&mut h).await;
        h.scheduler.run(Effect::LoadTrack).await;
        h.intents.recv().await.unwrap();
        h.engine.clear_calls();

        h.scheduler.run(Effect::Navigate(Direction::Next)).await;
        h.scheduler.run(Effect::Seek(Duration::from_secs(30))).await;
        assert_eq!(
            h.engine.calls(),
            vec![
                EngineCall::Open(PathBuf::from("Fables/02.mp3")),
                EngineCall::SetRate(1.0),
                EngineCall::Seek(Duration::from_secs(30)),
            ]
        );
    }

    #[tokio::test]
    async fn failed_track_change_reports_error_then_pauses() {
        let mut h = harness_with(FakeEngine::new().with_track("Fables/01.mp3", Duration::from_secs(180)));
        load_catalog(&mut h).await;
        h.scheduler.run(Effect::Play).await;

        h.scheduler.run(Effect::Navigate(Direction::Next)).await;
        match h.intents.recv().await {
            Some(Intent::Error(info)) => assert_eq!(info.origin, crate::error::ErrorOrigin::Track),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(h.intents.recv().await, Some(Intent::Pause));
        assert_eq!(h.engine.open_handles(), 0);
    }

    #[tokio::test]
    async fn navigate_past_end_reports_boundary() {
        let mut h = harness();
        load_catalog(&mut h).await;
        h.scheduler.run(Effect::Navigate(Direction::Previous)).await;
        match h.intents.recv().await {
            Some(Intent::Error(info)) => assert_eq!(info.origin, crate::error::ErrorOrigin::Navigation),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn metadata_is_tagged_with_generation() {
        let mut h = harness();
        load_catalog(&mut h).await;
        h.scheduler.run(Effect::Navigate(Direction::Next)).await;
        h.intents.recv().await.unwrap();
        h.intents.recv().await.unwrap();

        h.scheduler.run(Effect::ResolveMetadata { generation: 7 }).await;
        assert_eq!(
            h.intents.recv().await,
            Some(Intent::MetadataResolved {
                title: Some("The Crow and the Pitcher".to_string()),
                generation: 7
            })
        );
    }

    #[tokio::test]
    async fn transport_effects_reach_the_engine_in_order() {
        let mut h = harness();
        load_catalog(&mut h).await;
        h.scheduler.run(Effect::Play).await;
        h.scheduler.run(Effect::Seek(Duration::from_secs(30))).await;
        h.scheduler.run(Effect::SetRate(1.25)).await;
        h.scheduler.run(Effect::Pause).await;
        assert_eq!(
            h.engine.calls(),
            vec![
                EngineCall::Open(PathBuf::from("Fables/01.mp3")),
                EngineCall::SetRate(1.0),
                EngineCall::Play,
                EngineCall::Seek(Duration::from_secs(30)),
                EngineCall::SetRate(1.25),
                EngineCall::Pause,
            ]
        );
    }

    #[tokio::test]
    async fn resubscribing_keeps_a_single_ticker() {
        let mut h = harness();
        load_catalog(&mut h).await;
        h.scheduler.run(Effect::LoadTrack).await;
        h.intents.recv().await.unwrap();

        for _ in 0..5 {
            h.scheduler.run(Effect::start_ticks()).await;
        }
        tokio::time::sleep(TICK / 2).await;
        drain(&mut h.intents);
        assert_eq!(h.scheduler.active_subscriptions(), 1);

        tokio::time::sleep(TICK * 10).await;
        let ticks = drain(&mut h.intents)
            .into_iter()
            .filter(|i| matches!(i, Intent::Tick(_)))
            .count();
        assert!(ticks <= 11, "expected one ticker, got {ticks} ticks");

        h.scheduler.run(Effect::stop_ticks()).await;
        assert_eq!(h.scheduler.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn subscribe_without_cancel_keeps_running_ticker() {
        let mut h = harness();
        load_catalog(&mut h).await;
        h.scheduler.run(Effect::start_ticks()).await;
        h.scheduler
            .run(Effect::Subscribe {
                id: SubscriptionId::CurrentTimeUpdater,
                cancel_in_flight: false,
            })
            .await;
        assert_eq!(h.scheduler.active_subscriptions(), 1);
    }

    #[tokio::test]
    async fn ticker_ends_after_track_finishes() {
        let mut h = harness();
        load_catalog(&mut h).await;
        h.scheduler.run(Effect::LoadTrack).await;
        h.intents.recv().await.unwrap();

        h.scheduler.run(Effect::start_ticks()).await;
        h.engine.finish();
        loop {
            match h.intents.recv().await {
                Some(Intent::Tick(t)) if t == Duration::from_secs(180) => break,
                Some(Intent::Tick(_)) => continue,
                other => panic!("unexpected {other:?}"),
            }
        }
        tokio::time::sleep(TICK * 3).await;
        assert!(drain(&mut h.intents).is_empty());
        assert_eq!(h.scheduler.active_subscriptions(), 0);
    }
}
