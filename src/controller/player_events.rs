//! Position sampling for the live track

use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use super::playback::PlaybackController;

/// Push sequence of playback positions sampled every `every`.
///
/// When the engine reports end-of-resource the stream yields the track's
/// exact duration once and ends, so a finished track is reported exactly one
/// time. Nothing is yielded while no track is loaded.
pub fn tick_stream(
    controller: Arc<Mutex<PlaybackController>>,
    every: Duration,
) -> impl Stream<Item = Duration> + Send + 'static {
    async_stream::stream! {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let sample = controller.lock().await.sample();
            let Some(sample) = sample else {
                continue;
            };

            if sample.finished {
                tracing::debug!(duration = ?sample.duration, "End of track");
                yield sample.duration;
                break;
            }
            // Only the end-of-resource signal may report the duration itself.
            if sample.position < sample.duration {
                yield sample.position;
            }
        }
    }
}
