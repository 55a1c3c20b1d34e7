//! Audio engine capability and the rodio-backed implementation
//!
//! The rest of the crate only talks to [`AudioEngine`] and [`TrackHandle`];
//! tests swap in a scripted engine through the same traits.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::{Hint, ProbeResult};

use crate::error::EngineError;

/// One loaded, decodable audio resource. Dropping it releases the resource.
pub trait TrackHandle: Send {
    fn duration(&self) -> Duration;
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, to: Duration);
    fn set_rate(&mut self, rate: f32);
    fn position(&self) -> Duration;
    /// End-of-resource: playback ran off the end of the track
    fn is_finished(&self) -> bool;
}

pub trait AudioEngine: Send + Sync {
    /// Open and prepare `path`, paused at the start.
    fn open(&self, path: &Path) -> Result<Box<dyn TrackHandle>, EngineError>;
}

pub struct RodioEngine {
    handle: OutputStreamHandle,
}

impl RodioEngine {
    /// Opens the default output device. The returned stream must outlive the
    /// engine; it is not `Send`, so the caller keeps it on its own thread.
    pub fn new() -> Result<(OutputStream, Self), EngineError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| EngineError::Output(e.to_string()))?;
        tracing::info!("Audio output opened");
        Ok((stream, Self { handle }))
    }
}

impl AudioEngine for RodioEngine {
    fn open(&self, path: &Path) -> Result<Box<dyn TrackHandle>, EngineError> {
        let file = File::open(path).map_err(|source| EngineError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decoder = Decoder::new(BufReader::new(file)).map_err(|e| EngineError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let duration = match probe_duration(path) {
            Ok(Some(duration)) => duration,
            Ok(None) | Err(_) => decoder.total_duration().ok_or_else(|| EngineError::Decode {
                path: path.to_path_buf(),
                reason: "unknown duration".to_string(),
            })?,
        };

        let sink = Sink::try_new(&self.handle).map_err(|e| EngineError::Output(e.to_string()))?;
        sink.pause();
        sink.append(decoder);

        tracing::debug!(path = %path.display(), ?duration, "Track opened");
        Ok(Box::new(RodioTrack { sink, duration }))
    }
}

struct RodioTrack {
    sink: Sink,
    duration: Duration,
}

impl TrackHandle for RodioTrack {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn seek(&mut self, to: Duration) {
        if let Err(e) = self.sink.try_seek(to) {
            tracing::warn!(error = %e, ?to, "Seek failed");
        }
    }

    fn set_rate(&mut self, rate: f32) {
        self.sink.set_speed(rate);
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}

/// Probe the container of `path` with symphonia.
pub(crate) fn probe(path: &Path) -> Result<ProbeResult, EngineError> {
    let file = File::open(path).map_err(|source| EngineError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| EngineError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Track length from the container's frame count, if it declares one.
pub fn probe_duration(path: &Path) -> Result<Option<Duration>, EngineError> {
    let probed = probe(path)?;
    let Some(track) = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
    else {
        return Ok(None);
    };

    let params = &track.codec_params;
    let Some(frames) = params.n_frames else {
        return Ok(None);
    };

    if let Some(time_base) = params.time_base {
        let time = time_base.calc_time(frames);
        return Ok(Some(
            Duration::from_secs(time.seconds) + Duration::from_secs_f64(time.frac),
        ));
    }

    Ok(params
        .sample_rate
        .map(|rate| Duration::from_secs_f64(frames as f64 / f64::from(rate))))
}
