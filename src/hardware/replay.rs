//! Replay provider playing back a recorded track
//!
//! Samples are delivered from a worker thread with the same spacing they
//! were recorded with (scaled by the playback rate). Each delivered fix is
//! stamped with its arrival time, the way a live location service reports it.

use crate::algorithms::haversine::distance;
use crate::core::constants::{MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE};
use crate::core::{Fix, UpdateThresholds};
use crate::hardware::{FixHandler, LocationProvider, ProviderError, ProviderResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Upper bound on a single pause between samples
pub const MAX_SAMPLE_WAIT: Duration = Duration::from_secs(3600);

/// One recorded position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSample {
    pub lat: f64,
    pub lon: f64,
    /// Time since the start of the recording (ms)
    pub offset_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

/// Recorded track file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub samples: Vec<TrackSample>,
}

impl Track {
    pub fn from_json(json: &str) -> ProviderResult<Self> {
        let track: Track = serde_json::from_str(json).map_err(|e| ProviderError::Track {
            message: format!("Failed to parse track: {}", e),
        })?;
        track.validate()?;
        Ok(track)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> ProviderResult<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let content = fs::read_to_string(&path).map_err(|e| ProviderError::Track {
            message: format!("Failed to read track file '{}': {}", path_str, e),
        })?;
        Self::from_json(&content)
    }

    /// Offsets must never go backwards
    pub fn validate(&self) -> ProviderResult<()> {
        for (index, pair) in self.samples.windows(2).enumerate() {
            if pair[1].offset_ms < pair[0].offset_ms {
                return Err(ProviderError::Track {
                    message: format!(
                        "sample {} has offset {} ms, earlier than the preceding {} ms",
                        index + 1,
                        pair[1].offset_ms,
                        pair[0].offset_ms
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

struct Worker {
    cancel: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// Location provider backed by a recorded track
pub struct ReplayProvider {
    track: Arc<Track>,
    playback_rate: f64,
    handler: Arc<Mutex<Option<FixHandler>>>,
    cursor: Arc<AtomicUsize>,
    worker: Option<Worker>,
}

impl ReplayProvider {
    pub fn new(track: Track) -> Self {
        Self {
            track: Arc::new(track),
            playback_rate: 1.0,
            handler: Arc::new(Mutex::new(None)),
            cursor: Arc::new(AtomicUsize::new(0)),
            worker: None,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> ProviderResult<Self> {
        Ok(Self::new(Track::from_file(path)?))
    }

    /// Speed up (> 1.0) or slow down (< 1.0) playback
    pub fn with_playback_rate(mut self, rate: f64) -> Self {
        if (MIN_PLAYBACK_RATE..=MAX_PLAYBACK_RATE).contains(&rate) {
            self.playback_rate = rate;
        } else {
            warn!(rate, "ignoring invalid playback rate");
        }
        self
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Index of the next sample to be considered
    pub fn position(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    pub fn is_exhausted(&self) -> bool {
        self.position() >= self.track.len()
    }

    /// Restart playback from the first sample on the next `start`
    pub fn rewind(&mut self) {
        self.cursor.store(0, Ordering::SeqCst);
    }

    fn join_worker(worker: Worker) -> ProviderResult<()> {
        // the worker may already have finished the track and dropped its receiver
        let _ = worker.cancel.send(());
        worker.handle.join().map_err(|_| ProviderError::Unavailable {
            reason: "replay worker panicked".to_string(),
        })
    }
}

impl LocationProvider for ReplayProvider {
    fn configure(&mut self, handler: FixHandler) {
        match self.handler.lock() {
            Ok(mut slot) => *slot = Some(handler),
            Err(poisoned) => *poisoned.into_inner() = Some(handler),
        }
    }

    fn start(&mut self, thresholds: &UpdateThresholds) -> ProviderResult<()> {
        if let Some(worker) = self.worker.take() {
            if !worker.handle.is_finished() {
                self.worker = Some(worker);
                return Err(ProviderError::AlreadyRunning);
            }
            Self::join_worker(worker)?;
        }

        let configured = self.handler.lock().map(|slot| slot.is_some()).unwrap_or(false);
        if !configured {
            return Err(ProviderError::NotConfigured);
        }

        let (cancel, cancel_rx) = mpsc::channel();
        let playback = Playback {
            track: Arc::clone(&self.track),
            cursor: Arc::clone(&self.cursor),
            handler: Arc::clone(&self.handler),
            thresholds: *thresholds,
            playback_rate: self.playback_rate,
        };
        let handle = thread::Builder::new()
            .name("replay-provider".to_string())
            .spawn(move || playback.run(cancel_rx))
            .map_err(|e| ProviderError::Unavailable {
                reason: format!("Failed to spawn replay worker: {}", e),
            })?;

        info!(
            samples = self.track.len(),
            from = self.position(),
            rate = self.playback_rate,
            "replay started"
        );
        self.worker = Some(Worker { cancel, handle });
        Ok(())
    }

    fn stop(&mut self) -> ProviderResult<()> {
        let worker = self.worker.take().ok_or(ProviderError::NotRunning)?;
        Self::join_worker(worker)?;
        info!(position = self.position(), "replay stopped");
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .map_or(false, |worker| !worker.handle.is_finished())
    }

    fn name(&self) -> &str {
        "replay"
    }
}

impl Drop for ReplayProvider {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            if let Err(e) = Self::join_worker(worker) {
                warn!("replay worker did not shut down cleanly: {}", e);
            }
        }
    }
}

/// State moved onto the worker thread
struct Playback {
    track: Arc<Track>,
    cursor: Arc<AtomicUsize>,
    handler: Arc<Mutex<Option<FixHandler>>>,
    thresholds: UpdateThresholds,
    playback_rate: f64,
}

impl Playback {
    fn run(self, cancel: mpsc::Receiver<()>) {
        let mut previous_offset: Option<u64> = None;
        let mut last_delivered: Option<&TrackSample> = None;

        loop {
            let index = self.cursor.load(Ordering::SeqCst);
            let sample = match self.track.samples.get(index) {
                Some(sample) => sample,
                None => {
                    info!("replay track exhausted");
                    return;
                }
            };

            let gap_ms = previous_offset.map_or(0, |prev| sample.offset_ms.saturating_sub(prev));
            let wait = sample_wait(gap_ms, self.playback_rate);
            match cancel.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            }
            previous_offset = Some(sample.offset_ms);
            self.cursor.store(index + 1, Ordering::SeqCst);

            if !should_deliver(last_delivered, sample, &self.thresholds) {
                debug!(index, "sample suppressed by update thresholds");
                continue;
            }
            last_delivered = Some(sample);
            self.deliver(sample);
        }
    }

    fn deliver(&self, sample: &TrackSample) {
        let mut fix = Fix::new(sample.lat, sample.lon, arrival_time());
        fix.altitude_m = sample.altitude;
        fix.accuracy_m = sample.accuracy;

        match self.handler.lock() {
            Ok(slot) => {
                if let Some(handler) = slot.as_ref() {
                    handler(fix);
                }
            }
            Err(_) => warn!("fix handler lock poisoned, dropping fix"),
        }
    }
}

/// Whether `sample` clears both thresholds relative to the last delivered one
pub(crate) fn should_deliver(
    last: Option<&TrackSample>,
    sample: &TrackSample,
    thresholds: &UpdateThresholds,
) -> bool {
    let last = match last {
        Some(last) => last,
        None => return true,
    };
    let elapsed_ms = sample.offset_ms.saturating_sub(last.offset_ms);
    let moved_m = distance(last.lat, last.lon, sample.lat, sample.lon);
    elapsed_ms >= thresholds.min_interval_ms && moved_m >= thresholds.min_distance_m
}

/// Real time to wait for a recorded gap, capped at [`MAX_SAMPLE_WAIT`]
pub(crate) fn sample_wait(gap_ms: u64, playback_rate: f64) -> Duration {
    let seconds = gap_ms as f64 / 1000.0 / playback_rate;
    Duration::try_from_secs_f64(seconds)
        .map(|wait| wait.min(MAX_SAMPLE_WAIT))
        .unwrap_or(MAX_SAMPLE_WAIT)
}

fn arrival_time() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
