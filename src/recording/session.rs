//! Lifecycle of a single recording attempt.
//!
//! ```text
//! start ──▶ Recording ──deadline / stop()──▶ Finalizing ──artifact──▶ Materializing
//!              │                                 │                        │
//!              └──────────── cancel() ───────────┴──▶ Discarded           ├─▶ Completed
//!                                                                         └─▶ Failed
//! ```
//!
//! The outcome travels through a one-shot channel created at `start`, so it
//! is delivered at most once, and a cancelled session still reaches a
//! terminal outcome (`Discarded`) immediately.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use tokio::time::Instant;
use uuid::Uuid;

use super::artifact::{Artifact, CaptureResult};
use crate::backend::{CaptureBackend, RecordingSpec};
use crate::config::VideoQuality;
use crate::error::CaptureError;
use crate::timer::{TimerKind, TimerSink, TimerSlot};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The live recording, owned exclusively by [`RecordingSession`].
#[derive(Debug, Clone)]
pub struct CaptureSession {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub target_duration: Duration,
    started: Instant,
}

impl CaptureSession {
    /// Elapsed / target, clamped to `[0, 1]`.
    pub fn progress_at(&self, now: Instant) -> f32 {
        progress_ratio(now.saturating_duration_since(self.started), self.target_duration)
    }
}

/// Terminal result of one session.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordingOutcome {
    Completed(CaptureResult),
    Discarded,
    Failed(CaptureError),
}

/// Returned by [`RecordingSession::start`].
#[derive(Debug)]
pub struct SessionHandle {
    pub session_id: Uuid,
    pub outcome: oneshot::Receiver<RecordingOutcome>,
}

/// Result of one accepted progress tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub session_id: Uuid,
    pub ratio: f32,
    /// The target duration has elapsed; the caller should stop the session.
    pub deadline_reached: bool,
}

/// What to do with an artifact reported by the backend.
#[derive(Debug)]
pub enum ArtifactDisposition {
    /// Belongs to the live session: materialize it.
    Materialize(Artifact),
    /// Belongs to a discarded or unknown session: delete it.
    Discard(Artifact),
}

/// `elapsed / target` clamped to `[0, 1]`; a zero target is complete.
pub fn progress_ratio(elapsed: Duration, target: Duration) -> f32 {
    if target.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / target.as_secs_f64()).clamp(0.0, 1.0) as f32
}

// ---------------------------------------------------------------------------
// RecordingSession
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Active {
    info: CaptureSession,
    completion: Option<oneshot::Sender<RecordingOutcome>>,
    last_progress: f32,
    stop_requested: bool,
    materializing: bool,
}

/// Owner of the single recording slot.
#[derive(Debug)]
pub struct RecordingSession {
    backend: Arc<dyn CaptureBackend>,
    active: Option<Active>,
    progress_timer: TimerSlot,
    progress_interval: Duration,
    quality: VideoQuality,
    microphone_enabled: bool,
}

impl RecordingSession {
    pub fn new(
        backend: Arc<dyn CaptureBackend>,
        sink: TimerSink,
        progress_interval: Duration,
    ) -> Self {
        Self {
            backend,
            active: None,
            progress_timer: TimerSlot::new(TimerKind::RecordingProgress, sink),
            progress_interval,
            quality: VideoQuality::default(),
            microphone_enabled: true,
        }
    }

    /// Settings used by the next `start`; a live session keeps its own.
    pub fn apply_settings(
        &mut self,
        progress_interval: Duration,
        quality: VideoQuality,
        microphone_enabled: bool,
    ) {
        self.progress_interval = progress_interval;
        self.quality = quality;
        self.microphone_enabled = microphone_enabled;
    }

    /// Begin recording for `target_duration`.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::AlreadyRecording`] while any session occupies the slot
    ///   (including one that is still finalizing).
    /// - Whatever the backend returns when it refuses to start.
    pub async fn start(
        &mut self,
        target_duration: Duration,
    ) -> Result<SessionHandle, CaptureError> {
        if self.active.is_some() {
            return Err(CaptureError::AlreadyRecording);
        }

        let session_id = Uuid::new_v4();
        let spec = RecordingSpec {
            target_duration,
            quality: self.quality,
            microphone_enabled: self.microphone_enabled,
        };
        self.backend.start_recording(session_id, &spec).await?;

        let (tx, rx) = oneshot::channel();
        self.active = Some(Active {
            info: CaptureSession {
                session_id,
                started_at: Utc::now(),
                target_duration,
                started: Instant::now(),
            },
            completion: Some(tx),
            last_progress: 0.0,
            stop_requested: false,
            materializing: false,
        });
        self.progress_timer.start_repeating(self.progress_interval);

        log::info!("recording: session {session_id} started ({target_duration:?})");
        Ok(SessionHandle {
            session_id,
            outcome: rx,
        })
    }

    /// Process a progress tick; stale ticks yield `None`.
    ///
    /// The reported ratio never decreases within a session.
    pub fn on_progress_tick(&mut self, generation: u64) -> Option<ProgressUpdate> {
        if !self.progress_timer.accepts(generation) {
            return None;
        }
        let active = self.active.as_mut()?;
        let ratio = active
            .info
            .progress_at(Instant::now())
            .max(active.last_progress);
        active.last_progress = ratio;

        Some(ProgressUpdate {
            session_id: active.info.session_id,
            ratio,
            deadline_reached: ratio >= 1.0,
        })
    }

    /// Ask the backend to finalize the capture.
    ///
    /// No-op when nothing is recording or a stop was already requested.
    /// Returns `true` when a stop was actually issued.
    pub async fn stop(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if active.stop_requested {
            return false;
        }
        active.stop_requested = true;
        let session_id = active.info.session_id;
        self.progress_timer.cancel();

        log::info!("recording: stopping session {session_id}");
        self.backend.stop_recording(session_id).await;
        true
    }

    /// Abandon the live session and deliver `Discarded`.
    ///
    /// The slot is released immediately, so an artifact or materialization
    /// that arrives later for this session no longer matches and is dropped.
    /// No-op when idle.
    pub async fn cancel(&mut self) -> bool {
        let Some(mut active) = self.active.take() else {
            return false;
        };
        self.progress_timer.cancel();
        let session_id = active.info.session_id;

        if !active.stop_requested {
            self.backend.stop_recording(session_id).await;
        }
        if let Some(tx) = active.completion.take() {
            let _ = tx.send(RecordingOutcome::Discarded);
        }
        log::info!("recording: session {session_id} discarded");
        true
    }

    /// Route an artifact reported by the backend.
    ///
    /// Only the live session's first artifact is materialized; anything else
    /// (a discarded session, a duplicate) is handed back for deletion.
    pub fn artifact_ready(&mut self, session_id: Uuid, artifact: Artifact) -> ArtifactDisposition {
        match self.active.as_mut() {
            Some(active) if active.info.session_id == session_id && !active.materializing => {
                active.materializing = true;
                active.stop_requested = true;
                self.progress_timer.cancel();
                ArtifactDisposition::Materialize(artifact)
            }
            _ => {
                log::debug!("recording: artifact for inactive session {session_id}, deleting");
                ArtifactDisposition::Discard(artifact)
            }
        }
    }

    /// The backend could not produce an artifact.
    pub fn artifact_failed(&mut self, session_id: Uuid, cause: String) -> bool {
        self.finish(
            session_id,
            RecordingOutcome::Failed(CaptureError::VideoProcessingFailed(cause)),
        )
    }

    /// Materialization finished; deliver the outcome and release the slot.
    pub fn materialized(
        &mut self,
        session_id: Uuid,
        result: Result<CaptureResult, CaptureError>,
    ) -> bool {
        let outcome = match result {
            Ok(result) => RecordingOutcome::Completed(result),
            Err(e) => RecordingOutcome::Failed(e),
        };
        self.finish(session_id, outcome)
    }

    fn finish(&mut self, session_id: Uuid, outcome: RecordingOutcome) -> bool {
        match self.active.as_ref() {
            Some(active) if active.info.session_id == session_id => {}
            _ => {
                log::debug!("recording: ignoring outcome for inactive session {session_id}");
                return false;
            }
        }
        let Some(mut active) = self.active.take() else {
            return false;
        };
        self.progress_timer.cancel();

        if let Some(tx) = active.completion.take() {
            let _ = tx.send(outcome);
        }
        true
    }

    /// A session occupies the slot (recording or finalizing).
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Frames are still being captured.
    pub fn is_recording(&self) -> bool {
        self.active.as_ref().is_some_and(|a| !a.stop_requested)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
