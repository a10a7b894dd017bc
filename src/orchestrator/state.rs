//! Externally observable capture status.
//!
//! [`CaptureStatus`] is a projection of the orchestrator's internal state;
//! every change is published as `CaptureOutput::StatusChanged`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CaptureStatus
// ---------------------------------------------------------------------------

/// States of the face-gated capture flow.
///
/// ```text
/// NotLoaded ──load──▶ Loading ──▶ Loaded ──start──▶ Running ⇄ FaceDetected
///                                                     │            │
///                                                     │       first tick
///                                                     │            ▼
///                                                     │     Countdown(n) ⇄ Recording
///                                                     │            │
///                                                     │       countdown done
///                                                     │            ▼
///                                                     │     CaptureComplete ──▶ ProcessingVideo ──▶ VideoReady
///                                                     │                                               │
///                                                     ◀──────────────── capture again ────────────────┘
/// Running ──stop──▶ Stopped          any ──failure──▶ Error
/// Stopped / Error ──restart──▶ Loading ──▶ Running
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "remaining", rename_all = "camelCase")]
pub enum CaptureStatus {
    /// Nothing initialised yet.
    NotLoaded,

    /// Detection model and camera are being prepared.
    Loading,

    /// Ready to start the camera.
    Loaded,

    /// Camera running, waiting for an optimally framed face.
    Running,

    /// A face reached the optimal position; the countdown is about to tick.
    FaceDetected,

    /// Countdown in progress with this many ticks remaining.
    Countdown(u32),

    /// The recording session has just started.
    Recording,

    /// The countdown finished and recording is being finalized.
    CaptureComplete,

    /// Waiting for the backend artifact to be materialized.
    ProcessingVideo,

    /// The result has been delivered.
    VideoReady,

    /// Capture was stopped explicitly or for a restart.
    Stopped,

    /// A failure occurred; restart is an explicit external call.
    Error,
}

impl CaptureStatus {
    /// Returns `true` while a countdown or recording is in flight.
    ///
    /// ```
    /// use face_capture::orchestrator::CaptureStatus;
    ///
    /// assert!(!CaptureStatus::Running.is_capturing());
    /// assert!(CaptureStatus::FaceDetected.is_capturing());
    /// assert!(CaptureStatus::Countdown(2).is_capturing());
    /// assert!(CaptureStatus::Recording.is_capturing());
    /// assert!(!CaptureStatus::ProcessingVideo.is_capturing());
    /// ```
    pub fn is_capturing(&self) -> bool {
        matches!(
            self,
            CaptureStatus::FaceDetected | CaptureStatus::Countdown(_) | CaptureStatus::Recording
        )
    }

    /// Detection signals are acted upon in these states.
    pub fn accepts_signals(&self) -> bool {
        matches!(self, CaptureStatus::Running) || self.is_capturing()
    }

    /// The camera is open and the flow can be stopped.
    pub fn is_live(&self) -> bool {
        self.accepts_signals()
            || matches!(
                self,
                CaptureStatus::CaptureComplete
                    | CaptureStatus::ProcessingVideo
                    | CaptureStatus::VideoReady
            )
    }

    /// A short human-readable label suitable for a status line.
    pub fn label(&self) -> String {
        match self {
            CaptureStatus::NotLoaded => "Not loaded".into(),
            CaptureStatus::Loading => "Loading".into(),
            CaptureStatus::Loaded => "Ready".into(),
            CaptureStatus::Running => "Looking for face".into(),
            CaptureStatus::FaceDetected => "Face detected".into(),
            CaptureStatus::Countdown(n) => format!("{n}"),
            CaptureStatus::Recording => "Recording".into(),
            CaptureStatus::CaptureComplete => "Finished".into(),
            CaptureStatus::ProcessingVideo => "Processing video".into(),
            CaptureStatus::VideoReady => "Video ready".into(),
            CaptureStatus::Stopped => "Stopped".into(),
            CaptureStatus::Error => "Error".into(),
        }
    }
}

impl Default for CaptureStatus {
    fn default() -> Self {
        CaptureStatus::NotLoaded
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
