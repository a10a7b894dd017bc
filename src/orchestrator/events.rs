//! The closed set of messages flowing into and out of the orchestrator.
//!
//! Every input (platform callbacks, timer ticks, host commands, internal
//! completions) is an [`Event`] on one channel; every output is a
//! [`CaptureOutput`] on another.

use serde::Serialize;
use tokio::sync::oneshot;
use uuid::Uuid;

use super::state::CaptureStatus;
use crate::config::CaptureConfig;
use crate::detection::DetectionSignal;
use crate::error::{CaptureError, ErrorKind, ThreatSeverity};
use crate::instructions::InstructionTrigger;
use crate::recording::{Artifact, CaptureResult, RecordingOutcome};
use crate::timer::TimerEvent;

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Requests from the hosting application.
#[derive(Debug)]
pub enum Command {
    Load,
    Start,
    Stop,
    Restart,
    CaptureAgain,
    /// Manual recording; bypasses the countdown.
    StartRecording {
        reply: oneshot::Sender<Result<Uuid, CaptureError>>,
    },
    StopRecording {
        reply: oneshot::Sender<bool>,
    },
    UpdateConfiguration(Box<CaptureConfig>),
    AvailableCameras {
        reply: oneshot::Sender<Vec<String>>,
    },
    SelectCamera(String),
    ShowInstructions,
    PauseInstructions,
    ResumeInstructions,
    SkipInstruction,
    HideInstructions,
    ReportSecurityThreat {
        severity: ThreatSeverity,
        description: String,
    },
    Shutdown,
}

/// Everything the orchestrator reacts to, processed in arrival order.
#[derive(Debug)]
pub enum Event {
    /// One processed camera frame.
    Signal(DetectionSignal),
    /// The backend finalized a recording.
    ArtifactReady { session_id: Uuid, artifact: Artifact },
    /// The backend could not finalize a recording.
    ArtifactFailed { session_id: Uuid, cause: String },
    Timer(TimerEvent),
    /// Background materialization finished.
    ArtifactMaterialized {
        session_id: Uuid,
        result: Result<CaptureResult, CaptureError>,
    },
    /// A session's one-shot outcome resolved.
    RecordingFinished {
        session_id: Uuid,
        outcome: RecordingOutcome,
    },
    Command(Command),
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Notifications published to the hosting application.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CaptureOutput {
    StatusChanged {
        status: CaptureStatus,
    },
    /// Positioning hint, forwarded from every frame.
    GuidanceMessage {
        message: String,
    },
    /// Exactly once per successful, non-discarded recording.
    CaptureResult {
        result: CaptureResult,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
    RecordingProgress {
        ratio: f32,
    },
    DetectionPaused {
        paused: bool,
    },
    InstructionShown {
        trigger: InstructionTrigger,
    },
    InstructionStep {
        index: usize,
        text: String,
        animation: Option<String>,
    },
    InstructionProgress {
        index: usize,
        ratio: f32,
    },
    InstructionPaused {
        index: usize,
        progress: f32,
    },
    InstructionResumed {
        index: usize,
    },
    InstructionsCompleted,
    InstructionsHidden,
}

impl CaptureOutput {
    pub fn status(status: CaptureStatus) -> Self {
        CaptureOutput::StatusChanged { status }
    }

    pub fn error(err: &CaptureError) -> Self {
        CaptureOutput::Error {
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// The status carried by a `StatusChanged`, if this is one.
    pub fn as_status(&self) -> Option<CaptureStatus> {
        match self {
            CaptureOutput::StatusChanged { status } => Some(*status),
            _ => None,
        }
    }
}
