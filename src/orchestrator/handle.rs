//! Cloneable front door to a running [`CaptureOrchestrator`](super::CaptureOrchestrator).
//!
//! Platform callbacks and host commands all become [`Event`]s on the
//! orchestrator's single inbound channel.  Fire-and-forget methods return
//! `false` once the orchestrator has shut down.

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::events::{Command, Event};
use crate::config::CaptureConfig;
use crate::detection::DetectionSignal;
use crate::error::{CaptureError, ThreatSeverity};
use crate::recording::Artifact;

#[derive(Debug, Clone)]
pub struct CaptureHandle {
    tx: mpsc::UnboundedSender<Event>,
}

impl CaptureHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Event>) -> Self {
        Self { tx }
    }

    fn send(&self, event: Event) -> bool {
        self.tx.send(event).is_ok()
    }

    fn command(&self, command: Command) -> bool {
        self.send(Event::Command(command))
    }

    // -----------------------------------------------------------------------
    // Platform inputs
    // -----------------------------------------------------------------------

    /// Deliver one processed frame's detection verdict.
    pub fn frame_signal(&self, signal: DetectionSignal) -> bool {
        self.send(Event::Signal(signal))
    }

    pub fn artifact_ready(&self, session_id: Uuid, artifact: Artifact) -> bool {
        self.send(Event::ArtifactReady {
            session_id,
            artifact,
        })
    }

    pub fn artifact_failed(&self, session_id: Uuid, cause: impl Into<String>) -> bool {
        self.send(Event::ArtifactFailed {
            session_id,
            cause: cause.into(),
        })
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    pub fn load(&self) -> bool {
        self.command(Command::Load)
    }

    /// Start the camera, loading first if necessary.
    pub fn start(&self) -> bool {
        self.command(Command::Start)
    }

    pub fn stop(&self) -> bool {
        self.command(Command::Stop)
    }

    pub fn restart(&self) -> bool {
        self.command(Command::Restart)
    }

    /// Leave `VideoReady` and look for a face again.
    pub fn capture_again(&self) -> bool {
        self.command(Command::CaptureAgain)
    }

    pub fn shutdown(&self) -> bool {
        self.command(Command::Shutdown)
    }

    // -----------------------------------------------------------------------
    // Manual recording
    // -----------------------------------------------------------------------

    /// Start a recording without a countdown.
    ///
    /// # Errors
    ///
    /// [`CaptureError::AlreadyRecording`] while a countdown or session is in
    /// flight; a backend refusal is returned here and also reported through
    /// the error output.
    pub async fn start_recording(&self) -> Result<Uuid, CaptureError> {
        let (reply, rx) = oneshot::channel();
        if !self.command(Command::StartRecording { reply }) {
            return Err(orchestrator_gone());
        }
        rx.await.unwrap_or_else(|_| Err(orchestrator_gone()))
    }

    /// Stop a manual recording early; `false` if nothing was recording.
    pub async fn stop_recording(&self) -> bool {
        let (reply, rx) = oneshot::channel();
        if !self.command(Command::StopRecording { reply }) {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    // -----------------------------------------------------------------------
    // Configuration and camera
    // -----------------------------------------------------------------------

    pub fn update_configuration(&self, config: CaptureConfig) -> bool {
        self.command(Command::UpdateConfiguration(Box::new(config)))
    }

    pub async fn available_cameras(&self) -> Vec<String> {
        let (reply, rx) = oneshot::channel();
        if !self.command(Command::AvailableCameras { reply }) {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }

    /// Switch to the named camera; applied through a restart.
    pub fn select_camera(&self, name: impl Into<String>) -> bool {
        self.command(Command::SelectCamera(name.into()))
    }

    // -----------------------------------------------------------------------
    // Instructions
    // -----------------------------------------------------------------------

    pub fn show_instructions(&self) -> bool {
        self.command(Command::ShowInstructions)
    }

    pub fn pause_instructions(&self) -> bool {
        self.command(Command::PauseInstructions)
    }

    pub fn resume_instructions(&self) -> bool {
        self.command(Command::ResumeInstructions)
    }

    pub fn skip_instruction(&self) -> bool {
        self.command(Command::SkipInstruction)
    }

    pub fn hide_instructions(&self) -> bool {
        self.command(Command::HideInstructions)
    }

    // -----------------------------------------------------------------------
    // Security
    // -----------------------------------------------------------------------

    pub fn report_security_threat(
        &self,
        severity: ThreatSeverity,
        description: impl Into<String>,
    ) -> bool {
        self.command(Command::ReportSecurityThreat {
            severity,
            description: description.into(),
        })
    }
}

fn orchestrator_gone() -> CaptureError {
    CaptureError::DeviceUnavailable("capture orchestrator has shut down".into())
}
