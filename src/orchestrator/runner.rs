//! Capture orchestrator: the single serialization point of the flow.
//!
//! [`CaptureOrchestrator`] owns every component and drains one inbound
//! channel of [`Event`]s.  Detection signals, timer ticks, platform
//! callbacks, host commands and internal completions are all processed
//! strictly in arrival order, so a tick that lands just after a
//! cancellation is rejected by its slot's generation check instead of
//! racing the state machine.
//!
//! # Capture flow
//!
//! ```text
//! Signal ──debounce──▶ RoseToOptimal  ─▶ FaceDetected, hide tutorial,
//!                    │                    start countdown                [Countdown(total-1)]
//!                    └ FellFromOptimal ─▶ cancel countdown, discard recording, Running
//!
//! Countdown tick (remaining == total-1) ─▶ start RecordingSession       [Recording]
//! Countdown tick (remaining)           ─▶ Countdown(remaining)
//! Countdown completed                  ─▶ stop recording, pause detection,
//!                                         clear preview                  [CaptureComplete → ProcessingVideo]
//! Artifact ready ─▶ spawn materialize ─▶ ArtifactMaterialized ─▶ one-shot outcome
//!   └─ Completed ─▶ settle delay ─▶ VideoReady + CaptureResult
//!   └─ Discarded ─▶ nothing
//!   └─ Failed    ─▶ Error
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use super::events::{CaptureOutput, Command, Event};
use super::handle::CaptureHandle;
use super::state::CaptureStatus;
use crate::backend::CaptureBackend;
use crate::config::{CaptureConfig, ConfigChange, ConfigurationReconciler};
use crate::countdown::{CountdownController, CountdownEvent, DEFAULT_TICK_INTERVAL};
use crate::detection::{DetectionSignal, OptimalityEdge, SignalDebouncer};
use crate::error::{CaptureError, ThreatSeverity};
use crate::instructions::{InstructionEvent, InstructionSequencer, InstructionTrigger};
use crate::recording::{
    artifact, Artifact, ArtifactDisposition, CaptureResult, RecordingOutcome, RecordingSession,
    SessionHandle,
};
use crate::timer::{TimerEvent, TimerKind, TimerSink, TimerSlot};

// ---------------------------------------------------------------------------
// CaptureOrchestrator
// ---------------------------------------------------------------------------

/// Drives the face-gated capture flow.
///
/// Create with [`CaptureOrchestrator::new`], hand the [`CaptureHandle`] to
/// the platform and host, then spawn [`run`](Self::run).
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use face_capture::backend::SimulatedBackend;
/// use face_capture::config::CaptureConfig;
/// use face_capture::orchestrator::CaptureOrchestrator;
///
/// # async fn example() {
/// let backend = Arc::new(SimulatedBackend::new());
/// let (orchestrator, handle, mut outputs) =
///     CaptureOrchestrator::new(CaptureConfig::default(), backend.clone());
/// backend.attach(handle.clone());
///
/// tokio::spawn(orchestrator.run());
/// handle.start();
/// while let Some(output) = outputs.recv().await {
///     println!("{output:?}");
/// }
/// # }
/// ```
pub struct CaptureOrchestrator {
    config: CaptureConfig,
    backend: Arc<dyn CaptureBackend>,
    status: CaptureStatus,

    debouncer: SignalDebouncer,
    countdown: CountdownController,
    recording: RecordingSession,
    instructions: InstructionSequencer,

    /// Delay between the result becoming available and `VideoReady`.
    settle_timer: TimerSlot,
    pending_result: Option<CaptureResult>,
    /// Session whose outcome is still awaited; any other outcome is stale.
    current_session: Option<Uuid>,

    /// Detection is paused by the capture flow (not loaded, processing, error).
    capture_paused: bool,
    /// Detection is paused because a tutorial is showing.
    instruction_paused: bool,
    /// Last effective value pushed to the backend.
    detection_paused: bool,

    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
    outputs: mpsc::UnboundedSender<CaptureOutput>,
}

impl CaptureOrchestrator {
    /// Create a new orchestrator for `config` driving `backend`.
    ///
    /// Returns the orchestrator, a handle for inputs and commands, and the
    /// receiver of every [`CaptureOutput`].
    pub fn new(
        config: CaptureConfig,
        backend: Arc<dyn CaptureBackend>,
    ) -> (Self, CaptureHandle, mpsc::UnboundedReceiver<CaptureOutput>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (outputs, outputs_rx) = mpsc::unbounded_channel();

        let timer_tx = events_tx.clone();
        let sink = TimerSink::new(move |tick| timer_tx.send(Event::Timer(tick)).is_ok());

        let mut recording = RecordingSession::new(
            Arc::clone(&backend),
            sink.clone(),
            config.progress_interval(),
        );
        recording.apply_settings(
            config.progress_interval(),
            config.camera.quality,
            config.camera.microphone_enabled,
        );

        let orchestrator = Self {
            instructions: InstructionSequencer::new(&config.instructions, sink.clone()),
            countdown: CountdownController::new(sink.clone()),
            settle_timer: TimerSlot::new(TimerKind::VideoSettle, sink),
            recording,
            config,
            backend,
            status: CaptureStatus::NotLoaded,
            debouncer: SignalDebouncer::new(),
            pending_result: None,
            current_session: None,
            capture_paused: true,
            instruction_paused: false,
            detection_paused: true,
            events_tx: events_tx.clone(),
            events_rx,
            outputs,
        };
        (orchestrator, CaptureHandle::new(events_tx), outputs_rx)
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Process events until a shutdown command arrives.
    pub async fn run(mut self) {
        log::info!("orchestrator: running");
        while let Some(event) = self.events_rx.recv().await {
            if !self.handle_event(event).await {
                break;
            }
        }
        log::info!("orchestrator: shut down");
    }

    /// Returns `false` when the loop should end.
    async fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Signal(signal) => self.on_signal(signal).await,
            Event::ArtifactReady {
                session_id,
                artifact,
            } => self.on_artifact_ready(session_id, artifact),
            Event::ArtifactFailed { session_id, cause } => {
                log::warn!("orchestrator: backend failed session {session_id}: {cause}");
                self.recording.artifact_failed(session_id, cause);
            }
            Event::Timer(tick) => self.on_timer(tick).await,
            Event::ArtifactMaterialized { session_id, result } => {
                self.recording.materialized(session_id, result);
            }
            Event::RecordingFinished {
                session_id,
                outcome,
            } => self.on_recording_finished(session_id, outcome).await,
            Event::Command(command) => return self.on_command(command).await,
        }
        true
    }

    // -----------------------------------------------------------------------
    // Detection
    // -----------------------------------------------------------------------

    async fn on_signal(&mut self, signal: DetectionSignal) {
        self.emit(CaptureOutput::GuidanceMessage {
            message: signal.guidance_label.clone(),
        });

        if !self.status.accepts_signals()
            || self.detection_paused
            || self.config.detection.face_detection_disabled
        {
            return;
        }

        match self.debouncer.observe(&signal) {
            OptimalityEdge::RoseToOptimal => self.on_rose_to_optimal().await,
            OptimalityEdge::FellFromOptimal => self.on_fell_from_optimal().await,
            OptimalityEdge::NoChange => {}
        }
    }

    async fn on_rose_to_optimal(&mut self) {
        if self.status != CaptureStatus::Running
            || self.countdown.is_active()
            || self.recording.is_active()
        {
            return;
        }
        self.set_status(CaptureStatus::FaceDetected);
        if !self.config.detection.auto_record {
            return;
        }

        let hidden = self.instructions.hide();
        self.apply_instruction_events(hidden).await;

        let total = self.config.countdown_ticks();
        match self.countdown.start(total, DEFAULT_TICK_INTERVAL) {
            // The first visible number is shown right away; the first tick
            // repeats it and starts recording.
            Ok(()) => self.set_status(CaptureStatus::Countdown(total - 1)),
            Err(e) => {
                log::warn!("orchestrator: countdown not started: {e}");
                self.set_status(CaptureStatus::Running);
            }
        }
    }

    async fn on_fell_from_optimal(&mut self) {
        if self.countdown.is_active() || self.recording.is_active() {
            log::info!("orchestrator: face lost mid-capture, discarding");
            self.abort_capture().await;
        } else if self.status == CaptureStatus::FaceDetected {
            self.set_status(CaptureStatus::Running);
        }
    }

    /// Cancel countdown and recording and go back to looking for a face.
    async fn abort_capture(&mut self) {
        self.countdown.cancel();
        self.recording.cancel().await;
        self.forget_session();
        self.set_status(CaptureStatus::Running);
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    async fn on_timer(&mut self, tick: TimerEvent) {
        match tick.kind {
            TimerKind::CountdownTick => {
                for event in self.countdown.on_tick(tick.generation) {
                    self.on_countdown_event(event).await;
                }
            }
            TimerKind::RecordingProgress => {
                let Some(update) = self.recording.on_progress_tick(tick.generation) else {
                    return;
                };
                self.emit(CaptureOutput::RecordingProgress {
                    ratio: update.ratio,
                });
                if update.deadline_reached {
                    self.on_recording_deadline().await;
                }
            }
            TimerKind::VideoSettle => {
                if self.settle_timer.accepts(tick.generation) {
                    self.settle_timer.finish();
                    self.deliver_result();
                }
            }
            TimerKind::InstructionProgress
            | TimerKind::InstructionStep
            | TimerKind::InstructionAutoHide => {
                let events = self.instructions.on_timer(tick);
                self.apply_instruction_events(events).await;
            }
        }
    }

    async fn on_countdown_event(&mut self, event: CountdownEvent) {
        match event {
            CountdownEvent::Tick { remaining, .. } => {
                if !self.status.is_capturing() {
                    return;
                }
                self.set_status(CaptureStatus::Countdown(remaining));
                if event.starts_recording() {
                    let _ = self.begin_recording().await;
                }
            }
            CountdownEvent::Completed => self.enter_processing().await,
            CountdownEvent::Cancelled => {}
        }
    }

    async fn on_recording_deadline(&mut self) {
        if self.countdown.is_active() {
            // The countdown's last tick moves the status on.
            self.recording.stop().await;
        } else {
            self.enter_processing().await;
        }
    }

    // -----------------------------------------------------------------------
    // Recording
    // -----------------------------------------------------------------------

    /// Start a session for the configured duration.  A backend refusal is
    /// a component failure and is also reported through `fail`.
    async fn begin_recording(&mut self) -> Result<Uuid, CaptureError> {
        match self.recording.start(self.config.video_duration()).await {
            Ok(handle) => {
                let session_id = handle.session_id;
                self.current_session = Some(session_id);
                self.forward_outcome(handle);
                self.set_status(CaptureStatus::Recording);
                Ok(session_id)
            }
            Err(e) => {
                self.fail(e.clone()).await;
                Err(e)
            }
        }
    }

    /// Turn the session's one-shot outcome into an event on our own queue.
    fn forward_outcome(&self, handle: SessionHandle) {
        let SessionHandle {
            session_id,
            outcome,
        } = handle;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            if let Ok(outcome) = outcome.await {
                let _ = tx.send(Event::RecordingFinished {
                    session_id,
                    outcome,
                });
            }
        });
    }

    /// Stop capturing and wait for the artifact.
    async fn enter_processing(&mut self) {
        if !self.status.is_capturing() {
            return;
        }
        self.countdown.cancel();
        self.set_status(CaptureStatus::CaptureComplete);
        self.set_status(CaptureStatus::ProcessingVideo);

        self.recording.stop().await;
        self.capture_paused = true;
        self.sync_detection_pause();
        self.backend.clear_preview();
        self.maybe_settle();
    }

    fn on_artifact_ready(&mut self, session_id: Uuid, artifact: Artifact) {
        match self.recording.artifact_ready(session_id, artifact) {
            ArtifactDisposition::Materialize(artifact) => {
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let result = artifact::materialize(session_id, artifact).await;
                    let _ = tx.send(Event::ArtifactMaterialized { session_id, result });
                });
            }
            ArtifactDisposition::Discard(artifact) => {
                tokio::spawn(artifact::discard(artifact));
            }
        }
    }

    async fn on_recording_finished(&mut self, session_id: Uuid, outcome: RecordingOutcome) {
        if self.current_session != Some(session_id) {
            log::debug!("orchestrator: dropping outcome of stale session {session_id}");
            return;
        }
        self.current_session = None;
        match outcome {
            RecordingOutcome::Completed(result) => {
                log::info!(
                    "orchestrator: session {session_id} produced {} ({} bytes)",
                    result.file_name,
                    result.size
                );
                self.pending_result = Some(result);
                self.maybe_settle();
            }
            RecordingOutcome::Discarded => {
                log::debug!("orchestrator: session {session_id} discarded");
            }
            RecordingOutcome::Failed(e) => self.fail(e).await,
        }
    }

    fn maybe_settle(&mut self) {
        if self.status == CaptureStatus::ProcessingVideo
            && self.pending_result.is_some()
            && !self.settle_timer.is_active()
        {
            self.settle_timer.start_once(self.config.settle_delay());
        }
    }

    fn deliver_result(&mut self) {
        let Some(result) = self.pending_result.take() else {
            return;
        };
        self.set_status(CaptureStatus::VideoReady);
        self.emit(CaptureOutput::CaptureResult { result });
    }

    /// Forget the in-flight session: its outcome will no longer be accepted.
    fn forget_session(&mut self) {
        self.settle_timer.cancel();
        self.pending_result = None;
        self.current_session = None;
    }

    async fn start_manual_recording(&mut self) -> Result<Uuid, CaptureError> {
        if self.recording.is_active() || self.countdown.is_active() {
            return Err(CaptureError::AlreadyRecording);
        }
        if !matches!(
            self.status,
            CaptureStatus::Running | CaptureStatus::FaceDetected
        ) {
            return Err(CaptureError::DeviceUnavailable(format!(
                "cannot record while {}",
                self.status.label().to_lowercase()
            )));
        }

        self.begin_recording().await
    }

    async fn stop_manual_recording(&mut self) -> bool {
        if !self.recording.is_recording() {
            return false;
        }
        self.enter_processing().await;
        true
    }

    // -----------------------------------------------------------------------
    // Instructions and detection pause
    // -----------------------------------------------------------------------

    async fn apply_instruction_events(&mut self, events: Vec<InstructionEvent>) {
        for event in events {
            match event {
                InstructionEvent::Shown(trigger) => {
                    self.emit(CaptureOutput::InstructionShown { trigger })
                }
                InstructionEvent::StepStarted {
                    index,
                    text,
                    animation,
                } => self.emit(CaptureOutput::InstructionStep {
                    index,
                    text,
                    animation,
                }),
                InstructionEvent::Progress { index, ratio } => {
                    self.emit(CaptureOutput::InstructionProgress { index, ratio })
                }
                InstructionEvent::Paused { index, progress } => {
                    self.emit(CaptureOutput::InstructionPaused { index, progress })
                }
                InstructionEvent::Resumed { index, .. } => {
                    self.emit(CaptureOutput::InstructionResumed { index })
                }
                InstructionEvent::Completed => self.emit(CaptureOutput::InstructionsCompleted),
                InstructionEvent::Hidden => self.emit(CaptureOutput::InstructionsHidden),
                InstructionEvent::RequestPauseDetection(paused) => {
                    if paused && self.status.is_capturing() {
                        log::info!("orchestrator: tutorial opened mid-capture, discarding");
                        self.abort_capture().await;
                    }
                    self.instruction_paused = paused;
                    self.sync_detection_pause();
                }
            }
        }
    }

    fn sync_detection_pause(&mut self) {
        let paused = self.capture_paused || self.instruction_paused;
        if paused == self.detection_paused {
            return;
        }
        self.detection_paused = paused;
        self.backend.set_detection_paused(paused);
        if !paused {
            // A face that is already framed must rise again.
            self.debouncer.reset();
        }
        log::debug!("orchestrator: detection paused = {paused}");
        self.emit(CaptureOutput::DetectionPaused { paused });
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    async fn load(&mut self) -> bool {
        match self.status {
            CaptureStatus::NotLoaded | CaptureStatus::Stopped | CaptureStatus::Error => {}
            CaptureStatus::Loaded => return true,
            other => {
                log::debug!("orchestrator: load ignored while {other:?}");
                return false;
            }
        }
        self.set_status(CaptureStatus::Loading);
        match self.backend.prepare(&self.config).await {
            Ok(()) => {
                self.set_status(CaptureStatus::Loaded);
                true
            }
            Err(e) => {
                self.fail(e).await;
                false
            }
        }
    }

    async fn start(&mut self) {
        if self.status.is_live() {
            log::debug!("orchestrator: already started");
            return;
        }
        if self.status != CaptureStatus::Loaded && !self.load().await {
            return;
        }
        if let Err(e) = self.open_camera(true).await {
            self.fail(e).await;
        }
    }

    async fn open_camera(&mut self, show_tutorial: bool) -> Result<(), CaptureError> {
        self.backend.start_camera().await?;
        self.backend
            .set_microphone_enabled(self.config.camera.microphone_enabled);

        self.capture_paused = false;
        self.sync_detection_pause();
        self.set_status(CaptureStatus::Running);

        if show_tutorial && self.config.instructions.show_on_start {
            let events = self.instructions.request_display(InstructionTrigger::OnStart);
            self.apply_instruction_events(events).await;
        }
        Ok(())
    }

    /// Cancel everything in flight and close the camera.
    async fn teardown(&mut self) {
        self.countdown.cancel();
        self.recording.cancel().await;
        self.forget_session();

        let hidden = self.instructions.hide();
        self.apply_instruction_events(hidden).await;

        self.capture_paused = true;
        self.sync_detection_pause();
        self.backend.clear_preview();
        self.backend.stop_camera().await;
    }

    async fn stop(&mut self) {
        if matches!(
            self.status,
            CaptureStatus::NotLoaded | CaptureStatus::Stopped
        ) {
            return;
        }
        self.teardown().await;
        self.set_status(CaptureStatus::Stopped);
    }

    /// Stop (if needed), prepare with the current snapshot and reopen the
    /// camera.  Failures after a configuration change are reported as
    /// [`CaptureError::ConfigurationRejected`].
    async fn restart(&mut self, after_config_change: bool) {
        match self.status {
            CaptureStatus::NotLoaded | CaptureStatus::Stopped => {}
            CaptureStatus::Error => self.teardown().await,
            _ => self.stop().await,
        }

        self.set_status(CaptureStatus::Loading);
        let result = match self.backend.prepare(&self.config).await {
            Ok(()) => self.open_camera(false).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            let error = if after_config_change {
                CaptureError::ConfigurationRejected(e.to_string())
            } else {
                e
            };
            self.fail(error).await;
        }
    }

    fn capture_again(&mut self) {
        if self.status != CaptureStatus::VideoReady {
            log::debug!("orchestrator: capture again ignored while {:?}", self.status);
            return;
        }
        self.capture_paused = false;
        self.set_status(CaptureStatus::Running);
        self.sync_detection_pause();
    }

    /// Any component failure: stop everything in flight and report.
    async fn fail(&mut self, error: CaptureError) {
        log::error!("orchestrator error: {error}");
        self.countdown.cancel();
        self.recording.cancel().await;
        self.forget_session();

        self.capture_paused = true;
        self.sync_detection_pause();
        self.set_status(CaptureStatus::Error);
        self.emit(CaptureOutput::error(&error));

        let events = self
            .instructions
            .request_display(InstructionTrigger::Error(error.to_string()));
        self.apply_instruction_events(events).await;
    }

    async fn report_security_threat(&mut self, severity: ThreatSeverity, description: String) {
        let error = CaptureError::SecurityThreat {
            severity,
            description,
        };
        if !severity.forces_stop() {
            log::warn!("orchestrator: {error}");
            self.emit(CaptureOutput::error(&error));
            return;
        }

        log::error!("orchestrator: {error}, stopping capture");
        if self.status.is_live() {
            self.teardown().await;
        }
        self.set_status(CaptureStatus::Error);
        self.emit(CaptureOutput::error(&error));
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    async fn update_configuration(&mut self, config: CaptureConfig) {
        let change = ConfigurationReconciler::reconcile(&self.config, &config);
        if change.is_empty() {
            log::debug!("orchestrator: configuration unchanged");
            return;
        }
        self.config = config;
        self.apply_live(change);

        if !change.restart {
            return;
        }
        if self.status.is_live() {
            log::info!("orchestrator: configuration change requires restart");
            self.restart(true).await;
        } else if self.status == CaptureStatus::Loaded {
            self.set_status(CaptureStatus::Loading);
            match self.backend.prepare(&self.config).await {
                Ok(()) => self.set_status(CaptureStatus::Loaded),
                Err(e) => {
                    self.fail(CaptureError::ConfigurationRejected(e.to_string()))
                        .await
                }
            }
        }
    }

    /// Forward the live-applicable parts of a change.
    fn apply_live(&mut self, change: ConfigChange) {
        self.recording.apply_settings(
            self.config.progress_interval(),
            self.config.camera.quality,
            self.config.camera.microphone_enabled,
        );
        if let Some(enabled) = change.microphone {
            log::debug!("orchestrator: microphone enabled = {enabled}");
            self.backend.set_microphone_enabled(enabled);
        }
        if change.instructions {
            self.instructions
                .apply_configuration(&self.config.instructions);
        }
    }

    async fn select_camera(&mut self, name: String) {
        if self.config.camera.device.as_deref() == Some(name.as_str()) {
            return;
        }
        if !self.backend.available_cameras().contains(&name) {
            self.fail(CaptureError::DeviceUnavailable(format!(
                "unknown camera {name:?}"
            )))
            .await;
            return;
        }
        let mut config = self.config.clone();
        config.camera.device = Some(name);
        self.update_configuration(config).await;
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    async fn on_command(&mut self, command: Command) -> bool {
        match command {
            Command::Load => {
                self.load().await;
            }
            Command::Start => self.start().await,
            Command::Stop => self.stop().await,
            Command::Restart => self.restart(false).await,
            Command::CaptureAgain => self.capture_again(),
            Command::StartRecording { reply } => {
                let result = self.start_manual_recording().await;
                let _ = reply.send(result);
            }
            Command::StopRecording { reply } => {
                let stopped = self.stop_manual_recording().await;
                let _ = reply.send(stopped);
            }
            Command::UpdateConfiguration(config) => self.update_configuration(*config).await,
            Command::AvailableCameras { reply } => {
                let _ = reply.send(self.backend.available_cameras());
            }
            Command::SelectCamera(name) => self.select_camera(name).await,
            Command::ShowInstructions => {
                if self.config.instructions.enabled {
                    let events = self.instructions.start(InstructionTrigger::OnStart);
                    self.apply_instruction_events(events).await;
                }
            }
            Command::PauseInstructions => {
                let events = self.instructions.pause();
                self.apply_instruction_events(events).await;
            }
            Command::ResumeInstructions => {
                let events = self.instructions.resume();
                self.apply_instruction_events(events).await;
            }
            Command::SkipInstruction => {
                let events = self.instructions.skip();
                self.apply_instruction_events(events).await;
            }
            Command::HideInstructions => {
                let events = self.instructions.hide();
                self.apply_instruction_events(events).await;
            }
            Command::ReportSecurityThreat {
                severity,
                description,
            } => self.report_security_threat(severity, description).await,
            Command::Shutdown => {
                if self.status.is_live() {
                    self.teardown().await;
                }
                return false;
            }
        }
        true
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn set_status(&mut self, status: CaptureStatus) {
        if self.status == status {
            return;
        }
        log::debug!("orchestrator: {:?} → {:?}", self.status, status);
        self.status = status;
        self.emit(CaptureOutput::status(status));
    }

    fn emit(&self, output: CaptureOutput) {
        if self.outputs.send(output).is_err() {
            log::trace!("orchestrator: output receiver dropped");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
