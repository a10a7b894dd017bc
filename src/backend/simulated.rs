//! A scripted, in-process capture platform.
//!
//! [`SimulatedBackend`] stands in for the camera, ML pipeline and encoder:
//! it tracks camera and recorder state, and when a recording is stopped it
//! produces a small synthetic clip, either in memory or as a transient file
//! under an output directory, and reports it through the attached
//! [`CaptureHandle`].  Detection signals are not generated here; the host
//! feeds them through the handle.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::time::Instant;
use uuid::Uuid;

use super::{CaptureBackend, RecordingSpec};
use crate::config::CaptureConfig;
use crate::error::CaptureError;
use crate::orchestrator::CaptureHandle;
use crate::recording::Artifact;

const CLIP_MIME_TYPE: &str = "video/mp4";

#[derive(Debug)]
struct ActiveClip {
    session_id: Uuid,
    spec: RecordingSpec,
    started: Instant,
}

/// Simulated camera + recorder.
#[derive(Debug)]
pub struct SimulatedBackend {
    handle: Mutex<Option<CaptureHandle>>,
    cameras: Vec<String>,
    output_dir: Option<PathBuf>,
    camera_open: AtomicBool,
    fail_artifacts: AtomicBool,
    prepare_error: Mutex<Option<CaptureError>>,
    clip: Mutex<Option<ActiveClip>>,
    history: Mutex<Vec<String>>,
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedBackend {
    /// In-memory clips, two cameras.
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(None),
            cameras: vec!["Front Camera".into(), "Back Camera".into()],
            output_dir: None,
            camera_open: AtomicBool::new(false),
            fail_artifacts: AtomicBool::new(false),
            prepare_error: Mutex::new(None),
            clip: Mutex::new(None),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Write clips as transient files under `dir`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_cameras(mut self, cameras: Vec<String>) -> Self {
        self.cameras = cameras;
        self
    }

    /// Connect the backend to the orchestrator it reports to.
    pub fn attach(&self, handle: CaptureHandle) {
        *lock(&self.handle) = Some(handle);
    }

    /// Make every following recording end in `artifact_failed`.
    pub fn set_fail_artifacts(&self, fail: bool) {
        self.fail_artifacts.store(fail, Ordering::SeqCst);
    }

    /// Make the next `prepare` call fail with `error`.
    pub fn fail_next_prepare(&self, error: CaptureError) {
        *lock(&self.prepare_error) = Some(error);
    }

    pub fn is_camera_open(&self) -> bool {
        self.camera_open.load(Ordering::SeqCst)
    }

    /// Every command received so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        lock(&self.history).clone()
    }

    fn record(&self, entry: impl Into<String>) {
        let entry = entry.into();
        log::trace!("simulated backend: {entry}");
        lock(&self.history).push(entry);
    }

    fn handle(&self) -> Option<CaptureHandle> {
        lock(&self.handle).clone()
    }

    /// Synthetic clip payload: a short header followed by filler bytes
    /// proportional to the recorded time.
    fn synthesize(clip: &ActiveClip) -> Vec<u8> {
        let elapsed_ms = clip.started.elapsed().as_millis() as usize;
        let header = format!(
            "SIMCLIP session={} quality={:?} audio={} target_ms={}\n",
            clip.session_id,
            clip.spec.quality,
            clip.spec.microphone_enabled,
            clip.spec.target_duration.as_millis()
        );
        let mut bytes = header.into_bytes();
        bytes.resize(bytes.len() + elapsed_ms / 10, 0xA5);
        bytes
    }

    async fn deliver(&self, handle: &CaptureHandle, clip: ActiveClip) {
        let session_id = clip.session_id;
        if self.fail_artifacts.load(Ordering::SeqCst) {
            handle.artifact_failed(session_id, "simulated encoder failure");
            return;
        }

        let bytes = Self::synthesize(&clip);
        let file_name = format!("{session_id}.mp4");
        let artifact = match &self.output_dir {
            None => Artifact::from_bytes(bytes, CLIP_MIME_TYPE, file_name),
            Some(dir) => {
                let path = dir.join(&file_name);
                if let Err(e) = write_clip(dir, &path, &bytes).await {
                    handle.artifact_failed(session_id, format!("writing {}: {e}", path.display()));
                    return;
                }
                Artifact::from_file(path, CLIP_MIME_TYPE)
            }
        };
        handle.artifact_ready(session_id, artifact);
    }
}

#[async_trait]
impl CaptureBackend for SimulatedBackend {
    async fn prepare(&self, config: &CaptureConfig) -> Result<(), CaptureError> {
        self.record(format!(
            "prepare {:?} {}",
            config.camera.position,
            config.camera.device.as_deref().unwrap_or("default")
        ));
        if let Some(error) = lock(&self.prepare_error).take() {
            return Err(error);
        }
        if let Some(device) = &config.camera.device {
            if !self.cameras.contains(device) {
                return Err(CaptureError::DeviceUnavailable(format!(
                    "no camera named {device:?}"
                )));
            }
        }
        Ok(())
    }

    async fn start_camera(&self) -> Result<(), CaptureError> {
        self.record("start_camera");
        self.camera_open.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop_camera(&self) {
        self.record("stop_camera");
        self.camera_open.store(false, Ordering::SeqCst);
    }

    async fn start_recording(
        &self,
        session_id: Uuid,
        spec: &RecordingSpec,
    ) -> Result<(), CaptureError> {
        if !self.is_camera_open() {
            return Err(CaptureError::DeviceUnavailable("camera is not running".into()));
        }
        let mut clip = lock(&self.clip);
        if clip.is_some() {
            return Err(CaptureError::DeviceUnavailable("recorder is busy".into()));
        }
        *clip = Some(ActiveClip {
            session_id,
            spec: spec.clone(),
            started: Instant::now(),
        });
        drop(clip);
        self.record(format!("start_recording {session_id}"));
        Ok(())
    }

    async fn stop_recording(&self, session_id: Uuid) {
        self.record(format!("stop_recording {session_id}"));
        let clip = {
            let mut slot = lock(&self.clip);
            if slot.as_ref().is_some_and(|active| active.session_id == session_id) {
                slot.take()
            } else {
                None
            }
        };
        let Some(clip) = clip else {
            log::debug!("simulated backend: no recording for {session_id}");
            return;
        };
        match self.handle() {
            Some(handle) => self.deliver(&handle, clip).await,
            None => log::warn!("simulated backend: no handle attached, dropping clip"),
        }
    }

    fn set_detection_paused(&self, paused: bool) {
        self.record(format!("detection_paused {paused}"));
    }

    fn clear_preview(&self) {
        self.record("clear_preview");
    }

    fn set_microphone_enabled(&self, enabled: bool) {
        self.record(format!("microphone {enabled}"));
    }

    fn available_cameras(&self) -> Vec<String> {
        self.cameras.clone()
    }
}

async fn write_clip(
    dir: &std::path::Path,
    path: &std::path::Path,
    bytes: &[u8],
) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(path, bytes).await
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VideoQuality;
    use crate::orchestrator::Event;
    use crate::recording::ArtifactData;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn spec() -> RecordingSpec {
        RecordingSpec {
            target_duration: Duration::from_secs(3),
            quality: VideoQuality::High,
            microphone_enabled: true,
        }
    }

    fn attached(backend: &SimulatedBackend) -> mpsc::UnboundedReceiver<Event> {
        let (tx, rx) = mpsc::unbounded_channel();
        backend.attach(CaptureHandle::new(tx));
        rx
    }

    #[tokio::test]
    async fn recording_requires_open_camera() {
        let backend = SimulatedBackend::new();
        let err = backend.start_recording(Uuid::new_v4(), &spec()).await.unwrap_err();
        assert!(matches!(err, CaptureError::DeviceUnavailable(_)));
    }

    #[tokio::test]
    async fn stop_reports_in_memory_artifact() {
        let backend = SimulatedBackend::new();
        let mut rx = attached(&backend);
        backend.start_camera().await.unwrap();

        let id = Uuid::new_v4();
        backend.start_recording(id, &spec()).await.unwrap();
        backend.stop_recording(id).await;

        match rx.recv().await.expect("event") {
            Event::ArtifactReady {
                session_id,
                artifact,
            } => {
                assert_eq!(session_id, id);
                assert_eq!(artifact.mime_type, "video/mp4");
                assert!(matches!(artifact.data, ArtifactData::Bytes(ref b) if !b.is_empty()));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn stop_writes_transient_file_when_output_dir_set() {
        let dir = tempfile::tempdir().unwrap();
        let backend = SimulatedBackend::new().with_output_dir(dir.path().join("clips"));
        let mut rx = attached(&backend);
        backend.start_camera().await.unwrap();

        let id = Uuid::new_v4();
        backend.start_recording(id, &spec()).await.unwrap();
        backend.stop_recording(id).await;

        let Some(Event::ArtifactReady { artifact, .. }) = rx.recv().await else {
            panic!("expected artifact");
        };
        let ArtifactData::File(path) = artifact.data else {
            panic!("expected file artifact");
        };
        assert!(path.exists());
        assert_eq!(artifact.file_name, format!("{id}.mp4"));
    }

    #[tokio::test]
    async fn failing_artifacts_are_reported() {
        let backend = SimulatedBackend::new();
        let mut rx = attached(&backend);
        backend.set_fail_artifacts(true);
        backend.start_camera().await.unwrap();

        let id = Uuid::new_v4();
        backend.start_recording(id, &spec()).await.unwrap();
        backend.stop_recording(id).await;

        assert!(matches!(
            rx.recv().await,
            Some(Event::ArtifactFailed { session_id, .. }) if session_id == id
        ));
    }

    #[tokio::test]
    async fn second_recording_is_refused_while_busy() {
        let backend = SimulatedBackend::new();
        backend.start_camera().await.unwrap();
        backend.start_recording(Uuid::new_v4(), &spec()).await.unwrap();
        assert!(backend.start_recording(Uuid::new_v4(), &spec()).await.is_err());
    }

    #[tokio::test]
    async fn prepare_rejects_unknown_device_and_scripted_failure() {
        let backend = SimulatedBackend::new();
        let mut config = CaptureConfig::default();
        assert!(backend.prepare(&config).await.is_ok());

        config.camera.device = Some("Nope".into());
        assert!(backend.prepare(&config).await.is_err());

        config.camera.device = None;
        backend.fail_next_prepare(CaptureError::PermissionDenied("camera".into()));
        assert_eq!(
            backend.prepare(&config).await,
            Err(CaptureError::PermissionDenied("camera".into()))
        );
        assert!(backend.prepare(&config).await.is_ok());
    }
}
