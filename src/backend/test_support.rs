//! Call-recording backend double for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{CaptureBackend, RecordingSpec};
use crate::config::CaptureConfig;
use crate::error::CaptureError;

#[derive(Default)]
pub(crate) struct ScriptedBackend {
    calls: Mutex<Vec<String>>,
    refuse_recording: bool,
}

impl ScriptedBackend {
    pub(crate) fn refusing_recording() -> Self {
        Self {
            refuse_recording: true,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl CaptureBackend for ScriptedBackend {
    async fn prepare(&self, _config: &CaptureConfig) -> Result<(), CaptureError> {
        self.record("prepare");
        Ok(())
    }

    async fn start_camera(&self) -> Result<(), CaptureError> {
        self.record("start_camera");
        Ok(())
    }

    async fn stop_camera(&self) {
        self.record("stop_camera");
    }

    async fn start_recording(
        &self,
        session_id: Uuid,
        _spec: &RecordingSpec,
    ) -> Result<(), CaptureError> {
        if self.refuse_recording {
            return Err(CaptureError::DeviceUnavailable("encoder busy".into()));
        }
        self.record(format!("start_recording {session_id}"));
        Ok(())
    }

    async fn stop_recording(&self, session_id: Uuid) {
        self.record(format!("stop_recording {session_id}"));
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
        vec!["Front Camera".into(), "Back Camera".into()]
    }
}
