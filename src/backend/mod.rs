//! The platform collaborator: camera, ML pipeline and capture backend.
//!
//! # Architecture
//!
//! ```text
//!            commands (this trait)
//! orchestrator ───────────────────▶ CaptureBackend
//!      ▲                                  │
//!      └──── CaptureHandle::frame_signal ─┤  once per processed frame
//!      └──── CaptureHandle::artifact_*  ──┘  when a recording finalizes
//! ```
//!
//! The orchestrator only ever talks to the platform through
//! [`CaptureBackend`]; the platform only ever talks back through the
//! [`CaptureHandle`](crate::orchestrator::CaptureHandle).

pub mod simulated;
#[cfg(test)]
pub(crate) mod test_support;

pub use simulated::SimulatedBackend;

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::{CaptureConfig, VideoQuality};
use crate::error::CaptureError;

/// Parameters for one recording request.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSpec {
    pub target_duration: Duration,
    pub quality: VideoQuality,
    pub microphone_enabled: bool,
}

/// Object-safe, thread-safe interface to the capture platform.
///
/// # Contract
///
/// - `prepare` loads the detection model and configures the camera from the
///   snapshot; it may be called again after `stop_camera` on restart.
/// - After `stop_recording(id)` the platform eventually reports exactly one
///   of `artifact_ready(id, …)` or `artifact_failed(id, …)` on the handle.
/// - The synchronous methods must not block.
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    async fn prepare(&self, config: &CaptureConfig) -> Result<(), CaptureError>;

    async fn start_camera(&self) -> Result<(), CaptureError>;

    async fn stop_camera(&self);

    async fn start_recording(
        &self,
        session_id: Uuid,
        spec: &RecordingSpec,
    ) -> Result<(), CaptureError>;

    async fn stop_recording(&self, session_id: Uuid);

    /// Stop (or resume) feeding frames to the detection model.
    fn set_detection_paused(&self, paused: bool);

    /// Drop the live preview output so no frames are delivered after
    /// detection is logically stopped.
    fn clear_preview(&self);

    fn set_microphone_enabled(&self, enabled: bool);

    fn available_cameras(&self) -> Vec<String>;
}

// Compile-time assertion: Box<dyn CaptureBackend> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn CaptureBackend>) {}
};

impl std::fmt::Debug for dyn CaptureBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CaptureBackend")
    }
}
