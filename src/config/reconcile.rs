//! Decides whether a configuration change needs a full stop/restart.
//!
//! Anything that changes how the camera or the detection model is opened
//! (camera position or device, video quality, the face-detection-disabled
//! flag, the offline-model flag) forces a restart.  Everything else is
//! applied live: the orchestrator swaps its snapshot and forwards the
//! relevant sub-fields.  Microphone toggles touch the capture session but
//! are special-cased so they never restart it.

use super::CaptureConfig;

/// Field-by-field summary of what differs between two snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigChange {
    /// A full stop → load → start cycle is required.
    pub restart: bool,
    /// New microphone state, when it changed.
    pub microphone: Option<bool>,
    pub video_duration: bool,
    pub instructions: bool,
    pub auto_record: bool,
    pub timer_style: bool,
}

impl ConfigChange {
    /// `true` when the two snapshots were identical.
    pub fn is_empty(&self) -> bool {
        *self == ConfigChange::default()
    }
}

/// Stateless comparison of two [`CaptureConfig`] snapshots.
pub struct ConfigurationReconciler;

impl ConfigurationReconciler {
    /// `true` if switching from `old` to `new` requires stopping capture.
    ///
    /// ```
    /// use face_capture::config::{CameraPosition, CaptureConfig, ConfigurationReconciler};
    ///
    /// let old = CaptureConfig::default();
    /// let mut new = old.clone();
    /// new.instructions.steps[0].text = "Look up".into();
    /// assert!(!ConfigurationReconciler::requires_restart(&old, &new));
    ///
    /// new.camera.position = CameraPosition::Back;
    /// assert!(ConfigurationReconciler::requires_restart(&old, &new));
    /// ```
    pub fn requires_restart(old: &CaptureConfig, new: &CaptureConfig) -> bool {
        old.camera.position != new.camera.position
            || old.camera.device != new.camera.device
            || old.camera.quality != new.camera.quality
            || old.detection.face_detection_disabled != new.detection.face_detection_disabled
            || old.detection.offline_model != new.detection.offline_model
    }

    /// Full classification of the change from `old` to `new`.
    pub fn reconcile(old: &CaptureConfig, new: &CaptureConfig) -> ConfigChange {
        let microphone = (old.camera.microphone_enabled != new.camera.microphone_enabled)
            .then_some(new.camera.microphone_enabled);

        ConfigChange {
            restart: Self::requires_restart(old, new),
            microphone,
            video_duration: old.video != new.video,
            instructions: old.instructions != new.instructions,
            auto_record: old.detection.auto_record != new.detection.auto_record,
            timer_style: old.timer != new.timer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CameraPosition, VideoQuality};

    fn base() -> CaptureConfig {
        CaptureConfig::default()
    }

    #[test]
    fn identical_snapshots_produce_empty_change() {
        let change = ConfigurationReconciler::reconcile(&base(), &base());
        assert!(change.is_empty());
    }

    #[test]
    fn restart_fields() {
        let old = base();

        let mut new = base();
        new.camera.position = CameraPosition::Back;
        assert!(ConfigurationReconciler::requires_restart(&old, &new));

        let mut new = base();
        new.camera.quality = VideoQuality::Low;
        assert!(ConfigurationReconciler::requires_restart(&old, &new));

        let mut new = base();
        new.detection.face_detection_disabled = true;
        assert!(ConfigurationReconciler::requires_restart(&old, &new));

        let mut new = base();
        new.detection.offline_model = !old.detection.offline_model;
        assert!(ConfigurationReconciler::requires_restart(&old, &new));

        let mut new = base();
        new.camera.device = Some("External".into());
        assert!(ConfigurationReconciler::requires_restart(&old, &new));
    }

    #[test]
    fn live_fields_do_not_restart() {
        let old = base();
        let mut new = base();
        new.timer.accent_color = "#000000".into();
        new.instructions.steps[1].duration_ms = 10;
        new.detection.auto_record = false;
        new.video.duration_secs = 9;
        new.camera.microphone_enabled = false;

        let change = ConfigurationReconciler::reconcile(&old, &new);
        assert!(!change.restart);
        assert_eq!(change.microphone, Some(false));
        assert!(change.video_duration);
        assert!(change.instructions);
        assert!(change.auto_record);
        assert!(change.timer_style);
    }

    #[test]
    fn microphone_only_change_is_live() {
        let old = base();
        let mut new = base();
        new.camera.microphone_enabled = false;

        let change = ConfigurationReconciler::reconcile(&old, &new);
        assert_eq!(
            change,
            ConfigChange {
                microphone: Some(false),
                ..ConfigChange::default()
            }
        );
    }
}
