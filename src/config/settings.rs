//! Capture configuration snapshot, defaults and TOML persistence.
//!
//! [`CaptureConfig`] is an immutable value: the orchestrator never edits the
//! snapshot it holds, it replaces it wholesale after the
//! [`ConfigurationReconciler`](super::ConfigurationReconciler) has compared the
//! old and new values field by field.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// CameraPosition / VideoQuality
// ---------------------------------------------------------------------------

/// Which physical camera faces the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraPosition {
    Front,
    Back,
}

impl Default for CameraPosition {
    fn default() -> Self {
        Self::Front
    }
}

/// Capture preset requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoQuality {
    Low,
    Medium,
    High,
}

impl Default for VideoQuality {
    fn default() -> Self {
        Self::High
    }
}

// ---------------------------------------------------------------------------
// CameraConfig
// ---------------------------------------------------------------------------

/// Camera and capture-device settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Front or back camera.
    pub position: CameraPosition,
    /// Explicit device name chosen through the camera-switch affordance.
    /// `None` lets the backend pick the default device for `position`.
    pub device: Option<String>,
    /// Capture preset.
    pub quality: VideoQuality,
    /// Record an audio track alongside the video.
    pub microphone_enabled: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: CameraPosition::default(),
            device: None,
            quality: VideoQuality::default(),
            microphone_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// VideoConfig
// ---------------------------------------------------------------------------

/// Recording length and timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Length of the recorded clip in whole seconds.
    pub duration_secs: u32,
    /// Cadence of recording progress updates in milliseconds.
    pub progress_interval_ms: u64,
    /// Delay between the artifact resolving and `VideoReady` being reported.
    pub settle_delay_ms: u64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            duration_secs: 3,
            progress_interval_ms: 100,
            settle_delay_ms: 300,
        }
    }
}

// ---------------------------------------------------------------------------
// DetectionConfig
// ---------------------------------------------------------------------------

/// Face-detection behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Skip face detection entirely; only manual recording is possible.
    pub face_detection_disabled: bool,
    /// Use the bundled on-device model instead of a downloaded one.
    pub offline_model: bool,
    /// Start the countdown automatically when the face becomes optimal.
    pub auto_record: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            face_detection_disabled: false,
            offline_model: true,
            auto_record: true,
        }
    }
}

// ---------------------------------------------------------------------------
// InstructionConfig
// ---------------------------------------------------------------------------

/// One tutorial step as written in `settings.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionStepConfig {
    pub text: String,
    /// Animation asset name; rendering is up to the host.
    pub animation: Option<String>,
    pub duration_ms: u64,
}

/// Tutorial overlay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionConfig {
    pub enabled: bool,
    /// Show the tutorial automatically the first time capture starts.
    pub show_on_start: bool,
    pub steps: Vec<InstructionStepConfig>,
    /// Cadence of the per-step progress ratio in milliseconds.
    pub progress_interval_ms: u64,
    /// Delay between the last step completing and the overlay hiding.
    pub auto_hide_delay_ms: u64,
    /// Minimum time between two trigger-driven displays.
    pub redisplay_min_interval_secs: u64,
}

impl Default for InstructionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            show_on_start: true,
            steps: vec![
                InstructionStepConfig {
                    text: "Hold the phone at eye level".into(),
                    animation: Some("eye_level".into()),
                    duration_ms: 3_000,
                },
                InstructionStepConfig {
                    text: "Fit your face inside the oval".into(),
                    animation: Some("face_oval".into()),
                    duration_ms: 3_000,
                },
                InstructionStepConfig {
                    text: "Stay still while the countdown runs".into(),
                    animation: Some("hold_still".into()),
                    duration_ms: 3_000,
                },
            ],
            progress_interval_ms: 50,
            auto_hide_delay_ms: 1_000,
            redisplay_min_interval_secs: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// TimerStyleConfig
// ---------------------------------------------------------------------------

/// Countdown presentation hints forwarded to the host UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerStyleConfig {
    pub show_numbers: bool,
    pub show_progress_bar: bool,
    /// Hex colour of the progress ring, e.g. `"#34C759"`.
    pub accent_color: String,
}

impl Default for TimerStyleConfig {
    fn default() -> Self {
        Self {
            show_numbers: true,
            show_progress_bar: true,
            accent_color: "#34C759".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// CaptureConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level configuration snapshot, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use face_capture::config::CaptureConfig;
///
/// let config = CaptureConfig::load().unwrap();
/// assert!(config.video.duration_secs > 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CaptureConfig {
    pub camera: CameraConfig,
    pub video: VideoConfig,
    pub detection: DetectionConfig,
    pub instructions: InstructionConfig,
    pub timer: TimerStyleConfig,
}

impl CaptureConfig {
    /// Number of countdown ticks: one lead-in tick plus one per recorded
    /// second, so recording starts when `total - 1` ticks remain.
    pub fn countdown_ticks(&self) -> u32 {
        self.video.duration_secs + 1
    }

    pub fn video_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.video.duration_secs))
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.video.progress_interval_ms.max(1))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.video.settle_delay_ms)
    }

    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(CaptureConfig::default())` when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = CaptureConfig::load_from(&path).expect("should not error");
        assert_eq!(config, CaptureConfig::default());
    }

    #[test]
    fn default_values() {
        let cfg = CaptureConfig::default();

        assert_eq!(cfg.camera.position, CameraPosition::Front);
        assert_eq!(cfg.camera.quality, VideoQuality::High);
        assert!(cfg.camera.microphone_enabled);
        assert_eq!(cfg.video.duration_secs, 3);
        assert_eq!(cfg.video.progress_interval_ms, 100);
        assert!(cfg.detection.auto_record);
        assert!(!cfg.detection.face_detection_disabled);
        assert_eq!(cfg.instructions.steps.len(), 3);
        assert_eq!(cfg.countdown_ticks(), 4);
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("settings.toml");

        let mut cfg = CaptureConfig::default();
        cfg.camera.position = CameraPosition::Back;
        cfg.camera.device = Some("USB Camera".into());
        cfg.video.duration_secs = 5;
        cfg.detection.auto_record = false;
        cfg.instructions.steps.truncate(1);
        cfg.timer.accent_color = "#FF0000".into();

        cfg.save_to(&path).expect("save");
        let loaded = CaptureConfig::load_from(&path).expect("load");

        assert_eq!(loaded, cfg);
        assert_eq!(loaded.countdown_ticks(), 6);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            "[video]\nduration_secs = 7\nprogress_interval_ms = 100\nsettle_delay_ms = 0\n",
        )
        .expect("write");

        let loaded = CaptureConfig::load_from(&path).expect("load");
        assert_eq!(loaded.video.duration_secs, 7);
        assert_eq!(loaded.camera, CameraConfig::default());
    }

    #[test]
    fn zero_progress_interval_is_clamped() {
        let mut cfg = CaptureConfig::default();
        cfg.video.progress_interval_ms = 0;
        assert_eq!(cfg.progress_interval(), Duration::from_millis(1));
    }
}
