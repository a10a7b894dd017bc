//! Error taxonomy for the capture flow.
//!
//! Signal-level anomalies (no face, poor framing) are never errors, and
//! countdown/recording races are handled as cancellations.  Only the genuine
//! failures below reach `onError`, each with a stable machine-readable
//! [`ErrorKind`] and a human-readable label.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Stable, machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PermissionDenied,
    DeviceUnavailable,
    AlreadyRecording,
    VideoProcessingFailed,
    ConfigurationRejected,
    SecurityThreat,
}

impl ErrorKind {
    /// Stable code string, safe to persist or compare across versions.
    ///
    /// ```
    /// use face_capture::ErrorKind;
    ///
    /// assert_eq!(ErrorKind::AlreadyRecording.code(), "already_recording");
    /// assert_eq!(ErrorKind::VideoProcessingFailed.code(), "video_processing_failed");
    /// ```
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::DeviceUnavailable => "device_unavailable",
            ErrorKind::AlreadyRecording => "already_recording",
            ErrorKind::VideoProcessingFailed => "video_processing_failed",
            ErrorKind::ConfigurationRejected => "configuration_rejected",
            ErrorKind::SecurityThreat => "security_threat",
        }
    }

    /// Short label suitable for a status line.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::PermissionDenied => "Camera permission denied",
            ErrorKind::DeviceUnavailable => "Camera unavailable",
            ErrorKind::AlreadyRecording => "A recording is already in progress",
            ErrorKind::VideoProcessingFailed => "Video processing failed",
            ErrorKind::ConfigurationRejected => "Configuration could not be applied",
            ErrorKind::SecurityThreat => "Security threat detected",
        }
    }
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// All failures that can surface from the capture flow.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CaptureError {
    /// The user or platform refused camera / microphone access.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The capture device could not be opened or stopped responding.
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A recording session is already active.
    #[error("a recording is already in progress")]
    AlreadyRecording,

    /// The finished artifact could not be materialized.
    #[error("video processing failed: {0}")]
    VideoProcessingFailed(String),

    /// The restart triggered by a configuration change failed.
    #[error("configuration rejected: {0}")]
    ConfigurationRejected(String),

    /// An externally detected security event was escalated.
    #[error("security threat ({severity}): {description}")]
    SecurityThreat {
        severity: ThreatSeverity,
        description: String,
    },
}

impl CaptureError {
    /// The stable category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CaptureError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            CaptureError::DeviceUnavailable(_) => ErrorKind::DeviceUnavailable,
            CaptureError::AlreadyRecording => ErrorKind::AlreadyRecording,
            CaptureError::VideoProcessingFailed(_) => ErrorKind::VideoProcessingFailed,
            CaptureError::ConfigurationRejected(_) => ErrorKind::ConfigurationRejected,
            CaptureError::SecurityThreat { .. } => ErrorKind::SecurityThreat,
        }
    }
}

// ---------------------------------------------------------------------------
// ThreatSeverity
// ---------------------------------------------------------------------------

/// Severity attached to an escalated security event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatSeverity {
    /// High and critical threats force a full stop of the capture flow.
    pub fn forces_stop(&self) -> bool {
        *self >= ThreatSeverity::High
    }
}

impl std::fmt::Display for ThreatSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ThreatSeverity::Low => "low",
            ThreatSeverity::Medium => "medium",
            ThreatSeverity::High => "high",
            ThreatSeverity::Critical => "critical",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(CaptureError::AlreadyRecording.kind(), ErrorKind::AlreadyRecording);
        assert_eq!(
            CaptureError::VideoProcessingFailed("disk".into()).kind(),
            ErrorKind::VideoProcessingFailed
        );
        assert_eq!(
            CaptureError::SecurityThreat {
                severity: ThreatSeverity::Low,
                description: "x".into()
            }
            .kind(),
            ErrorKind::SecurityThreat
        );
    }

    #[test]
    fn only_high_and_critical_force_stop() {
        assert!(!ThreatSeverity::Low.forces_stop());
        assert!(!ThreatSeverity::Medium.forces_stop());
        assert!(ThreatSeverity::High.forces_stop());
        assert!(ThreatSeverity::Critical.forces_stop());
    }

    #[test]
    fn security_threat_display_includes_severity() {
        let e = CaptureError::SecurityThreat {
            severity: ThreatSeverity::Critical,
            description: "injected frames".into(),
        };
        let s = e.to_string();
        assert!(s.contains("critical"));
        assert!(s.contains("injected frames"));
    }
}
