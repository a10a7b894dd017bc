//! Per-frame face-position signals and their debouncing.
//!
//! ```text
//! ML collaborator ──DetectionSignal──▶ SignalDebouncer ──OptimalityEdge──▶ orchestrator
//! ```

pub mod debounce;

pub use debounce::{OptimalityEdge, SignalDebouncer};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Face-position verdict for one processed frame.
///
/// Produced once per frame by the external ML pipeline and consumed
/// immediately; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSignal {
    pub face_present: bool,
    pub position_correct: bool,
    /// Human-readable positioning hint ("Move closer", "Center your face" …).
    pub guidance_label: String,
    pub timestamp: DateTime<Utc>,
}

impl DetectionSignal {
    /// Build a signal stamped with the current time.
    pub fn new(face_present: bool, position_correct: bool, guidance: impl Into<String>) -> Self {
        Self {
            face_present,
            position_correct,
            guidance_label: guidance.into(),
            timestamp: Utc::now(),
        }
    }

    /// Shorthand for a correctly framed face.
    pub fn optimal() -> Self {
        Self::new(true, true, "Hold still")
    }

    /// Shorthand for a frame with no usable face.
    pub fn no_face() -> Self {
        Self::new(false, false, "No face detected")
    }

    /// `true` when the face is present and correctly framed.
    pub fn is_optimal(&self) -> bool {
        self.face_present && self.position_correct
    }
}
