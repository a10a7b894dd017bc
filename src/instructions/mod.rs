//! Step-by-step tutorial overlay.
//!
//! [`InstructionSequencer`] is independent of the capture state machine but
//! coordinated with it: while a tutorial is showing it asks the orchestrator
//! to pause detection, and it releases that request when the tutorial
//! completes or is hidden.

pub mod sequencer;

pub use sequencer::{
    remaining_after_pause, InstructionEvent, InstructionSequencer, SequencerState,
};

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::InstructionStepConfig;

/// Why the tutorial is being displayed.
///
/// Variant and payload together form the identity used to suppress
/// redundant re-displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message", rename_all = "camelCase")]
pub enum InstructionTrigger {
    OnStart,
    Error(String),
}

/// One tutorial step.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionStep {
    pub text: String,
    pub animation: Option<String>,
    pub duration: Duration,
}

impl From<&InstructionStepConfig> for InstructionStep {
    fn from(c: &InstructionStepConfig) -> Self {
        Self {
            text: c.text.clone(),
            animation: c.animation.clone(),
            duration: Duration::from_millis(c.duration_ms),
        }
    }
}
