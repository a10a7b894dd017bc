//! Face-gated video capture orchestration.
//!
//! A face detector reports per-frame positioning signals; once the face is
//! optimally framed a countdown runs, a short clip is recorded in lockstep
//! with it, and the finished clip is delivered as a [`recording::CaptureResult`].
//! Losing the face mid-countdown or mid-recording cancels and discards.
//!
//! The entry point is [`orchestrator::CaptureOrchestrator`]; the platform is
//! plugged in through [`backend::CaptureBackend`].

pub mod backend;
pub mod config;
pub mod countdown;
pub mod detection;
pub mod error;
pub mod instructions;
pub mod orchestrator;
pub mod recording;
pub mod timer;

pub use error::{CaptureError, ErrorKind, ThreatSeverity};
pub use orchestrator::{CaptureHandle, CaptureOrchestrator, CaptureOutput, CaptureStatus};
