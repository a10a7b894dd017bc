//! Capture orchestrator module.
//!
//! This module wires detection, countdown, recording and the tutorial
//! overlay into one state machine and exposes the status the host renders.
//!
//! # Architecture
//!
//! ```text
//! CaptureBackend ──frame_signal / artifact_*──┐
//! host ──────────commands─────────────────────┤
//!                                             ▼
//!                          mpsc::UnboundedReceiver<Event>
//!                                             │
//!                                             ▼
//!                       CaptureOrchestrator::run()  ← async tokio task
//!                          │   ▲          ▲
//!              timers ─────┘   │          └── materialize task
//!                              └── one-shot outcome forwarder
//!                                             │
//!                                             ▼
//!                          mpsc::UnboundedReceiver<CaptureOutput>  → host
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use face_capture::backend::SimulatedBackend;
//! use face_capture::config::CaptureConfig;
//! use face_capture::detection::DetectionSignal;
//! use face_capture::orchestrator::{CaptureOrchestrator, CaptureOutput};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = Arc::new(SimulatedBackend::new());
//!     let (orchestrator, handle, mut outputs) =
//!         CaptureOrchestrator::new(CaptureConfig::default(), backend.clone());
//!     backend.attach(handle.clone());
//!     tokio::spawn(orchestrator.run());
//!
//!     handle.start();
//!     handle.frame_signal(DetectionSignal::optimal());
//!
//!     while let Some(output) = outputs.recv().await {
//!         if let CaptureOutput::CaptureResult { result } = output {
//!             println!("captured {} bytes", result.size);
//!             break;
//!         }
//!     }
//! }
//! ```

pub mod events;
pub mod handle;
pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use events::{CaptureOutput, Command, Event};
pub use handle::CaptureHandle;
pub use runner::CaptureOrchestrator;
pub use state::CaptureStatus;
