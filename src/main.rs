//! Application entry point: headless face-capture demo.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`CaptureConfig`] from disk (returns default on first run).
//! 3. Create the [`tokio`] runtime.
//! 4. Build the [`SimulatedBackend`] writing clips under the cache dir.
//! 5. Spawn the capture orchestrator and attach the backend to it.
//! 6. Spawn a scripted frame source standing in for the ML pipeline.
//! 7. Log every output until a clip is delivered or an error is reported,
//!    then shut down.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use face_capture::{
    backend::SimulatedBackend,
    config::{AppPaths, CaptureConfig},
    detection::DetectionSignal,
    orchestrator::{CaptureHandle, CaptureOrchestrator, CaptureOutput},
};

/// Frames per second delivered by the scripted frame source.
const FRAME_RATE: u64 = 10;

/// Give up if nothing is captured within this time.
const DEMO_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Scripted frame source
// ---------------------------------------------------------------------------

/// Feed frames the way a camera + face detector would: nobody in view,
/// then a face that is too far away, then a well framed face for as long as
/// the orchestrator is listening.
async fn run_frame_source(handle: CaptureHandle) {
    let mut ticker = tokio::time::interval(Duration::from_millis(1000 / FRAME_RATE));
    let mut frame: u64 = 0;
    loop {
        ticker.tick().await;
        let signal = match frame {
            0..=9 => DetectionSignal::no_face(),
            10..=19 => DetectionSignal::new(true, false, "Move closer"),
            _ => DetectionSignal::optimal(),
        };
        if !handle.frame_signal(signal) {
            break;
        }
        frame += 1;
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("face-capture demo starting up");

    // 2. Configuration
    let config = CaptureConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        CaptureConfig::default()
    });

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(run_demo(config))
}

async fn run_demo(config: CaptureConfig) -> anyhow::Result<()> {
    // 4. Backend
    let paths = AppPaths::new();
    let backend = Arc::new(SimulatedBackend::new().with_output_dir(&paths.recordings_dir));
    log::info!("Transient clips go to {}", paths.recordings_dir.display());

    // 5. Orchestrator
    let (orchestrator, handle, mut outputs) = CaptureOrchestrator::new(config, backend.clone());
    backend.attach(handle.clone());
    let orchestrator_task = tokio::spawn(orchestrator.run());

    log::info!("Cameras: {:?}", handle.available_cameras().await);
    handle.start();

    // 6. Frame source
    let frames = tokio::spawn(run_frame_source(handle.clone()));

    // 7. Outputs
    let outcome = tokio::time::timeout(DEMO_TIMEOUT, async {
        while let Some(output) = outputs.recv().await {
            match &output {
                CaptureOutput::StatusChanged { status } => {
                    log::info!("status: {}", status.label())
                }
                CaptureOutput::CaptureResult { result } => {
                    log::info!(
                        "captured {} ({} bytes, {}): {}",
                        result.file_name,
                        result.size,
                        result.mime_type,
                        serde_json::to_string(result).unwrap_or_default()
                    );
                    return Ok(());
                }
                CaptureOutput::Error { kind, message } => {
                    anyhow::bail!("{}: {message}", kind.label());
                }
                CaptureOutput::InstructionStep { index, text, .. } => {
                    log::info!("tutorial step {}: {text}", index + 1)
                }
                CaptureOutput::GuidanceMessage { .. }
                | CaptureOutput::RecordingProgress { .. }
                | CaptureOutput::InstructionProgress { .. } => {
                    log::trace!("{output:?}")
                }
                other => log::debug!("{other:?}"),
            }
        }
        anyhow::bail!("orchestrator closed its output channel")
    })
    .await;

    handle.shutdown();
    frames.abort();
    let _ = orchestrator_task.await;
    log::debug!("backend history: {:?}", backend.history());

    match outcome {
        Ok(result) => result,
        Err(_) => anyhow::bail!("nothing captured within {DEMO_TIMEOUT:?}"),
    }
}
