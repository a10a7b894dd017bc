//! Configuration module.
//!
//! Provides [`CaptureConfig`] (the immutable tunables snapshot) with its
//! sub-configs, [`AppPaths`] for cross-platform directories, TOML persistence
//! via `CaptureConfig::load` / `CaptureConfig::save`, and the
//! [`ConfigurationReconciler`] that classifies snapshot changes.

pub mod paths;
pub mod reconcile;
pub mod settings;

pub use paths::AppPaths;
pub use reconcile::{ConfigChange, ConfigurationReconciler};
pub use settings::{
    CameraConfig, CameraPosition, CaptureConfig, DetectionConfig, InstructionConfig,
    InstructionStepConfig, TimerStyleConfig, VideoConfig, VideoQuality,
};
