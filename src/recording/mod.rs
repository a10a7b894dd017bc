//! Recording lifecycle and artifact materialization.
//!
//! [`RecordingSession`] owns the single recording slot: start, stop,
//! progress, completion, failure and discard-on-cancel.  The finished clip is
//! converted into a [`CaptureResult`] by [`artifact::materialize`].

pub mod artifact;
pub mod session;

pub use artifact::{Artifact, ArtifactData, CaptureResult};
pub use session::{
    progress_ratio, ArtifactDisposition, CaptureSession, ProgressUpdate, RecordingOutcome,
    RecordingSession, SessionHandle,
};
