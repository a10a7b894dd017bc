//! Turning a finished backend artifact into a [`CaptureResult`].
//!
//! Materialization is the one slow step in the flow (reading the clip and
//! encoding it), so it runs in its own task and reports back as an event.
//! Transient files are deleted whether or not materialization succeeds.

use std::path::PathBuf;

use base64::Engine;
use serde::Serialize;
use uuid::Uuid;

use crate::error::CaptureError;

/// Where the backend left the recorded bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactData {
    /// Already in memory.
    Bytes(Vec<u8>),
    /// A transient file owned by the flow from now on.
    File(PathBuf),
}

/// Finished recording as reported by the capture backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub data: ArtifactData,
    pub mime_type: String,
    pub file_name: String,
}

impl Artifact {
    pub fn from_bytes(
        bytes: Vec<u8>,
        mime_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            data: ArtifactData::Bytes(bytes),
            mime_type: mime_type.into(),
            file_name: file_name.into(),
        }
    }

    pub fn from_file(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "capture".into());
        Self {
            data: ArtifactData::File(path),
            mime_type: mime_type.into(),
            file_name,
        }
    }
}

/// The deliverable handed to `onCaptureResult`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResult {
    pub session_id: Uuid,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Base64 (standard alphabet, padded) of `bytes`.
    pub encoded_form: String,
    pub mime_type: String,
    pub file_name: String,
    pub size: u64,
}

/// Read and encode `artifact`, deleting any transient file afterwards.
///
/// Any I/O failure becomes [`CaptureError::VideoProcessingFailed`] carrying
/// the underlying cause.
pub async fn materialize(
    session_id: Uuid,
    artifact: Artifact,
) -> Result<CaptureResult, CaptureError> {
    let Artifact {
        data,
        mime_type,
        file_name,
    } = artifact;

    let bytes = match data {
        ArtifactData::Bytes(bytes) => bytes,
        ArtifactData::File(path) => {
            let read = tokio::fs::read(&path).await;
            remove_transient(&path).await;
            read.map_err(|e| {
                CaptureError::VideoProcessingFailed(format!("reading {}: {e}", path.display()))
            })?
        }
    };

    if bytes.is_empty() {
        return Err(CaptureError::VideoProcessingFailed(format!(
            "artifact {file_name} is empty"
        )));
    }

    let (bytes, encoded_form) = tokio::task::spawn_blocking(move || {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        (bytes, encoded)
    })
    .await
    .map_err(|e| CaptureError::VideoProcessingFailed(format!("encoder task failed: {e}")))?;

    log::debug!(
        "artifact: materialized {file_name} ({} bytes) for session {session_id}",
        bytes.len()
    );

    Ok(CaptureResult {
        session_id,
        size: bytes.len() as u64,
        bytes,
        encoded_form,
        mime_type,
        file_name,
    })
}

/// Drop an artifact that will never be delivered.
pub async fn discard(artifact: Artifact) {
    if let ArtifactData::File(path) = artifact.data {
        remove_transient(&path).await;
    }
}

async fn remove_transient(path: &std::path::Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => log::debug!("artifact: removed transient {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("artifact: could not remove {}: {e}", path.display()),
    }
}
