//! A single in-progress recording.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::warn;
use uuid::Uuid;

use crate::platform::{CameraHandle, DeviceError, DeviceGuard, MediaCollection, RecorderHandle, RecorderProfile};

/// Audio-only or camera recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    pub const fn profile(self) -> RecorderProfile {
        match self {
            Self::Audio => RecorderProfile::audio(),
            Self::Video => RecorderProfile::video(),
        }
    }

    pub const fn collection(self) -> MediaCollection {
        match self {
            Self::Audio => MediaCollection::Music,
            Self::Video => MediaCollection::Movies,
        }
    }

    pub const fn file_prefix(self) -> &'static str {
        match self {
            Self::Audio => "REC",
            Self::Video => "VID",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Audio => "3gp",
            Self::Video => "mp4",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

/// Devices and output of a recording in progress.
///
/// The recorder guard is declared before the camera guard, so on drop the
/// recorder is released first.
#[derive(Debug)]
pub struct RecordingSession {
    pub id: Uuid,
    pub kind: MediaKind,
    pub output: PathBuf,
    pub started_at: Instant,
    recorder: DeviceGuard<dyn RecorderHandle>,
    camera: Option<DeviceGuard<dyn CameraHandle>>,
}

impl RecordingSession {
    pub(crate) fn new(
        kind: MediaKind,
        output: PathBuf,
        recorder: DeviceGuard<dyn RecorderHandle>,
        camera: Option<DeviceGuard<dyn CameraHandle>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            output,
            started_at: Instant::now(),
            recorder,
            camera,
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Stop writing and hand every device back.
    ///
    /// The camera is released even when the recorder fails to stop; only the
    /// recorder's stop error is returned.
    pub(crate) fn finish(mut self) -> Result<(), DeviceError> {
        let stopped = self.recorder.get_mut().and_then(|r| r.stop());
        self.recorder.release();

        if let Some(mut camera) = self.camera.take() {
            if let Ok(handle) = camera.get_mut() {
                if let Err(e) = handle.stop_preview() {
                    warn!(session_id = %self.id, error = %e, "Failed to stop camera preview");
                }
                if let Err(e) = handle.lock() {
                    warn!(session_id = %self.id, error = %e, "Failed to lock camera");
                }
            }
            camera.release();
        }

        stopped
    }

    /// Release every device without finalising the output.
    pub(crate) fn abandon(mut self) {
        self.recorder.release();
        if let Some(mut camera) = self.camera.take() {
            camera.release();
        }
    }
}
