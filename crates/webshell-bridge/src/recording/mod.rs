//! Audio and background video recording.
//!
//! A [`Recorder`] toggles between idle and recording. Starting opens the
//! capture devices and allocates an output file; stopping releases the
//! devices and publishes the file to shared storage, keeping the private
//! copy as the result if publishing fails.

pub mod paths;
mod session;

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::platform::{CameraHandle, DeviceError, DeviceGuard, MediaDevices, MediaStore};

pub use session::{MediaKind, RecordingSession};

/// Recording failure. Devices are already released when this is returned.
#[derive(Debug, thiserror::Error)]
pub enum RecordingError {
    #[error("Failed to prepare output file: {0}")]
    Output(#[from] std::io::Error),

    #[error("Failed to start {kind} recording: {source}")]
    Start {
        kind: &'static str,
        #[source]
        source: DeviceError,
    },

    #[error("Failed to stop {kind} recording: {source}")]
    Stop {
        kind: &'static str,
        #[source]
        source: DeviceError,
    },
}

/// Observable recorder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording {
        /// Unique session ID for log correlation.
        session_id: Uuid,
        started_at: Instant,
    },
}

/// Result of [`Recorder::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started(PathBuf),
    /// Already recording; nothing changed.
    AlreadyActive,
}

/// A finalised recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedRecording {
    pub private_path: PathBuf,
    /// Copy in shared storage, if publishing succeeded.
    pub public_path: Option<PathBuf>,
}

impl FinishedRecording {
    /// Where the user will find the file.
    pub fn location(&self) -> &Path {
        self.public_path.as_deref().unwrap_or(&self.private_path)
    }
}

/// Result of [`Recorder::toggle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggled {
    Started(PathBuf),
    Stopped(FinishedRecording),
}

/// Owns at most one [`RecordingSession`] of a given kind.
#[derive(Debug)]
pub struct Recorder {
    kind: MediaKind,
    dir: PathBuf,
    session: Option<RecordingSession>,
}

impl Recorder {
    /// A recorder writing into `dir`.
    pub fn new(kind: MediaKind, dir: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            dir: dir.into(),
            session: None,
        }
    }

    pub const fn kind(&self) -> MediaKind {
        self.kind
    }

    pub const fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    pub fn state(&self) -> RecordingState {
        self.session
            .as_ref()
            .map_or(RecordingState::Idle, |s| RecordingState::Recording {
                session_id: s.id,
                started_at: s.started_at,
            })
    }

    /// Output of the recording in progress.
    pub fn current_output(&self) -> Option<&Path> {
        self.session.as_ref().map(RecordingSession::output)
    }

    /// Open the devices and start writing.
    ///
    /// For video the camera is opened, previewed and unlocked before the
    /// recorder is bound to it. Any failure releases whatever was opened,
    /// recorder first, then camera.
    pub fn start(&mut self, devices: &mut dyn MediaDevices) -> Result<StartOutcome, RecordingError> {
        if self.is_recording() {
            info!(kind = self.kind.as_str(), "Already recording");
            return Ok(StartOutcome::AlreadyActive);
        }

        let kind = self.kind;
        let output = paths::allocate(
            &self.dir,
            kind.file_prefix(),
            kind.extension(),
            &Local::now(),
        )?;
        let start_err = |source| RecordingError::Start {
            kind: kind.as_str(),
            source,
        };

        let profile = kind.profile();
        let mut camera = if profile.uses_camera() {
            let mut guard = DeviceGuard::new(devices.open_camera().map_err(start_err)?);
            let handle = guard.get_mut().map_err(start_err)?;
            handle.start_preview().map_err(start_err)?;
            handle.unlock().map_err(start_err)?;
            Some(guard)
        } else {
            None
        };

        let opened = match camera.as_mut() {
            Some(guard) => {
                let handle: &mut dyn CameraHandle = guard.get_mut().map_err(start_err)?;
                devices.open_recorder(&profile, &output, Some(handle))
            }
            None => devices.open_recorder(&profile, &output, None),
        };
        let mut recorder = DeviceGuard::new(opened.map_err(start_err)?);
        if let Err(e) = recorder.get_mut().and_then(|r| r.start()) {
            error!(kind = kind.as_str(), error = %e, "Recorder failed to start");
            recorder.release();
            drop(camera);
            remove_partial(&output);
            return Err(start_err(e));
        }

        let session = RecordingSession::new(kind, output.clone(), recorder, camera);
        info!(
            session_id = %session.id,
            kind = kind.as_str(),
            output = %output.display(),
            "Recording started"
        );
        self.session = Some(session);
        Ok(StartOutcome::Started(output))
    }

    /// Stop writing, release the devices and publish the file.
    ///
    /// Returns `Ok(None)` when idle.
    pub fn stop(
        &mut self,
        store: &mut dyn MediaStore,
    ) -> Result<Option<FinishedRecording>, RecordingError> {
        let Some(session) = self.session.take() else {
            return Ok(None);
        };
        let session_id = session.id;
        let private_path = session.output.clone();
        let elapsed = session.started_at.elapsed();

        session.finish().map_err(|source| {
            error!(%session_id, error = %source, "Recorder failed to stop");
            RecordingError::Stop {
                kind: self.kind.as_str(),
                source,
            }
        })?;

        let public_path = match store.publish(&private_path, self.kind.collection()) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(
                    %session_id,
                    error = %e,
                    "Failed to publish recording, keeping private copy"
                );
                None
            }
        };

        let finished = FinishedRecording {
            private_path,
            public_path,
        };
        info!(
            %session_id,
            kind = self.kind.as_str(),
            location = %finished.location().display(),
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Recording stopped"
        );
        Ok(Some(finished))
    }

    /// Start when idle, stop when recording.
    pub fn toggle(
        &mut self,
        devices: &mut dyn MediaDevices,
        store: &mut dyn MediaStore,
    ) -> Result<Toggled, RecordingError> {
        if let Some(finished) = self.stop(store)? {
            return Ok(Toggled::Stopped(finished));
        }
        match self.start(devices)? {
            StartOutcome::Started(path) => Ok(Toggled::Started(path)),
            // start only reports AlreadyActive when a session exists, and
            // stop above just cleared it.
            StartOutcome::AlreadyActive => Err(RecordingError::Start {
                kind: self.kind.as_str(),
                source: DeviceError::Busy("recorder".to_string()),
            }),
        }
    }

    /// Release held devices without finalising the output.
    pub fn release_all(&mut self) {
        if let Some(session) = self.session.take() {
            warn!(
                session_id = %session.id,
                kind = self.kind.as_str(),
                "Releasing recorder without finalising"
            );
            session.abandon();
        }
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.release_all();
    }
}

fn remove_partial(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "Failed to remove partial recording");
        }
    }
}
