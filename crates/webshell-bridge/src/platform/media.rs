//! Capture hardware and shared media storage.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Capture device failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// Another client holds the device.
    #[error("Device busy: {0}")]
    Busy(String),

    #[error("Device not present: {0}")]
    Missing(String),

    #[error("Device handle already released")]
    Released,

    #[error("Device call failed: {0}")]
    Failed(String),
}

/// Output container for a recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    ThreeGpp,
    Mpeg4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEncoder {
    AmrNb,
    Aac,
}

/// Video track settings; present only for camera recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    pub bit_rate: u32,
}

/// Everything the host needs to configure and prepare a recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecorderProfile {
    pub output_format: OutputFormat,
    pub audio_encoder: AudioEncoder,
    pub audio_bit_rate: Option<u32>,
    pub audio_sampling_rate: Option<u32>,
    pub video: Option<VideoSettings>,
}

impl RecorderProfile {
    /// Microphone only, 3GPP container, AMR narrowband.
    pub const fn audio() -> Self {
        Self {
            output_format: OutputFormat::ThreeGpp,
            audio_encoder: AudioEncoder::AmrNb,
            audio_bit_rate: None,
            audio_sampling_rate: None,
            video: None,
        }
    }

    /// Camera plus microphone, MPEG-4 with H.264 video and AAC audio.
    pub const fn video() -> Self {
        Self {
            output_format: OutputFormat::Mpeg4,
            audio_encoder: AudioEncoder::Aac,
            audio_bit_rate: Some(128_000),
            audio_sampling_rate: Some(44_100),
            video: Some(VideoSettings {
                width: 1280,
                height: 720,
                frame_rate: 30,
                bit_rate: 5_000_000,
            }),
        }
    }

    pub const fn uses_camera(&self) -> bool {
        self.video.is_some()
    }
}

/// A hardware handle that must be given back to the OS.
pub trait Release {
    /// Give the handle back. Called at most once through [`DeviceGuard`].
    fn release(&mut self);
}

/// An opened camera.
pub trait CameraHandle: Release + Send {
    /// Start the hidden preview surface the recorder draws from.
    fn start_preview(&mut self) -> Result<(), DeviceError>;
    fn stop_preview(&mut self) -> Result<(), DeviceError>;
    /// Hand the camera over to a recorder.
    fn unlock(&mut self) -> Result<(), DeviceError>;
    /// Take the camera back from the recorder.
    fn lock(&mut self) -> Result<(), DeviceError>;
}

/// A configured and prepared media recorder.
pub trait RecorderHandle: Release + Send {
    fn start(&mut self) -> Result<(), DeviceError>;
    fn stop(&mut self) -> Result<(), DeviceError>;
}

/// Factory for capture hardware.
pub trait MediaDevices: Send {
    fn open_camera(&mut self) -> Result<Box<dyn CameraHandle>, DeviceError>;

    /// Configure and prepare a recorder writing to `output`.
    ///
    /// `camera` is the unlocked camera for video profiles and `None` for audio.
    fn open_recorder(
        &mut self,
        profile: &RecorderProfile,
        output: &Path,
        camera: Option<&mut dyn CameraHandle>,
    ) -> Result<Box<dyn RecorderHandle>, DeviceError>;
}

/// Owns a device handle and releases it exactly once.
///
/// Release happens on the first explicit [`DeviceGuard::release`] or on drop,
/// whichever comes first; later calls are no-ops.
pub struct DeviceGuard<H: ?Sized + Release> {
    handle: Option<Box<H>>,
}

impl<H: ?Sized + Release> DeviceGuard<H> {
    pub fn new(handle: Box<H>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// The live handle.
    pub fn get_mut(&mut self) -> Result<&mut H, DeviceError> {
        self.handle.as_deref_mut().ok_or(DeviceError::Released)
    }

    pub const fn is_released(&self) -> bool {
        self.handle.is_none()
    }

    /// Release the handle. Returns `false` if it was already released.
    pub fn release(&mut self) -> bool {
        match self.handle.take() {
            Some(mut handle) => {
                handle.release();
                true
            }
            None => {
                debug!("Device already released");
                false
            }
        }
    }
}

impl<H: ?Sized + Release> Drop for DeviceGuard<H> {
    fn drop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.release();
        }
    }
}

impl<H: ?Sized + Release> std::fmt::Debug for DeviceGuard<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceGuard")
            .field("released", &self.is_released())
            .finish()
    }
}

/// Shared media collection a finished file is published into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCollection {
    Music,
    Movies,
    Pictures,
}

impl MediaCollection {
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Music => "Music",
            Self::Movies => "Movies",
            Self::Pictures => "Pictures",
        }
    }

    pub const fn mime(self) -> &'static str {
        match self {
            Self::Music => "audio/3gpp",
            Self::Movies => "video/mp4",
            Self::Pictures => "image/jpeg",
        }
    }
}

/// Publishes app-private files into shared storage.
pub trait MediaStore: Send {
    /// Copy `source` into `collection`, returning the public location.
    fn publish(&mut self, source: &Path, collection: MediaCollection) -> io::Result<PathBuf>;
}

/// [`MediaStore`] over a plain directory tree:
/// `<root>/<Music|Movies|Pictures>/<app_folder>/<file>`.
#[derive(Debug, Clone)]
pub struct FsMediaStore {
    root: PathBuf,
    app_folder: String,
}

impl FsMediaStore {
    pub fn new(root: impl Into<PathBuf>, app_folder: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            app_folder: app_folder.into(),
        }
    }

    pub fn collection_dir(&self, collection: MediaCollection) -> PathBuf {
        self.root
            .join(collection.dir_name())
            .join(&self.app_folder)
    }
}

impl MediaStore for FsMediaStore {
    fn publish(&mut self, source: &Path, collection: MediaCollection) -> io::Result<PathBuf> {
        let name = source.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", source.display()),
            )
        })?;
        let dir = self.collection_dir(collection);
        fs::create_dir_all(&dir)?;
        let dest = dir.join(name);
        fs::copy(source, &dest)?;
        debug!(
            source = %source.display(),
            dest = %dest.display(),
            mime = collection.mime(),
            "Published media file"
        );
        Ok(dest)
    }
}
