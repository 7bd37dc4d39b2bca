//! Results of activities launched on behalf of the page.

use std::fs;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::platform::{MediaCollection, Platform, ToastLength};

use super::WebBridge;

/// What a launched activity handed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ActivityResult {
    /// The camera app finished; `ok` is false when the user backed out.
    PhotoCapture { ok: bool },
    VideoCapture { uri: Option<String> },
    ImagePicked { uri: Option<String> },
    FilePicked { uri: Option<String> },
}

impl<P: Platform> WebBridge<P> {
    pub fn on_activity_result(&mut self, result: ActivityResult) {
        debug!(?result, "Activity result");
        match result {
            ActivityResult::PhotoCapture { ok: true } => self.photo_captured(),
            ActivityResult::PhotoCapture { ok: false } => {
                if let Some(path) = self.current_photo.take() {
                    if let Err(e) = fs::remove_file(&path) {
                        debug!(path = %path.display(), error = %e, "No photo placeholder to remove");
                    }
                }
                self.toast("Photo capture cancelled");
            }
            ActivityResult::VideoCapture { uri: Some(uri) } => {
                info!(%uri, "Video recorded");
                self.platform.show_toast(
                    &format!("Video recorded: {}", last_segment(&uri)),
                    ToastLength::Long,
                );
            }
            ActivityResult::ImagePicked { uri: Some(uri) } => {
                info!(%uri, "Image selected");
                self.toast(&format!("Image selected: {}", last_segment(&uri)));
            }
            ActivityResult::FilePicked { uri: Some(uri) } => {
                info!(%uri, "File selected");
                self.toast(&format!("File selected: {}", last_segment(&uri)));
            }
            ActivityResult::VideoCapture { uri: None }
            | ActivityResult::ImagePicked { uri: None }
            | ActivityResult::FilePicked { uri: None } => {
                debug!("Activity cancelled");
            }
        }
    }

    fn photo_captured(&mut self) {
        let Some(path) = self.current_photo.take() else {
            warn!("Photo captured but no file path is tracked");
            self.toast("Photo file path not available");
            return;
        };
        let size = match fs::metadata(&path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Captured photo file missing");
                self.toast("Photo file not found");
                return;
            }
        };

        let location = match self.store.publish(&path, MediaCollection::Pictures) {
            Ok(public) => public,
            Err(e) => {
                warn!(error = %e, "Failed to publish photo, keeping private copy");
                path.clone()
            }
        };
        info!(
            path = %path.display(),
            location = %location.display(),
            size,
            "Photo captured"
        );
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.platform.show_toast(
            &format!("Photo captured: {name} ({size} bytes)"),
            ToastLength::Long,
        );
    }
}

fn last_segment(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}
