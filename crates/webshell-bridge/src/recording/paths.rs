//! App-private media directories and output file naming.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use uuid::Uuid;
use webshell_core::config::StorageConfig;

/// Timestamp format shared by every generated file name.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// App-private directories under the data dir.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDirs {
    pub pictures: PathBuf,
    pub music: PathBuf,
    pub movies: PathBuf,
    /// Target of `saveFile`.
    pub cache: PathBuf,
}

impl MediaDirs {
    pub fn under(base: &Path) -> Self {
        Self {
            pictures: base.join("Pictures"),
            music: base.join("Music"),
            movies: base.join("Movies"),
            cache: base.join("cache"),
        }
    }

    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::under(&storage.resolved_data_dir())
    }

    /// Create every directory that does not exist yet.
    pub fn ensure(&self) -> io::Result<()> {
        for dir in [&self.pictures, &self.music, &self.movies, &self.cache] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

pub fn timestamp(now: &DateTime<Local>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// `<dir>/<prefix>_<timestamp>.<ext>`, suffixed `_1`, `_2`, ... when taken.
pub fn allocate(dir: &Path, prefix: &str, ext: &str, now: &DateTime<Local>) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let stem = format!("{prefix}_{}", timestamp(now));
    let mut candidate = dir.join(format!("{stem}.{ext}"));
    let mut n = 1u32;
    while candidate.exists() {
        candidate = dir.join(format!("{stem}_{n}.{ext}"));
        n += 1;
    }
    Ok(candidate)
}

/// Create an empty `JPEG_<timestamp>_<random>.jpg` for the camera app to fill.
pub fn create_photo_file(dir: &Path, now: &DateTime<Local>) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let suffix = Uuid::new_v4().simple().to_string();
    let path = dir.join(format!("JPEG_{}_{}.jpg", timestamp(now), &suffix[..8]));
    OpenOptions::new().write(true).create_new(true).open(&path)?;
    Ok(path)
}

/// A bare file name that stays inside its target directory.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 12, 5, 7).unwrap()
    }

    #[test]
    fn allocate_uses_timestamped_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = allocate(dir.path(), "REC", "3gp", &noon()).unwrap();
        assert_eq!(path, dir.path().join("REC_20240309_120507.3gp"));
    }

    #[test]
    fn allocate_skips_taken_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("VID_20240309_120507.mp4"), b"").unwrap();
        let path = allocate(dir.path(), "VID", "mp4", &noon()).unwrap();
        assert_eq!(path, dir.path().join("VID_20240309_120507_1.mp4"));
    }

    #[test]
    fn photo_file_is_created_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = create_photo_file(dir.path(), &noon()).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("JPEG_20240309_120507_"));
        assert!(name.ends_with(".jpg"));
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn rejects_names_that_escape_the_directory() {
        assert!(is_safe_file_name("notes.txt"));
        assert!(!is_safe_file_name("../notes.txt"));
        assert!(!is_safe_file_name("a/b.txt"));
        assert!(!is_safe_file_name("a\\b.txt"));
        assert!(!is_safe_file_name(".."));
        assert!(!is_safe_file_name(""));
    }
}
