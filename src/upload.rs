//! Upload validation rules and temp-file handling.
//!
//! Every adapter validates incoming audio against the same fixed rules
//! (extension allowlist, 50 MiB ceiling). The network adapters store
//! uploads under random-token-prefixed names so hostile client-supplied
//! filenames cannot collide or traverse paths, and wrap the stored file
//! in a guard that deletes it exactly once on every exit path.

use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Audio extensions accepted by every adapter.
pub const ALLOWED_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "ogg", "flac"];

/// Upload size ceiling (50 MiB), enforced before the pipeline runs.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Check whether a filename carries an accepted audio extension.
pub fn is_allowed_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Lowercased extension of a filename, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Strip directory components and hostile characters from a
/// client-supplied filename.
pub fn sanitize_filename(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.chars().all(|c| matches!(c, '.' | '_')) {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Unique local name for a stored upload: random token prefix plus the
/// sanitized original name.
pub fn unique_name(filename: &str) -> String {
    format!(
        "{}_{}",
        uuid::Uuid::new_v4().simple(),
        sanitize_filename(filename)
    )
}

/// A stored upload that removes its file when dropped.
///
/// Dropping is the only deletion path, so the file is removed exactly
/// once whether the request succeeds, the pipeline fails, or the
/// handler unwinds early.
pub struct UploadGuard {
    path: PathBuf,
}

impl UploadGuard {
    /// Persist upload bytes into `dir` under a unique name.
    pub fn store(dir: &Path, filename: &str, bytes: &[u8]) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(unique_name(filename));
        std::fs::write(&path, bytes)?;
        Ok(Self { path })
    }

    /// Path of the stored file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UploadGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove upload {}: {}", self.path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        assert!(is_allowed_extension("lecture.mp3"));
        assert!(is_allowed_extension("lecture.WAV"));
        assert!(is_allowed_extension("week 3.m4a"));
        assert!(!is_allowed_extension("lecture.pdf"));
        assert!(!is_allowed_extension("lecture"));
        assert!(!is_allowed_extension(""));
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("week 3 audio.mp3"), "week_3_audio.mp3");
        assert_eq!(sanitize_filename("..."), "upload");
        assert_eq!(sanitize_filename("lecture.mp3"), "lecture.mp3");
    }

    #[test]
    fn test_unique_name_keeps_extension() {
        let a = unique_name("lecture.mp3");
        let b = unique_name("lecture.mp3");
        assert_ne!(a, b);
        assert!(a.ends_with("_lecture.mp3"));
    }

    #[test]
    fn test_guard_deletes_on_drop() {
        let dir = tempfile::tempdir().unwrap();

        let path = {
            let guard = UploadGuard::store(dir.path(), "lecture.mp3", b"audio").unwrap();
            assert!(guard.path().exists());
            guard.path().to_path_buf()
        };

        assert!(!path.exists());
    }

    #[test]
    fn test_guard_deletes_after_failure_path() {
        let dir = tempfile::tempdir().unwrap();
        let guard = UploadGuard::store(dir.path(), "lecture.wav", b"audio").unwrap();
        let path = guard.path().to_path_buf();

        // Simulate a handler bailing out with the guard still in scope.
        let result: std::result::Result<(), &str> = Err("pipeline failed");
        assert!(result.is_err());
        drop(guard);

        assert!(!path.exists());
    }
}
