//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Create a directory and all missing parents.
pub fn ensure_dir(path: &Path, operation: &str) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|e| Error::internal_io(e.to_string(), Some(operation.to_string())))
}

/// Write content to a file atomically (write to .tmp, then rename).
///
/// The rename is atomic on POSIX filesystems, so a crash mid-write leaves
/// either the old content or the new content in place, never a partial file.
pub fn write_file_atomic(path: &Path, content: &str, operation: &str) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        Error::internal_io(
            format!("Invalid path: {}", path.display()),
            Some(operation.to_string()),
        )
    })?;

    let filename = path.file_name().ok_or_else(|| {
        Error::internal_io(
            format!("Invalid path: {}", path.display()),
            Some(operation.to_string()),
        )
    })?;

    let tmp_path = parent.join(format!("{}.tmp", filename.to_string_lossy()));

    fs::write(&tmp_path, content)
        .map_err(|e| Error::internal_io(e.to_string(), Some(format!("{} (write temp)", operation))))?;

    fs::rename(&tmp_path, path)
        .map_err(|e| Error::internal_io(e.to_string(), Some(format!("{} (rename)", operation))))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_dir_creates_nested_directories() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("a/b/c");
        ensure_dir(&nested, "test ensure").unwrap();
        assert!(nested.is_dir());
        // Second call is a no-op
        ensure_dir(&nested, "test ensure").unwrap();
    }

    #[test]
    fn write_file_atomic_leaves_no_temp_file() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("out.txt");
        write_file_atomic(&target, "payload", "test atomic").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "payload");
        let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn write_file_atomic_replaces_existing_content() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("out.txt");
        fs::write(&target, "old").unwrap();

        write_file_atomic(&target, "new", "test atomic").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }

    #[test]
    fn write_file_atomic_rejects_path_without_filename() {
        let err = write_file_atomic(Path::new("/"), "payload", "test atomic").unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
    }
}
