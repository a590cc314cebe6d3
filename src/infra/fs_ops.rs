// ============================================================
// Layer 5 — Filesystem Helpers
// ============================================================

use std::fs;
use std::io;
use std::path::Path;

use crate::domain::error::Result;

/// `mkdir -p`
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Remove `path` if it exists and create it again empty.
pub fn recreate_dir(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)?;
    }
    fs::create_dir_all(path)?;
    Ok(())
}

/// Move a file, falling back to copy + remove when a plain
/// rename is not possible (e.g. across filesystems).
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(e.into()),
        Err(_) => {
            fs::copy(from, to)?;
            fs::remove_file(from)?;
            Ok(())
        }
    }
}

/// Directories directly below `path`, sorted by name.
pub fn sorted_subdirs(path: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_move_file_creates_parent() {
        let tmp  = TempDir::new().unwrap();
        let from = tmp.path().join("a.txt");
        let to   = tmp.path().join("nested/dir/b.txt");
        fs::write(&from, "hello").unwrap();

        move_file(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "hello");
    }

    #[test]
    fn test_move_missing_file_fails() {
        let tmp = TempDir::new().unwrap();
        let res = move_file(&tmp.path().join("nope"), &tmp.path().join("b"));
        assert!(res.is_err());
    }

    #[test]
    fn test_recreate_dir_empties_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("d");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("old"), "x").unwrap();

        recreate_dir(&dir).unwrap();
        assert!(dir.exists());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_sorted_subdirs_skips_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("b")).unwrap();
        fs::create_dir_all(tmp.path().join("a")).unwrap();
        fs::write(tmp.path().join("c.txt"), "").unwrap();

        let dirs = sorted_subdirs(tmp.path()).unwrap();
        assert_eq!(dirs, vec![tmp.path().join("a"), tmp.path().join("b")]);
    }
}
