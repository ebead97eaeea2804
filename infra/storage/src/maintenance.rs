use crate::file::TMP_MARKER;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};
use walkdir::{DirEntry, WalkDir};

/// Temp files younger than this may belong to a writer in another process.
const STALE_AFTER: Duration = Duration::from_secs(300);

pub(crate) fn purge_tmp(root: &Path) {
    let (removed, failed) = remove_stale(root, SystemTime::now(), STALE_AFTER);
    if removed > 0 || failed > 0 {
        info!(removed, failed, "Cleaned up temporary files");
    }
}

pub(crate) fn remove_stale(root: &Path, now: SystemTime, threshold: Duration) -> (usize, usize) {
    let mut removed = 0;
    let mut failed = 0;

    WalkDir::new(root)
        .max_depth(1)
        .into_iter()
        .flatten()
        .filter(|entry| is_tmp(entry) && is_stale(entry, now, threshold))
        .for_each(|entry| match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Temp file removal failed");
                failed += 1;
            },
        });

    (removed, failed)
}

fn is_tmp(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry.file_name().to_str().is_some_and(|name| name.contains(TMP_MARKER))
}

fn is_stale(entry: &DirEntry, now: SystemTime, threshold: Duration) -> bool {
    entry
        .metadata()
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|modified| now.duration_since(modified).ok())
        .map_or(true, |age| age > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_only_stale_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let tmp = dir.path().join(format!("draft.kv{TMP_MARKER}1.1"));
        let value = dir.path().join("draft.kv");
        std::fs::write(&tmp, b"partial").unwrap();
        std::fs::write(&value, b"{}").unwrap();

        let (removed, failed) = remove_stale(dir.path(), SystemTime::now(), STALE_AFTER);
        assert_eq!((removed, failed), (0, 0), "fresh temp files are kept");

        let later = SystemTime::now() + Duration::from_secs(600);
        let (removed, failed) = remove_stale(dir.path(), later, STALE_AFTER);
        assert_eq!((removed, failed), (1, 0));
        assert!(!tmp.exists());
        assert!(value.exists());
    }
}
