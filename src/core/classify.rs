use crate::error::{CopyError, CopyResult};
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    File,
    Directory,
    Missing,
}

/// Classifies `path` from filesystem metadata, following symlinks.
///
/// Anything that exists but is not a directory (regular files, fifos,
/// devices) is reported as `File`. Trailing separators are ignored, so
/// `a.txt/` classifies like `a.txt`.
pub fn classify(path: &Path) -> CopyResult<Classification> {
    match std::fs::metadata(trim_trailing_separators(path)) {
        Ok(meta) if meta.is_dir() => Ok(Classification::Directory),
        Ok(_) => Ok(Classification::File),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Classification::Missing),
        Err(e) => Err(CopyError::io(path, e)),
    }
}

/// `path` without trailing separators. A path made only of separators is
/// returned unchanged.
pub(crate) fn trim_trailing_separators(path: &Path) -> &Path {
    let Some(text) = path.to_str() else {
        return path;
    };
    let trimmed = text.trim_end_matches(std::path::is_separator);
    if trimmed.is_empty() {
        path
    } else {
        Path::new(trimmed)
    }
}

/// Guesses what a path that does not exist yet is meant to be.
///
/// Only for prospective destinations: when the path exists, [`classify`]
/// is authoritative and this heuristic must not be consulted.
pub fn classify_prospective(path: &Path) -> Classification {
    if looks_like_file(&path.to_string_lossy()) {
        Classification::File
    } else {
        Classification::Directory
    }
}

/// Heuristic on the last segment of a path string.
///
/// `/` and `\` are both separators, whatever the host platform. A trailing
/// separator marks a directory. Otherwise the last segment is a file name
/// when it has a `.` anywhere but in front: `file.go` is a file, while
/// `another`, `.git` and `.hello.go` are not.
pub fn looks_like_file(path: &str) -> bool {
    if path.ends_with(['/', '\\']) {
        return false;
    }
    let segment = path.rsplit(['/', '\\']).next().unwrap_or("");
    segment.find('.').is_some_and(|pos| pos > 0)
}
