//! Whole-file writes that never leave a partial file at the target path.
//!
//! Content goes to a temporary file in the target's directory first and is
//! moved into place only after it is fully written and synced.  A failed
//! write drops the temporary file and leaves the target untouched.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::StoreResult;

/// What to do when the target already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Existing {
    Replace,
    Keep,
}

/// Write `body` to `path`.
///
/// Returns `false` when `existing` is [`Existing::Keep`] and `path` was
/// already present.  The parent directory must exist.
pub(crate) async fn write_file(path: &Path, body: String, existing: Existing) -> StoreResult<bool> {
    let path = path.to_path_buf();
    let written = tokio::task::spawn_blocking(move || {
        persist_with(&path, existing, |file| file.write_all(body.as_bytes()))
    })
    .await??;
    Ok(written)
}

pub(crate) fn persist_with(
    path: &Path,
    existing: Existing,
    fill: impl FnOnce(&mut NamedTempFile) -> io::Result<()>,
) -> io::Result<bool> {
    let mut tmp = NamedTempFile::new_in(parent_of(path))?;
    fill(&mut tmp)?;
    tmp.as_file().sync_all()?;

    match existing {
        Existing::Replace => {
            tmp.persist(path).map_err(|e| e.error)?;
            Ok(true)
        }
        Existing::Keep => match tmp.persist_noclobber(path) {
            Ok(_) => Ok(true),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.error),
        },
    }
}

fn parent_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
