//! Tar archiving for snapshot and package artifacts
//!
//! Snapshot and package runs both end by packing a directory they assembled
//! into a plain, uncompressed `.tar` next to it. Archive paths route through
//! [`FileOps::unique_path`] so repeated runs never overwrite an earlier
//! artifact.

use std::fs::File;
use std::path::{Path, PathBuf};

use tar::Builder;

use crate::error::{Error, Result};
use crate::files::FileOps;

/// Pack `dir` into a tar archive at `dest`.
///
/// Entries are rooted at the directory's own name, so unpacking recreates
/// the directory rather than spilling its contents. Returns the path
/// actually written, which may carry a numeric suffix when `dest` already
/// existed. Under dry-run nothing is written.
pub fn pack_dir(ops: &FileOps, dir: &Path, dest: &Path) -> Result<PathBuf> {
    let base = dir.file_name().ok_or_else(|| Error::Path {
        message: format!("cannot archive a directory without a name: {}", dir.display()),
    })?;

    let dest = ops.unique_path(dest);
    if ops.is_dry_run() {
        log::debug!("dry run: would pack {} -> {}", dir.display(), dest.display());
        return Ok(dest);
    }

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(&dest)?;
    let mut builder = Builder::new(file);
    builder.append_dir_all(base, dir)?;
    builder.finish()?;
    log::debug!("packed {} -> {}", dir.display(), dest.display());
    Ok(dest)
}
