//! File operations for stage bodies
//!
//! [`FileOps`] is the single filesystem handle a stage works through. All
//! relative paths resolve against one project root, and every destructive
//! operation honors the resolved `dry-run` flag by logging the would-be
//! action instead of touching the disk. That keeps full pipeline runs
//! side-effect-free under `--dryrun`, which the integration tests rely on.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Options for [`FileOps::write`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOpts {
    /// Overwrite an existing file
    pub force: bool,
    /// Divert to a numbered sibling path instead of overwriting
    pub rename: bool,
}

/// Filesystem handle bound to a project root.
#[derive(Debug, Clone)]
pub struct FileOps {
    root: PathBuf,
    dry_run: bool,
}

impl FileOps {
    pub fn new<P: Into<PathBuf>>(root: P, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            dry_run,
        }
    }

    /// The project root all relative paths resolve against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Join `segments` onto the project root into one absolute path.
    pub fn resolve_path<I, S>(&self, segments: I) -> PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        let mut resolved = self.root.clone();
        for segment in segments {
            resolved.push(segment.as_ref());
        }
        resolved
    }

    /// Make `path` relative to the project root, when it is under it.
    pub fn relative_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let path = path.as_ref();
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.absolute(path.as_ref()).exists()
    }

    /// Read a file to a string.
    pub fn read<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        Ok(fs::read_to_string(self.absolute(path.as_ref()))?)
    }

    /// Write `content` to `path`, creating parent directories.
    ///
    /// An existing file is left alone unless `force` overwrites it or
    /// `rename` diverts the write to a [`unique_path`](Self::unique_path)
    /// sibling. Returns the path written, or `None` when the write was
    /// skipped.
    pub fn write<P: AsRef<Path>>(
        &self,
        path: P,
        content: &str,
        opts: WriteOpts,
    ) -> Result<Option<PathBuf>> {
        let target = self.absolute(path.as_ref());

        let destination = if target.exists() && !opts.force {
            if !opts.rename {
                log::debug!("write skipped, exists: {}", target.display());
                return Ok(None);
            }
            self.unique_path(&target)
        } else {
            target
        };

        if self.dry_run {
            log::debug!("dry run: would write {}", destination.display());
            return Ok(Some(destination));
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&destination, content)?;
        log::debug!("wrote {}", destination.display());
        Ok(Some(destination))
    }

    /// Delete files and directories. Missing paths are skipped.
    pub fn delete(&self, paths: &[PathBuf]) -> Result<()> {
        for path in paths {
            let target = self.absolute(path);
            if self.dry_run {
                log::debug!("dry run: would delete {}", target.display());
                continue;
            }
            if target.is_dir() {
                fs::remove_dir_all(&target)?;
                log::debug!("deleted directory {}", target.display());
            } else if target.exists() {
                fs::remove_file(&target)?;
                log::debug!("deleted file {}", target.display());
            }
        }
        Ok(())
    }

    /// Expand glob patterns relative to the project root.
    ///
    /// Returns absolute paths, sorted and deduplicated. Entries the walker
    /// cannot read are skipped with a warning rather than failing the run.
    pub fn glob(&self, patterns: &[String]) -> Result<Vec<PathBuf>> {
        let mut matches = Vec::new();
        for pattern in patterns {
            let full = self.root.join(pattern);
            let full = full.to_string_lossy();
            for entry in glob::glob(&full)? {
                match entry {
                    Ok(path) => matches.push(path),
                    Err(err) => log::warn!("glob skipped unreadable entry: {}", err),
                }
            }
        }
        matches.sort();
        matches.dedup();
        Ok(matches)
    }

    /// Copy `sources` under `dest_dir`, preserving their paths relative to
    /// the project root. Directory sources are walked recursively.
    ///
    /// Returns the files created.
    pub fn copy(&self, sources: &[PathBuf], dest_dir: &Path) -> Result<Vec<PathBuf>> {
        let dest_dir = self.absolute(dest_dir);
        let mut created = Vec::new();

        for source in sources {
            let source = self.absolute(source);
            if source.is_dir() {
                for entry in WalkDir::new(&source) {
                    let entry = entry.map_err(|err| Error::Filesystem {
                        message: format!("walk failed under {}: {}", source.display(), err),
                    })?;
                    if entry.file_type().is_file() {
                        let dest = dest_dir.join(self.relative_path(entry.path()));
                        self.copy_file(entry.path(), &dest)?;
                        created.push(dest);
                    }
                }
            } else if source.is_file() {
                let dest = dest_dir.join(self.relative_path(&source));
                self.copy_file(&source, &dest)?;
                created.push(dest);
            }
        }

        Ok(created)
    }

    /// Copy one file to an explicit destination, creating parent
    /// directories. Stage bodies use this when the destination layout does
    /// not mirror the project root, e.g. assets copied `src/` → `dist/`.
    pub fn copy_file(&self, source: &Path, dest: &Path) -> Result<()> {
        if self.dry_run {
            log::debug!(
                "dry run: would copy {} -> {}",
                source.display(),
                dest.display()
            );
            return Ok(());
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, dest)?;
        Ok(())
    }

    /// Append an incrementing numeric suffix to the basename until no file
    /// exists at the path.
    ///
    /// `dist/report.txt` becomes `dist/report-1.txt`, then `-2`, and so on;
    /// extension-less paths get the suffix at the end.
    pub fn unique_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let target = self.absolute(path.as_ref());
        if !target.exists() {
            return target;
        }

        let stem = target
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = target.extension().map(|e| e.to_string_lossy().to_string());
        let parent = target.parent().map(Path::to_path_buf).unwrap_or_default();

        let mut counter = 1u32;
        loop {
            let name = match &extension {
                Some(ext) => format!("{}-{}.{}", stem, counter, ext),
                None => format!("{}-{}", stem, counter),
            };
            let candidate = parent.join(name);
            if !candidate.exists() {
                return candidate;
            }
            counter += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, FileOps) {
        let dir = TempDir::new().unwrap();
        let ops = FileOps::new(dir.path(), false);
        (dir, ops)
    }

    #[test]
    fn test_write_and_read_round_trip() {
        let (_dir, ops) = fixture();
        let written = ops
            .write("notes/a.txt", "hello", WriteOpts::default())
            .unwrap();
        assert!(written.is_some());
        assert_eq!(ops.read("notes/a.txt").unwrap(), "hello");
    }

    #[test]
    fn test_write_skips_existing_without_force() {
        let (_dir, ops) = fixture();
        ops.write("a.txt", "one", WriteOpts::default()).unwrap();
        let second = ops.write("a.txt", "two", WriteOpts::default()).unwrap();
        assert!(second.is_none());
        assert_eq!(ops.read("a.txt").unwrap(), "one");
    }

    #[test]
    fn test_write_force_overwrites() {
        let (_dir, ops) = fixture();
        ops.write("a.txt", "one", WriteOpts::default()).unwrap();
        let opts = WriteOpts {
            force: true,
            ..Default::default()
        };
        ops.write("a.txt", "two", opts).unwrap();
        assert_eq!(ops.read("a.txt").unwrap(), "two");
    }

    #[test]
    fn test_write_rename_diverts_to_numbered_sibling() {
        let (_dir, ops) = fixture();
        ops.write("a.txt", "one", WriteOpts::default()).unwrap();
        let opts = WriteOpts {
            rename: true,
            ..Default::default()
        };
        let diverted = ops.write("a.txt", "two", opts).unwrap().unwrap();
        assert_eq!(diverted.file_name().unwrap(), "a-1.txt");
        assert_eq!(ops.read("a.txt").unwrap(), "one");
        assert_eq!(ops.read("a-1.txt").unwrap(), "two");
    }

    #[test]
    fn test_unique_path_increments_until_free() {
        let (_dir, ops) = fixture();
        ops.write("r.txt", "x", WriteOpts::default()).unwrap();
        ops.write("r-1.txt", "x", WriteOpts::default()).unwrap();
        let unique = ops.unique_path("r.txt");
        assert_eq!(unique.file_name().unwrap(), "r-2.txt");
    }

    #[test]
    fn test_unique_path_returns_unoccupied_directly() {
        let (_dir, ops) = fixture();
        let unique = ops.unique_path("fresh.txt");
        assert_eq!(unique.file_name().unwrap(), "fresh.txt");
    }

    #[test]
    fn test_glob_sorted_and_deduped() {
        let (_dir, ops) = fixture();
        ops.write("src/b.ts", "b", WriteOpts::default()).unwrap();
        ops.write("src/a.ts", "a", WriteOpts::default()).unwrap();
        let patterns = vec!["src/*.ts".to_string(), "src/a.ts".to_string()];
        let found = ops.glob(&patterns).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.ts", "b.ts"]);
    }

    #[test]
    fn test_delete_files_and_directories() {
        let (_dir, ops) = fixture();
        ops.write("dist/deep/x.js", "x", WriteOpts::default()).unwrap();
        ops.write("top.txt", "t", WriteOpts::default()).unwrap();
        ops.delete(&[PathBuf::from("dist"), PathBuf::from("top.txt")])
            .unwrap();
        assert!(!ops.exists("dist"));
        assert!(!ops.exists("top.txt"));
    }

    #[test]
    fn test_delete_missing_path_is_noop() {
        let (_dir, ops) = fixture();
        ops.delete(&[PathBuf::from("never-there.txt")]).unwrap();
    }

    #[test]
    fn test_copy_preserves_relative_structure() {
        let (_dir, ops) = fixture();
        ops.write("src/lib/a.ts", "a", WriteOpts::default()).unwrap();
        ops.write("src/b.ts", "b", WriteOpts::default()).unwrap();
        let sources = ops.glob(&["src/**/*.ts".to_string()]).unwrap();
        let created = ops.copy(&sources, Path::new("out")).unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(ops.read("out/src/lib/a.ts").unwrap(), "a");
        assert_eq!(ops.read("out/src/b.ts").unwrap(), "b");
    }

    #[test]
    fn test_copy_walks_directory_sources() {
        let (_dir, ops) = fixture();
        ops.write("src/deep/a.ts", "a", WriteOpts::default()).unwrap();
        let created = ops
            .copy(&[PathBuf::from("src")], Path::new("out"))
            .unwrap();
        assert_eq!(created.len(), 1);
        assert!(ops.exists("out/src/deep/a.ts"));
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let wet = FileOps::new(dir.path(), false);
        wet.write("keep.txt", "k", WriteOpts::default()).unwrap();

        let ops = FileOps::new(dir.path(), true);
        ops.write("new.txt", "n", WriteOpts::default()).unwrap();
        ops.delete(&[PathBuf::from("keep.txt")]).unwrap();
        ops.copy(&[PathBuf::from("keep.txt")], Path::new("out"))
            .unwrap();

        assert!(!ops.exists("new.txt"));
        assert!(ops.exists("keep.txt"));
        assert!(!ops.exists("out"));
    }

    #[test]
    fn test_resolve_and_relative_paths() {
        let (dir, ops) = fixture();
        let resolved = ops.resolve_path(["dist", "index.js"]);
        assert_eq!(resolved, dir.path().join("dist/index.js"));
        assert_eq!(
            ops.relative_path(&resolved),
            PathBuf::from("dist/index.js")
        );
        // Paths outside the root come back unchanged.
        assert_eq!(
            ops.relative_path(Path::new("/elsewhere/x")),
            PathBuf::from("/elsewhere/x")
        );
    }
}
