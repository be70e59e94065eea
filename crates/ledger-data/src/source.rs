//! Candidate-file discovery and byte access for both input sources.
//!
//! Loaders never touch the filesystem directly: they ask a [`SourceStore`] for
//! the files in a directory and for each file's bytes. [`FsStore`] serves the
//! real filesystem; [`MemoryStore`] serves an in-memory file set.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use ledger_core::calendar::is_calendar_date;
use ledger_core::error::{LedgerError, Result};
use ledger_core::models::DateMap;
use tracing::debug;

/// Suffixes accepted for structured (YAML) contribution files.
pub const STRUCTURED_SUFFIXES: &[&str] = &[".yml", ".yaml"];

/// Suffixes accepted for markup (HTML) level files.
pub const MARKUP_SUFFIXES: &[&str] = &[".html", ".htm"];

/// Default file-name prefix shared by both sources.
pub const DEFAULT_FILE_PREFIX: &str = "contributions_";

// ── SourceStore ───────────────────────────────────────────────────────────────

/// Lists candidate files and reads their bytes.
pub trait SourceStore {
    /// Regular files directly inside `dir` (non-recursive), sorted by path.
    ///
    /// Fails when `dir` does not exist or cannot be enumerated.
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Full contents of the file at `path`.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
}

// ── FsStore ───────────────────────────────────────────────────────────────────

/// [`SourceStore`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl SourceStore for FsStore {
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.exists() {
            return Err(LedgerError::DataPathNotFound(dir.to_path_buf()));
        }
        if !dir.is_dir() {
            return Err(LedgerError::DirectoryRead {
                path: dir.to_path_buf(),
                source: std::io::Error::other("not a directory"),
            });
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| LedgerError::DirectoryRead {
                path: dir.to_path_buf(),
                source: e.into(),
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|source| LedgerError::FileRead {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ── MemoryStore ───────────────────────────────────────────────────────────────

/// [`SourceStore`] over an in-memory file set.
///
/// A directory exists once it has been registered with [`MemoryStore::with_dir`]
/// or holds at least one file.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    dirs: BTreeSet<PathBuf>,
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an (initially empty) directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dirs.insert(dir.into());
        self
    }

    /// Add a file, registering its parent directory.
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.dirs.insert(parent.to_path_buf());
        }
        self.files.insert(path, contents.into());
        self
    }
}

impl SourceStore for MemoryStore {
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !self.dirs.contains(dir) {
            return Err(LedgerError::DataPathNotFound(dir.to_path_buf()));
        }
        Ok(self
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .cloned()
            .collect())
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| LedgerError::FileRead {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            })
    }
}

/// Store whose single listed file fails to read, for exercising the loaders'
/// I/O abort path.
#[cfg(test)]
pub(crate) struct UnreadableStore {
    pub dir: PathBuf,
    pub file: PathBuf,
}

#[cfg(test)]
impl SourceStore for UnreadableStore {
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if dir != self.dir.as_path() {
            return Err(LedgerError::DataPathNotFound(dir.to_path_buf()));
        }
        Ok(vec![self.file.clone()])
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        Err(LedgerError::FileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        })
    }
}

// ── File selection ────────────────────────────────────────────────────────────

/// Matches file names by prefix and one of several suffixes.
#[derive(Debug, Clone)]
pub struct FileSelector {
    prefix: String,
    suffixes: &'static [&'static str],
}

impl FileSelector {
    pub fn new(prefix: impl Into<String>, suffixes: &'static [&'static str]) -> Self {
        Self {
            prefix: prefix.into(),
            suffixes,
        }
    }

    /// Selector for `{prefix}*.yml` / `{prefix}*.yaml`.
    pub fn structured(prefix: &str) -> Self {
        Self::new(prefix, STRUCTURED_SUFFIXES)
    }

    /// Selector for `{prefix}*.html` / `{prefix}*.htm`.
    pub fn markup(prefix: &str) -> Self {
        Self::new(prefix, MARKUP_SUFFIXES)
    }

    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        name.starts_with(&self.prefix) && self.suffixes.iter().any(|s| name.ends_with(s))
    }
}

/// List the files in `dir` accepted by `selector`, in path order.
pub fn select_files(
    store: &impl SourceStore,
    dir: &Path,
    selector: &FileSelector,
) -> Result<Vec<PathBuf>> {
    let all = store.list_files(dir)?;
    let total = all.len();
    let selected: Vec<PathBuf> = all.into_iter().filter(|p| selector.matches(p)).collect();

    debug!(
        "{}: {} of {} files selected",
        dir.display(),
        selected.len(),
        total
    );

    Ok(selected)
}

// ── Loader plumbing ───────────────────────────────────────────────────────────

/// Options shared by both loaders.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// File-name prefix both sources share.
    pub file_prefix: String,
    /// Reject keys that are not `YYYY-MM-DD` calendar dates.
    pub strict_dates: bool,
    /// Treat an unparseable markup file as fatal instead of skipping it.
    pub strict_markup: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            strict_dates: false,
            strict_markup: false,
        }
    }
}

/// Result of running one loader over a directory.
#[derive(Debug, Clone)]
pub struct LoadOutcome<V> {
    /// Merged records; later files overwrite earlier ones.
    pub records: DateMap<V>,
    /// Number of files whose records were merged.
    pub files_read: usize,
    /// Files skipped because their markup could not be parsed.
    pub files_skipped: Vec<PathBuf>,
}

/// Fail with [`LedgerError::InvalidDateKey`] on the first key of `records`
/// that is not a calendar date.
pub(crate) fn ensure_calendar_dates<V>(records: &DateMap<V>, path: &Path) -> Result<()> {
    match records.keys().find(|key| !is_calendar_date(key)) {
        Some(key) => Err(LedgerError::InvalidDateKey {
            path: path.to_path_buf(),
            key: key.to_string(),
        }),
        None => Ok(()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
