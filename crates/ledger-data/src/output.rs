use std::path::Path;

use ledger_core::error::{LedgerError, Result};

/// Overwrite `path` with `contents`, creating missing parent directories.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    let to_error = |source: std::io::Error| LedgerError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(to_error)?;
    }
    std::fs::write(path, contents).map_err(to_error)
}
