//! `export` command handler.
//!
//! Writes the exact bytes `GET /download` would return, without starting a
//! server.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::asset::StaticAsset;
use crate::cli::args::ExportArgs;
use crate::error::{ExportError, SwipeSimError};

/// Write the page to `args.path`.
///
/// # Errors
///
/// Returns [`ExportError::Exists`] if the file exists and `--force` was not
/// given, or an I/O error if the file cannot be written.
pub fn run(args: &ExportArgs) -> Result<(), SwipeSimError> {
    let written = write_asset(&StaticAsset::page(), &args.path, args.force)?;
    tracing::info!(path = %args.path.display(), bytes = written, "page exported");
    Ok(())
}

/// Writes `asset` to `path`, returning the number of bytes written.
///
/// Without `force` the file must not already exist.
///
/// # Errors
///
/// Returns [`ExportError::Exists`] or the underlying I/O error.
pub fn write_asset(asset: &StaticAsset, path: &Path, force: bool) -> Result<u64, SwipeSimError> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = options.open(path).map_err(|e| {
        if e.kind() == ErrorKind::AlreadyExists {
            SwipeSimError::Export(ExportError::Exists {
                path: path.to_path_buf(),
            })
        } else {
            SwipeSimError::Io(e)
        }
    })?;

    let bytes = asset.bytes();
    file.write_all(&bytes)?;
    file.flush()?;
    Ok(bytes.len() as u64)
}
