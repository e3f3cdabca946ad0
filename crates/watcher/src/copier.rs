//! File replication with structure mirroring
//!
//! A changed source file lands at `dest_root/<source path>`, so nested
//! source directories reappear under the destination. Content is
//! copied byte-for-byte and modification/access times are re-applied
//! to the target where the platform supports it.

use filetime::FileTime;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A single failed replication. Every variant carries enough context
/// to be logged without re-deriving paths at the call site.
#[derive(Debug, Error)]
pub enum CopyError {
    /// Creating the target's ancestor directories failed.
    #[error("could not create destination directory {dir}: {source}")]
    CreateDirs {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The content copy itself failed.
    #[error("could not copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Content arrived but timestamps could not be applied.
    #[error("could not set file times on {to}: {source}")]
    Metadata {
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Copy `source` to `dest_root.join(source)`, creating the ancestor
/// chain if absent. Returns the target path on success.
pub fn copy_file(source: &Path, dest_root: &Path) -> Result<PathBuf, CopyError> {
    let target = dest_root.join(source);

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|err| CopyError::CreateDirs {
            dir: parent.to_path_buf(),
            source: err,
        })?;
    }

    fs::copy(source, &target).map_err(|err| CopyError::Copy {
        from: source.to_path_buf(),
        to: target.clone(),
        source: err,
    })?;

    apply_file_times(source, &target)?;

    Ok(target)
}

/// Mirror the source's mtime/atime onto the target.
fn apply_file_times(source: &Path, target: &Path) -> Result<(), CopyError> {
    let metadata = fs::metadata(source).map_err(|err| CopyError::Metadata {
        to: target.to_path_buf(),
        source: err,
    })?;

    let mtime = FileTime::from_last_modification_time(&metadata);
    let atime = FileTime::from_last_access_time(&metadata);

    filetime::set_file_times(target, atime, mtime).map_err(|err| CopyError::Metadata {
        to: target.to_path_buf(),
        source: err,
    })
}
