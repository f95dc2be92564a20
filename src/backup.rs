use std::fs;
use std::path::{Path, PathBuf};


pub const BACKUP_EXTENSION: &str = "bak";

/// Where the previous contents of `path` get copied before it's overwritten.
pub fn backup_path(path: &Path) -> PathBuf {
    path.with_extension(BACKUP_EXTENSION)
}

/// Copy an existing output file aside before a build clobbers it.
///
/// Losing the backup isn't worth failing the build over, so problems are only logged.  Returns
/// the backup's path if one was made.
pub fn backup_existing<P: AsRef<Path>>(path: P) -> Option<PathBuf> {
    let path = path.as_ref();
    if !path.is_file() {
        return None;
    }

    let backup = backup_path(path);
    if backup == path {
        warn!("WARNING: not backing up {} onto itself", path.display());
        return None;
    }

    info!("Backing up existing file: {}", path.display());
    match fs::copy(path, &backup) {
        Ok(_) => Some(backup),
        Err(err) => {
            warn!("WARNING: unable to create backup: {}: {}", backup.display(), err);
            None
        }
    }
}
