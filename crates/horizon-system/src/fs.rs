//! Filesystem capability.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

/// Owned metadata returned by [`FileSystem::stat`].
///
/// Both the real and the dry-run filesystem can produce this value, which is
/// not true of [`std::fs::Metadata`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileInfo {
    /// Path that was queried.
    pub path: PathBuf,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Size in bytes.
    pub len: u64,
    /// Permission bits.
    pub mode: u32,
}

impl FileInfo {
    fn from_metadata(path: &Path, metadata: &fs::Metadata) -> Self {
        Self {
            path: path.to_path_buf(),
            is_dir: metadata.is_dir(),
            len: metadata.len(),
            mode: permission_bits(metadata),
        }
    }
}

#[cfg(unix)]
fn permission_bits(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &fs::Metadata) -> u32 {
    if metadata.permissions().readonly() { 0o444 } else { 0o644 }
}

/// Filesystem operations used by the gateway.
pub trait FileSystem {
    /// Reads the whole file.
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Writes `data` to `path`, creating it with `mode` if it does not exist.
    fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()>;

    /// Returns metadata for `path`.
    fn stat(&self, path: &Path) -> io::Result<FileInfo>;

    /// Returns `true` if `path` exists.
    fn exists(&self, path: &Path) -> bool;

    /// Removes a file or an empty directory.
    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Creates `path` and all missing parents.
    fn mkdir_all(&self, path: &Path, mode: u32) -> io::Result<()>;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        (**self).read_file(path)
    }

    fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()> {
        (**self).write_file(path, data, mode)
    }

    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        (**self).stat(path)
    }

    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        (**self).remove(path)
    }

    fn mkdir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        (**self).mkdir_all(path, mode)
    }
}

impl<T: FileSystem + ?Sized> FileSystem for Arc<T> {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        (**self).read_file(path)
    }

    fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()> {
        (**self).write_file(path, data, mode)
    }

    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        (**self).stat(path)
    }

    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        (**self).remove(path)
    }

    fn mkdir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        (**self).mkdir_all(path, mode)
    }
}

/// [`FileSystem`] backed by the host filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct RealFileSystem;

impl RealFileSystem {
    /// Creates a new real filesystem handle.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()> {
        use std::io::Write;

        debug!(path = %path.display(), bytes = data.len(), mode = %format!("{mode:o}"), "writing file");
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
        }
        let mut file = options.open(path)?;
        file.write_all(data)?;
        file.sync_all()
    }

    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        let metadata = fs::metadata(path)?;
        Ok(FileInfo::from_metadata(path, &metadata))
    }

    fn exists(&self, path: &Path) -> bool {
        fs::metadata(path).is_ok()
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        debug!(path = %path.display(), "removing path");
        if fs::symlink_metadata(path)?.is_dir() {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        }
    }

    fn mkdir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        debug!(path = %path.display(), mode = %format!("{mode:o}"), "creating directory");
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        builder.create(path)
    }
}
