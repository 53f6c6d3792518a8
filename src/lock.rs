//! Exclusive ownership of a store directory.
//!
//! A persisted local store holds an advisory lock on `<dir>/LOCK` for as long
//! as its handle lives, using `flock(2)` on Unix and `LockFileEx` on Windows.

use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Lock file name inside the store directory.
pub const LOCK_FILE_NAME: &str = "LOCK";

/// An exclusive lock on a store directory, released on drop.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Acquire the lock, creating the lock file if needed.
    ///
    /// Fails with [`Error::StoreLocked`] if another handle holds it.
    pub fn acquire(store_dir: &Path) -> Result<Self> {
        let lock_path = store_dir.join(LOCK_FILE_NAME);

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(Error::io_err(&lock_path, "failed to open lock file"))?;

        if !try_lock(&file, &lock_path)? {
            return Err(Error::StoreLocked {
                path: store_dir.to_path_buf(),
            });
        }

        Ok(Self {
            file,
            path: lock_path,
        })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        unlock(&self.file);
    }
}

/// Non-blocking exclusive lock. `Ok(false)` when held elsewhere.
#[cfg(unix)]
fn try_lock(file: &File, lock_path: &Path) -> Result<bool> {
    use std::os::unix::io::AsRawFd;

    // SAFETY: the descriptor is owned by `file` and valid for this call.
    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        return Ok(true);
    }

    let err = std::io::Error::last_os_error();
    if err.kind() == std::io::ErrorKind::WouldBlock {
        return Ok(false);
    }
    let context = format!("flock failed: {}", err);
    Err(Error::Io {
        source: err,
        path: lock_path.to_path_buf(),
        context,
    })
}

#[cfg(unix)]
fn unlock(file: &File) {
    use std::os::unix::io::AsRawFd;

    // SAFETY: as above; failure to unlock is harmless since close releases it.
    unsafe {
        libc::flock(file.as_raw_fd(), libc::LOCK_UN);
    }
}

#[cfg(windows)]
fn try_lock(file: &File, lock_path: &Path) -> Result<bool> {
    use std::os::windows::io::AsRawHandle;
    use windows_sys::Win32::Foundation::FALSE;
    use windows_sys::Win32::Storage::FileSystem::{
        LockFileEx, LOCKFILE_EXCLUSIVE_LOCK, LOCKFILE_FAIL_IMMEDIATELY,
    };
    use windows_sys::Win32::System::IO::OVERLAPPED;

    // ERROR_LOCK_VIOLATION
    const LOCK_VIOLATION: i32 = 33;

    // SAFETY: OVERLAPPED is plain data; the handle is owned by `file`.
    let result = unsafe {
        let mut overlapped: OVERLAPPED = std::mem::zeroed();
        LockFileEx(
            file.as_raw_handle() as _,
            LOCKFILE_EXCLUSIVE_LOCK | LOCKFILE_FAIL_IMMEDIATELY,
            0,
            u32::MAX,
            u32::MAX,
            &mut overlapped,
        )
    };
    if result != FALSE {
        return Ok(true);
    }

    let err = std::io::Error::last_os_error();
    if err.raw_os_error() == Some(LOCK_VIOLATION) {
        return Ok(false);
    }
    let context = format!("LockFileEx failed: {}", err);
    Err(Error::Io {
        source: err,
        path: lock_path.to_path_buf(),
        context,
    })
}

#[cfg(windows)]
fn unlock(file: &File) {
    use std::os::windows::io::AsRawHandle;
    use windows_sys::Win32::Storage::FileSystem::UnlockFileEx;
    use windows_sys::Win32::System::IO::OVERLAPPED;

    // SAFETY: as in `try_lock`.
    unsafe {
        let mut overlapped: OVERLAPPED = std::mem::zeroed();
        UnlockFileEx(file.as_raw_handle() as _, 0, u32::MAX, u32::MAX, &mut overlapped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_acquire_and_release() {
        let temp_dir = TempDir::new().unwrap();

        let lock = StoreLock::acquire(temp_dir.path()).unwrap();
        assert!(lock.path().ends_with(LOCK_FILE_NAME));
        assert!(lock.path().exists());

        drop(lock);
        let again = StoreLock::acquire(temp_dir.path()).unwrap();
        assert_eq!(again.path(), temp_dir.path().join(LOCK_FILE_NAME));
    }

    #[test]
    fn test_double_lock_fails() {
        let temp_dir = TempDir::new().unwrap();

        let first = StoreLock::acquire(temp_dir.path()).unwrap();
        let err = StoreLock::acquire(temp_dir.path()).unwrap_err();
        assert!(matches!(err, Error::StoreLocked { ref path } if path == temp_dir.path()));

        drop(first);
        assert!(StoreLock::acquire(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let err = StoreLock::acquire(&temp_dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
