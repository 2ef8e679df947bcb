use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const RETRY_EVERY: Duration = Duration::from_millis(10);

/// Error type for project locks
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("project {project} is busy: another save did not finish within {waited_ms}ms")]
    Busy { project: String, waited_ms: u128 },
}

/// Exclusive hold on one project's forest file.
///
/// Updates to the same project take turns, across threads and processes;
/// updates to different projects never wait on each other. The lock file
/// stays on disk. Only the flock on it comes and goes, released when the
/// guard drops.
#[derive(Debug)]
pub struct ProjectLock {
    _file: File,
}

impl ProjectLock {
    pub fn path_for(bujo_dir: &Path, project_id: &str) -> PathBuf {
        bujo_dir.join(format!(".{}.lock", project_id))
    }

    /// Wait up to `timeout` for the project's lock.
    pub fn acquire(bujo_dir: &Path, project_id: &str, timeout: Duration) -> Result<Self, LockError> {
        let path = Self::path_for(bujo_dir, project_id);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::Open {
                path: path.clone(),
                source,
            })?;

        let deadline = Instant::now() + timeout;
        loop {
            match try_exclusive(&file) {
                Ok(true) => return Ok(ProjectLock { _file: file }),
                Ok(false) if Instant::now() < deadline => std::thread::sleep(RETRY_EVERY),
                Ok(false) => {
                    return Err(LockError::Busy {
                        project: project_id.to_string(),
                        waited_ms: timeout.as_millis(),
                    });
                }
                Err(source) => return Err(LockError::Open { path, source }),
            }
        }
    }
}

/// Non-blocking exclusive flock. `Ok(false)` means someone else holds it.
#[cfg(unix)]
fn try_exclusive(file: &File) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    if err.kind() == io::ErrorKind::WouldBlock {
        Ok(false)
    } else {
        Err(err)
    }
}

#[cfg(not(unix))]
fn try_exclusive(_file: &File) -> io::Result<bool> {
    Ok(true)
}
