//! Listener acquisition: service-manager handover or a direct path bind.

use std::os::fd::{FromRawFd, RawFd};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::net::UnixListener;
use tracing::{info, warn};

// First file descriptor passed by a systemd-style service manager.
const LISTEN_FDS_START: RawFd = 3;

/// How the daemon obtained its listener; a self-bound path is unlinked on
/// shutdown, a handed-over socket is left to the service manager.
pub enum BoundListener {
    Activated(UnixListener),
    Path(UnixListener, PathBuf),
}

impl BoundListener {
    pub fn into_parts(self) -> (UnixListener, Option<PathBuf>) {
        match self {
            Self::Activated(listener) => (listener, None),
            Self::Path(listener, path) => (listener, Some(path)),
        }
    }
}

/// Prefers a handed-over socket unless `debug` forces a direct bind; falls
/// back to binding `path`. Failure to obtain any listener is fatal.
pub fn acquire(debug: bool, path: &Path) -> Result<BoundListener> {
    if !debug {
        if let Some(listener) = activated_listener()? {
            info!("using socket handed over by the service manager");
            return Ok(BoundListener::Activated(listener));
        }
    }

    let listener = bind_path(path)?;
    info!("listening on {}", path.display());
    Ok(BoundListener::Path(listener, path.to_path_buf()))
}

/// Adopts fd 3 when LISTEN_PID/LISTEN_FDS name this process.
pub fn activated_listener() -> Result<Option<UnixListener>> {
    let Ok(listen_pid) = std::env::var("LISTEN_PID") else {
        return Ok(None);
    };
    let pid: u32 = listen_pid
        .trim()
        .parse()
        .context("invalid LISTEN_PID value")?;
    if pid != std::process::id() {
        return Ok(None);
    }

    let count: i32 = std::env::var("LISTEN_FDS")
        .unwrap_or_default()
        .trim()
        .parse()
        .context("invalid LISTEN_FDS value")?;
    if count < 1 {
        return Ok(None);
    }
    if count > 1 {
        warn!("service manager passed {count} sockets; using the first");
    }

    let fd = LISTEN_FDS_START;
    // The service manager leaves the fd inheritable; claim it for this
    // process only.
    unsafe {
        libc::fcntl(fd, libc::F_SETFD, libc::FD_CLOEXEC);
    }
    let std_listener = unsafe { std::os::unix::net::UnixListener::from_raw_fd(fd) };
    std_listener
        .set_nonblocking(true)
        .context("setting activated socket non-blocking")?;
    let listener =
        UnixListener::from_std(std_listener).context("adopting activated socket into the runtime")?;
    Ok(Some(listener))
}

/// Binds the socket path directly, clearing any stale socket file first.
pub fn bind_path(path: &Path) -> Result<UnixListener> {
    let _ = std::fs::remove_file(path);
    UnixListener::bind(path).with_context(|| format!("binding {}", path.display()))
}
