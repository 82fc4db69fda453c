//! Service-manager liveness plumbing (sd_notify-style datagrams).

use std::os::unix::net::UnixDatagram;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};

/// Sends state updates to the service manager's notify socket. Cloned freely;
/// each send opens a fresh unbound datagram socket.
#[derive(Debug, Clone)]
pub struct Notifier {
    socket: PathBuf,
}

impl Notifier {
    pub fn from_env() -> Option<Self> {
        let socket = std::env::var_os("NOTIFY_SOCKET")?;
        let socket = PathBuf::from(socket);
        if socket.to_string_lossy().starts_with('@') {
            warn!("abstract notify sockets are not supported; supervisor updates disabled");
            return None;
        }
        Some(Self { socket })
    }

    pub fn at(socket: PathBuf) -> Self {
        Self { socket }
    }

    pub fn send(&self, state: &str) {
        let result = UnixDatagram::unbound()
            .and_then(|datagram| datagram.send_to(state.as_bytes(), &self.socket).map(|_| ()));
        match result {
            Ok(()) => debug!(state, "notified service manager"),
            Err(err) => warn!("failed to notify service manager: {err}"),
        }
    }

    pub fn ready(&self) {
        self.send("READY=1");
    }

    pub fn keep_alive(&self) {
        self.send("WATCHDOG=1");
    }

    pub fn stopping(&self) {
        self.send("STOPPING=1");
    }
}

/// Watchdog interval requested by the service manager: enabled only when
/// WATCHDOG_USEC parses positive and WATCHDOG_PID, when present, names this
/// process.
pub fn watchdog_interval() -> Option<Duration> {
    let usec: u64 = std::env::var("WATCHDOG_USEC").ok()?.trim().parse().ok()?;
    if usec == 0 {
        return None;
    }
    if let Ok(pid) = std::env::var("WATCHDOG_PID") {
        if pid.trim().parse::<u32>().ok()? != std::process::id() {
            return None;
        }
    }
    Some(Duration::from_micros(usec))
}

/// Keeps the supervisor fed for the life of the process, pinging at a third
/// of the configured interval.
pub fn spawn_keep_alive(notifier: Notifier, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval / 3);
        loop {
            ticker.tick().await;
            notifier.keep_alive();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifier_delivers_state_datagrams() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notify.sock");
        let receiver = UnixDatagram::bind(&path).expect("bind notify socket");

        Notifier::at(path).ready();

        let mut buf = [0u8; 64];
        let len = receiver.recv(&mut buf).expect("receive datagram");
        assert_eq!(&buf[..len], b"READY=1");
    }

    #[test]
    fn send_to_a_missing_socket_does_not_panic() {
        Notifier::at(PathBuf::from("/nonexistent/notify.sock")).stopping();
    }
}
