#![cfg(unix)]

//! Unix domain socket channel endpoint.

use std::io;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::ChannelAddr;

/// How often a pending accept rechecks the shutdown flag.
const ACCEPT_POLL: Duration = Duration::from_millis(25);

/// Connected, blocking write half handed to the streaming loop.
pub type ChannelStream = UnixStream;

/// One bound listening socket; consumed by `accept`.
pub struct ChannelEndpoint {
    listener: UnixListener,
    path: PathBuf,
}

impl ChannelEndpoint {
    /// Bind the channel's socket, replacing a stale file left behind by a
    /// previous run. Only one endpoint instance exists per name while the
    /// process runs.
    pub fn bind(addr: &ChannelAddr) -> io::Result<Self> {
        let path = addr.as_path().to_path_buf();
        if path.exists() {
            let _ = std::fs::remove_file(&path);
        }
        let listener = UnixListener::bind(&path)?;
        // Nonblocking so a pending accept can observe the shutdown flag.
        listener.set_nonblocking(true)?;
        Ok(Self { listener, path })
    }

    /// Wait for a consumer to attach. Returns `Ok(None)` once `shutdown`
    /// is set. Consumes the endpoint: the socket file disappears until the
    /// server binds a fresh instance for the next session.
    pub fn accept(self, shutdown: &AtomicBool) -> io::Result<Option<ChannelStream>> {
        loop {
            if shutdown.load(Ordering::Relaxed) {
                return Ok(None);
            }
            match self.listener.accept() {
                Ok((stream, _)) => {
                    // The streaming loop blocks on write.
                    stream.set_nonblocking(false)?;
                    return Ok(Some(stream));
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                    std::thread::sleep(ACCEPT_POLL);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Drop for ChannelEndpoint {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
